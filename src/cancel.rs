use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag used to request that a run stops as soon as possible.
///
/// The orchestrator checks it between chunks and workers check it before
/// starting each file. Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Cancels this token when the user presses Ctrl-C.
    pub fn cancel_on_ctrl_c(&self) -> Result<(), ctrlc::Error> {
        let token = self.clone();
        ctrlc::set_handler(move || token.cancel())
    }
}
