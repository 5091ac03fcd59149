use tracing_subscriber::EnvFilter;

/// Log filter used when `RUST_LOG` is not set.
pub fn default_filter(verbose: bool, quiet: bool) -> &'static str {
    if quiet {
        "error"
    } else if verbose {
        "warn,batch_squeeze=debug"
    } else {
        "warn"
    }
}

/// Installs the global subscriber. Logs go to stderr so they stay out of
/// the report printed on stdout.
pub fn init(verbose: bool, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose, quiet)));

    // A subscriber may already be installed, e.g. by a test harness
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        assert_eq!(default_filter(false, false), "warn");
        assert_eq!(default_filter(true, false), "warn,batch_squeeze=debug");
        assert_eq!(default_filter(false, true), "error");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init(false, true);
        init(true, false);
    }
}
