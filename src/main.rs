use anyhow::Context;
use batch_squeeze::cli::{self, Args};
use batch_squeeze::constants::ERROR_PREFIX;
use batch_squeeze::{logger, report};
use batch_squeeze::{BatchError, CancelToken, ImageCompressor, Orchestrator};
use clap::Parser;
use console::style;
use std::process::ExitCode;
use std::sync::Arc;

fn main() -> ExitCode {
    let args = Args::parse();
    logger::init(args.verbose, args.quiet);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = err
                .downcast_ref::<BatchError>()
                .map(BatchError::exit_code)
                .unwrap_or(1);
            eprintln!("{} {:#}", style(ERROR_PREFIX).red(), err);
            ExitCode::from(code as u8)
        }
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let options = args.compression_options()?;

    let selection = match args.selection_from_flags() {
        Some(selection) => selection,
        None => {
            report::print_welcome();
            cli::select_interactively().context("Interactive selection failed")?
        }
    };
    let config = args.build_config(selection, options.clone());

    // Installed after the prompts so Ctrl-C still aborts them
    let cancel = CancelToken::new();
    cancel
        .cancel_on_ctrl_c()
        .context("Failed to install Ctrl-C handler")?;

    report::print_start();
    let mut orchestrator = Orchestrator::new(config, Arc::new(ImageCompressor::new(options)))?
        .with_cancel_token(cancel);
    let summary = orchestrator.run()?;

    report::clear_screen();
    report::print_final_report(&summary);
    Ok(())
}
