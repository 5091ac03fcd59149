//! User-facing terminal output: banner, selection summary and final report.

use crate::constants::{INFO_PREFIX, SUCCESS_PREFIX, WARNING_PREFIX};
use crate::progress::RunSummary;
use console::{style, Term};
use std::path::Path;

pub fn clear_screen() {
    let term = Term::stdout();
    if term.is_term() {
        let _ = term.clear_screen();
    }
}

pub fn print_welcome() {
    clear_screen();
    println!("* * * * * * * * * * * * * * * * * * * * * *");
    println!("*        {}        *", style("Welcome To Batch Squeeze").green().bold());
    println!("* * * * * * * * * * * * * * * * * * * * * *\n");
}

pub fn print_directory_summary(image_count: usize, input: &Path, output: &Path) {
    println!(
        "{} {}\n",
        style(SUCCESS_PREFIX).green(),
        style("Directory successfully registered !").green().bright()
    );
    println!(
        "{} {}\n",
        style(INFO_PREFIX).cyan(),
        style(format!(
            "This directory contains {} images.",
            style(image_count).yellow().bright().bold()
        ))
        .cyan()
    );
    println!(
        "{} {}\n",
        style(INFO_PREFIX).cyan(),
        style(format!(
            "Current input is {} & output is {}",
            style(input.display()).yellow(),
            style(output.display()).yellow()
        ))
        .cyan()
    );
}

pub fn print_start() {
    println!("{}", style(" --| Starting process |-- \n").green().bright());
}

/// The final report, one line per total.
pub fn format_final_report(summary: &RunSummary) -> String {
    let mut report = format!(
        "\n {}\n {} Input Size : {}\n {} Output Size : {}\n {} Freed Space : {}\n",
        style("Process Finished").green().bold(),
        style(SUCCESS_PREFIX).green(),
        style(summary.input_display()).yellow().bright(),
        style(SUCCESS_PREFIX).green(),
        style(summary.output_display()).green().bright(),
        style(SUCCESS_PREFIX).green(),
        style(summary.freed_display()).cyan().bright(),
    );

    if summary.failed > 0 {
        report.push_str(&format!(
            " {} {} file(s) could not be compressed and were copied unchanged\n",
            style(WARNING_PREFIX).yellow(),
            summary.failed
        ));
    }
    if summary.skipped > 0 {
        report.push_str(&format!(
            " {} {} already compressed file(s) skipped\n",
            style(INFO_PREFIX).cyan(),
            summary.skipped
        ));
    }

    report
}

pub fn print_final_report(summary: &RunSummary) {
    println!("{}", format_final_report(summary));
}
