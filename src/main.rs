use clap::{Parser, Subcommand};
use log::LevelFilter;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

// Import from our modularized library
use pdf_sanitizer_rs::prelude::*;
use pdf_sanitizer_rs::reporting::report::to_json;

#[derive(Parser)]
#[command(name = "pdf_sanitizer_rs")]
#[command(about = "Check for and remove JavaScript from PDF files", long_about = None)]
struct Cli {
    /// Enable verbose logging (DEBUG level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit a machine-readable JSON report instead of result lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check a PDF file for JavaScript
    Check {
        /// Path to the input PDF file to check
        input: PathBuf,
    },
    /// Remove JavaScript from a PDF and save a sanitized version
    Remove {
        /// Path to the input PDF file to sanitize
        input: PathBuf,
        /// Path to save the sanitized output PDF file
        output: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Verbosity is fixed once at startup and never mutated mid-run.
    env_logger::Builder::new()
        .filter_level(if cli.verbose { LevelFilter::Debug } else { LevelFilter::Info })
        .init();

    match cli.command {
        Command::Check { input } => run_check(&input, cli.json),
        Command::Remove { input, output } => run_remove(&input, &output, cli.json),
    }
}

fn print_report<T: serde::Serialize>(report: &T) {
    match to_json(report) {
        Ok(serialized) => println!("{serialized}"),
        Err(err) => log::error!("Failed to serialize report: {err}"),
    }
}

fn run_check(input: &Path, json: bool) -> ExitCode {
    match check_file(input) {
        Ok(finding) => {
            let report = CheckReport {
                path: input.to_path_buf(),
                javascript_found: finding.is_some(),
                finding,
                checked: true,
                error: None,
            };
            if json {
                print_report(&report);
            } else {
                report.print_human();
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("{err}");
            let report = CheckReport {
                path: input.to_path_buf(),
                javascript_found: false,
                finding: None,
                checked: false,
                error: Some(err.to_string()),
            };
            if json {
                print_report(&report);
            } else {
                report.print_human();
            }
            // Any input that cannot be read exits 2, whatever the cause.
            ExitCode::from(2)
        }
    }
}

fn run_remove(input: &Path, output: &Path, json: bool) -> ExitCode {
    match sanitize_file(input, output) {
        Ok(outcome) => {
            log::info!("Verifying sanitized file: {}", output.display());
            let verified_clean = !contains_javascript(output);
            let report = RemoveReport::new(
                input.to_path_buf(),
                output.to_path_buf(),
                &outcome,
                verified_clean,
            );
            if json {
                print_report(&report);
            } else {
                report.print_human();
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("{err}");
            if json {
                let payload = serde_json::json!({ "error": err.to_string() });
                println!("{}", serde_json::to_string_pretty(&payload).unwrap_or_default());
            } else {
                println!("Result: Failed to sanitize '{}'. {}", input.display(), err);
            }
            ExitCode::from(1)
        }
    }
}
