//! CLI entrypoint for the bvsls conformance harness.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use bvsls_harness::report::ConformanceReport;
use bvsls_harness::scenarios::run_all;

/// Conformance tooling for the bvsls repair engine.
#[derive(Debug, Parser)]
#[command(name = "bvsls-harness")]
#[command(about = "Runs the literal spec scenarios against the bvsls engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run every scenario and print a markdown table to stdout.
    Run,
    /// Run every scenario and write a JSON report.
    Report {
        /// Output path for the JSON report. Prints to stdout if omitted.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let outcomes = run_all();
    let report = ConformanceReport::from_outcomes(&outcomes);

    match cli.command {
        Command::Run => {
            println!("{}", report.to_markdown());
        }
        Command::Report { output } => {
            let json = report.to_json().expect("report serializes");
            match output {
                Some(path) => std::fs::write(&path, json).expect("write report"),
                None => println!("{json}"),
            }
        }
    }

    if report.all_passed() { std::process::ExitCode::SUCCESS } else { std::process::ExitCode::FAILURE }
}
