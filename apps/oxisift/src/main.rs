use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use log::{debug, info};
use oxisift_impact::Config;
use std::io::{BufWriter, Write};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "oxisift")]
#[command(about = "Select the test files affected by a change", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Determine which test files must re-run for a set of changes
    Affected(Config),
}

fn main() -> Result<()> {
    env_logger::init();

    // stdio is blocked by LineWriter, use a BufWriter to reduce syscalls.
    // See https://github.com/rust-lang/rust/issues/60673
    let mut stdout = BufWriter::new(std::io::stdout());

    let cli = Cli::parse();
    debug!("Parsed CLI arguments: {:?}", cli.command);

    let start = Instant::now();

    match cli.command {
        Commands::Affected(cfg) => {
            let json = cfg.json;
            let result = oxisift_impact::run_affected_check(cfg)?;
            let elapsed_ms = start.elapsed().as_millis();

            if json {
                writeln!(stdout, "{}", serde_json::to_string_pretty(&result)?)?;
                stdout.flush()?;
                return Ok(());
            }

            if result.should_run_all_tests {
                oxisift_impact::print_run_all_notice(&mut stdout)?;
            } else if result.affected_tests.is_empty() {
                info!("No tests affected");
                oxisift_impact::print_no_affected_message(&mut stdout)?;
            } else {
                oxisift_impact::print_affected_tests(&mut stdout, &result.affected_tests)?;
            }

            writeln!(
                stdout,
                "\n{} Finished in {}ms.",
                "●".bright_blue(),
                elapsed_ms.to_string().cyan()
            )?;
            stdout.flush()?;

            Ok(())
        }
    }
}
