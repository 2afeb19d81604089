//! grouping-cli: command-line interface for the grouping-core optimizer.
//!
//! # Commands
//!
//! - `solve`: run the optimizer on a project file
//! - `check`: run the post-hoc `ALL`/`MAX` hard-constraint check without optimizing
//! - `score`: report the current score of a project without changing it

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use grouping_core::models::{OptimizerConfig, Project};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "grouping-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Student-group assignment optimizer CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the optimizer on a project file and print the optimized assignment.
    Solve {
        #[arg(value_name = "FILE")]
        input: Option<PathBuf>,
        #[arg(long)]
        stdin: bool,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        pretty: bool,
        #[arg(long, default_value = "10")]
        restarts: usize,
        #[arg(long, default_value = "30000")]
        max_iterations: u64,
        #[arg(long, default_value = "0")]
        seed: u64,
        #[arg(long)]
        all_results: bool,
        #[arg(long)]
        quiet: bool,
    },
    /// Check a project's `ALL`/`MAX` constraints without optimizing.
    Check {
        #[arg(value_name = "FILE")]
        input: Option<PathBuf>,
        #[arg(long)]
        stdin: bool,
    },
    /// Print the current score of a project without changing it.
    Score {
        #[arg(value_name = "FILE")]
        input: Option<PathBuf>,
        #[arg(long)]
        stdin: bool,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Solve {
            input,
            stdin,
            output,
            pretty,
            restarts,
            max_iterations,
            seed,
            all_results,
            quiet,
        } => cmd_solve(
            input,
            stdin,
            output,
            pretty,
            restarts,
            max_iterations,
            seed,
            all_results,
            quiet,
        ),
        Commands::Check { input, stdin } => cmd_check(input, stdin),
        Commands::Score { input, stdin } => cmd_score(input, stdin),
    }
}

fn read_input(file: Option<PathBuf>, use_stdin: bool) -> Result<String> {
    if use_stdin {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read project from stdin")?;
        Ok(buffer)
    } else {
        let path = file.context("provide an input FILE or pass --stdin")?;
        fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))
    }
}

fn load_project(file: Option<PathBuf>, use_stdin: bool) -> Result<Project> {
    let raw = read_input(file, use_stdin)?;
    serde_json::from_str(&raw).context("failed to parse project JSON")
}

#[allow(clippy::too_many_arguments)]
fn cmd_solve(
    input: Option<PathBuf>,
    stdin: bool,
    output: Option<PathBuf>,
    pretty: bool,
    restarts: usize,
    max_iterations: u64,
    seed: u64,
    all_results: bool,
    quiet: bool,
) -> Result<()> {
    let project = load_project(input, stdin)?;
    let config = OptimizerConfig {
        num_restarts: restarts,
        max_iterations,
        seed,
        return_all_results: all_results,
        ..Default::default()
    };

    let bar = if quiet {
        None
    } else {
        let bar = ProgressBar::new(max_iterations * restarts.max(1) as u64);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner} restart {msg} [{bar:40}] {pos}/{len} best={wide_msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Some(bar)
    };

    let callback: Option<grouping_core::models::ProgressCallback> = bar.clone().map(|bar| {
        Box::new(move |update: &grouping_core::models::ProgressUpdate| {
            bar.set_position(update.restart as u64 * max_iterations + update.iteration);
            bar.set_message(format!(
                "{}/{} score={:.2}",
                update.restart + 1,
                update.num_restarts,
                update.best_score
            ));
        }) as grouping_core::models::ProgressCallback
    });

    let result = grouping_core::optimize(&project, &config, callback, None)
        .map_err(|e| anyhow::anyhow!("optimization failed: {}", e))?;

    if let Some(bar) = bar {
        bar.finish_and_clear();
    }

    let payload = if all_results {
        serde_json::to_value(&result)?
    } else {
        serde_json::json!({
            "project": result.project,
            "score": result.score,
            "cancelled": result.cancelled,
        })
    };
    let text = if pretty {
        serde_json::to_string_pretty(&payload)?
    } else {
        serde_json::to_string(&payload)?
    };

    match output {
        Some(path) => fs::write(&path, text).with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{}", text),
    }
    Ok(())
}

fn cmd_check(input: Option<PathBuf>, stdin: bool) -> Result<()> {
    let project = load_project(input, stdin)?;
    let report = grouping_core::hard_check(&project).map_err(|e| anyhow::anyhow!("{}", e))?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    if !report.valid {
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_score(input: Option<PathBuf>, stdin: bool) -> Result<()> {
    let project = load_project(input, stdin)?;
    let state = grouping_core::state::State::new(&project).map_err(|e| anyhow::anyhow!("{}", e))?;
    println!("{}", serde_json::to_string_pretty(&state.score_report())?);
    Ok(())
}
