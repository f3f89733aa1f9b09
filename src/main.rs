use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use stacked_form::app::{App, CompletedStep};
use stacked_form::config::Config;
use stacked_form::logging;

#[derive(Parser)]
#[command(name = "stacked-form")]
#[command(about = "Stacked multi-step form demo for the terminal")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file path
    #[arg(short, long)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the sign-up form demo (default)
    Demo {
        /// Number of steps, 2 to 4 (default: demo.steps from config)
        #[arg(short, long)]
        steps: Option<usize>,
    },

    /// Print the effective configuration as TOML
    Config {
        /// Also write it to .stacked-form/config.toml
        #[arg(short, long)]
        save: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (needed for logging setup)
    let config = Config::load(cli.config.as_deref())?;

    // Determine if we're running in TUI mode
    let is_tui_mode = matches!(cli.command, None | Some(Commands::Demo { .. }));

    // Initialize logging (file-based for TUI, stderr for CLI)
    let logging_handle = logging::init_logging(&config, is_tui_mode, cli.debug)?;

    match cli.command {
        Some(Commands::Config { save }) => {
            cmd_config(&config, save)?;
        }
        Some(Commands::Demo { steps }) => {
            let steps = steps.unwrap_or(config.demo.steps);
            run_tui(config, steps, logging_handle.log_file_path)?;
        }
        None => {
            let steps = config.demo.steps;
            run_tui(config, steps, logging_handle.log_file_path)?;
        }
    }

    Ok(())
}

fn run_tui(config: Config, steps: usize, log_file_path: Option<PathBuf>) -> Result<()> {
    tracing::info!(steps, "starting demo");
    let mut app = App::new(config, steps);
    let result = app.run();

    if let Some(completion) = app.completion() {
        print_completion(completion);
    }

    // Print log file path on exit if logs were written
    if let Some(log_path) = log_file_path {
        if let Ok(metadata) = log_path.metadata() {
            if metadata.len() > 0 {
                eprintln!("Session log: {}", log_path.display());
            }
        }
    }

    result
}

fn print_completion(completion: &[CompletedStep]) {
    println!("Submitted");
    println!("{}", "─".repeat(40));
    for step in completion {
        println!("{}", step.title);
        for (label, value) in &step.values {
            println!("  {label}: {value}");
        }
    }
}

fn cmd_config(config: &Config, save: bool) -> Result<()> {
    print!("{}", config.to_toml()?);
    if save {
        config.save()?;
        eprintln!("Saved to {}", Config::project_config_path().display());
    }
    Ok(())
}
