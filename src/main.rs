//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `shopmap` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - CI step outputs and the exit status
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use shopmap::app::{exit_code, print_run_summary, write_github_output, EXIT_SUCCESS};
use shopmap::initialization::init_logger_with;
use shopmap::{run_sync, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file (if it exists)
    // so GEMINI_API_KEY and GOOGLE_MAPS_API_KEY need not be exported by hand.
    // Try loading from current directory first, then from the executable's directory
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let config = Config::parse();

    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    let result = run_sync(config).await;
    let code = exit_code(&result);
    match result {
        Ok(outcome) => {
            print_run_summary(&outcome);
            if let Err(e) = write_github_output(&outcome) {
                log::warn!("Could not write CI outputs: {:#}", e);
            }
        }
        Err(e) => eprintln!("shopmap error: {:#}", anyhow::Error::from(e)),
    }
    if code != EXIT_SUCCESS {
        process::exit(code);
    }
    Ok(())
}
