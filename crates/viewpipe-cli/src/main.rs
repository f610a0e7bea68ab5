//! viewpipe: command-line front end for the native window controller.

mod cli;
mod open;

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;
use viewpipe_common::ViewpipeError;
use viewpipe_config::{config_to_json, load_config, load_config_from, ViewpipeConfig};

use crate::cli::{Args, Command};

const DEFAULT_FILTER: &str = "viewpipe=info";

fn init_logging(log_level: Option<&str>) {
    let filter = match log_level {
        Some(directive) => EnvFilter::try_new(directive).unwrap_or_else(|e| {
            eprintln!("invalid --log-level {directive:?}: {e}, using {DEFAULT_FILTER}");
            EnvFilter::new(DEFAULT_FILTER)
        }),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load(args: &Args) -> Result<ViewpipeConfig, ViewpipeError> {
    let config = match &args.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    Ok(config)
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::parse();
    init_logging(args.log_level.as_deref());

    let config = match load(&args) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "failed to load config");
            return ExitCode::FAILURE;
        }
    };

    let result = match &args.command {
        Command::Open(open_args) => open::run(&config, open_args).await,
        Command::Config => {
            println!("{}", config_to_json(&config));
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "viewpipe failed");
            ExitCode::FAILURE
        }
    }
}
