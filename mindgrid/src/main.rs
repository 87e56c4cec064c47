//! MindGrid - a terminal client for the MindGrid knowledge dashboard.
//!
//! Architecture:
//! - CLI is a thin client that talks to the MindGrid backend via HTTP
//! - The session and the open project are cached in a per-profile state file
//! - All backend access goes through one-shot API functions; nothing is retried

mod api;
mod cli;
mod config;
mod context;
mod models;
mod store;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{execute, Cli};

/// Log to stderr. `MINDGRID_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "mindgrid=info",
        2 => "mindgrid=debug",
        _ => "mindgrid=trace",
    };
    let filter = EnvFilter::try_from_env("MINDGRID_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    execute(cli).await
}
