//! Binary crate for the `announce` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Logging setup
//! - Interactive location prompt

use clap::Parser;

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cmd.log_level)
        .with_writer(std::io::stderr)
        .init();

    let result = cmd.run().await;
    if let Err(e) = &result {
        tracing::error!(message = "run failed", error = %format!("{e:#}"));
    }

    result
}
