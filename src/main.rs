mod cli;
mod codepipeline;
mod config;
mod error;
mod event;
mod execution;
mod handler;
mod trigger;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    // lambda_runtime emits through tracing; its `log` feature forwards those
    // events here since no tracing subscriber is installed.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    info!("Starting webhook-trigger {}", env!("CARGO_PKG_VERSION"));
    cli.execute().await?;

    Ok(())
}
