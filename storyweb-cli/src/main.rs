//! storyweb command-line client.
//!
//! Usage:
//!   storyweb followers alice --limit 50
//!   storyweb story 12345 --fields 'title,user(name)'
//!
//! The decoded response is printed to stdout as JSON; logs go to stderr.

use anyhow::{Context, Result};
use clap::Parser;
use storyweb_cli::{run, Args};
use storyweb_client::Session;
use tracing::debug;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let config = args.config();
    debug!("using API at {}", config.api_base_url);
    let session = Session::new(config).context("failed to set up session")?;

    let body = run(&session, &args.command).await?;
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}
