// src/main.rs
// =============================================================================
// Entry point: parse CLI flags, build a `Config` and `Driver`, run the
// traversal, and translate its `FinalStatus` into a process exit code.
//
// Exit codes:
//   0 = traversal completed normally
//   1 = stopped early (quota exceeded)
//   2 = a write error or a setup/parse error occurred
// =============================================================================

mod cli;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use crawlcore::fetch::Fetcher;
use crawlcore::robots::RobotsCache;
use crawlcore::{Driver, FinalStatus, ParsedUrl, RetrievalContext};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    let seed = ParsedUrl::parse(&cli.url).with_context(|| format!("invalid seed URL: {}", cli.url))?;
    let config = cli.to_config()?;

    let fetcher = Fetcher::new(&config.user_agent, PathBuf::from(&cli.output_dir))
        .context("failed to build HTTP client")?;
    let driver = Driver::new(fetcher, config);
    let mut context = RetrievalContext::new(RobotsCache::new());

    let status = driver.retrieve_tree(seed, &mut context).await;

    Ok(match status {
        FinalStatus::Ok => 0,
        FinalStatus::QuotaExceeded => 1,
        FinalStatus::WriteError => 2,
    })
}
