//! Download trigger utility
//!
//! Asks the download server to fetch each given source and reports the
//! per-source outcome: saved, skipped (the server answers 204 when it already
//! has the file), or failed.

use anyhow::{anyhow, Result};
use clap::Parser;
use reqwest::StatusCode;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for spkr-dl
#[derive(Parser, Debug)]
#[command(name = "spkr-dl")]
#[command(about = "Trigger server-side downloads for spkr")]
#[command(version)]
struct Args {
    /// Download server base URL
    #[arg(short = 's', long, default_value = "http://localhost:8080", env = "SPKR_DL_SERVER")]
    server: String,

    /// Source URLs to download
    #[arg(required = true)]
    sources: Vec<String>,
}

/// Per-source result as reported by the server
enum Outcome {
    Saved,
    Skipped,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "spkr_dl=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let client = reqwest::Client::new();

    let mut failures = 0usize;
    for source in &args.sources {
        match trigger_download(&client, &args.server, source).await {
            Ok(Outcome::Saved) => info!("{}: saved", source),
            Ok(Outcome::Skipped) => warn!("{}: skipped (already downloaded)", source),
            Err(e) => {
                error!("{}: failed: {}", source, e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        return Err(anyhow!("{} of {} downloads failed", failures, args.sources.len()));
    }
    Ok(())
}

/// Issue one download request and classify the response
async fn trigger_download(
    client: &reqwest::Client,
    server: &str,
    source: &str,
) -> Result<Outcome> {
    let url = format!("{}/download", server.trim_end_matches('/'));
    let response = client.get(&url).query(&[("from", source)]).send().await?;

    match response.status() {
        StatusCode::NO_CONTENT => Ok(Outcome::Skipped),
        status if status.is_success() => Ok(Outcome::Saved),
        status => Err(anyhow!("server returned {}", status)),
    }
}
