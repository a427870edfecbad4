use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use proxy_fetch::{
    Anonymity, FetcherConfig, Protocol, ProxyFetcher, ValidatorConfig,
};
use tracing_subscriber::EnvFilter;

/// Discovers public proxies and validates them with concurrent probes
#[derive(Parser)]
#[command(name = "proxy-fetch")]
#[command(about = "Discovers public proxies and validates them with concurrent probes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch working proxies
    Fetch {
        /// Allowed protocols (http, https, socks4, socks5); all when omitted
        #[arg(short = 'p', long = "protocol")]
        protocols: Vec<String>,
        /// Allowed anonymity levels (transparent, anonymous, elite); all when omitted
        #[arg(short = 'a', long = "anonymity")]
        anonymities: Vec<String>,
        /// Number of proxies to fetch; 0 fetches everything found
        #[arg(short, long, default_value = "0")]
        limit: usize,
        /// Probe timeout in seconds
        #[arg(long, default_value = "10")]
        timeout: u64,
        /// Number of concurrent probes
        #[arg(short = 'n', long, default_value = "50")]
        concurrency: usize,
        /// Judge URL to probe candidates against
        #[arg(long)]
        judge_url: Option<String>,
        /// Output file for working proxies (protocol:ip:port lines)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Commands::Fetch {
            protocols,
            anonymities,
            limit,
            timeout,
            concurrency,
            judge_url,
            output,
        } => {
            let protocols = protocols
                .iter()
                .map(|s| s.parse::<Protocol>())
                .collect::<Result<Vec<_>, _>>()?;
            let anonymities = anonymities
                .iter()
                .map(|s| s.parse::<Anonymity>())
                .collect::<Result<Vec<_>, _>>()?;

            let mut validator = ValidatorConfig::new()
                .with_timeout(Duration::from_secs(timeout))
                .with_concurrency(concurrency);
            if let Some(url) = judge_url {
                validator = validator.with_judge_url(url);
            }
            let config = FetcherConfig::new().with_validator(validator);

            let fetcher = ProxyFetcher::new(config).await?;
            let proxies = fetcher.get(&protocols, &anonymities, limit).await?;

            println!("Found {} working proxies", proxies.len());
            if let Some(output_path) = output {
                let content: String = proxies
                    .iter()
                    .map(|p| p.to_raw_string())
                    .collect::<Vec<_>>()
                    .join("\n");
                std::fs::write(&output_path, content)?;
                println!("Saved proxies to {:?}", output_path);
            } else {
                for proxy in &proxies {
                    println!(
                        "  {} ({}ms, {})",
                        proxy.url(),
                        proxy.latency.as_millis(),
                        proxy.anonymity
                    );
                }
            }
        }
    }

    Ok(())
}
