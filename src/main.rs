mod error;
mod fetch;
mod normalize;
mod pipeline;
mod record;
mod settings;
mod sources;
mod table;
mod writer;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use fetch::HttpFetcher;
use pipeline::{build_snapshot, Sources};
use record::TickerOverrides;
use settings::{Settings, DEFAULT_OUTPUT, DEFAULT_TIMEOUT_SECS};

#[derive(Parser)]
#[command(name = "ibex-to-json")]
#[command(about = "Scrapes IBEX 35 constituents into a JSON snapshot ranked by capitalization")]
struct Cli {
    /// Path of the JSON snapshot to (over)write
    #[arg(long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// JSON object mapping company names to tickers, replacing the derived ones
    #[arg(long)]
    tickers: Option<PathBuf>,
}

impl From<Cli> for Settings {
    fn from(cli: Cli) -> Self {
        Settings {
            output: cli.output,
            timeout: Duration::from_secs(cli.timeout_secs),
            tickers: cli.tickers,
        }
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    init_tracing();
    let settings = Settings::from(Cli::parse());

    let overrides = match &settings.tickers {
        Some(path) => TickerOverrides::load(path)
            .with_context(|| format!("Failed to load ticker overrides from {:?}", path))?,
        None => TickerOverrides::default(),
    };
    info!(overrides = overrides.len(), timeout = ?settings.timeout, "starting run");

    let fetcher = HttpFetcher::new(settings.timeout).context("Failed to build HTTP client")?;
    let snapshot = build_snapshot(&fetcher, &Sources::default(), &overrides)
        .context("Failed to collect index components")?;

    let report = writer::write_snapshot(&settings.output, &snapshot)
        .context("Failed to write snapshot")?;
    println!("{}", report.summary());

    Ok(())
}
