use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use rttseries::config::{AppConfig, OutputFormat};
use rttseries::{discovery, driver};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%m-%d %H:%M"))
    }
}

/// Turn raw RTT probe logs (`*_raw.csv`) into bucketed, outlier-filtered per-flow series.
#[derive(Debug, Parser)]
#[command(name = "rttseries", version, about)]
struct Cli {
    /// Directory of raw files
    src_dir: PathBuf,

    /// Output directory
    out_dir: PathBuf,

    /// Bucket width for the RTT series, in the unit of the send timestamps
    #[arg(long)]
    sampling_rate: Option<f64>,

    /// Separator used for the output file
    #[arg(long)]
    sep: Option<char>,

    /// Hampel window half-width
    #[arg(long)]
    window_half_width: Option<usize>,

    /// Hampel rejection threshold, in scaled MADs
    #[arg(long)]
    threshold: Option<f64>,

    /// Output format
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Max files processed in parallel
    #[arg(long)]
    jobs: Option<usize>,

    /// TOML config file (defaults to $CONFIG_FILE)
    #[arg(long, env = "CONFIG_FILE")]
    config: Option<PathBuf>,
}

impl Cli {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(v) = self.sampling_rate {
            config.pipeline.sampling_rate = v;
        }
        if let Some(v) = self.window_half_width {
            config.pipeline.window_half_width = v;
        }
        if let Some(v) = self.threshold {
            config.pipeline.threshold = v;
        }
        if let Some(v) = self.sep {
            config.output.separator = v;
        }
        if let Some(v) = self.format {
            config.output.format = v;
        }
        if let Some(v) = self.jobs {
            config.driver.max_parallel_files = v;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let cli = Cli::parse();
    let mut app_config = AppConfig::load(cli.config.as_deref())?;
    cli.apply(&mut app_config);
    app_config.validate()?;

    let found = discovery::discover(&cli.src_dir, &cli.out_dir)?;
    let summary = driver::run(found.jobs, Arc::new(app_config)).await?;

    if summary.failed > 0 {
        tracing::warn!(
            failed = summary.failed,
            total = summary.total,
            "some files could not be processed"
        );
    }
    Ok(())
}
