use clap::Parser;
use mc_sampler::cli::CommonArgs;
use std::time::{Duration, Instant};
use tracing::info;

/// Deterministic parallel Monte Carlo sampling on tokio's blocking pool
#[derive(Parser, Debug)]
#[command(name = "mc_sampler_async", version)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    /// Fail the run if sampling takes longer than this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cli.common.init_logging();

    let input = cli.common.read_input()?;
    let timeout = cli.timeout_secs.map(Duration::from_secs);

    let start = Instant::now();
    let summary = mc_sampler_async::full_computation(&input, timeout).await?;
    info!(elapsed_ms = start.elapsed().as_millis() as u64, "computation finished");

    cli.common.write_summary(&summary)
}
