use clap::Parser;
use mc_sampler::cli::CommonArgs;
use std::time::Instant;
use tracing::info;

/// Deterministic parallel Monte Carlo sampling on OS threads
#[derive(Parser, Debug)]
#[command(name = "mc_sampler", version)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cli.common.init_logging();

    let input = cli.common.read_input()?;

    let start = Instant::now();
    let summary = mc_sampler::full_computation(&input)?;
    info!(elapsed_ms = start.elapsed().as_millis() as u64, "computation finished");

    cli.common.write_summary(&summary)
}
