//! Command-line plumbing shared by the threaded and async binaries.

use crate::summary::SummaryOutput;
use anyhow::Context;
use clap::Args;
use std::io::{Read, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// JSON configuration file, `-` for stdin
    #[arg(conflicts_with = "json", required_unless_present = "json")]
    pub input: Option<PathBuf>,

    /// Inline JSON configuration
    #[arg(long)]
    pub json: Option<String>,

    /// Write the summary to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Pretty-print the JSON summary
    #[arg(long)]
    pub pretty: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl CommonArgs {
    /// Logs go to stderr; `RUST_LOG` overrides the default filter.
    pub fn init_logging(&self) {
        let default = if self.verbose {
            "mc_sampler=debug,mc_sampler_async=debug"
        } else {
            "mc_sampler=info,mc_sampler_async=info"
        };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    pub fn read_input(&self) -> anyhow::Result<String> {
        if let Some(json) = &self.json {
            return Ok(json.clone());
        }

        match self.input.as_deref() {
            Some(path) if path.as_os_str() == "-" => {
                let mut input = String::new();
                std::io::stdin()
                    .read_to_string(&mut input)
                    .context("failed to read configuration from stdin")?;
                Ok(input)
            }
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display())),
            None => anyhow::bail!("no configuration given"),
        }
    }

    pub fn render(&self, summary: &SummaryOutput) -> anyhow::Result<String> {
        let json = if self.pretty {
            summary.to_json_pretty()?
        } else {
            summary.to_json()?
        };
        Ok(json)
    }

    pub fn write_summary(&self, summary: &SummaryOutput) -> anyhow::Result<()> {
        let json = self.render(summary)?;

        match &self.output {
            Some(path) => std::fs::write(path, json + "\n")
                .with_context(|| format!("failed to write {}", path.display())),
            None => {
                let mut stdout = std::io::stdout().lock();
                writeln!(stdout, "{json}").context("failed to write summary")
            }
        }
    }
}
