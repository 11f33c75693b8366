//! CLI for seqfetch. Turns flags or a pasted link into a validated
//! `FetchRequest` and drives the core engine.

mod commands;
mod link;
mod source;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use seqfetch_core::config;
use seqfetch_core::engine::EngineOptions;
use seqfetch_core::http::{BrowserHeaders, CurlSource};
use std::path::PathBuf;
use std::time::Duration;

use commands::{run_completions, run_fetch, run_url};
pub use source::{ModeArg, SourceArgs};

/// Top-level CLI for seqfetch.
#[derive(Debug, Parser)]
#[command(name = "seqfetch")]
#[command(about = "Fetch a numbered image sequence from a CDN origin", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Probe indices upward from --start and save every image found.
    Fetch {
        #[command(flatten)]
        source: SourceArgs,

        /// Output directory (created if missing).
        #[arg(long, short, value_name = "DIR")]
        out: PathBuf,

        /// First index to probe.
        #[arg(long, default_value = "1", value_name = "N")]
        start: u64,

        /// Stop after N consecutive indices with no image (default from config).
        #[arg(long, value_name = "N")]
        threshold: Option<u32>,

        /// JPEG quality 1-100 for re-encoded output (default from config).
        #[arg(long, value_name = "Q", value_parser = clap::value_parser!(u8).range(1..=100))]
        quality: Option<u8>,

        /// Print progress events as JSON lines instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Print the address that would be fetched for one index and extension.
    Url {
        #[command(flatten)]
        source: SourceArgs,

        /// Index to compose.
        #[arg(long, default_value = "1", value_name = "N")]
        index: u64,

        /// Candidate extension, e.g. ".jpg".
        #[arg(long, default_value = ".jpg", value_name = "EXT")]
        ext: String,
    },

    /// Print shell completions to stdout.
    Completions {
        /// Target shell.
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        if let CliCommand::Completions { shell } = cli.command {
            run_completions(shell);
            return Ok(());
        }

        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Fetch {
                source,
                out,
                start,
                threshold,
                quality,
                json,
            } => {
                let request = source.to_request(start, cfg.digit_width)?;
                let mut options =
                    EngineOptions::from_config(&cfg).context("invalid extensions in config")?;
                if let Some(t) = threshold {
                    options.failure_threshold = t.max(1);
                }
                if let Some(q) = quality {
                    options.output.jpeg_quality = q;
                }
                let http = CurlSource::new(
                    Duration::from_secs(cfg.request_timeout_secs),
                    BrowserHeaders::from(&cfg.headers),
                );
                run_fetch(request, &out, options, http, json).await?;
            }
            CliCommand::Url { source, index, ext } => {
                let request = source.to_request(1, cfg.digit_width)?;
                run_url(&request, index, &ext)?;
            }
            CliCommand::Completions { .. } => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
