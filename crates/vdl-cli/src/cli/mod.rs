//! CLI for the VDL download service.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use vdl_core::config;
use vdl_core::job::Quality;

use commands::{run_fetch, run_info, run_strategies, run_sweep, FetchArgs};

/// Top-level CLI for the VDL download service.
#[derive(Debug, Parser)]
#[command(name = "vdl")]
#[command(about = "VDL: multi-strategy video downloader with automatic fallback", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download a video, trying every applicable strategy in order.
    Fetch {
        /// Source video URL.
        url: String,

        /// Quality ceiling: 360p, 480p, 720p, 1080p, or best.
        #[arg(long)]
        quality: Option<Quality>,

        /// Container extension for the final file (default from config).
        #[arg(long)]
        format: Option<String>,

        /// Job identifier; generated when omitted.
        #[arg(long)]
        job_id: Option<String>,

        /// Overall deadline in seconds for the whole fallback run.
        #[arg(long)]
        timeout: Option<u64>,

        /// Run only this strategy (1-based index from `vdl strategies`).
        #[arg(long, value_name = "N")]
        only: Option<usize>,

        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Fetch metadata for a video without downloading it.
    Info {
        /// Source video URL.
        url: String,

        /// Print the metadata as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List the strategy catalog for the current configuration.
    Strategies,

    /// Reclaim expired job workspaces.
    Sweep {
        /// Keep sweeping on the configured interval instead of exiting.
        #[arg(long)]
        watch: bool,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Fetch {
                url,
                quality,
                format,
                job_id,
                timeout,
                only,
                json,
            } => {
                run_fetch(
                    &cfg,
                    FetchArgs {
                        url,
                        quality,
                        format,
                        job_id,
                        timeout,
                        only,
                        json,
                    },
                )
                .await?
            }
            CliCommand::Info { url, json } => run_info(&cfg, &url, json).await?,
            CliCommand::Strategies => run_strategies(&cfg).await?,
            CliCommand::Sweep { watch } => run_sweep(&cfg, watch).await?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
