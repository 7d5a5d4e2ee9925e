//! Browser capture adapter: drives a configured external helper that renders
//! the page in a real browser, captures the signed CDN URL from network
//! responses, and downloads it in the same session.
//!
//! Contract: the helper command is invoked with the source URL and the output
//! path appended; it exits zero once the file is fully written.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::process::Stdio;

use crate::metadata::VideoMetadata;
use crate::strategy::{AdapterOutput, AttemptContext, StrategyAdapter, StrategyKind};

pub struct BrowserAdapter {
    command: Vec<String>,
}

impl BrowserAdapter {
    /// Build from a whitespace-split command line; `None` for an empty one.
    pub fn from_command_line(cmd: &str) -> Option<Self> {
        let command: Vec<String> = cmd.split_whitespace().map(str::to_string).collect();
        if command.is_empty() {
            return None;
        }
        Some(Self { command })
    }
}

#[async_trait]
impl StrategyAdapter for BrowserAdapter {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Browser
    }

    async fn execute(&self, ctx: &AttemptContext<'_>) -> Result<AdapterOutput> {
        let dest = ctx.job.workspace().join("video.mp4");

        let output = tokio::process::Command::new(&self.command[0])
            .args(&self.command[1..])
            .arg(&ctx.job.source_url)
            .arg(&dest)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .with_context(|| format!("failed to run capture helper {}", self.command[0]))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("capture helper failed: {}", stderr.trim());
        }

        Ok(AdapterOutput {
            file: dest,
            metadata: VideoMetadata::untitled(&ctx.job.output_format),
        })
    }
}
