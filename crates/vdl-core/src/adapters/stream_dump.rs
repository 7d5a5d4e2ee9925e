//! Stream dump adapter: drives a streamlink subprocess. An independent
//! extraction path that works best for live streams and HLS VODs; output is a
//! raw transport stream.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::process::Stdio;

use crate::metadata::VideoMetadata;
use crate::strategy::{AdapterOutput, AttemptContext, StrategyAdapter, StrategyKind};

pub struct StreamDumpAdapter {
    bin: String,
}

impl StreamDumpAdapter {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }
}

#[async_trait]
impl StrategyAdapter for StreamDumpAdapter {
    fn kind(&self) -> StrategyKind {
        StrategyKind::StreamDump
    }

    async fn execute(&self, ctx: &AttemptContext<'_>) -> Result<AdapterOutput> {
        let dest = ctx.job.workspace().join("video.ts");

        let output = tokio::process::Command::new(&self.bin)
            .arg("--force")
            .arg("-o")
            .arg(&dest)
            .arg(&ctx.job.source_url)
            // Priority list: best first, degrade through fixed rungs.
            .arg("best,720p,480p,360p,worst")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .with_context(|| format!("failed to run {}", self.bin))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            let message = if stderr.trim().is_empty() {
                stdout.trim().to_string()
            } else {
                stderr.trim().to_string()
            };
            anyhow::bail!("{}", message);
        }

        Ok(AdapterOutput {
            file: dest,
            metadata: VideoMetadata::untitled("ts"),
        })
    }
}
