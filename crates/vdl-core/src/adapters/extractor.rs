//! Native extractor adapter: drives a yt-dlp subprocess per player client.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;

use crate::job::OUTPUT_STEM;
use crate::metadata::VideoMetadata;
use crate::strategy::{
    AdapterOutput, AttemptContext, MetadataProbe, StrategyAdapter, StrategyKind, StrategyParams,
};
use crate::workspace;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub struct ExtractorAdapter {
    bin: String,
}

impl ExtractorAdapter {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }

    fn common_args(&self, args: &mut Vec<String>) {
        for a in [
            "--no-playlist",
            "--no-warnings",
            "--quiet",
            "--retries",
            "2",
            "--fragment-retries",
            "2",
            "--socket-timeout",
            "30",
            "--user-agent",
            USER_AGENT,
            "--add-header",
            "Accept-Language: en-US,en;q=0.9",
        ] {
            args.push(a.to_string());
        }
    }

    fn download_args(&self, ctx: &AttemptContext<'_>) -> Result<Vec<String>> {
        let StrategyParams::Extractor {
            player_client,
            use_cookies,
            skip_webpage,
            ..
        } = &ctx.descriptor.params
        else {
            anyhow::bail!("descriptor {} is not an extractor strategy", ctx.descriptor.name);
        };
        let (player_client, use_cookies, skip_webpage) = (*player_client, *use_cookies, *skip_webpage);

        let mut args = Vec::new();
        self.common_args(&mut args);

        let mut extractor_args = format!("youtube:player_client={}", player_client);
        if skip_webpage {
            extractor_args.push_str(";player_skip=webpage");
        }
        args.push("--extractor-args".to_string());
        args.push(extractor_args);

        if use_cookies {
            let jar = ctx
                .cookie_jar
                .context("strategy wants cookies but no jar is loaded")?;
            args.push("--cookies".to_string());
            args.push(jar.display().to_string());
        }
        if let Some(proxy) = &ctx.egress_proxy {
            args.push("--proxy".to_string());
            args.push(proxy.clone());
        }

        args.push("-f".to_string());
        args.push(ctx.job.quality.format_selector().to_string());
        args.push("--merge-output-format".to_string());
        args.push(ctx.job.output_format.clone());
        args.push("--write-info-json".to_string());
        args.push("-o".to_string());
        args.push(
            ctx.job
                .workspace()
                .join(format!("{}.%(ext)s", OUTPUT_STEM))
                .display()
                .to_string(),
        );
        args.push(ctx.job.source_url.clone());
        Ok(args)
    }
}

/// Map a yt-dlp info dict onto the normalized metadata shape. Unknown numeric
/// fields stay absent rather than defaulting to fabricated values.
fn metadata_from_info(info: &serde_json::Value) -> VideoMetadata {
    VideoMetadata {
        title: info
            .get("title")
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown")
            .to_string(),
        duration_seconds: info.get("duration").and_then(|v| v.as_f64()).unwrap_or(0.0),
        width: info.get("width").and_then(|v| v.as_u64()).map(|v| v as u32),
        height: info.get("height").and_then(|v| v.as_u64()).map(|v| v as u32),
        size_bytes: info
            .get("filesize")
            .and_then(|v| v.as_u64())
            .or_else(|| info.get("filesize_approx").and_then(|v| v.as_u64())),
        format: info
            .get("ext")
            .and_then(|v| v.as_str())
            .unwrap_or("mp4")
            .to_string(),
        video_id: info.get("id").and_then(|v| v.as_str()).map(str::to_string),
        channel_id: info
            .get("channel_id")
            .and_then(|v| v.as_str())
            .map(str::to_string),
        channel_name: info
            .get("channel")
            .or_else(|| info.get("uploader"))
            .and_then(|v| v.as_str())
            .map(str::to_string),
        upload_date: info
            .get("upload_date")
            .and_then(|v| v.as_str())
            .map(str::to_string),
        view_count: info.get("view_count").and_then(|v| v.as_u64()),
        like_count: info.get("like_count").and_then(|v| v.as_u64()),
        is_live: info.get("is_live").and_then(|v| v.as_bool()).unwrap_or(false),
        is_private: false,
    }
}

async fn run_tool(bin: &str, args: &[String]) -> Result<std::process::Output> {
    tokio::process::Command::new(bin)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .with_context(|| format!("failed to run {}", bin))
}

#[async_trait]
impl StrategyAdapter for ExtractorAdapter {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Extractor
    }

    async fn execute(&self, ctx: &AttemptContext<'_>) -> Result<AdapterOutput> {
        let args = self.download_args(ctx)?;
        tracing::debug!("running {} with {} args", self.bin, args.len());

        let output = run_tool(&self.bin, &args).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("{}", stderr.trim());
        }

        // Metadata lands next to the video as video.info.json; consume and
        // remove it so it is never mistaken for a candidate file.
        let info_path = ctx
            .job
            .workspace()
            .join(format!("{}.info.json", OUTPUT_STEM));
        let metadata = match std::fs::read(&info_path) {
            Ok(bytes) => {
                let _ = std::fs::remove_file(&info_path);
                serde_json::from_slice::<serde_json::Value>(&bytes)
                    .map(|info| metadata_from_info(&info))
                    .unwrap_or_else(|_| VideoMetadata::untitled(&ctx.job.output_format))
            }
            Err(_) => VideoMetadata::untitled(&ctx.job.output_format),
        };

        // The extractor may merge into a different container than requested;
        // resolve the actual candidate instead of trusting the preferred name.
        let preferred = ctx.job.output_path();
        let file = if preferred.exists() {
            preferred
        } else {
            workspace::best_candidate(ctx.job.workspace())
                .context("file not found on disk after extractor run")?
        };

        Ok(AdapterOutput { file, metadata })
    }
}

#[async_trait]
impl MetadataProbe for ExtractorAdapter {
    async fn probe(&self, source_url: &str, cookie_jar: Option<&Path>) -> Result<VideoMetadata> {
        let mut args = Vec::new();
        self.common_args(&mut args);
        args.push("--extractor-args".to_string());
        if cookie_jar.is_some() {
            args.push("youtube:player_client=ios,tv_embedded,mweb".to_string());
        } else {
            args.push("youtube:player_client=ios,tv_embedded,mweb;player_skip=webpage".to_string());
        }
        if let Some(jar) = cookie_jar {
            args.push("--cookies".to_string());
            args.push(jar.display().to_string());
        }
        args.push("-J".to_string());
        args.push(source_url.to_string());

        let output = run_tool(&self.bin, &args).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("{}", stderr.trim());
        }
        let info: serde_json::Value =
            serde_json::from_slice(&output.stdout).context("extractor emitted invalid JSON")?;
        Ok(metadata_from_info(&info))
    }
}
