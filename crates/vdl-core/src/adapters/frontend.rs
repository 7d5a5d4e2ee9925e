//! Alternate front-end adapter: fetch stream descriptors from an
//! Invidious-style instance with `local=true`, so the instance proxies the
//! stream through its own servers, then stream-copy the best fit.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;

use crate::http;
use crate::metadata::VideoMetadata;
use crate::source_url::video_id_from_url;
use crate::strategy::{
    AdapterOutput, AttemptContext, StrategyAdapter, StrategyKind, StrategyParams,
};

const API_TIMEOUT: Duration = Duration::from_secs(30);

pub struct FrontendAdapter;

/// Parse a stream height from "1280x720" or "720p" shapes.
fn stream_height(stream: &serde_json::Value) -> Option<u32> {
    let res = stream.get("resolution").and_then(|v| v.as_str())?;
    if let Some((_, h)) = res.split_once('x') {
        return h.parse().ok();
    }
    res.trim_end_matches('p').parse().ok()
}

/// Highest-resolution stream at or below the cap; falls back to the last
/// listed stream when nothing fits.
fn pick_stream(streams: &[serde_json::Value], max_height: u32) -> Option<&serde_json::Value> {
    let mut best: Option<(&serde_json::Value, u32)> = None;
    for stream in streams {
        if let Some(h) = stream_height(stream) {
            if h <= max_height && best.map(|(_, bh)| h > bh).unwrap_or(true) {
                best = Some((stream, h));
            }
        }
    }
    best.map(|(s, _)| s).or_else(|| streams.last())
}

#[async_trait]
impl StrategyAdapter for FrontendAdapter {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Frontend
    }

    async fn execute(&self, ctx: &AttemptContext<'_>) -> Result<AdapterOutput> {
        let StrategyParams::Frontend { instance } = &ctx.descriptor.params else {
            anyhow::bail!(
                "descriptor {} is not a front-end strategy",
                ctx.descriptor.name
            );
        };

        let video_id = video_id_from_url(&ctx.job.source_url).with_context(|| {
            format!("cannot extract video id from URL: {}", ctx.job.source_url)
        })?;

        let api_url = format!("{}/api/v1/videos/{}?local=true", instance, video_id);
        let max_height = ctx.job.quality.max_height();
        let dest = ctx.job.workspace().join("video.mp4");
        let stream_timeout = ctx
            .timeout
            .saturating_sub(API_TIMEOUT)
            .max(Duration::from_secs(60));

        let output = tokio::task::spawn_blocking(move || -> Result<AdapterOutput> {
            let data = http::get_json(&api_url, API_TIMEOUT, &[])
                .context("front-end API request failed")?;
            if let Some(err) = data.get("error").and_then(|v| v.as_str()) {
                anyhow::bail!("front-end error: {}", err);
            }

            let streams: Vec<serde_json::Value> = data
                .get("formatStreams")
                .and_then(|v| v.as_array())
                .cloned()
                .unwrap_or_default();
            if streams.is_empty() {
                anyhow::bail!("front-end listed no progressive streams");
            }
            let stream =
                pick_stream(&streams, max_height).context("front-end listed no usable stream")?;
            let stream_url = stream
                .get("url")
                .and_then(|v| v.as_str())
                .context("front-end stream has no URL")?;

            let written = http::stream_to_file(stream_url, &dest, stream_timeout, None)
                .context("front-end stream download failed")?;
            tracing::debug!("front-end streamed {} bytes", written);

            let mut metadata = VideoMetadata::untitled("mp4");
            if let Some(title) = data.get("title").and_then(|v| v.as_str()) {
                metadata.title = title.to_string();
            }
            metadata.duration_seconds = data
                .get("lengthSeconds")
                .and_then(|v| v.as_f64())
                .unwrap_or(0.0);
            metadata.view_count = data
                .get("viewCount")
                .and_then(|v| v.as_str().map(|s| s.parse().ok()).unwrap_or(v.as_u64()));
            metadata.video_id = Some(video_id);

            Ok(AdapterOutput {
                file: dest,
                metadata,
            })
        })
        .await
        .context("front-end task join")??;

        Ok(output)
    }
}
