//! Relay adapter: request a tunneled stream URL from a cobalt-style API, then
//! stream-copy it into the workspace. The relay's own servers talk to the
//! origin, which sidesteps datacenter IP blocking entirely.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;

use crate::http;
use crate::metadata::VideoMetadata;
use crate::strategy::{
    AdapterOutput, AttemptContext, StrategyAdapter, StrategyKind, StrategyParams,
};

const API_TIMEOUT: Duration = Duration::from_secs(30);

pub struct RelayAdapter;

/// Pick the stream URL out of a relay API response.
fn stream_url_from_response(data: &serde_json::Value) -> Result<String> {
    let status = data.get("status").and_then(|v| v.as_str()).unwrap_or("");

    if status == "error" {
        let code = data
            .get("error")
            .map(|e| {
                e.get("code")
                    .and_then(|c| c.as_str())
                    .map(str::to_string)
                    .unwrap_or_else(|| e.to_string())
            })
            .unwrap_or_else(|| "unknown".to_string());
        anyhow::bail!("relay error: {}", code);
    }

    // "picker" responses carry multiple files; take the first.
    let url = if status == "picker" {
        data.get("picker")
            .and_then(|p| p.as_array())
            .and_then(|items| items.first())
            .and_then(|item| item.get("url"))
            .and_then(|u| u.as_str())
            .map(str::to_string)
    } else if matches!(status, "stream" | "redirect" | "tunnel") {
        data.get("url").and_then(|u| u.as_str()).map(str::to_string)
    } else {
        anyhow::bail!("relay returned unexpected status '{}'", status);
    };

    url.context("relay returned no stream URL")
}

#[async_trait]
impl StrategyAdapter for RelayAdapter {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Relay
    }

    async fn execute(&self, ctx: &AttemptContext<'_>) -> Result<AdapterOutput> {
        let StrategyParams::Relay { api_url } = &ctx.descriptor.params else {
            anyhow::bail!("descriptor {} is not a relay strategy", ctx.descriptor.name);
        };

        let api_url = api_url.clone();
        let source_url = ctx.job.source_url.clone();
        let quality = ctx.job.quality.relay_label();
        let dest = ctx.job.workspace().join("video.mp4");
        // Leave room under the attempt ceiling for the API round-trip.
        let stream_timeout = ctx
            .timeout
            .saturating_sub(API_TIMEOUT)
            .max(Duration::from_secs(60));

        let output = tokio::task::spawn_blocking(move || -> Result<AdapterOutput> {
            let body = serde_json::json!({
                "url": source_url,
                "videoQuality": quality,
                "downloadMode": "auto",
            });
            let response = http::post_json(&api_url, &body, API_TIMEOUT)
                .context("relay API request failed")?;
            let stream_url = stream_url_from_response(&response)?;

            let written = http::stream_to_file(&stream_url, &dest, stream_timeout, None)
                .context("relay stream download failed")?;
            tracing::debug!("relay streamed {} bytes", written);

            Ok(AdapterOutput {
                file: dest,
                metadata: VideoMetadata::untitled("mp4"),
            })
        })
        .await
        .context("relay task join")??;

        Ok(output)
    }
}
