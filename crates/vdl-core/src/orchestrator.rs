//! Fallback orchestration: try strategies in catalog order until one yields a
//! playable file.
//!
//! One job is processed by a single task iterating strategies sequentially;
//! concurrency comes from running jobs in parallel, each with its own
//! workspace. The loop stops at the first validated success, at the first
//! permanently-classified failure, or when the catalog is exhausted. On
//! exhaustion the most recent classified error is returned, carrying the full
//! ordered attempt log.

use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::attempt::{self, ExecutionResult};
use crate::classify::{classify, is_permanent, ErrorCode, ErrorDetail};
use crate::config::VdlConfig;
use crate::job::DownloadJob;
use crate::metadata::VideoMetadata;
use crate::proxy::ProxyPool;
use crate::source_url::validate_source_url;
use crate::strategy::{
    build_catalog, AdapterSet, AttemptContext, CatalogInputs, MetadataProbe, StrategyDescriptor,
};

/// A validated, on-disk download.
#[derive(Debug)]
pub struct Download {
    pub file: PathBuf,
    pub metadata: VideoMetadata,
}

/// One entry of the per-job attempt log.
#[derive(Debug, Clone, Serialize)]
pub struct AttemptRecord {
    pub strategy: String,
    pub error: String,
}

fn truncate_message(message: &str, max: usize) -> String {
    if message.len() <= max {
        return message.to_string();
    }
    let mut cut = max;
    while cut > 0 && !message.is_char_boundary(cut) {
        cut -= 1;
    }
    message[..cut].to_string()
}

fn attach_attempt_log(mut detail: ErrorDetail, log: &[AttemptRecord]) -> ErrorDetail {
    detail.details.insert(
        "all_strategy_errors".to_string(),
        serde_json::to_value(log).unwrap_or_default(),
    );
    detail
}

/// The fallback engine. Stateless across jobs apart from process-wide,
/// read-mostly collaborators (adapter set, cookie jar, proxy pool).
pub struct Orchestrator {
    config: VdlConfig,
    adapters: AdapterSet,
    inputs: CatalogInputs,
    cookie_jar: Option<PathBuf>,
    proxy_pool: Arc<ProxyPool>,
    prober: Option<Arc<dyn MetadataProbe>>,
}

impl Orchestrator {
    pub fn new(
        config: VdlConfig,
        adapters: AdapterSet,
        inputs: CatalogInputs,
        cookie_jar: Option<PathBuf>,
        proxy_pool: Arc<ProxyPool>,
        prober: Option<Arc<dyn MetadataProbe>>,
    ) -> Self {
        Self {
            config,
            adapters,
            inputs,
            cookie_jar,
            proxy_pool,
            prober,
        }
    }

    /// The ordered strategy list for the current configuration.
    pub fn catalog(&self) -> Vec<StrategyDescriptor> {
        build_catalog(&self.inputs)
    }

    /// Run the full fallback loop for one job.
    pub async fn submit(&self, job: &DownloadJob) -> Result<Download, ErrorDetail> {
        self.run(job, None).await
    }

    /// Run exactly one catalog entry (1-based index), for diagnostics.
    pub async fn submit_only(
        &self,
        job: &DownloadJob,
        strategy_index: usize,
    ) -> Result<Download, ErrorDetail> {
        self.run(job, Some(strategy_index)).await
    }

    /// Metadata-only probe, classified with the same error policy as downloads.
    pub async fn probe(&self, source_url: &str) -> Result<VideoMetadata, ErrorDetail> {
        if let Err(msg) = validate_source_url(source_url) {
            return Err(classify(&msg));
        }
        let Some(prober) = &self.prober else {
            return Err(ErrorDetail::permanent(
                ErrorCode::ServerError,
                "no metadata-capable mechanism is available",
            ));
        };
        prober
            .probe(source_url, self.cookie_jar.as_deref())
            .await
            .map_err(|e| classify(&format!("{:#}", e)))
    }

    fn next_egress_proxy(&self) -> Option<String> {
        self.proxy_pool
            .next_url()
            .or_else(|| self.config.proxy_url.clone())
    }

    async fn run(
        &self,
        job: &DownloadJob,
        only: Option<usize>,
    ) -> Result<Download, ErrorDetail> {
        if let Err(msg) = validate_source_url(&job.source_url) {
            return Err(classify(&msg));
        }

        let mut catalog = self.catalog();
        if let Some(index) = only {
            if index == 0 || index > catalog.len() {
                return Err(ErrorDetail::permanent(
                    ErrorCode::ServerError,
                    format!(
                        "strategy index {} out of range (catalog has {})",
                        index,
                        catalog.len()
                    ),
                ));
            }
            catalog = vec![catalog.swap_remove(index - 1)];
        }

        let total = catalog.len();
        let timeouts = self.config.attempt_timeouts();
        let deadline = Instant::now() + job.overall_deadline;
        let mut log: Vec<AttemptRecord> = Vec::new();
        let mut last_error: Option<ErrorDetail> = None;

        tracing::info!(
            job = %job.job_id,
            "starting download with {} strategies: {}",
            total,
            job.source_url
        );

        for (index, descriptor) in catalog.iter().enumerate() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                tracing::error!(job = %job.job_id, "job deadline exceeded; aborting loop");
                let detail = ErrorDetail::transient(
                    ErrorCode::DownloadTimeout,
                    "Download timed out",
                    60,
                );
                return Err(attach_attempt_log(detail, &log));
            }

            let Some(adapter) = self.adapters.get(descriptor.kind()) else {
                // Catalog said available but nothing is registered for the
                // family; record and move on like any other failure.
                log.push(AttemptRecord {
                    strategy: descriptor.name.clone(),
                    error: format!("no adapter registered for kind {}", descriptor.kind()),
                });
                continue;
            };

            tracing::info!(job = %job.job_id, "strategy {}/{}: {}", index + 1, total, descriptor.name);

            let ctx = AttemptContext {
                job,
                descriptor,
                cookie_jar: self.cookie_jar.as_deref(),
                egress_proxy: if descriptor.wants_proxy() {
                    self.next_egress_proxy()
                } else {
                    None
                },
                timeout: timeouts.ceiling(descriptor.kind().is_relayed()).min(remaining),
            };

            match attempt::execute(adapter.as_ref(), &ctx).await {
                ExecutionResult::Success { file, metadata } => {
                    tracing::info!(
                        job = %job.job_id,
                        "strategy {}/{} ({}) succeeded: {} ({} bytes)",
                        index + 1,
                        total,
                        descriptor.name,
                        file.display(),
                        metadata.size_bytes.unwrap_or(0)
                    );
                    return Ok(Download { file, metadata });
                }
                ExecutionResult::Failure { message } => {
                    tracing::warn!(
                        job = %job.job_id,
                        "strategy {}/{} ({}) failed: {}",
                        index + 1,
                        total,
                        descriptor.name,
                        truncate_message(&message, 120)
                    );
                    log.push(AttemptRecord {
                        strategy: descriptor.name.clone(),
                        error: truncate_message(&message, 200),
                    });

                    let detail = classify(&message);
                    let permanent = is_permanent(&detail);
                    last_error = Some(detail);
                    if permanent {
                        tracing::error!(
                            job = %job.job_id,
                            "permanent error; skipping remaining strategies"
                        );
                        break;
                    }
                }
            }
        }

        tracing::error!(job = %job.job_id, "all strategies failed for {}", job.source_url);

        let detail = last_error.unwrap_or_else(|| {
            ErrorDetail::transient(
                ErrorCode::ServerError,
                format!("All {} download strategies failed", total),
                300,
            )
        });
        Err(attach_attempt_log(detail, &log))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_respects_char_boundaries() {
        let msg = "aé".repeat(200);
        let cut = truncate_message(&msg, 201);
        assert!(cut.len() <= 201);
        assert!(msg.starts_with(&cut));
    }

    #[test]
    fn attempt_log_serializes_in_order() {
        let log = vec![
            AttemptRecord {
                strategy: "yt-dlp ios".into(),
                error: "HTTP 429".into(),
            },
            AttemptRecord {
                strategy: "streamlink".into(),
                error: "no streams".into(),
            },
        ];
        let detail = attach_attempt_log(
            ErrorDetail::transient(ErrorCode::ServerError, "Download failed", 120),
            &log,
        );
        let entries = detail
            .details
            .get("all_strategy_errors")
            .and_then(|v| v.as_array())
            .unwrap()
            .clone();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["strategy"], "yt-dlp ios");
        assert_eq!(entries[1]["error"], "no streams");
    }
}
