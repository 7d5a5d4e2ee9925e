//! One strategy attempt: workspace cleanup, hard deadline, error isolation,
//! and on-disk validation of the candidate file.

use std::time::Duration;

use crate::metadata::VideoMetadata;
use crate::strategy::{AttemptContext, StrategyAdapter};
use crate::workspace;

/// Normalized outcome of one attempt. Adapter errors never cross this
/// boundary as errors; they become `Failure` messages for classification.
#[derive(Debug)]
pub enum ExecutionResult {
    Success {
        file: std::path::PathBuf,
        metadata: VideoMetadata,
    },
    Failure {
        message: String,
    },
}

impl ExecutionResult {
    pub fn failure(message: impl Into<String>) -> Self {
        ExecutionResult::Failure {
            message: message.into(),
        }
    }
}

fn format_ceiling(ceiling: Duration) -> String {
    let secs = ceiling.as_secs();
    if secs >= 120 && secs % 60 == 0 {
        format!("{} minutes", secs / 60)
    } else {
        format!("{} seconds", secs)
    }
}

/// Run one adapter invocation under the attempt ceiling.
///
/// Before the adapter runs, residual candidate files from a previous attempt
/// are deleted, so the workspace holds at most one candidate at any time. On
/// ceiling expiry the attempt is reported failed regardless of adapter
/// state; a partially written file is left for the next iteration's cleanup
/// and never treated as success.
pub async fn execute(adapter: &dyn StrategyAdapter, ctx: &AttemptContext<'_>) -> ExecutionResult {
    let removed = workspace::clean_candidates(ctx.job.workspace());
    if removed > 0 {
        tracing::debug!(
            job = %ctx.job.job_id,
            "removed {} residual candidate file(s) before attempt",
            removed
        );
    }

    let output = match tokio::time::timeout(ctx.timeout, adapter.execute(ctx)).await {
        Err(_) => {
            return ExecutionResult::failure(format!(
                "{} timed out after {}",
                ctx.descriptor.name,
                format_ceiling(ctx.timeout)
            ));
        }
        Ok(Err(e)) => return ExecutionResult::failure(format!("{:#}", e)),
        Ok(Ok(output)) => output,
    };

    // Never trust the adapter's claim: the candidate must exist and be non-empty.
    let size = match std::fs::metadata(&output.file) {
        Ok(meta) if meta.len() > 0 => meta.len(),
        Ok(_) => {
            return ExecutionResult::failure(format!(
                "{}: produced an empty file",
                ctx.descriptor.name
            ));
        }
        Err(_) => {
            return ExecutionResult::failure(format!(
                "{}: file not found on disk after download",
                ctx.descriptor.name
            ));
        }
    };

    let mut metadata = output.metadata;
    metadata.size_bytes = Some(size);
    ExecutionResult::Success {
        file: output.file,
        metadata,
    }
}
