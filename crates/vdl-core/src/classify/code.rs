//! Error codes and the structured detail payload returned to callers.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// High-level classification of a download failure.
///
/// Five of these are strategy-dependent (a different mechanism might still
/// succeed); `VideoUnavailable` and `InvalidUrl` are terminal for the job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Source is private, deleted, removed, or geo-blocked.
    VideoUnavailable,
    /// Origin throttling or bot detection (429, sign-in walls).
    RateLimited,
    /// An attempt or the whole job ran past its wall-clock deadline.
    DownloadTimeout,
    /// No space left on the staging volume.
    DiskFull,
    /// Malformed or unsupported source URL.
    InvalidUrl,
    /// Connection-level failure (DNS, reset, unreachable).
    NetworkError,
    /// Anything else; assumed transient.
    ServerError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::VideoUnavailable => "VIDEO_UNAVAILABLE",
            ErrorCode::RateLimited => "RATE_LIMITED",
            ErrorCode::DownloadTimeout => "DOWNLOAD_TIMEOUT",
            ErrorCode::DiskFull => "DISK_FULL",
            ErrorCode::InvalidUrl => "INVALID_URL",
            ErrorCode::NetworkError => "NETWORK_ERROR",
            ErrorCode::ServerError => "SERVER_ERROR",
        };
        f.write_str(s)
    }
}

/// Structured failure payload produced by the classifier.
///
/// Immutable after classification except for `details`, where the orchestrator
/// appends the per-strategy attempt log before returning a final failure.
#[derive(Debug, Clone, Serialize, thiserror::Error)]
#[error("{code}: {message}")]
pub struct ErrorDetail {
    pub code: ErrorCode,
    pub message: String,
    /// True if a retry (same or different strategy, possibly later) might succeed.
    pub is_transient: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_seconds: Option<u32>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, serde_json::Value>,
}

impl ErrorDetail {
    /// A failure no strategy switch can fix.
    pub fn permanent(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            is_transient: false,
            retry_after_seconds: None,
            details: BTreeMap::new(),
        }
    }

    /// A failure worth retrying after the suggested delay.
    pub fn transient(code: ErrorCode, message: impl Into<String>, retry_after_seconds: u32) -> Self {
        Self {
            code,
            message: message.into(),
            is_transient: true,
            retry_after_seconds: Some(retry_after_seconds),
            details: BTreeMap::new(),
        }
    }

    /// Attach the raw failure message under `details.error`.
    pub fn with_raw_error(mut self, raw: &str) -> Self {
        self.details
            .insert("error".to_string(), serde_json::Value::from(raw));
        self
    }
}
