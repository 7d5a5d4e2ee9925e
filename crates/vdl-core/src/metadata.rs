//! Normalized video metadata shared by all strategy adapters.

use serde::{Deserialize, Serialize};

/// Metadata for a retrieved video. Adapters populate what they can observe;
/// everything beyond title/duration/format/liveness is optional and absent
/// rather than fabricated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub title: String,
    pub duration_seconds: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    pub format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub like_count: Option<u64>,
    pub is_live: bool,
    pub is_private: bool,
}

impl VideoMetadata {
    /// Minimal metadata for adapters that cannot observe anything beyond the
    /// container format (relay downloads, raw stream dumps).
    pub fn untitled(format: impl Into<String>) -> Self {
        Self {
            title: "Unknown".to_string(),
            duration_seconds: 0.0,
            width: None,
            height: None,
            size_bytes: None,
            format: format.into(),
            video_id: None,
            channel_id: None,
            channel_name: None,
            upload_date: None,
            view_count: None,
            like_count: None,
            is_live: false,
            is_private: false,
        }
    }
}
