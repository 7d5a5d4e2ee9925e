//! Per-request download job description and quality selection.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Canonical stem for candidate output files inside a job workspace.
/// Every adapter writes `video.<ext>`; attempt cleanup globs on this stem.
pub const OUTPUT_STEM: &str = "video";

/// Requested video quality ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Quality {
    #[serde(rename = "360p")]
    P360,
    #[serde(rename = "480p")]
    P480,
    #[default]
    #[serde(rename = "720p")]
    P720,
    #[serde(rename = "1080p")]
    P1080,
    #[serde(rename = "best")]
    Best,
}

impl Quality {
    /// Extractor format selector: progressive mp4 preferred, capped at the
    /// requested height, with fallbacks mirroring what the origin serves.
    pub fn format_selector(self) -> &'static str {
        match self {
            Quality::P360 => {
                "bestvideo[height<=360][ext=mp4]+bestaudio[ext=m4a]/best[height<=360][ext=mp4]/best"
            }
            Quality::P480 => {
                "bestvideo[height<=480][ext=mp4]+bestaudio[ext=m4a]/best[height<=480][ext=mp4]/best"
            }
            Quality::P720 => {
                "bestvideo[height<=720][ext=mp4]+bestaudio[ext=m4a]/best[height<=720][ext=mp4]/best"
            }
            Quality::P1080 => {
                "bestvideo[height<=1080][ext=mp4]+bestaudio[ext=m4a]/best[height<=1080][ext=mp4]/best"
            }
            Quality::Best => "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best",
        }
    }

    /// Maximum pixel height for stream selection against front-end APIs.
    pub fn max_height(self) -> u32 {
        match self {
            Quality::P360 => 360,
            Quality::P480 => 480,
            Quality::P720 => 720,
            Quality::P1080 => 1080,
            Quality::Best => 9999,
        }
    }

    /// Quality label understood by relay (cobalt-style) APIs.
    pub fn relay_label(self) -> &'static str {
        match self {
            Quality::P360 => "360",
            Quality::P480 => "480",
            Quality::P720 => "720",
            Quality::P1080 => "1080",
            Quality::Best => "max",
        }
    }
}

impl std::str::FromStr for Quality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "360p" => Ok(Quality::P360),
            "480p" => Ok(Quality::P480),
            "720p" => Ok(Quality::P720),
            "1080p" => Ok(Quality::P1080),
            "best" => Ok(Quality::Best),
            other => Err(format!(
                "unknown quality '{}' (expected 360p, 480p, 720p, 1080p, or best)",
                other
            )),
        }
    }
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Quality::P360 => "360p",
            Quality::P480 => "480p",
            Quality::P720 => "720p",
            Quality::P1080 => "1080p",
            Quality::Best => "best",
        };
        f.write_str(s)
    }
}

/// One download request. Owns its workspace directory exclusively for the
/// duration of the run; the TTL sweeper reclaims the directory later.
#[derive(Debug, Clone)]
pub struct DownloadJob {
    pub job_id: String,
    pub source_url: String,
    pub quality: Quality,
    /// Preferred container extension for the final file (e.g. "mp4").
    pub output_format: String,
    /// Wall-clock budget for the whole fallback run, all strategies included.
    pub overall_deadline: Duration,
    /// Exclusive scratch directory for candidate output files.
    pub workspace: PathBuf,
}

impl DownloadJob {
    /// Preferred output path inside the workspace. Adapters may land on a
    /// sibling `video.*` name; validation resolves the actual candidate.
    pub fn output_path(&self) -> PathBuf {
        self.workspace
            .join(format!("{}.{}", OUTPUT_STEM, self.output_format))
    }

    /// The workspace directory for this job.
    pub fn workspace(&self) -> &Path {
        &self.workspace
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_parses_and_round_trips() {
        for label in ["360p", "480p", "720p", "1080p", "best"] {
            let q: Quality = label.parse().unwrap();
            assert_eq!(q.to_string(), label);
        }
        assert!("4k".parse::<Quality>().is_err());
    }

    #[test]
    fn best_has_no_height_cap() {
        assert_eq!(Quality::Best.max_height(), 9999);
        assert_eq!(Quality::Best.relay_label(), "max");
    }

    #[test]
    fn format_selector_caps_height() {
        assert!(Quality::P480.format_selector().contains("height<=480"));
        assert!(!Quality::Best.format_selector().contains("height<="));
    }

    #[test]
    fn output_path_uses_canonical_stem() {
        let job = DownloadJob {
            job_id: "j1".into(),
            source_url: "https://www.youtube.com/watch?v=dQw4w9WgXcQ".into(),
            quality: Quality::default(),
            output_format: "mp4".into(),
            overall_deadline: Duration::from_secs(3600),
            workspace: PathBuf::from("/tmp/vdl/j1"),
        };
        assert_eq!(job.output_path(), PathBuf::from("/tmp/vdl/j1/video.mp4"));
    }
}
