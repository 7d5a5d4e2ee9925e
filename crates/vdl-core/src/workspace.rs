//! Per-job workspace directories and TTL-based reclamation.
//!
//! Each job owns one scratch directory under the downloads root for its whole
//! run; nothing else writes into it. Finished workspaces are reclaimed by a
//! background sweeper once their files exceed the TTL.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use crate::config::VdlConfig;
use crate::job::OUTPUT_STEM;

/// Outcome of one sweep pass.
#[derive(Debug, Default, Clone, Copy)]
pub struct SweepStats {
    pub removed_jobs: usize,
    pub removed_bytes: u64,
}

/// Manages the downloads root and hands out exclusive per-job directories.
#[derive(Debug, Clone)]
pub struct Workspaces {
    root: PathBuf,
    file_ttl: Duration,
    cleanup_interval: Duration,
}

impl Workspaces {
    pub fn new(cfg: &VdlConfig) -> Self {
        Self {
            root: cfg.downloads_dir.clone(),
            file_ttl: Duration::from_secs(cfg.file_ttl_secs),
            cleanup_interval: Duration::from_secs(cfg.cleanup_interval_secs),
        }
    }

    /// Create the downloads root if missing.
    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("create downloads root {}", self.root.display()))?;
        tracing::info!(
            "workspaces at {} (ttl {}s)",
            self.root.display(),
            self.file_ttl.as_secs()
        );
        Ok(())
    }

    /// Create (if needed) and return the exclusive directory for a job.
    /// Job ids are restricted to a filename-safe alphabet.
    pub fn job_dir(&self, job_id: &str) -> Result<PathBuf> {
        if job_id.is_empty()
            || !job_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            anyhow::bail!("invalid job id: {:?}", job_id);
        }
        let dir = self.root.join(job_id);
        fs::create_dir_all(&dir)
            .with_context(|| format!("create job workspace {}", dir.display()))?;
        Ok(dir)
    }

    /// Remove every job directory containing a file older than the TTL.
    pub fn sweep_expired(&self) -> Result<SweepStats> {
        let mut stats = SweepStats::default();
        if !self.root.exists() {
            return Ok(stats);
        }

        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let dir = entry.path();
            if !dir.is_dir() {
                continue;
            }
            if !dir_has_expired_file(&dir, self.file_ttl) {
                continue;
            }
            let size = dir_size(&dir);
            match fs::remove_dir_all(&dir) {
                Ok(()) => {
                    stats.removed_jobs += 1;
                    stats.removed_bytes += size;
                    tracing::info!(
                        "swept expired workspace {} ({} bytes)",
                        dir.display(),
                        size
                    );
                }
                Err(e) => tracing::warn!("failed to sweep {}: {}", dir.display(), e),
            }
        }
        Ok(stats)
    }

    /// Percentage of the downloads volume in use, for health reporting.
    #[cfg(unix)]
    pub fn disk_usage_percent(&self) -> f64 {
        use std::ffi::CString;
        use std::os::unix::ffi::OsStrExt;

        let Ok(path) = CString::new(self.root.as_os_str().as_bytes()) else {
            return 0.0;
        };
        let mut stat: libc::statvfs = unsafe { std::mem::zeroed() };
        let rc = unsafe { libc::statvfs(path.as_ptr(), &mut stat) };
        if rc != 0 || stat.f_blocks == 0 {
            return 0.0;
        }
        let total = stat.f_blocks as f64;
        let avail = stat.f_bavail as f64;
        (total - avail) / total * 100.0
    }

    #[cfg(not(unix))]
    pub fn disk_usage_percent(&self) -> f64 {
        0.0
    }

    /// Spawn the background sweeper; runs until the handle is aborted.
    pub fn spawn_sweeper(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let ws = Arc::clone(self);
        tokio::spawn(async move {
            tracing::info!(
                "sweeper running every {}s",
                ws.cleanup_interval.as_secs()
            );
            loop {
                tokio::time::sleep(ws.cleanup_interval).await;
                match ws.sweep_expired() {
                    Ok(stats) if stats.removed_jobs > 0 => {
                        tracing::info!(
                            "sweep removed {} job(s), {} bytes",
                            stats.removed_jobs,
                            stats.removed_bytes
                        );
                    }
                    Ok(_) => {}
                    Err(e) => tracing::warn!("sweep failed: {}", e),
                }
            }
        })
    }
}

fn dir_has_expired_file(dir: &Path, ttl: Duration) -> bool {
    let now = SystemTime::now();
    let Ok(entries) = fs::read_dir(dir) else {
        return false;
    };
    for entry in entries.flatten() {
        let Ok(meta) = entry.metadata() else { continue };
        if !meta.is_file() {
            continue;
        }
        if let Ok(modified) = meta.modified() {
            if now.duration_since(modified).unwrap_or_default() > ttl {
                return true;
            }
        }
    }
    false
}

fn dir_size(dir: &Path) -> u64 {
    let Ok(entries) = fs::read_dir(dir) else {
        return 0;
    };
    entries
        .flatten()
        .filter_map(|e| e.metadata().ok())
        .filter(|m| m.is_file())
        .map(|m| m.len())
        .sum()
}

/// Delete residual candidate output files (`video.*`) from a workspace.
/// Deletion errors are ignored. Returns the number of files removed.
pub fn clean_candidates(dir: &Path) -> usize {
    let Ok(entries) = fs::read_dir(dir) else {
        return 0;
    };
    let mut removed = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let is_candidate = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.starts_with(&format!("{}.", OUTPUT_STEM)))
            .unwrap_or(false);
        if is_candidate && fs::remove_file(&path).is_ok() {
            removed += 1;
        }
    }
    removed
}

/// Largest candidate output file in a workspace, if any. Extractors may land
/// on a different extension than requested (e.g. merged `.mkv`), so the
/// validator resolves the actual file rather than trusting the adapter.
pub fn best_candidate(dir: &Path) -> Option<PathBuf> {
    let entries = fs::read_dir(dir).ok()?;
    entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with(&format!("{}.", OUTPUT_STEM)))
                .unwrap_or(false)
        })
        .max_by_key(|p| fs::metadata(p).map(|m| m.len()).unwrap_or(0))
}
