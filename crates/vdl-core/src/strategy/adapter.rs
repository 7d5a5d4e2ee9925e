//! Adapter contract: one retrieval mechanism behind one async entry point.
//!
//! The engine only depends on this trait and does not know about extractor
//! binaries, relay APIs, or any other concrete mechanism.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use super::descriptor::{StrategyDescriptor, StrategyKind};
use crate::job::DownloadJob;
use crate::metadata::VideoMetadata;

/// Everything one attempt may consult. Borrowed for the duration of the call.
pub struct AttemptContext<'a> {
    pub job: &'a DownloadJob,
    pub descriptor: &'a StrategyDescriptor,
    /// Netscape cookie jar on disk, when credentials were supplied.
    pub cookie_jar: Option<&'a Path>,
    /// Egress proxy resolved for this attempt (rotating pool entry or the
    /// static proxy), for descriptors that want one.
    pub egress_proxy: Option<String>,
    /// The wall-clock ceiling the runner enforces; adapters size their own
    /// internal transfer timeouts to fit under it.
    pub timeout: Duration,
}

/// Candidate result of one adapter run: where the file landed and what the
/// mechanism could observe about it. The attempt runner re-validates the file
/// and overrides the size from disk.
#[derive(Debug)]
pub struct AdapterOutput {
    pub file: PathBuf,
    pub metadata: VideoMetadata,
}

/// One retrieval mechanism. Implementations report all failures as errors;
/// the attempt runner normalizes them into `ExecutionResult::Failure` and
/// nothing propagates past that boundary.
#[async_trait]
pub trait StrategyAdapter: Send + Sync {
    fn kind(&self) -> StrategyKind;

    async fn execute(&self, ctx: &AttemptContext<'_>) -> Result<AdapterOutput>;
}

/// Metadata-only probe (no download). Implemented by mechanisms that can
/// inspect the source cheaply; failures are classified like download failures.
#[async_trait]
pub trait MetadataProbe: Send + Sync {
    async fn probe(&self, source_url: &str, cookie_jar: Option<&Path>) -> Result<VideoMetadata>;
}

/// Registry of adapters keyed by family. Built once at startup; the
/// orchestrator resolves each descriptor's adapter through it.
#[derive(Default)]
pub struct AdapterSet {
    adapters: HashMap<StrategyKind, Arc<dyn StrategyAdapter>>,
}

impl AdapterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter under its own kind, replacing any previous one.
    pub fn register(&mut self, adapter: Arc<dyn StrategyAdapter>) {
        self.adapters.insert(adapter.kind(), adapter);
    }

    pub fn get(&self, kind: StrategyKind) -> Option<Arc<dyn StrategyAdapter>> {
        self.adapters.get(&kind).cloned()
    }
}
