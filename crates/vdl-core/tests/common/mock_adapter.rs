//! Scripted adapters for driving the orchestrator without any network or
//! external tools. Behaviors are keyed by descriptor display name; every
//! invocation is recorded together with whether the workspace still held
//! candidate files when the adapter ran.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use vdl_core::metadata::VideoMetadata;
use vdl_core::strategy::{
    AdapterOutput, AdapterSet, AttemptContext, StrategyAdapter, StrategyKind,
};

/// What a scripted strategy does when invoked.
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Fail with the given raw message.
    Fail(String),
    /// Write a stray partial file, then fail.
    FailWithDebris(String),
    /// Write `video.mp4` with this many bytes and report success.
    Produce(usize),
    /// Sleep this long, then fail.
    Hang(Duration),
}

/// One recorded invocation: descriptor name + whether candidate files were
/// present in the workspace when the adapter started.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub strategy: String,
    pub saw_candidates: bool,
}

pub type Script = Arc<Mutex<HashMap<String, Behavior>>>;
pub type Invocations = Arc<Mutex<Vec<Invocation>>>;

pub struct ScriptedAdapter {
    kind: StrategyKind,
    script: Script,
    invocations: Invocations,
}

fn workspace_has_candidates(dir: &std::path::Path) -> bool {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries.flatten().any(|e| {
                e.file_name()
                    .to_str()
                    .map(|n| n.starts_with("video."))
                    .unwrap_or(false)
            })
        })
        .unwrap_or(false)
}

#[async_trait]
impl StrategyAdapter for ScriptedAdapter {
    fn kind(&self) -> StrategyKind {
        self.kind
    }

    async fn execute(&self, ctx: &AttemptContext<'_>) -> Result<AdapterOutput> {
        let name = ctx.descriptor.name.clone();
        self.invocations.lock().unwrap().push(Invocation {
            strategy: name.clone(),
            saw_candidates: workspace_has_candidates(ctx.job.workspace()),
        });

        let behavior = self.script.lock().unwrap().get(&name).cloned();
        match behavior {
            None => anyhow::bail!("no scripted behavior for {}", name),
            Some(Behavior::Fail(message)) => anyhow::bail!("{}", message),
            Some(Behavior::FailWithDebris(message)) => {
                std::fs::write(ctx.job.workspace().join("video.part"), b"partial")?;
                anyhow::bail!("{}", message)
            }
            Some(Behavior::Produce(len)) => {
                let file = ctx.job.output_path();
                std::fs::write(&file, vec![0u8; len])?;
                Ok(AdapterOutput {
                    file,
                    metadata: VideoMetadata::untitled("mp4"),
                })
            }
            Some(Behavior::Hang(delay)) => {
                tokio::time::sleep(delay).await;
                anyhow::bail!("hung strategy woke up")
            }
        }
    }
}

/// Adapter set covering the tool-free catalog families (relay + front-end),
/// all driven by one shared script and invocation log.
pub fn scripted_adapters(script: &Script, invocations: &Invocations) -> AdapterSet {
    let mut adapters = AdapterSet::new();
    for kind in [StrategyKind::Relay, StrategyKind::Frontend] {
        adapters.register(Arc::new(ScriptedAdapter {
            kind,
            script: Arc::clone(script),
            invocations: Arc::clone(invocations),
        }));
    }
    adapters
}
