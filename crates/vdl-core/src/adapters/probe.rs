//! Tool availability detection and engine bootstrap.
//!
//! Availability is probed once at process start; the catalog consumes the
//! resulting flags as availability predicates, so strategies for missing
//! tools are silently omitted instead of failing at attempt time.

use anyhow::Result;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{self, ToolsConfig, VdlConfig};
use crate::proxy::ProxyPool;
use crate::strategy::{AdapterSet, CatalogInputs, MetadataProbe};

use super::{BrowserAdapter, ExtractorAdapter, FrontendAdapter, RelayAdapter, StreamDumpAdapter};

const VERSION_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Which optional tool families responded to a version probe.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToolAvailability {
    pub extractor: bool,
    pub stream_dump: bool,
    pub browser: bool,
}

async fn version_probe(bin: &str) -> bool {
    let child = tokio::process::Command::new(bin)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .output();
    match tokio::time::timeout(VERSION_PROBE_TIMEOUT, child).await {
        Ok(Ok(out)) => out.status.success(),
        _ => false,
    }
}

/// Probe the configured tools. Missing tools are logged, not fatal; the
/// relay and front-end families need no local tooling.
pub async fn detect_tools(tools: &ToolsConfig) -> ToolAvailability {
    let extractor = version_probe(&tools.ytdlp_bin).await;
    if !extractor {
        tracing::warn!(
            "{} not found; extractor strategies unavailable",
            tools.ytdlp_bin
        );
    }
    let stream_dump = version_probe(&tools.streamlink_bin).await;
    if !stream_dump {
        tracing::warn!(
            "{} not found; stream dump strategy unavailable",
            tools.streamlink_bin
        );
    }
    let browser = tools.capture_cmd.is_some();

    ToolAvailability {
        extractor,
        stream_dump,
        browser,
    }
}

/// Everything the orchestrator needs, assembled once at startup.
pub struct Bootstrap {
    pub adapters: AdapterSet,
    pub inputs: CatalogInputs,
    pub cookie_jar: Option<PathBuf>,
    pub prober: Option<Arc<dyn MetadataProbe>>,
}

/// Load credentials, probe tools, and register one adapter per available
/// family.
pub async fn bootstrap(cfg: &VdlConfig, proxy_pool: &ProxyPool) -> Result<Bootstrap> {
    let cookie_jar = config::load_cookie_jar()?;
    let tools = cfg.tools();
    let availability = detect_tools(&tools).await;

    let mut adapters = AdapterSet::new();
    adapters.register(Arc::new(RelayAdapter));
    adapters.register(Arc::new(FrontendAdapter));

    let mut prober: Option<Arc<dyn MetadataProbe>> = None;
    if availability.extractor {
        let extractor = Arc::new(ExtractorAdapter::new(tools.ytdlp_bin.clone()));
        prober = Some(extractor.clone());
        adapters.register(extractor);
    }
    if availability.stream_dump {
        adapters.register(Arc::new(StreamDumpAdapter::new(tools.streamlink_bin.clone())));
    }
    if availability.browser {
        if let Some(adapter) = tools
            .capture_cmd
            .as_deref()
            .and_then(BrowserAdapter::from_command_line)
        {
            adapters.register(Arc::new(adapter));
        }
    }

    let inputs = CatalogInputs {
        has_cookies: cookie_jar.is_some(),
        proxy_configured: cfg.proxy_url.is_some() || proxy_pool.is_configured(),
        extractor_available: availability.extractor,
        stream_dump_available: availability.stream_dump,
        browser_available: availability.browser,
    };

    Ok(Bootstrap {
        adapters,
        inputs,
        cookie_jar,
        prober,
    })
}
