//! Strategy descriptor: one concrete retrieval mechanism instantiation.

use serde::Serialize;
use std::fmt;

/// Adapter family a descriptor dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Native extractor subprocess (yt-dlp player clients).
    Extractor,
    /// Proxy front-end API that tunnels the stream through its own servers.
    Relay,
    /// Alternate front-end instance that proxies origin streams.
    Frontend,
    /// Independent stream extraction subprocess (streamlink).
    StreamDump,
    /// Browser-automation capture helper.
    Browser,
}

impl StrategyKind {
    /// Families that relay through a third-party instance; these get the
    /// longer proxied attempt ceiling (one extra API hop).
    pub fn is_relayed(self) -> bool {
        matches!(self, StrategyKind::Relay | StrategyKind::Frontend)
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StrategyKind::Extractor => "extractor",
            StrategyKind::Relay => "relay",
            StrategyKind::Frontend => "frontend",
            StrategyKind::StreamDump => "stream_dump",
            StrategyKind::Browser => "browser",
        };
        f.write_str(s)
    }
}

/// Family-specific parameters. A closed set: the orchestrator never inspects
/// these, only the matching adapter does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyParams {
    Extractor {
        player_client: &'static str,
        use_cookies: bool,
        skip_webpage: bool,
        via_proxy: bool,
    },
    Relay {
        api_url: String,
    },
    Frontend {
        instance: String,
    },
    StreamDump,
    Browser,
}

/// One entry of the catalog. Immutable once the catalog is built for a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyDescriptor {
    /// Unique human-readable display name (shows up in logs and attempt logs).
    pub name: String,
    pub params: StrategyParams,
}

impl StrategyDescriptor {
    pub fn new(name: impl Into<String>, params: StrategyParams) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    pub fn kind(&self) -> StrategyKind {
        match self.params {
            StrategyParams::Extractor { .. } => StrategyKind::Extractor,
            StrategyParams::Relay { .. } => StrategyKind::Relay,
            StrategyParams::Frontend { .. } => StrategyKind::Frontend,
            StrategyParams::StreamDump => StrategyKind::StreamDump,
            StrategyParams::Browser => StrategyKind::Browser,
        }
    }

    /// True when the mechanism routes through the configured egress proxy.
    pub fn wants_proxy(&self) -> bool {
        matches!(
            self.params,
            StrategyParams::Extractor { via_proxy: true, .. }
        )
    }
}
