//! Ordered strategy catalog construction.
//!
//! Base order is fixed and hand-ranked by expected success probability.
//! Conditional entries (credentials, optional tool families) are evaluated
//! once here, so the orchestrator loop stays free of adapter-specific checks.
//! Rebuilding with identical inputs yields an identical list.

use super::descriptor::{StrategyDescriptor, StrategyParams};

/// Relay API instances, primary first.
const RELAY_INSTANCES: [(&str, &str); 2] = [
    ("cobalt.tools (api.cobalt.tools)", "https://api.cobalt.tools/"),
    ("cobalt.tools (co.wuk.sh)", "https://co.wuk.sh/api/json"),
];

/// Alternate front-end instances, in preference order.
const FRONTEND_INSTANCES: [(&str, &str); 3] = [
    ("invidious (inv.nadeko.net)", "https://inv.nadeko.net"),
    ("invidious (yewtu.be)", "https://yewtu.be"),
    ("invidious (invidious.nerdvpn.de)", "https://invidious.nerdvpn.de"),
];

/// Runtime facts the catalog is filtered on, all computed before the build:
/// credential material, egress proxy, and tool availability probes.
#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogInputs {
    pub has_cookies: bool,
    pub proxy_configured: bool,
    pub extractor_available: bool,
    pub stream_dump_available: bool,
    pub browser_available: bool,
}

fn extractor(
    name: &str,
    player_client: &'static str,
    use_cookies: bool,
    skip_webpage: bool,
    via_proxy: bool,
) -> StrategyDescriptor {
    StrategyDescriptor::new(
        name,
        StrategyParams::Extractor {
            player_client,
            use_cookies,
            skip_webpage,
            via_proxy,
        },
    )
}

/// Build the ordered strategy list for one job configuration.
///
/// Callers must not rely on fixed indices, only on relative order: omitted
/// conditional entries close the gap.
pub fn build_catalog(inputs: &CatalogInputs) -> Vec<StrategyDescriptor> {
    let mut catalog = Vec::new();

    // Proxy-first: proxied variants of the fastest mechanisms go ahead of
    // everything else when an egress proxy is available.
    if inputs.proxy_configured && inputs.extractor_available {
        catalog.push(extractor("yt-dlp ios (proxy)", "ios", false, true, true));
        catalog.push(extractor(
            "yt-dlp android (proxy)",
            "android",
            false,
            true,
            true,
        ));
    }

    if inputs.extractor_available {
        // ios client: bypasses PO-token enforcement on datacenter IPs.
        catalog.push(extractor("yt-dlp ios", "ios", false, true, false));
        if inputs.has_cookies {
            catalog.push(extractor("yt-dlp ios+cookies", "ios", true, false, false));
        }
        // android client: different extraction path, often less blocked.
        catalog.push(extractor("yt-dlp android", "android", false, true, false));
        if inputs.has_cookies {
            catalog.push(extractor(
                "yt-dlp android+cookies",
                "android",
                true,
                false,
                false,
            ));
        }
        catalog.push(extractor(
            "yt-dlp tv_embedded",
            "tv_embedded",
            inputs.has_cookies,
            !inputs.has_cookies,
            false,
        ));
        catalog.push(extractor("yt-dlp mweb", "mweb", false, true, false));
        catalog.push(extractor(
            "yt-dlp web_creator",
            "web_creator",
            inputs.has_cookies,
            !inputs.has_cookies,
            false,
        ));
    }

    // Relay APIs bypass datacenter IP blocking entirely.
    for (name, api_url) in RELAY_INSTANCES {
        catalog.push(StrategyDescriptor::new(
            name,
            StrategyParams::Relay {
                api_url: api_url.to_string(),
            },
        ));
    }

    // Alternate front-ends proxy the stream through their own servers.
    for (name, instance) in FRONTEND_INSTANCES {
        catalog.push(StrategyDescriptor::new(
            name,
            StrategyParams::Frontend {
                instance: instance.to_string(),
            },
        ));
    }

    if inputs.stream_dump_available {
        catalog.push(StrategyDescriptor::new(
            "streamlink",
            StrategyParams::StreamDump,
        ));
    }

    if inputs.browser_available {
        catalog.push(StrategyDescriptor::new(
            "browser capture",
            StrategyParams::Browser,
        ));
    }

    catalog
}
