//! `vdl info` – metadata probe without downloading.

use anyhow::Result;
use std::sync::Arc;

use vdl_core::adapters;
use vdl_core::config::VdlConfig;
use vdl_core::orchestrator::Orchestrator;
use vdl_core::proxy::ProxyPool;

pub async fn run_info(cfg: &VdlConfig, url: &str, json: bool) -> Result<()> {
    let proxy_pool = Arc::new(ProxyPool::from_env());
    let boot = adapters::bootstrap(cfg, &proxy_pool).await?;
    let orchestrator = Orchestrator::new(
        cfg.clone(),
        boot.adapters,
        boot.inputs,
        boot.cookie_jar,
        proxy_pool,
        boot.prober,
    );

    match orchestrator.probe(url).await {
        Ok(metadata) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&metadata)?);
            } else {
                println!("title:    {}", metadata.title);
                println!("duration: {:.0}s", metadata.duration_seconds);
                if let Some(channel) = &metadata.channel_name {
                    println!("channel:  {}", channel);
                }
                if let Some(views) = metadata.view_count {
                    println!("views:    {}", views);
                }
                if metadata.is_live {
                    println!("live:     yes");
                }
            }
            Ok(())
        }
        Err(detail) => {
            eprintln!("info failed: {}", detail);
            Err(detail.into())
        }
    }
}
