//! `vdl strategies` – print the strategy catalog for this configuration.

use anyhow::Result;
use std::sync::Arc;

use vdl_core::adapters;
use vdl_core::config::VdlConfig;
use vdl_core::orchestrator::Orchestrator;
use vdl_core::proxy::ProxyPool;

pub async fn run_strategies(cfg: &VdlConfig) -> Result<()> {
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

    let catalog = orchestrator.catalog();
    if catalog.is_empty() {
        println!("No strategies available for this configuration.");
        return Ok(());
    }
    for (index, descriptor) in catalog.iter().enumerate() {
        println!("{:2}. {:<36} [{}]", index + 1, descriptor.name, descriptor.kind());
    }
    Ok(())
}
