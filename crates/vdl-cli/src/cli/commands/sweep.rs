//! `vdl sweep` – reclaim expired job workspaces, once or continuously.

use anyhow::Result;
use std::sync::Arc;

use vdl_core::config::VdlConfig;
use vdl_core::workspace::Workspaces;

pub async fn run_sweep(cfg: &VdlConfig, watch: bool) -> Result<()> {
    let workspaces = Arc::new(Workspaces::new(cfg));
    workspaces.init()?;

    let stats = workspaces.sweep_expired()?;
    if stats.removed_jobs == 0 {
        println!("Nothing to sweep.");
    } else {
        println!(
            "Swept {} job(s), {:.2} MiB freed.",
            stats.removed_jobs,
            stats.removed_bytes as f64 / 1_048_576.0
        );
    }
    println!("Disk usage: {:.1}%", workspaces.disk_usage_percent());

    if watch {
        let handle = workspaces.spawn_sweeper();
        handle.await?;
    }
    Ok(())
}
