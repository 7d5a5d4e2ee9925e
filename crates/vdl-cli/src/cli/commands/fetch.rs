//! `vdl fetch` – download a video through the fallback engine.

use anyhow::Result;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use vdl_core::adapters;
use vdl_core::config::VdlConfig;
use vdl_core::job::{DownloadJob, Quality};
use vdl_core::orchestrator::Orchestrator;
use vdl_core::proxy::ProxyPool;
use vdl_core::workspace::Workspaces;

pub struct FetchArgs {
    pub url: String,
    pub quality: Option<Quality>,
    pub format: Option<String>,
    pub job_id: Option<String>,
    pub timeout: Option<u64>,
    pub only: Option<usize>,
    pub json: bool,
}

fn generated_job_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format!("job-{}", millis)
}

pub async fn run_fetch(cfg: &VdlConfig, args: FetchArgs) -> Result<()> {
    let workspaces = Workspaces::new(cfg);
    workspaces.init()?;

    let proxy_pool = Arc::new(ProxyPool::from_env());
    proxy_pool.refresh().await;
    // Long jobs can outlive the pool; keep it fresh while we run.
    let _refresher = proxy_pool.spawn_refresh_loop(Duration::from_secs(3600));

    let boot = adapters::bootstrap(cfg, &proxy_pool).await?;
    let orchestrator = Orchestrator::new(
        cfg.clone(),
        boot.adapters,
        boot.inputs,
        boot.cookie_jar,
        Arc::clone(&proxy_pool),
        boot.prober,
    );

    let job_id = args.job_id.unwrap_or_else(generated_job_id);
    let job = DownloadJob {
        workspace: workspaces.job_dir(&job_id)?,
        job_id,
        source_url: args.url,
        quality: args.quality.unwrap_or(cfg.default_quality),
        output_format: args.format.unwrap_or_else(|| cfg.output_format.clone()),
        overall_deadline: Duration::from_secs(args.timeout.unwrap_or(cfg.overall_deadline_secs)),
    };

    let result = match args.only {
        Some(index) => orchestrator.submit_only(&job, index).await,
        None => orchestrator.submit(&job).await,
    };

    match result {
        Ok(download) => {
            if args.json {
                let payload = serde_json::json!({
                    "success": true,
                    "file": download.file,
                    "metadata": download.metadata,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!(
                    "downloaded {} ({} bytes)",
                    download.file.display(),
                    download.metadata.size_bytes.unwrap_or(0)
                );
                println!("title: {}", download.metadata.title);
            }
            Ok(())
        }
        Err(detail) => {
            if args.json {
                let payload = serde_json::json!({
                    "success": false,
                    "error": detail,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                eprintln!("download failed: {}", detail);
                if let Some(retry) = detail.retry_after_seconds {
                    eprintln!("retry suggested after {}s", retry);
                }
                if let Some(entries) = detail
                    .details
                    .get("all_strategy_errors")
                    .and_then(|v| v.as_array())
                {
                    for entry in entries {
                        eprintln!(
                            "  [{}] {}",
                            entry["strategy"].as_str().unwrap_or("?"),
                            entry["error"].as_str().unwrap_or("?")
                        );
                    }
                }
            }
            Err(detail.into())
        }
    }
}
