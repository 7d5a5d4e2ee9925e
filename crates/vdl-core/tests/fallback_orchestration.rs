//! Integration tests: the fallback loop against scripted adapters.
//!
//! Uses the tool-free catalog (two relay entries, three front-end entries)
//! so no external binaries or network are involved.

mod common;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use common::mock_adapter::{scripted_adapters, Behavior, Invocations, Script};
use tempfile::tempdir;
use vdl_core::classify::ErrorCode;
use vdl_core::config::VdlConfig;
use vdl_core::job::{DownloadJob, Quality};
use vdl_core::orchestrator::Orchestrator;
use vdl_core::proxy::ProxyPool;
use vdl_core::strategy::CatalogInputs;

/// Catalog order with no local tools: relays then front-ends.
const STRATEGIES: [&str; 5] = [
    "cobalt.tools (api.cobalt.tools)",
    "cobalt.tools (co.wuk.sh)",
    "invidious (inv.nadeko.net)",
    "invidious (yewtu.be)",
    "invidious (invidious.nerdvpn.de)",
];

fn engine(behaviors: &[(&str, Behavior)]) -> (Orchestrator, Invocations) {
    let script: Script = Arc::new(Mutex::new(
        behaviors
            .iter()
            .map(|(name, b)| (name.to_string(), b.clone()))
            .collect::<HashMap<_, _>>(),
    ));
    let invocations: Invocations = Arc::new(Mutex::new(Vec::new()));
    let adapters = scripted_adapters(&script, &invocations);
    let orchestrator = Orchestrator::new(
        VdlConfig::default(),
        adapters,
        CatalogInputs::default(),
        None,
        Arc::new(ProxyPool::from_env()),
        None,
    );
    (orchestrator, invocations)
}

fn job_in(workspace: std::path::PathBuf, deadline: Duration) -> DownloadJob {
    DownloadJob {
        job_id: "itest".into(),
        source_url: "https://www.youtube.com/watch?v=dQw4w9WgXcQ".into(),
        quality: Quality::P720,
        output_format: "mp4".into(),
        overall_deadline: deadline,
        workspace,
    }
}

fn invoked(invocations: &Invocations) -> Vec<String> {
    invocations
        .lock()
        .unwrap()
        .iter()
        .map(|i| i.strategy.clone())
        .collect()
}

fn attempt_log_len(detail: &vdl_core::classify::ErrorDetail) -> usize {
    detail
        .details
        .get("all_strategy_errors")
        .and_then(|v| v.as_array())
        .map(|a| a.len())
        .unwrap_or(0)
}

#[tokio::test]
async fn first_success_wins_and_later_strategies_never_run() {
    let (orchestrator, invocations) = engine(&[
        (STRATEGIES[0], Behavior::Fail("HTTP 429".into())),
        (STRATEGIES[1], Behavior::Produce(5_000_000)),
        (STRATEGIES[2], Behavior::Produce(1)),
    ]);
    let tmp = tempdir().unwrap();
    let job = job_in(tmp.path().to_path_buf(), Duration::from_secs(60));

    let download = orchestrator.submit(&job).await.expect("second strategy succeeds");
    assert_eq!(download.metadata.size_bytes, Some(5_000_000));
    assert!(download.file.exists());
    assert_eq!(invoked(&invocations), STRATEGIES[..2].to_vec());
}

#[tokio::test]
async fn permanent_failure_short_circuits_the_catalog() {
    let (orchestrator, invocations) = engine(&[
        (STRATEGIES[0], Behavior::Fail("connection reset by peer".into())),
        (STRATEGIES[1], Behavior::Fail("This video is unavailable".into())),
        (STRATEGIES[2], Behavior::Produce(1000)),
    ]);
    let tmp = tempdir().unwrap();
    let job = job_in(tmp.path().to_path_buf(), Duration::from_secs(60));

    let detail = orchestrator.submit(&job).await.unwrap_err();
    assert_eq!(detail.code, ErrorCode::VideoUnavailable);
    assert!(!detail.is_transient);
    assert_eq!(attempt_log_len(&detail), 2);
    assert_eq!(invoked(&invocations), STRATEGIES[..2].to_vec());
}

#[tokio::test]
async fn zero_byte_success_claim_is_rejected() {
    let (orchestrator, invocations) = engine(&[
        (STRATEGIES[0], Behavior::Produce(0)),
        (STRATEGIES[1], Behavior::Produce(2048)),
    ]);
    let tmp = tempdir().unwrap();
    let job = job_in(tmp.path().to_path_buf(), Duration::from_secs(60));

    let download = orchestrator.submit(&job).await.expect("fallback succeeds");
    assert_eq!(download.metadata.size_bytes, Some(2048));
    assert_eq!(invoked(&invocations).len(), 2);
}

#[tokio::test]
async fn exhaustion_aggregates_every_attempt_in_order() {
    let behaviors: Vec<(&str, Behavior)> = STRATEGIES
        .iter()
        .map(|name| (*name, Behavior::Fail(format!("{} says 503", name))))
        .collect();
    let (orchestrator, invocations) = engine(&behaviors);
    let tmp = tempdir().unwrap();
    let job = job_in(tmp.path().to_path_buf(), Duration::from_secs(60));

    let detail = orchestrator.submit(&job).await.unwrap_err();
    assert!(detail.is_transient);
    assert!(detail.retry_after_seconds.is_some());
    assert_eq!(invoked(&invocations), STRATEGIES.to_vec());

    let entries = detail
        .details
        .get("all_strategy_errors")
        .and_then(|v| v.as_array())
        .cloned()
        .expect("attempt log attached");
    assert_eq!(entries.len(), STRATEGIES.len());
    for (entry, name) in entries.iter().zip(STRATEGIES) {
        assert_eq!(entry["strategy"], name);
        assert!(entry["error"].as_str().unwrap().contains("503"));
    }
}

#[tokio::test]
async fn exhaustion_reports_the_last_classified_error() {
    let (orchestrator, _invocations) = engine(&[
        (STRATEGIES[0], Behavior::Fail("HTTP 429".into())),
        (STRATEGIES[1], Behavior::Fail("connection refused".into())),
        (STRATEGIES[2], Behavior::Fail("connection refused".into())),
        (STRATEGIES[3], Behavior::Fail("connection refused".into())),
        (STRATEGIES[4], Behavior::Fail("request timed out".into())),
    ]);
    let tmp = tempdir().unwrap();
    let job = job_in(tmp.path().to_path_buf(), Duration::from_secs(60));

    let detail = orchestrator.submit(&job).await.unwrap_err();
    // Most-recent-cause reporting: the final timeout wins over earlier codes.
    assert_eq!(detail.code, ErrorCode::DownloadTimeout);
    assert_eq!(attempt_log_len(&detail), 5);
}

#[tokio::test]
async fn workspace_is_clean_when_each_attempt_starts() {
    let (orchestrator, invocations) = engine(&[
        (STRATEGIES[0], Behavior::FailWithDebris("relay wobbled".into())),
        (STRATEGIES[1], Behavior::FailWithDebris("relay wobbled again".into())),
        (STRATEGIES[2], Behavior::Produce(512)),
    ]);
    let tmp = tempdir().unwrap();
    let job = job_in(tmp.path().to_path_buf(), Duration::from_secs(60));

    orchestrator.submit(&job).await.expect("third strategy succeeds");
    for invocation in invocations.lock().unwrap().iter() {
        assert!(
            !invocation.saw_candidates,
            "{} started with residual candidate files",
            invocation.strategy
        );
    }
}

#[tokio::test]
async fn overall_deadline_aborts_the_loop() {
    let behaviors: Vec<(&str, Behavior)> = STRATEGIES
        .iter()
        .map(|name| (*name, Behavior::Hang(Duration::from_secs(5))))
        .collect();
    let (orchestrator, invocations) = engine(&behaviors);
    let tmp = tempdir().unwrap();
    let job = job_in(tmp.path().to_path_buf(), Duration::from_millis(100));

    let detail = orchestrator.submit(&job).await.unwrap_err();
    assert_eq!(detail.code, ErrorCode::DownloadTimeout);
    assert!(detail.is_transient);
    // The first attempt was clamped to the deadline; the rest never ran.
    assert!(invoked(&invocations).len() <= 1);
}

#[tokio::test]
async fn malformed_url_is_rejected_before_any_attempt() {
    let (orchestrator, invocations) = engine(&[]);
    let tmp = tempdir().unwrap();
    let mut job = job_in(tmp.path().to_path_buf(), Duration::from_secs(60));
    job.source_url = "ftp://example.com/clip".into();

    let detail = orchestrator.submit(&job).await.unwrap_err();
    assert_eq!(detail.code, ErrorCode::InvalidUrl);
    assert!(!detail.is_transient);
    assert!(invoked(&invocations).is_empty());
}

#[tokio::test]
async fn single_strategy_override_runs_exactly_one_entry() {
    let (orchestrator, invocations) = engine(&[
        (STRATEGIES[2], Behavior::Produce(4096)),
    ]);
    let tmp = tempdir().unwrap();
    let job = job_in(tmp.path().to_path_buf(), Duration::from_secs(60));

    let download = orchestrator.submit_only(&job, 3).await.expect("strategy 3 succeeds");
    assert_eq!(download.metadata.size_bytes, Some(4096));
    assert_eq!(invoked(&invocations), vec![STRATEGIES[2].to_string()]);

    let detail = orchestrator.submit_only(&job, 99).await.unwrap_err();
    assert!(detail.message.contains("out of range"));
}
