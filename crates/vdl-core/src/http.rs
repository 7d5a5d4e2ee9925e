//! Blocking HTTP helpers over curl.
//!
//! These perform synchronous transfers; async callers offload them with
//! `tokio::task::spawn_blocking`. Used by the relay/front-end adapters and the
//! proxy pool refresh.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn new_easy(url: &str, timeout: Duration, proxy: Option<&str>) -> Result<curl::easy::Easy> {
    let mut easy = curl::easy::Easy::new();
    easy.url(url).context("invalid URL")?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.connect_timeout(Duration::from_secs(30))?;
    easy.timeout(timeout)?;
    easy.useragent(
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    )?;
    if let Some(p) = proxy {
        easy.proxy(p)?;
    }
    Ok(easy)
}

fn check_status(easy: &mut curl::easy::Easy, url: &str) -> Result<()> {
    let code = easy.response_code().context("no response code")?;
    if !(200..300).contains(&code) {
        anyhow::bail!("{} returned HTTP {}", url, code);
    }
    Ok(())
}

/// GET a URL and return the body as text.
pub fn get_text(url: &str, timeout: Duration) -> Result<String> {
    let mut easy = new_easy(url, timeout, None)?;
    let mut buf = Vec::new();
    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            buf.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform().context("GET request failed")?;
    }
    check_status(&mut easy, url)?;
    String::from_utf8(buf).context("response body is not UTF-8")
}

/// GET a URL with extra headers and parse the body as JSON.
pub fn get_json(
    url: &str,
    timeout: Duration,
    headers: &[(&str, &str)],
) -> Result<serde_json::Value> {
    let mut easy = new_easy(url, timeout, None)?;
    if !headers.is_empty() {
        let mut list = curl::easy::List::new();
        for (k, v) in headers {
            list.append(&format!("{}: {}", k, v))?;
        }
        easy.http_headers(list)?;
    }
    let mut buf = Vec::new();
    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            buf.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform().context("GET request failed")?;
    }
    check_status(&mut easy, url)?;
    serde_json::from_slice(&buf).context("invalid JSON response")
}

/// POST a JSON body to a URL and parse the response as JSON.
pub fn post_json(
    url: &str,
    body: &serde_json::Value,
    timeout: Duration,
) -> Result<serde_json::Value> {
    let mut easy = new_easy(url, timeout, None)?;
    easy.post(true)?;
    easy.post_fields_copy(body.to_string().as_bytes())?;
    let mut list = curl::easy::List::new();
    list.append("Accept: application/json")?;
    list.append("Content-Type: application/json")?;
    easy.http_headers(list)?;

    let mut buf = Vec::new();
    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            buf.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform().context("POST request failed")?;
    }
    check_status(&mut easy, url)?;
    serde_json::from_slice(&buf).context("invalid JSON response")
}

/// GET a URL and stream the body to `dest`, optionally through an egress
/// proxy. Aborts slow transfers (under 1 KiB/s for 60s). Returns bytes written.
pub fn stream_to_file(
    url: &str,
    dest: &Path,
    timeout: Duration,
    proxy: Option<&str>,
) -> Result<u64> {
    let mut easy = new_easy(url, timeout, proxy)?;
    easy.low_speed_limit(1024)?;
    easy.low_speed_time(Duration::from_secs(60))?;

    let written = Arc::new(AtomicU64::new(0));
    let written_cb = Arc::clone(&written);
    let mut file =
        File::create(dest).with_context(|| format!("create {}", dest.display()))?;
    {
        let mut transfer = easy.transfer();
        transfer.write_function(move |data| {
            match file.write_all(data) {
                Ok(()) => {
                    written_cb.fetch_add(data.len() as u64, Ordering::Relaxed);
                    Ok(data.len())
                }
                Err(e) => {
                    tracing::warn!("stream write failed: {}", e);
                    Ok(0) // abort transfer
                }
            }
        })?;
        transfer.perform().context("GET request failed")?;
    }

    let code = easy.response_code().context("no response code")?;
    if code != 200 && code != 206 {
        anyhow::bail!("stream GET returned HTTP {}", code);
    }
    Ok(written.load(Ordering::Relaxed))
}
