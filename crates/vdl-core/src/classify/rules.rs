//! Keyword classification of raw failure messages.
//!
//! Matching is case-insensitive and evaluated in a fixed precedence; the first
//! matching rule wins. Total: every non-empty message maps to exactly one code,
//! with unmatched messages falling through to `ServerError`.

use super::code::{ErrorCode, ErrorDetail};

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Classify a raw strategy failure message into a structured `ErrorDetail`.
///
/// The raw message is preserved verbatim under `details.error`.
pub fn classify(raw: &str) -> ErrorDetail {
    let lower = raw.to_lowercase();

    if contains_any(&lower, &["private", "unavailable", "deleted", "removed", "geo-block"]) {
        return ErrorDetail::permanent(
            ErrorCode::VideoUnavailable,
            "Video is private, deleted, or unavailable",
        )
        .with_raw_error(raw);
    }

    if contains_any(&lower, &["sign in", "bot", "confirm you"]) {
        return ErrorDetail::transient(
            ErrorCode::RateLimited,
            "Origin bot detection triggered; sign-in or cookies required",
            300,
        )
        .with_raw_error(raw);
    }

    if contains_any(&lower, &["429", "rate limit", "too many requests"]) {
        return ErrorDetail::transient(ErrorCode::RateLimited, "Rate limited by origin", 300)
            .with_raw_error(raw);
    }

    if contains_any(&lower, &["timeout", "timed out"]) {
        return ErrorDetail::transient(ErrorCode::DownloadTimeout, "Download timed out", 60)
            .with_raw_error(raw);
    }

    if contains_any(&lower, &["network", "connection", "resolve", "unreachable"]) {
        return ErrorDetail::transient(ErrorCode::NetworkError, "Network connection error", 30)
            .with_raw_error(raw);
    }

    if contains_any(&lower, &["disk", "no space"]) {
        return ErrorDetail::transient(ErrorCode::DiskFull, "Server disk full", 600)
            .with_raw_error(raw);
    }

    if contains_any(&lower, &["invalid", "malformed", "unsupported url"]) {
        return ErrorDetail::permanent(ErrorCode::InvalidUrl, "Invalid or unsupported URL")
            .with_raw_error(raw);
    }

    ErrorDetail::transient(ErrorCode::ServerError, "Download failed", 120).with_raw_error(raw)
}

/// True if no strategy switch can change the outcome for this error.
pub fn is_permanent(detail: &ErrorDetail) -> bool {
    matches!(
        detail.code,
        ErrorCode::VideoUnavailable | ErrorCode::InvalidUrl
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailability_is_permanent() {
        let d = classify("ERROR: This video is unavailable");
        assert_eq!(d.code, ErrorCode::VideoUnavailable);
        assert!(!d.is_transient);
        assert!(is_permanent(&d));
    }

    #[test]
    fn bot_detection_beats_rate_limit_tokens() {
        let d = classify("Sign in to confirm you're not a bot (HTTP 429)");
        assert_eq!(d.code, ErrorCode::RateLimited);
        assert_eq!(d.retry_after_seconds, Some(300));
        assert!(d.is_transient);
    }

    #[test]
    fn http_429_rate_limited() {
        let d = classify("HTTP Error 429: Too Many Requests");
        assert_eq!(d.code, ErrorCode::RateLimited);
        assert!(!is_permanent(&d));
    }

    #[test]
    fn timeouts_suggest_short_retry() {
        let d = classify("relay timed out after 360 seconds");
        assert_eq!(d.code, ErrorCode::DownloadTimeout);
        assert_eq!(d.retry_after_seconds, Some(60));
    }

    #[test]
    fn connection_failures_are_network_errors() {
        let d = classify("could not resolve host: yewtu.be");
        assert_eq!(d.code, ErrorCode::NetworkError);
        assert_eq!(d.retry_after_seconds, Some(30));
    }

    #[test]
    fn disk_full_detected() {
        let d = classify("write failed: No space left on device");
        assert_eq!(d.code, ErrorCode::DiskFull);
        assert_eq!(d.retry_after_seconds, Some(600));
    }

    #[test]
    fn unsupported_url_is_permanent() {
        let d = classify("Unsupported URL: ftp://example.com/clip");
        assert_eq!(d.code, ErrorCode::InvalidUrl);
        assert!(is_permanent(&d));
    }

    #[test]
    fn unmatched_falls_through_to_server_error() {
        let d = classify("some entirely novel failure mode");
        assert_eq!(d.code, ErrorCode::ServerError);
        assert!(d.is_transient);
        assert_eq!(d.retry_after_seconds, Some(120));
    }

    #[test]
    fn unavailability_wins_over_later_rules() {
        // "removed" (rule 1) appears alongside "timeout" (rule 4); first match wins.
        let d = classify("video removed by uploader; request timeout");
        assert_eq!(d.code, ErrorCode::VideoUnavailable);
    }

    #[test]
    fn raw_message_is_preserved() {
        let d = classify("HTTP 429");
        assert_eq!(
            d.details.get("error").and_then(|v| v.as_str()),
            Some("HTTP 429")
        );
    }
}
