//! Source URL validation and video id extraction.

/// True for the 11-character id alphabet used by watch URLs.
fn is_video_id(s: &str) -> bool {
    s.len() == 11
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Extracts the 11-character video id from a watch URL.
///
/// Accepts `watch?v=`, `youtu.be/<id>`, `shorts/<id>`, and `embed/<id>` forms.
/// Returns `None` for anything else, including syntactically invalid URLs.
pub fn video_id_from_url(source_url: &str) -> Option<String> {
    let parsed = url::Url::parse(source_url).ok()?;

    if let Some(id) = parsed
        .query_pairs()
        .find(|(k, _)| k == "v")
        .map(|(_, v)| v.to_string())
    {
        if is_video_id(&id) {
            return Some(id);
        }
    }

    let mut segments = parsed.path().split('/').filter(|s| !s.is_empty());
    let host = parsed.host_str()?;
    let candidate = if host.ends_with("youtu.be") {
        segments.next()
    } else {
        match segments.next() {
            Some("shorts") | Some("embed") => segments.next(),
            _ => None,
        }
    };

    candidate.filter(|s| is_video_id(s)).map(str::to_string)
}

/// Validates that a source URL is well-formed http(s) before any strategy runs.
/// The orchestrator rejects failures here up front as `INVALID_URL`.
pub fn validate_source_url(source_url: &str) -> Result<(), String> {
    match url::Url::parse(source_url) {
        Ok(parsed) if parsed.scheme() == "http" || parsed.scheme() == "https" => {
            if parsed.host_str().is_none() {
                return Err(format!("invalid URL (no host): {}", source_url));
            }
            Ok(())
        }
        Ok(parsed) => Err(format!("unsupported URL scheme '{}'", parsed.scheme())),
        Err(e) => Err(format!("malformed URL: {}", e)),
    }
}
