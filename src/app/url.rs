//! Input line handling.

/// Turns one input line into a hostname.
///
/// Surrounding whitespace and trailing slashes are removed. Blank lines and
/// lines starting with `#` yield `None`. Anything else is kept as-is, even if
/// it is not a valid hostname: the probe reports that in the host's record.
pub fn normalize_host(line: &str) -> Option<String> {
    let host = line.trim();
    if host.is_empty() || host.starts_with('#') {
        return None;
    }
    Some(host.trim_end_matches('/').to_string())
}

/// Root URL of `host` for the given scheme, e.g. `http://example.com/`.
pub fn probe_url(scheme: &str, host: &str) -> String {
    format!("{scheme}://{host}/")
}
