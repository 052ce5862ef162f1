//! Shared utility functions used across multiple modules.

/// Normalize optional text by trimming whitespace and removing empties.
///
/// Returns `None` when the input is `None` or the trimmed value is empty.
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    let value = value?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Check if a string starts with `http://` or `https://`.
pub fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// Force a URL to carry a scheme.
///
/// Existing `http://` / `https://` prefixes are preserved, anything else gets
/// `https://` prepended. Surrounding whitespace is trimmed.
pub fn normalize_url(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() || is_http_url(value) {
        value.to_string()
    } else {
        format!("https://{value}")
    }
}

/// Split newline-separated URL text into normalized URLs, dropping blank lines.
pub fn parse_urls(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(normalize_url)
        .collect()
}

/// Remove every whitespace character from a shared secret.
pub fn strip_secret(value: &str) -> String {
    value.chars().filter(|ch| !ch.is_whitespace()).collect()
}

/// Render a secret for display: first three characters, `****`, last three.
pub fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    let head = secret.chars().take(3).collect::<String>();
    let tail = secret
        .chars()
        .skip(count.saturating_sub(3))
        .collect::<String>();
    format!("{head}****{tail}")
}

/// Truncate text to at most 180 characters for error messages.
pub fn compact_text(value: &str) -> String {
    value.trim().chars().take(180).collect()
}
