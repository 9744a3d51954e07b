//! Small text and time helpers.

/// Trimmed value, or `None` when absent or blank
pub fn non_blank(value: Option<String>) -> Option<String> {
    let trimmed = value?.trim().to_string();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// `http://` or `https://` (any case) followed by a host
pub fn is_http_url(value: &str) -> bool {
    let Some((scheme, rest)) = value.split_once("://") else {
        return false;
    };
    let scheme_ok = scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https");
    let host = rest.split(['/', '?', '#']).next().unwrap_or("");
    scheme_ok && !host.is_empty() && !host.contains(char::is_whitespace)
}

const ERROR_TEXT_LIMIT: usize = 180;

/// Single-line excerpt of a response body for error messages
pub fn compact_text(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(ERROR_TEXT_LIMIT)
        .collect()
}

pub fn unix_timestamp_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_blank_trims_and_drops_empty() {
        assert_eq!(non_blank(None), None);
        assert_eq!(non_blank(Some(" \t".to_string())), None);
        assert_eq!(non_blank(Some(" vega ".to_string())), Some("vega".to_string()));
    }

    #[test]
    fn is_http_url_requires_scheme_and_host() {
        assert!(is_http_url("http://localhost:8080"));
        assert!(is_http_url("HTTPS://sync.example.com/api"));
        assert!(!is_http_url("https://"));
        assert!(!is_http_url("ftp://example.com"));
        assert!(!is_http_url("sync.example.com"));
    }

    #[test]
    fn compact_text_flattens_and_limits() {
        assert_eq!(compact_text("  bad\n  gateway \n"), "bad gateway");
        assert_eq!(compact_text(&"x".repeat(500)).len(), ERROR_TEXT_LIMIT);
    }
}
