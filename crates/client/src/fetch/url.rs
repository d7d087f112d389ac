//! URL canonicalization for consistent cache keys.

/// Error type for URL canonicalization failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Canonicalize an absolute http(s) URL string.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Default scheme to https:// if missing
/// 3. Lowercase the host
/// 4. Remove fragment (#...)
/// 5. Keep query string intact (do not reorder)
pub fn canonicalize(input: &str) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let url_str = if trimmed.contains("://") { trimmed.to_string() } else { format!("https://{trimmed}") };

    let parsed = url::Url::parse(&url_str).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    normalize(parsed)
}

/// Resolve a request target against the application origin.
///
/// Root-relative paths (`/index.html`) join the origin; absolute URLs are kept
/// with their scheme, so non-http(s) targets survive and can be passed through
/// uncached.
pub fn resolve(origin: &url::Url, input: &str) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let parsed = match url::Url::parse(trimmed) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            origin.join(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?
        }
        Err(e) => return Err(UrlError::InvalidUrl(e.to_string())),
    };

    normalize(parsed)
}

fn normalize(mut parsed: url::Url) -> Result<url::Url, UrlError> {
    if let Some(lowered) = parsed.host_str().map(str::to_lowercase)
        && parsed.host_str() != Some(lowered.as_str())
    {
        parsed
            .set_host(Some(&lowered))
            .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    }

    parsed.set_fragment(None);

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> url::Url {
        url::Url::parse("http://127.0.0.1:8080").unwrap()
    }

    #[test]
    fn test_canonicalize_basic() {
        let url = canonicalize("https://example.com").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("example.com"));
    }

    #[test]
    fn test_canonicalize_default_scheme() {
        let url = canonicalize("example.com/logo.png").unwrap();
        assert_eq!(url.as_str(), "https://example.com/logo.png");
    }

    #[test]
    fn test_canonicalize_lowercase_host_and_fragment() {
        let url = canonicalize("https://EXAMPLE.COM/a?x=1#top").unwrap();
        assert_eq!(url.as_str(), "https://example.com/a?x=1");
    }

    #[test]
    fn test_canonicalize_unsupported_scheme() {
        let result = canonicalize("file:///etc/passwd");
        assert!(matches!(result, Err(UrlError::UnsupportedScheme(_))));
    }

    #[test]
    fn test_canonicalize_empty() {
        assert!(matches!(canonicalize(""), Err(UrlError::Empty)));
        assert!(matches!(canonicalize("   "), Err(UrlError::Empty)));
    }

    #[test]
    fn test_resolve_root_relative() {
        let url = resolve(&origin(), "/logos/logo.jpeg").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/logos/logo.jpeg");
    }

    #[test]
    fn test_resolve_absolute_keeps_target() {
        let url = resolve(&origin(), "https://CDN.example.com/app.js#x").unwrap();
        assert_eq!(url.as_str(), "https://cdn.example.com/app.js");
    }

    #[test]
    fn test_resolve_keeps_other_schemes() {
        let url = resolve(&origin(), "chrome-extension://abcdef/content.js").unwrap();
        assert_eq!(url.scheme(), "chrome-extension");
    }

    #[test]
    fn test_resolve_preserves_query() {
        let url = resolve(&origin(), "/api/questions?exam=1&page=2").unwrap();
        assert_eq!(url.query(), Some("exam=1&page=2"));
    }
}
