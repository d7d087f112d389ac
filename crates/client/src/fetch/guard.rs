//! Development URL guard.
//!
//! Rejects request shapes that only occur against a local development server
//! and can never succeed from the cache's point of view, so the caller goes
//! straight to the cache instead of spending a network round trip.

use url::Url;

/// Error type for guarded URLs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GuardError {
    #[error("https against localhost: {0}")]
    SecureLocalhost(String),

    #[error("localhost without explicit port: {0}")]
    LocalhostWithoutPort(String),
}

/// Whether the URL's host is `localhost`.
pub fn is_localhost(url: &Url) -> bool {
    url.host_str().is_some_and(|host| host.eq_ignore_ascii_case("localhost"))
}

/// Check a URL against the development guard.
///
/// Default ports are normalized away by URL parsing, so `http://localhost:80`
/// counts as having no explicit port.
pub fn check_dev_url(url: &Url) -> Result<(), GuardError> {
    if !is_localhost(url) {
        return Ok(());
    }

    if url.scheme() == "https" {
        return Err(GuardError::SecureLocalhost(url.to_string()));
    }

    if url.port().is_none() {
        return Err(GuardError::LocalhostWithoutPort(url.to_string()));
    }

    Ok(())
}
