//! Request identities and content-addressed keys.

use sha2::{Digest, Sha256};

/// Canonical identity of a request within a generation: `"<METHOD> <url>"`.
pub fn request_key(method: &str, url: &str) -> String {
    format!("{} {}", method.to_ascii_uppercase(), url)
}

/// SHA-256 hex digest of a URL, used to name files written by the asset cache.
pub fn content_key(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}
