use std::fmt;

use sha2::{Digest, Sha256};

/// Fingerprint of a request URL, used as the cache entry file name.
///
/// Hex SHA-256 of the exact URL string: stable across processes, fixed
/// length, safe as a file name, and collision-free for practical purposes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn from_url(url: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(url.as_bytes());
        let digest = hasher.finalize();
        let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
        Self(hex)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::CacheKey;

    #[test]
    fn same_url_same_key() {
        let a = CacheKey::from_url("http://example.com/a/b?x=1");
        let b = CacheKey::from_url("http://example.com/a/b?x=1");
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_urls_distinct_keys() {
        let a = CacheKey::from_url("http://example.com/a");
        let b = CacheKey::from_url("http://example.com/b");
        assert_ne!(a, b);
    }

    #[test]
    fn key_is_fixed_length_hex() {
        let key = CacheKey::from_url("http://example.com/");
        assert_eq!(key.as_str().len(), 64);
        assert!(key.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }
}
