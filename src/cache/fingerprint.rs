//! Manifest fingerprinting for content-addressed caching
//!
//! The fingerprint of a manifest is the SHA256 of its raw bytes.
//! Same manifest bytes = same cache key, regardless of path or mtime.

use crate::error::{DepcacheError, DepcacheResult};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::Path;
use tokio::fs;

/// Content hash of a manifest file (lowercase hex SHA256)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Length of the hex form
    pub const LEN: usize = 64;

    /// Fingerprint in-memory content
    pub fn from_bytes(contents: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(contents);
        Self(hex::encode(hasher.finalize()))
    }

    /// Hex form of the fingerprint
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `value` is exactly this fingerprint
    pub fn matches(&self, value: &[u8]) -> bool {
        self.0.as_bytes() == value
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hash a manifest's full contents
pub async fn fingerprint(path: &Path) -> DepcacheResult<Fingerprint> {
    let contents = fs::read(path)
        .await
        .map_err(|e| DepcacheError::io(format!("reading manifest {}", path.display()), e))?;

    Ok(Fingerprint::from_bytes(&contents))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn hash_deterministic() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("package.json");
        std::fs::write(&path, b"{\"name\": \"demo\"}").unwrap();

        let hash1 = fingerprint(&path).await.unwrap();
        let hash2 = fingerprint(&path).await.unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.as_str().len(), Fingerprint::LEN);
    }

    #[tokio::test]
    async fn hash_ignores_path() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a").join("bower.json");
        let b = dir.path().join("composer.json");
        std::fs::create_dir_all(a.parent().unwrap()).unwrap();
        std::fs::write(&a, b"same bytes").unwrap();
        std::fs::write(&b, b"same bytes").unwrap();

        assert_eq!(fingerprint(&a).await.unwrap(), fingerprint(&b).await.unwrap());
    }

    #[tokio::test]
    async fn hash_different_content() {
        let dir = TempDir::new().unwrap();

        let path1 = dir.path().join("m1.json");
        std::fs::write(&path1, b"content 1").unwrap();

        let path2 = dir.path().join("m2.json");
        std::fs::write(&path2, b"content 2").unwrap();

        let hash1 = fingerprint(&path1).await.unwrap();
        let hash2 = fingerprint(&path2).await.unwrap();

        assert_ne!(hash1, hash2);
    }

    #[tokio::test]
    async fn missing_manifest_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = fingerprint(&dir.path().join("nope.json")).await.unwrap_err();
        assert!(matches!(err, DepcacheError::Io { .. }));
    }

    #[test]
    fn known_digest() {
        let fp = Fingerprint::from_bytes(b"");
        assert_eq!(
            fp.as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn matches_is_byte_exact() {
        let fp = Fingerprint::from_bytes(b"x");
        let hex = fp.to_string();
        assert!(fp.matches(hex.as_bytes()));
        assert!(!fp.matches(format!("{}\n", hex).as_bytes()));
        assert!(!fp.matches(hex.to_uppercase().as_bytes()));
    }
}
