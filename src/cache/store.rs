//! On-disk cache store
//!
//! Archives live at `<root>/<cli name>/<cli version>/<fingerprint>.tar.gz`.
//! The version directory keeps different tool versions from sharing entries.

use crate::cache::fingerprint::Fingerprint;
use crate::error::{DepcacheError, DepcacheResult};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// File extension of cache archives
pub const ARCHIVE_EXT: &str = "tar.gz";

/// Name prefix of archives still being written
pub const PARTIAL_PREFIX: &str = ".partial-";

/// Format bytes as human-readable size (e.g., "1.5 GB")
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// An archive found in the store
#[derive(Debug, Clone, Serialize)]
pub struct CacheEntry {
    /// Package manager the archive belongs to
    pub manager: String,
    /// Tool version namespace
    pub version: String,
    /// Manifest fingerprint (archive file stem)
    pub fingerprint: String,
    /// Full path to the archive
    pub path: PathBuf,
    /// Archive size in bytes
    pub size_bytes: u64,
    /// Last modification time
    pub modified_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Check if this entry is older than the given number of days
    pub fn is_older_than_days(&self, days: u32) -> bool {
        let cutoff = Utc::now() - chrono::Duration::days(i64::from(days));
        self.modified_at < cutoff
    }
}

/// Maps fingerprints to archive locations under a cache root
#[derive(Debug, Clone)]
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    /// Create a store rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Cache root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Archive path for a manager, tool version and fingerprint (no IO)
    pub fn locate(&self, cli_name: &str, cli_version: &str, fingerprint: &Fingerprint) -> PathBuf {
        self.root
            .join(cli_name)
            .join(cli_version)
            .join(format!("{}.{}", fingerprint, ARCHIVE_EXT))
    }

    /// Whether an archive exists at `path`
    pub async fn exists(path: &Path) -> bool {
        fs::metadata(path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
    }

    /// Create `path` and any missing parents; succeeds if already present
    pub async fn ensure_directory(path: &Path) -> DepcacheResult<()> {
        fs::create_dir_all(path)
            .await
            .map_err(|e| DepcacheError::io(format!("creating directory {}", path.display()), e))
    }

    /// List every archive in the store
    pub async fn entries(&self) -> DepcacheResult<Vec<CacheEntry>> {
        let mut entries = Vec::new();

        for manager_dir in list_dirs(&self.root).await? {
            for version_dir in list_dirs(&manager_dir).await? {
                let mut read = fs::read_dir(&version_dir)
                    .await
                    .map_err(|e| DepcacheError::io(format!("reading {}", version_dir.display()), e))?;

                while let Some(item) = read
                    .next_entry()
                    .await
                    .map_err(|e| DepcacheError::io(format!("reading {}", version_dir.display()), e))?
                {
                    let path = item.path();
                    let Some(fingerprint) = archive_stem(&path) else {
                        continue;
                    };
                    let meta = item
                        .metadata()
                        .await
                        .map_err(|e| DepcacheError::io(format!("inspecting {}", path.display()), e))?;
                    if !meta.is_file() {
                        continue;
                    }

                    let modified_at = modified_at(&meta);

                    entries.push(CacheEntry {
                        manager: file_name(&manager_dir),
                        version: file_name(&version_dir),
                        fingerprint,
                        path,
                        size_bytes: meta.len(),
                        modified_at,
                    });
                }
            }
        }

        entries.sort_by(|a, b| {
            (&a.manager, &a.version, &a.fingerprint).cmp(&(&b.manager, &b.version, &b.fingerprint))
        });
        debug!("Found {} cache entries under {}", entries.len(), self.root.display());
        Ok(entries)
    }

    /// Remove partial archives older than `days`, left behind by interrupted
    /// captures. Returns their paths.
    pub async fn gc_partials(&self, days: u32, dry_run: bool) -> DepcacheResult<Vec<PathBuf>> {
        let cutoff = Utc::now() - chrono::Duration::days(i64::from(days));
        let mut removed = Vec::new();

        for manager_dir in list_dirs(&self.root).await? {
            for version_dir in list_dirs(&manager_dir).await? {
                let mut read = fs::read_dir(&version_dir)
                    .await
                    .map_err(|e| DepcacheError::io(format!("reading {}", version_dir.display()), e))?;
                while let Some(item) = read
                    .next_entry()
                    .await
                    .map_err(|e| DepcacheError::io(format!("reading {}", version_dir.display()), e))?
                {
                    let path = item.path();
                    if !file_name(&path).starts_with(PARTIAL_PREFIX) {
                        continue;
                    }
                    let Ok(meta) = item.metadata().await else {
                        continue;
                    };
                    if !meta.is_file() || modified_at(&meta) >= cutoff {
                        continue;
                    }
                    if !dry_run {
                        debug!("Removing partial archive: {}", path.display());
                        fs::remove_file(&path).await.map_err(|e| {
                            DepcacheError::io(format!("removing {}", path.display()), e)
                        })?;
                    }
                    removed.push(path);
                }
            }
        }

        Ok(removed)
    }

    /// Subtree holding one manager's archives.
    ///
    /// `manager` must be a single plain path component, so the result
    /// always stays inside the cache root.
    pub fn manager_dir(&self, manager: &str) -> DepcacheResult<PathBuf> {
        let mut components = Path::new(manager).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) => Ok(self.root.join(name)),
            _ => Err(DepcacheError::UnknownManager(manager.to_string())),
        }
    }

    /// Remove the whole store, or one manager's subtree. Returns whether anything was removed.
    pub async fn clear(&self, manager: Option<&str>) -> DepcacheResult<bool> {
        let target = match manager {
            Some(name) => self.manager_dir(name)?,
            None => self.root.clone(),
        };

        match fs::remove_dir_all(&target).await {
            Ok(()) => {
                debug!("Removed {}", target.display());
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(DepcacheError::io(format!("removing {}", target.display()), e)),
        }
    }

    /// Remove archives older than `days`. Returns the removed entries.
    pub async fn gc(&self, days: u32, dry_run: bool) -> DepcacheResult<Vec<CacheEntry>> {
        let stale: Vec<CacheEntry> = self
            .entries()
            .await?
            .into_iter()
            .filter(|e| e.is_older_than_days(days))
            .collect();

        if !dry_run {
            for entry in &stale {
                debug!("Removing cache entry: {}", entry.path.display());
                fs::remove_file(&entry.path).await.map_err(|e| {
                    DepcacheError::io(format!("removing {}", entry.path.display()), e)
                })?;
            }
        }

        Ok(stale)
    }
}

/// Modification time of a file, or now if the platform can't report it
fn modified_at(meta: &std::fs::Metadata) -> DateTime<Utc> {
    meta.modified()
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now())
}

/// Subdirectories of `dir`; empty if `dir` doesn't exist
async fn list_dirs(dir: &Path) -> DepcacheResult<Vec<PathBuf>> {
    let mut read = match fs::read_dir(dir).await {
        Ok(r) => r,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(DepcacheError::io(format!("reading {}", dir.display()), e)),
    };

    let mut dirs = Vec::new();
    while let Some(item) = read
        .next_entry()
        .await
        .map_err(|e| DepcacheError::io(format!("reading {}", dir.display()), e))?
    {
        let is_dir = item.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
        if is_dir {
            dirs.push(item.path());
        }
    }
    Ok(dirs)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Fingerprint part of `<fingerprint>.tar.gz`, if `path` is an archive
fn archive_stem(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    let stem = name.strip_suffix(ARCHIVE_EXT)?.strip_suffix('.')?;
    (!stem.is_empty()).then(|| stem.to_string())
}
