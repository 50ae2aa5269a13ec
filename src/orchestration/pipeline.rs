//! Per-manager cache pipeline

use crate::cache::{archive, fingerprint, marker, CacheStore, Fingerprint};
use crate::error::{DepcacheError, DepcacheResult};
use crate::install::{InstallRunner, ShellInstallRunner};
use crate::manager::{ManagerConfig, PathResolver, ToolResolver};
use crate::orchestration::Outcome;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info, info_span, warn, Instrument};

/// Cache key and archive location for one manager run
#[derive(Debug, Clone)]
pub struct CachePlan {
    /// Manifest fingerprint
    pub fingerprint: Fingerprint,
    /// Tool version namespace
    pub cli_version: String,
    /// Where the archive lives (or would live)
    pub archive_path: PathBuf,
    /// Whether the archive exists right now
    pub cached: bool,
}

/// Drives a manager through hash -> lookup -> restore | install + capture
pub struct CacheOrchestrator {
    runner: Arc<dyn InstallRunner>,
    resolver: Arc<dyn ToolResolver>,
}

impl CacheOrchestrator {
    /// Orchestrator using the shell and `PATH`
    pub fn new() -> Self {
        Self::with_parts(Arc::new(ShellInstallRunner), Arc::new(PathResolver))
    }

    /// Orchestrator with a custom install runner and tool resolver
    pub fn with_parts(runner: Arc<dyn InstallRunner>, resolver: Arc<dyn ToolResolver>) -> Self {
        Self { runner, resolver }
    }

    /// Run the full pipeline for one manager
    pub async fn run(&self, config: &ManagerConfig) -> DepcacheResult<Outcome> {
        let span = info_span!("manager", manager = %config.cli_name);
        self.run_pipeline(config).instrument(span).await
    }

    /// Compute the cache key and archive path without changing anything.
    ///
    /// Returns `None` when the manifest doesn't exist.
    pub async fn plan(&self, config: &ManagerConfig) -> DepcacheResult<Option<CachePlan>> {
        if !is_file(&config.manifest_path).await {
            return Ok(None);
        }

        if self.resolver.resolve(&config.cli_name).is_none() {
            return Err(DepcacheError::ToolMissing {
                name: config.cli_name.clone(),
            });
        }

        let fingerprint = fingerprint(&config.manifest_path).await?;
        let cli_version = config.version_provider.version(&config.cli_name).await?;
        let archive_path =
            CacheStore::new(&config.cache_root).locate(&config.cli_name, &cli_version, &fingerprint);
        let cached = CacheStore::exists(&archive_path).await;

        Ok(Some(CachePlan {
            fingerprint,
            cli_version,
            archive_path,
            cached,
        }))
    }

    async fn run_pipeline(&self, config: &ManagerConfig) -> DepcacheResult<Outcome> {
        let Some(plan) = self.plan(config).await? else {
            info!(
                "No {} found, nothing to install",
                config.manifest_path.display()
            );
            return Ok(Outcome::Skipped);
        };

        debug!(
            fingerprint = %plan.fingerprint,
            version = %plan.cli_version,
            archive = %plan.archive_path.display(),
            "Computed cache key"
        );

        if plan.cached && !config.force_refresh {
            return self.restore(config, &plan).await;
        }

        if plan.cached {
            info!("Force refresh requested, ignoring cached archive");
        }
        self.install(config, &plan).await
    }

    async fn restore(&self, config: &ManagerConfig, plan: &CachePlan) -> DepcacheResult<Outcome> {
        let install_dir = &config.install_directory;

        if marker::is_current(install_dir, &plan.fingerprint).await {
            info!("{} is up to date", install_dir.display());
            return Ok(Outcome::UpToDate);
        }

        info!(
            "Restoring {} from {}",
            install_dir.display(),
            plan.archive_path.display()
        );
        clear_directory(install_dir).await?;

        // No marker is written on failure, so the next run clears and retries.
        archive::restore(&plan.archive_path, install_dir).await?;
        marker::write(install_dir, &plan.fingerprint).await?;

        Ok(Outcome::Restored)
    }

    async fn install(&self, config: &ManagerConfig, plan: &CachePlan) -> DepcacheResult<Outcome> {
        info!("No cached archive for {}, installing", plan.fingerprint);
        self.runner.run(config).await?;

        let install_dir = &config.install_directory;
        CacheStore::ensure_directory(install_dir).await?;
        marker::write(install_dir, &plan.fingerprint).await?;

        let archived: DepcacheResult<()> = async {
            if let Some(parent) = plan.archive_path.parent() {
                CacheStore::ensure_directory(parent).await?;
            }
            archive::capture(install_dir, &plan.archive_path).await
        }
        .await;
        if let Err(e) = archived {
            warn!("Install succeeded but archiving failed; installed files are kept");
            return Err(e);
        }

        info!("Cached {} at {}", install_dir.display(), plan.archive_path.display());
        Ok(Outcome::Installed)
    }
}

impl Default for CacheOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

async fn is_file(path: &Path) -> bool {
    fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

/// Remove `dir` recursively and recreate it empty
async fn clear_directory(dir: &Path) -> DepcacheResult<()> {
    match fs::remove_dir_all(dir).await {
        Ok(()) => debug!("Cleared {}", dir.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(DepcacheError::io(format!("removing {}", dir.display()), e)),
    }
    CacheStore::ensure_directory(dir).await
}
