//! Package manager configuration
//!
//! A `ManagerConfig` is everything the cache pipeline needs to know about
//! one package manager for one run. It is built from a registry definition,
//! optional config-file overrides and CLI flags, then never mutated.

pub mod registry;
pub mod tool;

pub use registry::ManagerDefinition;
pub use tool::{CliVersion, PathResolver, StaticVersion, ToolResolver, VersionProvider};

use crate::config::schema::ManagerSettings;
use crate::error::{DepcacheError, DepcacheResult};
use crate::install;
use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Side effect run after a successful install, before archiving
#[async_trait]
pub trait PostInstall: Send + Sync {
    /// Run the hook; an error fails the install
    async fn run(&self, working_directory: &Path) -> DepcacheResult<()>;

    /// Short description for logs
    fn describe(&self) -> String;
}

/// Post-install hook that runs a shell command in the project directory
#[derive(Debug, Clone)]
pub struct ShellHook {
    command: String,
}

impl ShellHook {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

#[async_trait]
impl PostInstall for ShellHook {
    async fn run(&self, working_directory: &Path) -> DepcacheResult<()> {
        let code = install::run_shell(&self.command, working_directory).await?;
        if code == 0 {
            Ok(())
        } else {
            Err(DepcacheError::HookFailed {
                command: self.command.clone(),
                code,
            })
        }
    }

    fn describe(&self) -> String {
        self.command.clone()
    }
}

/// Per-invocation settings shared by every selected manager
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Directory the install runs in; relative paths resolve against it
    pub project_dir: PathBuf,
    /// Base directory for archives
    pub cache_root: PathBuf,
    /// Skip cache lookup
    pub force_refresh: bool,
    /// Extra options appended to every install command
    pub extra_options: Vec<String>,
}

/// Immutable description of one package manager for one run
#[derive(Clone)]
pub struct ManagerConfig {
    /// Tool identifier, e.g. `npm`
    pub cli_name: String,
    pub install_command: String,
    pub install_options: String,
    /// Where installed artifacts land
    pub install_directory: PathBuf,
    /// File whose bytes determine the cache key
    pub manifest_path: PathBuf,
    /// Working directory of the install command
    pub working_directory: PathBuf,
    pub cache_root: PathBuf,
    /// Namespaces the cache by tool version
    pub version_provider: Arc<dyn VersionProvider>,
    pub force_refresh: bool,
    pub post_install: Option<Arc<dyn PostInstall>>,
}

impl ManagerConfig {
    /// Build a config from a registry definition plus overrides
    pub fn from_definition(
        def: &ManagerDefinition,
        settings: Option<&ManagerSettings>,
        ctx: &RunContext,
    ) -> Self {
        let settings = settings.cloned().unwrap_or_default();

        let install_command = settings
            .command
            .unwrap_or_else(|| def.install_command.to_string());

        let mut options: Vec<String> = Vec::new();
        let base_options = settings
            .install_options
            .unwrap_or_else(|| def.install_options.to_string());
        if !base_options.trim().is_empty() {
            options.push(base_options.trim().to_string());
        }
        options.extend(ctx.extra_options.iter().cloned());

        let install_directory = settings
            .install_directory
            .unwrap_or_else(|| PathBuf::from(def.install_directory));
        let manifest = settings
            .manifest
            .unwrap_or_else(|| PathBuf::from(def.manifest));

        let post_install = settings
            .post_install
            .or_else(|| def.post_install.map(str::to_string))
            .filter(|c| !c.trim().is_empty())
            .map(|c| Arc::new(ShellHook::new(c)) as Arc<dyn PostInstall>);

        Self {
            cli_name: def.name.to_string(),
            install_command,
            install_options: options.join(" "),
            install_directory: ctx.project_dir.join(install_directory),
            manifest_path: ctx.project_dir.join(manifest),
            working_directory: ctx.project_dir.clone(),
            cache_root: ctx.cache_root.clone(),
            version_provider: Arc::new(CliVersion),
            force_refresh: ctx.force_refresh,
            post_install,
        }
    }

    /// Replace the version provider
    pub fn with_version_provider(mut self, provider: Arc<dyn VersionProvider>) -> Self {
        self.version_provider = provider;
        self
    }

    /// The full shell command line for the install
    pub fn command_line(&self) -> String {
        install::command_line(&self.install_command, &self.install_options)
    }
}

impl fmt::Debug for ManagerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagerConfig")
            .field("cli_name", &self.cli_name)
            .field("install_command", &self.install_command)
            .field("install_options", &self.install_options)
            .field("install_directory", &self.install_directory)
            .field("manifest_path", &self.manifest_path)
            .field("working_directory", &self.working_directory)
            .field("cache_root", &self.cache_root)
            .field("force_refresh", &self.force_refresh)
            .field(
                "post_install",
                &self.post_install.as_ref().map(|h| h.describe()),
            )
            .finish()
    }
}
