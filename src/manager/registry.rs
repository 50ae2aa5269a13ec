//! Built-in package manager definitions

use crate::error::{DepcacheError, DepcacheResult};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Static description of a supported package manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagerDefinition {
    /// CLI name, also the cache namespace
    pub name: &'static str,
    /// Install invocation
    pub install_command: &'static str,
    /// Default options appended to the install command
    pub install_options: &'static str,
    /// Install directory, relative to the project
    pub install_directory: &'static str,
    /// Manifest whose bytes key the cache, relative to the project
    pub manifest: &'static str,
    /// Shell command run after a fresh install
    pub post_install: Option<&'static str>,
}

impl fmt::Display for ManagerDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// All definitions, in detection priority order.
///
/// Lockfile-keyed managers come before npm so a yarn or pnpm project
/// is not also installed by npm into the same `node_modules`.
const MANAGERS: &[ManagerDefinition] = &[
    ManagerDefinition {
        name: "yarn",
        install_command: "yarn install",
        install_options: "--frozen-lockfile",
        install_directory: "node_modules",
        manifest: "yarn.lock",
        post_install: None,
    },
    ManagerDefinition {
        name: "pnpm",
        install_command: "pnpm install",
        install_options: "--frozen-lockfile",
        install_directory: "node_modules",
        manifest: "pnpm-lock.yaml",
        post_install: None,
    },
    ManagerDefinition {
        name: "npm",
        install_command: "npm install",
        install_options: "",
        install_directory: "node_modules",
        manifest: "package.json",
        post_install: None,
    },
    ManagerDefinition {
        name: "bower",
        install_command: "bower install",
        install_options: "",
        install_directory: "bower_components",
        manifest: "bower.json",
        post_install: None,
    },
    ManagerDefinition {
        name: "composer",
        install_command: "composer install",
        install_options: "--no-interaction",
        install_directory: "vendor",
        manifest: "composer.json",
        post_install: Some("composer dump-autoload"),
    },
];

/// Every registered manager
pub fn all() -> &'static [ManagerDefinition] {
    MANAGERS
}

/// Look up a manager by CLI name
pub fn find(name: &str) -> DepcacheResult<&'static ManagerDefinition> {
    MANAGERS
        .iter()
        .find(|m| m.name == name)
        .ok_or_else(|| DepcacheError::UnknownManager(name.to_string()))
}

/// Managers present in a project: the manifest exists and no
/// higher-priority manager already claimed the install directory
pub fn detect(project_dir: &Path) -> Vec<&'static ManagerDefinition> {
    let mut claimed = HashSet::new();
    let mut found = Vec::new();

    for def in MANAGERS {
        if !project_dir.join(def.manifest).is_file() {
            continue;
        }
        if !claimed.insert(def.install_directory) {
            debug!(
                "Skipping {}: {} already handled by another manager",
                def.name, def.install_directory
            );
            continue;
        }
        debug!("Detected {} manifest: {}", def.name, def.manifest);
        found.push(def);
    }

    found
}
