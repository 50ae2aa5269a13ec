//! CLI command implementations

pub mod cache;
pub mod config;
pub mod hash;
pub mod install;
pub mod managers;

pub use cache::execute as cache;
pub use config::execute as config;
pub use hash::execute as hash;
pub use install::execute as install;
pub use managers::execute as managers;

use crate::error::{DepcacheError, DepcacheResult};
use crate::manager::{registry, ManagerDefinition};
use std::env;
use std::path::{Path, PathBuf};

/// Explicit project directory, or the current one
pub(crate) fn resolve_project_dir(project: Option<&Path>) -> DepcacheResult<PathBuf> {
    match project {
        Some(path) => path.canonicalize().map_err(|e| {
            DepcacheError::io(format!("resolving project directory {}", path.display()), e)
        }),
        None => env::current_dir().map_err(|e| DepcacheError::io("getting current directory", e)),
    }
}

/// Named managers, or every manager detected in the project
pub(crate) fn select_managers(
    names: &[String],
    project_dir: &Path,
) -> DepcacheResult<Vec<&'static ManagerDefinition>> {
    if names.is_empty() {
        return Ok(registry::detect(project_dir));
    }
    names.iter().map(|name| registry::find(name)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn select_named_managers_in_order() {
        let dir = TempDir::new().unwrap();
        let names = vec!["bower".to_string(), "npm".to_string()];
        let selected = select_managers(&names, dir.path()).unwrap();
        let selected: Vec<_> = selected.iter().map(|m| m.name).collect();
        assert_eq!(selected, vec!["bower", "npm"]);
    }

    #[test]
    fn select_rejects_unknown_manager() {
        let dir = TempDir::new().unwrap();
        let names = vec!["npm".to_string(), "maven".to_string()];
        assert!(matches!(
            select_managers(&names, dir.path()),
            Err(DepcacheError::UnknownManager(name)) if name == "maven"
        ));
    }

    #[test]
    fn select_detects_when_empty() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("composer.json"), "{}").unwrap();
        let selected = select_managers(&[], dir.path()).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name, "composer");
    }

    #[test]
    fn missing_project_dir_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = resolve_project_dir(Some(&dir.path().join("nope"))).unwrap_err();
        assert!(matches!(err, DepcacheError::Io { .. }));
    }
}
