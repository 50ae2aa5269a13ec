//! Tool discovery and version probing
//!
//! PATH lookup goes through `which`; versions come from `<cli> --version`.

use crate::error::{DepcacheError, DepcacheResult};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Resolves a CLI name to an executable
pub trait ToolResolver: Send + Sync {
    /// Path of the executable, or None if it isn't available
    fn resolve(&self, cli_name: &str) -> Option<PathBuf>;
}

/// Resolver backed by the `PATH` environment variable
#[derive(Debug, Clone, Copy, Default)]
pub struct PathResolver;

impl ToolResolver for PathResolver {
    fn resolve(&self, cli_name: &str) -> Option<PathBuf> {
        which::which(cli_name).ok()
    }
}

/// Supplies the installed version of a package manager
#[async_trait]
pub trait VersionProvider: Send + Sync {
    /// Version string, already safe to use as a single path component
    async fn version(&self, cli_name: &str) -> DepcacheResult<String>;
}

/// Version provider that runs `<cli> --version`
#[derive(Debug, Clone, Copy, Default)]
pub struct CliVersion;

#[async_trait]
impl VersionProvider for CliVersion {
    async fn version(&self, cli_name: &str) -> DepcacheResult<String> {
        let program = which::which(cli_name).map_err(|_| DepcacheError::ToolMissing {
            name: cli_name.to_string(),
        })?;
        debug!("Executing: {} --version", program.display());

        let output = Command::new(&program)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| DepcacheError::command_failed(format!("{} --version", cli_name), e))?;

        if !output.status.success() {
            return Err(DepcacheError::VersionUnavailable {
                name: cli_name.to_string(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_version(&String::from_utf8_lossy(&output.stdout)).ok_or_else(|| {
            DepcacheError::VersionUnavailable {
                name: cli_name.to_string(),
                reason: "empty --version output".to_string(),
            }
        })
    }
}

/// Fixed version, for callers that already know it
#[derive(Debug, Clone)]
pub struct StaticVersion(pub String);

#[async_trait]
impl VersionProvider for StaticVersion {
    async fn version(&self, _cli_name: &str) -> DepcacheResult<String> {
        Ok(sanitize_component(&self.0))
    }
}

/// Extract a path-safe version from `--version` output.
///
/// Prefers the first token that looks like a version number
/// (`Composer version 2.6.5 ...` -> `2.6.5`, `v18.19.0` -> `18.19.0`),
/// falling back to the whole first line.
pub fn parse_version(output: &str) -> Option<String> {
    let line = output.lines().map(str::trim).find(|l| !l.is_empty())?;

    let token = line
        .split_whitespace()
        .map(|t| t.trim_start_matches('v'))
        .find(|t| t.starts_with(|c: char| c.is_ascii_digit()))
        .unwrap_or(line);

    Some(sanitize_component(token))
}

/// Replace anything that could escape or split a path component
fn sanitize_component(value: &str) -> String {
    let cleaned: String = value
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '+') {
                c
            } else {
                '_'
            }
        })
        .collect();

    match cleaned.as_str() {
        "" | "." | ".." => "unknown".to_string(),
        _ => cleaned,
    }
}
