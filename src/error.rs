//! Error types for depcache
//!
//! All modules use `DepcacheResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for depcache operations
pub type DepcacheResult<T> = Result<T, DepcacheError>;

/// All errors that can occur in depcache
#[derive(Error, Debug)]
pub enum DepcacheError {
    // Environment errors
    #[error("{name} is not installed or not on PATH")]
    ToolMissing { name: String },

    #[error("Unknown package manager: {0}")]
    UnknownManager(String),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Install errors
    #[error("Install command failed: {command}, exit code: {code}")]
    Install { command: String, code: i32 },

    #[error("Post-install hook failed: {command}, exit code: {code}")]
    HookFailed { command: String, code: i32 },

    #[error("{0} package manager(s) failed")]
    ManagersFailed(usize),

    #[error("Could not determine {name} version: {reason}")]
    VersionUnavailable { name: String, reason: String },

    // Archive errors
    #[error("Archive error at {path}: {reason}")]
    Archive { path: PathBuf, reason: String },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Process errors
    #[error("Command failed to start: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Process terminated by signal: {command}")]
    ProcessSignaled { command: String },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // User interaction
    #[error("Prompt failed: {0}")]
    Prompt(String),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DepcacheError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create an archive error for a path
    pub fn archive(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Archive {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Underlying OS error for variants whose message carries only context
    pub fn os_cause(&self) -> Option<&std::io::Error> {
        match self {
            Self::Io { source, .. }
            | Self::ConfigDirCreate { source, .. }
            | Self::CommandFailed { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Message plus the OS reason, e.g. `IO error: reading x: Permission denied`
    pub fn describe(&self) -> String {
        match self.os_cause() {
            Some(cause) => format!("{}: {}", self, cause),
            None => self.to_string(),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::ToolMissing { .. } => {
                Some("Install the package manager or add it to PATH, then retry")
            }
            Self::UnknownManager(_) => Some("Run: depcache managers"),
            Self::Install { .. } => Some("Re-run with -v to see the install output"),
            Self::Archive { .. } => Some("Run: depcache cache clean, then install again"),
            _ => None,
        }
    }
}
