//! Cache orchestration
//!
//! Ties fingerprinting, the cache store, the archive codec and the install
//! runner together for one package manager:
//!
//! ```text
//! manifest? ── no ──> Skipped
//!    │
//! tool on PATH? ── no ──> ToolMissing
//!    │
//! fingerprint + archive path
//!    │
//! archive exists && !force_refresh ── yes ──> marker current? ── yes ──> UpToDate
//!    │                                             │ no
//!    │                                     clear, restore, mark ──> Restored
//!    │ no
//! install, mark, capture ──> Installed
//! ```

mod pipeline;

pub use pipeline::{CacheOrchestrator, CachePlan};

use std::fmt;

/// Terminal success state of one manager run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No manifest, nothing to install
    Skipped,
    /// Cache hit and the install directory already matched
    UpToDate,
    /// Cache hit, install directory rebuilt from the archive
    Restored,
    /// Cache miss, installed and archived
    Installed,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skipped => write!(f, "skipped"),
            Self::UpToDate => write!(f, "up to date"),
            Self::Restored => write!(f, "restored from cache"),
            Self::Installed => write!(f, "installed and cached"),
        }
    }
}
