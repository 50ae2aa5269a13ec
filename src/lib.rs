//! depcache - content-addressed cache for dependency installs
//!
//! Hashes a package manager's manifest, and either restores the install
//! directory from a cached archive or runs the install and archives the
//! result.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod install;
pub mod manager;
pub mod orchestration;
pub mod ui;

pub use error::{DepcacheError, DepcacheResult};
