//! Persistent cache for dependency install directories
//!
//! Provides content-addressed caching keyed by manifest hashes.
//! Same manifest bytes + same tool version = same archive.
//!
//! # Layout
//!
//! | File | Description |
//! |------|-------------|
//! | `<root>/<cli>/<version>/<fingerprint>.tar.gz` | Archived install directory |
//! | `<install dir>/hash.txt` | Fingerprint the directory currently reflects |
//!
//! Archives are written to a `.partial-*` file and renamed into place, so
//! an archive that exists is always complete. Partials orphaned by an
//! interrupted capture are collected by `cache gc`.

pub mod archive;
pub mod fingerprint;
pub mod marker;
pub mod store;

pub use fingerprint::{fingerprint, Fingerprint};
pub use marker::MARKER_FILE;
pub use store::{format_bytes, CacheEntry, CacheStore, ARCHIVE_EXT, PARTIAL_PREFIX};
