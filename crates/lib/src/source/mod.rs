//! Package sources.
//!
//! A package lists its sources in order: index 0 is the primary
//! version-controlled repository pinned to a [`Revision`], the following
//! entries are auxiliary local files (usually patches) that live next to the
//! package descriptors.
//!
//! # Submodules
//!
//! - [`fetch`] - git clone/fetch, pinned checkout and local path resolution

pub mod fetch;
mod types;

use std::path::{Path, PathBuf};

pub use fetch::GitFetcher;
pub use types::*;

/// Materializes a package's sources on disk.
///
/// Implementations check out the primary source into `work_dir` and return
/// the absolute local path of every source, in source order: index 0 is the
/// checked-out tree, index N the resolved path of source N.
pub trait Fetcher {
  fn fetch(&self, name: &str, sources: &[SourceSpec], work_dir: &Path) -> Result<Vec<PathBuf>, SourceError>;
}
