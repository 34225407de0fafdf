use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::execute::ExecuteError;
use crate::placeholder::PlaceholderError;
use crate::source::{Revision, SourceError, SourceSpec};

/// Errors surfaced by a package lifecycle step.
#[derive(Debug, Error)]
pub enum PackageError {
  #[error(transparent)]
  Execute(#[from] ExecuteError),

  #[error("template error: {0}")]
  Placeholder(#[from] PlaceholderError),

  #[error(transparent)]
  Source(#[from] SourceError),

  /// The descriptor itself is malformed.
  #[error("invalid package '{name}': {reason}")]
  Invalid { name: String, reason: String },
}

/// Name and ordered sources of a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDef {
  name: String,
  sources: Vec<SourceSpec>,
}

impl PackageDef {
  pub fn new(name: &str, sources: Vec<SourceSpec>) -> Self {
    Self {
      name: name.to_string(),
      sources,
    }
  }

  /// A package whose only source is a repository pinned at `revision`.
  pub fn git(name: &str, url: &str, revision: Revision) -> Self {
    Self::new(name, vec![SourceSpec::git(url, revision)])
  }

  /// Append auxiliary local files after the existing sources.
  pub fn extend_sources<I, P>(&mut self, paths: I)
  where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
  {
    self.sources.extend(paths.into_iter().map(SourceSpec::local));
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn sources(&self) -> &[SourceSpec] {
    &self.sources
  }

  /// Revision of the primary source, if it is a repository.
  pub fn revision(&self) -> Option<&Revision> {
    match self.sources.first() {
      Some(SourceSpec::Git { revision, .. }) => Some(revision),
      _ => None,
    }
  }

  /// Auxiliary sources, i.e. everything after the primary one.
  pub fn auxiliary_sources(&self) -> &[SourceSpec] {
    self.sources.get(1..).unwrap_or_default()
  }

  /// Check the shape the host relies on: a usable name, a pinned primary
  /// repository and only local files after it.
  pub fn validate(&self) -> Result<(), PackageError> {
    let invalid = |reason: &str| PackageError::Invalid {
      name: self.name.clone(),
      reason: reason.to_string(),
    };

    if self.name.trim().is_empty() {
      return Err(invalid("name is empty"));
    }
    if self.name.contains(['/', '\\']) || self.name.starts_with('.') {
      return Err(invalid("name must be usable as a directory name"));
    }
    if self.sources.is_empty() {
      return Err(invalid("no sources declared"));
    }
    if self.revision().is_none() {
      return Err(invalid("primary source must be a pinned git repository"));
    }
    if self
      .auxiliary_sources()
      .iter()
      .any(|spec| matches!(spec, SourceSpec::Git { .. }))
    {
      return Err(invalid("auxiliary sources must be local files"));
    }

    Ok(())
  }
}
