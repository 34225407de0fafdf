use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while describing or materializing sources.
#[derive(Debug, Error)]
pub enum SourceError {
  /// The revision does not pin a single commit.
  #[error("revision '{0}' is not a full commit id")]
  InvalidRevision(String),

  /// The package has no sources at all.
  #[error("package declares no sources")]
  Empty,

  /// Index 0 must be the version-controlled repository.
  #[error("primary source must be a git repository, got {0}")]
  PrimaryNotGit(String),

  /// Only the primary source may be a repository.
  #[error("auxiliary source {index} is a git repository; only local files are supported")]
  AuxiliaryGit { index: usize },

  /// Failed to clone a git repository.
  #[error("failed to clone repository '{url}': {source}")]
  Clone {
    url: String,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },

  /// Failed to open an existing git repository.
  #[error("failed to open repository at '{path}': {source}")]
  Open {
    path: PathBuf,
    #[source]
    source: Box<gix::open::Error>,
  },

  /// No remote configured in the cached repository.
  #[error("no remote configured for repository")]
  NoRemote,

  /// Failed to connect to or fetch from remote.
  #[error("failed to fetch from '{url}': {source}")]
  Fetch {
    url: String,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },

  /// The pinned revision is not present even after fetching.
  #[error("revision '{rev}' not found in '{url}'")]
  RevisionNotFound { url: String, rev: String },

  /// Failed to write the pinned tree into the work directory.
  #[error("failed to checkout revision '{rev}': {source}")]
  Checkout {
    rev: String,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },

  /// An auxiliary local file does not exist.
  #[error("local source not found: {0}")]
  LocalNotFound(PathBuf),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

/// A commit id pinning the fetched tree.
///
/// Only full hexadecimal object ids are accepted (40 digits for SHA-1, 64 for
/// SHA-256); branch names, tags and abbreviated ids can move or become
/// ambiguous and are rejected. The id is stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Revision(String);

impl Revision {
  pub fn new(rev: &str) -> Result<Self, SourceError> {
    let is_hex = rev.chars().all(|c| c.is_ascii_hexdigit());
    if is_hex && matches!(rev.len(), 40 | 64) {
      Ok(Self(rev.to_ascii_lowercase()))
    } else {
      Err(SourceError::InvalidRevision(rev.to_string()))
    }
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// First 12 digits, for log lines and listings.
  pub fn short(&self) -> &str {
    &self.0[..12]
  }
}

impl fmt::Display for Revision {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl FromStr for Revision {
  type Err = SourceError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::new(s)
  }
}

impl TryFrom<String> for Revision {
  type Error = SourceError;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    Self::new(&value)
  }
}

impl From<Revision> for String {
  fn from(rev: Revision) -> Self {
    rev.0
  }
}

/// One entry of a package's ordered source list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceSpec {
  /// Repository checked out at a pinned revision.
  Git { url: String, revision: Revision },

  /// File shipped alongside the descriptors, relative to the packages directory.
  Local { path: PathBuf },
}

impl SourceSpec {
  pub fn git(url: &str, revision: Revision) -> Self {
    Self::Git {
      url: url.to_string(),
      revision,
    }
  }

  pub fn local(path: impl Into<PathBuf>) -> Self {
    Self::Local { path: path.into() }
  }
}

impl fmt::Display for SourceSpec {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Git { url, revision } => write!(f, "{url}@{revision}"),
      Self::Local { path } => write!(f, "{}", path.display()),
    }
  }
}
