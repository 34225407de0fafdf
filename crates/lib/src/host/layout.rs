use std::path::{Path, PathBuf};

/// Directory layout under the build root.
///
/// ```text
/// <root>/
///   cache/<name>/    bare git repository
///   work/<name>/     checked-out source tree, patched and built in place
///   staged/<name>/   private install prefix
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
  root: PathBuf,
}

impl Layout {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  pub fn cache_dir(&self) -> PathBuf {
    self.root.join("cache")
  }

  pub fn work_dir(&self, name: &str) -> PathBuf {
    self.root.join("work").join(name)
  }

  pub fn staged_prefix(&self, name: &str) -> PathBuf {
    self.root.join("staged").join(name)
  }
}
