//! Test doubles for sdkpack-lib.
//!
//! Lifecycle tests never spawn processes or touch the network: commands go
//! to a [`RecordingRunner`] and sources come from a [`StaticFetcher`].

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use crate::execute::{ExecuteError, Runner};
use crate::package::BuildEnv;
use crate::platform::Profile;
use crate::source::{Fetcher, SourceError, SourceSpec};

/// Records every command and can be told to fail some of them.
#[derive(Default)]
pub struct RecordingRunner {
  calls: RefCell<Vec<(String, PathBuf)>>,
  fail_on: Vec<String>,
  spawn_fail_on: Vec<String>,
}

impl RecordingRunner {
  pub fn new() -> Self {
    Self::default()
  }

  /// Commands containing `needle` exit with status 1.
  pub fn failing_on(mut self, needle: &str) -> Self {
    self.fail_on.push(needle.to_string());
    self
  }

  /// Commands containing `needle` cannot be spawned at all.
  pub fn unspawnable_on(mut self, needle: &str) -> Self {
    self.spawn_fail_on.push(needle.to_string());
    self
  }

  pub fn commands(&self) -> Vec<String> {
    self.calls.borrow().iter().map(|(cmd, _)| cmd.clone()).collect()
  }

  pub fn cwds(&self) -> Vec<PathBuf> {
    self.calls.borrow().iter().map(|(_, cwd)| cwd.clone()).collect()
  }

  /// Number of recorded commands containing `needle`.
  pub fn count(&self, needle: &str) -> usize {
    self.calls.borrow().iter().filter(|(cmd, _)| cmd.contains(needle)).count()
  }
}

impl Runner for RecordingRunner {
  fn run(&self, cmd: &str, cwd: &Path) -> Result<String, ExecuteError> {
    self.calls.borrow_mut().push((cmd.to_string(), cwd.to_path_buf()));

    if self.spawn_fail_on.iter().any(|needle| cmd.contains(needle.as_str())) {
      return Err(ExecuteError::Spawn {
        shell: "/bin/sh".to_string(),
        source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "permission denied"),
      });
    }

    if self.fail_on.iter().any(|needle| cmd.contains(needle.as_str())) {
      return Err(ExecuteError::CmdFailed {
        cmd: cmd.to_string(),
        code: Some(1),
      });
    }

    Ok(String::new())
  }
}

/// Returns a fixed list of local sources instead of fetching.
pub struct StaticFetcher {
  paths: Option<Vec<PathBuf>>,
  fetches: RefCell<usize>,
}

impl StaticFetcher {
  pub fn new(paths: &[&str]) -> Self {
    Self {
      paths: Some(paths.iter().map(PathBuf::from).collect()),
      fetches: RefCell::new(0),
    }
  }

  /// Every fetch fails as if a patch file were missing.
  pub fn failing() -> Self {
    Self {
      paths: None,
      fetches: RefCell::new(0),
    }
  }

  pub fn fetch_count(&self) -> usize {
    *self.fetches.borrow()
  }
}

impl Fetcher for StaticFetcher {
  fn fetch(&self, _name: &str, _sources: &[SourceSpec], _work_dir: &Path) -> Result<Vec<PathBuf>, SourceError> {
    *self.fetches.borrow_mut() += 1;
    self
      .paths
      .clone()
      .ok_or_else(|| SourceError::LocalNotFound(PathBuf::from("patches/missing.patch")))
  }
}

/// Build settings rooted at `/build` for a package named `theme`.
pub fn test_env(profile: Profile) -> BuildEnv {
  BuildEnv {
    profile,
    source_dir: PathBuf::from("/build/work/theme"),
    staged_prefix: PathBuf::from("/build/staged/theme"),
    package_prefix: PathBuf::from("/opt/sdk"),
    jobs: 4,
  }
}
