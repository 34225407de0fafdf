//! The host collaborator handed to package lifecycle steps.
//!
//! [`BuildCtx`] owns what a step needs to know about its run (profile,
//! directories, resolved sources) and how to act on it (`sh`, and the
//! `default_*` procedures). Commands passed to [`BuildCtx::sh`] are expanded
//! through [`crate::placeholder`] with these variables:
//!
//! | Variable | Value |
//! | --- | --- |
//! | `name` | package name |
//! | `revision` | pinned revision of the primary source |
//! | `profile` | target profile identifier |
//! | `source_dir` | checked-out primary source |
//! | `staged_prefix` | private install root of this package |
//! | `package_prefix` | final install prefix of the bundle |
//! | `jobs` | make parallelism |
//! | `local_sources[N]` | local path of source N (0 is `source_dir`) |

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::{PackageDef, PackageError};
use crate::execute::Runner;
use crate::placeholder::{self, PlaceholderError, Resolver};
use crate::platform::Profile;
use crate::source::Fetcher;

/// Per-run settings the host fixes for one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildEnv {
  pub profile: Profile,
  pub source_dir: PathBuf,
  pub staged_prefix: PathBuf,
  pub package_prefix: PathBuf,
  pub jobs: usize,
}

pub struct BuildCtx<'a> {
  def: &'a PackageDef,
  env: BuildEnv,
  runner: &'a dyn Runner,
  fetcher: &'a dyn Fetcher,
  local_sources: Vec<PathBuf>,
}

impl<'a> BuildCtx<'a> {
  pub fn new(def: &'a PackageDef, env: BuildEnv, runner: &'a dyn Runner, fetcher: &'a dyn Fetcher) -> Self {
    Self {
      def,
      env,
      runner,
      fetcher,
      local_sources: Vec::new(),
    }
  }

  pub fn profile(&self) -> Profile {
    self.env.profile
  }

  /// Local paths of every source, in source order.
  ///
  /// Empty until [`BuildCtx::default_prep`] has materialized the sources.
  pub fn local_sources(&self) -> &[PathBuf] {
    &self.local_sources
  }

  /// Expand `%{...}` expressions in `template`.
  pub fn expand(&self, template: &str) -> Result<String, PlaceholderError> {
    placeholder::substitute(template, self)
  }

  /// Expand `cmd` and run it in the source directory.
  ///
  /// Returns the command's trimmed stdout. A non-zero exit status is an error.
  pub fn sh(&self, cmd: &str) -> Result<String, PackageError> {
    let expanded = self.expand(cmd)?;
    Ok(self.runner.run(&expanded, &self.env.source_dir)?)
  }

  /// Default preparation: check out the pinned primary source into the
  /// source directory and resolve every auxiliary local file.
  pub fn default_prep(&mut self) -> Result<(), PackageError> {
    info!(package = %self.def.name(), "fetching sources");
    self.local_sources = self
      .fetcher
      .fetch(self.def.name(), self.def.sources(), &self.env.source_dir)?;
    debug!(package = %self.def.name(), count = self.local_sources.len(), "sources ready");
    Ok(())
  }

  /// Default build: configure into the staged prefix, then make.
  pub fn default_build(&mut self) -> Result<(), PackageError> {
    info!(package = %self.def.name(), "building");
    self.sh("./configure --prefix=\"%{staged_prefix}\"")?;
    self.sh("make -j%{jobs}")?;
    Ok(())
  }

  /// Default install: `make install`.
  pub fn default_install(&mut self) -> Result<(), PackageError> {
    info!(package = %self.def.name(), "installing");
    self.sh("make install")?;
    Ok(())
  }
}

fn path_str(path: &Path) -> Cow<'_, str> {
  path.to_string_lossy()
}

impl Resolver for BuildCtx<'_> {
  fn resolve_var(&self, name: &str) -> Result<Cow<'_, str>, PlaceholderError> {
    match name {
      "name" => Ok(Cow::Borrowed(self.def.name())),
      "revision" => self
        .def
        .revision()
        .map(|rev| Cow::Borrowed(rev.as_str()))
        .ok_or_else(|| PlaceholderError::UnknownVar(name.to_string())),
      "profile" => Ok(Cow::Borrowed(self.env.profile.as_str())),
      "source_dir" => Ok(path_str(&self.env.source_dir)),
      "staged_prefix" => Ok(path_str(&self.env.staged_prefix)),
      "package_prefix" => Ok(path_str(&self.env.package_prefix)),
      "jobs" => Ok(Cow::Owned(self.env.jobs.to_string())),
      _ => Err(PlaceholderError::UnknownVar(name.to_string())),
    }
  }

  fn resolve_indexed(&self, name: &str, index: usize) -> Result<Cow<'_, str>, PlaceholderError> {
    if name != "local_sources" {
      return Err(PlaceholderError::UnknownVar(name.to_string()));
    }

    self
      .local_sources
      .get(index)
      .map(|path| path.to_string_lossy())
      .ok_or_else(|| PlaceholderError::IndexOutOfRange {
        name: name.to_string(),
        index,
        len: self.local_sources.len(),
      })
  }
}
