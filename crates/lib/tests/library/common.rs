//! Shared fixtures for the library integration tests.

use std::fs;
use std::path::{Path, PathBuf};

use sdkpack_lib::config::Config;
use sdkpack_lib::package::{BuildCtx, Package, PackageDef, PackageError};
use sdkpack_lib::platform::Profile;
use sdkpack_lib::source::{Fetcher, Revision, SourceError, SourceSpec};
use tempfile::TempDir;

pub const REV: &str = "0123456789abcdef0123456789abcdef01234567";

/// Materializes an empty source tree instead of cloning.
pub struct DirFetcher;

impl Fetcher for DirFetcher {
  fn fetch(&self, _name: &str, _sources: &[SourceSpec], work_dir: &Path) -> Result<Vec<PathBuf>, SourceError> {
    if work_dir.exists() {
      fs::remove_dir_all(work_dir)?;
    }
    fs::create_dir_all(work_dir)?;
    fs::write(work_dir.join("README"), "hello\n")?;
    Ok(vec![work_dir.to_path_buf()])
  }
}

/// A package whose build and install are plain shell commands.
pub struct ScriptPackage {
  def: PackageDef,
  build: &'static str,
}

impl ScriptPackage {
  pub fn new(name: &str, build: &'static str) -> Self {
    let def = PackageDef::git(name, "https://example.org/pkg.git", Revision::new(REV).unwrap());
    Self { def, build }
  }
}

impl Package for ScriptPackage {
  fn def(&self) -> &PackageDef {
    &self.def
  }

  fn build(&self, ctx: &mut BuildCtx<'_>) -> Result<(), PackageError> {
    ctx.sh(self.build)?;
    Ok(())
  }

  fn install(&self, ctx: &mut BuildCtx<'_>) -> Result<(), PackageError> {
    ctx.sh("mkdir -p \"%{staged_prefix}/share\" && cp built.txt \"%{staged_prefix}/share/%{name}.txt\"")?;
    Ok(())
  }
}

pub fn config(temp: &TempDir) -> Config {
  Config {
    profile: Some(Profile::Linux),
    root: temp.path().join("root"),
    packages_dir: temp.path().to_path_buf(),
    jobs: 1,
    ..Config::default()
  }
}
