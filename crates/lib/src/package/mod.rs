//! Package descriptors and their lifecycle.
//!
//! A package is described by a [`PackageDef`] (its name and ordered sources)
//! and driven through three steps by the host, strictly in order:
//!
//! 1. `prep` - materialize sources and transform the tree (e.g. patches)
//! 2. `build` - run the native build
//! 3. `install` - install into the package's staged prefix
//!
//! Descriptors override the steps they need and call back into the
//! `default_*` steps on [`BuildCtx`] for the rest.
//!
//! # Submodules
//!
//! - [`ctx`] - the host collaborator handed to every lifecycle step

pub mod ctx;
mod types;

pub use ctx::{BuildCtx, BuildEnv};
pub use types::*;

/// A package known to the host.
///
/// Every step defaults to the standard procedure, so a descriptor with no
/// special needs only provides [`Package::def`].
pub trait Package {
  fn def(&self) -> &PackageDef;

  fn name(&self) -> &str {
    self.def().name()
  }

  /// Prepare the source tree. Errors halt the package.
  fn prep(&self, ctx: &mut BuildCtx<'_>) -> Result<(), PackageError> {
    ctx.default_prep()
  }

  /// Compile the package.
  fn build(&self, ctx: &mut BuildCtx<'_>) -> Result<(), PackageError> {
    ctx.default_build()
  }

  /// Install into the staged prefix.
  fn install(&self, ctx: &mut BuildCtx<'_>) -> Result<(), PackageError> {
    ctx.default_install()
  }
}

/// A package that uses the default procedure for every step.
#[derive(Debug, Clone)]
pub struct BasicPackage(pub PackageDef);

impl Package for BasicPackage {
  fn def(&self) -> &PackageDef {
    &self.0
  }
}
