//! The set of packages known to the host.
//!
//! Registration order is build order. Descriptors are validated as they are
//! registered, so everything the host later pulls out of the registry has a
//! usable name and a pinned primary source.

use thiserror::Error;
use tracing::debug;

use crate::package::{Package, PackageError};
use crate::source::SourceError;

#[derive(Debug, Error)]
pub enum RegistryError {
  #[error("package '{0}' is already registered")]
  Duplicate(String),

  #[error(transparent)]
  Invalid(#[from] PackageError),

  #[error("failed to construct descriptor: {0}")]
  Construct(#[from] SourceError),
}

#[derive(Default)]
pub struct Registry {
  packages: Vec<Box<dyn Package>>,
}

impl Registry {
  pub fn new() -> Self {
    Self::default()
  }

  /// A registry holding every descriptor shipped in [`crate::pkgs`].
  pub fn with_builtin() -> Result<Self, RegistryError> {
    let mut registry = Self::new();
    crate::pkgs::register_all(&mut registry)?;
    Ok(registry)
  }

  pub fn register(&mut self, package: impl Package + 'static) -> Result<(), RegistryError> {
    package.def().validate()?;

    if self.get(package.name()).is_some() {
      return Err(RegistryError::Duplicate(package.name().to_string()));
    }

    debug!(package = %package.name(), "registered package");
    self.packages.push(Box::new(package));
    Ok(())
  }

  pub fn get(&self, name: &str) -> Option<&dyn Package> {
    self.packages.iter().find(|p| p.name() == name).map(|p| p.as_ref())
  }

  /// Packages in registration order.
  pub fn iter(&self) -> impl Iterator<Item = &dyn Package> {
    self.packages.iter().map(|p| p.as_ref())
  }

  pub fn len(&self) -> usize {
    self.packages.len()
  }

  pub fn is_empty(&self) -> bool {
    self.packages.is_empty()
  }
}
