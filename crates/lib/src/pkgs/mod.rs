//! Package descriptors shipped with sdkpack.
//!
//! Each submodule describes one dependency of the SDK bundle. Adding a
//! descriptor means adding its module and one line to [`register_all`];
//! constructing a descriptor there is what registers it.

pub mod xamarin_gtk_theme;

use crate::registry::{Registry, RegistryError};

/// Construct and register every shipped descriptor, in build order.
pub fn register_all(registry: &mut Registry) -> Result<(), RegistryError> {
  registry.register(xamarin_gtk_theme::XamarinGtkTheme::new()?)?;
  Ok(())
}
