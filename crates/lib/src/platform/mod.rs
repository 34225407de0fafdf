//! Target platform handling.
//!
//! The host decides which [`Profile`] a run targets and hands it to every
//! package; descriptors branch on the enum rather than on raw strings.

pub mod paths;
mod profile;

use std::fmt;

pub use profile::{Profile, ProfileParseError};

/// The machine the host is running on (e.g., "aarch64-darwin").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Platform {
  pub arch: &'static str,
  pub profile: Profile,
}

impl Platform {
  /// Detect the running platform.
  ///
  /// Returns `None` if the operating system has no matching profile.
  pub fn current() -> Option<Self> {
    Some(Self {
      arch: std::env::consts::ARCH,
      profile: Profile::current()?,
    })
  }

  /// Returns the platform triple string (e.g., "aarch64-darwin")
  pub fn triple(&self) -> String {
    format!("{}-{}", self.arch, self.profile)
  }
}

impl fmt::Display for Platform {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.triple())
  }
}
