use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Target platform profile a build run is produced for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Profile {
  Darwin,
  Linux,
  Windows,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown profile '{0}' (expected one of: darwin, linux, windows)")]
pub struct ProfileParseError(pub String);

impl Profile {
  pub const ALL: [Profile; 3] = [Profile::Darwin, Profile::Linux, Profile::Windows];

  /// Profile matching the operating system the host runs on.
  pub fn current() -> Option<Self> {
    match std::env::consts::OS {
      "macos" => Some(Self::Darwin),
      "linux" => Some(Self::Linux),
      "windows" => Some(Self::Windows),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Darwin => "darwin",
      Self::Linux => "linux",
      Self::Windows => "windows",
    }
  }
}

impl fmt::Display for Profile {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for Profile {
  type Err = ProfileParseError;

  /// Parses a profile identifier. `macos` is accepted as an alias of `darwin`;
  /// anything else unknown is rejected so a typo cannot silently select
  /// another profile.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "darwin" | "macos" => Ok(Self::Darwin),
      "linux" => Ok(Self::Linux),
      "windows" => Ok(Self::Windows),
      _ => Err(ProfileParseError(s.to_string())),
    }
  }
}

impl TryFrom<String> for Profile {
  type Error = ProfileParseError;

  fn try_from(s: String) -> Result<Self, Self::Error> {
    s.parse()
  }
}
