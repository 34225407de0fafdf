//! Run configuration.
//!
//! Settings come from an optional `sdkpack.toml`; every field has a default
//! and command-line flags override whatever the file says.
//!
//! ```toml
//! profile = "darwin"
//! root = "/var/tmp/sdk-build"
//! packages_dir = "packaging/MacSDK"
//! package_prefix = "/Library/Frameworks/Mono.framework/Versions/6.12.0"
//! jobs = 8
//! keep_going = true
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::consts::DEFAULT_PACKAGE_PREFIX;
use crate::platform::{Profile, paths};

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config '{path}': {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("invalid config '{path}': {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: Box<toml::de::Error>,
  },

  #[error("no profile configured and the running OS has none; pass one explicitly")]
  NoProfile,

  #[error("jobs must be at least 1")]
  ZeroJobs,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
  /// Target profile. `None` means the profile of the running OS.
  pub profile: Option<Profile>,
  /// Build root holding `cache/`, `work/` and `staged/`.
  pub root: PathBuf,
  /// Directory auxiliary local sources are resolved against.
  pub packages_dir: PathBuf,
  /// Final install prefix of the bundle.
  pub package_prefix: PathBuf,
  /// Make parallelism.
  pub jobs: usize,
  /// Shell used to run commands.
  pub shell: Option<String>,
  /// Rebuild packages even when their staged prefix is complete.
  pub force: bool,
  /// Continue with the next package after a failure.
  pub keep_going: bool,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      profile: None,
      root: paths::default_root(),
      packages_dir: PathBuf::from("."),
      package_prefix: PathBuf::from(DEFAULT_PACKAGE_PREFIX),
      jobs: std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
      shell: None,
      force: false,
      keep_going: false,
    }
  }
}

impl Config {
  /// Load a config file. Relative directories in it are resolved against
  /// the file's own directory.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;

    let mut config = Self::parse(&content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source: Box::new(source),
    })?;

    if let Some(base) = path.parent() {
      config.root = base.join(&config.root);
      config.packages_dir = base.join(&config.packages_dir);
    }

    debug!(path = %path.display(), "loaded config");
    Ok(config)
  }

  /// Load `path` if it exists, otherwise fall back to defaults.
  pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
    if path.exists() {
      Self::load(path)
    } else {
      Ok(Self::default())
    }
  }

  pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
    toml::from_str(content)
  }

  /// The profile this run targets.
  pub fn target_profile(&self) -> Result<Profile, ConfigError> {
    self.profile.or_else(Profile::current).ok_or(ConfigError::NoProfile)
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.jobs == 0 {
      return Err(ConfigError::ZeroJobs);
    }
    self.target_profile()?;
    Ok(())
  }
}
