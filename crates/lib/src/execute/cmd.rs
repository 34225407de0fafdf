use std::collections::BTreeMap;
use std::path::Path;
use std::process::Command;

use tracing::{debug, info, warn};

use super::{ExecuteError, Runner};
use crate::consts::SOURCE_DATE_EPOCH;

/// Runs commands through `/bin/sh -c` (or a configured shell).
///
/// The parent environment is inherited, since native builds need the
/// toolchain on `PATH`. On top of it `SOURCE_DATE_EPOCH` is fixed for
/// reproducible timestamps.
#[derive(Debug, Clone)]
pub struct ShellRunner {
  shell: String,
  env: BTreeMap<String, String>,
}

impl Default for ShellRunner {
  fn default() -> Self {
    Self::new(None)
  }
}

impl ShellRunner {
  pub fn new(shell: Option<&str>) -> Self {
    let mut env = BTreeMap::new();
    env.insert("SOURCE_DATE_EPOCH".to_string(), SOURCE_DATE_EPOCH.to_string());
    Self {
      shell: shell.unwrap_or("/bin/sh").to_string(),
      env,
    }
  }

}

impl Runner for ShellRunner {
  fn run(&self, cmd: &str, cwd: &Path) -> Result<String, ExecuteError> {
    info!(cmd = %cmd, "executing command");

    if !cwd.is_dir() {
      return Err(ExecuteError::MissingCwd(cwd.to_path_buf()));
    }

    debug!(shell = %self.shell, cwd = ?cwd, "spawning process");

    let output = Command::new(&self.shell)
      .arg("-c")
      .arg(cmd)
      .current_dir(cwd)
      .envs(&self.env)
      .output()
      .map_err(|source| ExecuteError::Spawn {
        shell: self.shell.clone(),
        source,
      })?;

    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      if !stderr.is_empty() {
        warn!(stderr = %stderr.trim_end(), "command stderr");
      }
      if !stdout.is_empty() {
        debug!(stdout = %stdout, "command stdout");
      }

      return Err(ExecuteError::CmdFailed {
        cmd: cmd.to_string(),
        code: output.status.code(),
      });
    }

    if !stdout.is_empty() {
      debug!(stdout = %stdout, "command output");
    }

    Ok(stdout)
  }
}
