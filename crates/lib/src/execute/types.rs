use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum ExecuteError {
  /// The command ran and exited with a non-zero status.
  ///
  /// `code` is `None` when the process was terminated by a signal.
  #[error("command failed with exit code {code:?}: {cmd}")]
  CmdFailed { cmd: String, code: Option<i32> },

  /// The shell could not be started.
  #[error("failed to spawn '{shell}': {source}")]
  Spawn {
    shell: String,
    #[source]
    source: std::io::Error,
  },

  /// The working directory is missing.
  #[error("working directory does not exist: {0}")]
  MissingCwd(std::path::PathBuf),
}
