//! Shell command execution for package lifecycle steps.
//!
//! Every lifecycle step ends up here: a fully expanded command string is run
//! through a shell, synchronously, in the package's source directory. The
//! [`Runner`] trait is the seam between packages and processes; the host uses
//! [`ShellRunner`], tests substitute a recording double.

mod cmd;
mod types;

use std::fmt::Display;
use std::path::Path;

use tracing::warn;

pub use cmd::ShellRunner;
pub use types::ExecuteError;

/// Runs expanded shell commands.
pub trait Runner {
  /// Run `cmd` in `cwd`, blocking until it exits.
  ///
  /// Returns the trimmed stdout on a zero exit status.
  fn run(&self, cmd: &str, cwd: &Path) -> Result<String, ExecuteError>;
}

/// Discard the outcome of a best-effort step.
///
/// Failures are logged at `warn` and dropped so the caller carries on with
/// its next step regardless of how this one ended.
pub fn ignore_failure<T, E: Display>(step: &str, result: Result<T, E>) {
  if let Err(e) = result {
    warn!(step, error = %e, "optional step failed, continuing");
  }
}
