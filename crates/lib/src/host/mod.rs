//! Build orchestration.
//!
//! The host owns the build root and drives registered packages through
//! `prep`, `build` and `install`, one package at a time in registration
//! order. A step that fails halts its package; the run then stops unless
//! `keep_going` is set.
//!
//! # Submodules
//!
//! - [`layout`] - directories under the build root
//! - [`marker`] - completion markers used to skip already staged packages

pub mod layout;
pub mod marker;

use std::fmt;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::{Config, ConfigError};
use crate::execute::{Runner, ShellRunner};
use crate::package::{BuildCtx, BuildEnv, Package, PackageError};
use crate::platform::Profile;
use crate::registry::Registry;
use crate::source::{Fetcher, GitFetcher};

pub use layout::Layout;
use marker::{StageMarker, read_marker, write_marker};

/// A package lifecycle step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
  Prep,
  Build,
  Install,
}

impl fmt::Display for Step {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Step::Prep => "prep",
      Step::Build => "build",
      Step::Install => "install",
    };
    write!(f, "{name}")
  }
}

#[derive(Debug, Error)]
pub enum HostError {
  #[error(transparent)]
  Config(#[from] ConfigError),

  #[error("unknown package: {0}")]
  UnknownPackage(String),

  #[error("{package}: {step} failed: {source}")]
  Step {
    package: String,
    step: Step,
    #[source]
    source: PackageError,
  },

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

/// What happened to one package during a run.
#[derive(Debug)]
pub enum Outcome {
  /// All steps ran and succeeded.
  Built,
  /// The staged prefix was already complete.
  Cached,
  /// A step failed.
  Failed(HostError),
  /// Not attempted because an earlier package failed.
  Skipped,
}

#[derive(Debug)]
pub struct PackageReport {
  pub name: String,
  pub outcome: Outcome,
  pub elapsed: Duration,
}

/// Result of a run, one entry per selected package in build order.
#[derive(Debug, Default)]
pub struct RunReport {
  pub packages: Vec<PackageReport>,
}

impl RunReport {
  fn names_where(&self, pred: impl Fn(&Outcome) -> bool) -> Vec<&str> {
    self
      .packages
      .iter()
      .filter(|p| pred(&p.outcome))
      .map(|p| p.name.as_str())
      .collect()
  }

  pub fn built(&self) -> Vec<&str> {
    self.names_where(|o| matches!(o, Outcome::Built))
  }

  pub fn cached(&self) -> Vec<&str> {
    self.names_where(|o| matches!(o, Outcome::Cached))
  }

  pub fn skipped(&self) -> Vec<&str> {
    self.names_where(|o| matches!(o, Outcome::Skipped))
  }

  pub fn failures(&self) -> impl Iterator<Item = (&str, &HostError)> {
    self.packages.iter().filter_map(|p| match &p.outcome {
      Outcome::Failed(e) => Some((p.name.as_str(), e)),
      _ => None,
    })
  }

  pub fn is_success(&self) -> bool {
    self.failures().next().is_none()
  }
}

/// Drives packages through their lifecycle.
pub struct Host<R = ShellRunner, F = GitFetcher> {
  config: Config,
  profile: Profile,
  layout: Layout,
  runner: R,
  fetcher: F,
}

impl Host {
  /// A host running real commands and fetching with git.
  pub fn new(config: Config) -> Result<Self, HostError> {
    let config = absolute_dirs(config)?;
    let layout = Layout::new(&config.root);
    let runner = ShellRunner::new(config.shell.as_deref());
    let fetcher = GitFetcher::new(layout.cache_dir(), &config.packages_dir);
    Self::with_parts(config, runner, fetcher)
  }
}

impl<R: Runner, F: Fetcher> Host<R, F> {
  /// Relative directories in `config` are resolved against the current
  /// directory, so every path handed to commands is absolute.
  pub fn with_parts(config: Config, runner: R, fetcher: F) -> Result<Self, HostError> {
    config.validate()?;
    let config = absolute_dirs(config)?;
    let profile = config.target_profile()?;
    let layout = Layout::new(&config.root);
    Ok(Self {
      config,
      profile,
      layout,
      runner,
      fetcher,
    })
  }

  pub fn profile(&self) -> Profile {
    self.profile
  }

  pub fn layout(&self) -> &Layout {
    &self.layout
  }

  pub fn runner(&self) -> &R {
    &self.runner
  }

  pub fn fetcher(&self) -> &F {
    &self.fetcher
  }

  /// Run the selected packages (all of them if `selection` is empty).
  ///
  /// Unknown names are rejected before anything runs.
  pub fn run(&self, registry: &Registry, selection: &[String]) -> Result<RunReport, HostError> {
    if let Some(unknown) = selection.iter().find(|name| registry.get(name).is_none()) {
      return Err(HostError::UnknownPackage(unknown.clone()));
    }

    let selected: Vec<&dyn Package> = registry
      .iter()
      .filter(|p| selection.is_empty() || selection.iter().any(|name| name == p.name()))
      .collect();

    info!(count = selected.len(), profile = %self.profile, "starting run");

    let mut report = RunReport::default();
    let mut halted = false;

    for package in selected {
      let name = package.name().to_string();

      if halted {
        report.packages.push(PackageReport {
          name,
          outcome: Outcome::Skipped,
          elapsed: Duration::ZERO,
        });
        continue;
      }

      let started = Instant::now();
      let outcome = match self.run_package(package) {
        Ok(outcome) => outcome,
        Err(e) => {
          error!(package = %name, error = %e, "package failed");
          halted = !self.config.keep_going;
          Outcome::Failed(e)
        }
      };

      report.packages.push(PackageReport {
        name,
        outcome,
        elapsed: started.elapsed(),
      });
    }

    Ok(report)
  }

  /// Run one package through prep, build and install.
  pub fn run_package(&self, package: &dyn Package) -> Result<Outcome, HostError> {
    let def = package.def();
    let name = def.name();
    let staged_prefix = self.layout.staged_prefix(name);
    let expected = StageMarker::expected(def, self.profile, &self.config.packages_dir);

    if !self.config.force
      && let Some(expected) = &expected
      && read_marker(&staged_prefix).as_ref() == Some(expected)
    {
      info!(package = %name, "staged prefix up to date, skipping");
      return Ok(Outcome::Cached);
    }

    if staged_prefix.exists() {
      warn!(package = %name, path = %staged_prefix.display(), "removing stale staged prefix");
      std::fs::remove_dir_all(&staged_prefix)?;
    }
    std::fs::create_dir_all(&staged_prefix)?;

    let env = BuildEnv {
      profile: self.profile,
      source_dir: self.layout.work_dir(name),
      staged_prefix: staged_prefix.clone(),
      package_prefix: self.config.package_prefix.clone(),
      jobs: self.config.jobs,
    };
    let mut ctx = BuildCtx::new(def, env, &self.runner, &self.fetcher);

    let step_err = |step: Step| {
      move |source: PackageError| HostError::Step {
        package: name.to_string(),
        step,
        source,
      }
    };

    info!(package = %name, step = %Step::Prep, "running step");
    package.prep(&mut ctx).map_err(step_err(Step::Prep))?;
    info!(package = %name, step = %Step::Build, "running step");
    package.build(&mut ctx).map_err(step_err(Step::Build))?;
    info!(package = %name, step = %Step::Install, "running step");
    package.install(&mut ctx).map_err(step_err(Step::Install))?;

    if let Some(marker) = expected {
      write_marker(&staged_prefix, &marker)?;
    }

    info!(package = %name, "package complete");
    Ok(Outcome::Built)
  }
}

fn absolute_dirs(mut config: Config) -> Result<Config, HostError> {
  config.root = std::path::absolute(&config.root)?;
  config.packages_dir = std::path::absolute(&config.packages_dir)?;
  Ok(config)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::package::{BasicPackage, PackageDef};
  use crate::pkgs::xamarin_gtk_theme::XamarinGtkTheme;
  use crate::source::Revision;
  use crate::util::testutil::{RecordingRunner, StaticFetcher};
  use tempfile::TempDir;

  const PATCH: &str = "patches/xamarin-gtk-theme-prototype.patch";

  struct Fixture {
    temp: TempDir,
    registry: Registry,
  }

  impl Fixture {
    fn new() -> Self {
      let temp = TempDir::new().unwrap();
      let packages_dir = temp.path().join("packages");
      std::fs::create_dir_all(packages_dir.join("patches")).unwrap();
      std::fs::write(packages_dir.join(PATCH), "--- a/gtkrc\n+++ b/gtkrc\n").unwrap();

      let mut registry = Registry::new();
      registry.register(XamarinGtkTheme::new().unwrap()).unwrap();

      Self { temp, registry }
    }

    fn config(&self, profile: Profile) -> Config {
      Config {
        profile: Some(profile),
        root: self.temp.path().join("root"),
        packages_dir: self.temp.path().join("packages"),
        package_prefix: "/opt/sdk".into(),
        jobs: 2,
        ..Config::default()
      }
    }

    fn patch_path(&self) -> String {
      self.temp.path().join("packages").join(PATCH).to_string_lossy().to_string()
    }

    fn host(&self, config: Config, runner: RecordingRunner) -> Host<RecordingRunner, StaticFetcher> {
      let work = config.root.join("work/xamarin-gtk-theme");
      let patch = self.patch_path();
      let fetcher = StaticFetcher::new(&[work.to_str().unwrap(), patch.as_str()]);
      Host::with_parts(config, runner, fetcher).unwrap()
    }
  }

  fn basic(name: &str) -> BasicPackage {
    let rev = Revision::new("0123456789abcdef0123456789abcdef01234567").unwrap();
    BasicPackage(PackageDef::git(name, &format!("https://example.org/{name}.git"), rev))
  }

  #[test]
  fn darwin_run_patches_builds_and_installs() {
    let fx = Fixture::new();
    let config = fx.config(Profile::Darwin);
    let staged = config.root.join("staged/xamarin-gtk-theme");
    let host = fx.host(config, RecordingRunner::new());

    let report = host.run(&fx.registry, &[]).unwrap();

    assert!(report.is_success());
    assert_eq!(report.built(), vec!["xamarin-gtk-theme"]);
    assert_eq!(
      host.runner().commands(),
      vec![
        format!("patch -p1 < \"{}\"", fx.patch_path()),
        format!("./autogen.sh --prefix={}", staged.display()),
        format!("./configure --prefix=\"{}\"", staged.display()),
        "make -j2".to_string(),
        "make install".to_string(),
      ]
    );
    assert!(staged.join(crate::consts::COMPLETE_MARKER).exists());
  }

  #[test]
  fn linux_run_skips_patches() {
    let fx = Fixture::new();
    let host = fx.host(fx.config(Profile::Linux), RecordingRunner::new());

    let report = host.run(&fx.registry, &[]).unwrap();

    assert!(report.is_success());
    assert_eq!(host.runner().count("patch -p1"), 0);
    assert_eq!(host.runner().count("make install"), 1);
  }

  #[test]
  fn failing_autogen_does_not_fail_the_run() {
    let fx = Fixture::new();
    let host = fx.host(fx.config(Profile::Darwin), RecordingRunner::new().failing_on("autogen.sh"));

    let report = host.run(&fx.registry, &[]).unwrap();

    assert!(report.is_success());
    assert_eq!(host.runner().count("./configure"), 1);
  }

  #[test]
  fn failing_patch_halts_before_build() {
    let fx = Fixture::new();
    let host = fx.host(fx.config(Profile::Darwin), RecordingRunner::new().failing_on("patch -p1"));

    let report = host.run(&fx.registry, &[]).unwrap();

    assert!(!report.is_success());
    let (name, err) = report.failures().next().unwrap();
    assert_eq!(name, "xamarin-gtk-theme");
    assert!(matches!(err, HostError::Step { step: Step::Prep, .. }));
    assert_eq!(host.runner().count("autogen.sh"), 0);
    assert!(
      !host
        .layout()
        .staged_prefix("xamarin-gtk-theme")
        .join(crate::consts::COMPLETE_MARKER)
        .exists()
    );
  }

  #[test]
  fn complete_package_is_cached_on_next_run() {
    let fx = Fixture::new();
    let config = fx.config(Profile::Darwin);

    let first = fx.host(config.clone(), RecordingRunner::new());
    first.run(&fx.registry, &[]).unwrap();

    let second = fx.host(config, RecordingRunner::new());
    let report = second.run(&fx.registry, &[]).unwrap();

    assert_eq!(report.cached(), vec!["xamarin-gtk-theme"]);
    assert!(second.runner().commands().is_empty());
    assert_eq!(second.fetcher().fetch_count(), 0);
  }

  #[test]
  fn force_rebuilds_complete_package() {
    let fx = Fixture::new();
    let config = fx.config(Profile::Darwin);
    fx.host(config.clone(), RecordingRunner::new()).run(&fx.registry, &[]).unwrap();

    let forced = fx.host(Config { force: true, ..config }, RecordingRunner::new());
    let report = forced.run(&fx.registry, &[]).unwrap();

    assert_eq!(report.built(), vec!["xamarin-gtk-theme"]);
  }

  #[test]
  fn profile_change_invalidates_staged_prefix() {
    let fx = Fixture::new();
    fx.host(fx.config(Profile::Linux), RecordingRunner::new())
      .run(&fx.registry, &[])
      .unwrap();

    let darwin = fx.host(fx.config(Profile::Darwin), RecordingRunner::new());
    let report = darwin.run(&fx.registry, &[]).unwrap();

    assert_eq!(report.built(), vec!["xamarin-gtk-theme"]);
    assert_eq!(darwin.runner().count("patch -p1"), 1);
  }

  #[test]
  fn failure_skips_remaining_packages() {
    let fx = Fixture::new();
    let mut registry = Registry::new();
    registry.register(basic("glib")).unwrap();
    registry.register(basic("gtk")).unwrap();
    let host = fx.host(fx.config(Profile::Linux), RecordingRunner::new().failing_on("make install"));

    let report = host.run(&registry, &[]).unwrap();

    assert_eq!(report.skipped(), vec!["gtk"]);
    assert!(matches!(
      report.packages[0].outcome,
      Outcome::Failed(HostError::Step { step: Step::Install, .. })
    ));
  }

  #[test]
  fn keep_going_attempts_every_package() {
    let fx = Fixture::new();
    let mut registry = Registry::new();
    registry.register(basic("glib")).unwrap();
    registry.register(basic("gtk")).unwrap();
    let config = Config {
      keep_going: true,
      ..fx.config(Profile::Linux)
    };
    let host = fx.host(config, RecordingRunner::new().failing_on("make install"));

    let report = host.run(&registry, &[]).unwrap();

    assert_eq!(report.failures().count(), 2);
    assert!(report.skipped().is_empty());
  }

  #[test]
  fn selection_runs_only_named_packages_in_registration_order() {
    let fx = Fixture::new();
    let mut registry = Registry::new();
    registry.register(basic("glib")).unwrap();
    registry.register(basic("atk")).unwrap();
    registry.register(basic("gtk")).unwrap();
    let host = fx.host(fx.config(Profile::Linux), RecordingRunner::new());

    let report = host
      .run(&registry, &["gtk".to_string(), "glib".to_string()])
      .unwrap();

    assert_eq!(report.built(), vec!["glib", "gtk"]);
  }

  #[test]
  fn unknown_selection_is_rejected_before_running() {
    let fx = Fixture::new();
    let host = fx.host(fx.config(Profile::Darwin), RecordingRunner::new());

    let result = host.run(&fx.registry, &["qt".to_string()]);

    assert!(matches!(result, Err(HostError::UnknownPackage(name)) if name == "qt"));
    assert!(host.runner().commands().is_empty());
  }

  /// `target` spelled relative to the current directory.
  #[cfg(unix)]
  fn relative_to_cwd(target: &std::path::Path) -> std::path::PathBuf {
    let cwd = std::env::current_dir().unwrap();
    let mut relative = std::path::PathBuf::new();
    for _ in cwd.components().skip(1) {
      relative.push("..");
    }
    relative.join(target.strip_prefix("/").unwrap())
  }

  #[test]
  #[cfg(unix)]
  fn relative_root_yields_absolute_paths_in_commands() {
    let fx = Fixture::new();
    let root = fx.temp.path().join("root");
    let config = Config {
      root: relative_to_cwd(&root),
      ..fx.config(Profile::Linux)
    };
    assert!(config.root.is_relative());
    let host = fx.host(config, RecordingRunner::new());

    let report = host.run(&fx.registry, &[]).unwrap();

    assert!(report.is_success());
    assert!(host.layout().root().is_absolute());
    let commands = host.runner().commands();
    assert!(commands[0].starts_with("./autogen.sh --prefix=/"), "{commands:?}");
    assert!(commands[1].starts_with("./configure --prefix=\"/"), "{commands:?}");
    assert!(host.runner().cwds().iter().all(|cwd| cwd.is_absolute()));
    assert!(root.join("staged/xamarin-gtk-theme").join(crate::consts::COMPLETE_MARKER).exists());
  }

  #[test]
  fn invalid_config_is_rejected() {
    let fx = Fixture::new();
    let config = Config {
      jobs: 0,
      ..fx.config(Profile::Darwin)
    };

    let result = Host::with_parts(config, RecordingRunner::new(), StaticFetcher::new(&[]));

    assert!(matches!(result, Err(HostError::Config(ConfigError::ZeroJobs))));
  }
}
