//! Implementation of the `sdkpack build` command.
//!
//! Loads the run configuration, applies command-line overrides and drives the
//! selected packages through prep, build and install.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use tracing::debug;

use sdkpack_lib::config::Config;
use sdkpack_lib::consts::CONFIG_FILE_NAME;
use sdkpack_lib::host::{Host, Outcome, RunReport};
use sdkpack_lib::platform::{Profile, paths};
use sdkpack_lib::registry::Registry;

use crate::output::{
  OutputFormat, format_duration, print_error, print_json, print_skipped, print_stat, print_success, print_warning,
};

/// Flags of `sdkpack build`.
pub struct BuildArgs {
  pub packages: Vec<String>,
  pub profile: Option<Profile>,
  pub root: Option<PathBuf>,
  pub packages_dir: Option<PathBuf>,
  pub jobs: Option<usize>,
  pub force: bool,
  pub keep_going: bool,
  pub config: Option<PathBuf>,
  pub output: OutputFormat,
}

pub fn cmd_build(args: BuildArgs) -> Result<()> {
  let start = Instant::now();

  let config = resolve_config(&args)?;
  let registry = Registry::with_builtin().context("Failed to load package registry")?;
  let host = Host::new(config).context("Invalid configuration")?;

  let report = host.run(&registry, &args.packages)?;

  if args.output.is_json() {
    print_json(&report_json(&report))?;
  } else {
    print_report(&report);
    println!();
    print_stat("Profile", host.profile().as_str());
    print_stat("Root", &host.layout().root().display().to_string());
    print_stat("Duration", &format_duration(start.elapsed()));
  }

  let failed = report.failures().count();
  if failed > 0 {
    bail!("{failed} package(s) failed");
  }

  Ok(())
}

/// The config file, then flags on top of it.
fn resolve_config(args: &BuildArgs) -> Result<Config> {
  let mut config = match &args.config {
    Some(path) => Config::load(path)?,
    None => Config::load_or_default(&default_config_path())?,
  };

  if let Some(profile) = args.profile {
    config.profile = Some(profile);
  }
  if let Some(root) = &args.root {
    config.root = root.clone();
  }
  if let Some(dir) = &args.packages_dir {
    config.packages_dir = dir.clone();
  }
  if let Some(jobs) = args.jobs {
    config.jobs = jobs;
  }
  config.force |= args.force;
  config.keep_going |= args.keep_going;

  debug!(?config, "resolved config");
  Ok(config)
}

/// `./sdkpack.toml` if present, otherwise the one in the user config dir.
fn default_config_path() -> PathBuf {
  let local = Path::new(CONFIG_FILE_NAME);
  if local.exists() {
    local.to_path_buf()
  } else {
    paths::config_dir().join(CONFIG_FILE_NAME)
  }
}

fn print_report(report: &RunReport) {
  for package in &report.packages {
    let elapsed = format_duration(package.elapsed);
    match &package.outcome {
      Outcome::Built => print_success(&format!("{} built in {}", package.name, elapsed)),
      Outcome::Cached => print_success(&format!("{} up to date", package.name)),
      Outcome::Failed(e) => print_error(&format!("{}: {}", package.name, e)),
      Outcome::Skipped => print_skipped(&format!("{} skipped", package.name)),
    }
  }

  let skipped = report.skipped().len();
  if skipped > 0 {
    print_warning(&format!("{skipped} package(s) not attempted; rerun with --keep-going to build them anyway"));
  }
}

fn report_json(report: &RunReport) -> serde_json::Value {
  let packages: Vec<_> = report
    .packages
    .iter()
    .map(|package| {
      let (outcome, error) = match &package.outcome {
        Outcome::Built => ("built", None),
        Outcome::Cached => ("cached", None),
        Outcome::Failed(e) => ("failed", Some(e.to_string())),
        Outcome::Skipped => ("skipped", None),
      };
      serde_json::json!({
        "name": package.name,
        "outcome": outcome,
        "error": error,
        "elapsed_ms": package.elapsed.as_millis() as u64,
      })
    })
    .collect();

  serde_json::json!({ "success": report.is_success(), "packages": packages })
}
