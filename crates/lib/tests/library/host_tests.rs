//! End-to-end runs through a real shell.

#![cfg(unix)]

use sdkpack_lib::consts::COMPLETE_MARKER;
use sdkpack_lib::execute::ShellRunner;
use sdkpack_lib::host::{Host, HostError, Outcome, Step};
use sdkpack_lib::registry::Registry;
use tempfile::TempDir;

use super::common::{DirFetcher, ScriptPackage, config};

fn host(temp: &TempDir, keep_going: bool) -> Host<ShellRunner, DirFetcher> {
  let config = sdkpack_lib::config::Config {
    keep_going,
    ..config(temp)
  };
  Host::with_parts(config, ShellRunner::new(None), DirFetcher).unwrap()
}

#[test]
fn stages_into_private_prefix() {
  let temp = TempDir::new().unwrap();
  let mut registry = Registry::new();
  registry
    .register(ScriptPackage::new("hello", "echo \"%{name} for %{profile}\" > built.txt"))
    .unwrap();

  let report = host(&temp, false).run(&registry, &[]).unwrap();

  assert!(report.is_success());
  let staged = temp.path().join("root/staged/hello");
  let content = std::fs::read_to_string(staged.join("share/hello.txt")).unwrap();
  assert_eq!(content, "hello for linux\n");
  assert!(staged.join(COMPLETE_MARKER).is_file());
}

#[test]
fn second_run_reuses_staged_prefix() {
  let temp = TempDir::new().unwrap();
  let mut registry = Registry::new();
  registry.register(ScriptPackage::new("hello", "echo ok > built.txt")).unwrap();

  host(&temp, false).run(&registry, &[]).unwrap();
  let report = host(&temp, false).run(&registry, &[]).unwrap();

  assert_eq!(report.cached(), vec!["hello"]);
}

#[test]
fn failed_build_leaves_no_marker_and_stops_the_run() {
  let temp = TempDir::new().unwrap();
  let mut registry = Registry::new();
  registry.register(ScriptPackage::new("broken", "exit 2")).unwrap();
  registry.register(ScriptPackage::new("after", "echo ok > built.txt")).unwrap();

  let report = host(&temp, false).run(&registry, &[]).unwrap();

  assert!(matches!(
    report.packages[0].outcome,
    Outcome::Failed(HostError::Step { step: Step::Build, .. })
  ));
  assert!(matches!(report.packages[1].outcome, Outcome::Skipped));
  assert!(!temp.path().join("root/staged/broken").join(COMPLETE_MARKER).exists());
}

#[test]
fn keep_going_builds_packages_after_a_failure() {
  let temp = TempDir::new().unwrap();
  let mut registry = Registry::new();
  registry.register(ScriptPackage::new("broken", "exit 2")).unwrap();
  registry.register(ScriptPackage::new("after", "echo ok > built.txt")).unwrap();

  let report = host(&temp, true).run(&registry, &[]).unwrap();

  assert_eq!(report.built(), vec!["after"]);
  assert_eq!(report.failures().count(), 1);
}

#[test]
fn builtin_registry_contains_only_the_theme() {
  let registry = Registry::with_builtin().unwrap();
  let names: Vec<_> = registry.iter().map(|p| p.name().to_string()).collect();
  assert_eq!(names, vec!["xamarin-gtk-theme"]);
}
