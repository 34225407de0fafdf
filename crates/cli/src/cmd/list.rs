use anyhow::{Context, Result};
use serde::Serialize;

use sdkpack_lib::registry::Registry;
use sdkpack_lib::source::SourceSpec;

use crate::output::{OutputFormat, print_info, print_json, print_stat};

#[derive(Serialize)]
struct PackageSummary<'a> {
  name: &'a str,
  revision: Option<&'a str>,
  sources: &'a [SourceSpec],
}

pub fn cmd_list(output: OutputFormat) -> Result<()> {
  let registry = Registry::with_builtin().context("Failed to load package registry")?;

  let summaries: Vec<_> = registry
    .iter()
    .map(|package| {
      let def = package.def();
      PackageSummary {
        name: def.name(),
        revision: def.revision().map(|rev| rev.as_str()),
        sources: def.sources(),
      }
    })
    .collect();

  if output.is_json() {
    return print_json(&summaries);
  }

  for summary in &summaries {
    print_info(summary.name);
    if let Some(rev) = summary.revision {
      print_stat("Revision", rev);
    }
    for (index, source) in summary.sources.iter().enumerate() {
      print_stat(&format!("Source {index}"), &source.to_string());
    }
  }

  Ok(())
}
