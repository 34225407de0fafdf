//! Completion markers for staged prefixes.
//!
//! After all lifecycle steps of a package succeed, the host writes a marker
//! into its staged prefix. A later run reuses the staged prefix only if the
//! marker still describes exactly what would be built now.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consts::COMPLETE_MARKER;
use crate::package::PackageDef;
use crate::platform::Profile;
use crate::source::SourceSpec;
use crate::source::fetch::resolve_local;
use crate::util::hash::{ContentHash, hash_file};

const MARKER_VERSION: u32 = 1;

/// Marker file content structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageMarker {
  /// Marker format version.
  pub version: u32,
  pub package: String,
  pub revision: String,
  pub profile: Profile,
  /// Hash of every auxiliary local source, in source order.
  pub sources: Vec<ContentHash>,
}

impl StageMarker {
  /// The marker a successful build of `def` would leave right now.
  ///
  /// Returns `None` if an auxiliary source cannot be read; such a package
  /// is never considered complete.
  pub fn expected(def: &PackageDef, profile: Profile, packages_dir: &Path) -> Option<Self> {
    let revision = def.revision()?.to_string();

    let mut sources = Vec::new();
    for spec in def.auxiliary_sources() {
      let SourceSpec::Local { path } = spec else {
        return None;
      };
      let resolved = resolve_local(path, packages_dir).ok()?;
      sources.push(hash_file(&resolved).ok()?);
    }

    Some(Self {
      version: MARKER_VERSION,
      package: def.name().to_string(),
      revision,
      profile,
      sources,
    })
  }
}

/// Read the marker in `staged_prefix`.
///
/// Returns `None` if there is no marker or it cannot be parsed.
pub fn read_marker(staged_prefix: &Path) -> Option<StageMarker> {
  let content = std::fs::read_to_string(staged_prefix.join(COMPLETE_MARKER)).ok()?;
  match serde_json::from_str(&content) {
    Ok(marker) => Some(marker),
    Err(e) => {
      debug!(path = ?staged_prefix, error = %e, "ignoring unreadable marker");
      None
    }
  }
}

pub fn write_marker(staged_prefix: &Path, marker: &StageMarker) -> std::io::Result<()> {
  let content = serde_json::to_string(marker).map_err(std::io::Error::other)?;
  std::fs::write(staged_prefix.join(COMPLETE_MARKER), format!("{content}\n"))
}
