//! Git fetch, pinned checkout and local path resolution.
//!
//! # Cache Structure
//!
//! Repositories are cached bare at `<root>/cache/<name>/` so that later runs
//! only fetch new objects. The pinned tree is then written fresh into the
//! package's work directory on every prep, which also discards whatever a
//! previous, partially patched run left behind.

use std::fs;
use std::path::{Path, PathBuf};

use gix::remote::Direction;
use tracing::{debug, info};

use super::{Fetcher, Revision, SourceError, SourceSpec};

/// Fetches primary sources with git and resolves local files.
#[derive(Debug, Clone)]
pub struct GitFetcher {
  /// Directory holding one bare repository per package.
  pub cache_dir: PathBuf,
  /// Directory that relative local sources are resolved against.
  pub packages_dir: PathBuf,
}

impl GitFetcher {
  pub fn new(cache_dir: impl Into<PathBuf>, packages_dir: impl Into<PathBuf>) -> Self {
    Self {
      cache_dir: cache_dir.into(),
      packages_dir: packages_dir.into(),
    }
  }
}

impl Fetcher for GitFetcher {
  fn fetch(&self, name: &str, sources: &[SourceSpec], work_dir: &Path) -> Result<Vec<PathBuf>, SourceError> {
    let (primary, auxiliary) = sources.split_first().ok_or(SourceError::Empty)?;

    let SourceSpec::Git { url, revision } = primary else {
      return Err(SourceError::PrimaryNotGit(primary.to_string()));
    };

    let repo = open_or_clone(&self.cache_dir.join(name), url)?;
    let commit = find_pinned_commit(&repo, url, revision)?;
    checkout_tree(&repo, commit, revision, work_dir)?;

    let mut local_sources = vec![work_dir.to_path_buf()];
    for (offset, spec) in auxiliary.iter().enumerate() {
      match spec {
        SourceSpec::Local { path } => local_sources.push(resolve_local(path, &self.packages_dir)?),
        SourceSpec::Git { .. } => return Err(SourceError::AuxiliaryGit { index: offset + 1 }),
      }
    }

    Ok(local_sources)
  }
}

/// Open the cached bare repository, cloning it first if needed.
fn open_or_clone(repo_path: &Path, url: &str) -> Result<gix::Repository, SourceError> {
  if repo_path.exists() {
    debug!(path = %repo_path.display(), "opening cached repository");
    return gix::open(repo_path).map_err(|e| SourceError::Open {
      path: repo_path.to_path_buf(),
      source: Box::new(e),
    });
  }

  if let Some(parent) = repo_path.parent() {
    fs::create_dir_all(parent)?;
  }

  info!(url, path = %repo_path.display(), "cloning repository");
  let mut prepared = gix::prepare_clone_bare(url, repo_path).map_err(|e| SourceError::Clone {
    url: url.to_string(),
    source: Box::new(e),
  })?;

  let (repo, _outcome) = prepared
    .fetch_only(gix::progress::Discard, &gix::interrupt::IS_INTERRUPTED)
    .map_err(|e| SourceError::Clone {
      url: url.to_string(),
      source: Box::new(e),
    })?;

  Ok(repo)
}

/// Locate the pinned commit, fetching from the remote once if it is missing.
fn find_pinned_commit(repo: &gix::Repository, url: &str, revision: &Revision) -> Result<gix::ObjectId, SourceError> {
  let id = gix::ObjectId::from_hex(revision.as_str().as_bytes())
    .map_err(|_| SourceError::InvalidRevision(revision.to_string()))?;

  if repo.has_object(id) {
    return Ok(id);
  }

  fetch_updates(repo, url)?;

  if repo.has_object(id) {
    Ok(id)
  } else {
    Err(SourceError::RevisionNotFound {
      url: url.to_string(),
      rev: revision.to_string(),
    })
  }
}

/// Fetch updates from the default remote.
fn fetch_updates(repo: &gix::Repository, url: &str) -> Result<(), SourceError> {
  debug!(url, "fetching updates");

  let fetch_err = |e: Box<dyn std::error::Error + Send + Sync>| SourceError::Fetch {
    url: url.to_string(),
    source: e,
  };

  let remote = repo
    .find_default_remote(Direction::Fetch)
    .ok_or(SourceError::NoRemote)?
    .map_err(|e| fetch_err(Box::new(e)))?;

  remote
    .connect(Direction::Fetch)
    .map_err(|e| fetch_err(Box::new(e)))?
    .prepare_fetch(gix::progress::Discard, Default::default())
    .map_err(|e| fetch_err(Box::new(e)))?
    .receive(gix::progress::Discard, &gix::interrupt::IS_INTERRUPTED)
    .map_err(|e| fetch_err(Box::new(e)))?;

  Ok(())
}

/// Write the tree of `commit` into a fresh `work_dir`.
///
/// The checkout honors `.gitattributes` (line endings, filters) and the
/// repository's checkout configuration. Submodules are not checked out.
fn checkout_tree(
  repo: &gix::Repository,
  commit: gix::ObjectId,
  revision: &Revision,
  work_dir: &Path,
) -> Result<(), SourceError> {
  let checkout_err = |e: Box<dyn std::error::Error + Send + Sync>| SourceError::Checkout {
    rev: revision.to_string(),
    source: e,
  };

  let tree_id = repo
    .find_object(commit)
    .map_err(|e| checkout_err(Box::new(e)))?
    .peel_to_tree()
    .map_err(|e| checkout_err(Box::new(e)))?
    .id;

  let mut index = repo.index_from_tree(&tree_id).map_err(|e| checkout_err(Box::new(e)))?;

  let mut opts = repo
    .checkout_options(gix::worktree::stack::state::attributes::Source::IdMapping)
    .map_err(|e| checkout_err(Box::new(e)))?;
  opts.destination_is_initially_empty = true;

  if work_dir.exists() {
    debug!(path = %work_dir.display(), "removing previous work tree");
    fs::remove_dir_all(work_dir)?;
  }
  fs::create_dir_all(work_dir)?;

  info!(rev = %revision.short(), path = %work_dir.display(), "checking out pinned revision");

  let objects = repo.objects.clone().into_arc()?;
  let outcome = gix::worktree::state::checkout(
    &mut index,
    work_dir,
    objects,
    &gix::progress::Discard,
    &gix::progress::Discard,
    &gix::interrupt::IS_INTERRUPTED,
    opts,
  )
  .map_err(|e| checkout_err(Box::new(e)))?;

  if let Some(failed) = outcome.errors.first() {
    return Err(checkout_err(format!("{}: {}", failed.path, failed.error).into()));
  }
  if let Some(collision) = outcome.collisions.first() {
    return Err(checkout_err(format!("path collision at {}", collision.path).into()));
  }

  debug!(files = outcome.files_updated, bytes = outcome.bytes_written, "checkout complete");
  Ok(())
}

/// Resolve an auxiliary local source.
///
/// Absolute paths are used as-is, relative ones are resolved against
/// `packages_dir`. The file must exist.
pub fn resolve_local(path: &Path, packages_dir: &Path) -> Result<PathBuf, SourceError> {
  let candidate = if path.is_absolute() {
    path.to_path_buf()
  } else {
    packages_dir.join(path)
  };

  if !candidate.is_file() {
    return Err(SourceError::LocalNotFound(candidate));
  }

  let resolved = dunce::canonicalize(&candidate)?;
  debug!(path = %resolved.display(), "resolved local source");
  Ok(resolved)
}
