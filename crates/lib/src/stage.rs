//! In-source build staging.
//!
//! Flavors that build inside the source tree (Meson, autotools, ...) get a
//! fresh copy of the sources in the build directory instead. The copy skips
//! version-control metadata, the project's own Meson build directory and
//! top-level `subprojects`, so the staged tree holds only what the build
//! needs.
//!
//! Staging is destructive: whatever sits in the build directory is removed
//! first. Running it twice leaves the same tree.

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::BuildConfiguration;
use crate::consts::{GIT_DIR_NAME, SUBPROJECTS_DIR_NAME};

/// Errors during staging. The build directory is left in an unspecified state.
#[derive(Debug, Error)]
pub enum StageError {
  #[error("meson build directory {} is not a directory", .0.display())]
  MissingMesonBuildDir(PathBuf),

  #[error("failed to resolve {}: {source}", path.display())]
  Resolve { path: PathBuf, source: io::Error },

  #[error("failed to remove {}: {source}", path.display())]
  Remove { path: PathBuf, source: io::Error },

  #[error("failed to create {}: {source}", path.display())]
  CreateDir { path: PathBuf, source: io::Error },

  #[error("failed to copy {} to {}: {source}", from.display(), to.display())]
  Copy {
    from: PathBuf,
    to: PathBuf,
    source: io::Error,
  },

  #[error("failed to walk source tree: {0}")]
  Walk(#[from] walkdir::Error),
}

/// What an in-source build copies, and where.
///
/// All paths are absolute so entries found while walking the source tree
/// can be compared against them directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingPlan {
  src_dir: PathBuf,
  build_dir: PathBuf,
  meson_build_dir: PathBuf,
}

impl StagingPlan {
  /// The plan for `config`, or `None` when the in-source capability is off.
  pub fn from_config(config: &BuildConfiguration) -> Result<Option<Self>, StageError> {
    let Some(in_source) = config.in_source() else {
      return Ok(None);
    };

    Ok(Some(Self {
      src_dir: absolute(config.src_dir())?,
      build_dir: absolute(config.build_dir())?,
      meson_build_dir: absolute(&in_source.meson_build_dir)?,
    }))
  }

  pub fn src_dir(&self) -> &Path {
    &self.src_dir
  }

  pub fn build_dir(&self) -> &Path {
    &self.build_dir
  }

  /// Whether the entry `name` inside directory `dir` is left out of the copy.
  ///
  /// - `.git` is always skipped
  /// - the entry that is the configured Meson build directory is skipped
  /// - `subprojects` is skipped only directly under the source root
  /// - the build directory itself is skipped when it lives inside the sources
  pub fn excludes(&self, dir: &Path, name: &OsStr) -> bool {
    if name == GIT_DIR_NAME {
      return true;
    }
    if name == SUBPROJECTS_DIR_NAME && dir == self.src_dir {
      return true;
    }
    let entry = dir.join(name);
    entry == self.meson_build_dir || entry == self.build_dir
  }
}

/// Stage the sources into the build directory if the configuration asks for it.
///
/// Returns `false` without touching the filesystem for out-of-tree flavors.
pub fn stage(config: &BuildConfiguration) -> Result<bool, StageError> {
  let Some(plan) = StagingPlan::from_config(config)? else {
    debug!("out-of-tree build, nothing to stage");
    return Ok(false);
  };

  stage_with_plan(&plan)?;
  Ok(true)
}

/// Run the three staging steps for an explicit plan.
pub fn stage_with_plan(plan: &StagingPlan) -> Result<(), StageError> {
  if !plan.meson_build_dir.is_dir() {
    return Err(StageError::MissingMesonBuildDir(plan.meson_build_dir.clone()));
  }

  if plan.build_dir.is_dir() {
    info!(path = %plan.build_dir.display(), "removing previous build directory");
    fs::remove_dir_all(&plan.build_dir).map_err(|source| StageError::Remove {
      path: plan.build_dir.clone(),
      source,
    })?;
  }

  info!(
    from = %plan.src_dir.display(),
    to = %plan.build_dir.display(),
    "copying sources"
  );
  copy_tree(plan)
}

fn copy_tree(plan: &StagingPlan) -> Result<(), StageError> {
  create_dir(&plan.build_dir)?;

  let walker = WalkDir::new(&plan.src_dir)
    .follow_links(true)
    .min_depth(1)
    .sort_by_file_name()
    .into_iter()
    .filter_entry(|e| {
      let dir = e.path().parent().unwrap_or(&plan.src_dir);
      let skip = plan.excludes(dir, e.file_name());
      if skip {
        debug!(path = %e.path().display(), "excluded from staging");
      }
      !skip
    });

  for entry in walker {
    let entry = entry?;
    let rel = entry.path().strip_prefix(&plan.src_dir).unwrap_or(entry.path());
    let dest = plan.build_dir.join(rel);
    let file_type = entry.file_type();

    if file_type.is_dir() {
      create_dir(&dest)?;
    } else if file_type.is_file() {
      fs::copy(entry.path(), &dest).map_err(|source| StageError::Copy {
        from: entry.path().to_path_buf(),
        to: dest.clone(),
        source,
      })?;
    } else {
      // Sockets, fifos and device nodes have no place in a build tree.
      debug!(path = %entry.path().display(), "skipping special file");
    }
  }

  Ok(())
}

fn create_dir(path: &Path) -> Result<(), StageError> {
  fs::create_dir_all(path).map_err(|source| StageError::CreateDir {
    path: path.to_path_buf(),
    source,
  })
}

fn absolute(path: &Path) -> Result<PathBuf, StageError> {
  std::path::absolute(path).map_err(|source| StageError::Resolve {
    path: path.to_path_buf(),
    source,
  })
}
