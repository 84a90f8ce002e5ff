//! Build configuration schema and pre-flight validation.
//!
//! A configuration is made of seven base parameters that every flavor needs
//! and a handful of capability groups that a flavor opts into. Validation
//! happens once, before anything touches the build directory:
//!
//! 1. parameters supplied for a disabled capability are rejected
//! 2. every required parameter must be present
//! 3. every path that must already exist is checked, in a fixed order
//! 4. the Make job count is resolved
//!
//! The first failure is returned and nothing else runs.

mod types;
mod validate;

pub use types::*;
pub use validate::schedulable_cpus;

use std::path::{Path, PathBuf};

use serde::Serialize;

/// The validated parameters of one driver invocation.
///
/// Immutable once built. Capability groups are `Some` exactly when the
/// matching capability was enabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildConfiguration {
  capabilities: Capabilities,
  build_dir: PathBuf,
  src_dir: PathBuf,
  get_bc_program: PathBuf,
  llvm_objcopy_program: PathBuf,
  llvm_ld_program: PathBuf,
  output: PathBuf,
  llvm_bindir: PathBuf,
  gclang_program: Option<PathBuf>,
  target: Option<String>,
  install_dir: Option<PathBuf>,
  in_source: Option<InSourceBuild>,
  cmake: Option<CMakeTools>,
  make: Option<MakeTools>,
}

impl BuildConfiguration {
  /// Validate `raw` against the schema selected by `capabilities`.
  pub fn from_raw(capabilities: Capabilities, raw: RawConfig) -> Result<Self, ConfigError> {
    validate::validate(capabilities, raw)
  }

  pub fn capabilities(&self) -> Capabilities {
    self.capabilities
  }

  pub fn build_dir(&self) -> &Path {
    &self.build_dir
  }

  pub fn src_dir(&self) -> &Path {
    &self.src_dir
  }

  /// The bitcode extraction tool.
  pub fn get_bc_program(&self) -> &Path {
    &self.get_bc_program
  }

  pub fn llvm_objcopy_program(&self) -> &Path {
    &self.llvm_objcopy_program
  }

  pub fn llvm_ld_program(&self) -> &Path {
    &self.llvm_ld_program
  }

  /// Where the consolidated bitcode file is written.
  pub fn output(&self) -> &Path {
    &self.output
  }

  pub fn llvm_bindir(&self) -> &Path {
    &self.llvm_bindir
  }

  pub fn gclang_program(&self) -> Option<&Path> {
    self.gclang_program.as_deref()
  }

  pub fn target(&self) -> Option<&str> {
    self.target.as_deref()
  }

  pub fn install_dir(&self) -> Option<&Path> {
    self.install_dir.as_deref()
  }

  pub fn in_source(&self) -> Option<&InSourceBuild> {
    self.in_source.as_ref()
  }

  pub fn cmake(&self) -> Option<&CMakeTools> {
    self.cmake.as_ref()
  }

  pub fn make(&self) -> Option<&MakeTools> {
    self.make.as_ref()
  }
}
