//! Types for the build configuration schema.
//!
//! A [`BuildConfiguration`] is produced from a [`RawConfig`] by
//! [`BuildConfiguration::from_raw`](super::BuildConfiguration::from_raw).
//! Each optional capability group is its own struct, present only when the
//! capability is enabled, so a validated configuration never carries half of
//! a group.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

/// An optional parameter group a build flavor can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
  InstallDir,
  CMake,
  Make,
  Gclang,
  Target,
  InSourceBuild,
}

impl Capability {
  pub const ALL: [Capability; 6] = [
    Capability::InstallDir,
    Capability::CMake,
    Capability::Make,
    Capability::Gclang,
    Capability::Target,
    Capability::InSourceBuild,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      Capability::InstallDir => "install-dir",
      Capability::CMake => "cmake",
      Capability::Make => "make",
      Capability::Gclang => "gclang",
      Capability::Target => "target",
      Capability::InSourceBuild => "in-source-build",
    }
  }
}

impl fmt::Display for Capability {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// The set of capabilities enabled for one build flavor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Capabilities {
  pub install_dir: bool,
  pub cmake: bool,
  pub make: bool,
  pub gclang: bool,
  pub target: bool,
  pub in_source_build: bool,
}

impl Capabilities {
  pub fn with(mut self, capability: Capability) -> Self {
    *self.flag_mut(capability) = true;
    self
  }

  pub fn contains(&self, capability: Capability) -> bool {
    match capability {
      Capability::InstallDir => self.install_dir,
      Capability::CMake => self.cmake,
      Capability::Make => self.make,
      Capability::Gclang => self.gclang,
      Capability::Target => self.target,
      Capability::InSourceBuild => self.in_source_build,
    }
  }

  fn flag_mut(&mut self, capability: Capability) -> &mut bool {
    match capability {
      Capability::InstallDir => &mut self.install_dir,
      Capability::CMake => &mut self.cmake,
      Capability::Make => &mut self.make,
      Capability::Gclang => &mut self.gclang,
      Capability::Target => &mut self.target,
      Capability::InSourceBuild => &mut self.in_source_build,
    }
  }
}

impl FromIterator<Capability> for Capabilities {
  fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
    iter.into_iter().fold(Capabilities::default(), Capabilities::with)
  }
}

/// A named configuration parameter, as it appears on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Param {
  BuildDir,
  SrcDir,
  GetBcProgram,
  LlvmObjcopyProgram,
  LlvmLdProgram,
  Output,
  LlvmBindir,
  GclangProgram,
  Target,
  InstallDir,
  MesonBuildDir,
  CMakeArgs,
  CMakeProgram,
  NinjaProgram,
  MakeProgram,
  MakeArgs,
  Jobs,
}

impl Param {
  pub fn flag(self) -> &'static str {
    match self {
      Param::BuildDir => "--build-dir",
      Param::SrcDir => "--src-dir",
      Param::GetBcProgram => "--get-bc-program",
      Param::LlvmObjcopyProgram => "--llvm-objcopy-program",
      Param::LlvmLdProgram => "--llvm-ld-program",
      Param::Output => "--output",
      Param::LlvmBindir => "--llvm-bindir",
      Param::GclangProgram => "--gclang-program",
      Param::Target => "--target",
      Param::InstallDir => "--install-dir",
      Param::MesonBuildDir => "--meson-build-dir",
      Param::CMakeArgs => "--cmake-args",
      Param::CMakeProgram => "--cmake-program",
      Param::NinjaProgram => "--ninja-program",
      Param::MakeProgram => "--make-program",
      Param::MakeArgs => "--make-args",
      Param::Jobs => "--jobs",
    }
  }

  /// The capability that activates this parameter, `None` for base parameters.
  pub fn capability(self) -> Option<Capability> {
    match self {
      Param::BuildDir
      | Param::SrcDir
      | Param::GetBcProgram
      | Param::LlvmObjcopyProgram
      | Param::LlvmLdProgram
      | Param::Output
      | Param::LlvmBindir => None,
      Param::GclangProgram => Some(Capability::Gclang),
      Param::Target => Some(Capability::Target),
      Param::InstallDir => Some(Capability::InstallDir),
      Param::MesonBuildDir => Some(Capability::InSourceBuild),
      Param::CMakeArgs | Param::CMakeProgram | Param::NinjaProgram => Some(Capability::CMake),
      Param::MakeProgram | Param::MakeArgs | Param::Jobs => Some(Capability::Make),
    }
  }
}

impl fmt::Display for Param {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.flag())
  }
}

/// The filesystem entity a path parameter must point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
  File,
  Directory,
}

impl PathKind {
  pub fn matches(self, path: &Path) -> bool {
    match self {
      PathKind::File => path.is_file(),
      PathKind::Directory => path.is_dir(),
    }
  }
}

impl fmt::Display for PathKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PathKind::File => f.write_str("file"),
      PathKind::Directory => f.write_str("directory"),
    }
  }
}

/// Errors raised while validating a configuration.
///
/// All of them are fatal: nothing is staged or executed once one is returned.
#[derive(Debug, Error)]
pub enum ConfigError {
  /// A parameter required by the base schema or an enabled capability is absent.
  #[error("missing required parameter {0}")]
  Missing(Param),

  /// A parameter was supplied for a capability that is not enabled.
  #[error("unexpected parameter {param}: the `{capability}` capability is not enabled")]
  Unexpected { param: Param, capability: Capability },

  /// A path does not exist or is the wrong kind of filesystem entity.
  #[error("{param}: {} is not an existing {kind}", path.display())]
  InvalidPath {
    param: Param,
    path: PathBuf,
    kind: PathKind,
  },

  /// A CMake argument is not of the form `key=value`.
  #[error("{}: invalid argument `{arg}` (expected key=value)", Param::CMakeArgs)]
  InvalidCMakeArg { arg: String },

  /// An explicit job count of zero.
  #[error("{}: job count must be at least 1", Param::Jobs)]
  ZeroJobs,
}

/// Unvalidated input, one optional field per parameter.
#[derive(Debug, Clone, Default)]
pub struct RawConfig {
  pub build_dir: Option<PathBuf>,
  pub src_dir: Option<PathBuf>,
  pub get_bc_program: Option<PathBuf>,
  pub llvm_objcopy_program: Option<PathBuf>,
  pub llvm_ld_program: Option<PathBuf>,
  pub output: Option<PathBuf>,
  pub llvm_bindir: Option<PathBuf>,
  pub gclang_program: Option<PathBuf>,
  pub target: Option<String>,
  pub install_dir: Option<PathBuf>,
  pub meson_build_dir: Option<PathBuf>,
  pub cmake_args: Option<Vec<String>>,
  pub cmake_program: Option<PathBuf>,
  pub ninja_program: Option<PathBuf>,
  pub make_program: Option<PathBuf>,
  pub make_args: Option<Vec<String>>,
  pub jobs: Option<usize>,
}

/// Tools and arguments for CMake based flavors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CMakeTools {
  /// `key=value` definitions, in the order given.
  pub args: Vec<String>,
  pub program: PathBuf,
  pub ninja_program: PathBuf,
}

/// Tools and arguments for Make based flavors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MakeTools {
  pub program: PathBuf,
  pub args: Vec<String>,
  /// Parallel job count, resolved to the schedulable CPU count when not given.
  pub jobs: usize,
}

/// The out-of-tree Meson/Ninja build directory of an in-source build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InSourceBuild {
  pub meson_build_dir: PathBuf,
}
