//! Configuration parameters shared by every subcommand.

use std::path::PathBuf;

use bcdriver_lib::config::{Capabilities, Capability, RawConfig};
use clap::{Args, ValueEnum};

/// A capability as spelled on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CapabilityArg {
  InstallDir,
  Cmake,
  Make,
  Gclang,
  Target,
  InSourceBuild,
}

impl From<CapabilityArg> for Capability {
  fn from(arg: CapabilityArg) -> Self {
    match arg {
      CapabilityArg::InstallDir => Capability::InstallDir,
      CapabilityArg::Cmake => Capability::CMake,
      CapabilityArg::Make => Capability::Make,
      CapabilityArg::Gclang => Capability::Gclang,
      CapabilityArg::Target => Capability::Target,
      CapabilityArg::InSourceBuild => Capability::InSourceBuild,
    }
  }
}

/// Every configuration parameter.
///
/// Nothing is required at the clap level: presence and paths are checked by
/// the library so that every subcommand reports the same errors.
#[derive(Args, Debug, Clone, Default)]
pub struct BuildArgs {
  /// Enable an optional parameter group (repeatable)
  #[arg(long = "with", value_enum, value_name = "CAPABILITY")]
  pub with: Vec<CapabilityArg>,

  /// Directory the build runs in
  #[arg(long, value_name = "DIR")]
  pub build_dir: Option<PathBuf>,

  /// Project source tree
  #[arg(long, value_name = "DIR")]
  pub src_dir: Option<PathBuf>,

  /// Bitcode extractor (get-bc)
  #[arg(long, value_name = "FILE")]
  pub get_bc_program: Option<PathBuf>,

  /// Object-copy tool handed to the compiler wrapper
  #[arg(long, value_name = "FILE")]
  pub llvm_objcopy_program: Option<PathBuf>,

  /// Linker handed to the compiler wrapper
  #[arg(long, value_name = "FILE")]
  pub llvm_ld_program: Option<PathBuf>,

  /// Where the extracted bitcode is written
  #[arg(long, value_name = "FILE")]
  pub output: Option<PathBuf>,

  /// Directory holding clang and the LLVM tools
  #[arg(long, value_name = "DIR")]
  pub llvm_bindir: Option<PathBuf>,

  /// Compiler wrapper (requires --with gclang)
  #[arg(long, value_name = "FILE")]
  pub gclang_program: Option<PathBuf>,

  /// Build target name (requires --with target)
  #[arg(long)]
  pub target: Option<String>,

  /// Install prefix (requires --with install-dir)
  #[arg(long, value_name = "DIR")]
  pub install_dir: Option<PathBuf>,

  /// Meson/Ninja build dir inside the sources (requires --with in-source-build)
  #[arg(long, value_name = "DIR")]
  pub meson_build_dir: Option<PathBuf>,

  /// CMake definitions (requires --with cmake)
  #[arg(long, num_args = 1.., value_name = "KEY=VALUE")]
  pub cmake_args: Option<Vec<String>>,

  /// CMake executable (requires --with cmake)
  #[arg(long, value_name = "FILE")]
  pub cmake_program: Option<PathBuf>,

  /// Ninja executable (requires --with cmake)
  #[arg(long, value_name = "FILE")]
  pub ninja_program: Option<PathBuf>,

  /// Make executable (requires --with make)
  #[arg(long, value_name = "FILE")]
  pub make_program: Option<PathBuf>,

  /// Extra Make argument, repeatable (requires --with make)
  #[arg(long, allow_hyphen_values = true, value_name = "ARG")]
  pub make_args: Option<Vec<String>>,

  /// Parallel Make jobs, defaults to the schedulable CPU count (requires --with make)
  #[arg(short, long)]
  pub jobs: Option<usize>,
}

impl BuildArgs {
  pub fn capabilities(&self) -> Capabilities {
    self.with.iter().copied().map(Capability::from).collect()
  }

  pub fn to_raw(&self) -> RawConfig {
    RawConfig {
      build_dir: self.build_dir.clone(),
      src_dir: self.src_dir.clone(),
      get_bc_program: self.get_bc_program.clone(),
      llvm_objcopy_program: self.llvm_objcopy_program.clone(),
      llvm_ld_program: self.llvm_ld_program.clone(),
      output: self.output.clone(),
      llvm_bindir: self.llvm_bindir.clone(),
      gclang_program: self.gclang_program.clone(),
      target: self.target.clone(),
      install_dir: self.install_dir.clone(),
      meson_build_dir: self.meson_build_dir.clone(),
      cmake_args: self.cmake_args.clone(),
      cmake_program: self.cmake_program.clone(),
      ninja_program: self.ninja_program.clone(),
      make_program: self.make_program.clone(),
      make_args: self.make_args.clone(),
      jobs: self.jobs,
    }
  }
}
