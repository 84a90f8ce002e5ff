//! Implementation of the `bcdriver check` command.
//!
//! Validates the parameters without touching the build directory and prints
//! the resolved configuration.

use std::path::Path;

use anyhow::Result;

use bcdriver_lib::config::{BuildConfiguration, Capabilities, Capability};

use crate::args::BuildArgs;
use crate::output::{OutputFormat, print_json, print_stat, print_success};

pub fn cmd_check(args: &BuildArgs, format: OutputFormat) -> Result<()> {
  let config = BuildConfiguration::from_raw(args.capabilities(), args.to_raw())?;

  if format.is_json() {
    return print_json(&config);
  }

  print_success("Configuration is valid");
  print_stat("Capabilities", &capability_list(config.capabilities()));
  print_stat("Build dir", &show(config.build_dir()));
  print_stat("Source dir", &show(config.src_dir()));
  print_stat("get-bc", &show(config.get_bc_program()));
  print_stat("objcopy", &show(config.llvm_objcopy_program()));
  print_stat("ld", &show(config.llvm_ld_program()));
  print_stat("LLVM bindir", &show(config.llvm_bindir()));
  print_stat("Output", &show(config.output()));

  if let Some(gclang) = config.gclang_program() {
    print_stat("gclang", &show(gclang));
  }
  if let Some(target) = config.target() {
    print_stat("Target", target);
  }
  if let Some(dir) = config.install_dir() {
    print_stat("Install dir", &show(dir));
  }
  if let Some(in_source) = config.in_source() {
    print_stat("Meson build dir", &show(&in_source.meson_build_dir));
  }
  if let Some(cmake) = config.cmake() {
    print_stat("CMake", &show(&cmake.program));
    print_stat("Ninja", &show(&cmake.ninja_program));
    print_stat("CMake args", &cmake.args.join(" "));
  }
  if let Some(make) = config.make() {
    print_stat("Make", &show(&make.program));
    print_stat("Make args", &make.args.join(" "));
    print_stat("Jobs", &make.jobs.to_string());
  }

  Ok(())
}

fn show(path: &Path) -> String {
  path.display().to_string()
}

fn capability_list(capabilities: Capabilities) -> String {
  let enabled: Vec<&str> = Capability::ALL
    .into_iter()
    .filter(|cap| capabilities.contains(*cap))
    .map(Capability::as_str)
    .collect();

  if enabled.is_empty() {
    "none".to_string()
  } else {
    enabled.join(", ")
  }
}
