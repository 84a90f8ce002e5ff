//! Implementation of the `bcdriver stage` command.

use anyhow::Result;

use bcdriver_lib::config::BuildConfiguration;
use bcdriver_lib::stage::stage;

use crate::args::BuildArgs;
use crate::output::{print_info, print_success};

/// Validate, then copy the sources into the build directory. Nothing is built.
pub fn cmd_stage(args: &BuildArgs) -> Result<()> {
  let config = BuildConfiguration::from_raw(args.capabilities(), args.to_raw())?;

  if stage(&config)? {
    print_success(&format!(
      "Staged {} into {}",
      config.src_dir().display(),
      config.build_dir().display()
    ));
  } else {
    print_info("Nothing to stage: in-source-build is not enabled");
  }

  Ok(())
}
