mod args;
mod cmd;
mod output;

use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::Result;
use bcdriver_lib::consts::COMMAND_LOG_TARGET;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;

use crate::args::BuildArgs;
use crate::cmd::{cmd_build, cmd_check, cmd_env, cmd_stage};
use crate::output::{OutputFormat, print_error};

/// Build a project with the gllvm compiler wrappers and extract its bitcode
#[derive(Parser)]
#[command(name = bcdriver_lib::consts::APP_NAME)]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Validate, stage, build and extract the bitcode of the built image
  Build {
    #[command(flatten)]
    args: BuildArgs,

    /// Image produced by the build, relative to the build directory
    #[arg(long, value_name = "PATH")]
    image: PathBuf,

    /// Build command, run in the build directory
    #[arg(last = true, required = true, value_name = "COMMAND")]
    command: Vec<OsString>,
  },

  /// Validate the configuration and print it
  Check {
    #[command(flatten)]
    args: BuildArgs,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
  },

  /// Print the compiler wrapper environment as KEY=value lines
  Env {
    #[command(flatten)]
    args: BuildArgs,
  },

  /// Copy the sources into the build directory (in-source builds only)
  Stage {
    #[command(flatten)]
    args: BuildArgs,
  },
}

fn main() {
  let cli = Cli::parse();

  tracing_subscriber::fmt()
    .with_env_filter(log_filter(cli.verbose))
    .with_writer(std::io::stderr)
    .with_target(false)
    .without_time()
    .init();

  if let Err(err) = run(cli.command) {
    print_error(&format!("{:#}", err));
    std::process::exit(1);
  }
}

/// `RUST_LOG`, else `info` (`debug` with `-v`). The per-command line is
/// always kept at `info`.
fn log_filter(verbose: bool) -> EnvFilter {
  let default_level = if verbose { "debug" } else { "info" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
  match format!("{}=info", COMMAND_LOG_TARGET).parse::<Directive>() {
    Ok(directive) => filter.add_directive(directive),
    Err(_) => filter,
  }
}

fn run(command: Commands) -> Result<()> {
  match command {
    Commands::Build { args, image, command } => cmd_build(&args, image, command),
    Commands::Check { args, format } => cmd_check(&args, format),
    Commands::Env { args } => cmd_env(&args),
    Commands::Stage { args } => cmd_stage(&args),
  }
}
