//! Names shared between the driver and the tools it orchestrates.

pub const APP_NAME: &str = "bcdriver";

/// Tracing target of the one-line announcement printed before every command.
pub const COMMAND_LOG_TARGET: &str = "bcdriver_lib::command";

/// Directory the compiler wrapper searches for clang and the LLVM tools.
pub const ENV_LLVM_COMPILER_PATH: &str = "LLVM_COMPILER_PATH";

/// Object-copy tool the compiler wrapper uses to embed bitcode paths.
pub const ENV_OBJCOPY: &str = "GLLVM_OBJCOPY";

/// Linker the compiler wrapper uses when it has to link bitcode itself.
pub const ENV_LD: &str = "GLLVM_LD";

/// Version-control metadata, never staged.
pub const GIT_DIR_NAME: &str = ".git";

/// Meson subproject checkouts, skipped at the top level of an in-source copy.
pub const SUBPROJECTS_DIR_NAME: &str = "subprojects";
