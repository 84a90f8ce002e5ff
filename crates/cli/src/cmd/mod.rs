mod build;
mod check;
mod env;
mod stage;

pub use build::cmd_build;
pub use check::cmd_check;
pub use env::cmd_env;
pub use stage::cmd_stage;
