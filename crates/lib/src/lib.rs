//! bcdriver-lib: build a project with the gllvm wrappers and extract its bitcode
//!
//! A run validates one [`config::BuildConfiguration`], stages the sources
//! when the project cannot build out of tree, builds through a
//! [`flavor::BuildFlavor`] under the wrapper environment from [`env`], and
//! finally hands the produced image to `get-bc` ([`extract`]).
//!
//! [`driver::Driver`] ties these steps together.

pub mod config;
pub mod consts;
pub mod driver;
pub mod env;
pub mod execute;
pub mod extract;
pub mod flavor;
pub mod stage;
pub mod util;
