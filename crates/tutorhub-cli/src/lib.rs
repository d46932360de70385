//! Command line front end for the tutorhub teacher client
//!
//! `tutorhub login`, `tutorhub courses list`, `tutorhub lecture join <course>`
//! and friends, wired on top of the session, course and lecture crates.

pub mod cli;
pub mod commands;
pub mod context;
pub mod error;
pub mod logging;
pub mod output;
pub mod router;

pub use cli::{Cli, Commands};
pub use context::AppContext;
pub use error::{CliError, CliResult};
