//! CLI module - argument parsing and the issue creation run

pub mod args;
pub mod create;
pub mod helpers;

pub use args::{Cli, GlobalOpts};
