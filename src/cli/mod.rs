//! CLI commands

pub mod check;
pub mod context;
pub mod style;

pub use check::{CheckOptions, run_check, run_list_checks};
