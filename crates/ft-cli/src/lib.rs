//! Focus tracker CLI library.
//!
//! This crate provides the CLI interface for the focus tracker: it owns the
//! clock, generates task IDs and renders results from `ft-core`.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands};
pub use config::{Config, DemoConfig};
