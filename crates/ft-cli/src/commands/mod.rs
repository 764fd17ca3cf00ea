//! CLI subcommand implementations.

pub mod demo;
pub mod score;
pub mod util;
