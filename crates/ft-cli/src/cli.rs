//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ft_core::Priority;

/// Task focus tracker.
///
/// Logs work sessions against tasks and scores how focused they were.
#[derive(Debug, Parser)]
#[command(name = "ft", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the sample scenario: two tasks, one session, all queries.
    Demo {
        /// Priority to filter by (low, medium, high, urgent).
        #[arg(long, default_value_t = Priority::High)]
        priority: Priority,

        /// Tag to filter by.
        #[arg(long, default_value = "backend")]
        tag: String,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Score an ad-hoc list of work sessions.
    Score {
        /// A session as START..END (RFC 3339, "now", or e.g. "2 hours ago").
        #[arg(long = "session", required = true, value_name = "START..END")]
        sessions: Vec<String>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}
