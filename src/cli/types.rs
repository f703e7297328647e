//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "decider")]
#[command(about = "Decider - human-in-the-loop review of requirements analyses", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to .decider/config.yaml and .decider/local.yaml)
    #[arg(short, long, global = true, env = "DECIDER_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Execute one command line, e.g. "review; score:6; feedback:Needs MFA; s1"
    Run {
        /// Command line in the `verb; args...; session_id` grammar
        line: String,
    },

    /// Read command lines from stdin until EOF or `exit`
    Repl,

    /// List stored sessions
    Sessions {
        /// Filter by status (e.g. AWAITING_REVIEW, COMPLETED)
        #[arg(short, long)]
        status: Option<String>,

        /// Maximum number of sessions to display
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
}
