//! Command-line interface for decider.

pub mod commands;
pub mod output;
pub mod types;

pub use output::{output, CommandOutput};
pub use types::{Cli, Commands};

/// Prints a top-level error in the selected output mode.
pub fn handle_error(err: &anyhow::Error, json_mode: bool) {
    if json_mode {
        let body = serde_json::json!({
            "error": {
                "kind": "cli_error",
                "message": format!("{err:#}"),
                "retryable": false,
            }
        });
        eprintln!("{body}");
    } else {
        eprintln!("Error: {err:#}");
    }
}
