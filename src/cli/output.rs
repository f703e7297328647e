//! Output formatting utilities for the CLI.

use comfy_table::{presets, Cell, CellAlignment, ContentArrangement, Table};
use serde::Serialize;

use crate::domain::models::{CommandResponse, Verb};

pub trait CommandOutput: Serialize {
    fn to_human(&self) -> String;

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub fn output<T: CommandOutput>(result: &T, json_mode: bool) {
    if json_mode {
        println!("{}", serde_json::to_string_pretty(&result.to_json()).unwrap_or_default());
    } else {
        println!("{}", result.to_human());
    }
}

/// Truncate a string to at most `max_len` characters, appending "..." if truncated.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

/// Borderless table with uppercase headers.
pub fn list_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(h.to_uppercase()).set_alignment(CellAlignment::Left)),
        );
    table
}

fn join_verbs(verbs: &[Verb]) -> String {
    verbs.iter().map(Verb::as_str).collect::<Vec<_>>().join(", ")
}

impl CommandOutput for CommandResponse {
    fn to_human(&self) -> String {
        let mut sections: Vec<String> = Vec::new();

        let mut header = format!("Session: {}", if self.session_id.is_empty() { "-" } else { &self.session_id });
        if let Some(status) = self.status {
            header.push_str(&format!(" ({status}, iteration {})", self.iteration));
        }
        sections.push(header);

        if let Some(error) = &self.error {
            let hint = if error.retryable { " (retryable)" } else { "" };
            sections.push(format!("Error [{}]{hint}: {}", error.kind, error.message));
        }

        if let Some(score) = self.score {
            sections.push(format!("Score: {score}/10"));
        }

        if let Some(artifact) = &self.current_artifact {
            sections.push(format!("--- Artifact ---\n{}", artifact.trim_end()));
        }

        if let Some(metrics) = &self.metrics {
            let quality = &metrics.quality;
            sections.push(format!(
                "Quality: average {:.1}, trend {}, velocity {:.2}\nFeedback: {} item(s), {} review(s), {} refinement(s), {} enhancement(s), {} edit(s)",
                quality.average,
                quality.trend.as_str(),
                quality.velocity,
                metrics.total_feedback_items,
                metrics.review_count,
                metrics.refinement_count,
                metrics.enhancement_count,
                metrics.edit_count,
            ));
        }

        if let Some(suggestions) = &self.suggestions {
            if suggestions.is_empty() {
                sections.push("Suggestions: none".to_string());
            } else {
                let mut table = list_table(&["category", "weight", "recommendation"]);
                for suggestion in suggestions {
                    table.add_row(vec![
                        suggestion.category.to_string(),
                        suggestion.weight.to_string(),
                        suggestion.recommendation.clone(),
                    ]);
                }
                sections.push(format!("Suggestions:\n{table}"));
            }
        }

        if let Some(history) = &self.feedback_history {
            if history.is_empty() {
                sections.push("Feedback history: empty".to_string());
            } else {
                let mut table = list_table(&["seq", "iter", "kind", "score", "text"]);
                for event in history {
                    table.add_row(vec![
                        event.sequence.to_string(),
                        event.iteration.to_string(),
                        event.kind.as_str().to_string(),
                        event.score.map_or_else(|| "-".to_string(), |s| s.to_string()),
                        truncate(&event.text, 60),
                    ]);
                }
                sections.push(format!("Feedback history:\n{table}"));
            }
        }

        if let Some(insights) = &self.insights {
            let mut text = format!(
                "Engagement: {:?} ({} event(s), {} refinement cycle(s))",
                insights.engagement, insights.feedback_frequency, insights.refinement_cycles
            );
            for action in &insights.recommended_actions {
                text.push_str(&format!("\n  - {action}"));
            }
            sections.push(text);
        }

        if let Some(suite) = &self.test_suite {
            let mut table = list_table(&["id", "priority", "kind", "summary"]);
            for case in &suite.test_cases {
                table.add_row(vec![
                    case.test_id.clone(),
                    format!("{:?}", case.priority).to_uppercase(),
                    format!("{:?}", case.kind),
                    truncate(&case.summary, 60),
                ]);
            }
            sections.push(format!("Test suite: {} ({} tests)\n{table}", suite.name, suite.total_tests));
        }

        if !self.available_actions.is_empty() {
            sections.push(format!("Next: {}", join_verbs(&self.available_actions)));
        }

        sections.join("\n\n")
    }
}
