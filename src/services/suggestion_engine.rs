//! Ranks improvement categories from accumulated review feedback.

use std::collections::BTreeMap;

use crate::domain::models::{Category, FeedbackEvent, FeedbackKind, Session, SuggestionRecord};
use crate::services::pattern_classifier::classify;

#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    weight: u32,
    keyword_hits: u32,
    supporting: usize,
}

/// Produces ranked [`SuggestionRecord`]s from review and refine feedback.
#[derive(Debug, Clone, Copy)]
pub struct SuggestionEngine {
    max_suggestions: usize,
}

impl Default for SuggestionEngine {
    fn default() -> Self {
        Self::new(3)
    }
}

impl SuggestionEngine {
    pub const fn new(max_suggestions: usize) -> Self {
        Self { max_suggestions }
    }

    /// Suggestions for a session's current state.
    pub fn suggest_for(&self, session: &Session) -> Vec<SuggestionRecord> {
        self.suggest(
            &session.feedback_history,
            &session.accumulated_context,
            &session.current_artifact,
        )
    }

    /// Aggregates classifier output over every `review` and `refine` entry.
    ///
    /// Each entry adds at most 1 to a category's weight. Categories whose
    /// recommendation already appears (case-insensitively) in the accumulated
    /// context or the current artifact are dropped. Ordering is weight descending,
    /// then category name ascending.
    pub fn suggest(
        &self,
        history: &[FeedbackEvent],
        accumulated_context: &[String],
        current_artifact: &str,
    ) -> Vec<SuggestionRecord> {
        let mut tallies: BTreeMap<Category, Tally> = BTreeMap::new();

        let entries = history
            .iter()
            .filter(|event| matches!(event.kind, FeedbackKind::Review | FeedbackKind::Refine));

        for event in entries {
            for (category, hits) in classify(&event.text) {
                let tally = tallies.entry(category).or_default();
                tally.weight += 1;
                tally.keyword_hits += hits;
                tally.supporting += 1;
            }
        }

        let addressed_in: Vec<String> = accumulated_context
            .iter()
            .map(|fragment| fragment.to_lowercase())
            .chain(std::iter::once(current_artifact.to_lowercase()))
            .collect();

        let mut ranked: Vec<SuggestionRecord> = tallies
            .into_iter()
            .filter(|(category, _)| {
                let recommendation = category.recommendation();
                !addressed_in.iter().any(|text| text.contains(recommendation))
            })
            .map(|(category, tally)| SuggestionRecord {
                category,
                rationale: category.rationale().to_string(),
                recommendation: category.recommendation().to_string(),
                weight: tally.weight,
                keyword_hits: tally.keyword_hits,
                supporting_feedback_count: tally.supporting,
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.weight
                .cmp(&a.weight)
                .then_with(|| a.category.as_str().cmp(b.category.as_str()))
        });
        ranked.truncate(self.max_suggestions);
        ranked
    }
}
