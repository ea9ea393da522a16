//! Feedback items and the annotated wire format the grading LLM produces.
//!
//! A raw feedback string looks like:
//!
//! ```text
//! Struktur: svag indledning [CITAT: "..."] OMSKRIV TIL: "..." FORBEDRING: ...
//! ```
//!
//! `parser` turns such a string into a [`FeedbackItem`]; `writer` assembles one.

pub mod parser;
pub mod writer;

use serde::{Deserialize, Serialize};

pub use parser::parse;
pub use writer::RawFeedbackBuilder;

/// User-facing feedback category.
///
/// Declaration order is display order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackCategory {
    Content,
    Structure,
    Language,
    CriticalThinking,
    PracticalApplication,
    #[default]
    Other,
}

impl FeedbackCategory {
    /// The five named categories, excluding the catch-all.
    pub fn known() -> &'static [FeedbackCategory] {
        &[
            FeedbackCategory::Content,
            FeedbackCategory::Structure,
            FeedbackCategory::Language,
            FeedbackCategory::CriticalThinking,
            FeedbackCategory::PracticalApplication,
        ]
    }

    /// All categories including `Other`.
    pub fn all() -> &'static [FeedbackCategory] {
        &[
            FeedbackCategory::Content,
            FeedbackCategory::Structure,
            FeedbackCategory::Language,
            FeedbackCategory::CriticalThinking,
            FeedbackCategory::PracticalApplication,
            FeedbackCategory::Other,
        ]
    }

    /// The label used as the `"<Label>: "` prefix in raw feedback strings.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Content => "Fagligt indhold",
            Self::Structure => "Struktur",
            Self::Language => "Sprog",
            Self::CriticalThinking => "Kritisk tænkning",
            Self::PracticalApplication => "Praktisk anvendelse",
            Self::Other => "Andre punkter",
        }
    }

    /// Resolve a label to its category. Unrecognized labels map to `Other`.
    pub fn from_label(label: &str) -> FeedbackCategory {
        let label = label.trim();
        Self::known()
            .iter()
            .copied()
            .find(|c| c.label().eq_ignore_ascii_case(label))
            .unwrap_or(FeedbackCategory::Other)
    }

    /// Category of a raw string that starts with `"<Label>: "`, if any known label
    /// matches. Labels compare case-insensitively, as in [`Self::from_label`].
    pub fn of_raw(raw: &str) -> Option<FeedbackCategory> {
        Self::known().iter().copied().find(|c| {
            let label = c.label();
            raw.get(..label.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(label))
                && raw[label.len()..].starts_with(": ")
        })
    }

    /// Relative feedback density for target-count balancing.
    pub fn importance_factor(&self) -> f64 {
        match self {
            Self::Content => 1.2,
            Self::CriticalThinking => 1.1,
            Self::Structure => 1.0,
            Self::Language => 0.9,
            Self::PracticalApplication => 0.8,
            Self::Other => 0.7,
        }
    }

    /// Ranking used to pick next steps; higher comes first.
    pub fn priority(&self) -> u8 {
        match self {
            Self::Content => 5,
            Self::CriticalThinking => 4,
            Self::Structure => 3,
            Self::Language => 2,
            Self::PracticalApplication => 1,
            Self::Other => 0,
        }
    }
}

impl std::fmt::Display for FeedbackCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A parsed unit of feedback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackItem {
    pub category: FeedbackCategory,
    /// The raw category prefix as written, `"Andet"` when absent.
    pub label: String,
    pub description: String,
    /// Verbatim excerpts from the assignment.
    pub citations: Vec<String>,
    /// Proposed rewrites, positionally aligned with `citations`.
    pub suggestions: Vec<String>,
    /// Why the rewrite helps. Empty for strengths.
    pub explanation: String,
}

impl FeedbackItem {
    /// Parse a raw annotated feedback string. Never fails.
    pub fn parse(raw: &str) -> Self {
        parser::parse(raw)
    }

    /// Suggestion paired with citation `index`, falling back to the first suggestion.
    pub fn suggestion_for(&self, index: usize) -> Option<&str> {
        self.suggestions
            .get(index)
            .or_else(|| self.suggestions.first())
            .map(String::as_str)
    }

    /// Citation/suggestion pairs in citation order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, Option<&str>)> + '_ {
        self.citations
            .iter()
            .enumerate()
            .map(|(i, citation)| (citation.as_str(), self.suggestion_for(i)))
    }
}
