//! Rubric dimensions used by the grade predictor and their weighting.

use serde::{Deserialize, Serialize};

use crate::grading::feedback::FeedbackCategory;
use crate::grading::types::Subject;

/// Upper bound of every rubric score.
pub const MAX_SCORE: f64 = 10.0;

/// Scoring dimension, distinct from the user-facing feedback categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RubricName {
    Content,
    Analysis,
    Structure,
    Language,
    Formatting,
    Citations,
}

impl RubricName {
    pub fn all() -> &'static [RubricName] {
        &[
            RubricName::Content,
            RubricName::Analysis,
            RubricName::Structure,
            RubricName::Language,
            RubricName::Formatting,
            RubricName::Citations,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Content => "Content",
            Self::Analysis => "Analysis",
            Self::Structure => "Structure",
            Self::Language => "Language",
            Self::Formatting => "Formatting",
            Self::Citations => "Citations",
        }
    }

    pub fn default_weight(&self) -> f64 {
        match self {
            Self::Content => 0.30,
            Self::Analysis => 0.25,
            Self::Structure => 0.15,
            Self::Language => 0.15,
            Self::Formatting => 0.05,
            Self::Citations => 0.10,
        }
    }

    /// Feedback categories whose counts feed this rubric.
    ///
    /// Formatting and Citations have no feedback source.
    pub fn feedback_sources(&self) -> &'static [FeedbackCategory] {
        match self {
            Self::Content => &[
                FeedbackCategory::Content,
                FeedbackCategory::PracticalApplication,
            ],
            Self::Analysis => &[FeedbackCategory::CriticalThinking],
            Self::Structure => &[FeedbackCategory::Structure],
            Self::Language => &[FeedbackCategory::Language],
            Self::Formatting | Self::Citations => &[],
        }
    }
}

impl std::fmt::Display for RubricName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for RubricName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|r| r.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown rubric: {}", s))
    }
}

/// Subject-specific weight override, if the subject defines one for `rubric`.
pub fn subject_weight(subject: Subject, rubric: RubricName) -> Option<f64> {
    use RubricName::*;

    match (subject, rubric) {
        (Subject::Mathematics, Content) => Some(0.35),
        (Subject::Mathematics, Analysis) => Some(0.35),
        (Subject::Mathematics, Language) => Some(0.05),
        (Subject::Mathematics, Citations) => Some(0.05),

        (Subject::Literature, Analysis) => Some(0.30),
        (Subject::Literature, Language) => Some(0.25),
        (Subject::Literature, Citations) => Some(0.15),

        (Subject::Science, Content) => Some(0.35),
        (Subject::Science, Language) => Some(0.10),
        (Subject::Science, Citations) => Some(0.15),

        (Subject::History, Content) => Some(0.30),
        (Subject::History, Structure) => Some(0.10),
        (Subject::History, Citations) => Some(0.20),

        _ => None,
    }
}

/// Weight for `rubric`, using the subject table when it has an entry.
pub fn resolve_weight(subject: Option<Subject>, rubric: RubricName) -> f64 {
    subject
        .and_then(|s| subject_weight(s, rubric))
        .unwrap_or_else(|| rubric.default_weight())
}
