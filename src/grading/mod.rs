//! Grade prediction and feedback structuring.
//!
//! Takes an LLM evaluation (grade, reasoning, strengths, improvements) and the
//! assignment metadata, and produces categorized feedback, per-category scores,
//! an independent grade prediction, and the agreement between the two grades.

pub mod categorize;
pub mod feedback;
pub mod history;
pub mod llm;
pub mod next_steps;
pub mod predictor;
pub mod reconcile;
pub mod report;
pub mod rubric;
pub mod scoring;
pub mod synthesis;
pub mod types;

pub use categorize::{categorize, CategorizedFeedback, FeedbackKind};
pub use feedback::{FeedbackCategory, FeedbackItem};
pub use history::{aggregate_accuracy, AccuracyStats, EvaluationRecord, HistoryError};
pub use next_steps::NextStep;
pub use predictor::predict;
pub use reconcile::reconcile;
pub use types::{
    Assignment, CategoryScore, Evaluation, Grade, GradePrediction, GradeRange, QuestionData,
    QuestionEvaluation, QuestionType, RubricScore, Subject,
};

use std::collections::BTreeMap;

use log::debug;
use rand::Rng;
use serde::Serialize;

use crate::config::EngineConfig;

/// Everything derived from one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub llm_grade: Grade,
    pub reasoning: String,
    pub strengths: CategorizedFeedback,
    pub improvements: CategorizedFeedback,
    pub category_scores: BTreeMap<FeedbackCategory, CategoryScore>,
    pub prediction: GradePrediction,
    /// 100, 75 or 0; see [`reconcile`].
    pub accuracy: u8,
    pub next_steps: Vec<NextStep>,
}

/// Runs the full pipeline: categorize, score, predict, reconcile.
#[derive(Debug, Clone)]
pub struct EvaluationEngine {
    synthesis: bool,
    next_step_limit: usize,
}

impl Default for EvaluationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl EvaluationEngine {
    pub fn new() -> Self {
        Self {
            synthesis: true,
            next_step_limit: next_steps::DEFAULT_LIMIT,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new().with_synthesis(config.synthesis)
    }

    /// Enable or disable synthesis and enrichment of improvement items.
    pub fn with_synthesis(mut self, enabled: bool) -> Self {
        self.synthesis = enabled;
        self
    }

    pub fn with_next_step_limit(mut self, limit: usize) -> Self {
        self.next_step_limit = limit;
        self
    }

    /// Analyze an evaluation. Never fails; `rng` only affects synthesized text.
    pub fn analyze<R: Rng>(
        &self,
        evaluation: &Evaluation,
        assignment: Option<&Assignment>,
        rng: &mut R,
    ) -> EvaluationReport {
        let strengths = categorize(
            &evaluation.strengths,
            FeedbackKind::Strengths,
            assignment,
            rng,
        );
        let improvements = if self.synthesis {
            categorize(
                &evaluation.improvements,
                FeedbackKind::Improvements,
                assignment,
                rng,
            )
        } else {
            categorize::bucket(&evaluation.improvements)
        };
        debug!(
            "Categorized {} strengths and {} improvements ({} after balancing)",
            evaluation.strengths.len(),
            evaluation.improvements.len(),
            categorize::total_items(&improvements)
        );

        let category_scores = scoring::score(&strengths, &improvements);
        let prediction = predict(evaluation, assignment, &category_scores);
        let accuracy = reconcile(
            evaluation.grade,
            prediction.predicted_grade,
            prediction.range,
        );
        debug!(
            "LLM grade {} vs predicted {} ({}..{}), accuracy {}",
            evaluation.grade,
            prediction.predicted_grade,
            prediction.range.min,
            prediction.range.max,
            accuracy
        );

        EvaluationReport {
            llm_grade: evaluation.grade,
            reasoning: evaluation.reasoning.clone(),
            next_steps: next_steps::next_steps(&improvements, self.next_step_limit),
            strengths,
            improvements,
            category_scores,
            prediction,
            accuracy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{long_essay, make_evaluation, seeded_rng};

    #[test]
    fn scenario_from_short_assignment() {
        let evaluation = make_evaluation(
            Grade::Seven,
            &["Fagligt indhold: god"],
            &[r#"Struktur: svag [CITAT: "a"] OMSKRIV TIL: "b" FORBEDRING: c"#],
        );
        let assignment = Assignment {
            word_count: Some(300),
            ..Default::default()
        };

        let report =
            EvaluationEngine::new().analyze(&evaluation, Some(&assignment), &mut seeded_rng(1));

        assert_eq!(report.strengths[&FeedbackCategory::Content].len(), 1);
        assert_eq!(report.improvements[&FeedbackCategory::Structure].len(), 1);
        assert!((0.5..=0.95).contains(&report.prediction.confidence));
        assert!(report.prediction.range.contains(report.prediction.predicted_grade));
        assert_eq!(report.next_steps.len(), 1);
    }

    #[test]
    fn synthesis_can_be_disabled() {
        let evaluation = make_evaluation(Grade::Ten, &[], &["Sprog: Stavefejl"]);
        let assignment = Assignment {
            content: Some(long_essay()),
            word_count: Some(3500),
            ..Default::default()
        };

        let on = EvaluationEngine::new().analyze(&evaluation, Some(&assignment), &mut seeded_rng(4));
        let off = EvaluationEngine::new()
            .with_synthesis(false)
            .analyze(&evaluation, Some(&assignment), &mut seeded_rng(4));

        assert_eq!(on.improvements[&FeedbackCategory::Language].len(), 5);
        assert_eq!(
            off.improvements[&FeedbackCategory::Language],
            vec!["Sprog: Stavefejl".to_string()]
        );
    }

    #[test]
    fn accuracy_reflects_prediction() {
        let evaluation = make_evaluation(Grade::Twelve, &[], &[]);
        let report = EvaluationEngine::new().analyze(&evaluation, None, &mut seeded_rng(0));
        assert_eq!(report.prediction.predicted_grade, Grade::Twelve);
        assert_eq!(report.accuracy, 100);
    }
}
