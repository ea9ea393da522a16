//! Independent grade prediction.
//!
//! Objective questions are graded deterministically (see [`question`]).
//! Essays are scored per rubric from feedback counts, weighted, boosted,
//! curved and mapped onto the 7-step scale.
//!
//! The boost constants are empirically tuned and push most outcomes towards
//! the top of the scale.

pub mod curve;
pub mod question;

use std::collections::BTreeMap;

use log::{debug, warn};

use crate::grading::feedback::FeedbackCategory;
use crate::grading::rubric::{resolve_weight, RubricName, MAX_SCORE};
use crate::grading::types::{
    Assignment, CategoryScore, Evaluation, Grade, GradePrediction, GradeRange, RubricScore,
};

use curve::{apply_curve, grade_for_score, is_borderline};

pub use question::grade_question;

const MAX_CONFIDENCE: f64 = 0.95;
const MIN_CONFIDENCE: f64 = 0.50;

/// Predict a grade for the evaluated assignment.
///
/// Uses the question auto-grader when the assignment carries question data,
/// otherwise the rubric-based estimate.
pub fn predict(
    evaluation: &Evaluation,
    assignment: Option<&Assignment>,
    category_scores: &BTreeMap<FeedbackCategory, CategoryScore>,
) -> GradePrediction {
    if let Some(question) = assignment.and_then(|a| a.question_data.as_ref()) {
        return grade_question(question);
    }
    predict_from_rubrics(evaluation, assignment, category_scores)
}

/// Score one rubric from its strength and improvement counts.
pub fn rubric_score(strengths: usize, improvements: usize, word_count: usize) -> f64 {
    let total = strengths + improvements;
    let mut score = if total > 0 {
        let ratio = strengths as f64 / total as f64;
        let amplified = ratio.powf(0.7);
        (amplified * 2.0 * MAX_SCORE).max(MAX_SCORE * 0.5)
    } else {
        MAX_SCORE * 0.7
    };

    if strengths > 3 {
        score += 2.0;
    }
    if strengths > 0 {
        score += 1.5;
    }
    if strengths > improvements {
        score += (strengths - improvements) as f64 * 0.8;
    }
    if improvements > 5 {
        score -= 0.3;
    }
    if word_count > 1000 {
        score += 0.8;
    }
    if word_count > 2000 {
        score += 0.5;
    }

    score.clamp(0.0, MAX_SCORE)
}

/// Weighted mean of rubric scores, 0 when no weight is set.
pub fn weighted_average(scores: &[RubricScore]) -> f64 {
    let weight_sum: f64 = scores.iter().map(|s| s.weight).sum();
    if weight_sum > 0.0 {
        scores.iter().map(|s| s.score * s.weight).sum::<f64>() / weight_sum
    } else {
        0.0
    }
}

/// Mid-range lift followed by the general boost, capped at 10.
pub fn boost(normalized: f64) -> f64 {
    let mut boosted = normalized;
    if (3.5..=6.5).contains(&boosted) {
        boosted += (6.5 - boosted) * 0.3;
    }
    (boosted * 1.8).min(10.0)
}

/// Confidence from feedback volume, coverage and assignment length.
pub fn confidence(total_items: usize, category_count: usize, word_count: usize) -> f64 {
    let base = (0.70 + total_items as f64 / 100.0 + category_count as f64 / 20.0)
        .min(MAX_CONFIDENCE);
    if word_count > 2000 {
        (base + 0.05).min(MAX_CONFIDENCE)
    } else if word_count < 500 {
        (base - 0.10).max(MIN_CONFIDENCE)
    } else {
        base
    }
}

/// Grade range implied by a confidence level.
pub fn range_for(grade: Grade, confidence: f64) -> GradeRange {
    if confidence < 0.80 {
        GradeRange::around(grade, 2, 1)
    } else if confidence < 0.90 {
        GradeRange::around(grade, 1, 1)
    } else {
        GradeRange::exact(grade)
    }
}

fn predict_from_rubrics(
    evaluation: &Evaluation,
    assignment: Option<&Assignment>,
    category_scores: &BTreeMap<FeedbackCategory, CategoryScore>,
) -> GradePrediction {
    let word_count = assignment.map_or(0, Assignment::effective_word_count);
    let subject = assignment.and_then(Assignment::subject);
    if let (None, Some(name)) = (subject, assignment.and_then(|a| a.subject.as_deref())) {
        warn!("Unknown subject '{}', using default rubric weights", name);
    }

    let counts = |category: &FeedbackCategory| {
        category_scores
            .get(category)
            .map_or((0, 0), |s| (s.strengths, s.improvements))
    };

    let rubric_scores: Vec<RubricScore> = RubricName::all()
        .iter()
        .map(|&rubric| {
            let (strengths, improvements) = rubric
                .feedback_sources()
                .iter()
                .map(&counts)
                .fold((0, 0), |(s, i), (cs, ci)| (s + cs, i + ci));
            RubricScore {
                rubric,
                score: rubric_score(strengths, improvements, word_count),
                max_score: MAX_SCORE,
                weight: resolve_weight(subject, rubric),
            }
        })
        .collect();

    let normalized = weighted_average(&rubric_scores);
    let boosted = boost(normalized);
    let curved = apply_curve(boosted);
    let mut grade = grade_for_score(curved);
    debug!(
        "Rubric prediction: normalized={:.2} boosted={:.2} curved={:.2} -> {}",
        normalized, boosted, curved, grade
    );

    let total_strengths: usize = category_scores.values().map(|s| s.strengths).sum();
    let total_improvements: usize = category_scores.values().map(|s| s.improvements).sum();
    if total_strengths as f64 > 1.5 * total_improvements as f64 {
        grade = grade.step_up();
        debug!("Strengths dominate, promoted to {}", grade);
    }
    if is_borderline(curved, grade) {
        grade = grade.step_up();
        debug!("Borderline score, promoted to {}", grade);
    }

    let total_items = evaluation.strengths.len() + evaluation.improvements.len();
    let category_count = category_scores.values().filter(|s| s.total > 0).count();
    let confidence = confidence(total_items, category_count, word_count);

    GradePrediction {
        predicted_grade: grade,
        confidence,
        range: range_for(grade, confidence),
        rubric_scores,
        is_automatically_graded: false,
        question_evaluation: None,
    }
}
