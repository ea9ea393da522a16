//! Per-category balance of strengths against improvements.

use std::collections::BTreeMap;

use crate::grading::categorize::CategorizedFeedback;
use crate::grading::feedback::FeedbackCategory;
use crate::grading::types::CategoryScore;

/// Score given to a category with no feedback at all.
pub const NEUTRAL_SCORE: u8 = 50;

/// Score a single category from its counts.
pub fn category_score(
    category: FeedbackCategory,
    strengths: usize,
    improvements: usize,
) -> CategoryScore {
    let total = strengths + improvements;
    let score = if total == 0 {
        NEUTRAL_SCORE
    } else {
        (100.0 * strengths as f64 / total as f64).round() as u8
    };
    CategoryScore {
        category,
        score,
        total,
        strengths,
        improvements,
    }
}

/// Score every category, including those without feedback.
pub fn score(
    strengths: &CategorizedFeedback,
    improvements: &CategorizedFeedback,
) -> BTreeMap<FeedbackCategory, CategoryScore> {
    let count = |feedback: &CategorizedFeedback, category: FeedbackCategory| {
        feedback.get(&category).map_or(0, Vec::len)
    };

    FeedbackCategory::all()
        .iter()
        .map(|&category| {
            (
                category,
                category_score(
                    category,
                    count(strengths, category),
                    count(improvements, category),
                ),
            )
        })
        .collect()
}
