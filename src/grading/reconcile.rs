//! Agreement between the LLM grade and the independent prediction.

use crate::grading::types::{Grade, GradeRange};

pub const EXACT_MATCH: u8 = 100;
pub const WITHIN_RANGE: u8 = 75;
pub const MISS: u8 = 0;

/// Accuracy signal: 100 for an exact match, 75 when the LLM grade falls inside
/// the predicted range, otherwise 0.
pub fn reconcile(llm_grade: Grade, predicted_grade: Grade, range: GradeRange) -> u8 {
    if llm_grade == predicted_grade {
        EXACT_MATCH
    } else if range.contains(llm_grade) {
        WITHIN_RANGE
    } else {
        MISS
    }
}
