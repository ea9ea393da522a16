//! Score curve and score-to-grade thresholds.

use crate::grading::types::Grade;

/// Minimum curved score for each step above `-3`, indexed by the grade below it.
pub const GRADE_THRESHOLDS: [f64; 6] = [0.5, 1.0, 2.0, 3.5, 4.5, 6.0];

/// How close below the next threshold a score must be to get promoted.
pub const BORDERLINE_MARGIN: f64 = 0.6;

/// Non-linear lift of a 0-10 score, strongest mid-scale. Capped at 10.
pub fn apply_curve(x: f64) -> f64 {
    let boost = 1.5 * x * (1.0 - x / 10.0) * 0.9;
    let mut curved = x + boost;
    if (3.0..=7.0).contains(&x) {
        curved += 0.7;
    }
    curved.min(10.0)
}

/// Grade for a curved score.
pub fn grade_for_score(score: f64) -> Grade {
    let reached = GRADE_THRESHOLDS.iter().filter(|&&t| score >= t).count();
    Grade::from_index(reached as isize)
}

/// Whether `score` sits just below the threshold for the step above `grade`.
pub fn is_borderline(score: f64, grade: Grade) -> bool {
    match GRADE_THRESHOLDS.get(grade.index()) {
        Some(&next) => {
            let gap = next - score;
            gap > 0.0 && gap <= BORDERLINE_MARGIN
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curve_lifts_mid_scale() {
        // 5 + 1.5*5*0.5*0.9 + 0.7 = 9.075
        assert!((apply_curve(5.0) - 9.075).abs() < 1e-9);
        // 2 + 1.5*2*0.8*0.9 = 4.16
        assert!((apply_curve(2.0) - 4.16).abs() < 1e-9);
        assert_eq!(apply_curve(0.0), 0.0);
        assert_eq!(apply_curve(10.0), 10.0);
        assert_eq!(apply_curve(8.0), 10.0);
    }

    #[test]
    fn thresholds_map_to_grades() {
        assert_eq!(grade_for_score(0.0), Grade::MinusThree);
        assert_eq!(grade_for_score(0.49), Grade::MinusThree);
        assert_eq!(grade_for_score(0.5), Grade::Zero);
        assert_eq!(grade_for_score(1.0), Grade::Two);
        assert_eq!(grade_for_score(2.0), Grade::Four);
        assert_eq!(grade_for_score(3.5), Grade::Seven);
        assert_eq!(grade_for_score(4.5), Grade::Ten);
        assert_eq!(grade_for_score(6.0), Grade::Twelve);
        assert_eq!(grade_for_score(10.0), Grade::Twelve);
    }

    #[test]
    fn borderline_detection() {
        assert!(is_borderline(3.0, Grade::Four));
        assert!(!is_borderline(2.8, Grade::Four));
        assert!(!is_borderline(3.6, Grade::Four));
        assert!(!is_borderline(9.0, Grade::Twelve));
    }
}
