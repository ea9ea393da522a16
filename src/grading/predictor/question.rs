//! Deterministic grading of objective questions.

use log::debug;

use crate::grading::types::{
    Grade, GradePrediction, GradeRange, QuestionData, QuestionEvaluation, QuestionType,
};

/// Confidence reported for automatically graded questions.
pub const AUTO_GRADE_CONFIDENCE: f64 = 0.99;

/// Largest numeric difference still counted as partially correct.
pub const MATH_TOLERANCE: f64 = 0.001;

const STOP_WORDS: &[&str] = &["and", "the", "for", "med", "eller", "og", "den", "det", "som"];

/// Outcome of comparing a student answer against the correct one.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerCheck {
    pub grade: Grade,
    pub is_correct: bool,
    pub partially_correct: bool,
    pub explanation: String,
}

impl AnswerCheck {
    fn correct(explanation: impl Into<String>) -> Self {
        Self {
            grade: Grade::Twelve,
            is_correct: true,
            partially_correct: false,
            explanation: explanation.into(),
        }
    }

    fn partial(grade: Grade, explanation: impl Into<String>) -> Self {
        Self {
            grade,
            is_correct: false,
            partially_correct: true,
            explanation: explanation.into(),
        }
    }

    fn incorrect(explanation: impl Into<String>) -> Self {
        Self {
            grade: Grade::Zero,
            is_correct: false,
            partially_correct: false,
            explanation: explanation.into(),
        }
    }
}

/// Grade a question, bypassing rubric prediction.
pub fn grade_question(question: &QuestionData) -> GradePrediction {
    let check = check_answer(question);
    debug!(
        "Auto-graded {:?} question: {} (correct={}, partial={})",
        question.question_type, check.grade, check.is_correct, check.partially_correct
    );

    let explanation = match &question.explanation {
        Some(extra) if !extra.trim().is_empty() => {
            format!("{} {}", check.explanation, extra.trim())
        }
        _ => check.explanation,
    };

    GradePrediction {
        predicted_grade: check.grade,
        confidence: AUTO_GRADE_CONFIDENCE,
        range: GradeRange::exact(check.grade),
        rubric_scores: Vec::new(),
        is_automatically_graded: true,
        question_evaluation: Some(QuestionEvaluation {
            is_correct: check.is_correct,
            partially_correct: check.partially_correct,
            explanation,
        }),
    }
}

/// Compare the student answer with the correct one according to the question type.
pub fn check_answer(question: &QuestionData) -> AnswerCheck {
    let student = question.student_answer.as_str();
    let correct = question.correct_answer.as_str();

    match question.question_type {
        QuestionType::Math => check_math(student, correct),
        QuestionType::MultipleChoice => check_choice(student, correct),
        QuestionType::TrueFalse => check_true_false(student, correct),
        QuestionType::Text => check_text(student, correct),
        QuestionType::Unknown => AnswerCheck::incorrect("Unknown question type"),
    }
}

fn strip_whitespace(answer: &str) -> String {
    answer.chars().filter(|c| !c.is_whitespace()).collect()
}

fn parse_number(answer: &str) -> Option<f64> {
    answer.replace(',', ".").parse::<f64>().ok()
}

fn check_math(student: &str, correct: &str) -> AnswerCheck {
    let student = strip_whitespace(student);
    let correct = strip_whitespace(correct);

    if student == correct {
        return AnswerCheck::correct("Correct answer.");
    }

    match (parse_number(&student), parse_number(&correct)) {
        (Some(s), Some(c)) if (s - c).abs() <= f64::EPSILON * c.abs().max(1.0) => {
            AnswerCheck::correct("Correct answer.")
        }
        (Some(s), Some(c)) if (s - c).abs() < MATH_TOLERANCE => AnswerCheck::partial(
            Grade::Seven,
            format!("Close to the correct answer ({}).", correct),
        ),
        _ => AnswerCheck::incorrect(format!("Incorrect. The correct answer is {}.", correct)),
    }
}

fn check_choice(student: &str, correct: &str) -> AnswerCheck {
    if student.trim() == correct.trim() {
        AnswerCheck::correct("Correct option selected.")
    } else {
        AnswerCheck::incorrect(format!(
            "Incorrect. The correct option is {}.",
            correct.trim()
        ))
    }
}

/// Canonical truth value, treating Danish `ja`/`nej` as `true`/`false`.
fn canonical_truth(answer: &str) -> String {
    let lowered = answer.trim().to_lowercase();
    match lowered.as_str() {
        "ja" => "true".to_string(),
        "nej" => "false".to_string(),
        _ => lowered,
    }
}

fn check_true_false(student: &str, correct: &str) -> AnswerCheck {
    if canonical_truth(student) == canonical_truth(correct) {
        AnswerCheck::correct("Correct.")
    } else {
        AnswerCheck::incorrect(format!(
            "Incorrect. The correct answer is {}.",
            correct.trim()
        ))
    }
}

/// Significant words of an answer: longer than three characters and not a stop word.
fn key_terms(answer: &str) -> Vec<String> {
    answer
        .to_lowercase()
        .split_whitespace()
        .map(|token| token.trim_matches(|c: char| !c.is_alphanumeric()).to_string())
        .filter(|token| token.chars().count() > 3 && !STOP_WORDS.contains(&token.as_str()))
        .collect()
}

/// Fraction of the correct answer's key terms found in the student answer.
pub fn key_term_overlap(student: &str, correct: &str) -> f64 {
    let terms = key_terms(correct);
    if terms.is_empty() {
        return 0.0;
    }
    let student = student.to_lowercase();
    let found = terms.iter().filter(|t| student.contains(t.as_str())).count();
    found as f64 / terms.len() as f64
}

fn check_text(student: &str, correct: &str) -> AnswerCheck {
    if student.trim().to_lowercase() == correct.trim().to_lowercase() {
        return AnswerCheck::correct("Correct answer.");
    }

    let overlap = key_term_overlap(student, correct);
    let percent = (overlap * 100.0).round();
    if overlap >= 0.8 {
        AnswerCheck::partial(
            Grade::Ten,
            format!("Nearly complete answer ({}% of key terms).", percent),
        )
    } else if overlap >= 0.5 {
        AnswerCheck::partial(
            Grade::Seven,
            format!("Partially correct answer ({}% of key terms).", percent),
        )
    } else if overlap >= 0.3 {
        AnswerCheck::partial(
            Grade::Four,
            format!("Answer covers few key points ({}% of key terms).", percent),
        )
    } else {
        AnswerCheck::incorrect(format!(
            "Incorrect. Expected an answer like: {}",
            correct.trim()
        ))
    }
}
