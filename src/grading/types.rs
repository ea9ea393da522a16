//! Core types for grade prediction.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::grading::feedback::FeedbackCategory;
use crate::grading::rubric::RubricName;
use crate::utils::count_words;

/// A grade on the Danish 7-step scale, ordered worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "-3")]
    MinusThree,
    #[serde(rename = "00")]
    Zero,
    #[serde(rename = "02")]
    Two,
    #[serde(rename = "4")]
    Four,
    #[serde(rename = "7")]
    Seven,
    #[serde(rename = "10")]
    Ten,
    #[serde(rename = "12")]
    Twelve,
}

impl Grade {
    /// All grades in ascending order.
    pub const ALL: [Grade; 7] = [
        Grade::MinusThree,
        Grade::Zero,
        Grade::Two,
        Grade::Four,
        Grade::Seven,
        Grade::Ten,
        Grade::Twelve,
    ];

    /// Ordinal position on the scale (0 = `-3`, 6 = `12`).
    pub fn index(self) -> usize {
        self as usize
    }

    /// Grade at an ordinal position, clamped to the scale bounds.
    pub fn from_index(index: isize) -> Grade {
        let clamped = index.clamp(0, (Self::ALL.len() - 1) as isize) as usize;
        Self::ALL[clamped]
    }

    /// The printed symbol, e.g. `"02"`.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::MinusThree => "-3",
            Self::Zero => "00",
            Self::Two => "02",
            Self::Four => "4",
            Self::Seven => "7",
            Self::Ten => "10",
            Self::Twelve => "12",
        }
    }

    /// One step up the scale, saturating at `12`.
    pub fn step_up(self) -> Grade {
        Self::from_index(self.index() as isize + 1)
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Grade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "-3" | "-03" => Ok(Self::MinusThree),
            "00" | "0" => Ok(Self::Zero),
            "02" | "2" => Ok(Self::Two),
            "4" | "04" => Ok(Self::Four),
            "7" | "07" => Ok(Self::Seven),
            "10" => Ok(Self::Ten),
            "12" => Ok(Self::Twelve),
            other => Err(format!("Unknown grade: '{}'", other)),
        }
    }
}

/// Inclusive range of grades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeRange {
    pub min: Grade,
    pub max: Grade,
}

impl GradeRange {
    pub fn new(min: Grade, max: Grade) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// A range holding a single grade.
    pub fn exact(grade: Grade) -> Self {
        Self {
            min: grade,
            max: grade,
        }
    }

    /// Widen around `grade` by `below` steps down and `above` steps up, clamped to the scale.
    pub fn around(grade: Grade, below: usize, above: usize) -> Self {
        let idx = grade.index() as isize;
        Self {
            min: Grade::from_index(idx - below as isize),
            max: Grade::from_index(idx + above as isize),
        }
    }

    pub fn contains(&self, grade: Grade) -> bool {
        self.min <= grade && grade <= self.max
    }
}

/// LLM-produced evaluation of an assignment.
///
/// Unknown top-level fields are rejected; optional extra data goes in `extensions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Evaluation {
    pub grade: Grade,
    pub reasoning: String,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extensions: BTreeMap<String, serde_json::Value>,
}

impl Evaluation {
    pub fn new(
        grade: Grade,
        reasoning: impl Into<String>,
        strengths: Vec<String>,
        improvements: Vec<String>,
    ) -> Self {
        Self {
            grade,
            reasoning: reasoning.into(),
            strengths,
            improvements,
            extensions: BTreeMap::new(),
        }
    }
}

/// Subjects with their own rubric weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    Mathematics,
    Literature,
    Science,
    History,
}

impl Subject {
    /// Resolve a free-text subject name (English or Danish). Unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Subject> {
        match name.trim().to_lowercase().as_str() {
            "mathematics" | "math" | "matematik" => Some(Self::Mathematics),
            "literature" | "litteratur" | "dansk" => Some(Self::Literature),
            "science" | "naturvidenskab" | "fysik" | "kemi" | "biologi" => Some(Self::Science),
            "history" | "historie" => Some(Self::History),
            _ => None,
        }
    }
}

/// Objective question kinds that can be graded without the LLM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionType {
    #[serde(rename = "math")]
    Math,
    #[serde(rename = "multiplechoice")]
    MultipleChoice,
    #[serde(rename = "trueFalse")]
    TrueFalse,
    #[serde(rename = "text")]
    Text,
    #[serde(other)]
    Unknown,
}

/// An objective question with a known answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionData {
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[serde(default)]
    pub question: String,
    pub student_answer: String,
    pub correct_answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_area: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
}

impl QuestionData {
    pub fn new(
        question_type: QuestionType,
        student_answer: impl Into<String>,
        correct_answer: impl Into<String>,
    ) -> Self {
        Self {
            question_type,
            question: String::new(),
            student_answer: student_answer.into(),
            correct_answer: correct_answer.into(),
            explanation: None,
            options: None,
            subject_area: None,
            difficulty: None,
        }
    }
}

/// Metadata about the submitted assignment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_data: Option<QuestionData>,
}

impl Assignment {
    /// Full text of the assignment, if any non-blank text is present.
    pub fn body(&self) -> Option<&str> {
        self.content
            .as_deref()
            .filter(|content| !content.trim().is_empty())
    }

    /// Declared word count, else counted from the content, else 0.
    pub fn effective_word_count(&self) -> usize {
        match (self.word_count, self.body()) {
            (Some(count), _) => count,
            (None, Some(body)) => count_words(body),
            (None, None) => 0,
        }
    }

    pub fn subject(&self) -> Option<Subject> {
        self.subject.as_deref().and_then(Subject::parse)
    }
}

/// Per-category balance of strengths against improvements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: FeedbackCategory,
    /// 0-100; 50 when the category has no feedback.
    pub score: u8,
    pub total: usize,
    pub strengths: usize,
    pub improvements: usize,
}

/// Score for one rubric dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RubricScore {
    pub rubric: RubricName,
    pub score: f64,
    pub max_score: f64,
    pub weight: f64,
}

/// Outcome of deterministic question grading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionEvaluation {
    pub is_correct: bool,
    pub partially_correct: bool,
    pub explanation: String,
}

/// Independently predicted grade with its confidence interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradePrediction {
    pub predicted_grade: Grade,
    /// 0.0 to 1.0.
    pub confidence: f64,
    pub range: GradeRange,
    pub rubric_scores: Vec<RubricScore>,
    #[serde(default)]
    pub is_automatically_graded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_evaluation: Option<QuestionEvaluation>,
}
