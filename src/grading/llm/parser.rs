//! Response parsing for the LLM grading service.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::grading::types::{Evaluation, Grade};
use crate::utils::extract_json_str;

/// Raw LLM response structure. Fields beyond the core four are kept as extensions.
#[derive(Debug, Deserialize)]
struct LlmEvaluationResponse {
    grade: serde_json::Value,
    #[serde(default)]
    reasoning: String,
    #[serde(default)]
    strengths: Vec<String>,
    #[serde(default)]
    improvements: Vec<String>,
    #[serde(flatten)]
    extra: BTreeMap<String, serde_json::Value>,
}

/// Parse error types.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("No JSON found in response")]
    NoJson,
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),
    #[error("Grade {0} is not on the 7-step scale")]
    InvalidGrade(String),
}

fn parse_grade(value: &serde_json::Value) -> Result<Grade, ParseError> {
    let text = match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        other => return Err(ParseError::InvalidGrade(other.to_string())),
    };
    text.parse().map_err(|_| ParseError::InvalidGrade(text))
}

/// Parse the LLM response into a strict [`Evaluation`].
pub fn parse_evaluation_response(response: &str) -> Result<Evaluation, ParseError> {
    let json_str = extract_json_str(response).ok_or(ParseError::NoJson)?;

    let parsed: LlmEvaluationResponse =
        serde_json::from_str(json_str).map_err(|e| ParseError::InvalidJson(e.to_string()))?;

    let grade = parse_grade(&parsed.grade)?;
    let clean = |items: Vec<String>| -> Vec<String> {
        items
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    };

    let mut evaluation = Evaluation::new(
        grade,
        parsed.reasoning.trim(),
        clean(parsed.strengths),
        clean(parsed.improvements),
    );
    evaluation.extensions = parsed.extra;
    Ok(evaluation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_response() {
        let response = r#"{"grade": "10", "reasoning": "Solid", "strengths": ["Sprog: klart"], "improvements": ["Struktur: rodet"]}"#;
        let evaluation = parse_evaluation_response(response).unwrap();

        assert_eq!(evaluation.grade, Grade::Ten);
        assert_eq!(evaluation.reasoning, "Solid");
        assert_eq!(evaluation.strengths, vec!["Sprog: klart"]);
        assert_eq!(evaluation.improvements, vec!["Struktur: rodet"]);
    }

    #[test]
    fn parses_response_with_markdown() {
        let response = "```json\n{\"grade\": \"02\", \"reasoning\": \"Svag\", \"strengths\": [], \"improvements\": [\"Sprog: fejl\"]}\n```";
        let evaluation = parse_evaluation_response(response).unwrap();
        assert_eq!(evaluation.grade, Grade::Two);
    }

    #[test]
    fn accepts_numeric_grade_and_extra_fields() {
        let response = r#"{"grade": 7, "reasoning": "Ok", "strengths": [], "improvements": [], "confidence": 0.8}"#;
        let evaluation = parse_evaluation_response(response).unwrap();
        assert_eq!(evaluation.grade, Grade::Seven);
        assert_eq!(evaluation.extensions.len(), 1);
        assert_eq!(evaluation.extensions["confidence"], serde_json::json!(0.8));
    }

    #[test]
    fn drops_blank_items() {
        let response = r#"{"grade": "4", "reasoning": "", "strengths": ["  ", "Sprog: ok"], "improvements": []}"#;
        let evaluation = parse_evaluation_response(response).unwrap();
        assert_eq!(evaluation.strengths, vec!["Sprog: ok"]);
    }

    #[test]
    fn rejects_off_scale_grade() {
        let response = r#"{"grade": "11", "reasoning": "", "strengths": [], "improvements": []}"#;
        assert!(matches!(
            parse_evaluation_response(response),
            Err(ParseError::InvalidGrade(_))
        ));
    }

    #[test]
    fn rejects_no_json() {
        assert!(matches!(
            parse_evaluation_response("Ingen vurdering"),
            Err(ParseError::NoJson)
        ));
    }
}
