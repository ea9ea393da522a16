//! LLM-backed grading of an assignment.

pub mod parser;
pub mod prompt;

use std::sync::Arc;

use log::warn;

use crate::grading::types::{Assignment, Evaluation};
use crate::llm::LlmClient;

/// Errors that can occur while obtaining an evaluation.
#[derive(Debug, thiserror::Error)]
pub enum GradingError {
    #[error("LLM grading failed: {0}")]
    LlmFailed(String),
    #[error("Invalid grading response: {0}")]
    InvalidResponse(String),
}

/// Obtains an [`Evaluation`] from an LLM, retrying on failures.
pub struct LlmGrader {
    client: Arc<dyn LlmClient>,
    max_retries: usize,
}

impl LlmGrader {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self {
            client,
            max_retries: 3,
        }
    }

    /// Set the maximum number of attempts (at least one is always made).
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    pub fn grade(&self, assignment: &Assignment) -> Result<Evaluation, GradingError> {
        let prompt_text = prompt::build_grading_prompt(assignment);

        let mut last_error = None;

        for attempt in 1..=self.max_retries {
            match self.client.complete(&prompt_text) {
                Ok(response) => match parser::parse_evaluation_response(&response) {
                    Ok(evaluation) => return Ok(evaluation),
                    Err(e) => {
                        warn!(
                            "Parse error (attempt {}/{}): {}",
                            attempt, self.max_retries, e
                        );
                        last_error = Some(GradingError::InvalidResponse(e.to_string()));
                    }
                },
                Err(e) => {
                    warn!(
                        "LLM error (attempt {}/{}): {}",
                        attempt, self.max_retries, e
                    );
                    last_error = Some(GradingError::LlmFailed(e.to_string()));
                }
            }
        }

        Err(last_error.unwrap_or_else(|| GradingError::LlmFailed("Max retries exceeded".into())))
    }
}
