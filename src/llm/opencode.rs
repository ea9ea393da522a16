use std::process::Command;

use super::{LlmClient, LlmError};

/// Runs `opencode run <prompt> --format json` and joins the text events.
#[derive(Debug, Clone, Default)]
pub struct OpenCodeClient {
    pub model: Option<String>,
    pub backend: Option<String>,
}

impl OpenCodeClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_backend(mut self, backend: impl Into<String>) -> Self {
        self.backend = Some(backend.into());
        self
    }

    /// The `-m` value, if any. opencode expects `provider/model`.
    fn model_arg(&self) -> Option<String> {
        match (&self.backend, &self.model) {
            (Some(backend), Some(model)) if !model.contains('/') => {
                Some(format!("{}/{}", backend, model))
            }
            (_, Some(model)) => Some(model.clone()),
            // A backend alone does not name a model; let opencode choose.
            (_, None) => None,
        }
    }
}

impl LlmClient for OpenCodeClient {
    fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let mut command = Command::new("opencode");
        command.args(["run", prompt, "--format", "json"]);
        if let Some(model) = self.model_arg() {
            command.args(["-m", model.as_str()]);
        }

        let output = command
            .output()
            .map_err(|e| LlmError::ClientError(format!("Failed to run opencode CLI: {}", e)))?;

        if !output.status.success() {
            return Err(LlmError::ClientError(format!(
                "opencode CLI exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let text = collect_text(&String::from_utf8_lossy(&output.stdout));
        if text.trim().is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(text)
    }
}

/// Concatenate the `part.text` of every `"type": "text"` event line.
fn collect_text(stdout: &str) -> String {
    stdout
        .lines()
        .filter_map(|line| serde_json::from_str::<serde_json::Value>(line).ok())
        .filter(|event| event.get("type").and_then(|t| t.as_str()) == Some("text"))
        .filter_map(|event| {
            event
                .get("part")
                .and_then(|p| p.get("text"))
                .and_then(|t| t.as_str())
                .map(str::to_string)
        })
        .collect()
}
