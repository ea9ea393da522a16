use std::io::Write;
use std::process::{Command, Stdio};

use log::debug;

use super::{LlmClient, LlmError};

/// Runs `claude --print`, feeding the prompt on stdin.
#[derive(Debug, Clone, Default)]
pub struct ClaudeClient {
    pub model: Option<String>,
}

impl ClaudeClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(model: impl Into<String>) -> Self {
        Self {
            model: Some(model.into()),
        }
    }

    fn args(&self) -> Vec<String> {
        let mut args = vec!["--print".to_string()];
        if let Some(model) = &self.model {
            args.push("--model".to_string());
            args.push(model.clone());
        }
        args
    }
}

impl LlmClient for ClaudeClient {
    fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let mut child = Command::new("claude")
            .args(self.args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| LlmError::ClientError(format!("Failed to run claude CLI: {}", e)))?;

        // Assignments can be long; stdin avoids argv length limits.
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(prompt.as_bytes())?;
        }

        let output = child.wait_with_output()?;
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            return Err(LlmError::ClientError(format!(
                "claude CLI exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        if !stderr.trim().is_empty() {
            debug!("claude stderr: {}", stderr.trim());
        }

        let response = String::from_utf8_lossy(&output.stdout).to_string();
        if response.trim().is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(response)
    }
}
