//! LLM client plumbing.
//!
//! Grading prompts and response parsing live in `grading::llm`; this module
//! only knows how to hand a prompt to a command-line model and read text back.
//!
//! Settings come from `KARAKTER_LLM_PROVIDER`, `KARAKTER_LLM_MODEL` and
//! `KARAKTER_OPENCODE_BACKEND`, overridden by the matching CLI flags.

mod claude;
mod opencode;

pub use claude::ClaudeClient;
pub use opencode::OpenCodeClient;

use std::env;
use std::sync::Arc;

use log::warn;

pub const PROVIDER_ENV: &str = "KARAKTER_LLM_PROVIDER";
pub const MODEL_ENV: &str = "KARAKTER_LLM_MODEL";
pub const OPENCODE_BACKEND_ENV: &str = "KARAKTER_OPENCODE_BACKEND";

/// Which command-line model to shell out to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmProvider {
    #[default]
    Claude,
    OpenCode,
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Claude => write!(f, "claude"),
            Self::OpenCode => write!(f, "opencode"),
        }
    }
}

impl std::str::FromStr for LlmProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "claude" => Ok(Self::Claude),
            "opencode" => Ok(Self::OpenCode),
            _ => Err(format!(
                "Unknown LLM provider '{}' (expected claude or opencode)",
                s
            )),
        }
    }
}

/// Provider, model and backend selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub model: Option<String>,
    /// Backend for opencode, e.g. "ollama". Combined with `model` as `backend/model`.
    pub opencode_backend: Option<String>,
}

impl LlmConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let provider = match lookup(PROVIDER_ENV) {
            Some(value) => value.parse().unwrap_or_else(|e| {
                warn!("{}; using {}", e, LlmProvider::default());
                LlmProvider::default()
            }),
            None => LlmProvider::default(),
        };

        Self {
            provider,
            model: lookup(MODEL_ENV).filter(|m| !m.trim().is_empty()),
            opencode_backend: lookup(OPENCODE_BACKEND_ENV).filter(|b| !b.trim().is_empty()),
        }
    }

    pub fn with_provider(mut self, provider: LlmProvider) -> Self {
        self.provider = provider;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Apply command-line values on top of this config.
    pub fn with_overrides(
        mut self,
        provider: Option<LlmProvider>,
        model: Option<String>,
        opencode_backend: Option<String>,
    ) -> Self {
        if let Some(p) = provider {
            self.provider = p;
        }
        if let Some(m) = model {
            self.model = Some(m);
        }
        if let Some(b) = opencode_backend {
            self.opencode_backend = Some(b);
        }
        self
    }

    pub fn create_client(&self) -> Arc<dyn LlmClient> {
        match self.provider {
            LlmProvider::Claude => Arc::new(ClaudeClient {
                model: self.model.clone(),
            }),
            LlmProvider::OpenCode => Arc::new(OpenCodeClient {
                model: self.model.clone(),
                backend: self.opencode_backend.clone(),
            }),
        }
    }
}

/// A text completion backend.
pub trait LlmClient: Send + Sync {
    fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("LLM client error: {0}")]
    ClientError(String),

    #[error("LLM returned no text")]
    EmptyResponse,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn mock_client_echoes_response() {
        let client = test_support::MockLlmClient::new("svar");
        assert_eq!(client.complete("prompt").unwrap(), "svar");
    }

    #[test]
    fn provider_parse() {
        assert_eq!("claude".parse::<LlmProvider>().unwrap(), LlmProvider::Claude);
        assert_eq!(" OpenCode ".parse::<LlmProvider>().unwrap(), LlmProvider::OpenCode);
        assert!("gpt".parse::<LlmProvider>().is_err());
    }

    #[test]
    fn config_from_lookup() {
        let config = LlmConfig::from_lookup(lookup(&[
            (PROVIDER_ENV, "opencode"),
            (MODEL_ENV, "qwen3"),
            (OPENCODE_BACKEND_ENV, "ollama"),
        ]));
        assert_eq!(config.provider, LlmProvider::OpenCode);
        assert_eq!(config.model.as_deref(), Some("qwen3"));
        assert_eq!(config.opencode_backend.as_deref(), Some("ollama"));
    }

    #[test]
    fn unknown_provider_falls_back_to_default() {
        let config = LlmConfig::from_lookup(lookup(&[(PROVIDER_ENV, "gpt"), (MODEL_ENV, " ")]));
        assert_eq!(config.provider, LlmProvider::Claude);
        assert_eq!(config.model, None);
    }

    #[test]
    fn overrides_take_precedence() {
        let config = LlmConfig::new().with_model("sonnet");

        let updated = config.with_overrides(Some(LlmProvider::OpenCode), None, None);
        assert_eq!(updated.provider, LlmProvider::OpenCode);
        assert_eq!(updated.model.as_deref(), Some("sonnet"));

        let updated = updated.with_overrides(None, Some("opus".into()), Some("lmstudio".into()));
        assert_eq!(updated.model.as_deref(), Some("opus"));
        assert_eq!(updated.opencode_backend.as_deref(), Some("lmstudio"));
    }
}
