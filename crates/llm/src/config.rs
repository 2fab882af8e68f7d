use serde::{Deserialize, Serialize};
use std::env;

pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "phi3.5:3.8b-mini-instruct-q4_K_M";

/// Language-model settings. Disabled by default; each stage can opt out separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub enabled: bool,
    pub host: String,
    pub model: String,
    pub timeout_secs: u64,
    /// Ask the model for the route before the keyword rules.
    pub route: bool,
    /// Ask the model to draft the first query before the templates.
    pub sql: bool,
    /// Ask the model to phrase the explanation.
    pub explain: bool,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: DEFAULT_OLLAMA_HOST.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: 60,
            route: true,
            sql: true,
            explain: true,
        }
    }
}

impl LlmConfig {
    /// Applies `OLLAMA_HOST` and `ANALYST_LLM_MODEL` when set and non-empty.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(host) = env::var("OLLAMA_HOST").ok().filter(|v| !v.trim().is_empty()) {
            self.host = host;
        }
        if let Some(model) = env::var("ANALYST_LLM_MODEL")
            .ok()
            .filter(|v| !v.trim().is_empty())
        {
            self.model = model;
        }
        self
    }

    #[must_use]
    pub fn route_enabled(&self) -> bool {
        self.enabled && self.route
    }

    #[must_use]
    pub fn sql_enabled(&self) -> bool {
        self.enabled && self.sql
    }

    #[must_use]
    pub fn explain_enabled(&self) -> bool {
        self.enabled && self.explain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_follow_master_switch() {
        let cfg = LlmConfig::default();
        assert!(!cfg.route_enabled() && !cfg.sql_enabled() && !cfg.explain_enabled());

        let cfg = LlmConfig {
            enabled: true,
            sql: false,
            ..LlmConfig::default()
        };
        assert!(cfg.route_enabled());
        assert!(!cfg.sql_enabled());
        assert!(cfg.explain_enabled());
    }
}
