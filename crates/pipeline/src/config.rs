use crate::error::{PipelineError, Result};
use analyst_llm::LlmConfig;
use analyst_sql_store::DEFAULT_ROW_LIMIT;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Hard ceiling on query attempts per question (1 initial + 2 repairs).
pub const MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub retrieval: RetrievalConfig,
    pub execution: ExecutionConfig,
    pub planner: PlannerConfig,
    pub llm: LlmConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Chunks retrieved per question.
    pub k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { k: 3 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    pub max_attempts: u32,
    pub row_limit: usize,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            row_limit: DEFAULT_ROW_LIMIT,
        }
    }
}

impl ExecutionConfig {
    /// `max_attempts` clamped to `1..=MAX_ATTEMPTS`.
    #[must_use]
    pub fn attempt_budget(&self) -> u32 {
        self.max_attempts.clamp(1, MAX_ATTEMPTS)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Campaign names whose documents carry active dates (matched case-insensitively).
    pub campaigns: Vec<String>,
    /// Full-year fallback when neither documents nor the question give dates.
    pub default_year: u32,
    /// Years recognised in question text.
    pub min_year: u32,
    pub max_year: u32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            campaigns: vec!["summer beverages".to_string(), "winter classics".to_string()],
            default_year: 1997,
            min_year: 1996,
            max_year: 1999,
        }
    }
}

impl AgentConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| PipelineError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&raw)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_file_yields_defaults() {
        assert_eq!(AgentConfig::from_toml_str("").unwrap(), AgentConfig::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = AgentConfig::from_toml_str(
            r#"
            [retrieval]
            k = 5

            [execution]
            max_attempts = 9

            [llm]
            enabled = true
            model = "llama3"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.retrieval.k, 5);
        assert_eq!(cfg.execution.attempt_budget(), MAX_ATTEMPTS);
        assert_eq!(cfg.execution.row_limit, DEFAULT_ROW_LIMIT);
        assert!(cfg.llm.enabled);
        assert_eq!(cfg.llm.model, "llama3");
        assert_eq!(cfg.planner, PlannerConfig::default());
    }

    #[test]
    fn zero_attempts_still_runs_once() {
        let cfg = ExecutionConfig {
            max_attempts: 0,
            ..ExecutionConfig::default()
        };
        assert_eq!(cfg.attempt_budget(), 1);
    }

    #[test]
    fn bad_toml_is_reported() {
        let err = AgentConfig::from_toml_str("[retrieval]\nk = \"many\"").unwrap_err();
        assert!(matches!(err, PipelineError::ConfigParse(_)));
    }
}
