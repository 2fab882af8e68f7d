use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Construction-time failures. Per-question problems never surface as errors.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Cannot read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Cannot describe schema: {0}")]
    Schema(#[from] analyst_sql_store::SqlStoreError),

    #[error("Language model unavailable: {0}")]
    Llm(#[from] analyst_llm::LlmError),
}
