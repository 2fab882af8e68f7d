//! # Analyst LLM
//!
//! The optional language-model layer. The pipeline asks it to suggest a route, draft a
//! first query, or phrase an explanation, and falls back to deterministic rules whenever a
//! call fails or the reply breaks the stage's contract.

mod config;
mod error;
mod model;
mod ollama;
pub mod prompts;

pub use config::{LlmConfig, DEFAULT_MODEL, DEFAULT_OLLAMA_HOST};
pub use error::{LlmError, Result};
pub use model::{CompletionRequest, LanguageModel};
pub use ollama::{normalize_host, OllamaClient};
