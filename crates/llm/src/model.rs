use crate::error::Result;

/// One prompt sent to a language model.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompletionRequest {
    pub system: Option<String>,
    pub user: String,
}

impl CompletionRequest {
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            system: None,
            user: user.into(),
        }
    }

    #[must_use]
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }
}

/// A blocking text-completion backend.
///
/// Callers treat every error as "unavailable for this question" and fall back to their
/// deterministic path; nothing here may abort a batch.
pub trait LanguageModel: Send + Sync {
    fn name(&self) -> &str;

    fn complete(&self, request: &CompletionRequest) -> Result<String>;
}
