use analyst_llm::{CompletionRequest, LanguageModel};
use std::fmt;
use std::sync::Arc;

/// An optional drafting capability, fixed at construction.
///
/// `Available` delegates to a language model and keeps the reply only when the stage's
/// acceptance check passes; `Unavailable` never calls out. Either way the caller continues
/// with its deterministic rule when [`Assist::draft`] returns `None`.
#[derive(Clone, Default)]
pub enum Assist {
    Available(Arc<dyn LanguageModel>),
    #[default]
    Unavailable,
}

impl Assist {
    #[must_use]
    pub fn when(enabled: bool, model: Option<&Arc<dyn LanguageModel>>) -> Self {
        match model {
            Some(model) if enabled => Self::Available(Arc::clone(model)),
            _ => Self::Unavailable,
        }
    }

    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    /// Sends `request` and maps the reply through `accept`.
    pub fn draft<T>(
        &self,
        stage: &str,
        request: &CompletionRequest,
        accept: impl FnOnce(&str) -> Option<T>,
    ) -> Option<T> {
        let Self::Available(model) = self else {
            return None;
        };
        match model.complete(request) {
            Ok(reply) => {
                let accepted = accept(&reply);
                if accepted.is_none() {
                    log::debug!("{stage}: reply from {} rejected: {reply:?}", model.name());
                }
                accepted
            }
            Err(err) => {
                log::debug!("{stage}: {} failed: {err}", model.name());
                None
            }
        }
    }
}

impl fmt::Debug for Assist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Available(model) => f.debug_tuple("Available").field(&model.name()).finish(),
            Self::Unavailable => f.write_str("Unavailable"),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use analyst_llm::{CompletionRequest, LanguageModel, LlmError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Replies with a fixed text, or fails when `reply` is `None`.
    pub struct ScriptedModel {
        reply: Option<String>,
        pub calls: AtomicUsize,
    }

    impl ScriptedModel {
        pub fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Some(reply.to_string()),
                calls: AtomicUsize::new(0),
            })
        }

        pub fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: None,
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl LanguageModel for ScriptedModel {
        fn name(&self) -> &str {
            "scripted"
        }

        fn complete(&self, _request: &CompletionRequest) -> analyst_llm::Result<String> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            self.reply.clone().ok_or(LlmError::EmptyReply)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::ScriptedModel;
    use super::*;
    use std::sync::atomic::Ordering;

    #[test]
    fn unavailable_never_calls_out() {
        let assist = Assist::Unavailable;
        let out: Option<String> =
            assist.draft("test", &CompletionRequest::new("x"), |r| Some(r.to_string()));
        assert!(out.is_none());
    }

    #[test]
    fn disabled_model_is_unavailable() {
        let model: Arc<dyn LanguageModel> = ScriptedModel::replying("sql");
        assert!(!Assist::when(false, Some(&model)).is_available());
        assert!(!Assist::when(true, None).is_available());
        assert!(Assist::when(true, Some(&model)).is_available());
    }

    #[test]
    fn rejected_and_failed_replies_yield_none() {
        let scripted = ScriptedModel::replying("maybe");
        let model: Arc<dyn LanguageModel> = scripted.clone();
        let assist = Assist::Available(model);
        let out = assist.draft("route", &CompletionRequest::new("q"), |r| {
            (r == "sql").then_some(())
        });
        assert!(out.is_none());
        assert_eq!(scripted.calls.load(Ordering::Relaxed), 1);

        let assist = Assist::Available(ScriptedModel::failing());
        let out = assist.draft("route", &CompletionRequest::new("q"), |r| Some(r.len()));
        assert!(out.is_none());
    }
}
