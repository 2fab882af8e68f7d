use crate::config::LlmConfig;
use crate::error::{LlmError, Result};
use crate::model::{CompletionRequest, LanguageModel};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// Ollama `/api/chat` client with streaming disabled and temperature 0.
pub struct OllamaClient {
    client: reqwest::blocking::Client,
    url: String,
    model: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

impl OllamaClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let mut builder = reqwest::blocking::Client::builder();
        if config.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_secs));
        }
        let client = builder
            .build()
            .map_err(|e| LlmError::Client(e.to_string()))?;
        let url = format!("{}/api/chat", normalize_host(&config.host));
        log::info!("Language model: {} via {}", config.model, url);
        Ok(Self {
            client,
            url,
            model: config.model.clone(),
        })
    }

    fn body(&self, request: &CompletionRequest) -> serde_json::Value {
        let mut messages = Vec::new();
        if let Some(system) = &request.system {
            messages.push(json!({ "role": "system", "content": system }));
        }
        messages.push(json!({ "role": "user", "content": request.user }));
        json!({
            "model": self.model,
            "stream": false,
            "messages": messages,
            "options": { "temperature": 0 }
        })
    }
}

impl LanguageModel for OllamaClient {
    fn name(&self) -> &str {
        &self.model
    }

    fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let resp = self
            .client
            .post(&self.url)
            .json(&self.body(request))
            .send()
            .map_err(|e| LlmError::Unreachable {
                url: self.url.clone(),
                message: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(LlmError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let out: ChatResponse = resp
            .json()
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;
        let content = out.message.content.trim().to_string();
        if content.is_empty() {
            return Err(LlmError::EmptyReply);
        }
        Ok(content)
    }
}

/// Adds a scheme when missing and drops trailing slashes.
#[must_use]
pub fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{host}")
    }
}
