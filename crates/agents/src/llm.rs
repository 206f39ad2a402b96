//! Chat-completion clients for the language model (OpenAI-compatible and Ollama).

use crate::LlmError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, instrument, warn};

const DEFAULT_PROVIDER: &str = "openai";
const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";
const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

fn env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// One completion call: model, ordered messages, JSON mode and temperature
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub json_mode: bool,
    pub temperature: f32,
}

/// A language model that answers a chat request with text content
#[async_trait]
pub trait CompletionModel: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Provider {
    OpenAi,
    Ollama,
}

/// HTTP chat client
#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    provider: Provider,
    timeout: Option<Duration>,
}

impl ChatClient {
    /// OpenAI-compatible `/chat/completions` endpoint
    pub fn openai(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key: None,
            provider: Provider::OpenAi,
            timeout: None,
        }
    }

    /// Ollama `/api/chat` endpoint
    pub fn ollama(base_url: impl Into<String>) -> Self {
        Self {
            provider: Provider::Ollama,
            ..Self::openai(base_url)
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build from `LLM_PROVIDER`, `LLM_URL`, `LLM_API_KEY` and `LLM_TIMEOUT_SECS`
    pub fn from_env() -> Self {
        let provider = env_or_default("LLM_PROVIDER", DEFAULT_PROVIDER);
        let mut client = if provider.eq_ignore_ascii_case("ollama") {
            Self::ollama(env_or_default("LLM_URL", DEFAULT_OLLAMA_URL))
        } else {
            Self::openai(env_or_default("LLM_URL", DEFAULT_OPENAI_URL))
        };

        if let Some(key) = std::env::var("LLM_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
        {
            client = client.with_api_key(key);
        }

        if let Some(secs) = std::env::var("LLM_TIMEOUT_SECS")
            .ok()
            .and_then(|value| parse_timeout_secs(&value))
        {
            client = client.with_timeout(Duration::from_secs(secs));
        }

        client
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        match self.provider {
            Provider::OpenAi => format!("{}/chat/completions", base),
            Provider::Ollama => format!("{}/api/chat", base),
        }
    }

    fn request_body(&self, request: &CompletionRequest) -> Value {
        match self.provider {
            Provider::OpenAi => {
                let mut body = json!({
                    "model": request.model,
                    "messages": request.messages,
                    "temperature": request.temperature,
                });
                if request.json_mode {
                    body["response_format"] = json!({ "type": "json_object" });
                }
                body
            }
            Provider::Ollama => {
                let mut body = json!({
                    "model": request.model,
                    "messages": request.messages,
                    "stream": false,
                    "options": { "temperature": request.temperature },
                });
                if request.json_mode {
                    body["format"] = json!("json");
                }
                body
            }
        }
    }

    fn extract_content(&self, body: Value) -> Result<String, LlmError> {
        let parsed = match self.provider {
            Provider::OpenAi => serde_json::from_value::<OpenAiResponse>(body.clone()).map(|response| {
                response
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|choice| choice.message.content)
            }),
            Provider::Ollama => serde_json::from_value::<OllamaChatResponse>(body.clone())
                .map(|response| Some(response.message.content)),
        };
        let content = parsed.map_err(|source| LlmError::InvalidResponse { source, body })?;

        content
            .filter(|content| !content.trim().is_empty())
            .ok_or(LlmError::EmptyResponse)
    }
}

fn parse_timeout_secs(value: &str) -> Option<u64> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Some(secs),
        Ok(_) => None,
        Err(_) => {
            warn!("Ignoring LLM_TIMEOUT_SECS={:?}: not a number of seconds", value);
            None
        }
    }
}

#[async_trait]
impl CompletionModel for ChatClient {
    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let url = self.endpoint();
        let mut builder = self.client.post(&url).json(&self.request_body(request));
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        debug!("Requesting completion from {}", url);

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.json::<Value>().await?;
        let content = self.extract_content(body)?;
        debug!("Received {} chars of completion", content.len());
        Ok(content)
    }
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Deserialize)]
struct OpenAiMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: OllamaMessage,
}

#[derive(Deserialize)]
struct OllamaMessage {
    content: String,
}
