//! Completion API wire types, error taxonomy, and the HTTP backend.
//!
//! [`GroqClient`] talks to a Groq / OpenAI-compatible chat-completions API:
//! JSON request bodies, JSON responses, and `text/event-stream` bodies for
//! streaming completions. The [`CompletionBackend`] trait is the seam the
//! fallback wrapper and tests plug into.

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stream of incremental completion chunks.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<StreamChunk, CompletionError>> + Send>>;

/// One chat message in a completion request or response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message role: `"system"`, `"user"`, or `"assistant"`.
    pub role: String,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    /// Builds a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Builds a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Immutable prompt/parameter tuple submitted per completion attempt.
///
/// Fallback attempts regenerate the request with only `model` varying.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    /// Model identifier (rewritten per fallback candidate).
    pub model: String,
    /// Conversation messages.
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature.
    pub temperature: f32,
    /// Completion token budget.
    pub max_tokens: u32,
    /// Whether the provider should stream the response. Set by the backend
    /// method used, not by callers.
    #[serde(default, skip_serializing_if = "is_false")]
    pub stream: bool,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(b: &bool) -> bool {
    !*b
}

impl CompletionRequest {
    /// Returns a copy of this request targeting a different model id.
    #[must_use]
    pub fn with_model(&self, model: &str) -> Self {
        let mut request = self.clone();
        request.model = model.to_string();
        request
    }
}

/// Non-streaming completion result.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletion {
    /// Completion choices (the first one is used).
    pub choices: Vec<CompletionChoice>,
}

/// One completion choice.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionChoice {
    /// The generated message.
    pub message: ChatMessage,
}

impl ChatCompletion {
    /// Returns the text of the first choice, or `""` when absent.
    #[must_use]
    pub fn content(&self) -> &str {
        self.choices
            .first()
            .map_or("", |choice| choice.message.content.as_str())
    }
}

/// One chunk of a streaming completion.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamChunk {
    /// Chunk choices (the first one is used).
    pub choices: Vec<ChunkChoice>,
}

/// One choice inside a streaming chunk.
#[derive(Debug, Clone, Deserialize)]
pub struct ChunkChoice {
    /// Incremental message delta.
    #[serde(default)]
    pub delta: ChunkDelta,
}

/// Incremental message delta; role-only and empty deltas carry no text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChunkDelta {
    /// Incremental content, when present.
    pub content: Option<String>,
}

impl StreamChunk {
    /// Returns the non-empty text delta of this chunk, if any.
    #[must_use]
    pub fn delta(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.delta.content.as_deref())
            .filter(|text| !text.is_empty())
    }
}

/// Completion subsystem errors.
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    /// A specific model id is unknown or inaccessible. Recoverable: drives
    /// the fallback loop to the next candidate.
    #[error("model not found or inaccessible: {model}")]
    ModelNotFound {
        /// The model id that was rejected.
        model: String,
        /// Provider error message.
        message: String,
    },

    /// Any other upstream failure (auth, rate limit, malformed request).
    /// Fatal: propagated untouched, never treated as a model-selection
    /// problem.
    #[error("completion api error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Provider error code, when present.
        code: Option<String>,
        /// Provider error message.
        message: String,
    },

    /// Transport-level failure (connect, timeout, body read).
    #[error("completion transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// No API key or model configured; AI features are switched off.
    #[error("completion api is not configured")]
    NotConfigured,

    /// Every candidate and every listed model failed.
    #[error("no candidate model succeeded")]
    NoCandidateSucceeded {
        /// Last underlying failure seen.
        #[source]
        source: Box<CompletionError>,
    },
}

impl CompletionError {
    /// Returns `true` for the "this identifier doesn't exist" family of
    /// failures: explicit not-found code, HTTP 404, or a message matching
    /// the not-found pattern.
    #[must_use]
    pub fn is_model_not_found(&self) -> bool {
        match self {
            Self::ModelNotFound { .. } => true,
            Self::Api {
                status,
                code,
                message,
            } => {
                *status == 404
                    || code.as_deref() == Some("model_not_found")
                    || message.to_lowercase().contains("model not found")
            }
            _ => false,
        }
    }
}

/// Seam between the fallback wrapper and a concrete completion provider.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Executes a non-streaming completion.
    async fn complete(&self, request: CompletionRequest) -> Result<ChatCompletion, CompletionError>;

    /// Opens a streaming completion.
    ///
    /// The call succeeds once the provider accepts the request; chunk-level
    /// failures surface as stream items.
    async fn complete_stream(
        &self,
        request: CompletionRequest,
    ) -> Result<ChunkStream, CompletionError>;

    /// Lists the model identifiers currently available to this account.
    async fn list_models(&self) -> Result<Vec<String>, CompletionError>;
}

/// HTTP backend for a Groq / OpenAI-compatible completion API.
#[derive(Debug, Clone)]
pub struct GroqClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GroqClient {
    /// Creates a client for the given API base URL and key.
    ///
    /// # Errors
    ///
    /// Returns a [`CompletionError::Transport`] if the underlying HTTP
    /// client cannot be constructed.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, CompletionError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// Classifies a non-success response into the error taxonomy.
    async fn response_error(response: reqwest::Response, model: &str) -> CompletionError {
        let status = response.status().as_u16();
        let body = response.json::<Value>().await.unwrap_or_default();
        let error = body.get("error");
        let message = error
            .and_then(|e| e.get("message"))
            .and_then(Value::as_str)
            .unwrap_or("unknown upstream error")
            .to_string();
        let code = error
            .and_then(|e| e.get("code"))
            .and_then(Value::as_str)
            .map(str::to_string);

        if status == 404
            || code.as_deref() == Some("model_not_found")
            || message.to_lowercase().contains("model not found")
        {
            CompletionError::ModelNotFound {
                model: model.to_string(),
                message,
            }
        } else {
            CompletionError::Api {
                status,
                code,
                message,
            }
        }
    }
}

#[async_trait]
impl CompletionBackend for GroqClient {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<ChatCompletion, CompletionError> {
        let mut request = request;
        request.stream = false;

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::response_error(response, &request.model).await);
        }
        Ok(response.json::<ChatCompletion>().await?)
    }

    async fn complete_stream(
        &self,
        request: CompletionRequest,
    ) -> Result<ChunkStream, CompletionError> {
        let mut request = request;
        request.stream = true;

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        // The attempt counts as accepted only here; body chunks can still
        // fail individually and surface as stream items.
        if !response.status().is_success() {
            return Err(Self::response_error(response, &request.model).await);
        }

        let stream = response
            .bytes_stream()
            .map(|item| item.map_err(CompletionError::from))
            .scan(String::new(), |buffer, item| {
                let chunks = match item {
                    Ok(bytes) => {
                        buffer.push_str(&String::from_utf8_lossy(&bytes));
                        drain_sse_lines(buffer)
                    }
                    Err(err) => vec![Err(err)],
                };
                std::future::ready(Some(chunks))
            })
            .map(futures_util::stream::iter)
            .flatten();

        Ok(Box::pin(stream))
    }

    async fn list_models(&self) -> Result<Vec<String>, CompletionError> {
        #[derive(Deserialize)]
        struct ModelEntry {
            id: String,
        }
        #[derive(Deserialize)]
        struct ModelList {
            #[serde(default)]
            data: Vec<ModelEntry>,
        }

        let response = self
            .http
            .get(format!("{}/models", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::response_error(response, "").await);
        }

        let list = response.json::<ModelList>().await?;
        Ok(list.data.into_iter().map(|entry| entry.id).collect())
    }
}

/// Extracts complete `data:` lines from the buffer, parsing each into a
/// [`StreamChunk`]. Partial trailing lines stay buffered for the next call.
fn drain_sse_lines(buffer: &mut String) -> Vec<Result<StreamChunk, CompletionError>> {
    let mut out = Vec::new();
    while let Some(pos) = buffer.find('\n') {
        let line: String = buffer.drain(..=pos).collect();
        let line = line.trim();
        let Some(data) = line.strip_prefix("data:") else {
            continue;
        };
        let data = data.trim();
        if data.is_empty() || data == "[DONE]" {
            continue;
        }
        match serde_json::from_str::<StreamChunk>(data) {
            Ok(chunk) => out.push(Ok(chunk)),
            Err(err) => tracing::debug!(%err, "skipping unparseable stream chunk"),
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn delta_skips_empty_content() {
        let chunk: StreamChunk =
            serde_json::from_str(r#"{"choices":[{"delta":{"content":""}}]}"#).unwrap_or_else(|_| {
                panic!("chunk should parse");
            });
        assert_eq!(chunk.delta(), None);

        let chunk: StreamChunk = serde_json::from_str(r#"{"choices":[{"delta":{"role":"assistant"}}]}"#)
            .unwrap_or_else(|_| panic!("chunk should parse"));
        assert_eq!(chunk.delta(), None);

        let chunk: StreamChunk = serde_json::from_str(r#"{"choices":[{"delta":{"content":"Hi"}}]}"#)
            .unwrap_or_else(|_| panic!("chunk should parse"));
        assert_eq!(chunk.delta(), Some("Hi"));
    }

    #[test]
    fn not_found_signatures_are_recognized() {
        let by_variant = CompletionError::ModelNotFound {
            model: "x".to_string(),
            message: String::new(),
        };
        assert!(by_variant.is_model_not_found());

        let by_status = CompletionError::Api {
            status: 404,
            code: None,
            message: "nope".to_string(),
        };
        assert!(by_status.is_model_not_found());

        let by_code = CompletionError::Api {
            status: 400,
            code: Some("model_not_found".to_string()),
            message: "nope".to_string(),
        };
        assert!(by_code.is_model_not_found());

        let by_message = CompletionError::Api {
            status: 400,
            code: None,
            message: "The Model Not Found on this account".to_string(),
        };
        assert!(by_message.is_model_not_found());

        let unrelated = CompletionError::Api {
            status: 401,
            code: Some("invalid_api_key".to_string()),
            message: "bad key".to_string(),
        };
        assert!(!unrelated.is_model_not_found());
    }

    #[test]
    fn sse_lines_split_across_chunks() {
        let mut buffer = String::new();
        buffer.push_str("data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\ndata: {\"choi");
        let first = drain_sse_lines(&mut buffer);
        assert_eq!(first.len(), 1);

        buffer.push_str("ces\":[{\"delta\":{\"content\":\"lo\"}}]}\n\ndata: [DONE]\n\n");
        let rest = drain_sse_lines(&mut buffer);
        assert_eq!(rest.len(), 1);

        let Some(Ok(chunk)) = rest.into_iter().next() else {
            panic!("expected parsed chunk");
        };
        assert_eq!(chunk.delta(), Some("lo"));
        assert!(buffer.is_empty());
    }

    #[test]
    fn stream_flag_omitted_when_false() {
        let request = CompletionRequest {
            model: "m".to_string(),
            messages: vec![ChatMessage::user("hi")],
            temperature: 0.7,
            max_tokens: 100,
            stream: false,
        };
        let json = serde_json::to_string(&request).unwrap_or_default();
        assert!(!json.contains("stream"));

        let request = CompletionRequest {
            stream: true,
            ..request
        };
        let json = serde_json::to_string(&request).unwrap_or_default();
        assert!(json.contains("\"stream\":true"));
    }
}
