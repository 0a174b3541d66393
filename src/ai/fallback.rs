//! Model-fallback completion wrapper.
//!
//! [`FallbackClient`] obtains a successful completion despite the configured
//! model name not matching the provider's exact identifier. Candidates from
//! [`model_candidates`] are tried in order with every other request parameter
//! held constant; when all of them fail with a not-found signature, the
//! provider's own model list is fetched and tried the same way.
//!
//! Not-found failures drive control flow and are swallowed; any other
//! failure (auth, rate limit, malformed request) aborts immediately and
//! propagates unchanged. At most one attempt succeeds, and there is no
//! cancellation mid-loop: each attempt is bounded only by the transport
//! timeout.

use std::collections::HashSet;

use super::candidates::model_candidates;
use super::client::{
    ChatCompletion, ChunkStream, CompletionBackend, CompletionError, CompletionRequest,
};

/// Completion client with model-identifier fallback.
#[derive(Debug, Clone)]
pub struct FallbackClient<B> {
    backend: B,
}

impl<B: CompletionBackend> FallbackClient<B> {
    /// Wraps a completion backend.
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Executes a non-streaming completion with model fallback.
    ///
    /// # Errors
    ///
    /// Returns the first non-not-found failure unchanged, or
    /// [`CompletionError::NoCandidateSucceeded`] once every candidate and
    /// every listed model has been rejected.
    pub async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<ChatCompletion, CompletionError> {
        self.try_in_order(request, |req| self.backend.complete(req))
            .await
    }

    /// Opens a streaming completion with model fallback.
    ///
    /// A candidate counts as successful only once the provider accepts the
    /// request; rejected attempts never expose partial streams.
    ///
    /// # Errors
    ///
    /// Same contract as [`FallbackClient::complete`].
    pub async fn complete_stream(
        &self,
        request: &CompletionRequest,
    ) -> Result<ChunkStream, CompletionError> {
        self.try_in_order(request, |req| self.backend.complete_stream(req))
            .await
    }

    /// Runs the candidate loop, then the available-model loop, over `attempt`.
    async fn try_in_order<T, F, Fut>(
        &self,
        request: &CompletionRequest,
        mut attempt: F,
    ) -> Result<T, CompletionError>
    where
        F: FnMut(CompletionRequest) -> Fut,
        Fut: std::future::Future<Output = Result<T, CompletionError>> + Send,
    {
        let candidates = model_candidates(&request.model);
        if candidates.is_empty() {
            tracing::warn!("candidate model id list is empty");
        } else {
            tracing::debug!(?candidates, "candidate model ids");
        }

        let mut tried: HashSet<String> = HashSet::new();
        let mut last_not_found: Option<CompletionError> = None;

        for candidate in candidates {
            if !tried.insert(candidate.clone()) {
                continue;
            }
            match attempt(request.with_model(&candidate)).await {
                Ok(result) => {
                    tracing::info!(model = %candidate, "completion succeeded");
                    return Ok(result);
                }
                Err(err) if err.is_model_not_found() => {
                    tracing::warn!(model = %candidate, "model not found, trying next candidate");
                    last_not_found = Some(err);
                }
                Err(err) => return Err(err),
            }
        }

        // Every generated candidate was rejected (or none were generated):
        // ask the provider what it actually serves and retry over that.
        let available = match self.backend.list_models().await {
            Ok(models) => models,
            Err(err) => {
                tracing::error!(%err, "listing available models failed");
                return Err(Self::exhausted(last_not_found, err));
            }
        };
        tracing::debug!(count = available.len(), "retrying over provider model list");

        for model in available {
            if !tried.insert(model.clone()) {
                continue;
            }
            match attempt(request.with_model(&model)).await {
                Ok(result) => {
                    tracing::info!(%model, "completion succeeded with listed model");
                    return Ok(result);
                }
                Err(err) if err.is_model_not_found() => {
                    tracing::warn!(%model, "listed model not found, trying next");
                    last_not_found = Some(err);
                }
                Err(err) => return Err(err),
            }
        }

        let fallback = CompletionError::Api {
            status: 0,
            code: None,
            message: "no usable model identifiers".to_string(),
        };
        Err(Self::exhausted(last_not_found, fallback))
    }

    /// Wraps the last underlying failure into the terminal error.
    fn exhausted(last_not_found: Option<CompletionError>, latest: CompletionError) -> CompletionError {
        CompletionError::NoCandidateSucceeded {
            source: Box::new(last_not_found.unwrap_or(latest)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::ai::client::{ChatMessage, CompletionChoice, StreamChunk};
    use async_trait::async_trait;
    use futures_util::StreamExt;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    fn ok_completion(text: &str) -> ChatCompletion {
        ChatCompletion {
            choices: vec![CompletionChoice {
                message: ChatMessage {
                    role: "assistant".to_string(),
                    content: text.to_string(),
                },
            }],
        }
    }

    fn not_found(model: &str) -> CompletionError {
        CompletionError::ModelNotFound {
            model: model.to_string(),
            message: "model not found".to_string(),
        }
    }

    fn chunk(text: &str) -> StreamChunk {
        serde_json::from_str(&format!(
            r#"{{"choices":[{{"delta":{{"content":"{text}"}}}}]}}"#
        ))
        .unwrap_or_else(|_| panic!("chunk should parse"))
    }

    /// Scripted backend: `complete` pops results in order, `list_models`
    /// returns a fixed list or fails.
    #[derive(Default)]
    struct MockBackend {
        calls: Mutex<Vec<String>>,
        completions: Mutex<VecDeque<Result<ChatCompletion, CompletionError>>>,
        streams: Mutex<VecDeque<Result<Vec<StreamChunk>, CompletionError>>>,
        models: Option<Vec<String>>,
    }

    impl MockBackend {
        fn record(&self, model: &str) {
            let mut calls = match self.calls.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            calls.push(model.to_string());
        }

        fn calls(&self) -> Vec<String> {
            match self.calls.lock() {
                Ok(guard) => guard.clone(),
                Err(poisoned) => poisoned.into_inner().clone(),
            }
        }

        fn script(mut self, results: Vec<Result<ChatCompletion, CompletionError>>) -> Self {
            self.completions = Mutex::new(results.into());
            self
        }

        fn script_streams(
            mut self,
            results: Vec<Result<Vec<StreamChunk>, CompletionError>>,
        ) -> Self {
            self.streams = Mutex::new(results.into());
            self
        }

        fn with_models(mut self, models: Vec<&str>) -> Self {
            self.models = Some(models.into_iter().map(str::to_string).collect());
            self
        }
    }

    #[async_trait]
    impl CompletionBackend for MockBackend {
        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> Result<ChatCompletion, CompletionError> {
            self.record(&request.model);
            let mut script = match self.completions.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            script.pop_front().unwrap_or_else(|| {
                Err(CompletionError::Api {
                    status: 500,
                    code: None,
                    message: "script exhausted".to_string(),
                })
            })
        }

        async fn complete_stream(
            &self,
            request: CompletionRequest,
        ) -> Result<ChunkStream, CompletionError> {
            self.record(&request.model);
            let mut script = match self.streams.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            let chunks = script.pop_front().unwrap_or_else(|| {
                Err(CompletionError::Api {
                    status: 500,
                    code: None,
                    message: "script exhausted".to_string(),
                })
            })?;
            Ok(Box::pin(futures_util::stream::iter(
                chunks.into_iter().map(Ok),
            )))
        }

        async fn list_models(&self) -> Result<Vec<String>, CompletionError> {
            self.models.clone().ok_or(CompletionError::Api {
                status: 503,
                code: None,
                message: "listing unavailable".to_string(),
            })
        }
    }

    fn make_request(model: &str) -> CompletionRequest {
        CompletionRequest {
            model: model.to_string(),
            messages: vec![ChatMessage::user("hello")],
            temperature: 0.7,
            max_tokens: 100,
            stream: false,
        }
    }

    #[tokio::test]
    async fn stops_at_first_successful_candidate() {
        // "My Model" generates: ["My Model", "my model", "my-model", "mymodel"]
        let backend = MockBackend::default().script(vec![
            Err(not_found("My Model")),
            Err(not_found("my model")),
            Ok(ok_completion("hello from C")),
        ]);
        let client = FallbackClient::new(backend);

        let result = client.complete(&make_request("My Model")).await;
        let Ok(completion) = result else {
            panic!("expected success on third candidate");
        };
        assert_eq!(completion.content(), "hello from C");
        assert_eq!(
            client.backend.calls(),
            vec!["My Model", "my model", "my-model"]
        );
    }

    #[tokio::test]
    async fn non_not_found_error_aborts_immediately() {
        let backend = MockBackend::default().script(vec![Err(CompletionError::Api {
            status: 401,
            code: Some("invalid_api_key".to_string()),
            message: "bad key".to_string(),
        })]);
        let client = FallbackClient::new(backend);

        let result = client.complete(&make_request("My Model")).await;
        let Err(CompletionError::Api { status, .. }) = result else {
            panic!("expected the auth error to propagate unchanged");
        };
        assert_eq!(status, 401);
        assert_eq!(client.backend.calls().len(), 1);
    }

    #[tokio::test]
    async fn falls_back_to_listed_models_and_skips_tried_ids() {
        let backend = MockBackend::default()
            .script(vec![
                Err(not_found("My Model")),
                Err(not_found("my model")),
                Err(not_found("my-model")),
                Err(not_found("mymodel")),
                Ok(ok_completion("listed")),
            ])
            // "my-model" was already tried as a generated candidate.
            .with_models(vec!["my-model", "fresh-model"]);
        let client = FallbackClient::new(backend);

        let result = client.complete(&make_request("My Model")).await;
        let Ok(completion) = result else {
            panic!("expected success via model listing");
        };
        assert_eq!(completion.content(), "listed");

        let calls = client.backend.calls();
        assert_eq!(calls.len(), 5);
        assert_eq!(calls.last().map(String::as_str), Some("fresh-model"));
    }

    #[tokio::test]
    async fn listing_failure_wraps_last_not_found() {
        let backend = MockBackend::default().script(vec![
            Err(not_found("My Model")),
            Err(not_found("my model")),
            Err(not_found("my-model")),
            Err(not_found("mymodel")),
        ]);
        let client = FallbackClient::new(backend);

        let result = client.complete(&make_request("My Model")).await;
        let Err(CompletionError::NoCandidateSucceeded { source }) = result else {
            panic!("expected exhaustion error");
        };
        assert!(source.is_model_not_found());
    }

    #[tokio::test]
    async fn exhausting_listed_models_fails_terminally() {
        let backend = MockBackend::default()
            .script(vec![
                Err(not_found("My Model")),
                Err(not_found("my model")),
                Err(not_found("my-model")),
                Err(not_found("mymodel")),
                Err(not_found("other")),
            ])
            .with_models(vec!["other"]);
        let client = FallbackClient::new(backend);

        let result = client.complete(&make_request("My Model")).await;
        assert!(matches!(
            result,
            Err(CompletionError::NoCandidateSucceeded { .. })
        ));
        assert_eq!(client.backend.calls().len(), 5);
    }

    #[tokio::test]
    async fn streaming_falls_back_like_non_streaming() {
        let backend = MockBackend::default().script_streams(vec![
            Err(not_found("My Model")),
            Ok(vec![chunk("Hel"), chunk("lo")]),
        ]);
        let client = FallbackClient::new(backend);

        let result = client.complete_stream(&make_request("My Model")).await;
        let Ok(stream) = result else {
            panic!("expected stream from second candidate");
        };

        let deltas: Vec<String> = stream
            .filter_map(|item| async move {
                item.ok().and_then(|c| c.delta().map(str::to_string))
            })
            .collect()
            .await;
        assert_eq!(deltas, vec!["Hel".to_string(), "lo".to_string()]);
        assert_eq!(client.backend.calls(), vec!["My Model", "my model"]);
    }
}
