//! AI subsystem: completion client, model fallback, and assistant prompts.
//!
//! The gateway proxies three AI features to an external Groq /
//! OpenAI-compatible completion API: dish recommendations, a streaming
//! concierge chat, and feedback sentiment analysis. Because configured model
//! names rarely match the provider's exact identifiers, every call goes
//! through [`FallbackClient`], which walks candidate spellings and finally
//! the provider's own model list.

pub mod assistant;
pub mod candidates;
pub mod client;
pub mod fallback;

pub use assistant::{AssistantService, SentimentScore};
pub use candidates::model_candidates;
pub use client::{
    ChatCompletion, ChatMessage, ChunkStream, CompletionBackend, CompletionError,
    CompletionRequest, GroqClient, StreamChunk,
};
pub use fallback::FallbackClient;

/// The assistant as wired in production: fallback over the HTTP backend.
pub type Assistant = AssistantService<GroqClient>;
