//! AI endpoints: dish recommendations and the streaming concierge chat.
//!
//! The chat endpoint relays a token stream from the completion API to the
//! client as a server-sent event stream: one `data: {"content": ...}` frame
//! per text delta, terminated by a literal `data: [DONE]` frame. A failure
//! before the first frame surfaces as a structured JSON error; a failure
//! mid-stream appends an apology delta and the sentinel so the client can
//! tell a degraded turn from a clean completion.

use std::collections::VecDeque;
use std::convert::Infallible;

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use futures_util::{Stream, StreamExt};

use crate::ai::ChunkStream;
use crate::api::auth::OptionalUser;
use crate::api::dto::ChatRequest;
use crate::app_state::AppState;
use crate::domain::models::MenuItem;
use crate::error::{ErrorResponse, GatewayError};
use crate::persistence::MenuFilter;

const DONE_SENTINEL: &str = "[DONE]";
const APOLOGY: &str =
    "\n\nSorry, I encountered an error. Please check if the AI service is configured correctly.";

/// `GET /ai/recommendations` — Personalized dish recommendations.
///
/// Uses the caller's order history when an identity is present. Any AI
/// failure degrades to popular dishes instead of erroring.
#[utoipa::path(
    get,
    path = "/api/v1/ai/recommendations",
    tag = "AI",
    summary = "Recommend dishes",
    responses(
        (status = 200, description = "Up to five recommended dishes", body = serde_json::Value),
    )
)]
pub async fn recommendations(
    State(state): State<AppState>,
    user: OptionalUser,
) -> Result<impl IntoResponse, GatewayError> {
    let history = match user.0 {
        Some(user) => state
            .store
            .recent_order_item_names(user.user_id, 10)
            .await
            .unwrap_or_default(),
        None => Vec::new(),
    };
    let menu = state.store.list_menu_items(&available_only()).await?;
    let names = state.assistant.recommend(&history, &menu).await;

    let mut picks: Vec<MenuItem> = menu
        .iter()
        .filter(|item| names.iter().any(|name| names_match(&item.name, name)))
        .take(5)
        .cloned()
        .collect();

    // Pad with popular dishes when the model returned too few usable names.
    if picks.len() < 5 {
        let popular = state.store.top_menu_items(5).await.unwrap_or_default();
        for item in popular {
            if picks.len() >= 5 {
                break;
            }
            if !picks.iter().any(|p| p.id == item.id) {
                picks.push(item);
            }
        }
    }

    Ok(Json(serde_json::json!({ "success": true, "data": picks })))
}

/// `POST /ai/chat` — Streaming concierge chat.
#[utoipa::path(
    post,
    path = "/api/v1/ai/chat",
    tag = "AI",
    summary = "Chat with the concierge",
    description = "Streams the answer as `text/event-stream`: one `data: {\"content\": ...}` frame per token delta, terminated by `data: [DONE]`.",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Event stream of answer deltas"),
        (status = 400, description = "Missing message", body = ErrorResponse),
        (status = 502, description = "Completion API unavailable", body = ErrorResponse),
    )
)]
pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let message = req.message.trim();
    if message.is_empty() {
        return Err(GatewayError::InvalidRequest(
            "message is required".to_string(),
        ));
    }

    let menu = state.store.list_menu_items(&available_only()).await?;
    let today = Utc::now().date_naive();
    let reservations_today = state.store.count_reservations_on(today).await?;

    // Failures up to here (including every rejected model candidate) come
    // back as a structured JSON error; once the stream is accepted the
    // status is committed.
    let upstream = state
        .assistant
        .chat_stream(
            message,
            &menu,
            usize::try_from(reservations_today).unwrap_or(0),
        )
        .await?;

    let events =
        relay_frames(upstream).map(|data| Ok::<_, Infallible>(Event::default().data(data)));
    Ok((
        [(header::CACHE_CONTROL, "no-cache")],
        Sse::new(events).keep_alive(KeepAlive::default()),
    ))
}

fn available_only() -> MenuFilter {
    MenuFilter {
        available: Some(true),
        ..MenuFilter::default()
    }
}

/// Case-insensitive fuzzy match between a menu item name and a
/// model-recommended name.
fn names_match(menu_name: &str, recommended: &str) -> bool {
    let menu_name = menu_name.to_lowercase();
    let recommended = recommended.trim().to_lowercase();
    !recommended.is_empty()
        && (menu_name.contains(recommended.as_str()) || recommended.contains(menu_name.as_str()))
}

struct RelayState {
    upstream: ChunkStream,
    pending: VecDeque<String>,
    finished: bool,
}

/// Turns a completion chunk stream into SSE frame payloads.
///
/// Chunks without a text delta are skipped. Upstream exhaustion yields the
/// `[DONE]` sentinel; an upstream error yields a best-effort apology delta
/// followed by the sentinel.
fn relay_frames(upstream: ChunkStream) -> impl Stream<Item = String> {
    let state = RelayState {
        upstream,
        pending: VecDeque::new(),
        finished: false,
    };
    futures_util::stream::unfold(state, |mut state| async move {
        if let Some(frame) = state.pending.pop_front() {
            return Some((frame, state));
        }
        if state.finished {
            return None;
        }
        loop {
            match state.upstream.next().await {
                Some(Ok(chunk)) => {
                    if let Some(text) = chunk.delta() {
                        let frame = serde_json::json!({ "content": text }).to_string();
                        return Some((frame, state));
                    }
                }
                Some(Err(err)) => {
                    tracing::error!(%err, "chat stream failed mid-flight");
                    state.finished = true;
                    state.pending.push_back(DONE_SENTINEL.to_string());
                    let apology = serde_json::json!({ "content": APOLOGY }).to_string();
                    return Some((apology, state));
                }
                None => {
                    state.finished = true;
                    return Some((DONE_SENTINEL.to_string(), state));
                }
            }
        }
    })
}

/// AI routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ai/recommendations", get(recommendations))
        .route("/ai/chat", post(chat))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::ai::client::{ChunkChoice, ChunkDelta, CompletionError, StreamChunk};
    use futures_util::stream;

    fn chunk(text: &str) -> StreamChunk {
        StreamChunk {
            choices: vec![ChunkChoice {
                delta: ChunkDelta {
                    content: Some(text.to_string()),
                },
            }],
        }
    }

    fn empty_chunk() -> StreamChunk {
        StreamChunk {
            choices: vec![ChunkChoice {
                delta: ChunkDelta { content: None },
            }],
        }
    }

    #[tokio::test]
    async fn relay_emits_one_frame_per_delta_then_done() {
        let upstream: ChunkStream =
            Box::pin(stream::iter(vec![Ok(chunk("Hel")), Ok(chunk("lo"))]));
        let frames: Vec<String> = relay_frames(upstream).collect().await;
        assert_eq!(
            frames,
            vec![
                r#"{"content":"Hel"}"#.to_string(),
                r#"{"content":"lo"}"#.to_string(),
                DONE_SENTINEL.to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn relay_skips_deltaless_chunks() {
        let upstream: ChunkStream = Box::pin(stream::iter(vec![
            Ok(empty_chunk()),
            Ok(chunk("Hi")),
            Ok(empty_chunk()),
        ]));
        let frames: Vec<String> = relay_frames(upstream).collect().await;
        assert_eq!(
            frames,
            vec![r#"{"content":"Hi"}"#.to_string(), DONE_SENTINEL.to_string()]
        );
    }

    #[tokio::test]
    async fn relay_appends_apology_and_sentinel_on_mid_stream_failure() {
        let upstream: ChunkStream = Box::pin(stream::iter(vec![
            Ok(chunk("partial")),
            Err(CompletionError::Api {
                status: 500,
                code: None,
                message: "upstream died".to_string(),
            }),
        ]));
        let frames: Vec<String> = relay_frames(upstream).collect().await;
        assert_eq!(frames.len(), 3);
        assert_eq!(frames.first().map(String::as_str), Some(r#"{"content":"partial"}"#));
        assert!(frames.get(1).is_some_and(|f| f.contains("Sorry")));
        assert_eq!(frames.last().map(String::as_str), Some(DONE_SENTINEL));
    }

    #[tokio::test]
    async fn relay_on_empty_stream_emits_only_done() {
        let chunks: Vec<Result<StreamChunk, CompletionError>> = Vec::new();
        let upstream: ChunkStream = Box::pin(stream::iter(chunks));
        let frames: Vec<String> = relay_frames(upstream).collect().await;
        assert_eq!(frames, vec![DONE_SENTINEL.to_string()]);
    }

    #[test]
    fn name_matching_is_case_insensitive_and_bidirectional() {
        assert!(names_match("Pad Thai", "pad thai"));
        assert!(names_match("Pad Thai", "Classic Pad Thai Special"));
        assert!(names_match("Classic Pad Thai", "pad"));
        assert!(!names_match("Pad Thai", "Tom Yum"));
        assert!(!names_match("Pad Thai", "   "));
    }
}
