//! Restaurant assistant built on the fallback completion client.
//!
//! Owns the prompts and context formatting for the three AI features:
//! dish recommendations, the streaming concierge chat, and feedback
//! sentiment analysis. When no API key or model is configured the service
//! degrades instead of failing: recommendations come back empty, sentiment
//! comes back neutral, and only the chat endpoint reports an error.

use std::fmt;

use crate::domain::models::{Dietary, MenuItem, Sentiment};

use super::client::{ChatMessage, ChunkStream, CompletionBackend, CompletionError, CompletionRequest};
use super::fallback::FallbackClient;

/// Sentiment classification result for a feedback comment.
#[derive(Debug, Clone, Copy)]
pub struct SentimentScore {
    /// Classified sentiment.
    pub sentiment: Sentiment,
    /// Score in `[-1.0, 1.0]`.
    pub score: f64,
}

impl SentimentScore {
    /// The fallback result when analysis is unavailable or fails.
    #[must_use]
    pub const fn neutral() -> Self {
        Self {
            sentiment: Sentiment::Neutral,
            score: 0.0,
        }
    }
}

/// AI assistant for recommendations, chat, and sentiment analysis.
pub struct AssistantService<B> {
    client: Option<FallbackClient<B>>,
    model: Option<String>,
}

impl<B> fmt::Debug for AssistantService<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssistantService")
            .field("configured", &self.client.is_some())
            .field("model", &self.model)
            .finish()
    }
}

impl<B: CompletionBackend> AssistantService<B> {
    /// Creates the assistant. Passing `None` for either argument disables
    /// AI features rather than failing startup.
    #[must_use]
    pub fn new(backend: Option<B>, model: Option<String>) -> Self {
        if backend.is_none() {
            tracing::warn!("completion api key is not set, AI features are disabled");
        } else if model.is_none() {
            tracing::warn!("completion model is not set, AI features are disabled");
        }
        Self {
            client: backend.map(FallbackClient::new),
            model,
        }
    }

    /// Returns `true` when both an API key and a model are configured.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.client.is_some() && self.model.is_some()
    }

    fn configured(&self) -> Option<(&FallbackClient<B>, &str)> {
        match (&self.client, self.model.as_deref()) {
            (Some(client), Some(model)) => Some((client, model)),
            _ => None,
        }
    }

    /// Recommends up to five dish names for a customer.
    ///
    /// Never fails: configuration gaps and upstream errors both yield an
    /// empty list, and the caller pads with popular dishes.
    pub async fn recommend(&self, history: &[String], menu: &[MenuItem]) -> Vec<String> {
        let Some((client, model)) = self.configured() else {
            return Vec::new();
        };

        let history_text = if history.is_empty() {
            "No order history available.".to_string()
        } else {
            format!("User's past orders: {}", history.join(", "))
        };
        let menu_text: Vec<String> = menu.iter().map(menu_line).collect();

        let prompt = format!(
            "You are a restaurant recommendation assistant. Based on the user's order history \
             and current menu, recommend 5 dishes that the user would likely enjoy.\n\n\
             {history_text}\n\nCurrent menu items:\n{}\n\n\
             Provide exactly 5 recommendations as a JSON array of dish names only, no \
             explanations. Format: [\"Dish 1\", \"Dish 2\", \"Dish 3\", \"Dish 4\", \"Dish 5\"]",
            menu_text.join("\n")
        );

        let request = CompletionRequest {
            model: model.to_string(),
            messages: vec![
                ChatMessage::system(
                    "You are a helpful restaurant recommendation assistant. Always respond with \
                     valid JSON arrays only.",
                ),
                ChatMessage::user(prompt),
            ],
            temperature: 0.7,
            max_tokens: 200,
            stream: false,
        };

        match client.complete(&request).await {
            Ok(completion) => parse_recommendations(completion.content()),
            Err(err) => {
                tracing::error!(%err, "recommendation completion failed");
                Vec::new()
            }
        }
    }

    /// Opens a streaming concierge chat completion.
    ///
    /// # Errors
    ///
    /// Returns [`CompletionError::NotConfigured`] when AI is disabled, or
    /// the fallback client's terminal error otherwise.
    pub async fn chat_stream(
        &self,
        message: &str,
        menu: &[MenuItem],
        reservations_today: usize,
    ) -> Result<ChunkStream, CompletionError> {
        let Some((client, model)) = self.configured() else {
            return Err(CompletionError::NotConfigured);
        };

        let menu_text: Vec<String> = menu.iter().map(menu_line).collect();
        let system_prompt = format!(
            "You are a helpful restaurant assistant chatbot. You have access to the current \
             menu and can help with:\n\
             - Menu items, prices, ingredients, dietary information\n\
             - Recommendations based on preferences (vegan, vegetarian, gluten-free, spicy, etc.)\n\
             - Reservation information\n\
             - General restaurant questions\n\n\
             Current menu:\n{}\n\n\
             Today's reservations: {reservations_today} reservations scheduled.\n\n\
             Be friendly, concise, and helpful. If asked about something not on the menu, \
             politely say so.",
            menu_text.join("\n")
        );

        let request = CompletionRequest {
            model: model.to_string(),
            messages: vec![
                ChatMessage::system(system_prompt),
                ChatMessage::user(message),
            ],
            temperature: 0.7,
            max_tokens: 500,
            stream: true,
        };

        client.complete_stream(&request).await
    }

    /// Classifies the sentiment of a feedback comment.
    ///
    /// Never fails: any configuration gap, upstream error, or unparseable
    /// answer yields [`SentimentScore::neutral`] so feedback submission is
    /// never blocked by the AI layer.
    pub async fn analyze_sentiment(&self, comment: &str) -> SentimentScore {
        let Some((client, model)) = self.configured() else {
            return SentimentScore::neutral();
        };

        let prompt = format!(
            "Analyze the sentiment of this restaurant feedback comment. Respond with ONLY a \
             JSON object: {{\"sentiment\": \"positive\" | \"negative\" | \"neutral\", \
             \"score\": number between -1 and 1}}\n\nComment: \"{comment}\""
        );

        let request = CompletionRequest {
            model: model.to_string(),
            messages: vec![
                ChatMessage::system(
                    "You are a sentiment analysis assistant. Always respond with valid JSON only.",
                ),
                ChatMessage::user(prompt),
            ],
            temperature: 0.3,
            max_tokens: 50,
            stream: false,
        };

        match client.complete(&request).await {
            Ok(completion) => parse_sentiment(completion.content()),
            Err(err) => {
                tracing::error!(%err, "sentiment analysis failed");
                SentimentScore::neutral()
            }
        }
    }
}

/// Formats one menu item as a single prompt-context line.
fn menu_line(item: &MenuItem) -> String {
    format!(
        "{} - ${} - {} - Available: {} - Category: {} - Dietary: {} - Ingredients: {}",
        item.name,
        item.price,
        item.description,
        if item.available { "Yes" } else { "No" },
        item.category.as_str(),
        dietary_tags(&item.dietary),
        item.ingredients.join(", ")
    )
}

/// Formats dietary flags as space-separated tags.
fn dietary_tags(dietary: &Dietary) -> String {
    let mut tags = Vec::with_capacity(4);
    if dietary.vegan {
        tags.push("Vegan");
    }
    if dietary.vegetarian {
        tags.push("Vegetarian");
    }
    if dietary.gluten_free {
        tags.push("Gluten-free");
    }
    if dietary.spicy {
        tags.push("Spicy");
    }
    tags.join(" ")
}

/// Parses a recommendation answer: a JSON array of names when the model
/// behaved, otherwise every double-quoted fragment of the answer.
fn parse_recommendations(content: &str) -> Vec<String> {
    if let Ok(names) = serde_json::from_str::<Vec<String>>(content) {
        return names.into_iter().take(5).collect();
    }
    content
        .split('"')
        .skip(1)
        .step_by(2)
        .map(str::to_string)
        .take(5)
        .collect()
}

/// Parses a sentiment answer, defaulting to neutral on any mismatch.
fn parse_sentiment(content: &str) -> SentimentScore {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(content) else {
        return SentimentScore::neutral();
    };
    let sentiment = value
        .get("sentiment")
        .and_then(serde_json::Value::as_str)
        .and_then(Sentiment::parse)
        .unwrap_or(Sentiment::Neutral);
    let score = value
        .get("score")
        .and_then(serde_json::Value::as_f64)
        .unwrap_or(0.0)
        .clamp(-1.0, 1.0);
    SentimentScore { sentiment, score }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::ai::client::GroqClient;
    use crate::domain::models::MenuCategory;
    use chrono::Utc;
    use uuid::Uuid;

    fn disabled() -> AssistantService<GroqClient> {
        AssistantService::new(None, None)
    }

    fn make_item(name: &str) -> MenuItem {
        MenuItem {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: "A dish".to_string(),
            price: 11.0,
            category: MenuCategory::MainCourse,
            image_url: String::new(),
            image_id: String::new(),
            dietary: Dietary {
                vegetarian: true,
                ..Dietary::default()
            },
            ingredients: vec!["rice".to_string()],
            available: true,
            popularity: 3,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn parses_clean_json_array() {
        let names = parse_recommendations(r#"["Pad Thai", "Tom Yum", "Green Curry"]"#);
        assert_eq!(names, vec!["Pad Thai", "Tom Yum", "Green Curry"]);
    }

    #[test]
    fn extracts_quoted_names_from_noisy_answer() {
        let names =
            parse_recommendations("Sure! I recommend \"Pad Thai\" and \"Tom Yum\" today.");
        assert_eq!(names, vec!["Pad Thai", "Tom Yum"]);
    }

    #[test]
    fn caps_recommendations_at_five() {
        let names = parse_recommendations(r#"["a","b","c","d","e","f","g"]"#);
        assert_eq!(names.len(), 5);
    }

    #[test]
    fn unusable_answer_yields_nothing() {
        assert!(parse_recommendations("no quotes here").is_empty());
    }

    #[test]
    fn sentiment_parses_and_clamps() {
        let score = parse_sentiment(r#"{"sentiment":"positive","score":0.8}"#);
        assert_eq!(score.sentiment, Sentiment::Positive);
        assert!((score.score - 0.8).abs() < f64::EPSILON);

        let clamped = parse_sentiment(r#"{"sentiment":"negative","score":-4.2}"#);
        assert_eq!(clamped.sentiment, Sentiment::Negative);
        assert!((clamped.score - -1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn garbage_sentiment_defaults_to_neutral() {
        let score = parse_sentiment("the model rambled instead");
        assert_eq!(score.sentiment, Sentiment::Neutral);
        assert!(score.score.abs() < f64::EPSILON);

        let unknown = parse_sentiment(r#"{"sentiment":"ecstatic","score":1.0}"#);
        assert_eq!(unknown.sentiment, Sentiment::Neutral);
    }

    #[test]
    fn menu_line_includes_dietary_tags() {
        let line = menu_line(&make_item("Pad Thai"));
        assert!(line.contains("Pad Thai"));
        assert!(line.contains("Vegetarian"));
        assert!(line.contains("Available: Yes"));
        assert!(line.contains("main-course"));
    }

    #[tokio::test]
    async fn disabled_assistant_degrades_quietly() {
        let assistant = disabled();
        assert!(!assistant.is_enabled());

        let recs = assistant.recommend(&[], &[make_item("Pad Thai")]).await;
        assert!(recs.is_empty());

        let sentiment = assistant.analyze_sentiment("loved it").await;
        assert_eq!(sentiment.sentiment, Sentiment::Neutral);

        let chat = assistant.chat_stream("hi", &[], 0).await;
        assert!(matches!(chat, Err(CompletionError::NotConfigured)));
    }
}
