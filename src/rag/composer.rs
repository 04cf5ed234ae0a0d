//! Request composition
//!
//! Turns a conversation snapshot into the exact payload sent to the hosted
//! chat-completion service. Composition is pure: the same snapshot and
//! settings always produce the same request.

use crate::providers::{ChatCompletionRequest, Message};
use crate::rag::RetrievalConfig;

/// Builds a chat-completion request from the full history
///
/// Every prior turn is resent on each call; there is no windowing.
///
/// # Examples
///
/// ```
/// use margie::providers::Message;
/// use margie::rag::{compose, QueryType, RetrievalConfig};
///
/// let retrieval = RetrievalConfig {
///     endpoint: "https://search.example.net".to_string(),
///     index_name: "margies-travel".to_string(),
///     api_key: "secret".to_string(),
///     query_type: QueryType::Vector,
///     embedding_deployment: "text-embedding-ada-002".to_string(),
/// };
/// let history = vec![Message::system("You are a travel assistant."), Message::user("Hi")];
/// let request = compose(&history, "gpt-4o", &retrieval);
/// assert_eq!(request.messages.len(), 2);
/// assert_eq!(request.data_sources.len(), 1);
/// ```
pub fn compose(
    snapshot: &[Message],
    model: &str,
    retrieval: &RetrievalConfig,
) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: model.to_string(),
        messages: snapshot.to_vec(),
        data_sources: vec![retrieval.to_data_source()],
    }
}

/// Immutable request settings shared by every interaction
///
/// Constructed once at startup from [`crate::config::Config`] and shared by
/// every [`crate::agent::Assistant`] in the process.
#[derive(Debug, Clone)]
pub struct Composer {
    model: String,
    retrieval: RetrievalConfig,
}

impl Composer {
    /// Creates a composer for the given chat deployment and search settings
    pub fn new(model: impl Into<String>, retrieval: RetrievalConfig) -> Self {
        Self {
            model: model.into(),
            retrieval,
        }
    }

    /// Chat deployment the composer targets
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Search settings attached to every request
    pub fn retrieval(&self) -> &RetrievalConfig {
        &self.retrieval
    }

    /// Builds the request for the given history
    pub fn compose(&self, snapshot: &[Message]) -> ChatCompletionRequest {
        compose(snapshot, &self.model, &self.retrieval)
    }
}
