//! Base provider trait and common types for Margie
//!
//! This module defines the Provider trait that the completion backend must
//! implement, along with the role-tagged message type and the request and
//! response structures exchanged with the hosted chat-completion service.

use crate::error::Result;
use crate::rag::DataSource;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Author of a message in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Fixed instruction that frames the assistant
    System,
    /// Text typed by the person using the assistant
    User,
    /// Text generated by the hosted model
    Assistant,
}

impl Role {
    /// Wire name of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message structure for conversation
///
/// Represents one turn in the conversation with the hosted model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender (system, user, assistant)
    pub role: Role,
    /// Content of the message
    pub content: String,
}

impl Message {
    /// Creates a new user message
    ///
    /// # Examples
    ///
    /// ```
    /// use margie::providers::{Message, Role};
    ///
    /// let msg = Message::user("What hotels are available in Paris?");
    /// assert_eq!(msg.role, Role::User);
    /// ```
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Creates a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    /// Creates a new system message
    ///
    /// # Examples
    ///
    /// ```
    /// use margie::providers::{Message, Role};
    ///
    /// let msg = Message::system("You are a travel assistant");
    /// assert_eq!(msg.role, Role::System);
    /// ```
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

/// Body of one chat-completion call
///
/// Built by [`crate::rag::compose`]; the provider serializes it verbatim.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatCompletionRequest {
    /// Chat deployment the request targets
    pub model: String,
    /// Full conversation history, oldest first
    pub messages: Vec<Message>,
    /// Retrieval sources the service consults before answering
    pub data_sources: Vec<DataSource>,
}

/// Token usage information from a completion
///
/// Tracks the number of tokens used in prompts and completions,
/// as reported by the hosted service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Number of tokens in the prompt
    pub prompt_tokens: usize,
    /// Number of tokens in the completion
    pub completion_tokens: usize,
    /// Total tokens used (prompt + completion)
    pub total_tokens: usize,
}

impl TokenUsage {
    /// Create a new TokenUsage instance
    ///
    /// # Examples
    ///
    /// ```
    /// use margie::providers::TokenUsage;
    ///
    /// let usage = TokenUsage::new(100, 50);
    /// assert_eq!(usage.total_tokens, 150);
    /// ```
    pub fn new(prompt_tokens: usize, completion_tokens: usize) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// Completion response with answer text and optional token usage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionResponse {
    /// Text content of the first choice
    pub content: String,
    /// Optional token usage information
    pub usage: Option<TokenUsage>,
}

impl CompletionResponse {
    /// Create a new CompletionResponse without usage data
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            usage: None,
        }
    }

    /// Create a new CompletionResponse with token usage
    pub fn with_usage(content: impl Into<String>, usage: TokenUsage) -> Self {
        Self {
            content: content.into(),
            usage: Some(usage),
        }
    }
}

/// Provider trait for the hosted chat-completion service
///
/// Each call is an independent request/response exchange. Implementations
/// must not retry and must return failures unchanged.
///
/// # Examples
///
/// ```no_run
/// use margie::providers::{ChatCompletionRequest, CompletionResponse, Provider};
/// use margie::error::Result;
/// use async_trait::async_trait;
///
/// struct Canned;
///
/// #[async_trait]
/// impl Provider for Canned {
///     async fn complete(&self, _request: &ChatCompletionRequest) -> Result<CompletionResponse> {
///         Ok(CompletionResponse::new("Hello"))
///     }
/// }
/// ```
#[async_trait]
pub trait Provider: Send + Sync {
    /// Sends one composed request and returns the first choice's text
    ///
    /// # Errors
    ///
    /// Returns error if the API call fails or the response carries no answer
    async fn complete(&self, request: &ChatCompletionRequest) -> Result<CompletionResponse>;

    /// Short name used in log lines
    fn name(&self) -> &str {
        "provider"
    }
}
