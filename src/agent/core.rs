//! Assistant core: one question in, one grounded answer out
//!
//! This module ties the three moving parts of an interaction together:
//! - records the user turn in the conversation
//! - composes the retrieval-augmented request from the full history
//! - calls the completion provider and records its answer

use crate::error::Result;
use crate::providers::{Message, Provider};
use crate::rag::Composer;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::Conversation;

/// Fixed instruction that frames every conversation
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a travel assistant that provides information on travel service available from Margie's Travel Agency.";

/// A conversation bound to a provider and request settings
///
/// Interactions are strictly sequential: `ask` takes `&mut self`, so a second
/// question cannot start until the first one has returned.
///
/// # Examples
///
/// ```ignore
/// use margie::agent::Assistant;
///
/// # async fn example() -> margie::error::Result<()> {
/// # let (provider, composer) = unimplemented!();
/// let mut assistant = Assistant::new(provider, composer, "You are a travel assistant.");
/// let answer = assistant.ask("What hotels are available in Paris?").await?;
/// # Ok(())
/// # }
/// ```
pub struct Assistant {
    provider: Arc<dyn Provider>,
    composer: Arc<Composer>,
    conversation: Conversation,
}

impl Assistant {
    /// Creates an assistant whose history holds only the system prompt
    ///
    /// # Arguments
    ///
    /// * `provider` - Completion backend
    /// * `composer` - Request settings shared across sessions
    /// * `system_prompt` - Instruction seeded as the first message
    pub fn new(
        provider: Arc<dyn Provider>,
        composer: Arc<Composer>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            composer,
            conversation: Conversation::initialize(system_prompt),
        }
    }

    /// Asks one question and returns the answer text
    ///
    /// The user turn and the answer are appended only when the whole round
    /// trip succeeds. On failure the pending user turn is removed again and
    /// the provider's error is returned as is.
    ///
    /// # Errors
    ///
    /// Returns `EmptyInput` for a blank question, or whatever the provider
    /// returned.
    pub async fn ask(&mut self, input: &str) -> Result<String> {
        let checkpoint = self.conversation.len();
        self.conversation.append(Message::user(input))?;

        let request = self.composer.compose(self.conversation.snapshot());
        debug!(
            "Composed request for {}: {} messages, {} data sources",
            self.composer.model(),
            request.messages.len(),
            request.data_sources.len()
        );

        let started = Instant::now();
        let response = match self.provider.complete(&request).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Completion via {} failed: {}", self.provider.name(), e);
                self.conversation.rollback_to(checkpoint);
                return Err(e);
            }
        };

        if let Some(usage) = response.usage {
            debug!(
                "Token usage: prompt={}, completion={}, total={}",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }
        info!(
            "Answered turn {} in {:?}",
            self.conversation.completed_turns() + 1,
            started.elapsed()
        );

        self.conversation
            .append(Message::assistant(response.content.clone()))?;
        Ok(response.content)
    }

    /// Read-only view of the conversation
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Request settings in use
    pub fn composer(&self) -> &Composer {
        &self.composer
    }
}
