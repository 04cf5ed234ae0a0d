//! Conversation history
//!
//! Holds the ordered, role-tagged message list sent to the model on every
//! turn. The first message is always the single system instruction; it is
//! fixed at creation and can never be replaced, duplicated or removed.
//!
//! History grows without bound. Every interaction resends all prior turns, so
//! very long sessions will eventually exceed the model's context window; no
//! pruning or summarization is attempted.

use crate::error::{MargieError, Result};
use crate::providers::{Message, Role};

/// Ordered message history seeded with one system message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Creates a conversation holding only the system instruction
    ///
    /// # Arguments
    ///
    /// * `system_prompt` - Instruction that frames every answer
    ///
    /// # Examples
    ///
    /// ```
    /// use margie::agent::Conversation;
    ///
    /// let conversation = Conversation::initialize("You are a travel assistant.");
    /// assert_eq!(conversation.len(), 1);
    /// ```
    pub fn initialize(system_prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(system_prompt)],
        }
    }

    /// Appends a user or assistant message to the end of the history
    ///
    /// # Errors
    ///
    /// Returns `InvalidMessage` for a second system message and `EmptyInput`
    /// for a user message with no visible content. The history is left
    /// untouched in both cases.
    ///
    /// # Examples
    ///
    /// ```
    /// use margie::agent::Conversation;
    /// use margie::providers::Message;
    ///
    /// let mut conversation = Conversation::initialize("You are a travel assistant.");
    /// conversation.append(Message::user("Hello")).unwrap();
    /// assert_eq!(conversation.len(), 2);
    /// assert!(conversation.append(Message::system("Override")).is_err());
    /// ```
    pub fn append(&mut self, message: Message) -> Result<()> {
        match message.role {
            Role::System => {
                return Err(MargieError::InvalidMessage(
                    "the system message is fixed at session start".to_string(),
                )
                .into());
            }
            Role::User if message.content.trim().is_empty() => {
                return Err(MargieError::EmptyInput.into());
            }
            Role::User | Role::Assistant => {}
        }

        self.messages.push(message);
        Ok(())
    }

    /// Returns the full ordered history
    pub fn snapshot(&self) -> &[Message] {
        &self.messages
    }

    /// The fixed system instruction
    pub fn system_message(&self) -> &Message {
        &self.messages[0]
    }

    /// Most recent message
    pub fn last(&self) -> &Message {
        // initialize() guarantees at least the system message
        &self.messages[self.messages.len() - 1]
    }

    /// Number of messages including the system message
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Always false; a conversation holds at least its system message
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Number of user turns that received an answer
    pub fn completed_turns(&self) -> usize {
        (self.messages.len() - 1) / 2
    }

    /// Drops everything after `len` messages, never the system message
    pub(crate) fn rollback_to(&mut self, len: usize) {
        self.messages.truncate(len.max(1));
    }
}
