//! Provider module for Margie
//!
//! This module contains the completion provider abstraction and the Azure
//! OpenAI implementation.

pub mod azure;
pub mod base;

pub use azure::AzureOpenAiProvider;
pub use base::{ChatCompletionRequest, CompletionResponse, Message, Provider, Role, TokenUsage};

use crate::config::Config;
use crate::error::Result;
use std::sync::Arc;

/// Create the completion provider described by the configuration
///
/// The provider is shared by every conversation in the process, so it is
/// returned behind an `Arc`.
///
/// # Errors
///
/// Returns error if the HTTP client cannot be initialized
pub fn create_provider(config: &Config) -> Result<Arc<dyn Provider>> {
    Ok(Arc::new(AzureOpenAiProvider::new(&config.openai)?))
}
