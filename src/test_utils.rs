//! Test utilities for Margie
//!
//! Provides a recording mock provider and ready-made configuration values so
//! unit tests never touch the network or the process environment.

use crate::config::{Config, OpenAiConfig, SearchConfig};
use crate::error::{MargieError, Result};
use crate::providers::{ChatCompletionRequest, CompletionResponse, Provider};
use crate::rag::{Composer, QueryType, RetrievalConfig};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Provider that replays canned answers and records every request
///
/// When the queue of answers runs dry, or when built with
/// [`MockProvider::failing`], calls return a `Provider` error.
pub struct MockProvider {
    answers: Mutex<VecDeque<String>>,
    failure: Option<String>,
    requests: Mutex<Vec<ChatCompletionRequest>>,
}

impl MockProvider {
    /// Replays `answers` in order, one per call
    pub fn with_answers(answers: Vec<&str>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().map(String::from).collect()),
            failure: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Fails every call with the given message
    pub fn failing(message: &str) -> Self {
        Self {
            answers: Mutex::new(VecDeque::new()),
            failure: Some(message.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<ChatCompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(&self, request: &ChatCompletionRequest) -> Result<CompletionResponse> {
        self.requests.lock().unwrap().push(request.clone());

        if let Some(message) = &self.failure {
            return Err(MargieError::Provider(message.clone()).into());
        }

        match self.answers.lock().unwrap().pop_front() {
            Some(answer) => Ok(CompletionResponse::new(answer)),
            None => Err(MargieError::Provider("no canned answer left".to_string()).into()),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Search settings pointing at a fictitious index
pub fn test_retrieval() -> RetrievalConfig {
    RetrievalConfig {
        endpoint: "https://search.example.net".to_string(),
        index_name: "margies-travel".to_string(),
        api_key: "search-secret".to_string(),
        query_type: QueryType::Vector,
        embedding_deployment: "text-embedding-ada-002".to_string(),
    }
}

/// Composer targeting a fictitious `gpt-4o` deployment
pub fn test_composer() -> Composer {
    Composer::new("gpt-4o", test_retrieval())
}

/// Fully populated configuration that passes validation
pub fn test_config() -> Config {
    Config {
        openai: OpenAiConfig {
            endpoint: "https://openai.example.net".to_string(),
            api_key: "openai-secret".to_string(),
            chat_model: "gpt-4o".to_string(),
            ..OpenAiConfig::default()
        },
        search: SearchConfig {
            endpoint: "https://search.example.net".to_string(),
            api_key: "search-secret".to_string(),
            index_name: "margies-travel".to_string(),
            embedding_model: "text-embedding-ada-002".to_string(),
            ..SearchConfig::default()
        },
        ..Config::default()
    }
}

/// Assert that an error renders a message containing `expected`
///
/// # Panics
///
/// Panics if the result is Ok or if the message does not match
pub fn assert_error_contains<T: std::fmt::Debug>(result: Result<T>, expected: &str) {
    match result {
        Ok(value) => panic!("Expected error containing '{}', got Ok({:?})", expected, value),
        Err(e) => assert!(
            e.to_string().contains(expected),
            "Expected error containing '{}', got '{}'",
            expected,
            e
        ),
    }
}
