//! Azure OpenAI provider implementation
//!
//! Talks to the hosted chat-completions endpoint of an Azure OpenAI resource.
//! Retrieval happens server side: the request carries an `azure_search` data
//! source and the service grounds its answer in that index before replying.

use crate::config::OpenAiConfig;
use crate::error::{MargieError, Result};
use crate::providers::{ChatCompletionRequest, CompletionResponse, Provider, TokenUsage};
use async_trait::async_trait;
use reqwest::{header::RETRY_AFTER, Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

/// Azure OpenAI chat-completions client
///
/// One instance is shared by every conversation in the process. Requests are
/// sent once; failures are reported to the caller and never retried.
///
/// # Examples
///
/// ```
/// use margie::config::OpenAiConfig;
/// use margie::providers::AzureOpenAiProvider;
///
/// let config = OpenAiConfig {
///     endpoint: "https://my-resource.openai.azure.com".to_string(),
///     api_key: "secret".to_string(),
///     chat_model: "gpt-4o".to_string(),
///     ..OpenAiConfig::default()
/// };
/// let provider = AzureOpenAiProvider::new(&config).unwrap();
/// assert_eq!(provider.api_version(), "2024-12-01-preview");
/// ```
pub struct AzureOpenAiProvider {
    client: Client,
    endpoint: String,
    api_key: String,
    api_version: String,
}

#[derive(Debug, Deserialize)]
struct AzureChatResponse {
    #[serde(default)]
    choices: Vec<AzureChoice>,
    #[serde(default)]
    usage: Option<AzureUsage>,
}

#[derive(Debug, Deserialize)]
struct AzureChoice {
    message: AzureMessage,
}

#[derive(Debug, Deserialize)]
struct AzureMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AzureUsage {
    prompt_tokens: usize,
    completion_tokens: usize,
}

impl AzureOpenAiProvider {
    /// Create a new Azure OpenAI provider
    ///
    /// # Arguments
    ///
    /// * `config` - Endpoint, key, API version and timeout
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: &OpenAiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("margie/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MargieError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized Azure OpenAI provider: endpoint={}, api_version={}",
            config.endpoint,
            config.api_version
        );

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            api_version: config.api_version.clone(),
        })
    }

    /// Resource endpoint without a trailing slash
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// API version sent as the `api-version` query parameter
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Chat-completions URL for a deployment, without the query string
    pub fn completions_url(&self, deployment: &str) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions",
            self.endpoint, deployment
        )
    }

    fn error_for_status(status: StatusCode, retry_after: Option<u64>, body: &str) -> MargieError {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                MargieError::Authentication(format!("Azure OpenAI rejected the key ({})", status))
            }
            StatusCode::TOO_MANY_REQUESTS => MargieError::RateLimited { retry_after },
            _ => MargieError::Provider(format!("Azure OpenAI returned error {}: {}", status, body)),
        }
    }
}

#[async_trait]
impl Provider for AzureOpenAiProvider {
    async fn complete(&self, request: &ChatCompletionRequest) -> Result<CompletionResponse> {
        let url = self.completions_url(&request.model);

        tracing::debug!(
            "Sending Azure OpenAI request: deployment={}, {} messages, {} data sources",
            request.model,
            request.messages.len(),
            request.data_sources.len()
        );

        let response = self
            .client
            .post(&url)
            .query(&[("api-version", self.api_version.as_str())])
            .header("api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Azure OpenAI request failed: {}", e);
                MargieError::Http(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Azure OpenAI returned error {}: {}", status, error_text);
            return Err(Self::error_for_status(status, retry_after, &error_text).into());
        }

        let body: AzureChatResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Azure OpenAI response: {}", e);
            MargieError::Provider(format!("Failed to parse Azure OpenAI response: {}", e))
        })?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                tracing::error!("Azure OpenAI response carried no answer");
                MargieError::Provider("Azure OpenAI response carried no answer".to_string())
            })?;

        let response = match body.usage {
            Some(usage) => {
                tracing::debug!(
                    "Azure OpenAI usage: prompt_tokens={}, completion_tokens={}",
                    usage.prompt_tokens,
                    usage.completion_tokens
                );
                CompletionResponse::with_usage(
                    content,
                    TokenUsage::new(usage.prompt_tokens, usage.completion_tokens),
                )
            }
            None => CompletionResponse::new(content),
        };

        Ok(response)
    }

    fn name(&self) -> &str {
        "azure_openai"
    }
}
