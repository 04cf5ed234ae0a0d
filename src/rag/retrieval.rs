//! Retrieval configuration and the `azure_search` data source descriptor
//!
//! The hosted chat-completion service performs the search itself; this crate
//! only tells it where the index lives and how to query it.

use crate::error::{MargieError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the search service matches documents against the question
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    /// Keyword match
    Text,
    /// Embedding similarity
    #[default]
    Vector,
    /// Keyword and embedding similarity combined
    Hybrid,
}

impl QueryType {
    /// Wire name of the query type
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Vector => "vector",
            Self::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "vector" => Ok(Self::Vector),
            "hybrid" => Ok(Self::Hybrid),
            other => Err(MargieError::Config(format!(
                "Invalid query type: {}. Must be one of: text, vector, hybrid",
                other
            ))
            .into()),
        }
    }
}

/// Where and how the completion service should search
///
/// Built once from [`crate::config::SearchConfig`] and attached verbatim to
/// every request for the life of the process.
#[derive(Clone, PartialEq, Eq)]
pub struct RetrievalConfig {
    /// Base URL of the search service
    pub endpoint: String,
    /// Name of the index to query
    pub index_name: String,
    /// Search service key
    pub api_key: String,
    /// Matching strategy
    pub query_type: QueryType,
    /// Deployment that embeds the question for vector and hybrid queries
    pub embedding_deployment: String,
}

impl fmt::Debug for RetrievalConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetrievalConfig")
            .field("endpoint", &self.endpoint)
            .field("index_name", &self.index_name)
            .field("api_key", &"<redacted>")
            .field("query_type", &self.query_type)
            .field("embedding_deployment", &self.embedding_deployment)
            .finish()
    }
}

impl RetrievalConfig {
    /// Renders the configuration as the data source entry of a request
    ///
    /// # Examples
    ///
    /// ```
    /// use margie::rag::{QueryType, RetrievalConfig};
    ///
    /// let retrieval = RetrievalConfig {
    ///     endpoint: "https://search.example.net".to_string(),
    ///     index_name: "margies-travel".to_string(),
    ///     api_key: "secret".to_string(),
    ///     query_type: QueryType::Vector,
    ///     embedding_deployment: "text-embedding-ada-002".to_string(),
    /// };
    /// let source = retrieval.to_data_source();
    /// assert_eq!(source.parameters.query_type, QueryType::Vector);
    /// ```
    pub fn to_data_source(&self) -> DataSource {
        DataSource {
            kind: DataSourceKind::AzureSearch,
            parameters: SearchParameters {
                endpoint: self.endpoint.clone(),
                index_name: self.index_name.clone(),
                authentication: SearchAuthentication::ApiKey {
                    key: self.api_key.clone(),
                },
                query_type: self.query_type,
                embedding_dependency: EmbeddingDependency::DeploymentName {
                    deployment_name: self.embedding_deployment.clone(),
                },
            },
        }
    }
}

/// One entry of the request's `data_sources` array
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSource {
    /// Kind of search backend
    #[serde(rename = "type")]
    pub kind: DataSourceKind,
    /// Backend-specific settings
    pub parameters: SearchParameters,
}

/// Search backends the completion service can consult
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSourceKind {
    /// Azure AI Search
    AzureSearch,
}

/// Parameters of an `azure_search` data source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParameters {
    pub endpoint: String,
    pub index_name: String,
    pub authentication: SearchAuthentication,
    pub query_type: QueryType,
    pub embedding_dependency: EmbeddingDependency,
}

/// Credentials presented to the search service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SearchAuthentication {
    /// Static admin or query key
    ApiKey { key: String },
}

/// Model used to embed the question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EmbeddingDependency {
    /// Embedding deployment in the same Azure OpenAI resource
    DeploymentName { deployment_name: String },
}
