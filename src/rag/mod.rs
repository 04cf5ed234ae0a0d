//! Retrieval augmentation
//!
//! Describes the search index the hosted model should ground its answers in
//! and composes the outbound chat-completion request.

pub mod composer;
pub mod retrieval;

pub use composer::{compose, Composer};
pub use retrieval::{
    DataSource, DataSourceKind, EmbeddingDependency, QueryType, RetrievalConfig,
    SearchAuthentication, SearchParameters,
};
