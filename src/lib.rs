//! Margie - retrieval-augmented travel assistant library
//!
//! This library provides the core functionality for Margie's Travel
//! Assistant: a chat front end whose answers are grounded in the agency's
//! documents by a hosted chat model that searches an index before replying.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `agent`: Conversation history and the question/answer round trip
//! - `rag`: Search data source descriptor and request composition
//! - `providers`: Completion provider abstraction and the Azure OpenAI client
//! - `config`: Configuration management and validation
//! - `commands`: Terminal chat loop and chat UI server
//! - `web`: Browser chat UI routes and per-browser sessions
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use clap::Parser;
//! use margie::cli::Cli;
//! use margie::commands::build_assistant;
//! use margie::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let cli = Cli::parse_from(["margie", "chat"]);
//!     let config = Config::load(None, &cli)?;
//!     config.validate()?;
//!
//!     let mut assistant = build_assistant(&config)?;
//!     println!("{}", assistant.ask("What hotels are available in Paris?").await?);
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod providers;
pub mod rag;
pub mod web;

// Re-export commonly used types
pub use agent::{Assistant, Conversation};
pub use config::Config;
pub use error::{MargieError, Result};

#[cfg(test)]
pub mod test_utils;
