//! Command-line interface definition for Margie
//!
//! This module defines the CLI structure using clap's derive API,
//! providing the terminal chat loop and the browser chat UI.

use clap::{Parser, Subcommand};

/// Margie - travel assistant grounded in Margie's Travel Agency documents
///
/// Answers questions with a hosted chat model that searches the agency's
/// document index before replying.
#[derive(Parser, Debug, Clone)]
#[command(name = "margie")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to an optional YAML configuration file
    #[arg(short, long, env = "MARGIE_CONFIG")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Margie
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Start an interactive chat in the terminal
    Chat,

    /// Serve the chat UI over HTTP
    Serve {
        /// Listen address, overrides MARGIE_BIND
        #[arg(short, long)]
        bind: Option<String>,
    },
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
