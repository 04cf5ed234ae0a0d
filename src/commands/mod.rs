/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes two top-level command modules:

- `chat`: interactive question loop in the terminal
- `serve`: browser chat UI over HTTP

Both build the shared provider and request settings from the validated
configuration and hand them to the assistant.
*/

use crate::agent::Assistant;
use crate::config::Config;
use crate::error::Result;
use crate::providers::create_provider;
use std::sync::Arc;

// Exit word and blank-line handling for the chat loop
pub mod special_commands;

/// Build an assistant wired to the configured provider and index
///
/// # Errors
///
/// Returns error if the provider cannot be initialized
pub fn build_assistant(config: &Config) -> Result<Assistant> {
    let provider = create_provider(config)?;
    Ok(Assistant::new(
        provider,
        Arc::new(config.composer()),
        config.assistant.system_prompt.clone(),
    ))
}

// Chat command handler
pub mod chat {
    //! Interactive chat mode handler.
    //!
    //! Clears the terminal, then reads questions with rustyline until the
    //! user types `exit` or closes the input. Only the answer text is
    //! printed for each question.

    use super::*;
    use crate::commands::special_commands::{parse_special_command, SpecialCommand};
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// Prompt shown before every question
    pub const PROMPT: &str = "Enter a question (type 'exit' to quit): ";

    /// Shown when the user submits a blank line
    pub const BLANK_HINT: &str = "Please enter a question.";

    /// Printed when the loop ends
    pub const GOODBYE: &str = "Goodbye.";

    /// What the loop should do after one line of input
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum LineOutcome {
        /// Stop reading input
        Exit,
        /// Nothing was asked; show a hint and prompt again
        Reprompt(String),
        /// The assistant answered
        Answer(String),
        /// The question could not be answered; history is unchanged
        Failed(String),
    }

    /// Start interactive chat mode
    ///
    /// # Arguments
    ///
    /// * `config` - Validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if the provider or the line editor cannot be created
    ///
    /// # Examples
    ///
    /// ```
    /// use margie::commands::chat;
    /// use margie::config::Config;
    ///
    /// // In application code:
    /// // chat::run_chat(config).await?;
    /// ```
    pub async fn run_chat(config: Config) -> Result<()> {
        tracing::info!("Starting interactive chat mode");

        let mut assistant = build_assistant(&config)?;
        let mut rl = DefaultEditor::new()?;

        clear_screen();
        print_welcome_banner(&config);

        loop {
            match rl.readline(PROMPT) {
                Ok(line) => match handle_line(&mut assistant, &line).await {
                    LineOutcome::Exit => break,
                    LineOutcome::Reprompt(hint) => {
                        println!("{}", hint.yellow());
                    }
                    LineOutcome::Answer(answer) => {
                        rl.add_history_entry(line.trim())?;
                        println!("{}\n", answer);
                    }
                    LineOutcome::Failed(message) => {
                        eprintln!("{}\n", format!("Error: {}", message).red());
                    }
                },
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        println!("{}", GOODBYE);
        Ok(())
    }

    /// Handle one line typed at the prompt
    ///
    /// The exit word and blank lines never reach the assistant, so they
    /// neither touch the conversation nor cost a completion call. Questions
    /// are sent exactly as typed.
    pub async fn handle_line(assistant: &mut Assistant, line: &str) -> LineOutcome {
        match parse_special_command(line) {
            SpecialCommand::Exit => LineOutcome::Exit,
            SpecialCommand::Blank => LineOutcome::Reprompt(BLANK_HINT.to_string()),
            SpecialCommand::None => match assistant.ask(line).await {
                Ok(answer) => LineOutcome::Answer(answer),
                Err(e) => LineOutcome::Failed(e.to_string()),
            },
        }
    }

    fn clear_screen() {
        print!("\x1B[2J\x1B[1;1H");
    }

    fn print_welcome_banner(config: &Config) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║               Margie's Travel Assistant                      ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!(
            "Model: {}  Index: {} ({})\n",
            config.openai.chat_model.cyan(),
            config.search.index_name.cyan(),
            config.search.query_type
        );
    }

}

// Serve command handler
pub mod serve {
    //! Browser chat UI handler.
    //!
    //! Binds the configured address and serves the chat page until the
    //! process receives Ctrl-C.

    use super::*;
    use crate::web::{router, AppState, SessionStore};
    use tokio::net::TcpListener;

    /// Start the chat UI server
    ///
    /// # Arguments
    ///
    /// * `config` - Validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if the provider cannot be initialized, the address
    /// cannot be bound, or the server fails
    pub async fn run_serve(config: Config) -> Result<()> {
        let provider = create_provider(&config)?;
        let sessions = SessionStore::with_limits(
            config.server.session_idle_timeout(),
            config.server.max_sessions,
        );
        let state = Arc::new(
            AppState::new(
                provider,
                Arc::new(config.composer()),
                config.assistant.system_prompt.clone(),
            )
            .with_sessions(sessions),
        );

        let listener = TcpListener::bind(&config.server.bind).await.map_err(|e| {
            crate::error::MargieError::Config(format!(
                "Failed to bind to {}: {}",
                config.server.bind, e
            ))
        })?;
        let addr = listener.local_addr()?;

        tracing::info!("Listening on {}", addr);
        println!("Margie's Travel Assistant is available at http://{}", addr);

        axum::serve(listener, router(state))
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server stopped");
        Ok(())
    }

    async fn shutdown_signal() {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
