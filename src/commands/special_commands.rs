//! Special input recognized by the interactive chat loop
//!
//! Lines are classified before they reach the assistant:
//! - `exit` in any letter case ends the session
//! - blank lines are refused with a hint
//! - everything else is a question

/// Word that ends an interactive session
pub const EXIT_COMMAND: &str = "exit";

/// Classification of one line typed at the chat prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Leave the chat loop
    Exit,

    /// Nothing but whitespace; prompt again
    Blank,

    /// Not a special command, send it to the assistant
    None,
}

/// Classify a line typed at the prompt
///
/// Surrounding whitespace is ignored, and the exit word matches in any case.
///
/// # Examples
///
/// ```
/// use margie::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(parse_special_command("EXIT"), SpecialCommand::Exit);
/// assert_eq!(parse_special_command("   "), SpecialCommand::Blank);
/// assert_eq!(parse_special_command("Hotels in Paris?"), SpecialCommand::None);
/// ```
pub fn parse_special_command(input: &str) -> SpecialCommand {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        SpecialCommand::Blank
    } else if trimmed.eq_ignore_ascii_case(EXIT_COMMAND) {
        SpecialCommand::Exit
    } else {
        SpecialCommand::None
    }
}
