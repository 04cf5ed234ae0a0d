//! Agent module for Margie
//!
//! This module contains the conversation store and the assistant that drives
//! one question/answer interaction against the completion provider.

pub mod conversation;
pub mod core;

pub use conversation::Conversation;
pub use core::{Assistant, DEFAULT_SYSTEM_PROMPT};
