//! Chat message and prompt types shared by the engine and both loops.

use std::fmt;
use std::pin::Pin;

use futures_util::Stream;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Marker the model emits when it has finished its turn.
///
/// The assembler stops consuming fragments as soon as the accumulated
/// text contains this literal, and strips it from the returned result.
pub const END_OF_TURN: &str = "<end_of_turn>";

/// Role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single role-tagged message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Per-turn input to the inference engine.
///
/// Built once per user turn and discarded after the request is sent.
#[derive(Debug, Clone)]
pub enum PromptInput {
    /// An ordered list of role-tagged messages.
    Messages(Vec<ChatMessage>),
    /// A single preformatted prompt string (vision path).
    Raw(String),
}

/// A lazy sequence of generated text fragments.
///
/// Finite and single-pass; dropping the stream abandons the remainder
/// without signalling the engine.
pub type FragmentStream =
    Pin<Box<dyn Stream<Item = Result<String, EngineError>> + Send + 'static>>;
