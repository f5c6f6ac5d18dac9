//! Edited-message display sink.
//!
//! Sends a placeholder message when streaming begins and edits that one
//! message as the accumulated text grows, so the chat shows a single
//! response bubble filling in rather than a flood of messages.

use teloxide::prelude::*;
use teloxide::types::MessageId;

use charla_core::sink::DisplaySink;
use charla_types::error::SinkError;

/// Shown until the first flush.
const PLACEHOLDER: &str = "…";
/// Trails partial output so it reads as in-progress.
const IN_PROGRESS_MARKER: &str = " ▌";
/// Trails the completed response.
const DONE_MARKER: &str = " ✓";

/// Streams a response into one editable Telegram message.
pub struct EditedMessageSink {
    bot: Bot,
    chat_id: ChatId,
    message_id: Option<MessageId>,
}

impl EditedMessageSink {
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self {
            bot,
            chat_id,
            message_id: None,
        }
    }

    /// Markers are composed per call, never stored, so repeating a
    /// flush or finalize with the same text displays the same thing.
    fn progress_text(text: &str) -> String {
        format!("{text}{IN_PROGRESS_MARKER}")
    }

    fn final_text(text: &str) -> String {
        format!("{text}{DONE_MARKER}")
    }

    async fn edit(&self, message_id: MessageId, text: String) -> Result<(), SinkError> {
        self.bot
            .edit_message_text(self.chat_id, message_id, text)
            .await
            .map(|_| ())
            .map_err(|e| SinkError::Edit(e.to_string()))
    }

    /// Replace whatever is currently displayed with a failure notice.
    /// Best-effort: a transport error here is only logged.
    pub async fn show_failure(&self, notice: &str) {
        let result = match self.message_id {
            Some(message_id) => self
                .bot
                .edit_message_text(self.chat_id, message_id, notice.to_string())
                .await
                .map(|_| ()),
            None => self
                .bot
                .send_message(self.chat_id, notice.to_string())
                .await
                .map(|_| ()),
        };
        if let Err(err) = result {
            tracing::error!(error = %err, chat_id = %self.chat_id, "failed to deliver failure notice");
        }
    }
}

impl DisplaySink for EditedMessageSink {
    async fn send_initial(&mut self) -> Result<(), SinkError> {
        let sent = self
            .bot
            .send_message(self.chat_id, PLACEHOLDER)
            .await
            .map_err(|e| SinkError::Send(e.to_string()))?;
        self.message_id = Some(sent.id);
        Ok(())
    }

    async fn flush(&mut self, text: &str) -> Result<(), SinkError> {
        match self.message_id {
            Some(message_id) => self.edit(message_id, Self::progress_text(text)).await,
            None => Ok(()),
        }
    }

    async fn finalize(&mut self, text: &str) -> Result<(), SinkError> {
        // An empty completion would make the edit call itself invalid.
        let body = if text.is_empty() { PLACEHOLDER } else { text };
        match self.message_id {
            Some(message_id) => self.edit(message_id, Self::final_text(body)).await,
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_text_appends_marker() {
        assert_eq!(
            EditedMessageSink::progress_text("Hello world."),
            "Hello world. ▌"
        );
    }

    #[test]
    fn test_final_text_is_idempotent_per_input() {
        let first = EditedMessageSink::final_text("All done");
        let second = EditedMessageSink::final_text("All done");
        assert_eq!(first, second);
        assert_eq!(first.matches(DONE_MARKER.trim()).count(), 1);
    }

    #[test]
    fn test_markers_differ_between_progress_and_final() {
        let progress = EditedMessageSink::progress_text("text");
        let done = EditedMessageSink::final_text("text");
        assert_ne!(progress, done);
    }
}
