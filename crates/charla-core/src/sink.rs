//! Display sink abstraction.
//!
//! A sink is where assembled text becomes visible: the terminal stream
//! or an editable chat message. The assembler is the only caller and
//! awaits every call, so `flush`/`finalize` for one sink are strictly
//! ordered.

use std::future::Future;

use charla_types::error::SinkError;

/// Destination for streamed output.
pub trait DisplaySink: Send {
    /// Called once before the first fragment arrives. The chat-message
    /// sink sends its placeholder here; the terminal sink does nothing.
    fn send_initial(&mut self) -> impl Future<Output = Result<(), SinkError>> + Send;

    /// Show a partial-progress update. What `text` holds depends on the
    /// flush policy: the raw fragment for immediate flushing, the full
    /// accumulated text for throttled flushing.
    fn flush(&mut self, text: &str) -> impl Future<Output = Result<(), SinkError>> + Send;

    /// Show the final, sentinel-stripped text. Idempotent: repeating
    /// the call with the same text yields the same displayed result.
    fn finalize(&mut self, text: &str) -> impl Future<Output = Result<(), SinkError>> + Send;
}

/// Sink that discards everything; used by the image path, where only
/// the returned result matters.
pub struct NullSink;

impl DisplaySink for NullSink {
    async fn send_initial(&mut self) -> Result<(), SinkError> {
        Ok(())
    }

    async fn flush(&mut self, _text: &str) -> Result<(), SinkError> {
        Ok(())
    }

    async fn finalize(&mut self, _text: &str) -> Result<(), SinkError> {
        Ok(())
    }
}
