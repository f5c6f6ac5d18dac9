//! Terminal display sink.
//!
//! Fragments go straight to stdout as they arrive. The thinking
//! spinner lives here so it can be cleared the moment the first
//! fragment lands.

use std::io::Write;

use console::style;
use indicatif::ProgressBar;

use charla_core::sink::DisplaySink;
use charla_types::error::SinkError;

/// Writes each fragment to stdout immediately.
pub struct TerminalSink {
    spinner: Option<ProgressBar>,
    started: bool,
}

impl TerminalSink {
    pub fn new(spinner: ProgressBar) -> Self {
        Self {
            spinner: Some(spinner),
            started: false,
        }
    }

    fn clear_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    /// Clear the spinner when the turn fails before any fragment.
    pub fn abort(&mut self) {
        self.clear_spinner();
    }
}

impl DisplaySink for TerminalSink {
    async fn send_initial(&mut self) -> Result<(), SinkError> {
        Ok(())
    }

    async fn flush(&mut self, text: &str) -> Result<(), SinkError> {
        if !self.started {
            self.started = true;
            self.clear_spinner();
            print!("\n  {} ", style("AI >").blue().bold());
        }
        print!("{}", style(text).blue());
        std::io::stdout()
            .flush()
            .map_err(|e| SinkError::Write(e.to_string()))
    }

    async fn finalize(&mut self, _text: &str) -> Result<(), SinkError> {
        // Everything was already streamed; just make sure the spinner is
        // gone for responses that produced no fragments at all.
        self.clear_spinner();
        Ok(())
    }
}
