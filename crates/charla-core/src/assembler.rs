//! Streaming response assembler.
//!
//! Consumes the engine's fragment stream for one turn, watches for the
//! end-of-turn marker, and pushes partial-progress updates to a display
//! sink according to a flush policy. Detection runs against the
//! accumulated text, so a marker split across fragments is still found.

use std::pin::pin;

use futures_util::{Stream, StreamExt};
use tracing::debug;

use charla_types::error::{EngineError, TurnError};
use charla_types::llm::END_OF_TURN;

use crate::sink::DisplaySink;

/// Minimum accumulated length before a throttled flush may fire.
pub const DEFAULT_FLUSH_THRESHOLD: usize = 50;

/// When partial output is pushed to the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushPolicy {
    /// Flush every fragment as it arrives (terminal stream). A fragment
    /// whose arrival completes the end-of-turn marker is never flushed.
    EveryFragment,
    /// Flush the full accumulated text, but only once it is longer than
    /// `min_chars` and the newest fragment contains a sentence-ending
    /// period (edited chat message; keeps the edit rate down).
    SentenceBoundary { min_chars: usize },
    /// Never flush; only the final result is used (image description).
    Never,
}

impl FlushPolicy {
    /// The edited-message policy with the production threshold.
    pub fn sentence_boundary() -> Self {
        FlushPolicy::SentenceBoundary {
            min_chars: DEFAULT_FLUSH_THRESHOLD,
        }
    }
}

/// What a flush should carry to the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flush {
    /// The fragment that just arrived.
    Fragment,
    /// Everything accumulated so far.
    Accumulated,
}

/// What the session decided for one incoming fragment.
#[derive(Debug, PartialEq, Eq)]
enum Step {
    /// Keep consuming, optionally flushing first.
    Continue(Option<Flush>),
    /// End-of-turn marker seen; stop consuming.
    Done,
}

/// Mutable state for one generation turn.
///
/// Created when a generation begins; consumed for the final result when
/// the marker is found or the fragment stream ends.
#[derive(Debug)]
struct StreamSession {
    accumulated: String,
    sentinel_found: bool,
    last_flush_len: usize,
    policy: FlushPolicy,
}

impl StreamSession {
    fn new(policy: FlushPolicy) -> Self {
        Self {
            accumulated: String::new(),
            sentinel_found: false,
            last_flush_len: 0,
            policy,
        }
    }

    /// Everything accumulated so far, marker included if present.
    fn accumulated(&self) -> &str {
        &self.accumulated
    }

    /// Absorb one fragment and decide what happens next.
    fn push(&mut self, fragment: &str) -> Step {
        self.accumulated.push_str(fragment);

        if self.accumulated.contains(END_OF_TURN) {
            self.sentinel_found = true;
            return Step::Done;
        }

        match self.policy {
            FlushPolicy::EveryFragment => {
                self.last_flush_len = self.accumulated.len();
                Step::Continue(Some(Flush::Fragment))
            }
            FlushPolicy::SentenceBoundary { min_chars } => {
                // The growth check skips flushes for empty fragments,
                // which would re-edit the message to identical text.
                if self.accumulated.len() > min_chars
                    && self.accumulated.len() > self.last_flush_len
                    && fragment.contains('.')
                {
                    self.last_flush_len = self.accumulated.len();
                    Step::Continue(Some(Flush::Accumulated))
                } else {
                    Step::Continue(None)
                }
            }
            FlushPolicy::Never => Step::Continue(None),
        }
    }

    /// Final result: the first marker occurrence removed, then trimmed.
    fn into_result(self) -> String {
        self.accumulated
            .replacen(END_OF_TURN, "", 1)
            .trim()
            .to_string()
    }
}

/// Outcome of one assembled generation.
#[derive(Debug)]
pub struct Assembled {
    /// Marker-stripped, trimmed response text.
    pub text: String,
    /// Whether the end-of-turn marker was seen. A stream that ends
    /// without it is still a normal completion.
    pub sentinel_found: bool,
}

/// Drive `fragments` through the stream session and `sink` until the
/// end-of-turn marker appears or the stream ends.
///
/// Fragments after the one that completes the marker are never pulled.
/// On a mid-stream engine failure the accumulated text is discarded and
/// the error returned; user-facing messaging belongs to the caller.
pub async fn assemble<S, D>(
    fragments: S,
    sink: &mut D,
    policy: FlushPolicy,
) -> Result<Assembled, TurnError>
where
    S: Stream<Item = Result<String, EngineError>>,
    D: DisplaySink,
{
    let mut fragments = pin!(fragments);
    let mut session = StreamSession::new(policy);

    sink.send_initial().await?;

    while let Some(next) = fragments.next().await {
        let fragment = next?;
        match session.push(&fragment) {
            Step::Done => break,
            Step::Continue(Some(Flush::Fragment)) => sink.flush(&fragment).await?,
            Step::Continue(Some(Flush::Accumulated)) => {
                sink.flush(session.accumulated()).await?
            }
            Step::Continue(None) => {}
        }
    }

    let sentinel_found = session.sentinel_found;
    let text = session.into_result();
    sink.finalize(&text).await?;

    debug!(len = text.len(), sentinel_found, "generation assembled");
    Ok(Assembled {
        text,
        sentinel_found,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use charla_types::error::SinkError;
    use futures_util::stream;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Records every sink call for assertions.
    #[derive(Default)]
    struct RecordingSink {
        initial_calls: usize,
        flushes: Vec<String>,
        finalizes: Vec<String>,
    }

    impl DisplaySink for RecordingSink {
        async fn send_initial(&mut self) -> Result<(), SinkError> {
            self.initial_calls += 1;
            Ok(())
        }

        async fn flush(&mut self, text: &str) -> Result<(), SinkError> {
            self.flushes.push(text.to_string());
            Ok(())
        }

        async fn finalize(&mut self, text: &str) -> Result<(), SinkError> {
            self.finalizes.push(text.to_string());
            Ok(())
        }
    }

    fn ok_fragments(fragments: &[&str]) -> Vec<Result<String, EngineError>> {
        fragments.iter().map(|f| Ok(f.to_string())).collect()
    }

    #[tokio::test]
    async fn test_sentinel_free_stream_concatenates_and_trims() {
        let mut sink = RecordingSink::default();
        let fragments = stream::iter(ok_fragments(&["  Hello ", "wor", "ld  "]));

        let assembled = assemble(fragments, &mut sink, FlushPolicy::EveryFragment)
            .await
            .unwrap();

        assert_eq!(assembled.text, "Hello world");
        assert!(!assembled.sentinel_found);
    }

    #[tokio::test]
    async fn test_sentinel_truncates_and_stops_consuming() {
        let consumed = Rc::new(Cell::new(0usize));
        let counter = Rc::clone(&consumed);
        let fragments = stream::iter(ok_fragments(&["Hola, ", "<end_of_turn>", "ignored"]))
            .inspect(move |_| counter.set(counter.get() + 1));
        let mut sink = RecordingSink::default();

        let assembled = assemble(fragments, &mut sink, FlushPolicy::EveryFragment)
            .await
            .unwrap();

        assert_eq!(assembled.text, "Hola,");
        assert!(assembled.sentinel_found);
        assert_eq!(consumed.get(), 2, "fragments after the marker were pulled");
    }

    #[tokio::test]
    async fn test_sentinel_split_across_fragments_is_detected() {
        let mut sink = RecordingSink::default();
        let fragments = stream::iter(ok_fragments(&["Done now", "<end_of", "_turn>", "tail"]));

        let assembled = assemble(fragments, &mut sink, FlushPolicy::Never)
            .await
            .unwrap();

        assert_eq!(assembled.text, "Done now");
        assert!(assembled.sentinel_found);
    }

    #[tokio::test]
    async fn test_every_fragment_policy_flushes_each_fragment_raw() {
        let mut sink = RecordingSink::default();
        let fragments = stream::iter(ok_fragments(&["a", "b", "c"]));

        assemble(fragments, &mut sink, FlushPolicy::EveryFragment)
            .await
            .unwrap();

        assert_eq!(sink.initial_calls, 1);
        assert_eq!(sink.flushes, vec!["a", "b", "c"]);
        assert_eq!(sink.finalizes, vec!["abc"]);
    }

    #[tokio::test]
    async fn test_fragment_completing_sentinel_is_never_flushed() {
        let mut sink = RecordingSink::default();
        let fragments = stream::iter(ok_fragments(&["bye", "<end_of_turn>"]));

        assemble(fragments, &mut sink, FlushPolicy::EveryFragment)
            .await
            .unwrap();

        assert_eq!(sink.flushes, vec!["bye"]);
        assert!(sink.flushes.iter().all(|f| !f.contains(END_OF_TURN)));
    }

    #[tokio::test]
    async fn test_sentence_boundary_throttling_counts_flushes() {
        // Threshold low enough that "Hello world. " clears it; the
        // conjunction is what matters: only the period fragment flushes.
        let mut sink = RecordingSink::default();
        let fragments = stream::iter(ok_fragments(&[
            "Hello ",
            "wor",
            "ld. ",
            "More text without period",
        ]));

        assemble(
            fragments,
            &mut sink,
            FlushPolicy::SentenceBoundary { min_chars: 10 },
        )
        .await
        .unwrap();

        assert_eq!(sink.flushes.len(), 1, "expected exactly one throttled flush");
        assert_eq!(sink.flushes[0], "Hello world. ");
        assert_eq!(sink.finalizes.len(), 1);
    }

    #[tokio::test]
    async fn test_sentence_boundary_default_threshold_suppresses_short_text() {
        let mut sink = RecordingSink::default();
        let fragments = stream::iter(ok_fragments(&["Hello ", "wor", "ld. "]));

        assemble(fragments, &mut sink, FlushPolicy::sentence_boundary())
            .await
            .unwrap();

        // 13 characters never clears the 50-character floor.
        assert!(sink.flushes.is_empty());
        assert_eq!(sink.finalizes, vec!["Hello world."]);
    }

    #[tokio::test]
    async fn test_sentence_boundary_requires_period_in_latest_fragment() {
        let mut sink = RecordingSink::default();
        let long_run = "x".repeat(80);
        let fragments = stream::iter(ok_fragments(&[&long_run, "still going", "done."]));

        assemble(
            fragments,
            &mut sink,
            FlushPolicy::SentenceBoundary { min_chars: 50 },
        )
        .await
        .unwrap();

        // Length cleared the floor on every fragment, but only the last
        // one carries a period.
        assert_eq!(sink.flushes.len(), 1);
        assert!(sink.flushes[0].ends_with("done."));
    }

    #[tokio::test]
    async fn test_never_policy_only_finalizes() {
        let mut sink = RecordingSink::default();
        let fragments = stream::iter(ok_fragments(&["An image. ", "Of a cat."]));

        let assembled = assemble(fragments, &mut sink, FlushPolicy::Never)
            .await
            .unwrap();

        assert!(sink.flushes.is_empty());
        assert_eq!(assembled.text, "An image. Of a cat.");
        assert_eq!(sink.finalizes, vec!["An image. Of a cat."]);
    }

    #[tokio::test]
    async fn test_empty_stream_is_normal_completion() {
        let mut sink = RecordingSink::default();
        let fragments = stream::iter(Vec::<Result<String, EngineError>>::new());

        let assembled = assemble(fragments, &mut sink, FlushPolicy::EveryFragment)
            .await
            .unwrap();

        assert_eq!(assembled.text, "");
        assert!(!assembled.sentinel_found);
        assert_eq!(sink.finalizes, vec![""]);
    }

    #[tokio::test]
    async fn test_mid_stream_error_discards_text_and_propagates() {
        let mut sink = RecordingSink::default();
        let fragments = stream::iter(vec![
            Ok("partial ".to_string()),
            Err(EngineError::Stream("connection reset".to_string())),
            Ok("never seen".to_string()),
        ]);

        let result = assemble(fragments, &mut sink, FlushPolicy::EveryFragment).await;

        assert!(matches!(result, Err(TurnError::Engine(_))));
        // The failure aborts the turn before any final confirmation.
        assert!(sink.finalizes.is_empty());
    }

    #[tokio::test]
    async fn test_finalize_receives_trimmed_text() {
        let mut sink = RecordingSink::default();
        let fragments = stream::iter(ok_fragments(&["  padded  ", "<end_of_turn>"]));

        assemble(fragments, &mut sink, FlushPolicy::Never)
            .await
            .unwrap();

        assert_eq!(sink.finalizes, vec!["padded"]);
    }
}
