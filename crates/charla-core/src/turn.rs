//! Per-turn orchestration shared by both session loops.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use tracing::debug;

use charla_types::error::TurnError;
use charla_types::llm::{ChatMessage, PromptInput};

use crate::assembler::{FlushPolicy, assemble};
use crate::engine::InferenceEngine;
use crate::prompt::{chat_template, vision_template};
use crate::sink::{DisplaySink, NullSink};

/// The only failure text a user ever sees; the real cause goes to the
/// operator log at the turn boundary.
pub const GENERIC_FAILURE_NOTICE: &str =
    "Sorry, something went wrong while generating a response.";

/// Run one text turn: template the input, stream the response through
/// `sink`, and return the assembled reply.
pub async fn run_text_turn<D: DisplaySink>(
    engine: &dyn InferenceEngine,
    system_prompt: &str,
    user_text: &str,
    sink: &mut D,
    policy: FlushPolicy,
) -> Result<String, TurnError> {
    let full_prompt = chat_template().format(user_text);
    let input = PromptInput::Messages(vec![
        ChatMessage::system(system_prompt),
        ChatMessage::user(full_prompt),
    ]);

    let assembled = assemble(engine.generate(input), sink, policy).await?;
    Ok(assembled.text)
}

/// Describe the image at `path` with the vision engine.
///
/// The file is read once, base64-encoded into the vision template, and
/// the response assembled without partial flushes; only the final text
/// is used. An unreadable file aborts the turn before anything reaches
/// a sink.
pub async fn describe_image(
    engine: &dyn InferenceEngine,
    path: &str,
) -> Result<String, TurnError> {
    let bytes = tokio::fs::read(path).await?;
    debug!(path, len = bytes.len(), "image read for description");

    let prompt = vision_template().format(&BASE64.encode(&bytes));
    let assembled = assemble(
        engine.generate(PromptInput::Raw(prompt)),
        &mut NullSink,
        FlushPolicy::Never,
    )
    .await?;
    Ok(assembled.text)
}
