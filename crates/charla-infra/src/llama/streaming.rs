//! llama.cpp server SSE stream to text-fragment adapter.
//!
//! The server answers `POST /completion` with `stream: true` as a
//! server-sent-event stream; each event's data is a JSON object with
//! the generated `content` for that step and a `stop` flag on the last
//! one. This module maps that wire shape to the plain fragment stream
//! the assembler consumes.

use async_stream::try_stream;
use eventsource_stream::Eventsource;
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};

use charla_types::error::EngineError;
use charla_types::llm::FragmentStream;

/// Body for `POST /completion`.
#[derive(Debug, Clone, Serialize)]
pub(super) struct CompletionRequest {
    pub prompt: String,
    pub temperature: f32,
    pub seed: i64,
    /// -1 lets the model run until it stops on its own.
    pub n_predict: i64,
    pub stream: bool,
}

/// One decoded SSE chunk.
#[derive(Debug, Deserialize)]
struct CompletionChunk {
    #[serde(default)]
    content: String,
    #[serde(default)]
    stop: bool,
}

fn parse_chunk(data: &str) -> Result<CompletionChunk, EngineError> {
    serde_json::from_str(data).map_err(|e| EngineError::Decode(e.to_string()))
}

/// Issue the request and map the SSE response to a fragment stream.
///
/// The stream yields each non-empty `content` piece in arrival order
/// and ends after the chunk flagged `stop`. Transport and decode
/// failures surface as [`EngineError`] items.
pub(super) fn fragment_stream(
    client: reqwest::Client,
    url: String,
    request: CompletionRequest,
) -> FragmentStream {
    Box::pin(try_stream! {
        let response = client
            .post(&url)
            .json(&request)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| EngineError::Http(e.to_string()))?;

        let mut events = response.bytes_stream().eventsource();
        while let Some(event) = events.next().await {
            let event = event.map_err(|e| EngineError::Stream(e.to_string()))?;
            let chunk = parse_chunk(&event.data)?;
            if !chunk.content.is_empty() {
                yield chunk.content;
            }
            if chunk.stop {
                break;
            }
        }
    })
}
