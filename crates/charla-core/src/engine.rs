//! Inference engine boundary.

use charla_types::llm::{FragmentStream, PromptInput};

/// Boundary to the local inference runtime.
///
/// Object-safe so session loops can hold an `Arc<dyn InferenceEngine>`;
/// the returned stream is boxed for the same reason. Concrete
/// implementations live in charla-infra (e.g. `LlamaServerEngine`).
pub trait InferenceEngine: Send + Sync {
    /// Engine name for logs (e.g. "llama-server").
    fn name(&self) -> &str;

    /// Start one generation and return its fragment stream.
    ///
    /// The stream is finite and single-pass. Dropping it abandons the
    /// remainder; there is no cancellation signal to the engine, which
    /// may keep producing internally.
    fn generate(&self, input: PromptInput) -> FragmentStream;
}
