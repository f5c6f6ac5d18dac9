//! llama.cpp server client.
//!
//! `LlamaServerEngine` implements [`InferenceEngine`] against the
//! llama.cpp server's `/completion` endpoint. The server owns the
//! loaded model; one engine instance is constructed per model (text and
//! vision) from its [`EngineSettings`].

mod streaming;

use std::time::Duration;

use tracing::debug;

use charla_core::engine::InferenceEngine;
use charla_types::config::EngineSettings;
use charla_types::llm::{FragmentStream, PromptInput};

use streaming::CompletionRequest;

/// Per-interaction timeout. Local inference on modest hardware can sit
/// near this for a single long answer, so it is deliberately generous;
/// a hung server hangs the turn until this fires.
const INTERACTION_TIMEOUT: Duration = Duration::from_millis(1_000_000);

/// Client for a llama.cpp server instance.
pub struct LlamaServerEngine {
    client: reqwest::Client,
    base_url: String,
    settings: EngineSettings,
}

impl LlamaServerEngine {
    pub fn new(settings: EngineSettings) -> Self {
        let client = reqwest::Client::builder()
            .timeout(INTERACTION_TIMEOUT)
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            base_url: settings.base_url.clone(),
            settings,
        }
    }

    /// Override the base URL (useful for tests and proxies).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    fn completion_url(&self) -> String {
        format!("{}/completion", self.base_url)
    }

    /// Flatten the per-turn input into the single prompt string the
    /// server takes. Role markers are already baked into the chat
    /// template, so the system instruction just leads the prompt.
    fn render_prompt(input: &PromptInput) -> String {
        match input {
            PromptInput::Raw(prompt) => prompt.clone(),
            PromptInput::Messages(messages) => {
                let mut prompt = String::new();
                for message in messages {
                    prompt.push_str(&message.content);
                    prompt.push_str("\n\n");
                }
                prompt.trim_end().to_string()
            }
        }
    }

    fn request_for(&self, input: &PromptInput) -> CompletionRequest {
        CompletionRequest {
            prompt: Self::render_prompt(input),
            temperature: self.settings.temperature,
            seed: self.settings.seed,
            n_predict: -1,
            stream: true,
        }
    }
}

impl InferenceEngine for LlamaServerEngine {
    fn name(&self) -> &str {
        "llama-server"
    }

    fn generate(&self, input: PromptInput) -> FragmentStream {
        let request = self.request_for(&input);
        if self.settings.verbose {
            debug!(
                model = %self.settings.model_path,
                temperature = self.settings.temperature,
                seed = self.settings.seed,
                prompt_len = request.prompt.len(),
                "starting generation"
            );
        }
        streaming::fragment_stream(self.client.clone(), self.completion_url(), request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use charla_types::llm::ChatMessage;

    fn settings() -> EngineSettings {
        EngineSettings {
            base_url: "http://127.0.0.1:9999".to_string(),
            model_path: "./models/test.gguf".to_string(),
            temperature: 0.2,
            seed: 42,
            verbose: false,
        }
    }

    #[test]
    fn test_render_prompt_raw_passthrough() {
        let input = PromptInput::Raw("describe this".to_string());
        assert_eq!(LlamaServerEngine::render_prompt(&input), "describe this");
    }

    #[test]
    fn test_render_prompt_flattens_messages_in_order() {
        let input = PromptInput::Messages(vec![
            ChatMessage::system("Be brief."),
            ChatMessage::user("Human: hi\n\nAssistant:"),
        ]);
        assert_eq!(
            LlamaServerEngine::render_prompt(&input),
            "Be brief.\n\nHuman: hi\n\nAssistant:"
        );
    }

    #[test]
    fn test_request_carries_engine_settings() {
        let engine = LlamaServerEngine::new(settings());
        let request = engine.request_for(&PromptInput::Raw("hi".to_string()));
        assert!((request.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(request.seed, 42);
        assert!(request.stream);
    }

    #[test]
    fn test_completion_url_honors_base_override() {
        let engine = LlamaServerEngine::new(settings())
            .with_base_url("http://10.0.0.5:8080".to_string());
        assert_eq!(engine.completion_url(), "http://10.0.0.5:8080/completion");
    }
}
