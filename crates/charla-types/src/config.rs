//! Settings record for Charla.
//!
//! `Settings` models the top-level `charla.toml`. Every field has a
//! default so a missing or partial file still yields a usable record.
//! The record is built once at startup and passed by reference into
//! every component constructor; nothing reads configuration ambiently.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level configuration, loaded from `charla.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Instruction prepended to every chat turn as the system message.
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Text-generation engine.
    #[serde(default)]
    pub engine: EngineSettings,

    /// Vision-capable engine used by `/pic`.
    #[serde(default = "EngineSettings::vision_defaults")]
    pub vision: EngineSettings,

    /// Telegram bot settings (the token itself comes from the environment).
    #[serde(default)]
    pub telegram: TelegramSettings,

    /// Path of the embedded document store.
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            engine: EngineSettings::default(),
            vision: EngineSettings::vision_defaults(),
            telegram: TelegramSettings::default(),
            database_path: default_database_path(),
        }
    }
}

fn default_system_prompt() -> String {
    "Be precise and brief, and do not add extra explanations unless asked.".to_string()
}

fn default_database_path() -> PathBuf {
    PathBuf::from("charla.db")
}

/// Construction parameters for one inference engine instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Base URL of the llama.cpp server.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the model file the server was started with (shown in the
    /// banner and logs; the server itself owns the loaded model).
    #[serde(default = "default_model_path")]
    pub model_path: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Sampling seed; -1 asks the server for a random seed.
    #[serde(default = "default_seed")]
    pub seed: i64,

    /// Log each generation request at debug level.
    #[serde(default = "default_verbose")]
    pub verbose: bool,
}

impl EngineSettings {
    /// Defaults for the vision engine: its own server, a higher
    /// temperature, and a random seed.
    pub fn vision_defaults() -> Self {
        Self {
            base_url: "http://127.0.0.1:8081".to_string(),
            model_path: "./models/vision.gguf".to_string(),
            temperature: 0.7,
            seed: -1,
            verbose: true,
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model_path: default_model_path(),
            temperature: default_temperature(),
            seed: default_seed(),
            verbose: default_verbose(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_model_path() -> String {
    "./models/model.gguf".to_string()
}

fn default_temperature() -> f32 {
    0.1
}

fn default_seed() -> i64 {
    1337
}

fn default_verbose() -> bool {
    true
}

/// Telegram-specific settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelegramSettings {
    /// Sender IDs permitted to receive responses. Empty means nobody.
    #[serde(default)]
    pub allowed_senders: Vec<String>,
}
