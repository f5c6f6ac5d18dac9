use thiserror::Error;

/// Errors from the inference engine boundary.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("http error: {0}")]
    Http(String),

    #[error("stream error: {0}")]
    Stream(String),

    #[error("decode error: {0}")]
    Decode(String),
}

/// Errors from a display sink (terminal write or message send/edit).
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("send failed: {0}")]
    Send(String),

    #[error("edit failed: {0}")]
    Edit(String),

    #[error("write failed: {0}")]
    Write(String),
}

/// Errors that abort a single user turn.
///
/// A turn failure never takes the session loop down; the loop logs the
/// cause and continues with the next input.
#[derive(Debug, Error)]
pub enum TurnError {
    #[error("image file unreadable: {0}")]
    Image(#[from] std::io::Error),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Configuration problems detected at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("telegram token not set (CHARLA_TG_TOKEN)")]
    MissingToken,

    #[error("allow-list is empty; every sender will be dropped")]
    EmptyAllowList,
}

/// Errors from the embedded document store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),
}
