use thiserror::Error;

/// Errors emitted by the generation engine.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Invalid run parameters; raised before anything is emitted.
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("identity error: {0}")]
    Identity(#[from] salesgen_core::Error),
    #[error("emitter error: {0}")]
    Emitter(#[from] EmitterError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("toml decode error: {0}")]
    TomlDecode(#[from] toml::de::Error),
}

/// Errors raised while persisting generated rows.
#[derive(Debug, Error)]
pub enum EmitterError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("emitter rejected record: {0}")]
    Rejected(String),
}
