//! Error kinds raised by the engine driver and its protocol configuration.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to spawn engine at {path:?}: {source}")]
    Spawn { path: String, #[source] source: std::io::Error },

    #[error("engine at {path:?} did not complete its UCI handshake within {timeout_ms}ms")]
    HandshakeTimeout { path: String, timeout_ms: u64 },

    #[error("engine protocol document is missing required key {0:?}")]
    MissingTemplate(&'static str),

    #[error("template for {key:?} must contain exactly one {expected} placeholder, found {found}")]
    TemplateMismatch { key: &'static str, expected: &'static str, found: usize },

    #[error("invalid protocol document: {0}")]
    ProtocolParse(#[from] toml::de::Error),

    #[error("I/O error talking to engine: {0}")]
    Io(#[from] std::io::Error),

    #[error("engine process exited unexpectedly mid-analysis")]
    UnexpectedExit,
}
