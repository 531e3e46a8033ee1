//! Error kinds raised by the mining loop and its JSON-Lines sinks.

use thiserror::Error;

use crate::engine::EngineError;

#[derive(Debug, Error)]
pub enum MiningError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("I/O error in a mining sink: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON record: {0}")]
    InvalidRecord(#[from] serde_json::Error),
}
