//! Crate-wide error aggregation.
//!
//! Each subsystem (`board`, `analysis`, `engine`, `mining`) defines its own
//! narrow error type so callers can match on the specific kind they care
//! about. [`Error`] exists only for callers who want a single type to
//! propagate with `?` across subsystem boundaries.

use thiserror::Error;

use crate::{analysis::FilterError, board::PositionError, engine::EngineError, mining::MiningError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Position(#[from] PositionError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Mining(#[from] MiningError),
}
