//! A chess-research toolkit: position representation and move generation,
//! engine-backed multi-PV analysis over a pool of UCI subprocesses, and a
//! wave-based puzzle-mining pipeline built on top of both.

pub mod analysis;
pub mod board;
pub mod engine;
pub mod error;
pub mod mining;

pub use error::Error;
