//! Position representation: squares, pieces, moves, FEN and SAN I/O, legal
//! move generation, and position signatures. Synchronous, single-threaded,
//! and free of any dependency on the engine or mining subsystems.

mod error;
mod geometry;
mod mv;
mod movelist;
mod piece;
mod position;
mod san;
mod signature;
mod square;

pub use error::PositionError;
pub use geometry::{Direction, Geometry, GEOMETRY};
pub use mv::Move;
pub use movelist::MoveList;
pub use piece::{Piece, PieceKind, Promotion};
pub use position::{CastlingRights, Position};
pub use san::{emit as san_emit, parse as san_parse, strip_movetext};
pub use signature::PositionSignature;
pub use square::{CastleSide, Color, Square};
