//! Squares and the small enums that index into the board.
//!
//! Square 0 is `a8`, square 63 is `h1`; indices increase left-to-right then
//! top-to-bottom, matching the order FEN placement fields are written in.

use std::fmt::{self, Display};
use std::str::FromStr;

use chumsky::prelude::*;
use strum::{EnumIs, VariantArray};

use crate::board::PositionError;

/// A board square, 0..=63. There is no sentinel value at this type — absence
/// is `Option<Square>` everywhere, per the geometry-table convention of
/// branching on `is_none()` rather than a magic byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Square(u8);

impl Square {
    #[inline]
    pub const fn new(ix: u8) -> Self {
        debug_assert!(ix < 64);
        Self(ix)
    }

    #[inline]
    pub const fn from_file_rank(file: u8, rank: u8) -> Self {
        debug_assert!(file < 8 && rank < 8);
        Self((7 - rank) * 8 + file)
    }

    #[inline]
    pub const fn ix(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn u8(self) -> u8 {
        self.0
    }

    /// File, 0 for `a` through 7 for `h`.
    #[inline]
    pub const fn file(self) -> u8 {
        self.0 % 8
    }

    /// Rank, 0 for rank 1 through 7 for rank 8 (the board-edge convention,
    /// not the storage-order convention).
    #[inline]
    pub const fn rank(self) -> u8 {
        7 - self.0 / 8
    }

    #[inline]
    pub const fn offset(self, d_file: i8, d_rank: i8) -> Option<Square> {
        let file = self.file() as i8 + d_file;
        let rank = self.rank() as i8 + d_rank;
        if file < 0 || file > 7 || rank < 0 || rank > 7 {
            None
        } else {
            Some(Self::from_file_rank(file as u8, rank as u8))
        }
    }

    pub const A1: Square = Square::from_file_rank(0, 0);
    pub const B1: Square = Square::from_file_rank(1, 0);
    pub const C1: Square = Square::from_file_rank(2, 0);
    pub const D1: Square = Square::from_file_rank(3, 0);
    pub const E1: Square = Square::from_file_rank(4, 0);
    pub const F1: Square = Square::from_file_rank(5, 0);
    pub const G1: Square = Square::from_file_rank(6, 0);
    pub const H1: Square = Square::from_file_rank(7, 0);
    pub const A8: Square = Square::from_file_rank(0, 7);
    pub const B8: Square = Square::from_file_rank(1, 7);
    pub const C8: Square = Square::from_file_rank(2, 7);
    pub const D8: Square = Square::from_file_rank(3, 7);
    pub const E8: Square = Square::from_file_rank(4, 7);
    pub const F8: Square = Square::from_file_rank(5, 7);
    pub const G8: Square = Square::from_file_rank(6, 7);
    pub const H8: Square = Square::from_file_rank(7, 7);

    pub fn parser<'s>() -> impl Parser<'s, &'s str, Square, extra::Err<Rich<'s, char>>> {
        one_of('a'..='h')
            .then(one_of('1'..='8'))
            .map(|(f, r)| Square::from_file_rank(f as u8 - b'a', r as u8 - b'1'))
    }
}

impl Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.file()) as char, (b'1' + self.rank()) as char)
    }
}

impl FromStr for Square {
    type Err = PositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Square::parser()
            .then_ignore(end())
            .parse(s)
            .into_result()
            .map_err(|_| PositionError::InvalidSquare(s.to_owned()))
    }
}

/// Side to move / side a piece belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIs)]
#[repr(u8)]
pub enum Color {
    White = 0,
    Black = 1,
}

impl Color {
    #[inline]
    pub const fn opponent(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    #[inline]
    pub const fn ix(self) -> usize {
        self as usize
    }

    /// Direction pawns of this color advance in, as a rank delta.
    #[inline]
    pub const fn pawn_dir(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    /// Rank (0-indexed) pawns of this color start on.
    #[inline]
    pub const fn pawn_home_rank(self) -> u8 {
        match self {
            Color::White => 1,
            Color::Black => 6,
        }
    }

    /// Rank pawns of this color promote on.
    #[inline]
    pub const fn promotion_rank(self) -> u8 {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }

    /// Rank en-passant targets land on for this color's pawn pushes.
    #[inline]
    pub const fn en_passant_rank(self) -> u8 {
        match self {
            Color::White => 2,
            Color::Black => 5,
        }
    }

    /// Back rank a king/rook of this color starts on.
    #[inline]
    pub const fn back_rank(self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }
}

/// Castling side, independent of color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, VariantArray)]
#[repr(u8)]
pub enum CastleSide {
    Kingside = 0,
    Queenside = 1,
}

impl CastleSide {
    #[inline]
    pub const fn ix(self) -> usize {
        self as usize
    }
}
