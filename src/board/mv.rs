//! Packed 16-bit move values.
//!
//! bits 0..5 = from, bits 6..11 = to, bits 12..14 = promotion code
//! (0 = none, 1..4 = knight..queen), bit 15 reserved zero. `NO_MOVE` is the
//! all-ones pattern. Surfaced as `Option<Move>` only at API boundaries —
//! internally the sentinel is kept for packed-storage efficiency, per the
//! board subsystem's hot-path convention.

use std::fmt::{self, Display};
use std::str::FromStr;

use chumsky::prelude::*;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::board::{PositionError, Promotion, Square};

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Move(u16);

impl Move {
    pub const NO_MOVE: Move = Move(0xFFFF);

    #[inline]
    pub const fn of(from: Square, to: Square) -> Move {
        Move((from.u8() as u16) | ((to.u8() as u16) << 6))
    }

    #[inline]
    pub const fn with_promotion(from: Square, to: Square, promotion: Promotion) -> Move {
        Move((from.u8() as u16) | ((to.u8() as u16) << 6) | ((promotion.code()) << 12))
    }

    #[inline]
    pub const fn is_no_move(self) -> bool {
        self.0 == Move::NO_MOVE.0
    }

    #[inline]
    pub const fn from_square(self) -> Square {
        Square::new((self.0 & 0x3F) as u8)
    }

    #[inline]
    pub const fn to_square(self) -> Square {
        Square::new(((self.0 >> 6) & 0x3F) as u8)
    }

    #[inline]
    pub const fn promotion(self) -> Option<Promotion> {
        Promotion::from_code((self.0 >> 12) & 0x7)
    }

    #[inline]
    pub const fn is_promotion(self) -> bool {
        (self.0 >> 12) & 0x7 != 0
    }

    #[inline]
    pub const fn is_underpromotion(self) -> bool {
        matches!((self.0 >> 12) & 0x7, 1 | 2 | 3)
    }

    /// The reverse move, swapping from/to and dropping any promotion.
    /// `reverse(reverse(m)) == m` for any non-promoting move.
    #[inline]
    pub const fn reverse(self) -> Move {
        Move::of(self.to_square(), self.from_square())
    }

    /// Validated construction: rejects out-of-range squares (impossible at
    /// this type, `Square` is always 0..=63) and promotion codes above queen.
    pub fn try_new(from: u8, to: u8, promotion: u16) -> Result<Move, PositionError> {
        if from > 63 || to > 63 {
            return Err(PositionError::InvalidMove {
                text: format!("from={from} to={to}"),
                reason: "square index out of range 0..=63",
            });
        }
        if promotion > 4 {
            return Err(PositionError::InvalidMove {
                text: format!("promotion={promotion}"),
                reason: "promotion code out of range 0..=4",
            });
        }
        let from = Square::new(from);
        let to = Square::new(to);
        Ok(match Promotion::from_code(promotion) {
            Some(p) => Move::with_promotion(from, to, p),
            None => Move::of(from, to),
        })
    }

    pub fn parse_uci(s: &str) -> Result<Move, PositionError> {
        if s == "0000" {
            return Ok(Move::NO_MOVE);
        }
        uci_move_parser()
            .then_ignore(end())
            .parse(s)
            .into_result()
            .map_err(|_| PositionError::InvalidMove {
                text: s.to_owned(),
                reason: "expected UCI move shape e2e4 or a7a8q",
            })
    }

    pub fn to_uci(self) -> String {
        self.to_string()
    }
}

fn uci_move_parser<'s>() -> impl Parser<'s, &'s str, Move, extra::Err<Rich<'s, char>>> {
    Square::parser()
        .then(Square::parser())
        .then(uci_promotion().or_not())
        .map(|((from, to), promo)| match promo {
            Some(p) => Move::with_promotion(from, to, p),
            None => Move::of(from, to),
        })
}

fn uci_promotion<'s>() -> impl Parser<'s, &'s str, Promotion, extra::Err<Rich<'s, char>>> {
    use Promotion::*;
    choice((
        just('n').to(Knight),
        just('b').to(Bishop),
        just('r').to(Rook),
        just('q').to(Queen),
    ))
}

impl Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_no_move() {
            return f.write_str("0000");
        }
        write!(f, "{}{}", self.from_square(), self.to_square())?;
        if let Some(p) = self.promotion() {
            write!(f, "{}", p.uci_letter())?;
        }
        Ok(())
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({self})")
    }
}

impl FromStr for Move {
    type Err = PositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Move::parse_uci(s)
    }
}

/// Serialized as its UCI string, matching the wire representation used
/// throughout the JSON record boundary (`spec`'s "moves are UCI strings").
impl Serialize for Move {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Move {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Move::parse_uci(&s).map_err(serde::de::Error::custom)
    }
}

impl PartialOrd for Move {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Move {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.from_square(), self.to_square(), self.promotion())
            .cmp(&(other.from_square(), other.to_square(), other.promotion()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uci_round_trip() {
        let m = Move::parse_uci("e7e8q").unwrap();
        assert_eq!(m.to_uci(), "e7e8q");
        assert_eq!(m.promotion(), Some(Promotion::Queen));
    }

    #[test]
    fn no_move_round_trip() {
        assert_eq!(Move::parse_uci("0000").unwrap(), Move::NO_MOVE);
        assert_eq!(Move::NO_MOVE.to_uci(), "0000");
    }

    #[test]
    fn reverse_is_involution() {
        let m = Move::parse_uci("e2e4").unwrap();
        assert_eq!(m.reverse().reverse(), m);
    }

    #[test]
    fn rejects_bad_shape() {
        assert!(Move::parse_uci("z9z9").is_err());
        assert!(Move::parse_uci("e2e4x").is_err());
    }

    #[test]
    fn serializes_as_uci_string() {
        let m = Move::parse_uci("e7e8q").unwrap();
        assert_eq!(serde_json::to_string(&m).unwrap(), "\"e7e8q\"");
        let back: Move = serde_json::from_str("\"e7e8q\"").unwrap();
        assert_eq!(back, m);
    }
}
