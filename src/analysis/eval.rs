//! Position evaluations: either a centipawn score or a forced mate in N
//! plies, ordered the way engines expect ("more winning" always compares
//! greater).

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// `centipawn` and `mate_in` are mutually exclusive in practice, but both
/// are kept so an [`Evaluation`] round-trips whichever tag an engine sent
/// without losing information; `valid` flags a default/unset reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    centipawn: Option<i32>,
    mate_in: Option<i32>,
    valid: bool,
}

impl Evaluation {
    pub fn centipawn(score: i32) -> Evaluation {
        Evaluation { centipawn: Some(score), mate_in: None, valid: true }
    }

    pub fn mate_in(plies: i32) -> Evaluation {
        Evaluation { centipawn: None, mate_in: Some(plies), valid: true }
    }

    pub fn invalid() -> Evaluation {
        Evaluation { centipawn: None, mate_in: None, valid: false }
    }

    pub fn is_valid(self) -> bool {
        self.valid
    }

    pub fn as_centipawn(self) -> Option<i32> {
        self.centipawn
    }

    pub fn as_mate_in(self) -> Option<i32> {
        self.mate_in
    }

    pub fn is_mate(self) -> bool {
        self.mate_in.is_some()
    }

    /// Negates the magnitude of whichever tag is set, for flipping an
    /// evaluation between the two sides' points of view.
    pub fn inverted(self) -> Evaluation {
        Evaluation {
            centipawn: self.centipawn.map(|c| -c),
            mate_in: self.mate_in.map(|m| -m),
            valid: self.valid,
        }
    }

    /// A single rank usable for total ordering: mate-in-positive-small is
    /// the most beneficial outcome, mate-in-negative-small the least.
    fn rank(self) -> (i8, i64) {
        match (self.mate_in, self.centipawn) {
            (Some(m), _) if m > 0 => (2, -(m as i64)),
            (Some(m), _) => (-2, -(m as i64)),
            (_, Some(c)) => (0, c as i64),
            (None, None) => (i8::MIN, 0),
        }
    }
}

impl PartialOrd for Evaluation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Evaluation {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mate_in_one_beats_any_centipawn_score() {
        assert!(Evaluation::mate_in(1) > Evaluation::centipawn(10_000));
    }

    #[test]
    fn losing_mate_is_worse_than_losing_centipawns() {
        assert!(Evaluation::mate_in(-1) < Evaluation::centipawn(-500));
    }

    #[test]
    fn shorter_winning_mate_beats_longer_one() {
        assert!(Evaluation::mate_in(1) > Evaluation::mate_in(5));
    }

    #[test]
    fn inversion_flips_sign() {
        assert_eq!(Evaluation::centipawn(120).inverted().as_centipawn(), Some(-120));
        assert_eq!(Evaluation::mate_in(3).inverted().as_mate_in(), Some(-3));
    }
}
