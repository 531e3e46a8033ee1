//! A growable, insertion-ordered container of moves with uniform-random
//! selection, used both as the legal-move buffer and as the mining loop's
//! frontier-expansion scratch space.

use rand::Rng;
use rand::seq::IndexedRandom;

use crate::board::Move;

#[derive(Debug, Clone, Default)]
pub struct MoveList(Vec<Move>);

impl MoveList {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self(Vec::with_capacity(cap))
    }

    #[inline]
    pub fn push(&mut self, m: Move) {
        self.0.push(m);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn get(&self, ix: usize) -> Option<Move> {
        self.0.get(ix).copied()
    }

    #[inline]
    pub fn remove(&mut self, ix: usize) -> Move {
        self.0.remove(ix)
    }

    #[inline]
    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = Move> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[Move] {
        &self.0
    }

    /// Pick one move uniformly at random. `None` for an empty list.
    pub fn pick_random<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Move> {
        self.0.choose(rng).copied()
    }

    pub fn contains(&self, m: Move) -> bool {
        self.0.contains(&m)
    }
}

impl FromIterator<Move> for MoveList {
    fn from_iter<T: IntoIterator<Item = Move>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for MoveList {
    type Item = Move;
    type IntoIter = std::vec::IntoIter<Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = Move;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, Move>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter().copied()
    }
}
