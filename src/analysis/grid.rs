//! The analysis grid: every `Output` an engine produced for a position,
//! keyed by (PV index, depth), with duplicates at the same key overwriting
//! in place.

use indexmap::IndexMap;

use crate::analysis::Output;
use crate::board::Move;

#[derive(Debug, Clone, Default)]
pub struct Analysis {
    grid: IndexMap<(u32, u32), Output>,
}

impl Analysis {
    pub fn new() -> Self {
        Self { grid: IndexMap::new() }
    }

    pub fn insert(&mut self, output: Output) {
        self.grid.insert((output.pv_index, output.depth), output);
    }

    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    pub fn size(&self) -> usize {
        self.grid.len()
    }

    /// Number of distinct PV rows populated.
    pub fn pivots(&self) -> usize {
        let mut seen: Vec<u32> = self.grid.keys().map(|(pv, _)| *pv).collect();
        seen.sort_unstable();
        seen.dedup();
        seen.len()
    }

    /// The deepest populated `Output` for `pv`, if any.
    pub fn best_output(&self, pv: u32) -> Option<&Output> {
        self.grid
            .iter()
            .filter(|((row, _), _)| *row == pv)
            .max_by_key(|((_, depth), _)| *depth)
            .map(|(_, output)| output)
    }

    /// The first PV move of [`Analysis::best_output`], or `NO_MOVE` absent
    /// any data for that row.
    pub fn best_move(&self, pv: u32) -> Move {
        self.best_output(pv).map(Output::best_move).unwrap_or(Move::NO_MOVE)
    }

    pub fn outputs(&self) -> impl Iterator<Item = &Output> {
        self.grid.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn best_output_picks_deepest_row() {
        let mut analysis = Analysis::new();
        analysis.insert(Output { pv_index: 1, depth: 5, ..Default::default() });
        analysis.insert(Output { pv_index: 1, depth: 10, ..Default::default() });
        analysis.insert(Output { pv_index: 2, depth: 3, ..Default::default() });
        assert_eq!(analysis.best_output(1).unwrap().depth, 10);
        assert_eq!(analysis.pivots(), 2);
        assert_eq!(analysis.size(), 3);
    }

    #[test]
    fn empty_grid_has_no_best_move() {
        let analysis = Analysis::new();
        assert!(analysis.is_empty());
        assert_eq!(analysis.best_move(1), crate::board::Move::NO_MOVE);
    }

    #[test]
    fn duplicate_key_overwrites() {
        let mut analysis = Analysis::new();
        analysis.insert(Output { pv_index: 1, depth: 1, nodes: Some(10), ..Default::default() });
        analysis.insert(Output { pv_index: 1, depth: 1, nodes: Some(20), ..Default::default() });
        assert_eq!(analysis.size(), 1);
        assert_eq!(analysis.best_output(1).unwrap().nodes, Some(20));
    }
}
