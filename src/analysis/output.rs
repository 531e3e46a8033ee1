//! A single engine reading: one `info` line's worth of search progress,
//! tagged with the PV row and depth it belongs to.

use serde::{Deserialize, Serialize};

use crate::analysis::Evaluation;
use crate::board::Move;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreBound {
    Exact,
    Lower,
    Upper,
}

/// Win/Draw/Loss percentages as reported by engines that support it,
/// summing to a fixed total (usually 1000, matching common UCI WDL scale).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wdl {
    pub win: u32,
    pub draw: u32,
    pub loss: u32,
}

impl Wdl {
    pub fn total(self) -> u32 {
        self.win + self.draw + self.loss
    }

    /// Win percentage against [`Wdl::total`], rounded to the nearest tenth
    /// of a percent.
    pub fn win_percent(self) -> f64 {
        if self.total() == 0 { 0.0 } else { 100.0 * self.win as f64 / self.total() as f64 }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Output {
    pub pv_index: u32,
    pub depth: u32,
    pub seldepth: Option<u32>,
    pub nodes: Option<u64>,
    pub nps: Option<u64>,
    pub time_ms: Option<u64>,
    pub evaluation: Option<Evaluation>,
    pub wdl: Option<Wdl>,
    pub bound: Option<ScoreBound>,
    pub pv: Vec<Move>,
}

impl Output {
    pub fn best_move(&self) -> Move {
        self.pv.first().copied().unwrap_or(Move::NO_MOVE)
    }

    pub fn is_bound(&self) -> bool {
        matches!(self.bound, Some(ScoreBound::Lower | ScoreBound::Upper))
    }

    pub fn wdl_percent(&self) -> Option<f64> {
        self.wdl.map(Wdl::win_percent)
    }
}
