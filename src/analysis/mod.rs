//! Engine analysis: the depth×PV grid an [`Output`] populates, and the
//! filter DSL compiled against it.

mod eval;
mod filter;
mod grid;
mod output;

pub use eval::Evaluation;
pub use filter::{Filter, FilterError};
pub use grid::Analysis;
pub use output::{Output, ScoreBound, Wdl};
