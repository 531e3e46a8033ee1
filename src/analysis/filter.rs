//! A small boolean expression language over an [`Analysis`] grid.
//!
//! Grammar (whitespace-insensitive):
//!
//! ```text
//! expr   ::= and_expr ( "OR" and_expr )*
//! and_expr ::= atom ( "AND" atom )*
//! atom   ::= "(" expr ")" | leaf
//! leaf   ::= "pv" INT cmp value
//! cmp    ::= ">=" | "<=" | "=" | ">" | "<"
//! value  ::= "mate" INT | INT
//! ```
//!
//! A leaf reads the deepest [`Output`](crate::analysis::Output) recorded
//! for the named PV row and compares its evaluation against the threshold.
//! A PV row with no recorded output makes its leaf false.

use chumsky::prelude::*;
use thiserror::Error;

use crate::analysis::{Analysis, Evaluation};

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("could not parse filter expression {text:?}: {reason}")]
    ParseError { text: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CompareOp {
    Gt,
    Ge,
    Lt,
    Le,
    Eq,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LeafValue {
    Centipawn(i32),
    MateIn(i32),
}

impl LeafValue {
    fn as_evaluation(self) -> Evaluation {
        match self {
            LeafValue::Centipawn(c) => Evaluation::centipawn(c),
            LeafValue::MateIn(m) => Evaluation::mate_in(m),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Leaf {
    pv: u32,
    op: CompareOp,
    value: LeafValue,
}

impl Leaf {
    fn evaluate(self, analysis: &Analysis) -> bool {
        let Some(output) = analysis.best_output(self.pv) else { return false };
        let Some(actual) = output.evaluation else { return false };
        let threshold = self.value.as_evaluation();
        match self.op {
            CompareOp::Gt => actual > threshold,
            CompareOp::Ge => actual >= threshold,
            CompareOp::Lt => actual < threshold,
            CompareOp::Le => actual <= threshold,
            CompareOp::Eq => actual == threshold,
        }
    }
}

/// A tree of leaves combined by AND / OR gates, parsed once and evaluated
/// against as many grids as needed.
#[derive(Debug, Clone)]
pub enum Filter {
    Leaf(LeafNode),
    And(Box<Filter>, Box<Filter>),
    Or(Box<Filter>, Box<Filter>),
}

#[derive(Debug, Clone, Copy)]
pub struct LeafNode(Leaf);

impl Filter {
    pub fn parse(text: &str) -> Result<Filter, FilterError> {
        filter_parser().then_ignore(end()).parse(text).into_result().map_err(|errs| FilterError::ParseError {
            text: text.to_owned(),
            reason: errs.into_iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "),
        })
    }

    /// Evaluates leaves against `analysis` once, short-circuiting gates in
    /// definition order.
    pub fn evaluate(&self, analysis: &Analysis) -> bool {
        match self {
            Filter::Leaf(LeafNode(leaf)) => leaf.evaluate(analysis),
            Filter::And(a, b) => a.evaluate(analysis) && b.evaluate(analysis),
            Filter::Or(a, b) => a.evaluate(analysis) || b.evaluate(analysis),
        }
    }
}

fn int_parser<'s>() -> impl Parser<'s, &'s str, i32, extra::Err<Rich<'s, char>>> {
    just('-')
        .or_not()
        .then(one_of('0'..='9').repeated().at_least(1).to_slice())
        .map(|(neg, digits): (Option<char>, &str)| {
            let n: i32 = digits.parse().expect("digit-only slice parses as i32");
            if neg.is_some() { -n } else { n }
        })
}

fn op_parser<'s>() -> impl Parser<'s, &'s str, CompareOp, extra::Err<Rich<'s, char>>> {
    choice((
        just(">=").to(CompareOp::Ge),
        just("<=").to(CompareOp::Le),
        just("==").to(CompareOp::Eq),
        just('=').to(CompareOp::Eq),
        just('>').to(CompareOp::Gt),
        just('<').to(CompareOp::Lt),
    ))
}

fn value_parser<'s>() -> impl Parser<'s, &'s str, LeafValue, extra::Err<Rich<'s, char>>> {
    choice((just("mate").ignore_then(int_parser()).map(LeafValue::MateIn), int_parser().map(LeafValue::Centipawn)))
}

fn leaf_parser<'s>() -> impl Parser<'s, &'s str, Filter, extra::Err<Rich<'s, char>>> {
    just("pv")
        .ignore_then(one_of('0'..='9').repeated().at_least(1).to_slice())
        .then(op_parser().padded())
        .then(value_parser())
        .map(|((pv, op), value)| {
            let pv: u32 = pv.parse().expect("digit-only slice parses as u32");
            Filter::Leaf(LeafNode(Leaf { pv, op, value }))
        })
        .labelled("leaf predicate (e.g. pv1>200)")
}

fn filter_parser<'s>() -> impl Parser<'s, &'s str, Filter, extra::Err<Rich<'s, char>>> {
    recursive(|expr| {
        let atom = choice((
            expr.clone().delimited_by(just('(').padded(), just(')').padded()),
            leaf_parser().padded(),
        ));

        let and_expr = atom.clone().foldl(just("AND").padded().ignore_then(atom).repeated(), |a, b| {
            Filter::And(Box::new(a), Box::new(b))
        });

        and_expr.clone().foldl(just("OR").padded().ignore_then(and_expr).repeated(), |a, b| {
            Filter::Or(Box::new(a), Box::new(b))
        })
    })
    .padded()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Output;
    use crate::board::Move;

    fn grid_with(pv: u32, depth: u32, cp: i32) -> Analysis {
        let mut analysis = Analysis::new();
        analysis.insert(Output {
            pv_index: pv,
            depth,
            evaluation: Some(Evaluation::centipawn(cp)),
            pv: vec![Move::NO_MOVE],
            ..Default::default()
        });
        analysis
    }

    #[test]
    fn simple_leaf_parses_and_evaluates() {
        let filter = Filter::parse("pv1>200").unwrap();
        assert!(filter.evaluate(&grid_with(1, 10, 250)));
        assert!(!filter.evaluate(&grid_with(1, 10, 150)));
    }

    #[test]
    fn and_gate_requires_both() {
        let filter = Filter::parse("pv1>200 AND pv2<50").unwrap();
        let mut grid = grid_with(1, 10, 250);
        grid.insert(Output { pv_index: 2, depth: 10, evaluation: Some(Evaluation::centipawn(10)), ..Default::default() });
        assert!(filter.evaluate(&grid));
    }

    #[test]
    fn or_gate_is_true_if_either_child_is() {
        let filter = Filter::parse("pv1>900 OR pv1<1000").unwrap();
        assert!(filter.evaluate(&grid_with(1, 10, 250)));
    }

    #[test]
    fn parens_group_precedence() {
        let filter = Filter::parse("(pv1>0 OR pv1<0) AND pv1=250").unwrap();
        assert!(filter.evaluate(&grid_with(1, 10, 250)));
    }

    #[test]
    fn missing_pv_row_is_false() {
        let filter = Filter::parse("pv3>0").unwrap();
        assert!(!filter.evaluate(&grid_with(1, 10, 250)));
    }

    #[test]
    fn rejects_garbage() {
        assert!(Filter::parse("not a filter").is_err());
    }
}
