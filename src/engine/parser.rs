//! Parses UCI `info` and `bestmove` lines into [`Output`] values. Tolerant
//! of field reordering and missing optional tokens, per the wire format's
//! own looseness — an engine is free to omit `seldepth`, `nps`, `wdl`, and
//! so on from any given line.

use crate::analysis::{Evaluation, Output, ScoreBound, Wdl};
use crate::board::Move;

/// One tokenized `info` line. `None` when the line isn't an `info` line at
/// all (the caller should try [`parse_bestmove`] instead) or carries
/// neither `depth` nor `multipv` (too little to place it in the grid).
pub fn parse_info_line(line: &str) -> Option<Output> {
    let mut tokens = line.split_whitespace().peekable();
    if tokens.next()? != "info" {
        return None;
    }

    let mut output = Output { pv_index: 1, ..Output::default() };
    let mut centipawn: Option<i32> = None;
    let mut mate_in: Option<i32> = None;
    let mut have_depth = false;
    let mut have_multipv = false;

    while let Some(tok) = tokens.next() {
        match tok {
            "depth" => {
                output.depth = tokens.next()?.parse().ok()?;
                have_depth = true;
            }
            "seldepth" => output.seldepth = tokens.next()?.parse().ok(),
            "multipv" => {
                output.pv_index = tokens.next()?.parse().ok()?;
                have_multipv = true;
            }
            "nodes" => output.nodes = tokens.next()?.parse().ok(),
            "nps" => output.nps = tokens.next()?.parse().ok(),
            "time" => output.time_ms = tokens.next()?.parse().ok(),
            "hashfull" | "tbhits" | "currmove" | "currmovenumber" | "string" => {
                tokens.next();
            }
            "wdl" => {
                let win = tokens.next()?.parse().ok()?;
                let draw = tokens.next()?.parse().ok()?;
                let loss = tokens.next()?.parse().ok()?;
                output.wdl = Some(Wdl { win, draw, loss });
            }
            "score" => {
                match tokens.next()? {
                    "cp" => centipawn = tokens.next()?.parse().ok(),
                    "mate" => mate_in = tokens.next()?.parse().ok(),
                    _ => {}
                }
                match tokens.peek() {
                    Some(&"lowerbound") => {
                        output.bound = Some(ScoreBound::Lower);
                        tokens.next();
                    }
                    Some(&"upperbound") => {
                        output.bound = Some(ScoreBound::Upper);
                        tokens.next();
                    }
                    _ => output.bound.get_or_insert(ScoreBound::Exact),
                };
            }
            "pv" => {
                output.pv = tokens.by_ref().filter_map(|m| Move::parse_uci(m).ok()).collect();
                break;
            }
            _ => {}
        }
    }

    if !have_depth && !have_multipv {
        return None;
    }

    output.evaluation = match (mate_in, centipawn) {
        (Some(m), _) => Some(Evaluation::mate_in(m)),
        (None, Some(c)) => Some(Evaluation::centipawn(c)),
        (None, None) => None,
    };

    Some(output)
}

/// The `bestmove <move> [ponder <move>]` line that ends a search.
/// Returns `(bestmove, ponder)`.
pub fn parse_bestmove_line(line: &str) -> Option<(Move, Option<Move>)> {
    let mut tokens = line.split_whitespace();
    if tokens.next()? != "bestmove" {
        return None;
    }
    let best = Move::parse_uci(tokens.next()?).ok()?;
    let ponder = match tokens.next() {
        Some("ponder") => tokens.next().and_then(|m| Move::parse_uci(m).ok()),
        _ => None,
    };
    Some((best, ponder))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_info_line() {
        let line = "info depth 12 seldepth 18 multipv 1 score cp 34 nodes 123456 nps 800000 time 154 pv e2e4 e7e5";
        let output = parse_info_line(line).unwrap();
        assert_eq!(output.depth, 12);
        assert_eq!(output.seldepth, Some(18));
        assert_eq!(output.pv_index, 1);
        assert_eq!(output.evaluation.unwrap().as_centipawn(), Some(34));
        assert_eq!(output.nodes, Some(123456));
        assert_eq!(output.pv.len(), 2);
    }

    #[test]
    fn parses_reordered_fields() {
        let line = "info multipv 2 score mate 3 depth 9 pv g1f3";
        let output = parse_info_line(line).unwrap();
        assert_eq!(output.pv_index, 2);
        assert_eq!(output.depth, 9);
        assert_eq!(output.evaluation.unwrap().as_mate_in(), Some(3));
    }

    #[test]
    fn recognizes_score_bound() {
        let line = "info depth 5 score cp 10 upperbound pv e2e4";
        let output = parse_info_line(line).unwrap();
        assert!(output.is_bound());
    }

    #[test]
    fn ignores_non_info_lines() {
        assert!(parse_info_line("uciok").is_none());
        assert!(parse_info_line("readyok").is_none());
    }

    #[test]
    fn parses_bestmove_with_ponder() {
        let (best, ponder) = parse_bestmove_line("bestmove e2e4 ponder e7e5").unwrap();
        assert_eq!(best.to_uci(), "e2e4");
        assert_eq!(ponder.unwrap().to_uci(), "e7e5");
    }

    #[test]
    fn parses_bestmove_without_ponder() {
        let (best, ponder) = parse_bestmove_line("bestmove e2e4").unwrap();
        assert_eq!(best.to_uci(), "e2e4");
        assert!(ponder.is_none());
    }

    #[test]
    fn garbage_info_line_is_skipped_not_fatal() {
        assert!(parse_info_line("info this is not a real info line").is_none());
    }
}
