//! Standard Algebraic Notation: emitting it from a legal move, parsing it
//! back against a position's legal move list, and cleaning up movetext
//! lifted from a PGN-like source.

use std::iter::Peekable;
use std::str::Chars;

use crate::board::{CastleSide, Move, Piece, PieceKind, Position, PositionError, Square};

pub fn emit(position: &Position, mv: Move) -> String {
    if let Some(side) = position.castling_side_of(mv) {
        let base = match side {
            CastleSide::Kingside => "O-O",
            CastleSide::Queenside => "O-O-O",
        };
        return append_check_suffix(position, mv, base.to_string());
    }

    let from = mv.from_square();
    let to = mv.to_square();
    let moved = position.piece_at(from).expect("SAN emit requires a legal move");
    let is_pawn = moved.kind == PieceKind::Pawn;
    let is_en_passant = is_pawn && Some(to) == position.en_passant() && to.file() != from.file();
    let is_capture = position.piece_at(to).is_some() || is_en_passant;

    let mut s = String::new();
    if !is_pawn {
        s.push(piece_letter(moved.kind));
        disambiguate(position, mv, moved, &mut s);
    } else if is_capture {
        s.push(file_char(from.file()));
    }

    if is_capture {
        s.push('x');
    }
    s.push_str(&to.to_string());

    if let Some(promo) = mv.promotion() {
        s.push('=');
        s.push(promo.san_letter());
    }

    append_check_suffix(position, mv, s)
}

pub fn parse(position: &Position, text: &str) -> Result<Move, PositionError> {
    let cleaned: String = text.chars().filter(|c| *c != '!' && *c != '?').collect();
    position
        .generate_moves()
        .iter()
        .find(|&mv| emit(position, mv) == cleaned)
        .ok_or_else(|| PositionError::InvalidSan { text: text.to_owned() })
}

fn piece_letter(kind: PieceKind) -> char {
    match kind {
        PieceKind::Knight => 'N',
        PieceKind::Bishop => 'B',
        PieceKind::Rook => 'R',
        PieceKind::Queen => 'Q',
        PieceKind::King => 'K',
        PieceKind::Pawn => unreachable!("pawns carry no SAN piece letter"),
    }
}

fn file_char(file: u8) -> char {
    (b'a' + file) as char
}

fn rank_char(rank: u8) -> char {
    (b'1' + rank) as char
}

/// Disambiguates `mv` among other legal moves of the same piece landing on
/// the same square: file if that alone resolves it, else rank, else both.
fn disambiguate(position: &Position, mv: Move, moved: Piece, s: &mut String) {
    let from = mv.from_square();
    let to = mv.to_square();
    let alternates: Vec<Square> = position
        .generate_moves()
        .iter()
        .filter(|&m| m != mv && m.to_square() == to && position.piece_at(m.from_square()) == Some(moved))
        .map(|m| m.from_square())
        .collect();

    if alternates.is_empty() {
        return;
    }
    let file_clash = alternates.iter().any(|a| a.file() == from.file());
    let rank_clash = alternates.iter().any(|a| a.rank() == from.rank());

    if !file_clash {
        s.push(file_char(from.file()));
    } else if !rank_clash {
        s.push(rank_char(from.rank()));
    } else {
        s.push(file_char(from.file()));
        s.push(rank_char(from.rank()));
    }
}

fn append_check_suffix(position: &Position, mv: Move, mut s: String) -> String {
    let mut next = position.copy_of();
    next.play(mv);
    if next.is_in_check() {
        s.push(if next.generate_moves().is_empty() { '#' } else { '+' });
    }
    s
}

/// Strips block comments (`{...}`), line comments (`;...`), numeric
/// annotation glyphs (`$N`), move-number indicators (`12.`, `12...`), and
/// result tokens (`1-0`, `0-1`, `1/2-1/2`, `*`) from raw movetext, leaving
/// bare moves separated by single spaces. When `keep_variations` is false,
/// `(...)` sub-variations are dropped entirely; otherwise their parentheses
/// are kept and their contents cleaned the same way.
pub fn strip_movetext(text: &str, keep_variations: bool) -> String {
    let mut out = String::new();
    strip_into(&mut text.chars().peekable(), &mut out, keep_variations, true);
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_into(chars: &mut Peekable<Chars<'_>>, out: &mut String, keep_variations: bool, top_level: bool) {
    while let Some(&c) = chars.peek() {
        match c {
            '{' => {
                chars.next();
                for c in chars.by_ref() {
                    if c == '}' {
                        break;
                    }
                }
            }
            ';' => {
                chars.next();
                while let Some(&c) = chars.peek() {
                    if c == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            '$' => {
                chars.next();
                while chars.peek().is_some_and(|c| c.is_ascii_digit()) {
                    chars.next();
                }
            }
            '(' => {
                chars.next();
                if keep_variations {
                    out.push('(');
                    strip_into(chars, out, keep_variations, false);
                    out.push(')');
                } else {
                    let mut depth = 1u32;
                    for c in chars.by_ref() {
                        match c {
                            '(' => depth += 1,
                            ')' => {
                                depth -= 1;
                                if depth == 0 {
                                    break;
                                }
                            }
                            _ => {}
                        }
                    }
                }
            }
            ')' => {
                if top_level {
                    chars.next();
                } else {
                    return;
                }
            }
            c if c.is_whitespace() => {
                out.push(' ');
                chars.next();
            }
            _ => {
                let token = take_token(chars);
                if !is_move_number(&token) && !is_result_token(&token) {
                    out.push_str(&token);
                    out.push(' ');
                }
            }
        }
    }
}

fn take_token(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut token = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_whitespace() || matches!(c, '{' | ';' | '$' | '(' | ')') {
            break;
        }
        token.push(c);
        chars.next();
    }
    token
}

fn is_move_number(token: &str) -> bool {
    let trimmed = token.trim_end_matches('.');
    !trimmed.is_empty() && trimmed.len() != token.len() && trimmed.chars().all(|c| c.is_ascii_digit())
}

fn is_result_token(token: &str) -> bool {
    matches!(token, "1-0" | "0-1" | "1/2-1/2" | "*")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_simple_pawn_push() {
        let pos = Position::starting();
        let mv = Move::parse_uci("e2e4").unwrap();
        assert_eq!(emit(&pos, mv), "e4");
    }

    #[test]
    fn emits_queenside_castle() {
        let fen = "r3k2r/pppqbppp/2npbn2/4p3/4P3/2NPBN2/PPPQBPPP/R3K2R w KQkq - 6 8";
        let pos = Position::from_fen(fen).unwrap();
        let mv = Move::of(Square::E1, Square::A1);
        assert_eq!(emit(&pos, mv), "O-O-O");
    }

    #[test]
    fn parse_round_trips_emit() {
        let pos = Position::starting();
        for mv in pos.generate_moves().iter() {
            let text = emit(&pos, mv);
            assert_eq!(parse(&pos, &text).unwrap(), mv);
        }
    }

    #[test]
    fn strips_comments_and_move_numbers() {
        let cleaned = strip_movetext("1. e4 {best by test} e5 2. Nf3 Nc6 *", false);
        assert_eq!(cleaned, "e4 e5 Nf3 Nc6");
    }

    #[test]
    fn drops_variations_when_requested() {
        let cleaned = strip_movetext("1. e4 (1. d4 d5) e5", false);
        assert_eq!(cleaned, "e4 e5");
    }

    #[test]
    fn keeps_variation_parens_when_requested() {
        let cleaned = strip_movetext("1. e4 (1. d4 d5) e5", true);
        assert_eq!(cleaned, "e4 ( d4 d5 ) e5");
    }
}
