//! Random seed positions for the mining loop's `infinite` refill step:
//! either the standard starting position nudged by a short random walk, or
//! a Chess960 setup built by the usual bishops-opposite-colors,
//! king-between-rooks construction.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::board::{PieceKind, Position};

/// Generates `count` random starting positions, Chess960 setups when
/// `chess960` is set, otherwise short random walks from the standard
/// starting position.
pub fn generate_seeds<R: Rng + ?Sized>(rng: &mut R, count: usize, chess960: bool) -> Vec<Position> {
    (0..count).map(|_| if chess960 { random_chess960_start(rng) } else { random_walk_start(rng) }).collect()
}

/// The standard starting position walked forward 0..=6 random plies, so
/// repeated calls seed varied but still opening-like positions.
pub fn random_walk_start<R: Rng + ?Sized>(rng: &mut R) -> Position {
    let mut position = Position::starting();
    let plies = rng.random_range(0..=6u32);
    for _ in 0..plies {
        let moves = position.generate_moves();
        let Some(mv) = moves.pick_random(rng) else { break };
        position.play(mv);
    }
    position
}

/// A random Chess960 back rank: two bishops on opposite-color squares, the
/// king strictly between the two rooks, via rejection sampling over
/// shuffles of the eight-piece multiset.
pub fn random_chess960_start<R: Rng + ?Sized>(rng: &mut R) -> Position {
    let back_rank = loop {
        let mut pieces = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        pieces.shuffle(rng);
        if is_valid_chess960_rank(&pieces) {
            break pieces;
        }
    };

    Position::from_fen(&chess960_fen(&back_rank)).expect("generated Chess960 back rank is a legal FEN")
}

fn is_valid_chess960_rank(pieces: &[PieceKind; 8]) -> bool {
    let bishops: Vec<usize> =
        pieces.iter().enumerate().filter(|(_, k)| **k == PieceKind::Bishop).map(|(i, _)| i).collect();
    if bishops[0] % 2 == bishops[1] % 2 {
        return false;
    }
    let rooks: Vec<usize> = pieces.iter().enumerate().filter(|(_, k)| **k == PieceKind::Rook).map(|(i, _)| i).collect();
    let king = pieces.iter().position(|k| *k == PieceKind::King).expect("exactly one king in the multiset");
    rooks[0] < king && king < rooks[1]
}

fn chess960_fen(back_rank: &[PieceKind; 8]) -> String {
    let black_rank: String = back_rank.iter().map(|k| kind_letter(*k)).collect();
    let white_rank = black_rank.to_ascii_uppercase();

    let rook_files: Vec<u8> =
        back_rank.iter().enumerate().filter(|(_, k)| **k == PieceKind::Rook).map(|(i, _)| i as u8).collect();
    let queenside_file = (b'a' + rook_files[0]) as char;
    let kingside_file = (b'a' + rook_files[1]) as char;
    let castling: String = [
        kingside_file.to_ascii_uppercase(),
        queenside_file.to_ascii_uppercase(),
        kingside_file.to_ascii_lowercase(),
        queenside_file.to_ascii_lowercase(),
    ]
    .into_iter()
    .collect();

    format!("{black_rank}/pppppppp/8/8/8/8/PPPPPPPP/{white_rank} w {castling} - 0 1")
}

fn kind_letter(kind: PieceKind) -> char {
    match kind {
        PieceKind::Pawn => 'p',
        PieceKind::Knight => 'n',
        PieceKind::Bishop => 'b',
        PieceKind::Rook => 'r',
        PieceKind::Queen => 'q',
        PieceKind::King => 'k',
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn pi_rng() -> SmallRng {
        SmallRng::from_seed(*b"3.141592653589793238462643383279")
    }

    #[test]
    fn random_walk_produces_a_legal_position() {
        let mut rng = pi_rng();
        for _ in 0..20 {
            let position = random_walk_start(&mut rng);
            assert!(!position.generate_moves().is_empty() || position.is_in_check());
        }
    }

    #[test]
    fn chess960_start_has_bishops_on_opposite_colors() {
        let mut rng = pi_rng();
        for _ in 0..50 {
            let position = random_chess960_start(&mut rng);
            assert!(position.is_chess960());
            assert_eq!(position.generate_moves().len(), 20);
        }
    }

    #[test]
    fn generate_seeds_respects_count() {
        let mut rng = pi_rng();
        assert_eq!(generate_seeds(&mut rng, 5, false).len(), 5);
        assert_eq!(generate_seeds(&mut rng, 3, true).len(), 3);
    }
}
