//! SAN emit/parse round-trips through a handful of positions deep enough to
//! exercise disambiguation, captures, castling, and promotions together.

use chesstide::board::{Position, san_emit, san_parse};

fn assert_san_round_trips(fen: &str) {
    let pos = Position::from_fen(fen).unwrap_or_else(|e| panic!("{fen}: {e}"));
    for mv in pos.generate_moves().iter() {
        let text = san_emit(&pos, mv);
        let parsed = san_parse(&pos, &text).unwrap_or_else(|e| panic!("{fen} re-parsing {text:?}: {e}"));
        assert_eq!(parsed, mv, "{fen}: {text} round-tripped to a different move");
    }
}

#[test]
fn starting_position_round_trips() {
    assert_san_round_trips("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
}

#[test]
fn kiwipete_round_trips() {
    assert_san_round_trips("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
}

#[test]
fn promotion_with_and_without_capture_round_trips() {
    assert_san_round_trips("r3k3/1P6/8/8/8/8/p7/4K3 w - - 0 1");
}

#[test]
fn position_with_rook_disambiguation_round_trips() {
    assert_san_round_trips("6k1/8/8/8/R6R/8/8/R5K1 w - - 0 1");
}

#[test]
fn fischer_random_castling_round_trips() {
    assert_san_round_trips("bb3rkr/pq1p2pp/1p2pn2/2p2p2/2P2PnP/1P2PN2/PQBP1NP1/B4RKR w HFhf - 9 10");
}

#[test]
fn checkmate_move_emits_hash_suffix() {
    // Fool's mate: 1. f3 e5 2. g4 Qh4#
    let pos = Position::from_fen("rnbqkbnr/pppp1ppp/8/4p3/6P1/5P2/PPPPP2P/RNBQKBNR b KQkq - 0 2").unwrap();
    let mate = pos.generate_moves().iter().find(|m| m.to_uci() == "d8h4").expect("Qh4 is legal here");
    assert_eq!(san_emit(&pos, mate), "Qh4#");

    let mut after = pos.copy_of();
    after.play(mate);
    assert!(after.is_in_check());
    assert!(after.generate_moves().is_empty());
}
