//! Perft against the known-good node counts, standard and Fischer-Random.
//!
//! The deep counts (S3, S4) take real wall-clock time under a debug build;
//! they're marked `#[ignore]` so the fast suite stays fast and a `cargo test
//! -- --ignored` run still covers them.

use chesstide::board::Position;

#[test]
fn starting_position_perft_depth_four() {
    let pos = Position::starting();
    assert_eq!(pos.perft(4), 197_281);
}

#[test]
fn starting_position_perft_depth_five() {
    let pos = Position::starting();
    assert_eq!(pos.perft(5), 4_865_609);
}

#[test]
fn kiwipete_perft_depth_four() {
    let pos = Position::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1").unwrap();
    assert_eq!(pos.perft(4), 4_085_603);
}

#[test]
#[ignore = "several seconds in a debug build"]
fn endgame_position_perft_depth_six() {
    let pos = Position::from_fen("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1").unwrap();
    assert_eq!(pos.perft(6), 11_030_083);
}

#[test]
#[ignore = "tens of seconds in a debug build"]
fn fischer_random_perft_depth_five() {
    let pos = Position::from_fen("bb3rkr/pq1p2pp/1p2pn2/2p2p2/2P2PnP/1P2PN2/PQBP1NP1/B4RKR w HFhf - 9 10").unwrap();
    assert!(pos.is_chess960());
    assert_eq!(pos.perft(5), 53_046_459);
}

#[test]
fn fen_round_trips_through_every_perft_three_leaf() {
    // S1, scaled down: every position reachable in 3 plies from the start
    // must re-parse to the FEN it printed.
    for pos in Position::starting().generate_sub_positions() {
        for grandchild in pos.generate_sub_positions() {
            for leaf in grandchild.generate_sub_positions() {
                let fen = leaf.to_fen();
                assert_eq!(Position::from_fen(&fen).unwrap().to_fen(), fen);
            }
        }
    }
}

#[test]
fn every_legal_move_leaves_the_mover_not_in_check() {
    for pos in [
        Position::starting(),
        Position::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1").unwrap(),
    ] {
        for mv in pos.generate_moves().iter() {
            let mut next = pos.copy_of();
            next.play(mv);
            assert!(!next.is_attacked(next.king_square(pos.side_to_move()), pos.side_to_move().opponent()));
        }
    }
}
