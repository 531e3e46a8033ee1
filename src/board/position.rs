//! The board state: placement, side to move, castling rights, en-passant
//! target, and the two clocks. Everything move generation and FEN I/O needs
//! lives here.

use std::fmt::{self, Display};
use std::str::FromStr;

use strum::VariantArray;

use crate::board::geometry::{GEOMETRY, Ray};
use crate::board::piece::PROMOTION_GENERATION_ORDER;
use crate::board::signature::Fnv1a;
use crate::board::{CastleSide, Color, Move, MoveList, Piece, PieceKind, PositionError, PositionSignature, Square};

/// The four castling rights, each either absent or the square of the rook
/// it covers. Indexed `[color][side]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct CastlingRights([[Option<Square>; 2]; 2]);

impl CastlingRights {
    pub fn get(&self, color: Color, side: CastleSide) -> Option<Square> {
        self.0[color.ix()][side.ix()]
    }

    pub fn set(&mut self, color: Color, side: CastleSide, rook: Option<Square>) {
        self.0[color.ix()][side.ix()] = rook;
    }

    pub fn clear(&mut self, color: Color, side: CastleSide) {
        self.set(color, side, None);
    }

    pub fn clear_color(&mut self, color: Color) {
        self.0[color.ix()] = [None, None];
    }

    pub fn any(&self, color: Color) -> bool {
        self.0[color.ix()].iter().any(Option::is_some)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Position {
    board: [Option<Piece>; 64],
    side_to_move: Color,
    castling: CastlingRights,
    king_squares: [Square; 2],
    en_passant: Option<Square>,
    halfmove_clock: u16,
    fullmove_number: u16,
    chess960: bool,
}

type CmpKey = ([Option<Piece>; 64], Color, bool, CastlingRights, Option<Square>, [Square; 2], u16, u16);

struct MoveMeta {
    moved_kind: PieceKind,
    captured: Option<Piece>,
    is_castle: bool,
    is_en_passant: bool,
}

impl Position {
    pub fn starting() -> Position {
        Position::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")
            .expect("hardcoded starting FEN is valid")
    }

    pub fn from_fen(fen: &str) -> Result<Position, PositionError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if !(4..=6).contains(&fields.len()) {
            return Err(PositionError::InvalidFen {
                field: "fen",
                reason: format!("expected 4 to 6 space-separated fields, found {}", fields.len()),
            });
        }

        let board = parse_placement(fields[0])?;
        let side_to_move = parse_side(fields[1])?;
        let king_squares = find_kings(&board)?;
        let (castling, chess960) = parse_castling_field(fields[2], king_squares)?;
        let en_passant = parse_en_passant_field(fields[3])?;
        let halfmove_clock = parse_optional_u16(fields.get(4), "halfmove clock", 0)?;
        let fullmove_number = parse_optional_u16(fields.get(5), "fullmove number", 1)?.max(1);

        let position = Position {
            board,
            side_to_move,
            castling,
            king_squares,
            en_passant,
            halfmove_clock,
            fullmove_number,
            chess960,
        };
        position.validate_invariants()?;
        Ok(position)
    }

    pub fn to_fen(&self) -> String {
        let mut out = String::with_capacity(64);
        for rank_ix in 0..8usize {
            if rank_ix > 0 {
                out.push('/');
            }
            let mut empties = 0u32;
            for file in 0..8u8 {
                match self.board[rank_ix * 8 + file as usize] {
                    None => empties += 1,
                    Some(piece) => {
                        if empties > 0 {
                            out.push_str(&empties.to_string());
                            empties = 0;
                        }
                        out.push(piece.fen_char());
                    }
                }
            }
            if empties > 0 {
                out.push_str(&empties.to_string());
            }
        }

        out.push(' ');
        out.push(if self.side_to_move.is_white() { 'w' } else { 'b' });
        out.push(' ');
        out.push_str(&self.castling_field());
        out.push(' ');
        match self.en_passant {
            Some(sq) => out.push_str(&sq.to_string()),
            None => out.push('-'),
        }
        out.push(' ');
        out.push_str(&self.halfmove_clock.to_string());
        out.push(' ');
        out.push_str(&self.fullmove_number.to_string());
        out
    }

    fn castling_field(&self) -> String {
        if !self.castling.any(Color::White) && !self.castling.any(Color::Black) {
            return "-".to_string();
        }
        let mut s = String::new();
        if self.chess960 {
            for color in [Color::White, Color::Black] {
                for side in [CastleSide::Kingside, CastleSide::Queenside] {
                    if let Some(rook_sq) = self.castling.get(color, side) {
                        let letter = (b'a' + rook_sq.file()) as char;
                        s.push(if color.is_white() { letter.to_ascii_uppercase() } else { letter });
                    }
                }
            }
        } else {
            for (right, ch) in [
                (self.castling.get(Color::White, CastleSide::Kingside), 'K'),
                (self.castling.get(Color::White, CastleSide::Queenside), 'Q'),
                (self.castling.get(Color::Black, CastleSide::Kingside), 'k'),
                (self.castling.get(Color::Black, CastleSide::Queenside), 'q'),
            ] {
                if right.is_some() {
                    s.push(ch);
                }
            }
        }
        s
    }

    pub fn copy_of(&self) -> Position {
        *self
    }

    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.board[sq.ix()]
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn king_square(&self, color: Color) -> Square {
        self.king_squares[color.ix()]
    }

    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    pub fn halfmove_clock(&self) -> u16 {
        self.halfmove_clock
    }

    pub fn fullmove_number(&self) -> u16 {
        self.fullmove_number
    }

    pub fn is_chess960(&self) -> bool {
        self.chess960
    }

    pub fn castling_right(&self, color: Color, side: CastleSide) -> Option<Square> {
        self.castling.get(color, side)
    }

    pub fn is_attacked(&self, sq: Square, by: Color) -> bool {
        square_attacked(&self.board, sq, by)
    }

    pub fn is_in_check(&self) -> bool {
        let mover = self.side_to_move;
        self.is_attacked(self.king_squares[mover.ix()], mover.opponent())
    }

    /// Whether `mv` is a castling move in either of its accepted encodings:
    /// king-captures-own-rook (Fischer-Random) or the standard two-square
    /// king hop.
    pub fn is_castling_move(&self, mv: Move) -> bool {
        let from = mv.from_square();
        let to = mv.to_square();
        let Some(moved) = self.board[from.ix()] else { return false };
        if moved.kind != PieceKind::King {
            return false;
        }
        let is_capture_own_rook = self.board[to.ix()] == Some(Piece::new(moved.color, PieceKind::Rook));
        let is_two_square = from.rank() == moved.color.back_rank()
            && to.rank() == moved.color.back_rank()
            && (to.file() as i8 - from.file() as i8).abs() == 2;
        is_capture_own_rook || is_two_square
    }

    pub fn castling_side_of(&self, mv: Move) -> Option<CastleSide> {
        if !self.is_castling_move(mv) {
            return None;
        }
        Some(if mv.to_square().file() > mv.from_square().file() { CastleSide::Kingside } else { CastleSide::Queenside })
    }

    /// Every legal move for the side to move, in the order: en-passant
    /// captures, castlings, then board-order piece moves.
    pub fn generate_moves(&self) -> MoveList {
        let mut moves = MoveList::new();
        self.generate_en_passant_captures(&mut moves);
        self.generate_castles(&mut moves);

        let side = self.side_to_move;
        for ix in 0..64u8 {
            let sq = Square::new(ix);
            let Some(piece) = self.board[sq.ix()] else { continue };
            if piece.color != side {
                continue;
            }
            match piece.kind {
                PieceKind::Pawn => self.generate_pawn_moves(sq, &mut moves),
                PieceKind::Knight => self.generate_stepper_moves(sq, GEOMETRY.knight_jumps(sq), &mut moves),
                PieceKind::King => self.generate_stepper_moves(sq, GEOMETRY.king_neighbors(sq), &mut moves),
                PieceKind::Bishop => self.generate_slider_moves(sq, GEOMETRY.diagonal_rays(sq), &mut moves),
                PieceKind::Rook => self.generate_slider_moves(sq, GEOMETRY.orthogonal_rays(sq), &mut moves),
                PieceKind::Queen => {
                    self.generate_slider_moves(sq, GEOMETRY.diagonal_rays(sq), &mut moves);
                    self.generate_slider_moves(sq, GEOMETRY.orthogonal_rays(sq), &mut moves);
                }
            }
        }
        moves
    }

    fn generate_en_passant_captures(&self, moves: &mut MoveList) {
        let Some(ep) = self.en_passant else { return };
        let side = self.side_to_move;
        let back = -side.pawn_dir();
        for df in [-1i8, 1i8] {
            let Some(from) = ep.offset(df, back) else { continue };
            let Some(piece) = self.board[from.ix()] else { continue };
            if piece.color == side && piece.kind == PieceKind::Pawn {
                self.push_if_legal(side, Move::of(from, ep), moves);
            }
        }
    }

    fn generate_castles(&self, moves: &mut MoveList) {
        let side = self.side_to_move;
        let king_sq = self.king_squares[side.ix()];
        if self.is_attacked(king_sq, side.opponent()) {
            return;
        }
        for castle_side in CastleSide::VARIANTS.iter().copied() {
            let Some(rook_sq) = self.castling.get(side, castle_side) else { continue };
            if self.board[rook_sq.ix()] != Some(Piece::new(side, PieceKind::Rook)) {
                continue;
            }
            let back_rank = side.back_rank();
            let (king_file, rook_file) = match castle_side {
                CastleSide::Kingside => (6u8, 5u8),
                CastleSide::Queenside => (2u8, 3u8),
            };
            let king_target = Square::from_file_rank(king_file, back_rank);
            let rook_target = Square::from_file_rank(rook_file, back_rank);

            if !self.castling_path_clear(king_sq, king_target, rook_sq, rook_target, side) {
                continue;
            }

            self.push_if_legal(side, Move::of(king_sq, rook_sq), moves);
        }
    }

    fn castling_path_clear(
        &self,
        king_sq: Square,
        king_target: Square,
        rook_sq: Square,
        rook_target: Square,
        side: Color,
    ) -> bool {
        let opponent = side.opponent();
        let back_rank = side.back_rank();

        for file in inclusive_range(king_sq.file(), king_target.file()) {
            if file == king_sq.file() {
                continue;
            }
            let sq = Square::from_file_rank(file, back_rank);
            if sq != rook_sq && self.board[sq.ix()].is_some() {
                return false;
            }
            if self.is_attacked(sq, opponent) {
                return false;
            }
        }

        for file in inclusive_range(rook_sq.file(), rook_target.file()) {
            let sq = Square::from_file_rank(file, back_rank);
            if sq != rook_sq && sq != king_sq && self.board[sq.ix()].is_some() {
                return false;
            }
        }

        true
    }

    fn generate_pawn_moves(&self, from: Square, moves: &mut MoveList) {
        let side = self.side_to_move;
        let pushes = GEOMETRY.pawn_pushes(side, from);
        if let Some(&one) = pushes.first() {
            if self.board[one.ix()].is_none() {
                self.emit_pawn_move(side, from, one, moves);
                if let Some(&two) = pushes.get(1) {
                    if self.board[two.ix()].is_none() {
                        self.emit_pawn_move(side, from, two, moves);
                    }
                }
            }
        }
        for &cap in GEOMETRY.pawn_captures(side, from) {
            if let Some(target) = self.board[cap.ix()] {
                if target.color != side {
                    self.emit_pawn_move(side, from, cap, moves);
                }
            }
        }
    }

    fn emit_pawn_move(&self, side: Color, from: Square, to: Square, moves: &mut MoveList) {
        if to.rank() == side.promotion_rank() {
            for promo in PROMOTION_GENERATION_ORDER {
                self.push_if_legal(side, Move::with_promotion(from, to, promo), moves);
            }
        } else {
            self.push_if_legal(side, Move::of(from, to), moves);
        }
    }

    fn generate_stepper_moves(&self, from: Square, targets: &[Square], moves: &mut MoveList) {
        let side = self.side_to_move;
        for &to in targets {
            if self.board[to.ix()].map(|p| p.color) != Some(side) {
                self.push_if_legal(side, Move::of(from, to), moves);
            }
        }
    }

    fn generate_slider_moves(&self, from: Square, rays: &[Ray; 4], moves: &mut MoveList) {
        let side = self.side_to_move;
        for ray in rays {
            for &to in ray {
                match self.board[to.ix()] {
                    None => self.push_if_legal(side, Move::of(from, to), moves),
                    Some(p) if p.color != side => {
                        self.push_if_legal(side, Move::of(from, to), moves);
                        break;
                    }
                    Some(_) => break,
                }
            }
        }
    }

    fn push_if_legal(&self, mover: Color, mv: Move, moves: &mut MoveList) {
        if self.candidate_leaves_king_safe(mv, mover) {
            moves.push(mv);
        }
    }

    fn candidate_leaves_king_safe(&self, mv: Move, mover: Color) -> bool {
        let mut scratch = *self;
        scratch.apply_move_pieces(mv);
        !square_attacked(&scratch.board, scratch.king_squares[mover.ix()], mover.opponent())
    }

    /// Moves board/king-square state only: no clock, rights, en-passant, or
    /// side-to-move bookkeeping. Shared by legality testing (on a scratch
    /// copy) and [`Position::play`].
    fn apply_move_pieces(&mut self, mv: Move) -> MoveMeta {
        let from = mv.from_square();
        let to = mv.to_square();
        let moved = self.board[from.ix()].expect("play() requires a piece on the move's source square");
        let mover = moved.color;

        let is_castle_capture = self.board[to.ix()] == Some(Piece::new(mover, PieceKind::Rook));
        let is_castle_two_square = moved.kind == PieceKind::King
            && from.rank() == mover.back_rank()
            && to.rank() == mover.back_rank()
            && (to.file() as i8 - from.file() as i8).abs() == 2;
        let is_castle = moved.kind == PieceKind::King && (is_castle_capture || is_castle_two_square);

        if is_castle {
            let castle_side = if to.file() > from.file() { CastleSide::Kingside } else { CastleSide::Queenside };
            let rook_from = if is_castle_capture { to } else { self.castling.get(mover, castle_side).unwrap_or(to) };
            let back_rank = mover.back_rank();
            let (king_file, rook_file) = match castle_side {
                CastleSide::Kingside => (6u8, 5u8),
                CastleSide::Queenside => (2u8, 3u8),
            };
            let king_target = Square::from_file_rank(king_file, back_rank);
            let rook_target = Square::from_file_rank(rook_file, back_rank);

            self.board[from.ix()] = None;
            self.board[rook_from.ix()] = None;
            self.board[king_target.ix()] = Some(Piece::new(mover, PieceKind::King));
            self.board[rook_target.ix()] = Some(Piece::new(mover, PieceKind::Rook));
            self.king_squares[mover.ix()] = king_target;

            return MoveMeta { moved_kind: PieceKind::King, captured: None, is_castle: true, is_en_passant: false };
        }

        let is_en_passant = moved.kind == PieceKind::Pawn
            && Some(to) == self.en_passant
            && self.board[to.ix()].is_none()
            && to.file() != from.file();

        if is_en_passant {
            let captured_sq = Square::from_file_rank(to.file(), (to.rank() as i8 - mover.pawn_dir()) as u8);
            let captured = self.board[captured_sq.ix()];
            self.board[captured_sq.ix()] = None;
            self.board[from.ix()] = None;
            self.board[to.ix()] = Some(moved);
            return MoveMeta { moved_kind: PieceKind::Pawn, captured, is_castle: false, is_en_passant: true };
        }

        let captured = self.board[to.ix()];
        self.board[from.ix()] = None;
        let placed = match mv.promotion() {
            Some(promo) => Piece::new(mover, promo.kind()),
            None => moved,
        };
        self.board[to.ix()] = Some(placed);
        if moved.kind == PieceKind::King {
            self.king_squares[mover.ix()] = to;
        }

        MoveMeta { moved_kind: moved.kind, captured, is_castle: false, is_en_passant: false }
    }

    /// Applies `mv` in place and returns `self`. `mv` must be one this
    /// position's [`Position::generate_moves`] could have produced (legality
    /// is not re-checked here).
    pub fn play(&mut self, mv: Move) -> &mut Self {
        let side = self.side_to_move;
        let from = mv.from_square();
        let to = mv.to_square();
        let meta = self.apply_move_pieces(mv);

        self.en_passant = None;
        if meta.moved_kind == PieceKind::Pawn
            && !meta.is_en_passant
            && (to.rank() as i8 - from.rank() as i8).abs() == 2
        {
            let candidate_ep = Square::from_file_rank(from.file(), (from.rank() as i8 + side.pawn_dir()) as u8);
            let opponent = side.opponent();
            let back = -opponent.pawn_dir();
            let capturable = [-1i8, 1i8].into_iter().any(|df| {
                candidate_ep
                    .offset(df, back)
                    .is_some_and(|sq| self.board[sq.ix()] == Some(Piece::new(opponent, PieceKind::Pawn)))
            });
            if capturable {
                self.en_passant = Some(candidate_ep);
            }
        }

        if meta.moved_kind == PieceKind::King {
            self.castling.clear_color(side);
        }
        if meta.moved_kind == PieceKind::Rook {
            for cs in CastleSide::VARIANTS.iter().copied() {
                if self.castling.get(side, cs) == Some(from) {
                    self.castling.clear(side, cs);
                }
            }
        }
        if let Some(captured) = meta.captured {
            let opponent = side.opponent();
            if captured.color == opponent && captured.kind == PieceKind::Rook {
                for cs in CastleSide::VARIANTS.iter().copied() {
                    if self.castling.get(opponent, cs) == Some(to) {
                        self.castling.clear(opponent, cs);
                    }
                }
            }
        }

        if meta.moved_kind == PieceKind::Pawn || meta.captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }

        if side.is_black() {
            self.fullmove_number += 1;
        }

        self.side_to_move = side.opponent();
        self
    }

    pub fn perft(&self, depth: u32) -> u64 {
        if depth == 0 {
            return 1;
        }
        let moves = self.generate_moves();
        if depth == 1 {
            return moves.len() as u64;
        }
        moves
            .iter()
            .map(|mv| {
                let mut next = *self;
                next.play(mv);
                next.perft(depth - 1)
            })
            .sum()
    }

    /// Per-root-move node counts at `depth` plies, in generation order —
    /// the diagnostic breakdown `perft` itself discards.
    pub fn perft_divide(&self, depth: u32) -> Vec<(Move, u64)> {
        self.generate_moves()
            .iter()
            .map(|mv| {
                let mut next = *self;
                next.play(mv);
                let nodes = if depth == 0 { 1 } else { next.perft(depth - 1) };
                (mv, nodes)
            })
            .collect()
    }

    pub fn generate_sub_positions(&self) -> Vec<Position> {
        self.generate_moves()
            .iter()
            .map(|mv| {
                let mut next = *self;
                next.play(mv);
                next
            })
            .collect()
    }

    pub fn signature(&self) -> PositionSignature {
        let mut h = Fnv1a::new();
        for sq in self.board {
            match sq {
                None => h.write_u8(0),
                Some(p) => h.write_u8(1 + p.color.ix() as u8 * 6 + p.kind.ix() as u8),
            }
        }
        h.write_u8(self.side_to_move.ix() as u8);
        h.write_u8(self.chess960 as u8);
        for color in [Color::White, Color::Black] {
            for side in [CastleSide::Kingside, CastleSide::Queenside] {
                h.write_u8(self.castling.get(color, side).map_or(0xFF, Square::u8));
            }
        }
        h.write_u8(self.en_passant.map_or(0xFF, Square::u8));
        h.write_u8(self.king_squares[0].u8());
        h.write_u8(self.king_squares[1].u8());
        h.write(&self.halfmove_clock.to_le_bytes());
        h.write(&self.fullmove_number.to_le_bytes());
        PositionSignature(h.finish())
    }

    fn cmp_key(&self) -> CmpKey {
        (
            self.board,
            self.side_to_move,
            self.chess960,
            self.castling,
            self.en_passant,
            self.king_squares,
            self.halfmove_clock,
            self.fullmove_number,
        )
    }

    fn validate_invariants(&self) -> Result<(), PositionError> {
        let mut king_count = [0u8; 2];
        let mut pawn_count = [0u8; 2];
        for ix in 0..64usize {
            let Some(piece) = self.board[ix] else { continue };
            match piece.kind {
                PieceKind::King => {
                    king_count[piece.color.ix()] += 1;
                    if self.king_squares[piece.color.ix()].ix() != ix {
                        return Err(PositionError::InvariantViolation(
                            "king-square tracker disagrees with board contents",
                        ));
                    }
                }
                PieceKind::Pawn => {
                    pawn_count[piece.color.ix()] += 1;
                    let rank = Square::new(ix as u8).rank();
                    if rank == 0 || rank == 7 {
                        return Err(PositionError::InvariantViolation("pawn on the first or last rank"));
                    }
                }
                _ => {}
            }
        }
        if king_count != [1, 1] {
            return Err(PositionError::InvariantViolation("position must have exactly one king per color"));
        }
        if pawn_count[0] > 8 || pawn_count[1] > 8 {
            return Err(PositionError::InvariantViolation("more than eight pawns for one color"));
        }

        let mover = self.side_to_move;
        if self.is_attacked(self.king_squares[mover.opponent().ix()], mover) {
            return Err(PositionError::InvariantViolation("the side not to move is in check"));
        }

        if let Some(ep) = self.en_passant {
            let expected_rank = mover.opponent().en_passant_rank();
            if ep.rank() != expected_rank {
                return Err(PositionError::InvariantViolation(
                    "en-passant target is on the wrong rank for the side to move",
                ));
            }
            let captured_sq = Square::from_file_rank(ep.file(), (ep.rank() as i8 - mover.pawn_dir()) as u8);
            if self.board[captured_sq.ix()] != Some(Piece::new(mover.opponent(), PieceKind::Pawn)) {
                return Err(PositionError::InvariantViolation(
                    "en-passant target has no captured pawn behind it",
                ));
            }
            let back = -mover.pawn_dir();
            let has_capture = [-1i8, 1i8].into_iter().any(|df| {
                ep.offset(df, back)
                    .is_some_and(|sq| self.board[sq.ix()] == Some(Piece::new(mover, PieceKind::Pawn)))
            });
            if !has_capture {
                return Err(PositionError::InvariantViolation(
                    "en-passant target is set but no pseudo-legal capture reaches it",
                ));
            }
        }

        for color in [Color::White, Color::Black] {
            for side in CastleSide::VARIANTS.iter().copied() {
                let Some(rook_sq) = self.castling.get(color, side) else { continue };
                if self.board[rook_sq.ix()] != Some(Piece::new(color, PieceKind::Rook)) {
                    return Err(PositionError::InvariantViolation(
                        "castling right does not point at an own rook",
                    ));
                }
                if !self.chess960 && self.king_squares[color.ix()] != Square::from_file_rank(4, color.back_rank()) {
                    return Err(PositionError::InvariantViolation(
                        "standard castling right requires the king on its home square",
                    ));
                }
            }
        }

        Ok(())
    }
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.cmp_key() == other.cmp_key()
    }
}

impl Eq for Position {}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.cmp_key().cmp(&other.cmp_key())
    }
}

impl std::hash::Hash for Position {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.cmp_key().hash(state);
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_fen())
    }
}

impl FromStr for Position {
    type Err = PositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Position::from_fen(s)
    }
}

fn inclusive_range(a: u8, b: u8) -> std::ops::RangeInclusive<u8> {
    if a <= b { a..=b } else { b..=a }
}

fn square_attacked(board: &[Option<Piece>; 64], sq: Square, by: Color) -> bool {
    if GEOMETRY
        .knight_jumps(sq)
        .iter()
        .any(|&s| board[s.ix()] == Some(Piece::new(by, PieceKind::Knight)))
    {
        return true;
    }
    if GEOMETRY
        .king_neighbors(sq)
        .iter()
        .any(|&s| board[s.ix()] == Some(Piece::new(by, PieceKind::King)))
    {
        return true;
    }
    // A pawn of `by` attacks `sq` iff `sq` is one of that pawn's capture
    // targets; equivalently, walk the *opposite*-color capture table from
    // `sq` looking for one of `by`'s pawns.
    if GEOMETRY
        .pawn_captures(by.opponent(), sq)
        .iter()
        .any(|&s| board[s.ix()] == Some(Piece::new(by, PieceKind::Pawn)))
    {
        return true;
    }
    for ray in GEOMETRY.diagonal_rays(sq) {
        for &s in ray {
            match board[s.ix()] {
                Some(p) if p.color == by && matches!(p.kind, PieceKind::Bishop | PieceKind::Queen) => return true,
                Some(_) => break,
                None => continue,
            }
        }
    }
    for ray in GEOMETRY.orthogonal_rays(sq) {
        for &s in ray {
            match board[s.ix()] {
                Some(p) if p.color == by && matches!(p.kind, PieceKind::Rook | PieceKind::Queen) => return true,
                Some(_) => break,
                None => continue,
            }
        }
    }
    false
}

fn parse_placement(field: &str) -> Result<[Option<Piece>; 64], PositionError> {
    let ranks: Vec<&str> = field.split('/').collect();
    if ranks.len() != 8 {
        return Err(PositionError::InvalidFen {
            field: "placement",
            reason: format!("expected 8 ranks separated by '/', found {}", ranks.len()),
        });
    }
    let mut board = [None; 64];
    for (rank_ix, rank_str) in ranks.iter().enumerate() {
        let mut file = 0u32;
        for c in rank_str.chars() {
            if file >= 8 {
                return Err(PositionError::InvalidFen {
                    field: "placement",
                    reason: "rank has more than 8 files".into(),
                });
            }
            if let Some(d) = c.to_digit(10).filter(|d| (1..=8).contains(d)) {
                file += d;
            } else if let Some(piece) = Piece::from_fen_char(c) {
                board[rank_ix * 8 + file as usize] = Some(piece);
                file += 1;
            } else {
                return Err(PositionError::InvalidFen {
                    field: "placement",
                    reason: format!("unexpected character {c:?}"),
                });
            }
        }
        if file != 8 {
            return Err(PositionError::InvalidFen {
                field: "placement",
                reason: "a rank does not account for exactly 8 files".into(),
            });
        }
    }
    Ok(board)
}

fn parse_side(field: &str) -> Result<Color, PositionError> {
    match field {
        "w" => Ok(Color::White),
        "b" => Ok(Color::Black),
        _ => Err(PositionError::InvalidFen { field: "side to move", reason: format!("expected w or b, found {field:?}") }),
    }
}

fn find_kings(board: &[Option<Piece>; 64]) -> Result<[Square; 2], PositionError> {
    let mut found = [None; 2];
    for (ix, sq) in board.iter().enumerate() {
        if let Some(piece) = sq {
            if piece.kind == PieceKind::King {
                if found[piece.color.ix()].is_some() {
                    return Err(PositionError::InvariantViolation("more than one king for one color"));
                }
                found[piece.color.ix()] = Some(Square::new(ix as u8));
            }
        }
    }
    match (found[0], found[1]) {
        (Some(w), Some(b)) => Ok([w, b]),
        _ => Err(PositionError::InvariantViolation("both colors must have exactly one king")),
    }
}

fn parse_castling_field(field: &str, king_squares: [Square; 2]) -> Result<(CastlingRights, bool), PositionError> {
    let mut rights = CastlingRights::default();
    if field == "-" {
        return Ok((rights, false));
    }

    if !field.is_empty() && field.chars().all(|c| "KQkq".contains(c)) {
        let canonical = ['K', 'Q', 'k', 'q'];
        let mut last_rank = 0usize;
        for c in field.chars() {
            let rank = canonical.iter().position(|&o| o == c).expect("checked above");
            if rank < last_rank {
                return Err(PositionError::InvalidFen {
                    field: "castling",
                    reason: "KQkq letters must appear in canonical order".into(),
                });
            }
            last_rank = rank;
            let (color, side, file) = match c {
                'K' => (Color::White, CastleSide::Kingside, 7u8),
                'Q' => (Color::White, CastleSide::Queenside, 0u8),
                'k' => (Color::Black, CastleSide::Kingside, 7u8),
                'q' => (Color::Black, CastleSide::Queenside, 0u8),
                _ => unreachable!(),
            };
            rights.set(color, side, Some(Square::from_file_rank(file, color.back_rank())));
        }
        return Ok((rights, false));
    }

    let mut seen: [Vec<CastleSide>; 2] = [Vec::new(), Vec::new()];
    for c in field.chars() {
        if !c.is_ascii_alphabetic() {
            return Err(PositionError::InvalidFen {
                field: "castling",
                reason: format!("unexpected character {c:?}"),
            });
        }
        let color = if c.is_ascii_uppercase() { Color::White } else { Color::Black };
        let file = c.to_ascii_lowercase() as u8 - b'a';
        if file > 7 {
            return Err(PositionError::InvalidFen {
                field: "castling",
                reason: "Chess960 castling letter must be a file a-h".into(),
            });
        }
        let king_file = king_squares[color.ix()].file();
        let side = match file.cmp(&king_file) {
            std::cmp::Ordering::Greater => CastleSide::Kingside,
            std::cmp::Ordering::Less => CastleSide::Queenside,
            std::cmp::Ordering::Equal => {
                return Err(PositionError::InvalidFen {
                    field: "castling",
                    reason: "castling rook cannot share the king's file".into(),
                });
            }
        };
        if seen[color.ix()].contains(&side) {
            return Err(PositionError::InvalidFen { field: "castling", reason: "duplicate castling right".into() });
        }
        if side == CastleSide::Kingside && seen[color.ix()].contains(&CastleSide::Queenside) {
            return Err(PositionError::InvalidFen {
                field: "castling",
                reason: "a color's kingside letter must precede its queenside letter".into(),
            });
        }
        seen[color.ix()].push(side);
        rights.set(color, side, Some(Square::from_file_rank(file, color.back_rank())));
    }
    Ok((rights, true))
}

fn parse_en_passant_field(field: &str) -> Result<Option<Square>, PositionError> {
    if field == "-" {
        return Ok(None);
    }
    Square::from_str(field).map(Some)
}

fn parse_optional_u16(field: Option<&&str>, name: &'static str, default: u16) -> Result<u16, PositionError> {
    match field {
        None => Ok(default),
        Some(s) => s
            .parse::<u16>()
            .map_err(|_| PositionError::InvalidFen { field: name, reason: format!("{s:?} is not a valid count") }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_position_fen_round_trips() {
        let pos = Position::starting();
        assert_eq!(pos.to_fen(), "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
    }

    #[test]
    fn starting_position_has_twenty_legal_moves() {
        assert_eq!(Position::starting().generate_moves().len(), 20);
    }

    #[test]
    fn perft_one_equals_move_count() {
        let pos = Position::starting();
        assert_eq!(pos.perft(1), pos.generate_moves().len() as u64);
    }

    #[test]
    fn perft_zero_is_one() {
        assert_eq!(Position::starting().perft(0), 1);
    }

    #[test]
    fn perft_depth_three_matches_known_value() {
        assert_eq!(Position::starting().perft(3), 8902);
    }

    #[test]
    fn kiwipete_perft_depth_two() {
        let pos = Position::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .unwrap();
        assert_eq!(pos.perft(2), 2039);
    }

    #[test]
    fn fischer_random_fen_round_trips() {
        let fen = "bb3rkr/pq1p2pp/1p2pn2/2p2p2/2P2PnP/1P2PN2/PQBP1NP1/B4RKR w HFhf - 9 10";
        let pos = Position::from_fen(fen).unwrap();
        assert!(pos.is_chess960());
        assert_eq!(pos.to_fen(), fen);
    }

    #[test]
    fn signature_is_stable_across_clones() {
        let pos = Position::starting();
        assert_eq!(pos.signature(), pos.copy_of().signature());
    }

    #[test]
    fn en_passant_capture_resets_halfmove_clock() {
        let mut pos = Position::from_fen("8/8/8/4p3/3P4/8/8/k6K w - - 0 1").unwrap();
        let capture = pos.generate_moves().iter().find(|m| m.to_uci() == "d4e5").expect("capture present");
        pos.play(capture);
        assert_eq!(pos.halfmove_clock(), 0);
    }

    #[test]
    fn queenside_castle_is_legal_from_kiwipete_like_setup() {
        let fen = "r3k2r/pppqbppp/2npbn2/4p3/4P3/2NPBN2/PPPQBPPP/R3K2R w KQkq - 6 8";
        let pos = Position::from_fen(fen).unwrap();
        let moves = pos.generate_moves();
        assert!(moves.iter().any(|m| m.from_square() == Square::E1 && m.to_square() == Square::A1));
    }

    #[test]
    fn rejects_malformed_fen() {
        assert!(Position::from_fen("not a fen").is_err());
    }
}
