//! Per-piece movement rules.
//!
//! Validation reads marginal probabilities and tags only; it never measures
//! or otherwise touches the quantum state.

use qchess_core::{Color, Piece, PieceKind, Square};
use qchess_sim::{CERTAINTY_EPSILON, QuantumStateSimulator};

use crate::outcome::ValidationOutcome;
use crate::record::CastlingRights;
use crate::request::MoveRequest;

use ValidationOutcome::{
    InvalidCastleConditions, InvalidNoPiece, InvalidPathBlocked, InvalidPieceMovement,
    InvalidWrongColor, Valid,
};

/// Read-only view of everything validation depends on.
#[derive(Debug, Clone, Copy)]
pub struct Position<'a> {
    pub sim: &'a QuantumStateSimulator,
    pub turn: Color,
    pub castling: CastlingRights,
    pub en_passant: Option<Square>,
}

impl Position<'_> {
    /// Check a request against the rules for the side to move.
    pub fn validate(&self, request: &MoveRequest) -> ValidationOutcome {
        let Some(piece) = self.tag(request.src) else {
            return InvalidNoPiece;
        };
        if piece.color != self.turn {
            return InvalidWrongColor;
        }
        if let Some(kind) = request.promotion {
            let legal = piece.kind == PieceKind::Pawn
                && kind.is_promotion_target()
                && !request.is_quantum()
                && request.dst.rank() == piece.color.promotion_rank();
            if !legal {
                return InvalidPieceMovement;
            }
        }

        match (request.src_second, request.dst_second) {
            (Some(rook_src), Some(rook_dst)) => {
                self.validate_written_castle(piece, request, rook_src, rook_dst)
            }
            (None, Some(d2)) => self.validate_split(piece, request.src, request.dst, d2),
            (Some(s2), None) => self.validate_merge(piece, request.src, s2, request.dst),
            (None, None) => self.validate_single(piece, request.src, request.dst),
        }
    }

    fn validate_single(&self, piece: Piece, src: Square, dst: Square) -> ValidationOutcome {
        if src == dst {
            return InvalidPieceMovement;
        }
        if let Some(other) = self.tag(dst) {
            if other.color == piece.color && self.is_certain(dst) {
                return InvalidPathBlocked;
            }
        }
        self.geometry(piece, src, dst, true)
    }

    fn validate_split(&self, piece: Piece, src: Square, d1: Square, d2: Square) -> ValidationOutcome {
        if piece.kind == PieceKind::Pawn || d1 == d2 || d1 == src || d2 == src {
            return InvalidPieceMovement;
        }
        for dst in [d1, d2] {
            let outcome = self.geometry(piece, src, dst, false);
            if !outcome.is_valid() {
                return outcome;
            }
            if self.tag(dst).is_some() {
                return InvalidPathBlocked;
            }
        }
        Valid
    }

    fn validate_merge(&self, piece: Piece, s1: Square, s2: Square, dst: Square) -> ValidationOutcome {
        if piece.kind == PieceKind::Pawn || s1 == s2 {
            return InvalidPieceMovement;
        }
        match self.tag(s2) {
            None => return InvalidNoPiece,
            Some(other) if other != piece => return InvalidPieceMovement,
            Some(_) => {}
        }
        if dst != s1 && dst != s2 && self.tag(dst).is_some() {
            return InvalidPathBlocked;
        }
        for src in [s1, s2] {
            if src == dst {
                continue;
            }
            let outcome = self.geometry(piece, src, dst, false);
            if !outcome.is_valid() {
                return outcome;
            }
        }
        Valid
    }

    /// `e1h1,g1f1`: the rook squares must be the ones the king move implies.
    fn validate_written_castle(
        &self,
        piece: Piece,
        request: &MoveRequest,
        rook_src: Square,
        rook_dst: Square,
    ) -> ValidationOutcome {
        if piece.kind != PieceKind::King {
            return InvalidPieceMovement;
        }
        match castle_rook_squares(request.dst) {
            Some((from, to)) if from == rook_src && to == rook_dst => {
                self.validate_single(piece, request.src, request.dst)
            }
            _ => InvalidPieceMovement,
        }
    }

    fn geometry(&self, piece: Piece, src: Square, dst: Square, allow_castle: bool) -> ValidationOutcome {
        let df = i8::try_from(dst.file()).unwrap_or(0) - i8::try_from(src.file()).unwrap_or(0);
        let dr = i8::try_from(dst.rank()).unwrap_or(0) - i8::try_from(src.rank()).unwrap_or(0);
        match piece.kind {
            PieceKind::Knight => {
                if matches!((df.abs(), dr.abs()), (1, 2) | (2, 1)) {
                    Valid
                } else {
                    InvalidPieceMovement
                }
            }
            PieceKind::King => {
                if df.abs() <= 1 && dr.abs() <= 1 {
                    Valid
                } else if allow_castle && dr == 0 && df.abs() == 2 {
                    self.validate_castle(piece.color, src, dst)
                } else {
                    InvalidPieceMovement
                }
            }
            PieceKind::Rook if df == 0 || dr == 0 => self.slide(src, dst),
            PieceKind::Bishop if df.abs() == dr.abs() => self.slide(src, dst),
            PieceKind::Queen if df == 0 || dr == 0 || df.abs() == dr.abs() => self.slide(src, dst),
            PieceKind::Pawn => self.validate_pawn(piece.color, src, dst, df, dr),
            _ => InvalidPieceMovement,
        }
    }

    fn slide(&self, src: Square, dst: Square) -> ValidationOutcome {
        match src.between(dst) {
            Some(path) if path.iter().all(|&sq| self.is_vacant(sq)) => Valid,
            Some(_) => InvalidPathBlocked,
            None => InvalidPieceMovement,
        }
    }

    fn validate_pawn(&self, color: Color, src: Square, dst: Square, df: i8, dr: i8) -> ValidationOutcome {
        let forward = color.forward();
        if df == 0 {
            // Squares that are only possibly occupied are measured when the
            // push is played.
            if dr == forward {
                return if self.is_certain(dst) {
                    InvalidPathBlocked
                } else {
                    Valid
                };
            }
            if dr == 2 * forward && src.rank() == color.pawn_rank() {
                let open = src
                    .offset(0, forward)
                    .is_some_and(|mid| !self.is_certain(mid) && !self.is_certain(dst));
                return if open { Valid } else { InvalidPathBlocked };
            }
            return InvalidPieceMovement;
        }
        if df.abs() == 1 && dr == forward {
            return match self.tag(dst) {
                Some(other) if other.color != color => Valid,
                None if self.en_passant == Some(dst) => Valid,
                _ => InvalidPieceMovement,
            };
        }
        InvalidPieceMovement
    }

    fn validate_castle(&self, color: Color, king: Square, dst: Square) -> ValidationOutcome {
        if king.rank() != color.back_rank() || king.file() != 4 {
            return InvalidPieceMovement;
        }
        let kingside = dst.file() > king.file();
        if !self.castling.allows(color, kingside) {
            return InvalidCastleConditions;
        }
        let Some((rook_sq, _)) = castle_rook_squares(dst) else {
            return InvalidPieceMovement;
        };
        let rook = Piece::new(PieceKind::Rook, color);
        if !self.is_certain(king) || self.tag(rook_sq) != Some(rook) || !self.is_certain(rook_sq) {
            return InvalidCastleConditions;
        }
        match king.between(rook_sq) {
            Some(path) if path.iter().all(|&sq| self.is_vacant(sq)) => Valid,
            _ => InvalidCastleConditions,
        }
    }

    pub fn tag(&self, square: Square) -> Option<Piece> {
        self.sim.tags()[square.index()]
    }

    pub fn probability(&self, square: Square) -> f64 {
        self.sim.probability(square.index()).unwrap_or(0.0)
    }

    /// Empty in every basis state.
    pub fn is_vacant(&self, square: Square) -> bool {
        self.probability(square) <= CERTAINTY_EPSILON
    }

    /// Occupied in every basis state.
    pub fn is_certain(&self, square: Square) -> bool {
        self.probability(square) >= 1.0 - CERTAINTY_EPSILON
    }
}

/// Rook source and destination for a castling king landing on `king_dst`.
pub fn castle_rook_squares(king_dst: Square) -> Option<(Square, Square)> {
    let rank = king_dst.rank();
    let (from, to) = match king_dst.file() {
        6 => (7, 5),
        2 => (0, 3),
        _ => return None,
    };
    Some((Square::new(from, rank).ok()?, Square::new(to, rank).ok()?))
}
