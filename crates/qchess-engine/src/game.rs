//! The game: one quantum board plus chess bookkeeping.

use std::fmt;

use chrono::{DateTime, Utc};
use qchess_core::{BitVector, Color, Piece, PieceKind, STANDARD_TAGS, Square};
use qchess_sim::{Capture, Controls, QuantumStateSimulator};
use rand::Rng;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::moves;
use crate::notation::MoveCommand;
use crate::outcome::ValidationOutcome;
use crate::record::{CapturedPiece, CastlingRights, MoveRecord, MoveType};
use crate::request::MoveRequest;
use crate::rules::{Position, castle_rook_squares};
use crate::snapshot::{GameSnapshot, GameStatus, SquareState};

/// A quantum chess game.
///
/// Owns the simulator and all bookkeeping. Moves are validated against the
/// marginal probabilities, then translated into gates and measurements.
#[derive(Debug, Clone)]
pub struct MoveEngine {
    id: Uuid,
    config: EngineConfig,
    initial_occupancy: BitVector,
    initial_tags: String,
    sim: QuantumStateSimulator,
    turn: Color,
    move_count: u32,
    history: Vec<MoveRecord>,
    captured: Vec<CapturedPiece>,
    castling: CastlingRights,
    en_passant: Option<Square>,
    status: GameStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl MoveEngine {
    /// Standard position with an entropy seed.
    pub fn new() -> EngineResult<Self> {
        Self::from_config(&EngineConfig::default())
    }

    /// Standard position with a fixed seed.
    pub fn with_seed(seed: u64) -> EngineResult<Self> {
        Self::from_config(&EngineConfig::seeded(seed))
    }

    /// Standard position with explicit settings.
    pub fn from_config(config: &EngineConfig) -> EngineResult<Self> {
        Self::from_position(
            BitVector::standard_starting_position(),
            STANDARD_TAGS,
            config.clone(),
        )
    }

    /// Custom position given as occupancy plus tags in index order.
    ///
    /// Castling rights are granted where king and rook stand on their home
    /// squares.
    pub fn from_position(
        occupancy: BitVector,
        tags: &str,
        config: EngineConfig,
    ) -> EngineResult<Self> {
        let sim = QuantumStateSimulator::new(occupancy, tags, config.seed)?;
        let castling = home_castling_rights(&sim);
        let now = Utc::now();
        let engine = Self {
            id: Uuid::new_v4(),
            config,
            initial_occupancy: occupancy,
            initial_tags: tags.to_string(),
            sim,
            turn: Color::White,
            move_count: 0,
            history: Vec::new(),
            captured: Vec::new(),
            castling,
            en_passant: None,
            status: GameStatus::Ongoing,
            created_at: now,
            updated_at: now,
        };
        info!(game = %engine.id, seed = engine.seed(), "Created game");
        Ok(engine)
    }

    /// Custom position from a list such as `"e1K e8k a1R"`.
    pub fn from_board(board: &str, config: EngineConfig) -> EngineResult<Self> {
        let sim = QuantumStateSimulator::from_board(board, config.seed)?;
        let mut occupancy = BitVector::EMPTY;
        let mut tags = String::new();
        for (index, tag) in sim.tags().iter().enumerate() {
            if let Some(piece) = tag {
                occupancy = occupancy.set(index, true)?;
                tags.push(piece.to_char());
            }
        }
        Self::from_position(occupancy, &tags, config)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Side to move.
    pub fn current_player(&self) -> Color {
        self.turn
    }

    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    pub fn captured(&self) -> &[CapturedPiece] {
        &self.captured
    }

    pub fn castling_rights(&self) -> CastlingRights {
        self.castling
    }

    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Seed of the measurement random source.
    pub fn seed(&self) -> u64 {
        self.sim.seed()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn simulator(&self) -> &QuantumStateSimulator {
        &self.sim
    }

    /// Tag and occupation probability of a square.
    pub fn piece_at(&self, square: Square) -> SquareState {
        let position = self.position();
        SquareState {
            square,
            piece: position.tag(square),
            probability: position.probability(square),
        }
    }

    /// Always false; check detection is not implemented.
    pub fn is_check(&self, _color: Color) -> bool {
        false
    }

    /// Always false; check detection is not implemented.
    pub fn is_checkmate(&self, _color: Color) -> bool {
        false
    }

    /// Always false; check detection is not implemented.
    pub fn is_stalemate(&self, _color: Color) -> bool {
        false
    }

    fn position(&self) -> Position<'_> {
        Position {
            sim: &self.sim,
            turn: self.turn,
            castling: self.castling,
            en_passant: self.en_passant,
        }
    }

    // =========================================================================
    // Moves
    // =========================================================================

    /// Check a move for the side to move without changing anything.
    pub fn validate_move(&self, request: &MoveRequest) -> ValidationOutcome {
        self.position().validate(request)
    }

    /// Check a move given as raw square indices.
    pub fn validate_indices(&self, src: usize, dst: usize) -> ValidationOutcome {
        match (Square::from_index(src), Square::from_index(dst)) {
            (Ok(src), Ok(dst)) => self.validate_move(&MoveRequest::new(src, dst)),
            _ => ValidationOutcome::InvalidOutOfBounds,
        }
    }

    /// Every move the side to move may play.
    pub fn legal_moves(&self) -> Vec<MoveRequest> {
        if self.status.is_over() {
            return Vec::new();
        }
        moves::legal_moves(&self.position())
    }

    /// Pick a legal move at random, preferring splits and merges with
    /// probability `split_weight`.
    pub fn random_move<R: Rng + ?Sized>(&self, split_weight: f64, rng: &mut R) -> Option<MoveRequest> {
        moves::choose_random(&self.legal_moves(), split_weight, rng)
    }

    /// Parse and play a notation command such as `b1,a3c3` or `d1,d7,1`.
    pub fn play_command(&mut self, command: &str) -> EngineResult<MoveRecord> {
        let command = MoveCommand::parse(command)?;
        self.sim.force_outcomes(command.outcomes);
        self.make_move(command.request)
    }

    /// Validate and play a move.
    ///
    /// A rejected move leaves the game unchanged, including one whose forced
    /// outcomes contradict a certain measurement. Forced outcomes queued on the
    /// simulator are consumed by this move's measurements in order and any
    /// left over are discarded.
    #[instrument(skip(self, request), fields(request = %request))]
    pub fn make_move(&mut self, request: MoveRequest) -> EngineResult<MoveRecord> {
        if let Err(err) = self.check_playable(&request) {
            self.sim.clear_forced();
            return Err(err);
        }
        let piece = self
            .position()
            .tag(request.src)
            .ok_or(EngineError::IllegalMove(ValidationOutcome::InvalidNoPiece))?;

        let before = self.sim.clone();
        let (move_type, capture, played) = match self.play_gates(request, piece) {
            Ok(played) => played,
            Err(err) => {
                warn!(%request, error = %err, "Move failed, state restored");
                self.sim = before;
                self.sim.clear_forced();
                return Err(err);
            }
        };

        let unused = self.sim.clear_forced();
        if unused > 0 {
            debug!(unused, "Discarded unused forced outcomes");
        }

        self.move_count += 1;
        let captured = capture.map(|c| CapturedPiece {
            piece: c.piece,
            square: c.square,
            probability: c.probability,
            move_number: self.move_count,
        });
        self.update_castling(piece, &played);
        self.en_passant = self.passed_square(piece, &played, move_type);
        if let Some(c) = captured {
            self.captured.push(c);
            if c.piece.kind == PieceKind::King && !self.has_king(c.piece.color) {
                self.status = GameStatus::king_lost_by(c.piece.color);
            }
        }

        let now = Utc::now();
        let record = MoveRecord {
            number: self.move_count,
            color: self.turn,
            request: played,
            move_type,
            piece,
            captured,
            measurements: self.sim.drain_measurements(),
            timestamp: now,
        };
        self.history.push(record.clone());
        self.turn = self.turn.opponent();
        self.updated_at = now;

        info!(
            number = record.number,
            %move_type,
            piece = %piece,
            captured = captured.is_some(),
            basis_states = self.sim.basis_state_count(),
            status = %self.status,
            "Played move"
        );
        Ok(record)
    }

    fn play_gates(
        &mut self,
        request: MoveRequest,
        piece: Piece,
    ) -> EngineResult<(MoveType, Option<Capture>, MoveRequest)> {
        let (move_type, capture) = self.execute(&request, piece)?;
        let played = self.promote(request, piece)?;
        Ok((move_type, capture, played))
    }

    fn check_playable(&self, request: &MoveRequest) -> EngineResult<()> {
        if self.status.is_over() {
            return Err(EngineError::GameOver(self.status));
        }
        let outcome = self.validate_move(request);
        if !outcome.is_valid() {
            warn!(%request, %outcome, "Rejected move");
            return Err(EngineError::IllegalMove(outcome));
        }
        if request.is_quantum() {
            let current = self.sim.basis_state_count();
            let limit = self.config.max_basis_states;
            if current.saturating_mul(2) > limit {
                warn!(%request, current, limit, "Superposition limit reached");
                return Err(EngineError::SuperpositionLimit { limit, current });
            }
        }
        Ok(())
    }

    /// Apply the gates and measurements for a validated request.
    fn execute(
        &mut self,
        request: &MoveRequest,
        piece: Piece,
    ) -> EngineResult<(MoveType, Option<Capture>)> {
        let (src, dst) = (request.src.index(), request.dst.index());
        let none = Controls::none();

        if request.is_split() {
            if let Some(d2) = request.dst_second {
                self.sim.split(src, dst, d2.index())?;
                return Ok((MoveType::Split, None));
            }
        }
        if request.is_merge() {
            if let Some(s2) = request.src_second {
                self.sim.merge(src, s2.index(), dst)?;
                return Ok((MoveType::Merge, None));
            }
        }

        let file_step = request.dst.file().abs_diff(request.src.file());
        if piece.kind == PieceKind::King && file_step == 2 {
            let (rook_src, rook_dst) = castle_rook_squares(request.dst)
                .ok_or(EngineError::IllegalMove(ValidationOutcome::InvalidCastleConditions))?;
            self.sim.apply_iswap(src, dst, &none)?;
            self.sim.apply_iswap(rook_src.index(), rook_dst.index(), &none)?;
            return Ok((MoveType::Castle, None));
        }

        if piece.kind == PieceKind::Pawn && file_step == 0 {
            return self.pawn_push(request);
        }

        let dst_tag = self.sim.tag(dst)?;
        if piece.kind == PieceKind::Pawn && file_step == 1 && dst_tag.is_none() {
            let victim = Square::new(request.dst.file(), request.src.rank())?;
            let capture = self.sim.capture(victim.index())?;
            self.sim.apply_iswap(src, dst, &none)?;
            return Ok((MoveType::EnPassant, capture));
        }

        match dst_tag {
            Some(other) if other.color != piece.color => {
                let outcome = self.sim.apply_iswap(src, dst, &none)?;
                let move_type = match (outcome.moved, outcome.captured.is_some()) {
                    (_, true) => MoveType::Capture,
                    (true, false) => MoveType::Normal,
                    (false, false) => MoveType::Blocked,
                };
                Ok((move_type, outcome.captured))
            }
            Some(other) if other != piece => {
                if self.sim.measure(dst)? {
                    debug!(dst = %request.dst, blocker = %other, "Destination occupied");
                    return Ok((MoveType::Blocked, None));
                }
                self.sim.apply_iswap(src, dst, &none)?;
                Ok((MoveType::Normal, None))
            }
            _ => {
                self.sim.apply_iswap(src, dst, &none)?;
                Ok((MoveType::Normal, None))
            }
        }
    }

    /// Forward pawn step. Every square on the way that may be occupied is
    /// measured first; the pawn only moves if all of them are found empty.
    fn pawn_push(&mut self, request: &MoveRequest) -> EngineResult<(MoveType, Option<Capture>)> {
        let mut path = request.src.between(request.dst).unwrap_or_default();
        path.push(request.dst);
        for square in path {
            if self.sim.is_empty(square.index())? {
                continue;
            }
            if self.sim.measure(square.index())? {
                debug!(%square, "Pawn push blocked");
                return Ok((MoveType::Blocked, None));
            }
        }
        self.sim
            .apply_iswap(request.src.index(), request.dst.index(), &Controls::none())?;
        Ok((MoveType::Normal, None))
    }

    /// Swap the tag of a pawn that reached the last rank. Returns the request
    /// with the promotion piece filled in.
    fn promote(&mut self, request: MoveRequest, piece: Piece) -> EngineResult<MoveRequest> {
        if piece.kind != PieceKind::Pawn || request.dst.rank() != piece.color.promotion_rank() {
            return Ok(request);
        }
        let kind = request.promotion.unwrap_or(PieceKind::Queen);
        if self.sim.tag(request.dst.index())? == Some(piece) {
            self.sim
                .change_tag(request.dst.index(), Piece::new(kind, piece.color))?;
            debug!(square = %request.dst, ?kind, "Promoted pawn");
        }
        Ok(request.with_promotion(kind))
    }

    fn update_castling(&mut self, piece: Piece, request: &MoveRequest) {
        if piece.kind == PieceKind::King {
            self.castling.clear_color(piece.color);
        }
        let touched = [
            Some(request.src),
            Some(request.dst),
            request.src_second,
            request.dst_second,
        ];
        for square in touched.into_iter().flatten() {
            self.castling.clear_corner(square);
        }
    }

    fn passed_square(&self, piece: Piece, request: &MoveRequest, move_type: MoveType) -> Option<Square> {
        let double_step = piece.kind == PieceKind::Pawn
            && move_type == MoveType::Normal
            && request.dst.rank().abs_diff(request.src.rank()) == 2;
        if double_step {
            request.src.offset(0, piece.color.forward())
        } else {
            None
        }
    }

    fn has_king(&self, color: Color) -> bool {
        let king = Piece::new(PieceKind::King, color);
        self.sim.tags().iter().any(|tag| *tag == Some(king))
    }

    // =========================================================================
    // History
    // =========================================================================

    /// Take back the last `steps` moves by replaying the rest of the history
    /// with its recorded measurement outcomes.
    pub fn undo(&mut self, steps: usize) -> EngineResult<()> {
        if steps == 0 {
            return Ok(());
        }
        let available = self.history.len();
        if steps > available {
            return Err(EngineError::NothingToUndo {
                requested: steps,
                available,
            });
        }

        let kept = self.history[..available - steps].to_vec();
        let mut replay = self.rebuilt()?;
        for record in &kept {
            replay.sim.force_outcomes(record.outcomes());
            replay.make_move(record.request)?;
        }
        replay.history = kept;
        replay.updated_at = Utc::now();
        *self = replay;
        info!(game = %self.id, steps, remaining = self.history.len(), "Undid moves");
        Ok(())
    }

    /// Return to the initial position, keeping the game id and seed.
    pub fn reset(&mut self) -> EngineResult<()> {
        *self = self.rebuilt()?;
        info!(game = %self.id, "Reset game");
        Ok(())
    }

    fn rebuilt(&self) -> EngineResult<Self> {
        let sim = QuantumStateSimulator::new(
            self.initial_occupancy,
            &self.initial_tags,
            Some(self.sim.seed()),
        )?;
        let castling = home_castling_rights(&sim);
        Ok(Self {
            id: self.id,
            config: self.config.clone(),
            initial_occupancy: self.initial_occupancy,
            initial_tags: self.initial_tags.clone(),
            sim,
            turn: Color::White,
            move_count: 0,
            history: Vec::new(),
            captured: Vec::new(),
            castling,
            en_passant: None,
            status: GameStatus::Ongoing,
            created_at: self.created_at,
            updated_at: Utc::now(),
        })
    }

    // =========================================================================
    // Snapshots
    // =========================================================================

    /// Serializable copy of the whole game.
    pub fn game_state(&self) -> GameSnapshot {
        let (tags, probabilities) = self.sim.marginal_probability();
        let squares = Square::all()
            .map(|square| SquareState {
                square,
                piece: tags[square.index()],
                probability: probabilities[square.index()],
            })
            .collect();
        GameSnapshot {
            id: self.id,
            squares,
            correlations: self.sim.correlation_matrix(),
            current_player: self.turn,
            moves: self.history.clone(),
            captured: self.captured.clone(),
            castling: self.castling,
            en_passant: self.en_passant,
            move_count: self.move_count,
            status: self.status,
            seed: self.sim.seed(),
            basis_states: self.sim.basis_state_count(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Rights for every king and rook pair standing on its home squares.
fn home_castling_rights(sim: &QuantumStateSimulator) -> CastlingRights {
    let at = |index: usize, letter: char| {
        sim.tags()[index].is_some_and(|p| p.to_char() == letter)
    };
    CastlingRights {
        white_kingside: at(4, 'K') && at(7, 'R'),
        white_queenside: at(4, 'K') && at(0, 'R'),
        black_kingside: at(60, 'k') && at(63, 'r'),
        black_queenside: at(60, 'k') && at(56, 'r'),
    }
}

impl fmt::Display for MoveEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sim)?;
        write!(
            f,
            "{} to move | move {} | castling {}",
            self.turn, self.move_count, self.castling
        )?;
        if let Some(square) = self.en_passant {
            write!(f, " | en passant {square}")?;
        }
        if self.status.is_over() {
            write!(f, " | {}", self.status)?;
        }
        writeln!(f)
    }
}
