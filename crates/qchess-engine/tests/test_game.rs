//! Integration tests for the rules engine.

use qchess_core::{Color, Piece, PieceKind, Square};
use qchess_engine::{
    EngineConfig, EngineError, GameSnapshot, GameStatus, MoveEngine, MoveRequest, MoveType,
    ValidationOutcome,
};
use qchess_sim::SimError;

fn sq(name: &str) -> Square {
    name.parse().unwrap()
}

fn piece(c: char) -> Piece {
    Piece::from_char(c).unwrap()
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn board(layout: &str) -> MoveEngine {
    MoveEngine::from_board(layout, EngineConfig::seeded(12345)).unwrap()
}

// ---------------------------------------------------------------------------
// Standard opening, seed 12345
// ---------------------------------------------------------------------------

#[test]
fn opening_validation() {
    let game = MoveEngine::with_seed(12345).unwrap();
    assert_eq!(
        game.validate_move(&MoveRequest::new(sq("e2"), sq("e4"))),
        ValidationOutcome::Valid
    );
    assert_eq!(
        game.validate_move(&MoveRequest::new(sq("e2"), sq("e5"))),
        ValidationOutcome::InvalidPieceMovement
    );
    assert_eq!(
        game.validate_move(&MoveRequest::new(sq("e7"), sq("e6"))),
        ValidationOutcome::InvalidWrongColor
    );
    assert_eq!(
        game.validate_move(&MoveRequest::new(sq("e4"), sq("e5"))),
        ValidationOutcome::InvalidNoPiece
    );
    assert_eq!(game.validate_indices(64, 0), ValidationOutcome::InvalidOutOfBounds);
}

#[test]
fn pawn_double_step() {
    let mut game = MoveEngine::with_seed(12345).unwrap();
    let record = game.play_command("e2,e4").unwrap();
    assert_eq!(record.move_type, MoveType::Normal);
    assert!(record.measurements.is_empty());

    let e2 = game.piece_at(sq("e2"));
    assert_eq!(e2.piece, None);
    assert!(close(e2.probability, 0.0));
    let e4 = game.piece_at(sq("e4"));
    assert_eq!(e4.piece, Some(piece('P')));
    assert!(close(e4.probability, 1.0));

    assert_eq!(game.current_player(), Color::Black);
    assert_eq!(game.en_passant(), Some(sq("e3")));
    assert_eq!(game.move_count(), 1);
}

#[test]
fn classical_capture() {
    let mut game = MoveEngine::with_seed(12345).unwrap();
    game.play_command("e2,e4").unwrap();
    game.play_command("d7,d5").unwrap();
    let record = game.play_command("e4,d5").unwrap();

    assert_eq!(record.move_type, MoveType::Capture);
    assert_eq!(game.captured().len(), 1);
    assert_eq!(game.captured()[0].piece, piece('p'));
    let d5 = game.piece_at(sq("d5"));
    assert_eq!(d5.piece, Some(piece('P')));
    assert!(close(d5.probability, 1.0));
}

#[test]
fn rejected_move_changes_nothing() {
    let mut game = MoveEngine::with_seed(12345).unwrap();
    let before = game.game_state();
    let err = game.make_move(MoveRequest::new(sq("e2"), sq("e5"))).unwrap_err();
    assert_eq!(err, EngineError::IllegalMove(ValidationOutcome::InvalidPieceMovement));
    let after = game.game_state();
    assert_eq!(before.squares, after.squares);
    assert_eq!(after.move_count, 0);
    assert_eq!(after.current_player, Color::White);
}

#[test]
fn opening_legal_moves() {
    let game = MoveEngine::with_seed(12345).unwrap();
    let moves = game.legal_moves();
    assert_eq!(moves.len(), 22);
    assert!(moves.contains(&MoveRequest::split(sq("g1"), sq("f3"), sq("h3"))));
}

// ---------------------------------------------------------------------------
// Split and merge
// ---------------------------------------------------------------------------

#[test]
fn split_then_merge() {
    let mut game = MoveEngine::with_seed(12345).unwrap();
    let record = game.play_command("b1,a3c3").unwrap();
    assert_eq!(record.move_type, MoveType::Split);
    assert!(close(game.piece_at(sq("a3")).probability, 0.5));
    assert!(close(game.piece_at(sq("c3")).probability, 0.5));
    assert_eq!(game.piece_at(sq("b1")).piece, None);

    game.play_command("e7,e6").unwrap();
    let record = game.play_command("a3c3,b1").unwrap();
    assert_eq!(record.move_type, MoveType::Merge);
    let b1 = game.piece_at(sq("b1"));
    assert_eq!(b1.piece, Some(piece('N')));
    assert!(close(b1.probability, 1.0));
    assert!(close(game.simulator().total_probability(), 1.0));
}

#[test]
fn pawns_cannot_split() {
    let game = MoveEngine::with_seed(12345).unwrap();
    assert_eq!(
        game.validate_move(&MoveRequest::split(sq("e2"), sq("e3"), sq("e4"))),
        ValidationOutcome::InvalidPieceMovement
    );
}

#[test]
fn split_into_occupied_square_blocked() {
    let game = MoveEngine::with_seed(12345).unwrap();
    assert_eq!(
        game.validate_move(&MoveRequest::split(sq("b1"), sq("a3"), sq("d2"))),
        ValidationOutcome::InvalidPathBlocked
    );
}

#[test]
fn superposition_limit() {
    let config = EngineConfig {
        seed: Some(1),
        max_basis_states: 2,
    };
    let mut game = MoveEngine::from_board("b1N g1N e1K e8k", config).unwrap();
    game.play_command("b1,a3c3").unwrap();
    game.play_command("e8,f8").unwrap();
    let err = game.play_command("g1,f3h3").unwrap_err();
    assert_eq!(
        err,
        EngineError::SuperpositionLimit {
            limit: 2,
            current: 2
        }
    );
    assert_eq!(game.move_count(), 2);
    assert_eq!(game.piece_at(sq("g1")).piece, Some(piece('N')));
}

// ---------------------------------------------------------------------------
// Measurement-driven moves
// ---------------------------------------------------------------------------

#[test]
fn capture_of_superposed_piece_found() {
    let mut game = board("b1N d4p e1K e8k");
    game.play_command("b1,a3c3").unwrap();
    let record = game.play_command("d4,c3,1").unwrap();

    assert_eq!(record.move_type, MoveType::Capture);
    let captured = record.captured.unwrap();
    assert_eq!(captured.piece, piece('N'));
    assert!(close(captured.probability, 0.5));
    assert_eq!(record.outcomes(), vec![true, true]);
    assert!(close(game.piece_at(sq("c3")).probability, 1.0));
    assert_eq!(game.piece_at(sq("c3")).piece, Some(piece('p')));
    assert_eq!(game.piece_at(sq("a3")).piece, None);
}

#[test]
fn capture_of_superposed_piece_missed() {
    let mut game = board("b1N d4p e1K e8k");
    game.play_command("b1,a3c3").unwrap();
    let record = game.play_command("d4,c3,0").unwrap();

    assert_eq!(record.move_type, MoveType::Normal);
    assert!(record.captured.is_none());
    assert_eq!(game.piece_at(sq("c3")).piece, Some(piece('p')));
    assert!(close(game.piece_at(sq("a3")).probability, 1.0));
}

#[test]
fn blocked_by_own_superposed_piece() {
    let mut game = board("b1N d2Q e1K e8k");
    game.play_command("b1,a3c3").unwrap();
    game.play_command("e8,f8").unwrap();
    let record = game.play_command("d2,c3,1").unwrap();

    assert_eq!(record.move_type, MoveType::Blocked);
    assert_eq!(game.piece_at(sq("d2")).piece, Some(piece('Q')));
    assert!(close(game.piece_at(sq("c3")).probability, 1.0));
    assert_eq!(game.piece_at(sq("c3")).piece, Some(piece('N')));
    assert_eq!(game.current_player(), Color::Black);
}

#[test]
fn own_superposed_piece_absent_lets_move_through() {
    let mut game = board("b1N d2Q e1K e8k");
    game.play_command("b1,a3c3").unwrap();
    game.play_command("e8,f8").unwrap();
    let record = game.play_command("d2,c3,0").unwrap();

    assert_eq!(record.move_type, MoveType::Normal);
    assert_eq!(game.piece_at(sq("c3")).piece, Some(piece('Q')));
    assert!(close(game.piece_at(sq("a3")).probability, 1.0));
}

#[test]
fn forced_outcome_contradicting_certain_capture_is_rejected() {
    let mut game = board("a1R a8r e1K e8k");
    let before = game.game_state();

    let err = game.play_command("a1,a8,0").unwrap_err();
    assert!(matches!(
        err,
        EngineError::Simulator(SimError::ImpossibleOutcome { outcome: false, .. })
    ));

    let after = game.game_state();
    assert_eq!(after.squares, before.squares);
    assert_eq!(after.basis_states, before.basis_states);
    assert!(after.captured.is_empty());
    assert!(after.moves.is_empty());
    assert_eq!(after.current_player, Color::White);

    // Forced outcomes that agree with the certain measurements are accepted.
    let record = game.play_command("a1,a8,11").unwrap();
    assert_eq!(record.move_type, MoveType::Capture);
    assert_eq!(record.outcomes(), vec![true, true]);
}

#[test]
fn failed_forced_move_leaves_superposition_intact() {
    let mut game = board("b1N d4p e1K e8k");
    game.play_command("b1,a3c3").unwrap();
    let before = game.game_state();

    // c3 may hold the knight, but the pawn on d4 is certainly there.
    let err = game.play_command("d4,c3,10").unwrap_err();
    assert!(matches!(err, EngineError::Simulator(SimError::ImpossibleOutcome { .. })));

    let after = game.game_state();
    assert_eq!(after.squares, before.squares);
    assert_eq!(after.basis_states, 2);
    assert_eq!(after.move_count, 1);

    // The same seed still drives the next move as if nothing had happened.
    let mut twin = board("b1N d4p e1K e8k");
    twin.play_command("b1,a3c3").unwrap();
    let a = game.play_command("d4,c3").unwrap();
    let b = twin.play_command("d4,c3").unwrap();
    assert_eq!(a.measurements, b.measurements);
}

#[test]
fn pawn_step_onto_superposed_piece_blocked() {
    let mut game = board("b1N c2P e1K e8k");
    game.play_command("b1,a3c3").unwrap();
    game.play_command("e8,f8").unwrap();
    assert_eq!(
        game.validate_move(&MoveRequest::new(sq("c2"), sq("c3"))),
        ValidationOutcome::Valid
    );

    let record = game.play_command("c2,c3,1").unwrap();
    assert_eq!(record.move_type, MoveType::Blocked);
    assert_eq!(game.piece_at(sq("c2")).piece, Some(piece('P')));
    assert!(close(game.piece_at(sq("c3")).probability, 1.0));
    assert_eq!(game.piece_at(sq("c3")).piece, Some(piece('N')));
    assert_eq!(game.piece_at(sq("a3")).piece, None);
}

#[test]
fn pawn_step_onto_superposed_piece_moves_when_empty() {
    let mut game = board("b1N c2P e1K e8k");
    game.play_command("b1,a3c3").unwrap();
    game.play_command("e8,f8").unwrap();

    let record = game.play_command("c2,c3,0").unwrap();
    assert_eq!(record.move_type, MoveType::Normal);
    assert_eq!(game.piece_at(sq("c3")).piece, Some(piece('P')));
    assert!(close(game.piece_at(sq("a3")).probability, 1.0));
}

#[test]
fn pawn_double_step_through_superposed_piece() {
    let mut game = board("b1N c2P e1K e8k");
    game.play_command("b1,a3c3").unwrap();
    game.play_command("e8,f8").unwrap();

    let mut blocked = game.clone();
    let record = blocked.play_command("c2,c4,1").unwrap();
    assert_eq!(record.move_type, MoveType::Blocked);
    assert_eq!(blocked.piece_at(sq("c2")).piece, Some(piece('P')));
    assert_eq!(blocked.en_passant(), None);

    let record = game.play_command("c2,c4,0").unwrap();
    assert_eq!(record.move_type, MoveType::Normal);
    assert_eq!(game.piece_at(sq("c4")).piece, Some(piece('P')));
    assert_eq!(game.piece_at(sq("c3")).piece, None);
    assert_eq!(game.en_passant(), Some(sq("c3")));
}

#[test]
fn pawn_double_step_onto_superposed_piece() {
    let mut game = board("c2P b6n e1K e8k");
    game.play_command("e1,d1").unwrap();
    game.play_command("b6,a4c4").unwrap();

    let mut blocked = game.clone();
    let record = blocked.play_command("c2,c4,1").unwrap();
    assert_eq!(record.move_type, MoveType::Blocked);
    assert!(blocked.captured().is_empty());
    assert_eq!(blocked.piece_at(sq("c4")).piece, Some(piece('n')));

    let record = game.play_command("c2,c4,0").unwrap();
    assert_eq!(record.move_type, MoveType::Normal);
    assert_eq!(game.piece_at(sq("c4")).piece, Some(piece('P')));
    assert!(close(game.piece_at(sq("a4")).probability, 1.0));
}

#[test]
fn pawn_step_onto_certain_piece_rejected() {
    let game = board("c2P c3n e1K e8k");
    assert_eq!(
        game.validate_move(&MoveRequest::new(sq("c2"), sq("c3"))),
        ValidationOutcome::InvalidPathBlocked
    );
    assert_eq!(
        game.validate_move(&MoveRequest::new(sq("c2"), sq("c4"))),
        ValidationOutcome::InvalidPathBlocked
    );
}

// ---------------------------------------------------------------------------
// Special moves
// ---------------------------------------------------------------------------

#[test]
fn kingside_castle() {
    let mut game = board("e1K h1R a1R e8k");
    let record = game.play_command("e1,g1").unwrap();
    assert_eq!(record.move_type, MoveType::Castle);
    assert_eq!(game.piece_at(sq("g1")).piece, Some(piece('K')));
    assert_eq!(game.piece_at(sq("f1")).piece, Some(piece('R')));
    assert_eq!(game.piece_at(sq("h1")).piece, None);
    let rights = game.castling_rights();
    assert!(!rights.white_kingside && !rights.white_queenside);
}

#[test]
fn written_out_castle() {
    let mut game = board("e1K a1R e8k");
    let record = game.play_command("e1a1,c1d1").unwrap();
    assert_eq!(record.move_type, MoveType::Castle);
    assert_eq!(game.piece_at(sq("c1")).piece, Some(piece('K')));
    assert_eq!(game.piece_at(sq("d1")).piece, Some(piece('R')));
}

#[test]
fn rook_move_clears_its_castling_right() {
    let mut game = board("e1K h1R a1R e8k");
    game.play_command("h1,h2").unwrap();
    let rights = game.castling_rights();
    assert!(!rights.white_kingside);
    assert!(rights.white_queenside);
}

#[test]
fn en_passant_capture() {
    let mut game = board("e2P d4p e1K e8k");
    game.play_command("e2,e4").unwrap();
    assert_eq!(game.en_passant(), Some(sq("e3")));
    let record = game.play_command("d4,e3").unwrap();

    assert_eq!(record.move_type, MoveType::EnPassant);
    assert_eq!(record.captured.unwrap().piece, piece('P'));
    assert_eq!(game.piece_at(sq("e4")).piece, None);
    assert_eq!(game.piece_at(sq("e3")).piece, Some(piece('p')));
    assert_eq!(game.en_passant(), None);
}

#[test]
fn promotion_defaults_to_queen() {
    let mut game = board("a7P e1K e8k");
    let record = game.make_move(MoveRequest::new(sq("a7"), sq("a8"))).unwrap();
    assert_eq!(record.request.promotion, Some(PieceKind::Queen));
    assert_eq!(game.piece_at(sq("a8")).piece, Some(piece('Q')));
}

#[test]
fn promotion_to_knight() {
    let mut game = board("a7P e1K e8k");
    game.play_command("a7,a8n").unwrap();
    assert_eq!(game.piece_at(sq("a8")).piece, Some(piece('N')));
}

#[test]
fn promotion_off_last_rank_rejected() {
    let game = board("a6P e1K e8k");
    let request = MoveRequest::new(sq("a6"), sq("a7")).with_promotion(PieceKind::Queen);
    assert_eq!(
        game.validate_move(&request),
        ValidationOutcome::InvalidPieceMovement
    );
}

#[test]
fn king_capture_ends_game() {
    let mut game = board("a2P e1K e3q e8k");
    game.play_command("a2,a3").unwrap();
    game.play_command("e3,e1").unwrap();

    assert_eq!(game.status(), GameStatus::BlackWins);
    assert!(game.legal_moves().is_empty());
    assert_eq!(
        game.play_command("a3,a4").unwrap_err(),
        EngineError::GameOver(GameStatus::BlackWins)
    );
    assert!(!game.is_check(Color::White));
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

#[test]
fn undo_restores_previous_position() {
    let mut game = board("b1N d4p e1K e8k");
    game.play_command("b1,a3c3").unwrap();
    let before: GameSnapshot = game.game_state();
    game.play_command("d4,c3").unwrap();

    game.undo(1).unwrap();
    let after = game.game_state();
    assert_eq!(after.squares, before.squares);
    assert_eq!(after.move_count, 1);
    assert_eq!(after.current_player, Color::Black);
    assert_eq!(after.id, before.id);
}

#[test]
fn undo_replays_recorded_outcomes() {
    let mut game = board("b1N d4p e1K e8k");
    game.play_command("b1,a3c3").unwrap();
    let capture = game.play_command("d4,c3").unwrap();
    game.play_command("e1,d1").unwrap();
    let before = game.game_state();

    game.undo(1).unwrap();
    assert_eq!(game.history().len(), 2);
    assert_eq!(game.history()[1].measurements, capture.measurements);
    game.play_command("e1,d1").unwrap();
    assert_eq!(game.game_state().squares, before.squares);
}

#[test]
fn undo_too_far() {
    let mut game = MoveEngine::with_seed(12345).unwrap();
    game.play_command("e2,e4").unwrap();
    assert_eq!(
        game.undo(2).unwrap_err(),
        EngineError::NothingToUndo {
            requested: 2,
            available: 1
        }
    );
    game.undo(0).unwrap();
    assert_eq!(game.move_count(), 1);
}

#[test]
fn reset_keeps_identity() {
    let mut game = MoveEngine::with_seed(12345).unwrap();
    let id = game.id();
    game.play_command("e2,e4").unwrap();
    game.play_command("b8,a6c6").unwrap();
    game.reset().unwrap();

    assert_eq!(game.id(), id);
    assert_eq!(game.seed(), 12345);
    assert_eq!(game.move_count(), 0);
    assert!(game.history().is_empty());
    assert_eq!(game.piece_at(sq("e2")).piece, Some(piece('P')));
    assert_eq!(game.simulator().basis_state_count(), 1);
}

#[test]
fn clone_is_independent() {
    let mut game = MoveEngine::with_seed(12345).unwrap();
    let copy = game.clone();
    game.play_command("e2,e4").unwrap();
    assert_eq!(copy.move_count(), 0);
    assert_eq!(copy.piece_at(sq("e2")).piece, Some(piece('P')));
}

#[test]
fn identical_seeds_play_identically() {
    let play = || {
        let mut game = board("b1N d4p e1K e8k");
        game.play_command("b1,a3c3").unwrap();
        game.play_command("d4,c3").unwrap();
        game.game_state().squares
    };
    assert_eq!(play(), play());
}

// ---------------------------------------------------------------------------
// Snapshot and display
// ---------------------------------------------------------------------------

#[test]
fn snapshot_json_round_trip() {
    let mut game = MoveEngine::with_seed(12345).unwrap();
    game.play_command("g1,f3h3").unwrap();
    let snapshot = game.game_state();
    assert_eq!(snapshot.squares.len(), 64);
    assert_eq!(snapshot.correlations.len(), 64);
    assert!(close(snapshot.expected_pieces(), 32.0));

    let json = serde_json::to_string(&snapshot).unwrap();
    assert!(json.contains("\"current_player\":\"black\""));
    assert!(json.contains("\"move_type\":\"split\""));
    let parsed: GameSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.moves, snapshot.moves);
    assert_eq!(parsed.squares, snapshot.squares);
}

#[test]
fn display_shows_side_to_move() {
    let game = MoveEngine::with_seed(12345).unwrap();
    let text = game.to_string();
    assert!(text.contains("white to move"));
    assert!(text.contains("castling KQkq"));
}
