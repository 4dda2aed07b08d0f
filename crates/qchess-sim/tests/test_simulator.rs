//! Integration tests for the quantum board simulator.

use qchess_core::{BitVector, Piece, STANDARD_TAGS, Square};
use qchess_sim::{Controls, QuantumStateSimulator, SimError};

fn sq(name: &str) -> usize {
    name.parse::<Square>().unwrap().index()
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

#[test]
fn standard_position_has_32_classical_pieces() {
    let sim = QuantumStateSimulator::standard(Some(12345)).unwrap();
    let (tags, probs) = sim.marginal_probability();
    assert_eq!(tags.iter().filter(|t| t.is_some()).count(), 32);
    assert!(close(probs.iter().sum::<f64>(), 32.0));
    assert_eq!(sim.seed(), 12345);
}

#[test]
fn tags_follow_set_bits_in_order() {
    let sim = QuantumStateSimulator::new(
        BitVector::standard_starting_position(),
        STANDARD_TAGS,
        Some(1),
    )
    .unwrap();
    assert_eq!(sim.tag(sq("a1")).unwrap(), Some(Piece::from_char('R').unwrap()));
    assert_eq!(sim.tag(sq("d8")).unwrap(), Some(Piece::from_char('q').unwrap()));
    assert_eq!(sim.tag(sq("e4")).unwrap(), None);
}

#[test]
fn from_board_rejects_bad_tokens() {
    assert!(QuantumStateSimulator::from_board("e1K z9k", Some(1)).is_err());
    assert!(QuantumStateSimulator::from_board("e1K e1k", Some(1)).is_err());
    assert!(matches!(
        QuantumStateSimulator::from_board("e1X", Some(1)),
        Err(SimError::InvalidTag('X'))
    ));
}

// ---------------------------------------------------------------------------
// Split and merge
// ---------------------------------------------------------------------------

#[test]
fn split_then_merge_restores_classical_piece() {
    let mut sim = QuantumStateSimulator::from_board("a1Q", Some(1)).unwrap();
    sim.split(sq("a1"), sq("a3"), sq("b3")).unwrap();
    assert!(close(sim.probability(sq("a3")).unwrap(), 0.5));
    assert!(close(sim.probability(sq("b3")).unwrap(), 0.5));
    assert_eq!(sim.tag(sq("a1")).unwrap(), None);

    sim.merge(sq("a3"), sq("b3"), sq("a3")).unwrap();
    assert!(close(sim.probability(sq("a3")).unwrap(), 1.0));
    assert_eq!(sim.tag(sq("b3")).unwrap(), None);
    assert_eq!(sim.basis_state_count(), 1);
}

#[test]
fn merge_onto_third_square() {
    let mut sim = QuantumStateSimulator::from_board("d4Q", Some(1)).unwrap();
    sim.split(sq("d4"), sq("d6"), sq("f6")).unwrap();
    sim.merge(sq("d6"), sq("f6"), sq("e7")).unwrap();
    assert!(close(sim.probability(sq("e7")).unwrap(), 1.0));
    assert!(close(sim.total_probability(), 1.0));
}

#[test]
fn merge_onto_second_source() {
    let mut sim = QuantumStateSimulator::from_board("d4Q", Some(1)).unwrap();
    sim.split(sq("d4"), sq("d6"), sq("f6")).unwrap();
    sim.merge(sq("d6"), sq("f6"), sq("f6")).unwrap();
    assert!(close(sim.probability(sq("f6")).unwrap(), 1.0));
    assert_eq!(sim.tag(sq("d6")).unwrap(), None);
}

// ---------------------------------------------------------------------------
// Capture
// ---------------------------------------------------------------------------

#[test]
fn classical_capture_removes_victim() {
    let mut sim = QuantumStateSimulator::from_board("e4P d5p", Some(1)).unwrap();
    let out = sim.apply_iswap(sq("e4"), sq("d5"), &Controls::none()).unwrap();
    assert!(out.moved);
    let captured = out.captured.unwrap();
    assert_eq!(captured.piece, Piece::from_char('p').unwrap());
    assert!(close(captured.probability, 1.0));
    assert!(close(sim.probability(sq("d5")).unwrap(), 1.0));
    assert_eq!(sim.tag(sq("d5")).unwrap(), Some(Piece::from_char('P').unwrap()));
    assert_eq!(sim.tag(sq("e4")).unwrap(), None);
}

#[test]
fn capture_of_superposed_victim_resolves_destination() {
    let mut sim = QuantumStateSimulator::from_board("b8n a1Q", Some(1)).unwrap();
    sim.split(sq("b8"), sq("a6"), sq("c6")).unwrap();

    // Force the victim to be found on a6.
    sim.force_outcomes([true]);
    let out = sim.apply_iswap(sq("a1"), sq("a6"), &Controls::none()).unwrap();
    assert!(out.captured.is_some());
    assert!(close(out.captured.unwrap().probability, 0.5));
    assert!(close(sim.probability(sq("a6")).unwrap(), 1.0));
    assert_eq!(sim.tag(sq("c6")).unwrap(), None);
}

#[test]
fn capture_miss_moves_attacker_to_empty_square() {
    let mut sim = QuantumStateSimulator::from_board("b8n a1Q", Some(1)).unwrap();
    sim.split(sq("b8"), sq("a6"), sq("c6")).unwrap();

    sim.force_outcomes([false]);
    let out = sim.apply_iswap(sq("a1"), sq("a6"), &Controls::none()).unwrap();
    assert!(out.moved);
    assert!(out.captured.is_none());
    assert_eq!(sim.tag(sq("a6")).unwrap(), Some(Piece::from_char('Q').unwrap()));
    assert!(close(sim.probability(sq("c6")).unwrap(), 1.0));
}

#[test]
fn capture_removes_piece_in_place() {
    let mut sim = QuantumStateSimulator::from_board("e5P d5p", Some(1)).unwrap();
    let captured = sim.capture(sq("d5")).unwrap().unwrap();
    assert_eq!(captured.piece, Piece::from_char('p').unwrap());
    assert_eq!(sim.tag(sq("d5")).unwrap(), None);
    assert!(close(sim.probability(sq("e5")).unwrap(), 1.0));
    assert!(sim.capture(sq("d5")).unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Determinism
// ---------------------------------------------------------------------------

#[test]
fn same_seed_same_measurements() {
    let run = |seed| {
        let mut sim = QuantumStateSimulator::from_board("b1N g1N", Some(seed)).unwrap();
        sim.split(sq("b1"), sq("a3"), sq("c3")).unwrap();
        sim.split(sq("g1"), sq("f3"), sq("h3")).unwrap();
        [sq("a3"), sq("f3")].map(|s| sim.measure(s).unwrap())
    };
    for seed in [1, 2, 3, 12345] {
        assert_eq!(run(seed), run(seed));
    }
}

#[test]
fn clone_is_independent() {
    let mut a = QuantumStateSimulator::from_board("b1N", Some(9)).unwrap();
    a.split(sq("b1"), sq("a3"), sq("c3")).unwrap();
    let mut b = a.clone();
    b.measure(sq("a3")).unwrap();
    assert!(close(a.probability(sq("a3")).unwrap(), 0.5));
    assert_eq!(b.basis_state_count(), 1);
}
