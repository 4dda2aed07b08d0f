//! Legal move enumeration and random move selection.

use qchess_core::{PieceKind, Square};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::request::MoveRequest;
use crate::rules::Position;

/// Every request that validates in `position`.
///
/// Promotions are listed once per promotion piece. Merges are listed once per
/// source pair, lower-indexed source first.
pub fn legal_moves(position: &Position<'_>) -> Vec<MoveRequest> {
    let own: Vec<Square> = Square::all()
        .filter(|&sq| position.tag(sq).is_some_and(|p| p.color == position.turn))
        .collect();

    let mut moves = Vec::new();
    for &src in &own {
        let mut targets = Vec::new();
        for dst in Square::all() {
            let request = MoveRequest::new(src, dst);
            if !position.validate(&request).is_valid() {
                continue;
            }
            targets.push(dst);
            if needs_promotion(position, src, dst) {
                moves.extend(
                    PieceKind::PROMOTIONS
                        .iter()
                        .map(|&kind| request.with_promotion(kind)),
                );
            } else {
                moves.push(request);
            }
        }

        let empty: Vec<Square> = targets
            .iter()
            .copied()
            .filter(|&sq| position.tag(sq).is_none())
            .collect();
        for (i, &d1) in empty.iter().enumerate() {
            for &d2 in &empty[i + 1..] {
                let split = MoveRequest::split(src, d1, d2);
                if position.validate(&split).is_valid() {
                    moves.push(split);
                }
            }
        }
    }

    for (i, &s1) in own.iter().enumerate() {
        for &s2 in &own[i + 1..] {
            if position.tag(s1) != position.tag(s2) {
                continue;
            }
            for dst in Square::all() {
                let merge = MoveRequest::merge(s1, s2, dst);
                if position.validate(&merge).is_valid() {
                    moves.push(merge);
                }
            }
        }
    }
    moves
}

fn needs_promotion(position: &Position<'_>, src: Square, dst: Square) -> bool {
    position
        .tag(src)
        .is_some_and(|p| p.kind == PieceKind::Pawn && dst.rank() == p.color.promotion_rank())
}

/// Pick a move at random.
///
/// With probability `split_weight` the pick is drawn from the split and merge
/// moves, otherwise from the single-destination moves; if the chosen group is
/// empty the other one is used. A NaN weight counts as zero.
pub fn choose_random<R: Rng + ?Sized>(
    moves: &[MoveRequest],
    split_weight: f64,
    rng: &mut R,
) -> Option<MoveRequest> {
    let (quantum, classical): (Vec<MoveRequest>, Vec<MoveRequest>) =
        moves.iter().partition(|m| m.is_quantum());
    let weight = if split_weight.is_nan() {
        0.0
    } else {
        split_weight.clamp(0.0, 1.0)
    };
    let prefer_quantum = rng.gen_bool(weight);
    let (first, second) = if prefer_quantum {
        (&quantum, &classical)
    } else {
        (&classical, &quantum)
    };
    first
        .choose(rng)
        .or_else(|| second.choose(rng))
        .copied()
}
