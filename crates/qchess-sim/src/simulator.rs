//! Sparse amplitude simulator over board occupancy states.
//!
//! Each basis state is a 64-bit occupancy pattern; the state is a map from
//! pattern to complex amplitude. A parallel table binds a piece tag to every
//! square that is occupied in at least one basis state.

use std::cell::Cell;
use std::collections::VecDeque;
use std::f64::consts::FRAC_1_SQRT_2;
use std::fmt;

use num_complex::Complex64;
use qchess_core::{BOARD_SQUARES, BitVector, CoreError, Piece, STANDARD_TAGS, Square};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{SimError, SimResult};
use crate::rng::SeededRandom;

/// Squared magnitude below which an amplitude is dropped.
pub const AMPLITUDE_EPSILON: f64 = 1e-12;

/// Distance from 0 or 1 within which a probability counts as certain.
pub const CERTAINTY_EPSILON: f64 = 1e-12;

/// Control squares for a gate.
///
/// The gate acts only on basis states where every `control` square is
/// occupied and every `anti_control` square is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Controls {
    /// Squares that must be occupied.
    pub control: Vec<usize>,
    /// Squares that must be empty.
    pub anti_control: Vec<usize>,
}

impl Controls {
    /// No controls; the gate acts unconditionally.
    pub fn none() -> Self {
        Self::default()
    }

    /// Anti-controls only, the usual shape for a sliding path.
    pub fn empty_path(squares: impl IntoIterator<Item = usize>) -> Self {
        Self {
            control: Vec::new(),
            anti_control: squares.into_iter().collect(),
        }
    }

    /// Whether no square is constrained.
    pub fn is_empty(&self) -> bool {
        self.control.is_empty() && self.anti_control.is_empty()
    }

    /// Validate against the gate operands and fold into bit masks.
    fn masks(&self, src: usize, dst: usize) -> SimResult<(u64, u64)> {
        let mut seen = (1u64 << src) | (1u64 << dst);
        let mut fold = |squares: &[usize]| -> SimResult<u64> {
            let mut mask = 0u64;
            for &sq in squares {
                check_index(sq)?;
                let bit = 1u64 << sq;
                if seen & bit != 0 {
                    return Err(SimError::InvalidControl(sq));
                }
                seen |= bit;
                mask |= bit;
            }
            Ok(mask)
        };
        let control = fold(&self.control)?;
        let anti = fold(&self.anti_control)?;
        Ok((control, anti))
    }
}

/// The four members of the iSwap family used for piece movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapGate {
    /// Full swap with phase `i`.
    ISwap,
    /// Half swap with phase `i`.
    SqrtISwap,
    /// Adjoint of [`SwapGate::ISwap`].
    ISwapDagger,
    /// Adjoint of [`SwapGate::SqrtISwap`].
    SqrtISwapDagger,
}

impl SwapGate {
    /// Gate name used in logs and errors.
    pub const fn name(self) -> &'static str {
        match self {
            SwapGate::ISwap => "iswap",
            SwapGate::SqrtISwap => "sqrt_iswap",
            SwapGate::ISwapDagger => "iswap_dagger",
            SwapGate::SqrtISwapDagger => "sqrt_iswap_dagger",
        }
    }

    fn phase(self) -> Complex64 {
        match self {
            SwapGate::ISwap | SwapGate::SqrtISwap => Complex64::i(),
            SwapGate::ISwapDagger | SwapGate::SqrtISwapDagger => -Complex64::i(),
        }
    }

    fn is_full(self) -> bool {
        matches!(self, SwapGate::ISwap | SwapGate::ISwapDagger)
    }
}

/// One measurement performed by the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Measured square.
    pub square: Square,
    /// Whether the square was found occupied.
    pub outcome: bool,
    /// Occupation probability before the measurement.
    pub probability: f64,
    /// Whether the outcome was uncertain before the measurement.
    pub random: bool,
}

/// A piece removed from the board by a capture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Capture {
    /// The captured piece.
    pub piece: Piece,
    /// Where it stood.
    pub square: Square,
    /// Its occupation probability before the capture resolved.
    pub probability: f64,
}

/// Result of [`QuantumStateSimulator::apply_iswap`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SwapOutcome {
    /// Whether the gate was applied. False when a capture attempt found the
    /// attacker absent.
    pub moved: bool,
    /// The piece removed from the destination, if any.
    pub captured: Option<Capture>,
}

/// Quantum state of a chess board.
#[derive(Debug, Clone)]
pub struct QuantumStateSimulator {
    amplitudes: FxHashMap<u64, Complex64>,
    tags: [Option<Piece>; BOARD_SQUARES],
    rng: SeededRandom,
    probability_cache: [Cell<Option<f64>>; BOARD_SQUARES],
    forced: VecDeque<bool>,
    journal: Vec<Measurement>,
    last_measurement: Option<Measurement>,
}

impl QuantumStateSimulator {
    /// Build a classical state from an occupancy pattern and its tags.
    ///
    /// `tags` assigns one piece letter to each set bit in increasing index
    /// order. Without a seed the random source is seeded from entropy.
    pub fn new(occupancy: BitVector, tags: &str, seed: Option<u64>) -> SimResult<Self> {
        let positions = occupancy.set_positions();
        let letters: Vec<char> = tags.chars().collect();
        if letters.len() != positions.len() {
            return Err(SimError::TagCountMismatch {
                expected: occupancy.pop_count(),
                got: letters.len(),
            });
        }

        let mut table = [None; BOARD_SQUARES];
        for (&pos, &letter) in positions.iter().zip(&letters) {
            let piece = Piece::from_char(letter).map_err(|e| match e {
                CoreError::InvalidPiece(c) => SimError::InvalidTag(c),
                other => SimError::Core(other),
            })?;
            table[pos] = Some(piece);
        }

        let mut amplitudes = FxHashMap::default();
        amplitudes.insert(occupancy.as_u64(), Complex64::new(1.0, 0.0));
        let rng = seed.map_or_else(SeededRandom::from_entropy, SeededRandom::new);
        debug!(
            occupancy = %occupancy,
            pieces = positions.len(),
            seed = rng.seed(),
            "Initialized quantum board"
        );

        Ok(Self {
            amplitudes,
            tags: table,
            rng,
            probability_cache: std::array::from_fn(|_| Cell::new(None)),
            forced: VecDeque::new(),
            journal: Vec::new(),
            last_measurement: None,
        })
    }

    /// The standard chess starting position.
    pub fn standard(seed: Option<u64>) -> SimResult<Self> {
        Self::new(
            BitVector::standard_starting_position(),
            STANDARD_TAGS,
            seed,
        )
    }

    /// Build a classical position from a list such as `"e1K e8k a1R"`.
    pub fn from_board(board: &str, seed: Option<u64>) -> SimResult<Self> {
        let mut placed: [Option<char>; BOARD_SQUARES] = [None; BOARD_SQUARES];
        for token in board.split_whitespace() {
            let (sq, letter) = match (token.get(..2), token.get(2..)) {
                (Some(sq), Some(rest)) if rest.chars().count() == 1 => (sq, rest),
                _ => return Err(CoreError::InvalidSquare(token.to_string()).into()),
            };
            let square: Square = sq.parse()?;
            if placed[square.index()].is_some() {
                return Err(CoreError::InvalidSquare(format!("{square} listed twice")).into());
            }
            placed[square.index()] = letter.chars().next();
        }

        let mut occupancy = BitVector::EMPTY;
        let mut tags = String::new();
        for (index, letter) in placed.iter().enumerate() {
            if let Some(c) = letter {
                occupancy = occupancy.set(index, true)?;
                tags.push(*c);
            }
        }
        Self::new(occupancy, &tags, seed)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Seed of the measurement random source.
    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    /// Tag bound to a square.
    pub fn tag(&self, index: usize) -> SimResult<Option<Piece>> {
        check_index(index)?;
        Ok(self.tags[index])
    }

    /// The whole tag table.
    pub fn tags(&self) -> &[Option<Piece>; BOARD_SQUARES] {
        &self.tags
    }

    /// Marginal probability that `index` is occupied.
    pub fn probability(&self, index: usize) -> SimResult<f64> {
        check_index(index)?;
        if let Some(p) = self.probability_cache[index].get() {
            return Ok(p);
        }
        let p = if self.tags[index].is_none() {
            0.0
        } else {
            let mask = 1u64 << index;
            self.amplitudes
                .iter()
                .filter(|(state, _)| *state & mask != 0)
                .map(|(_, amp)| amp.norm_sqr())
                .sum()
        };
        self.probability_cache[index].set(Some(p));
        Ok(p)
    }

    /// Tags and occupation probabilities of all 64 squares.
    pub fn marginal_probability(&self) -> ([Option<Piece>; BOARD_SQUARES], [f64; BOARD_SQUARES]) {
        let mut probabilities = [0.0; BOARD_SQUARES];
        for (index, p) in probabilities.iter_mut().enumerate() {
            *p = self.probability(index).unwrap_or(0.0);
        }
        (self.tags, probabilities)
    }

    /// Whether the square is occupied in every basis state.
    pub fn is_certain(&self, index: usize) -> SimResult<bool> {
        Ok(self.probability(index)? >= 1.0 - CERTAINTY_EPSILON)
    }

    /// Whether the square is empty in every basis state.
    pub fn is_empty(&self, index: usize) -> SimResult<bool> {
        Ok(self.probability(index)? <= CERTAINTY_EPSILON)
    }

    /// Amplitude of one basis state (zero if absent).
    pub fn amplitude(&self, state: BitVector) -> Complex64 {
        self.amplitudes
            .get(&state.as_u64())
            .copied()
            .unwrap_or_default()
    }

    /// Iterate over the non-zero basis states.
    pub fn basis_states(&self) -> impl Iterator<Item = (BitVector, Complex64)> + '_ {
        self.amplitudes
            .iter()
            .map(|(state, amp)| (BitVector::from_u64(*state), *amp))
    }

    /// Number of non-zero basis states.
    pub fn basis_state_count(&self) -> usize {
        self.amplitudes.len()
    }

    /// Sum of squared magnitudes; 1 for a normalized state.
    pub fn total_probability(&self) -> f64 {
        self.amplitudes.values().map(Complex64::norm_sqr).sum()
    }

    /// Occupancy covariance `P(a and b) - P(a)P(b)` for every pair of squares.
    pub fn correlation_matrix(&self) -> Vec<Vec<f64>> {
        let mut joint = vec![vec![0.0; BOARD_SQUARES]; BOARD_SQUARES];
        for (state, amp) in &self.amplitudes {
            let weight = amp.norm_sqr();
            let occupied = BitVector::from_u64(*state).set_positions();
            for &a in &occupied {
                for &b in &occupied {
                    joint[a][b] += weight;
                }
            }
        }
        let (_, marginals) = self.marginal_probability();
        for (a, row) in joint.iter_mut().enumerate() {
            for (b, cell) in row.iter_mut().enumerate() {
                *cell -= marginals[a] * marginals[b];
            }
        }
        joint
    }

    // =========================================================================
    // Gates
    // =========================================================================

    /// Half swap between two squares.
    pub fn apply_sqrt_iswap(&mut self, src: usize, dst: usize, controls: &Controls) -> SimResult<()> {
        self.apply_swap_gate(SwapGate::SqrtISwap, src, dst, controls)
    }

    /// Adjoint of [`Self::apply_sqrt_iswap`].
    pub fn apply_sqrt_iswap_dagger(
        &mut self,
        src: usize,
        dst: usize,
        controls: &Controls,
    ) -> SimResult<()> {
        self.apply_swap_gate(SwapGate::SqrtISwapDagger, src, dst, controls)
    }

    /// Adjoint of the full swap. Never captures.
    pub fn apply_iswap_dagger(&mut self, src: usize, dst: usize, controls: &Controls) -> SimResult<()> {
        self.apply_swap_gate(SwapGate::ISwapDagger, src, dst, controls)
    }

    /// Full swap between two squares.
    ///
    /// When the squares carry different pieces this is a capture attempt:
    /// the destination and then the source are measured. If the attacker is
    /// absent nothing moves; otherwise a present victim is removed and the
    /// attacker swaps in.
    pub fn apply_iswap(
        &mut self,
        src: usize,
        dst: usize,
        controls: &Controls,
    ) -> SimResult<SwapOutcome> {
        check_index(src)?;
        check_index(dst)?;
        if src == dst {
            return Err(SimError::SameSquare {
                gate: SwapGate::ISwap.name(),
                square: src,
            });
        }
        match (self.tags[src], self.tags[dst]) {
            (Some(attacker), Some(victim)) if attacker != victim => {
                controls.masks(src, dst)?;
                self.resolve_capture(src, dst, victim, controls)
            }
            _ => {
                self.apply_swap_gate(SwapGate::ISwap, src, dst, controls)?;
                Ok(SwapOutcome {
                    moved: true,
                    captured: None,
                })
            }
        }
    }

    fn resolve_capture(
        &mut self,
        src: usize,
        dst: usize,
        victim: Piece,
        controls: &Controls,
    ) -> SimResult<SwapOutcome> {
        let victim_probability = self.probability(dst)?;
        let victim_present = self.measure(dst)?;
        let attacker_present = self.measure(src)?;
        if !attacker_present {
            debug!(src, dst, "Capture attempt: attacker absent");
            return Ok(SwapOutcome::default());
        }

        let captured = if victim_present {
            self.remove_piece(dst)?;
            Some(Capture {
                piece: victim,
                square: Square::from_index(dst)?,
                probability: victim_probability,
            })
        } else {
            None
        };
        self.apply_swap_gate(SwapGate::ISwap, src, dst, controls)?;
        debug!(src, dst, captured = captured.is_some(), "Capture resolved");
        Ok(SwapOutcome {
            moved: true,
            captured,
        })
    }

    /// Split the piece on `src` evenly between `d1` and `d2`.
    pub fn split(&mut self, src: usize, d1: usize, d2: usize) -> SimResult<()> {
        self.apply_iswap(src, d1, &Controls::none())?;
        self.apply_sqrt_iswap(d1, d2, &Controls::none())
    }

    /// Recombine the halves on `s1` and `s2` onto `dst`.
    pub fn merge(&mut self, s1: usize, s2: usize, dst: usize) -> SimResult<()> {
        self.apply_sqrt_iswap_dagger(s1, s2, &Controls::none())?;
        let holder = if self.probability(s1)? >= self.probability(s2)? {
            s1
        } else {
            s2
        };
        if holder != dst {
            self.apply_iswap_dagger(holder, dst, &Controls::none())?;
        }
        Ok(())
    }

    fn apply_swap_gate(
        &mut self,
        gate: SwapGate,
        src: usize,
        dst: usize,
        controls: &Controls,
    ) -> SimResult<()> {
        check_index(src)?;
        check_index(dst)?;
        if src == dst {
            return Err(SimError::SameSquare {
                gate: gate.name(),
                square: src,
            });
        }
        let tag = self.moving_tag(gate, src, dst)?;
        let (control_mask, anti_mask) = controls.masks(src, dst)?;

        let src_mask = 1u64 << src;
        let dst_mask = 1u64 << dst;
        let pair = src_mask | dst_mask;
        let phase = gate.phase();

        let previous = std::mem::take(&mut self.amplitudes);
        let mut next: FxHashMap<u64, Complex64> =
            FxHashMap::with_capacity_and_hasher(previous.len() * 2, Default::default());
        for (state, amp) in previous {
            let occupied = state & pair;
            let active = (occupied == src_mask || occupied == dst_mask)
                && state & control_mask == control_mask
                && state & anti_mask == 0;
            if !active {
                *next.entry(state).or_default() += amp;
                continue;
            }
            let swapped = state ^ pair;
            if gate.is_full() {
                *next.entry(swapped).or_default() += amp * phase;
            } else {
                *next.entry(state).or_default() += amp * FRAC_1_SQRT_2;
                *next.entry(swapped).or_default() += amp * phase * FRAC_1_SQRT_2;
            }
        }
        next.retain(|_, amp| amp.norm_sqr() >= AMPLITUDE_EPSILON);
        self.amplitudes = next;

        let presence = self.presence();
        for sq in [src, dst] {
            self.tags[sq] = (presence & (1u64 << sq) != 0).then_some(tag);
        }
        self.invalidate_cache();
        debug!(
            gate = gate.name(),
            src,
            dst,
            piece = %tag,
            basis_states = self.amplitudes.len(),
            "Applied gate"
        );
        Ok(())
    }

    /// The tag carried by a swap, or a precondition error.
    fn moving_tag(&self, gate: SwapGate, src: usize, dst: usize) -> SimResult<Piece> {
        match (self.tags[src], self.tags[dst]) {
            (Some(a), None) => Ok(a),
            (None, Some(b)) => Ok(b),
            (Some(a), Some(b)) if a == b => Ok(a),
            (src_tag, dst_tag) => Err(SimError::Precondition {
                gate: gate.name(),
                src,
                dst,
                src_tag,
                dst_tag,
            }),
        }
    }

    // =========================================================================
    // Measurement
    // =========================================================================

    /// Queue outcomes to use instead of random draws.
    ///
    /// Each queued value is consumed by the next measurement, in order. A
    /// measurement whose outcome is already certain still consumes one, and
    /// fails if the queued value contradicts it.
    pub fn force_outcomes(&mut self, outcomes: impl IntoIterator<Item = bool>) {
        self.forced.extend(outcomes);
    }

    /// Drop any forced outcomes that were not consumed.
    pub fn clear_forced(&mut self) -> usize {
        let pending = self.forced.len();
        self.forced.clear();
        pending
    }

    /// Take the measurements recorded since the last call.
    pub fn drain_measurements(&mut self) -> Vec<Measurement> {
        std::mem::take(&mut self.journal)
    }

    /// The most recent measurement.
    pub fn last_measurement(&self) -> Option<Measurement> {
        self.last_measurement
    }

    /// Measure whether `position` is occupied and collapse the state.
    ///
    /// A queued forced outcome with zero probability fails with
    /// [`SimError::ImpossibleOutcome`]; the state and the queue are left as
    /// they were.
    #[instrument(skip(self))]
    pub fn measure(&mut self, position: usize) -> SimResult<bool> {
        let probability = self.probability(position)?;
        let certain = if probability <= CERTAINTY_EPSILON {
            Some(false)
        } else if probability >= 1.0 - CERTAINTY_EPSILON {
            Some(true)
        } else {
            None
        };

        if let Some(&forced) = self.forced.front() {
            if certain.is_some_and(|c| c != forced) {
                return Err(SimError::ImpossibleOutcome {
                    square: position,
                    outcome: forced,
                    probability,
                });
            }
            self.forced.pop_front();
            self.record(position, forced, probability, certain.is_none())?;
            return Ok(forced);
        }

        let (outcome, random) = match certain {
            Some(outcome) => (outcome, false),
            None => (self.rng.next_f64() < probability, true),
        };
        self.record(position, outcome, probability, random)?;
        Ok(outcome)
    }

    /// Measure `position` with a prescribed outcome.
    ///
    /// Fails without touching the state if the outcome has zero probability.
    pub fn measure_as(&mut self, position: usize, outcome: bool) -> SimResult<()> {
        let probability = self.probability(position)?;
        let impossible = if outcome {
            probability <= CERTAINTY_EPSILON
        } else {
            probability >= 1.0 - CERTAINTY_EPSILON
        };
        if impossible {
            return Err(SimError::ImpossibleOutcome {
                square: position,
                outcome,
                probability,
            });
        }
        let random = probability > CERTAINTY_EPSILON && probability < 1.0 - CERTAINTY_EPSILON;
        self.record(position, outcome, probability, random)
    }

    fn record(&mut self, position: usize, outcome: bool, probability: f64, random: bool) -> SimResult<()> {
        let square = Square::from_index(position)?;
        self.collapse(position, outcome);
        let measurement = Measurement {
            square,
            outcome,
            probability,
            random,
        };
        self.journal.push(measurement);
        self.last_measurement = Some(measurement);
        debug!(
            square = %measurement.square,
            outcome,
            probability,
            random,
            "Measured square"
        );
        Ok(())
    }

    fn collapse(&mut self, position: usize, outcome: bool) {
        let mask = 1u64 << position;
        self.amplitudes
            .retain(|state, _| (state & mask != 0) == outcome);
        let mass: f64 = self.amplitudes.values().map(Complex64::norm_sqr).sum();
        if mass > 0.0 {
            let scale = 1.0 / mass.sqrt();
            for amp in self.amplitudes.values_mut() {
                *amp *= scale;
            }
        }
        self.refresh_tags();
        self.invalidate_cache();
    }

    // =========================================================================
    // Tags
    // =========================================================================

    /// Replace the tag on an occupied square (promotion).
    pub fn change_tag(&mut self, position: usize, piece: Piece) -> SimResult<()> {
        check_index(position)?;
        match self.tags[position] {
            Some(old) => {
                debug!(position, from = %old, to = %piece, "Changed tag");
                self.tags[position] = Some(piece);
                Ok(())
            }
            None => Err(SimError::EmptySquare(position)),
        }
    }

    /// Measure `position` and remove the piece if it is found there.
    pub fn capture(&mut self, position: usize) -> SimResult<Option<Capture>> {
        let Some(piece) = self.tag(position)? else {
            return Ok(None);
        };
        let probability = self.probability(position)?;
        if !self.measure(position)? {
            return Ok(None);
        }
        self.remove_piece(position)?;
        Ok(Some(Capture {
            piece,
            square: Square::from_index(position)?,
            probability,
        }))
    }

    /// Delete a piece that is present with certainty.
    fn remove_piece(&mut self, position: usize) -> SimResult<()> {
        let probability = self.probability(position)?;
        if probability < 1.0 - CERTAINTY_EPSILON {
            return Err(SimError::NotCertain {
                square: position,
                probability,
            });
        }
        let clear = !(1u64 << position);
        let previous = std::mem::take(&mut self.amplitudes);
        for (state, amp) in previous {
            *self.amplitudes.entry(state & clear).or_default() += amp;
        }
        self.tags[position] = None;
        self.invalidate_cache();
        Ok(())
    }

    fn presence(&self) -> u64 {
        self.amplitudes.keys().fold(0u64, |acc, state| acc | state)
    }

    fn refresh_tags(&mut self) {
        let presence = self.presence();
        for (index, tag) in self.tags.iter_mut().enumerate() {
            if presence & (1u64 << index) == 0 {
                *tag = None;
            }
        }
    }

    fn invalidate_cache(&self) {
        for slot in &self.probability_cache {
            slot.set(None);
        }
    }
}

fn check_index(index: usize) -> SimResult<()> {
    if index < BOARD_SQUARES {
        Ok(())
    } else {
        Err(SimError::IndexOutOfRange(index))
    }
}

// =========================================================================
// Board rendering
// =========================================================================

impl fmt::Display for QuantumStateSimulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (tags, probabilities) = self.marginal_probability();
        writeln!(f, "   +{}+", "-".repeat(8 * 7))?;
        for rank in (0..8).rev() {
            write!(f, " {} |", rank + 1)?;
            for file in 0..8 {
                let index = rank * 8 + file;
                let cell = match tags[index] {
                    None => "  .".to_string(),
                    Some(piece) if probabilities[index] >= 1.0 - 1e-6 => format!("  {piece}"),
                    Some(piece) => format!("{piece}:{:.2}", probabilities[index]),
                };
                write!(f, "{cell:^7}")?;
            }
            writeln!(f, "|")?;
        }
        writeln!(f, "   +{}+", "-".repeat(8 * 7))?;
        write!(f, "    ")?;
        for file in 'a'..='h' {
            write!(f, "{file:^7}")?;
        }
        writeln!(f)
    }
}
