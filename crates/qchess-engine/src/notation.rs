//! Compact move-command notation.
//!
//! ```text
//! e2,e4        normal move or capture
//! b1,a3c3      split b1 into a3 and c3
//! a3c3,b1      merge a3 and c3 into b1
//! e1h1,g1f1    castle, king and rook written out
//! e7,e8q       promotion (q, r, b or n)
//! b1,a3c3,1    trailing field forces measurement outcomes in order
//! ```

use std::fmt;
use std::str::FromStr;

use qchess_core::{PieceKind, Square};

use crate::error::NotationError;
use crate::request::MoveRequest;

/// A parsed command: the move plus any forced measurement outcomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveCommand {
    pub request: MoveRequest,
    /// Outcomes consumed by the move's measurements, in order.
    pub outcomes: Vec<bool>,
}

impl MoveCommand {
    /// Parse a command string.
    pub fn parse(input: &str) -> Result<Self, NotationError> {
        let input = input.trim().to_ascii_lowercase();
        if input.is_empty() {
            return Err(NotationError::Empty);
        }
        let fields: Vec<&str> = input.split(',').map(str::trim).collect();
        if !(2..=3).contains(&fields.len()) {
            return Err(NotationError::FieldCount(fields.len()));
        }

        let sources = parse_squares(fields[0])?;
        let (targets, promotion) = parse_targets(fields[1])?;
        let outcomes = match fields.get(2) {
            Some(field) => parse_outcomes(field)?,
            None => Vec::new(),
        };

        let mut request = MoveRequest::new(sources[0], targets[0]);
        request.src_second = sources.get(1).copied();
        request.dst_second = targets.get(1).copied();
        request.promotion = promotion;
        Ok(Self { request, outcomes })
    }
}

impl FromStr for MoveCommand {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for MoveCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.request)?;
        if !self.outcomes.is_empty() {
            let bits: String = self
                .outcomes
                .iter()
                .map(|&o| if o { '1' } else { '0' })
                .collect();
            write!(f, ",{bits}")?;
        }
        Ok(())
    }
}

impl From<MoveRequest> for MoveCommand {
    fn from(request: MoveRequest) -> Self {
        Self {
            request,
            outcomes: Vec::new(),
        }
    }
}

/// One or two squares: `e2` or `a3c3`.
fn parse_squares(field: &str) -> Result<Vec<Square>, NotationError> {
    if !field.is_ascii() || !matches!(field.len(), 2 | 4) {
        return Err(NotationError::Malformed(field.to_string()));
    }
    (0..field.len())
        .step_by(2)
        .map(|i| {
            field[i..i + 2]
                .parse::<Square>()
                .map_err(|_| NotationError::Square(field.to_string()))
        })
        .collect()
}

/// Destination field; a three-character field carries a promotion letter.
fn parse_targets(field: &str) -> Result<(Vec<Square>, Option<PieceKind>), NotationError> {
    if field.is_ascii() && field.len() == 3 {
        let squares = parse_squares(&field[..2])?;
        let letter = field[2..].chars().next().unwrap_or(' ');
        let kind = PieceKind::from_letter(letter)
            .ok()
            .filter(|k| k.is_promotion_target())
            .ok_or(NotationError::Promotion(letter))?;
        return Ok((squares, Some(kind)));
    }
    Ok((parse_squares(field)?, None))
}

fn parse_outcomes(field: &str) -> Result<Vec<bool>, NotationError> {
    if field.is_empty() {
        return Err(NotationError::Outcome(field.to_string()));
    }
    field
        .chars()
        .map(|c| match c {
            '0' => Ok(false),
            '1' => Ok(true),
            _ => Err(NotationError::Outcome(field.to_string())),
        })
        .collect()
}
