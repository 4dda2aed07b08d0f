//! Board squares.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{CoreError, CoreResult};

const FILES: &[u8; 8] = b"abcdefgh";

/// A board square. File and rank are zero-based; the index is `file + rank * 8`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square(u8);

impl Square {
    /// Square from a linear index in 0..64.
    pub fn from_index(index: usize) -> CoreResult<Self> {
        u8::try_from(index)
            .ok()
            .filter(|&i| i < 64)
            .map(Self)
            .ok_or(CoreError::IndexOutOfRange(index))
    }

    /// Square from zero-based file and rank.
    pub fn new(file: u8, rank: u8) -> CoreResult<Self> {
        if file < 8 && rank < 8 {
            Ok(Self(file + rank * 8))
        } else {
            Err(CoreError::InvalidSquare(format!("file={file}, rank={rank}")))
        }
    }

    /// Square offset by `(df, dr)`, or `None` when it leaves the board.
    pub fn offset(self, df: i8, dr: i8) -> Option<Self> {
        let file = i8::try_from(self.file()).ok()? + df;
        let rank = i8::try_from(self.rank()).ok()? + dr;
        if (0..8).contains(&file) && (0..8).contains(&rank) {
            Some(Self((file + rank * 8) as u8))
        } else {
            None
        }
    }

    /// Linear index (a1 = 0, h8 = 63).
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Zero-based file (a = 0).
    pub const fn file(self) -> u8 {
        self.0 % 8
    }

    /// Zero-based rank (rank 1 = 0).
    pub const fn rank(self) -> u8 {
        self.0 / 8
    }

    /// All 64 squares in index order.
    pub fn all() -> impl Iterator<Item = Square> {
        (0u8..64).map(Square)
    }

    /// Squares strictly between `self` and `other` on a shared rank, file or
    /// diagonal, ordered from `self` outward. `None` when the two squares are
    /// not aligned.
    pub fn between(self, other: Square) -> Option<Vec<Square>> {
        let df = i16::from(other.file()) - i16::from(self.file());
        let dr = i16::from(other.rank()) - i16::from(self.rank());
        if df == 0 && dr == 0 {
            return Some(Vec::new());
        }
        if df != 0 && dr != 0 && df.abs() != dr.abs() {
            return None;
        }
        let steps = df.abs().max(dr.abs());
        let (sf, sr) = (df.signum() as i8, dr.signum() as i8);
        let mut path = Vec::with_capacity(steps.saturating_sub(1) as usize);
        let mut current = self;
        for _ in 1..steps {
            current = current.offset(sf, sr)?;
            path.push(current);
        }
        Some(path)
    }
}

impl FromStr for Square {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(CoreError::InvalidSquare(s.to_string()));
        }
        let file = FILES
            .iter()
            .position(|&f| f == bytes[0])
            .ok_or_else(|| CoreError::InvalidSquare(s.to_string()))?;
        let rank = match bytes[1] {
            b'1'..=b'8' => bytes[1] - b'1',
            _ => return Err(CoreError::InvalidSquare(s.to_string())),
        };
        Self::new(file as u8, rank)
    }
}

impl TryFrom<usize> for Square {
    type Error = CoreError;

    fn try_from(index: usize) -> CoreResult<Self> {
        Self::from_index(index)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            FILES[self.file() as usize] as char,
            self.rank() + 1
        )
    }
}

impl fmt::Debug for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl Serialize for Square {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Square {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
