//! 64-bit occupancy vectors.
//!
//! Bit `i` corresponds to square `i` (a1 = 0 … h8 = 63). The hex form is the
//! plain 16-digit rendering of the underlying `u64`, so the standard starting
//! position prints as `ffff00000000ffff`.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitXor, Not};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{CoreError, CoreResult};

/// Number of squares on the board.
pub const BOARD_SQUARES: usize = 64;

/// Immutable 64-bit occupancy pattern.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BitVector(u64);

impl BitVector {
    /// The empty board.
    pub const EMPTY: BitVector = BitVector(0);

    /// Ranks 1, 2, 7 and 8 occupied.
    pub const STANDARD: BitVector = BitVector(0xFFFF_0000_0000_FFFF);

    /// Wrap a raw `u64` (bit 0 = a1).
    pub const fn from_u64(bits: u64) -> Self {
        Self(bits)
    }

    /// The raw `u64` value.
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Occupancy of the standard chess starting position.
    pub const fn standard_starting_position() -> Self {
        Self::STANDARD
    }

    /// Build from an array of 64 zeros and ones, index 0 first.
    pub fn from_bits(bits: &[u8]) -> CoreResult<Self> {
        if bits.len() != BOARD_SQUARES {
            return Err(CoreError::BitLength(bits.len()));
        }
        let mut value = 0u64;
        for (index, &bit) in bits.iter().enumerate() {
            match bit {
                0 => {}
                1 => value |= 1 << index,
                other => return Err(CoreError::BitValue { index, value: other }),
            }
        }
        Ok(Self(value))
    }

    /// Parse a hex string of at most 16 digits (an optional `0x` prefix is accepted).
    pub fn from_hex(hex: &str) -> CoreResult<Self> {
        let digits = hex
            .strip_prefix("0x")
            .or_else(|| hex.strip_prefix("0X"))
            .unwrap_or(hex);
        if digits.is_empty()
            || digits.len() > 16
            || !digits.chars().all(|c| c.is_ascii_hexdigit())
        {
            return Err(CoreError::InvalidHex(hex.to_string()));
        }
        u64::from_str_radix(digits, 16)
            .map(Self)
            .map_err(|_| CoreError::InvalidHex(hex.to_string()))
    }

    /// Render as 16 lowercase hex digits.
    pub fn to_hex(self) -> String {
        format!("{:016x}", self.0)
    }

    /// Read bit `index`.
    pub fn get(self, index: usize) -> CoreResult<bool> {
        Ok(self.0 & mask(index)? != 0)
    }

    /// Copy with bit `index` set to `value`.
    #[must_use = "BitVector is immutable; set returns a new value"]
    pub fn set(self, index: usize, value: bool) -> CoreResult<Self> {
        let m = mask(index)?;
        Ok(if value {
            Self(self.0 | m)
        } else {
            Self(self.0 & !m)
        })
    }

    /// Copy with bit `index` inverted.
    #[must_use = "BitVector is immutable; flip returns a new value"]
    pub fn flip(self, index: usize) -> CoreResult<Self> {
        Ok(Self(self.0 ^ mask(index)?))
    }

    /// Number of set bits.
    pub fn pop_count(self) -> u32 {
        self.0.count_ones()
    }

    /// Indices of set bits in increasing order.
    pub fn set_positions(self) -> Vec<usize> {
        self.iter_ones().collect()
    }

    /// Iterate the indices of set bits in increasing order.
    pub fn iter_ones(self) -> impl Iterator<Item = usize> {
        let mut rest = self.0;
        std::iter::from_fn(move || {
            if rest == 0 {
                return None;
            }
            let index = rest.trailing_zeros() as usize;
            rest &= rest - 1;
            Some(index)
        })
    }

    /// Bitwise AND.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    /// Bitwise OR.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Bitwise XOR.
    #[must_use]
    pub fn xor(self, other: Self) -> Self {
        Self(self.0 ^ other.0)
    }

    /// True when no bit is set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

fn mask(index: usize) -> CoreResult<u64> {
    if index < BOARD_SQUARES {
        Ok(1 << index)
    } else {
        Err(CoreError::IndexOutOfRange(index))
    }
}

impl BitAnd for BitVector {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        self.and(rhs)
    }
}

impl BitOr for BitVector {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.or(rhs)
    }
}

impl BitXor for BitVector {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self {
        self.xor(rhs)
    }
}

impl Not for BitVector {
    type Output = Self;

    fn not(self) -> Self {
        Self(!self.0)
    }
}

impl From<u64> for BitVector {
    fn from(bits: u64) -> Self {
        Self(bits)
    }
}

impl From<BitVector> for u64 {
    fn from(bits: BitVector) -> Self {
        bits.0
    }
}

impl FromStr for BitVector {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        Self::from_hex(s)
    }
}

impl fmt::Display for BitVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for BitVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitVector({})", self.to_hex())
    }
}

impl Serialize for BitVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for BitVector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_position() {
        let v = BitVector::standard_starting_position();
        assert_eq!(v.pop_count(), 32);
        assert_eq!(v.to_hex(), "ffff00000000ffff");
        for index in 0..16 {
            assert!(v.get(index).unwrap());
            assert!(v.get(index + 48).unwrap());
        }
        for index in 16..48 {
            assert!(!v.get(index).unwrap());
        }
    }

    #[test]
    fn test_set_and_flip_are_pure() {
        let v = BitVector::EMPTY;
        let w = v.set(12, true).unwrap();
        assert!(v.is_empty());
        assert!(w.get(12).unwrap());
        assert_eq!(w.flip(12).unwrap(), v);
        assert_eq!(w.set(12, false).unwrap(), v);
    }

    #[test]
    fn test_from_bits_rejects_bad_input() {
        assert_eq!(BitVector::from_bits(&[0; 63]), Err(CoreError::BitLength(63)));
        let mut bits = [0u8; 64];
        bits[5] = 2;
        assert_eq!(
            BitVector::from_bits(&bits),
            Err(CoreError::BitValue { index: 5, value: 2 })
        );
        bits[5] = 1;
        assert_eq!(BitVector::from_bits(&bits).unwrap().set_positions(), vec![5]);
    }

    #[test]
    fn test_hex_parsing() {
        assert_eq!(
            BitVector::from_hex("ffff00000000ffff").unwrap(),
            BitVector::STANDARD
        );
        assert_eq!(BitVector::from_hex("0x1").unwrap().set_positions(), vec![0]);
        assert!(BitVector::from_hex("").is_err());
        assert!(BitVector::from_hex("xyz").is_err());
        assert!(BitVector::from_hex("10000000000000000").is_err());
    }

    #[test]
    fn test_index_out_of_range() {
        assert_eq!(BitVector::EMPTY.get(64), Err(CoreError::IndexOutOfRange(64)));
        assert!(BitVector::EMPTY.flip(100).is_err());
    }

    #[test]
    fn test_bitwise_ops() {
        let a = BitVector::from_u64(0b1100);
        let b = BitVector::from_u64(0b1010);
        assert_eq!((a & b).as_u64(), 0b1000);
        assert_eq!((a | b).as_u64(), 0b1110);
        assert_eq!((a ^ b).as_u64(), 0b0110);
        assert_eq!(a.and(b), a & b);
    }

    #[test]
    fn test_serde_as_hex() {
        let json = serde_json::to_string(&BitVector::STANDARD).unwrap();
        assert_eq!(json, "\"ffff00000000ffff\"");
        let back: BitVector = serde_json::from_str(&json).unwrap();
        assert_eq!(back, BitVector::STANDARD);
    }
}
