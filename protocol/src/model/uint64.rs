//! Exact unsigned 64-bit values.
//!
//! Internally a [`UInt64`] is a native `u64`. The two-word `[lower, higher]`
//! form only exists at the boundary with DTOs that carry the value as a
//! pair of 32-bit words; [`UInt64::from_words`] and [`UInt64::to_words`]
//! are the lossless conversions across that boundary.
//!
//! JSON consumers commonly store these values in IEEE doubles, which lose
//! precision above 2^53. [`UInt64::compact`] refuses to hand out such values
//! instead of truncating them; [`UInt64::value`] is the escape hatch that
//! always works.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Largest integer a double-precision float represents exactly.
pub const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

/// An exact unsigned 64-bit integer (fees, deadlines, amounts, ids).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UInt64(u64);

impl UInt64 {
    pub const ZERO: UInt64 = UInt64(0);

    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Builds a value from a signed host integer; negatives are rejected.
    pub fn from_uint(value: i128) -> Result<Self> {
        if value < 0 {
            return Err(Error::invalid_argument(format!(
                "unsigned value must not be negative, got {}",
                value
            )));
        }
        u64::try_from(value)
            .map(Self)
            .map_err(|_| Error::invalid_argument(format!("value {} exceeds 64 bits", value)))
    }

    /// Builds a value from `[lower, higher]` 32-bit words.
    ///
    /// Exactly two words are required and each must lie in `[0, 2^32 - 1]`.
    pub fn from_words(words: &[i64]) -> Result<Self> {
        let [lower, higher] = words else {
            return Err(Error::invalid_argument(format!(
                "expected 2 words, got {}",
                words.len()
            )));
        };
        let lower = Self::word(*lower)?;
        let higher = Self::word(*higher)?;
        Ok(Self(((higher as u64) << 32) | lower as u64))
    }

    fn word(w: i64) -> Result<u32> {
        u32::try_from(w)
            .map_err(|_| Error::invalid_argument(format!("word {} is outside [0, 2^32-1]", w)))
    }

    /// Returns the `[lower, higher]` word pair.
    pub fn to_words(self) -> [u32; 2] {
        [self.0 as u32, (self.0 >> 32) as u32]
    }

    pub fn lower(self) -> u32 {
        self.0 as u32
    }

    pub fn higher(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Parses 16 hex characters (case-insensitive).
    pub fn from_hex(input: &str) -> Result<Self> {
        if input.len() != 16 {
            return Err(Error::invalid_argument(format!(
                "expected 16 hex characters, got {}",
                input.len()
            )));
        }
        u64::from_str_radix(input, 16)
            .map(Self)
            .map_err(|e| Error::invalid_argument(format!("invalid hex '{}': {}", input, e)))
    }

    /// Parses a decimal string.
    pub fn from_numeric_str(input: &str) -> Result<Self> {
        if input.is_empty() || !input.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::invalid_argument(format!(
                "'{}' is not an unsigned decimal",
                input
            )));
        }
        input
            .parse::<u64>()
            .map(Self)
            .map_err(|e| Error::invalid_argument(format!("'{}': {}", input, e)))
    }

    /// 16 uppercase hex characters, zero padded.
    pub fn to_hex(self) -> String {
        format!("{:016X}", self.0)
    }

    /// The full native value.
    pub fn value(self) -> u64 {
        self.0
    }

    /// Returns the value only if it survives a round trip through a
    /// double-precision number.
    pub fn compact(self) -> Option<u64> {
        (self.0 <= MAX_SAFE_INTEGER).then_some(self.0)
    }

    pub fn to_le_bytes(self) -> [u8; 8] {
        self.0.to_le_bytes()
    }

    pub fn from_le_bytes(bytes: [u8; 8]) -> Self {
        Self(u64::from_le_bytes(bytes))
    }
}

impl From<u64> for UInt64 {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<u32> for UInt64 {
    fn from(value: u32) -> Self {
        Self(value as u64)
    }
}

impl From<UInt64> for u64 {
    fn from(value: UInt64) -> Self {
        value.0
    }
}

impl FromStr for UInt64 {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_numeric_str(s)
    }
}

impl fmt::Display for UInt64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Serialized as a decimal string, the way node DTOs carry 64-bit values.
impl Serialize for UInt64 {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

/// Accepts a decimal string, a non-negative integer, or a `[lower, higher]`
/// word pair.
impl<'de> Deserialize<'de> for UInt64 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Number(u64),
            Words(Vec<i64>),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Text(s) => UInt64::from_numeric_str(&s).map_err(de::Error::custom),
            Repr::Number(n) => Ok(UInt64(n)),
            Repr::Words(w) => UInt64::from_words(&w).map_err(de::Error::custom),
        }
    }
}
