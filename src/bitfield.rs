//! Bit tests over repository bitmask columns
//!
//! `WEEKLY_LOGIC` and `MONTHLY_LOGIC` are decimal strings whose values can
//! exceed 64 bits, so they are held as [`BigUint`]. Anything that does not
//! parse as an unsigned decimal integer reads as zero.

use std::ops::RangeInclusive;

use num_bigint::BigUint;

/// An unsigned arbitrary-precision bitmask
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bitmask(BigUint);

impl Bitmask {
    /// Parse a decimal column value; missing or non-numeric input is zero
    pub fn parse(raw: Option<&str>) -> Self {
        let value = raw
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .and_then(|s| s.parse::<BigUint>().ok())
            .unwrap_or_default();
        Self(value)
    }

    pub fn from_biguint(value: BigUint) -> Self {
        Self(value)
    }

    /// Whether the zero-indexed bit (from the least significant end) is 1
    pub fn is_set(&self, bit: u64) -> bool {
        self.0.bit(bit)
    }

    /// Set bit positions within `range`, ascending
    pub fn set_bits(&self, range: RangeInclusive<u64>) -> impl Iterator<Item = u64> + '_ {
        range.filter(move |bit| self.is_set(*bit))
    }

    pub fn value(&self) -> &BigUint {
        &self.0
    }
}

impl From<u64> for Bitmask {
    fn from(value: u64) -> Self {
        Self(BigUint::from(value))
    }
}

/// Test one bit of a raw decimal column value
pub fn is_bit_set(raw: Option<&str>, bit: u64) -> bool {
    Bitmask::parse(raw).is_set(bit)
}
