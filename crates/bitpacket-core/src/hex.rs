//! Hexadecimal transmission expansion.
//!
//! Each hex digit expands to four bits, most-significant bit first. The
//! resulting [`BitString`] is immutable and is the only input the packet
//! decoder reads from.

use std::fmt;

use bitvec::prelude::*;
use thiserror::Error;

/// Number of bits contributed by one hexadecimal digit.
pub const BITS_PER_HEX_DIGIT: usize = 4;

/// Errors returned while expanding a transmission.
///
/// # Examples
/// ```
/// use bitpacket_core::{HexError, expand};
///
/// let err = expand("D2G").unwrap_err();
/// assert!(matches!(err, HexError::InvalidDigit { digit: 'G', position: 2 }));
/// ```
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HexError {
    #[error("invalid hex digit {digit:?} at position {position}")]
    InvalidDigit { digit: char, position: usize },
    #[error("empty transmission")]
    Empty,
}

/// Expanded transmission: an ordered, immutable sequence of bits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitString {
    bits: BitVec<u8, Msb0>,
}

impl BitString {
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Borrow the bits for decoding.
    pub fn as_bits(&self) -> &BitSlice<u8, Msb0> {
        self.bits.as_bitslice()
    }
}

impl fmt::Display for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.bits.iter().by_vals() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// Expand a hexadecimal transmission into its bit string.
///
/// Digits are case-insensitive. Whitespace is not skipped; callers trim the
/// raw transmission before expanding it.
///
/// # Examples
/// ```
/// use bitpacket_core::expand;
///
/// let bits = expand("D2FE28")?;
/// assert_eq!(bits.to_string(), "110100101111111000101000");
/// # Ok::<(), bitpacket_core::HexError>(())
/// ```
pub fn expand(transmission: &str) -> Result<BitString, HexError> {
    if transmission.is_empty() {
        return Err(HexError::Empty);
    }
    let mut bits = BitVec::<u8, Msb0>::with_capacity(transmission.len() * BITS_PER_HEX_DIGIT);
    for (position, digit) in transmission.chars().enumerate() {
        let nibble = digit
            .to_digit(16)
            .ok_or(HexError::InvalidDigit { digit, position })?;
        for shift in (0..BITS_PER_HEX_DIGIT).rev() {
            bits.push((nibble >> shift) & 1 == 1);
        }
    }
    Ok(BitString { bits })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_literal_example() {
        let bits = expand("D2FE28").unwrap();
        assert_eq!(bits.len(), 24);
        assert_eq!(bits.to_string(), "110100101111111000101000");
    }

    #[test]
    fn expand_is_case_insensitive() {
        assert_eq!(expand("d2fe28").unwrap(), expand("D2FE28").unwrap());
    }

    #[test]
    fn expand_every_digit() {
        let bits = expand("0123456789ABCDEF").unwrap();
        assert_eq!(
            bits.to_string(),
            "0000000100100011010001010110011110001001101010111100110111101111"
        );
    }

    #[test]
    fn expand_rejects_non_hex() {
        let err = expand("38006Z").unwrap_err();
        assert_eq!(
            err,
            HexError::InvalidDigit {
                digit: 'Z',
                position: 5
            }
        );
        assert!(err.to_string().contains("invalid hex digit"));
    }

    #[test]
    fn expand_rejects_embedded_whitespace() {
        let err = expand("D2 FE28").unwrap_err();
        assert!(matches!(err, HexError::InvalidDigit { digit: ' ', .. }));
    }

    #[test]
    fn expand_rejects_empty() {
        assert_eq!(expand("").unwrap_err(), HexError::Empty);
    }
}
