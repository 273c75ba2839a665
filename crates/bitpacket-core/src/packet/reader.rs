use bitvec::prelude::*;

use super::error::PacketError;
use super::layout;

/// Forward-only cursor over a bounded bit slice.
///
/// Every read either consumes exactly the requested width or fails with
/// [`PacketError::Truncated`] without moving.
pub struct BitReader<'a> {
    bits: &'a BitSlice<u8, Msb0>,
}

impl<'a> BitReader<'a> {
    pub fn new(bits: &'a BitSlice<u8, Msb0>) -> Self {
        Self { bits }
    }

    pub fn remaining(&self) -> &'a BitSlice<u8, Msb0> {
        self.bits
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn require_len(&self, field: &'static str, needed: usize) -> Result<(), PacketError> {
        if self.bits.len() < needed {
            return Err(PacketError::Truncated {
                field,
                needed,
                available: self.bits.len(),
            });
        }
        Ok(())
    }

    pub fn read_slice(
        &mut self,
        field: &'static str,
        width: usize,
    ) -> Result<&'a BitSlice<u8, Msb0>, PacketError> {
        self.require_len(field, width)?;
        let (head, rest) = self.bits.split_at(width);
        self.bits = rest;
        Ok(head)
    }

    /// Read `width` bits (at most 64) as an unsigned MSB-first integer.
    pub fn read_uint(&mut self, field: &'static str, width: usize) -> Result<u64, PacketError> {
        debug_assert!(width <= 64);
        let head = self.read_slice(field, width)?;
        Ok(head
            .iter()
            .by_vals()
            .fold(0u64, |acc, bit| (acc << 1) | u64::from(bit)))
    }

    pub fn read_flag(&mut self, field: &'static str) -> Result<bool, PacketError> {
        Ok(self.read_uint(field, 1)? == 1)
    }

    pub fn read_version(&mut self) -> Result<u8, PacketError> {
        self.read_uint("version", layout::VERSION_BITS).map(|v| v as u8)
    }

    pub fn read_type_id(&mut self) -> Result<u8, PacketError> {
        self.read_uint("type id", layout::TYPE_ID_BITS).map(|v| v as u8)
    }

    pub fn read_length_type(&mut self) -> Result<bool, PacketError> {
        self.read_flag("length type")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::expand;

    #[test]
    fn read_uint_is_msb_first() {
        let bits = expand("D2FE28").unwrap();
        let mut reader = BitReader::new(bits.as_bits());
        assert_eq!(reader.read_version().unwrap(), 6);
        assert_eq!(reader.read_type_id().unwrap(), 4);
        assert_eq!(reader.read_uint("group", 5).unwrap(), 0b10111);
        assert_eq!(reader.remaining().len(), 24 - 11);
    }

    #[test]
    fn truncated_read_does_not_advance() {
        let bits = expand("F").unwrap();
        let mut reader = BitReader::new(bits.as_bits());
        let err = reader.read_uint("bit length", 15).unwrap_err();
        assert_eq!(
            err,
            PacketError::Truncated {
                field: "bit length",
                needed: 15,
                available: 4
            }
        );
        assert_eq!(reader.remaining().len(), 4);
    }

    #[test]
    fn read_slice_splits_off_prefix() {
        let bits = expand("A5").unwrap();
        let mut reader = BitReader::new(bits.as_bits());
        let head = reader.read_slice("prefix", 3).unwrap();
        assert_eq!(head.len(), 3);
        assert!(!reader.read_flag("flag").unwrap());
        assert_eq!(reader.remaining().len(), 4);
        assert!(!reader.is_empty());
    }
}
