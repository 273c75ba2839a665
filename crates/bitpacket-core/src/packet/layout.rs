//! Field widths of the packet wire format, in bits, MSB first.

pub const VERSION_BITS: usize = 3;
pub const TYPE_ID_BITS: usize = 3;
pub const HEADER_BITS: usize = VERSION_BITS + TYPE_ID_BITS;

pub const LITERAL_TYPE_ID: u8 = 4;
pub const LITERAL_GROUP_BITS: usize = 5;
pub const LITERAL_NIBBLE_BITS: usize = LITERAL_GROUP_BITS - 1;

pub const LENGTH_TYPE_BITS: usize = 1;
pub const LENGTH_TYPE_TOTAL_BITS: bool = false;
pub const LENGTH_TYPE_PACKET_COUNT: bool = true;
pub const SUBPACKET_BITS_LEN: usize = 15;
pub const SUBPACKET_COUNT_LEN: usize = 11;

/// Nesting limit for operator packets.
///
/// Each level costs at least 18 bits (header, length type and an 11-bit
/// count), so reaching it takes a transmission of more than 4600 hex digits.
pub const MAX_DEPTH: usize = 1024;
