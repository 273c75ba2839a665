use bitvec::prelude::*;
use tracing::trace;

use super::error::PacketError;
use super::layout;
use super::reader::BitReader;
use super::{Packet, Payload};

/// Decode one packet from the start of `bits`.
///
/// Returns the packet and the bits left after it, which for a top-level
/// packet are normally zero padding.
///
/// # Examples
/// ```
/// use bitpacket_core::{decode_packet, expand};
///
/// let bits = expand("D2FE28")?;
/// let (packet, rest) = decode_packet(bits.as_bits())?;
/// assert_eq!(packet.literal_value(), Some(2021));
/// assert_eq!(rest.len(), 3);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn decode_packet(
    bits: &BitSlice<u8, Msb0>,
) -> Result<(Packet, &BitSlice<u8, Msb0>), PacketError> {
    let mut reader = BitReader::new(bits);
    let packet = decode_next(&mut reader, 0)?;
    Ok((packet, reader.remaining()))
}

fn decode_next(reader: &mut BitReader<'_>, depth: usize) -> Result<Packet, PacketError> {
    reader.require_len("packet header", layout::HEADER_BITS)?;
    let version = reader.read_version()?;
    let type_id = reader.read_type_id()?;
    trace!(version, type_id, depth, "packet header");

    let payload = if type_id == layout::LITERAL_TYPE_ID {
        Payload::Literal {
            value: read_literal(reader)?,
        }
    } else {
        if depth >= layout::MAX_DEPTH {
            return Err(PacketError::TooDeep {
                limit: layout::MAX_DEPTH,
            });
        }
        Payload::Operator {
            children: read_children(reader, depth + 1)?,
        }
    };

    Ok(Packet {
        version,
        type_id,
        payload,
    })
}

fn read_literal(reader: &mut BitReader<'_>) -> Result<u64, PacketError> {
    let mut value = 0u64;
    let mut groups = 0usize;
    loop {
        reader.require_len("literal group", layout::LITERAL_GROUP_BITS)?;
        let more = reader.read_flag("literal group")?;
        let nibble = reader.read_uint("literal group", layout::LITERAL_NIBBLE_BITS)?;
        groups += 1;
        if value.leading_zeros() < layout::LITERAL_NIBBLE_BITS as u32 {
            return Err(PacketError::LiteralOverflow { groups });
        }
        value = (value << layout::LITERAL_NIBBLE_BITS) | nibble;
        if !more {
            return Ok(value);
        }
    }
}

fn read_children(reader: &mut BitReader<'_>, depth: usize) -> Result<Vec<Packet>, PacketError> {
    let length_type = reader.read_length_type()?;
    let mut children = Vec::new();

    if length_type == layout::LENGTH_TYPE_TOTAL_BITS {
        let total = reader.read_uint("subpacket bit length", layout::SUBPACKET_BITS_LEN)? as usize;
        let range = reader.read_slice("subpackets", total)?;
        // Children are confined to the declared range; overruns surface as truncation.
        let mut sub = BitReader::new(range);
        while !sub.is_empty() {
            children.push(decode_next(&mut sub, depth)?);
        }
    } else {
        let count = reader.read_uint("subpacket count", layout::SUBPACKET_COUNT_LEN)? as usize;
        children.reserve(count);
        for _ in 0..count {
            children.push(decode_next(reader, depth)?);
        }
    }

    Ok(children)
}

#[cfg(test)]
mod tests {
    use bitvec::prelude::*;

    use super::*;
    use crate::hex::expand;

    fn decode(hex: &str) -> (Packet, usize) {
        let bits = expand(hex).unwrap();
        let (packet, rest) = decode_packet(bits.as_bits()).unwrap();
        (packet, rest.len())
    }

    fn literal_values(packet: &Packet) -> Vec<u64> {
        packet
            .children()
            .iter()
            .map(|child| child.literal_value().unwrap())
            .collect()
    }

    #[test]
    fn decode_literal() {
        let (packet, rest) = decode("D2FE28");
        assert_eq!(packet.version, 6);
        assert_eq!(packet.type_id, 4);
        assert_eq!(packet.payload, Payload::Literal { value: 2021 });
        assert_eq!(rest, 3);
    }

    #[test]
    fn decode_operator_with_bit_length() {
        let (packet, _) = decode("38006F45291200");
        assert_eq!(packet.version, 1);
        assert_eq!(packet.type_id, 6);
        assert_eq!(literal_values(&packet), vec![10, 20]);
    }

    #[test]
    fn decode_operator_with_packet_count() {
        let (packet, _) = decode("EE00D40C823060");
        assert_eq!(packet.version, 7);
        assert_eq!(packet.type_id, 3);
        assert_eq!(literal_values(&packet), vec![1, 2, 3]);
    }

    #[test]
    fn decode_nested_operators() {
        let (packet, _) = decode("8A004A801A8002F478");
        assert_eq!(packet.version, 4);
        let child = &packet.children()[0];
        assert_eq!(child.version, 1);
        let grandchild = &child.children()[0];
        assert_eq!(grandchild.version, 5);
        let leaf = &grandchild.children()[0];
        assert_eq!(leaf.version, 6);
        assert!(leaf.is_literal());
    }

    #[test]
    fn decode_leaves_remaining_bits_for_siblings() {
        // Two literals back to back: 6/4/2021 then 2/4/10 (0b010_100_01010).
        let bits = bitvec![u8, Msb0;
            1, 1, 0, 1, 0, 0, 1, 0, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 1, 0, 1,
            0, 1, 0, 1, 0, 0, 0, 1, 0, 1, 0
        ];
        let (first, rest) = decode_packet(&bits).unwrap();
        assert_eq!(first.literal_value(), Some(2021));
        let (second, rest) = decode_packet(rest).unwrap();
        assert_eq!(second.version, 2);
        assert_eq!(second.literal_value(), Some(10));
        assert!(rest.is_empty());
    }

    #[test]
    fn decode_truncated_header() {
        let bits = expand("D").unwrap();
        let err = decode_packet(bits.as_bits()).unwrap_err();
        assert_eq!(
            err,
            PacketError::Truncated {
                field: "packet header",
                needed: 6,
                available: 4
            }
        );
    }

    #[test]
    fn decode_truncated_literal_group() {
        // Continuation flag set on the last complete group.
        let bits = expand("D2FE").unwrap();
        let err = decode_packet(bits.as_bits()).unwrap_err();
        assert!(matches!(
            err,
            PacketError::Truncated {
                field: "literal group",
                ..
            }
        ));
    }

    #[test]
    fn decode_truncated_subpacket_range() {
        let bits = expand("38006F452912").unwrap();
        let err = decode_packet(bits.as_bits()).unwrap_err();
        assert!(matches!(
            err,
            PacketError::Truncated {
                field: "subpackets",
                needed: 27,
                ..
            }
        ));
    }

    #[test]
    fn decode_child_overrunning_bit_length_is_truncated() {
        // Same operator as 38006F45291200 but declaring 26 bits instead of 27.
        let bits = bitvec![u8, Msb0;
            0, 0, 1, 1, 1, 0, 0,
            0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 0, 1, 0,
            1, 1, 0, 1, 0, 0, 0, 1, 0, 1, 0,
            0, 1, 0, 1, 0, 0, 1, 0, 0, 0, 1, 0, 0, 1, 0, 0
        ];
        let err = decode_packet(&bits).unwrap_err();
        assert_eq!(
            err,
            PacketError::Truncated {
                field: "literal group",
                needed: 5,
                available: 4
            }
        );
    }

    #[test]
    fn decode_missing_children_by_count() {
        // Operator announcing three children followed by only one literal.
        let bits = bitvec![u8, Msb0;
            1, 1, 1, 0, 1, 1, 1,
            0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1,
            0, 1, 0, 1, 0, 0, 0, 0, 0, 0, 1
        ];
        let err = decode_packet(&bits).unwrap_err();
        assert_eq!(
            err,
            PacketError::Truncated {
                field: "packet header",
                needed: 6,
                available: 0
            }
        );
    }

    #[test]
    fn decode_literal_overflow() {
        // Header 0/4 then seventeen 0xF groups.
        let mut bits = bitvec![u8, Msb0; 0, 0, 0, 1, 0, 0];
        for group in 0..17 {
            bits.push(group < 16);
            bits.extend_from_bitslice(bits![u8, Msb0; 1, 1, 1, 1]);
        }
        let err = decode_packet(&bits).unwrap_err();
        assert_eq!(err, PacketError::LiteralOverflow { groups: 17 });
    }

    #[test]
    fn decode_literal_fills_u64() {
        let mut bits = bitvec![u8, Msb0; 0, 0, 0, 1, 0, 0];
        for group in 0..16 {
            bits.push(group < 15);
            bits.extend_from_bitslice(bits![u8, Msb0; 1, 1, 1, 1]);
        }
        let (packet, rest) = decode_packet(&bits).unwrap();
        assert_eq!(packet.literal_value(), Some(u64::MAX));
        assert!(rest.is_empty());
    }

    /// Chain of `levels` count-1 operators (version 0, type 0) ending in
    /// the literal 7.
    fn count_chain(levels: usize) -> BitVec<u8, Msb0> {
        let mut bits = BitVec::<u8, Msb0>::new();
        for _ in 0..levels {
            bits.extend_from_bitslice(bits![u8, Msb0; 0, 0, 0, 0, 0, 0, 1]);
            bits.extend_from_bitslice(bits![u8, Msb0; 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1]);
        }
        bits.extend_from_bitslice(bits![u8, Msb0; 0, 0, 0, 1, 0, 0, 0, 0, 1, 1, 1]);
        bits
    }

    #[test]
    fn decode_deep_operator_chain() {
        let bits = count_chain(65);
        let (packet, rest) = decode_packet(&bits).unwrap();
        assert!(rest.is_empty());

        let mut node = &packet;
        let mut operators = 0;
        while let [child] = node.children() {
            operators += 1;
            node = child;
        }
        assert_eq!(operators, 65);
        assert_eq!(node.literal_value(), Some(7));
    }

    /// Decode on a thread with room for `MAX_DEPTH` recursive frames in
    /// unoptimised builds.
    fn decode_on_large_stack(bits: BitVec<u8, Msb0>) -> Result<(), PacketError> {
        std::thread::Builder::new()
            .stack_size(32 * 1024 * 1024)
            .spawn(move || decode_packet(&bits).map(|_| ()))
            .unwrap()
            .join()
            .unwrap()
    }

    #[test]
    fn decode_accepts_nesting_up_to_the_limit() {
        assert_eq!(decode_on_large_stack(count_chain(layout::MAX_DEPTH)), Ok(()));
    }

    #[test]
    fn decode_rejects_nesting_past_the_limit() {
        let err = decode_on_large_stack(count_chain(layout::MAX_DEPTH + 1)).unwrap_err();
        assert_eq!(
            err,
            PacketError::TooDeep {
                limit: layout::MAX_DEPTH
            }
        );
    }
}
