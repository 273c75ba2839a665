//! BITS packet decoding.
//!
//! A transmission carries one top-level packet. Every packet starts with a
//! 3-bit version and a 3-bit type id; type 4 is a literal made of 5-bit
//! groups, every other type is an operator whose children are bounded
//! either by a 15-bit total length or by an 11-bit packet count.
//!
//! Field widths live in `layout`, bounded bit reads in `reader`, and the
//! recursive decoder in `parser`. The decoder is pure: it borrows the bits
//! and hands back whatever it did not consume.
//!
//! Version française (résumé):
//! Le module décode un arbre de paquets (littéraux ou opérateurs) à partir
//! d'une suite de bits MSB en tête. Les largeurs de champs sont dans
//! `layout`, les lectures bornées dans `reader`.

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;

pub use error::PacketError;
pub use parser::decode_packet;

/// Decoded packet; parents own their children.
///
/// # Examples
/// ```
/// use bitpacket_core::{Packet, Payload};
///
/// let packet = Packet {
///     version: 6,
///     type_id: 4,
///     payload: Payload::Literal { value: 2021 },
/// };
/// assert_eq!(packet.to_string(), "6/4/2021");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Packet {
    /// 3-bit version field.
    pub version: u8,
    /// 3-bit type id; 4 marks a literal.
    pub type_id: u8,
    pub payload: Payload,
}

/// Packet contents: a literal value or ordered child packets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Payload {
    Literal { value: u64 },
    Operator { children: Vec<Packet> },
}

impl Packet {
    pub fn is_literal(&self) -> bool {
        matches!(self.payload, Payload::Literal { .. })
    }

    pub fn literal_value(&self) -> Option<u64> {
        match self.payload {
            Payload::Literal { value } => Some(value),
            Payload::Operator { .. } => None,
        }
    }

    /// Child packets in encounter order (empty for literals).
    pub fn children(&self) -> &[Packet] {
        match &self.payload {
            Payload::Literal { .. } => &[],
            Payload::Operator { children } => children,
        }
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/", self.version, self.type_id)?;
        match &self.payload {
            Payload::Literal { value } => write!(f, "{value}"),
            Payload::Operator { children } => {
                f.write_str("[")?;
                for (index, child) in children.iter().enumerate() {
                    if index > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{child}")?;
                }
                f.write_str("]")
            }
        }
    }
}
