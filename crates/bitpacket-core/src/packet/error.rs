use thiserror::Error;

/// Errors returned by packet decoding.
///
/// # Examples
/// ```
/// use bitpacket_core::{PacketError, decode_packet, expand};
///
/// let bits = expand("D2")?;
/// let err = decode_packet(bits.as_bits()).unwrap_err();
/// assert!(matches!(err, PacketError::Truncated { .. }));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PacketError {
    #[error("truncated input reading {field}: need {needed} bits, got {available}")]
    Truncated {
        field: &'static str,
        needed: usize,
        available: usize,
    },
    #[error("literal value does not fit in 64 bits after {groups} groups")]
    LiteralOverflow { groups: usize },
    #[error("operator nesting exceeds {limit} levels")]
    TooDeep { limit: usize },
}
