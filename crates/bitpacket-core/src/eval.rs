//! Tree reducers over decoded packets: version sum and evaluation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::packet::{Packet, Payload};

/// Operation selected by an operator packet's type id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Sum,
    Product,
    Minimum,
    Maximum,
    GreaterThan,
    LessThan,
    EqualTo,
}

impl Operator {
    /// Map a type id to its operator; `None` for the literal id and ids above 7.
    ///
    /// # Examples
    /// ```
    /// use bitpacket_core::Operator;
    ///
    /// assert_eq!(Operator::from_type_id(1), Some(Operator::Product));
    /// assert_eq!(Operator::from_type_id(4), None);
    /// ```
    pub fn from_type_id(type_id: u8) -> Option<Self> {
        match type_id {
            0 => Some(Self::Sum),
            1 => Some(Self::Product),
            2 => Some(Self::Minimum),
            3 => Some(Self::Maximum),
            5 => Some(Self::GreaterThan),
            6 => Some(Self::LessThan),
            7 => Some(Self::EqualTo),
            _ => None,
        }
    }

    pub fn type_id(self) -> u8 {
        match self {
            Self::Sum => 0,
            Self::Product => 1,
            Self::Minimum => 2,
            Self::Maximum => 3,
            Self::GreaterThan => 5,
            Self::LessThan => 6,
            Self::EqualTo => 7,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Product => "product",
            Self::Minimum => "minimum",
            Self::Maximum => "maximum",
            Self::GreaterThan => "greater-than",
            Self::LessThan => "less-than",
            Self::EqualTo => "equal-to",
        }
    }

    fn is_comparison(self) -> bool {
        matches!(self, Self::GreaterThan | Self::LessThan | Self::EqualTo)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Packet {
    /// Operator for this packet, if it carries children and a known type id.
    pub fn operator(&self) -> Option<Operator> {
        match self.payload {
            Payload::Literal { .. } => None,
            Payload::Operator { .. } => Operator::from_type_id(self.type_id),
        }
    }
}

/// Errors returned by [`evaluate`].
///
/// # Examples
/// ```
/// use bitpacket_core::{EvalError, Operator};
///
/// let err = EvalError::Arity { operator: Operator::LessThan, expected: 2, actual: 3 };
/// assert!(err.to_string().contains("less-than"));
/// ```
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EvalError {
    #[error("{operator} operator expects {expected} operands, got {actual}")]
    Arity {
        operator: Operator,
        expected: usize,
        actual: usize,
    },
    #[error("unknown operator type id: {type_id}")]
    UnknownOperator { type_id: u8 },
    #[error("{operator} overflows a 64-bit value")]
    Overflow { operator: Operator },
}

/// Sum of this packet's version and the versions of all its descendants.
///
/// # Examples
/// ```
/// use bitpacket_core::{decode_packet, expand, version_sum};
///
/// let bits = expand("8A004A801A8002F478")?;
/// let (packet, _) = decode_packet(bits.as_bits())?;
/// assert_eq!(version_sum(&packet), 16);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn version_sum(packet: &Packet) -> u64 {
    u64::from(packet.version) + packet.children().iter().map(version_sum).sum::<u64>()
}

/// Evaluate the expression encoded by the packet tree.
///
/// # Examples
/// ```
/// use bitpacket_core::{decode_packet, evaluate, expand};
///
/// let bits = expand("9C0141080250320F1802104A08")?;
/// let (packet, _) = decode_packet(bits.as_bits())?;
/// assert_eq!(evaluate(&packet)?, 1);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn evaluate(packet: &Packet) -> Result<u64, EvalError> {
    let children = match &packet.payload {
        Payload::Literal { value } => return Ok(*value),
        Payload::Operator { children } => children,
    };
    let operator = Operator::from_type_id(packet.type_id).ok_or(EvalError::UnknownOperator {
        type_id: packet.type_id,
    })?;
    if operator.is_comparison() && children.len() != 2 {
        return Err(EvalError::Arity {
            operator,
            expected: 2,
            actual: children.len(),
        });
    }

    let operands = children
        .iter()
        .map(evaluate)
        .collect::<Result<Vec<_>, _>>()?;

    match operator {
        Operator::Sum => operands
            .iter()
            .try_fold(0u64, |acc, value| acc.checked_add(*value))
            .ok_or(EvalError::Overflow { operator }),
        Operator::Product => operands
            .iter()
            .try_fold(1u64, |acc, value| acc.checked_mul(*value))
            .ok_or(EvalError::Overflow { operator }),
        Operator::Minimum => operands.iter().copied().min().ok_or(EvalError::Arity {
            operator,
            expected: 1,
            actual: 0,
        }),
        Operator::Maximum => operands.iter().copied().max().ok_or(EvalError::Arity {
            operator,
            expected: 1,
            actual: 0,
        }),
        Operator::GreaterThan => Ok(u64::from(operands[0] > operands[1])),
        Operator::LessThan => Ok(u64::from(operands[0] < operands[1])),
        Operator::EqualTo => Ok(u64::from(operands[0] == operands[1])),
    }
}
