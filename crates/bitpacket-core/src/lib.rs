//! bitpacket core library for decoding BITS transmissions.
//!
//! A transmission is a hexadecimal string encoding one packet tree. The
//! pipeline is: a source yields the raw text, `hex` expands it into bits,
//! `packet` decodes the tree (layout/reader/parser), and `eval` reduces the
//! tree to the version sum and the expression value. `analysis` ties these
//! together into a serialisable report. Decoding and reduction are pure;
//! all I/O is isolated in `source`.
//!
//! Invariants:
//! - Field widths and MSB-first ordering follow the wire layout exactly.
//! - Children keep their encounter order.
//! - Every structural problem is returned as an error, never a panic.
//!
//! Version française (résumé):
//! Cette crate décode une transmission hexadécimale en arbre de paquets :
//! source -> bits -> paquets -> réductions (somme des versions, évaluation).
//! Les E/S restent dans `source`; le décodage et l'évaluation sont purs.
//!
//! # Examples
//! ```
//! use bitpacket_core::{decode_packet, evaluate, expand, version_sum};
//!
//! let bits = expand("A0016C880162017C3686B18A3D4780")?;
//! let (packet, _padding) = decode_packet(bits.as_bits())?;
//! assert_eq!(version_sum(&packet), 31);
//! assert_eq!(evaluate(&packet)?, 54);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use serde::{Deserialize, Serialize};

mod analysis;
pub mod eval;
pub mod hex;
pub mod packet;
mod source;

pub use analysis::{
    AnalysisError, AnalysisOptions, analyze_file, analyze_source, analyze_transmission,
    decode_transmission,
};
pub use eval::{EvalError, Operator, evaluate, version_sum};
pub use hex::{BitString, HexError, expand};
pub use packet::{Packet, PacketError, Payload, decode_packet};
pub use source::{
    InlineSource, ReaderSource, SourceError, Transmission, TransmissionFile, TransmissionSource,
};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;

/// Decoding report for one transmission.
///
/// # Examples
/// ```
/// use bitpacket_core::make_stub_report;
///
/// let report = make_stub_report("input.txt", 6);
/// assert_eq!(report.report_version, bitpacket_core::REPORT_VERSION);
/// assert_eq!(report.input.bits, 24);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    /// Tool identification metadata.
    pub tool: ToolInfo,
    /// Input transmission metadata.
    pub input: InputInfo,
    /// The two answers derived from the top-level packet.
    pub summary: Summary,
    /// Shape of the decoded tree.
    pub stats: PacketStats,
    /// Decoded packet tree, when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packet: Option<packet::Packet>,
}

/// Tool metadata embedded in reports.
///
/// # Examples
/// ```
/// use bitpacket_core::ToolInfo;
///
/// let tool = ToolInfo {
///     name: "bitpacket".to_string(),
///     version: "0.1.0".to_string(),
/// };
/// assert_eq!(tool.name, "bitpacket");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    /// Tool name (e.g., "bitpacket").
    pub name: String,
    /// Tool version (semver).
    pub version: String,
}

/// Input transmission metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputInfo {
    /// Where the transmission was read from (path, `<stdin>`, `<inline>`).
    pub source: String,
    /// Number of hex digits in the transmission.
    pub hex_digits: u64,
    /// Number of bits after expansion.
    pub bits: u64,
}

/// Version sum and evaluated value of the top-level packet.
///
/// # Examples
/// ```
/// use bitpacket_core::Summary;
///
/// let summary = Summary { version_sum: 16, value: 15 };
/// assert_eq!(summary.version_sum, 16);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub version_sum: u64,
    pub value: u64,
}

/// Counts describing the decoded packet tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketStats {
    /// Total packets, top-level included.
    pub packets_total: u64,
    pub literals: u64,
    pub operators: u64,
    /// Deepest nesting level; the top-level packet is level 1.
    pub max_depth: u64,
    /// Bits left after the top-level packet.
    pub padding_bits: u64,
}

/// Build a report with input metadata filled and empty results.
///
/// # Examples
/// ```
/// use bitpacket_core::make_stub_report;
///
/// let report = make_stub_report("<stdin>", 10);
/// assert_eq!(report.summary.value, 0);
/// assert!(report.packet.is_none());
/// ```
pub fn make_stub_report(source: &str, hex_digits: u64) -> Report {
    Report {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "bitpacket".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        input: InputInfo {
            source: source.to_string(),
            hex_digits,
            bits: hex_digits * hex::BITS_PER_HEX_DIGIT as u64,
        },
        summary: Summary::default(),
        stats: PacketStats::default(),
        packet: None,
    }
}
