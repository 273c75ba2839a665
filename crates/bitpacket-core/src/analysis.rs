use std::path::Path;

use thiserror::Error;
use tracing::{debug, warn};

use crate::eval::{EvalError, evaluate, version_sum};
use crate::hex::{HexError, expand};
use crate::packet::{Packet, PacketError, decode_packet};
use crate::source::{InlineSource, SourceError, TransmissionFile, TransmissionSource};
use crate::{PacketStats, Report, Summary, make_stub_report};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
    #[error("Invalid transmission: {0}")]
    Hex(#[from] HexError),
    #[error("Decode error: {0}")]
    Packet(#[from] PacketError),
    #[error("Evaluation error: {0}")]
    Eval(#[from] EvalError),
}

/// Knobs for report generation.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalysisOptions {
    /// Embed the decoded packet tree in the report.
    pub include_tree: bool,
}

pub fn analyze_file(path: &Path, options: AnalysisOptions) -> Result<Report, AnalysisError> {
    let source = TransmissionFile::open(path)?;
    analyze_source(source, options)
}

/// Analyze a transmission given as text; surrounding whitespace is ignored.
///
/// # Examples
/// ```
/// use bitpacket_core::{AnalysisOptions, analyze_transmission};
///
/// let report = analyze_transmission("C200B40A82\n", AnalysisOptions::default())?;
/// assert_eq!(report.summary.value, 3);
/// assert_eq!(report.summary.version_sum, 14);
/// # Ok::<(), bitpacket_core::AnalysisError>(())
/// ```
pub fn analyze_transmission(text: &str, options: AnalysisOptions) -> Result<Report, AnalysisError> {
    analyze_source(InlineSource::new(text), options)
}

pub fn analyze_source<S: TransmissionSource>(
    mut source: S,
    options: AnalysisOptions,
) -> Result<Report, AnalysisError> {
    let transmission = source.read_transmission()?;
    let bits = expand(&transmission.hex)?;
    debug!(
        origin = %transmission.origin,
        hex_digits = transmission.hex.len(),
        bits = bits.len(),
        "expanded transmission"
    );

    let (packet, rest) = decode_packet(bits.as_bits())?;
    if rest.any() {
        warn!(
            padding_bits = rest.len(),
            "non-zero bits follow the top-level packet"
        );
    }

    let mut stats = PacketStats {
        padding_bits: rest.len() as u64,
        ..PacketStats::default()
    };
    collect_stats(&packet, 1, &mut stats);
    debug!(
        packets = stats.packets_total,
        max_depth = stats.max_depth,
        "decoded packet tree"
    );

    let summary = Summary {
        version_sum: version_sum(&packet),
        value: evaluate(&packet)?,
    };

    let mut report = make_stub_report(&transmission.origin, transmission.hex.len() as u64);
    report.summary = summary;
    report.stats = stats;
    if options.include_tree {
        report.packet = Some(packet);
    }
    Ok(report)
}

/// Expand and decode a transmission, discarding trailing padding.
///
/// # Examples
/// ```
/// use bitpacket_core::decode_transmission;
///
/// let packet = decode_transmission("EE00D40C823060")?;
/// assert_eq!(packet.children().len(), 3);
/// # Ok::<(), bitpacket_core::AnalysisError>(())
/// ```
pub fn decode_transmission(hex: &str) -> Result<Packet, AnalysisError> {
    let bits = expand(hex.trim())?;
    let (packet, _) = decode_packet(bits.as_bits())?;
    Ok(packet)
}

fn collect_stats(packet: &Packet, depth: u64, stats: &mut PacketStats) {
    stats.packets_total += 1;
    stats.max_depth = stats.max_depth.max(depth);
    if packet.is_literal() {
        stats.literals += 1;
    } else {
        stats.operators += 1;
    }
    for child in packet.children() {
        collect_stats(child, depth + 1, stats);
    }
}
