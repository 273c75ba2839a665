//! Transmission sources.
//!
//! A source yields exactly one raw transmission: the first
//! whitespace-delimited token of its text. All file and stream I/O of the
//! crate lives here.

mod reader;

pub use reader::{InlineSource, ReaderSource, TransmissionFile};

use thiserror::Error;

/// Raw transmission text plus a label describing where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transmission {
    pub origin: String,
    pub hex: String,
}

pub trait TransmissionSource {
    fn read_transmission(&mut self) -> Result<Transmission, SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("no transmission found in {origin}")]
    Empty { origin: String },
}

/// First whitespace-delimited token of `text`, if any.
pub(crate) fn first_token(text: &str) -> Option<&str> {
    text.split_whitespace().next()
}

#[cfg(test)]
mod tests {
    use super::first_token;

    #[test]
    fn first_token_skips_surrounding_whitespace() {
        assert_eq!(first_token("  D2FE28\n"), Some("D2FE28"));
        assert_eq!(first_token("AB CD\nEF"), Some("AB"));
    }

    #[test]
    fn first_token_of_blank_text() {
        assert_eq!(first_token(" \n\t"), None);
    }
}
