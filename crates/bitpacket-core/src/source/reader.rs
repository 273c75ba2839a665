use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{SourceError, Transmission, TransmissionSource, first_token};

/// Transmission stored in a text file.
pub struct TransmissionFile {
    path: PathBuf,
}

impl TransmissionFile {
    /// Checks that the file can be opened; reading happens on demand.
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        File::open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }
}

impl TransmissionSource for TransmissionFile {
    fn read_transmission(&mut self) -> Result<Transmission, SourceError> {
        let file = File::open(&self.path)?;
        ReaderSource::new(file, self.path.display().to_string()).read_transmission()
    }
}

/// Transmission read from any byte stream (e.g. stdin).
pub struct ReaderSource<R> {
    reader: R,
    origin: String,
}

impl<R: Read> ReaderSource<R> {
    pub fn new(reader: R, origin: impl Into<String>) -> Self {
        Self {
            reader,
            origin: origin.into(),
        }
    }
}

impl<R: Read> TransmissionSource for ReaderSource<R> {
    fn read_transmission(&mut self) -> Result<Transmission, SourceError> {
        let mut text = String::new();
        self.reader.read_to_string(&mut text)?;
        debug!(origin = %self.origin, bytes = text.len(), "read transmission text");
        token_transmission(&text, &self.origin)
    }
}

/// Transmission passed directly as a string.
///
/// Only surrounding whitespace is dropped; anything else in the text is part
/// of the transmission and must be hex.
pub struct InlineSource<'a> {
    text: &'a str,
}

impl<'a> InlineSource<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text }
    }
}

impl TransmissionSource for InlineSource<'_> {
    fn read_transmission(&mut self) -> Result<Transmission, SourceError> {
        let hex = self.text.trim();
        if hex.is_empty() {
            return Err(SourceError::Empty {
                origin: INLINE_ORIGIN.to_string(),
            });
        }
        Ok(Transmission {
            origin: INLINE_ORIGIN.to_string(),
            hex: hex.to_string(),
        })
    }
}

const INLINE_ORIGIN: &str = "<inline>";

fn token_transmission(text: &str, origin: &str) -> Result<Transmission, SourceError> {
    let hex = first_token(text).ok_or_else(|| SourceError::Empty {
        origin: origin.to_string(),
    })?;
    Ok(Transmission {
        origin: origin.to_string(),
        hex: hex.to_string(),
    })
}
