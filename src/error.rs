use std::fmt;

use thiserror::Error;

/// Header fields the frame reader depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderField {
    /// `X-Binary-Size:` label, size of the compressed blob in bytes
    BinarySize,
    /// `Exposure_time` label, exposure in seconds
    ExposureTime,
    /// Binary end-of-header marker (0x0C 0x1A 0x04 0xD5)
    EndOfHeader,
}

impl HeaderField {
    /// Get the label text (or marker description) as it appears in a header.
    pub const fn label(&self) -> &'static str {
        match self {
            HeaderField::BinarySize => "X-Binary-Size",
            HeaderField::ExposureTime => "Exposure_time",
            HeaderField::EndOfHeader => "end-of-header marker",
        }
    }
}

impl fmt::Display for HeaderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Errors raised while locating fields in a CBF header
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HeaderError {
    /// Required label or marker is absent
    #[error("Bad header: cannot find {0}")]
    MissingField(HeaderField),

    /// Label found but the number following it could not be parsed
    #[error("Bad header: cannot parse {field} value {token:?}")]
    MalformedNumber { field: HeaderField, token: String },
}

/// Errors raised by the byte-offset decompressor
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The buffer holds fewer bytes than the header declared
    #[error("Blob too short: header declares {declared} bytes, buffer has {available}")]
    BlobTooShort { declared: usize, available: usize },

    /// A multi-byte value runs past the end of the blob
    #[error("Truncated blob: need {needed} bytes at offset {offset}, only {available} left")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// The stream holds more samples than the output buffer
    #[error("Output overflow: stream holds more than {capacity} samples")]
    OutputOverflow { capacity: usize },
}

/// Errors that can occur when reading a whole frame
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrameError {
    /// Header parsing failed, nothing was decoded
    #[error("Header error: {0}")]
    Header(#[from] HeaderError),

    /// Decompression failed
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Fewer samples were decoded than the frame shape requires
    #[error("Sample count mismatch: expected {expected}, decoded {decoded}")]
    SampleCountMismatch { expected: usize, decoded: usize },

    /// Frame metadata document is unusable
    #[error("Invalid frame metadata: {0}")]
    InvalidMetadata(String),
}
