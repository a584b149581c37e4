//! # CBF Reader
//!
//! Decoder for Crystallographic Binary File (CBF) frames produced by
//! Pilatus-style area detectors.
//!
//! This library locates the compressed pixel blob and the exposure time in a
//! CBF header and decompresses the byte-offset encoded pixel stream into
//! 32-bit signed intensities. It works on in-memory buffers only; loading
//! frames from disk or the network is up to the caller.
//!
//! ## Architecture
//!
//! - [`io`] - Bounds-checked little-endian cursor over byte slices
//! - [`mod@format`] - CBF header location, byte-offset codec and frame decoding
//! - [`config`] - Decode options and the `cbf-inspect` CLI arguments
//! - [`error`] - Error types for header, decode and frame failures
//!
//! ## Example
//!
//! ```rust
//! use cbf_reader::{encode, read_frame, DecodeConfig, END_OF_HEADER_MARKER};
//!
//! let blob = encode(&[5, 0, 10]);
//! let mut buffer = format!(
//!     "###CBF: VERSION 1.5\r\n# Exposure_time 0.5 s\r\nX-Binary-Size: {}\r\n",
//!     blob.len()
//! )
//! .into_bytes();
//! buffer.extend_from_slice(&END_OF_HEADER_MARKER);
//! buffer.extend_from_slice(&blob);
//!
//! let mut pixels = [0i32; 3];
//! let info = read_frame(&buffer, &mut pixels, &DecodeConfig::default()).unwrap();
//!
//! assert_eq!(pixels, [5, 0, 10]);
//! assert_eq!(info.header.exposure_time, 0.5);
//! ```

pub mod config;
pub mod error;
pub mod format;
pub mod io;

// Re-export commonly used types
pub use config::{Cli, DecodeConfig, OutputFormat};
pub use error::{DecodeError, FrameError, HeaderError, HeaderField};
pub use format::cbf::{
    decode, decode_into, encode, encoded_width, locate_blob, locate_exposure_time, read_frame,
    ByteOffsetDecoder, CbfHeader, Frame, FrameInfo, FrameMetadata, FrameShape,
    BINARY_SIZE_LABEL, END_OF_HEADER_MARKER, EXPOSURE_TIME_LABEL,
};
pub use format::is_cbf_header;
pub use io::ByteCursor;
