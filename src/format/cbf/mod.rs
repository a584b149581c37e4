//! CBF frame decoding.
//!
//! A CBF frame from a Pilatus-style detector is an ASCII header followed by
//! a byte-offset compressed pixel blob.
//!
//! # Key Concepts
//!
//! - **Header locator**: finds `X-Binary-Size:` (blob length in bytes),
//!   `Exposure_time` (seconds) and the `0x0C 0x1A 0x04 0xD5` end-of-header
//!   marker. See [`header`].
//!
//! - **Byte-offset decompression**: each pixel is stored as the difference
//!   from the previous one in 1, 3 or 7 bytes. See [`byte_offset`].
//!
//! - **Frame shape**: the blob does not say how many pixels to expect; the
//!   caller knows it from the detector geometry or the frame's JSON
//!   metadata. See [`frame`].

pub mod byte_offset;
pub mod frame;
pub mod header;

pub use byte_offset::{decode, decode_into, encode, encoded_width, ByteOffsetDecoder};
pub use frame::{read_frame, Frame, FrameInfo, FrameMetadata, FrameShape};
pub use header::{
    locate_blob, locate_exposure_time, CbfHeader, BINARY_SIZE_LABEL, END_OF_HEADER_MARKER,
    EXPOSURE_TIME_LABEL,
};
