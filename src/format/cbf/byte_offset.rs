//! Byte-offset compression.
//!
//! The CBF byte-offset scheme stores each pixel as the difference from the
//! previous pixel, using the narrowest of three widths that fits:
//!
//! ```text
//! delta in -127..=127        1 byte   i8
//! delta in -32767..=32767    3 bytes  0x80, i16 LE
//! anything else              7 bytes  0x80, 0x00 0x80, i32 LE
//! ```
//!
//! `0x80` (i8 -128) and `0x8000` (i16 -32768) are reserved as escapes to the
//! next width. The running sum is an `i32` that wraps on overflow, so any
//! sequence of `i32` pixels round-trips exactly.

use bytes::{BufMut, Bytes, BytesMut};
use tracing::debug;

use crate::error::DecodeError;
use crate::io::ByteCursor;

// =============================================================================
// Constants
// =============================================================================

/// Escape byte announcing a 16-bit delta.
pub const ESCAPE_8: u8 = 0x80;

/// Escape word announcing a 32-bit delta.
pub const ESCAPE_16: u16 = 0x8000;

/// Largest delta magnitude stored in one byte.
const NARROW_LIMIT: i32 = i8::MAX as i32;

/// Largest delta magnitude stored in the 16-bit form.
const WIDE_LIMIT: i32 = i16::MAX as i32;

/// Encoded sizes: plain byte, escape + i16, escape + escape word + i32.
const NARROW_WIDTH: usize = 1;
const WIDE_WIDTH: usize = 3;
const FULL_WIDTH: usize = 7;

// =============================================================================
// Decoder
// =============================================================================

/// Streaming byte-offset decoder.
///
/// Yields one accumulated pixel value per encoded delta until the blob is
/// exhausted. After the first error the iterator is fused and yields `None`.
#[derive(Debug, Clone)]
pub struct ByteOffsetDecoder<'a> {
    cursor: ByteCursor<'a>,
    value: i32,
    failed: bool,
}

impl<'a> ByteOffsetDecoder<'a> {
    /// Create a decoder over the first `blob_size` bytes of `blob`.
    ///
    /// # Errors
    /// - `BlobTooShort` if `blob` holds fewer than `blob_size` bytes
    pub fn new(blob: &'a [u8], blob_size: usize) -> Result<Self, DecodeError> {
        let blob = blob.get(..blob_size).ok_or(DecodeError::BlobTooShort {
            declared: blob_size,
            available: blob.len(),
        })?;

        Ok(Self {
            cursor: ByteCursor::new(blob),
            value: 0,
            failed: false,
        })
    }

    /// Bytes consumed so far.
    #[inline]
    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    /// Current value of the running accumulator.
    #[inline]
    pub fn accumulator(&self) -> i32 {
        self.value
    }

    fn next_delta(&mut self) -> Result<i32, DecodeError> {
        if self.cursor.peek_u8()? != ESCAPE_8 {
            return Ok(self.cursor.read_i8()? as i32);
        }
        self.cursor.advance(1)?;

        if self.cursor.peek_u16_le()? != ESCAPE_16 {
            return Ok(self.cursor.read_i16_le()? as i32);
        }
        self.cursor.advance(2)?;

        self.cursor.read_i32_le()
    }
}

impl Iterator for ByteOffsetDecoder<'_> {
    type Item = Result<i32, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.cursor.is_empty() {
            return None;
        }

        match self.next_delta() {
            Ok(delta) => {
                self.value = self.value.wrapping_add(delta);
                Some(Ok(self.value))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

/// Decode a byte-offset blob into a new vector.
///
/// Only the first `blob_size` bytes of `blob` are read.
///
/// # Errors
/// - `BlobTooShort` if `blob` holds fewer than `blob_size` bytes
/// - `Truncated` if the last value runs past `blob_size`
pub fn decode(blob: &[u8], blob_size: usize) -> Result<Vec<i32>, DecodeError> {
    let decoder = ByteOffsetDecoder::new(blob, blob_size)?;
    let samples = decoder.collect::<Result<Vec<_>, _>>()?;

    debug!(blob_size, samples = samples.len(), "decoded byte-offset blob");
    Ok(samples)
}

/// Decode a byte-offset blob into a caller-supplied buffer.
///
/// Returns the number of samples written. The buffer is never written past
/// its end: a stream holding more samples than `output.len()` fails with
/// `OutputOverflow`, leaving the samples decoded up to that point in place.
///
/// # Errors
/// - `BlobTooShort` if `blob` holds fewer than `blob_size` bytes
/// - `Truncated` if the last value runs past `blob_size`
/// - `OutputOverflow` if `output` is too small
pub fn decode_into(
    blob: &[u8],
    blob_size: usize,
    output: &mut [i32],
) -> Result<usize, DecodeError> {
    let decoder = ByteOffsetDecoder::new(blob, blob_size)?;
    let capacity = output.len();
    let mut written = 0;

    for sample in decoder {
        let slot = output
            .get_mut(written)
            .ok_or(DecodeError::OutputOverflow { capacity })?;
        *slot = sample?;
        written += 1;
    }

    debug!(blob_size, samples = written, capacity, "decoded byte-offset blob");
    Ok(written)
}

// =============================================================================
// Encoder
// =============================================================================

/// Encode pixel values with byte-offset compression.
///
/// Each delta is written in the narrowest form that fits; the escape values
/// themselves are never emitted as plain deltas.
pub fn encode(samples: &[i32]) -> Bytes {
    let mut out = BytesMut::with_capacity(samples.len());
    let mut previous = 0i32;

    for &sample in samples {
        let delta = sample.wrapping_sub(previous);

        match encoded_width(delta) {
            NARROW_WIDTH => out.put_i8(delta as i8),
            WIDE_WIDTH => {
                out.put_u8(ESCAPE_8);
                out.put_i16_le(delta as i16);
            }
            _ => {
                out.put_u8(ESCAPE_8);
                out.put_u16_le(ESCAPE_16);
                out.put_i32_le(delta);
            }
        }

        previous = sample;
    }

    out.freeze()
}

/// Number of bytes `delta` occupies once encoded.
pub fn encoded_width(delta: i32) -> usize {
    if (-NARROW_LIMIT..=NARROW_LIMIT).contains(&delta) {
        NARROW_WIDTH
    } else if (-WIDE_LIMIT..=WIDE_LIMIT).contains(&delta) {
        WIDE_WIDTH
    } else {
        FULL_WIDTH
    }
}

// =============================================================================
// Tests
// =============================================================================
