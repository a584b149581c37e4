//! CBF header field location.
//!
//! A CBF frame starts with an ASCII header, ends the header with a 4-byte
//! binary marker, and follows it with the compressed pixel blob:
//!
//! ```text
//! ###CBF: VERSION 1.5
//! ...
//! # Exposure_time 0.0990000 s
//! ...
//! X-Binary-Size: 95035
//! ...
//! 0x0C 0x1A 0x04 0xD5        end-of-header marker
//! <X-Binary-Size bytes of byte-offset data>
//! ```
//!
//! Only the two fields the decoder needs are located. Labels are searched
//! in the bytes before the marker so that pixel data can never produce a
//! false match.

use tracing::debug;

use crate::error::{HeaderError, HeaderField};

// =============================================================================
// Constants
// =============================================================================

/// Label preceding the compressed blob size.
pub const BINARY_SIZE_LABEL: &[u8] = b"X-Binary-Size:";

/// Label preceding the exposure time in seconds.
pub const EXPOSURE_TIME_LABEL: &[u8] = b"Exposure_time";

/// Binary sequence terminating the header.
pub const END_OF_HEADER_MARKER: [u8; 4] = [0x0C, 0x1A, 0x04, 0xD5];

/// Longest token echoed back in a parse error.
const MAX_TOKEN_ECHO: usize = 32;

// =============================================================================
// CbfHeader
// =============================================================================

/// The header fields needed to decode a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CbfHeader {
    /// Offset of the first blob byte (just past the end-of-header marker)
    pub blob_offset: usize,

    /// Size of the compressed blob in bytes
    pub blob_size: usize,

    /// Exposure time in seconds
    pub exposure_time: f64,
}

impl CbfHeader {
    /// Locate the blob and exposure time in a CBF buffer.
    ///
    /// # Errors
    /// - `MissingField` if a label or the end-of-header marker is absent
    /// - `MalformedNumber` if a label is not followed by a number
    pub fn parse(buffer: &[u8]) -> Result<Self, HeaderError> {
        let (blob_offset, blob_size) = locate_blob(buffer)?;
        let exposure_time = locate_exposure_time(buffer)?;

        debug!(blob_offset, blob_size, exposure_time, "located CBF header fields");

        Ok(CbfHeader {
            blob_offset,
            blob_size,
            exposure_time,
        })
    }

    /// Borrow everything after the end-of-header marker.
    ///
    /// The slice may be longer or shorter than `blob_size`; the decoder
    /// checks it.
    pub fn blob<'a>(&self, buffer: &'a [u8]) -> &'a [u8] {
        buffer.get(self.blob_offset..).unwrap_or(&[])
    }
}

// =============================================================================
// Field Location
// =============================================================================

/// Find the compressed blob.
///
/// Returns `(blob_offset, blob_size)`: the offset just past the
/// end-of-header marker and the size declared by `X-Binary-Size:`.
pub fn locate_blob(buffer: &[u8]) -> Result<(usize, usize), HeaderError> {
    let marker = find(buffer, &END_OF_HEADER_MARKER);
    let header = header_region(buffer, marker);

    let token = value_after(header, BINARY_SIZE_LABEL, HeaderField::BinarySize)?;
    let blob_size = parse_integer(token, HeaderField::BinarySize)?;

    let marker = marker.ok_or(HeaderError::MissingField(HeaderField::EndOfHeader))?;
    Ok((marker + END_OF_HEADER_MARKER.len(), blob_size))
}

/// Find the exposure time in seconds.
pub fn locate_exposure_time(buffer: &[u8]) -> Result<f64, HeaderError> {
    let marker = find(buffer, &END_OF_HEADER_MARKER);
    let header = header_region(buffer, marker);

    let token = value_after(header, EXPOSURE_TIME_LABEL, HeaderField::ExposureTime)?;
    parse_float(token, HeaderField::ExposureTime)
}

/// Position of the first occurrence of `needle` in `haystack`.
fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn header_region(buffer: &[u8], marker: Option<usize>) -> &[u8] {
    &buffer[..marker.unwrap_or(buffer.len())]
}

/// Bytes following `label`, with leading whitespace skipped.
fn value_after<'a>(
    header: &'a [u8],
    label: &[u8],
    field: HeaderField,
) -> Result<&'a [u8], HeaderError> {
    let start = find(header, label).ok_or(HeaderError::MissingField(field))? + label.len();
    let rest = &header[start..];
    let skip = rest
        .iter()
        .take_while(|b| b.is_ascii_whitespace())
        .count();
    Ok(&rest[skip..])
}

fn parse_integer(rest: &[u8], field: HeaderField) -> Result<usize, HeaderError> {
    let sign = usize::from(matches!(rest.first(), Some(b'+' | b'-')));
    let digits = rest[sign..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();

    std::str::from_utf8(&rest[..sign + digits])
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .ok_or_else(|| malformed(rest, field))
}

fn parse_float(rest: &[u8], field: HeaderField) -> Result<f64, HeaderError> {
    let len = rest
        .iter()
        .take_while(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
        .count();

    // Longest prefix of the run that parses, as with scanf("%lf")
    std::str::from_utf8(&rest[..len])
        .ok()
        .and_then(|s| (1..=s.len()).rev().find_map(|end| s[..end].parse::<f64>().ok()))
        .ok_or_else(|| malformed(rest, field))
}

fn malformed(rest: &[u8], field: HeaderField) -> HeaderError {
    let word: Vec<u8> = rest
        .iter()
        .copied()
        .take_while(|b| !b.is_ascii_whitespace())
        .take(MAX_TOKEN_ECHO)
        .collect();

    HeaderError::MalformedNumber {
        field,
        token: String::from_utf8_lossy(&word).into_owned(),
    }
}

// =============================================================================
// Tests
// =============================================================================
