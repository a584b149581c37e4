//! Format detection for detector frames.
//!
//! CBF files open with a `###CBF` magic line (usually followed by a version,
//! e.g. `###CBF: VERSION 1.5`). The version is not checked.

/// Magic prefix of a CBF file.
const CBF_MAGIC: &[u8] = b"###CBF";

/// Check if bytes start like a CBF file.
///
/// This is a quick check that can be used before attempting full parsing.
/// Frames streamed without the magic line can still be decoded.
pub fn is_cbf_header(bytes: &[u8]) -> bool {
    bytes.starts_with(CBF_MAGIC)
}

// =============================================================================
// Tests
// =============================================================================
