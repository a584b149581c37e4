//! Format parsers for detector frames.
//!
//! # Format Detection
//!
//! Use [`detect::is_cbf_header`] for a quick check before attempting to
//! decode a buffer. Currently supported formats:
//!
//! - **CBF (byte-offset)**: Crystallographic Binary File frames with
//!   byte-offset compressed `i32` pixels

pub mod cbf;
pub mod detect;

pub use detect::is_cbf_header;
