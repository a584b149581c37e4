//! Test utilities for integration tests.
//!
//! This module provides a builder for synthetic CBF frames and a small
//! deterministic generator for pixel data.

use cbf_reader::{encode, END_OF_HEADER_MARKER};

// =============================================================================
// CBF Frame Builder
// =============================================================================

/// Builds CBF buffers with controllable header content.
pub struct CbfBuilder {
    blob: Vec<u8>,
    exposure: Option<String>,
    declared_size: Option<String>,
    extra_lines: Vec<String>,
    with_marker: bool,
    trailing: Vec<u8>,
}

impl CbfBuilder {
    /// Start from an already-encoded blob.
    pub fn from_blob(blob: impl Into<Vec<u8>>) -> Self {
        Self {
            blob: blob.into(),
            exposure: Some("0.5".to_string()),
            declared_size: None,
            extra_lines: Vec::new(),
            with_marker: true,
            trailing: Vec::new(),
        }
    }

    /// Start from pixel values, encoded with byte-offset compression.
    pub fn from_pixels(pixels: &[i32]) -> Self {
        Self::from_blob(encode(pixels).to_vec())
    }

    pub fn exposure(mut self, value: &str) -> Self {
        self.exposure = Some(value.to_string());
        self
    }

    pub fn without_exposure(mut self) -> Self {
        self.exposure = None;
        self
    }

    /// Override the `X-Binary-Size:` value text.
    pub fn declared_size(mut self, value: &str) -> Self {
        self.declared_size = Some(value.to_string());
        self
    }

    pub fn header_line(mut self, line: &str) -> Self {
        self.extra_lines.push(line.to_string());
        self
    }

    pub fn without_marker(mut self) -> Self {
        self.with_marker = false;
        self
    }

    /// Bytes appended after the blob (padding, next frame, ...).
    pub fn trailing(mut self, bytes: &[u8]) -> Self {
        self.trailing.extend_from_slice(bytes);
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut header = String::from("###CBF: VERSION 1.5\r\n");
        header.push_str("# Detector: PILATUS 100K, S/N 1-0000\r\n");
        if let Some(exposure) = &self.exposure {
            header.push_str(&format!("# Exposure_time {} s\r\n", exposure));
        }
        header.push_str("# Exposure_period 1.0000000 s\r\n");
        for line in &self.extra_lines {
            header.push_str(line);
            header.push_str("\r\n");
        }
        header.push_str("Content-Type: application/octet-stream;\r\n");
        header.push_str("     conversions=\"x-CBF_BYTE_OFFSET\"\r\n");
        let size = self
            .declared_size
            .unwrap_or_else(|| self.blob.len().to_string());
        header.push_str(&format!("X-Binary-Size: {}\r\n", size));
        header.push_str("X-Binary-Element-Type: \"signed 32-bit integer\"\r\n\r\n");

        let mut buffer = header.into_bytes();
        if self.with_marker {
            buffer.extend_from_slice(&END_OF_HEADER_MARKER);
        }
        buffer.extend_from_slice(&self.blob);
        buffer.extend_from_slice(&self.trailing);
        buffer
    }
}

// =============================================================================
// Pixel Generation
// =============================================================================

/// Deterministic xorshift generator so failures are reproducible.
pub struct PixelGenerator {
    state: u64,
}

impl PixelGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            state: seed.max(1),
        }
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Detector-like data: mostly small counts with occasional hot pixels,
    /// masked pixels (-1) and full-range outliers.
    pub fn detector_pixels(&mut self, count: usize) -> Vec<i32> {
        (0..count)
            .map(|_| match self.next_u64() % 100 {
                0 => -1,
                1 => self.next_u64() as i32,
                2..=5 => (self.next_u64() % 60_000) as i32,
                _ => (self.next_u64() % 50) as i32,
            })
            .collect()
    }

    /// Arbitrary i32 values across the whole range.
    pub fn any_pixels(&mut self, count: usize) -> Vec<i32> {
        (0..count).map(|_| self.next_u64() as i32).collect()
    }
}

/// Prefix sums of `deltas` with i32 wraparound.
pub fn prefix_sums(deltas: &[i32]) -> Vec<i32> {
    deltas
        .iter()
        .scan(0i32, |acc, &d| {
            *acc = acc.wrapping_add(d);
            Some(*acc)
        })
        .collect()
}
