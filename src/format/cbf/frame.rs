//! Whole-frame decoding.
//!
//! Detector servers publish each frame as two parts: a small JSON document
//! describing it (`{"shape": [rows, cols], ...}`) and the CBF buffer
//! itself. The shape is the only source of the expected pixel count, since
//! the CBF blob does not record it in the fields we read.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::DecodeConfig;
use crate::error::FrameError;

use super::byte_offset::decode_into;
use super::header::CbfHeader;

// =============================================================================
// FrameShape
// =============================================================================

/// Frame dimensions in pixels (row-major).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameShape {
    rows: usize,
    cols: usize,
}

impl FrameShape {
    /// Create a shape, rejecting empty or overflowing dimensions.
    pub fn new(rows: usize, cols: usize) -> Result<Self, FrameError> {
        if rows == 0 || cols == 0 {
            return Err(FrameError::InvalidMetadata(format!(
                "shape must be positive, got [{}, {}]",
                rows, cols
            )));
        }
        if rows.checked_mul(cols).is_none() {
            return Err(FrameError::InvalidMetadata(format!(
                "shape [{}, {}] overflows the pixel count",
                rows, cols
            )));
        }
        Ok(Self { rows, cols })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of pixels in the frame.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.rows * self.cols
    }
}

// =============================================================================
// FrameMetadata
// =============================================================================

/// JSON document sent alongside a frame.
///
/// Unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameMetadata {
    /// `[rows, cols]`
    pub shape: Vec<usize>,

    /// Frame number within the acquisition, when the server sends one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<u64>,
}

impl FrameMetadata {
    /// Parse and validate a metadata document.
    pub fn from_json(bytes: &[u8]) -> Result<Self, FrameError> {
        let metadata: FrameMetadata = serde_json::from_slice(bytes)
            .map_err(|e| FrameError::InvalidMetadata(e.to_string()))?;
        metadata.frame_shape()?;
        Ok(metadata)
    }

    /// The frame shape, if `shape` holds exactly two positive dimensions.
    pub fn frame_shape(&self) -> Result<FrameShape, FrameError> {
        match self.shape.as_slice() {
            &[rows, cols] => FrameShape::new(rows, cols),
            other => Err(FrameError::InvalidMetadata(format!(
                "shape must have 2 dimensions, got {}",
                other.len()
            ))),
        }
    }
}

// =============================================================================
// read_frame
// =============================================================================

/// Summary of a frame decoded into a caller-supplied buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    /// Header fields the blob was located with
    pub header: CbfHeader,

    /// Number of pixels written to the output buffer
    pub samples: usize,
}

/// Decode a CBF buffer into `output`.
///
/// `output` must be sized to the expected pixel count. Header errors abort
/// before anything is written.
///
/// # Errors
/// - `Header` if the size label, exposure label or marker is missing or
///   unparsable
/// - `Decode` if the blob is truncated or holds more pixels than `output`
/// - `SampleCountMismatch` if fewer pixels were decoded than `output` holds,
///   unless `config.allow_partial` is set
pub fn read_frame(
    buffer: &[u8],
    output: &mut [i32],
    config: &DecodeConfig,
) -> Result<FrameInfo, FrameError> {
    let header = CbfHeader::parse(buffer)?;
    let samples = decode_into(header.blob(buffer), header.blob_size, output)?;

    if samples < output.len() {
        if !config.allow_partial {
            return Err(FrameError::SampleCountMismatch {
                expected: output.len(),
                decoded: samples,
            });
        }
        warn!(
            expected = output.len(),
            decoded = samples,
            "partial frame, remaining pixels left untouched"
        );
    }

    Ok(FrameInfo { header, samples })
}

// =============================================================================
// Frame
// =============================================================================

/// A decoded detector frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    shape: FrameShape,
    pixels: Vec<i32>,
    exposure_time: f64,
}

impl Frame {
    /// Decode a CBF buffer with a known shape.
    ///
    /// With `allow_partial`, pixels missing from a short blob are zero.
    pub fn decode(
        buffer: &[u8],
        shape: FrameShape,
        config: &DecodeConfig,
    ) -> Result<Self, FrameError> {
        let mut pixels = vec![0i32; shape.pixel_count()];
        let info = read_frame(buffer, &mut pixels, config)?;

        debug!(
            rows = shape.rows(),
            cols = shape.cols(),
            exposure_time = info.header.exposure_time,
            "decoded frame"
        );

        Ok(Self {
            shape,
            pixels,
            exposure_time: info.header.exposure_time,
        })
    }

    /// Decode a CBF buffer whose shape comes from a JSON metadata document.
    pub fn from_parts(
        metadata_json: &[u8],
        buffer: &[u8],
        config: &DecodeConfig,
    ) -> Result<Self, FrameError> {
        let metadata = FrameMetadata::from_json(metadata_json)?;
        Self::decode(buffer, metadata.frame_shape()?, config)
    }

    pub fn shape(&self) -> FrameShape {
        self.shape
    }

    /// Pixels in row-major order.
    pub fn pixels(&self) -> &[i32] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<i32> {
        self.pixels
    }

    /// Exposure time in seconds.
    pub fn exposure_time(&self) -> f64 {
        self.exposure_time
    }

    /// One row of pixels, or None if `row` is out of range.
    pub fn row(&self, row: usize) -> Option<&[i32]> {
        if row >= self.shape.rows() {
            return None;
        }
        let start = row * self.shape.cols();
        self.pixels.get(start..start + self.shape.cols())
    }

    /// Sum of all pixel values.
    ///
    /// Detectors flag dead or masked pixels with negative values; they are
    /// summed as-is.
    pub fn total_counts(&self) -> i64 {
        self.pixels.iter().map(|&p| p as i64).sum()
    }

    /// Largest pixel value.
    pub fn max_count(&self) -> Option<i32> {
        self.pixels.iter().copied().max()
    }

    /// Total counts per second of exposure.
    ///
    /// Returns None when the exposure time is not positive.
    pub fn count_rate(&self) -> Option<f64> {
        (self.exposure_time > 0.0).then(|| self.total_counts() as f64 / self.exposure_time)
    }

    /// Hottest-pixel flux in counts per second.
    ///
    /// Returns None when the exposure time is not positive or the frame is
    /// empty.
    pub fn peak_rate(&self) -> Option<f64> {
        if self.exposure_time <= 0.0 {
            return None;
        }
        self.max_count()
            .map(|max| max as f64 / self.exposure_time)
    }

    /// Whether the hottest pixel sees more than `threshold` counts per second.
    ///
    /// Frames without a usable exposure time never raise the alarm.
    pub fn exceeds_alarm(&self, threshold: f64) -> bool {
        self.peak_rate().is_some_and(|rate| rate > threshold)
    }
}

// =============================================================================
// Tests
// =============================================================================
