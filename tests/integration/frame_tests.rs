//! Whole-frame integration tests.
//!
//! Tests verify:
//! - Frames decode into correctly shaped pixel buffers
//! - Shapes are taken from the JSON metadata sent with each frame
//! - Pixel count mismatches are rejected unless partial frames are allowed
//! - Header failures leave the output buffer untouched

use cbf_reader::{
    is_cbf_header, read_frame, DecodeConfig, DecodeError, Frame, FrameError, FrameShape,
    HeaderError, HeaderField,
};

use super::test_utils::{CbfBuilder, PixelGenerator};

const ROWS: usize = 195;
const COLS: usize = 487;

// =============================================================================
// Decoding
// =============================================================================

#[test]
fn test_pilatus_sized_frame() {
    let pixels = PixelGenerator::new(11).detector_pixels(ROWS * COLS);
    let buffer = CbfBuilder::from_pixels(&pixels).exposure("0.1").build();
    assert!(is_cbf_header(&buffer));

    let shape = FrameShape::new(ROWS, COLS).unwrap();
    let frame = Frame::decode(&buffer, shape, &DecodeConfig::default()).unwrap();

    assert_eq!(frame.pixels(), &pixels[..]);
    assert_eq!(frame.row(ROWS - 1), Some(&pixels[(ROWS - 1) * COLS..]));
    assert_eq!(frame.exposure_time(), 0.1);

    let expected_total: i64 = pixels.iter().map(|&p| p as i64).sum();
    assert_eq!(frame.total_counts(), expected_total);
    assert_eq!(frame.max_count(), pixels.iter().copied().max());
}

#[test]
fn test_frame_from_json_metadata() {
    let pixels = [4, 8, 15, 16, 23, 42];
    let buffer = CbfBuilder::from_pixels(&pixels).exposure("2").build();
    let metadata = br#"{"shape": [3, 2], "type": "int32", "frame": 5}"#;

    let frame = Frame::from_parts(metadata, &buffer, &DecodeConfig::default()).unwrap();
    assert_eq!(frame.shape().rows(), 3);
    assert_eq!(frame.shape().cols(), 2);
    assert_eq!(frame.row(1), Some(&[15, 16][..]));
    assert_eq!(frame.count_rate(), Some(54.0));
}

#[test]
fn test_read_frame_into_caller_buffer() {
    let pixels = [100, 90, 80];
    let buffer = CbfBuilder::from_pixels(&pixels).build();
    let mut output = vec![0i32; 3];

    let info = read_frame(&buffer, &mut output, &DecodeConfig::default()).unwrap();
    assert_eq!(info.samples, 3);
    assert_eq!(info.header.blob_size, 3);
    assert_eq!(output, pixels);
}

// =============================================================================
// Pixel Count Mismatch
// =============================================================================

#[test]
fn test_blob_shorter_than_shape() {
    let buffer = CbfBuilder::from_pixels(&[1, 2, 3]).build();
    let shape = FrameShape::new(2, 2).unwrap();

    let result = Frame::decode(&buffer, shape, &DecodeConfig::default());
    assert_eq!(
        result,
        Err(FrameError::SampleCountMismatch {
            expected: 4,
            decoded: 3
        })
    );
}

#[test]
fn test_blob_shorter_than_shape_allowed() {
    let buffer = CbfBuilder::from_pixels(&[1, 2, 3]).build();
    let shape = FrameShape::new(2, 2).unwrap();
    let config = DecodeConfig {
        allow_partial: true,
    };

    let frame = Frame::decode(&buffer, shape, &config).unwrap();
    assert_eq!(frame.pixels(), &[1, 2, 3, 0]);
}

#[test]
fn test_blob_longer_than_shape() {
    let buffer = CbfBuilder::from_pixels(&[1, 2, 3, 4, 5]).build();
    let shape = FrameShape::new(2, 2).unwrap();

    // Extra pixels are never written past the frame, even when partial is allowed
    let config = DecodeConfig {
        allow_partial: true,
    };
    let result = Frame::decode(&buffer, shape, &config);
    assert_eq!(
        result,
        Err(FrameError::Decode(DecodeError::OutputOverflow { capacity: 4 }))
    );
}

#[test]
fn test_declared_size_past_end_of_buffer() {
    let buffer = CbfBuilder::from_pixels(&[1, 2]).declared_size("10").build();
    let mut output = [0i32; 2];

    let result = read_frame(&buffer, &mut output, &DecodeConfig::default());
    assert_eq!(
        result,
        Err(FrameError::Decode(DecodeError::BlobTooShort {
            declared: 10,
            available: 2
        }))
    );
}

// =============================================================================
// Header Failures
// =============================================================================

#[test]
fn test_missing_marker_decodes_nothing() {
    let buffer = CbfBuilder::from_pixels(&[1, 2]).without_marker().build();
    let mut output = [-3i32; 2];

    let result = read_frame(&buffer, &mut output, &DecodeConfig::default());
    assert_eq!(
        result,
        Err(FrameError::Header(HeaderError::MissingField(
            HeaderField::EndOfHeader
        )))
    );
    assert_eq!(output, [-3, -3]);
}

#[test]
fn test_error_message_names_field() {
    let buffer = CbfBuilder::from_pixels(&[1]).without_exposure().build();
    let shape = FrameShape::new(1, 1).unwrap();

    let err = Frame::decode(&buffer, shape, &DecodeConfig::default()).unwrap_err();
    assert!(err.to_string().contains("Exposure_time"));
}

#[test]
fn test_invalid_metadata_decodes_nothing() {
    let buffer = CbfBuilder::from_pixels(&[1]).build();

    let result = Frame::from_parts(br#"{"shape": [0, 1]}"#, &buffer, &DecodeConfig::default());
    assert!(matches!(result, Err(FrameError::InvalidMetadata(_))));
}
