//! Configuration for the CBF reader.
//!
//! Two layers:
//! - [`DecodeConfig`]: library options passed to every frame decode, loadable
//!   with serde from any format the caller already uses
//! - [`Cli`]: command-line arguments of the `cbf-inspect` binary, parsed by
//!   clap, with environment variables under the `CBF_` prefix
//!
//! # Environment Variables
//!
//! - `CBF_ROWS` - Frame height in pixels
//! - `CBF_COLS` - Frame width in pixels
//! - `CBF_METADATA` - JSON metadata file carrying `"shape": [rows, cols]`
//! - `CBF_ALLOW_PARTIAL` - Accept blobs holding fewer pixels than the shape (default: false)
//! - `CBF_ALARM` - Hottest-pixel flux (counts/s) above which the frame is flagged

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

// =============================================================================
// DecodeConfig
// =============================================================================

/// Options controlling frame decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeConfig {
    /// Accept a blob that decodes to fewer pixels than the frame holds.
    ///
    /// The remaining pixels are left untouched and a warning is logged.
    pub allow_partial: bool,
}

// =============================================================================
// CLI Arguments
// =============================================================================

/// Output format for the inspect summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable lines
    Text,
    /// A single JSON object
    Json,
}

/// cbf-inspect - Decode a CBF detector frame and summarize it.
///
/// The frame shape comes either from --rows/--cols or from the JSON
/// metadata document the detector server sends with each frame.
#[derive(Parser, Debug, Clone)]
#[command(name = "cbf-inspect")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// CBF frame file to decode.
    pub input: PathBuf,

    /// Frame height in pixels.
    #[arg(long, env = "CBF_ROWS")]
    pub rows: Option<usize>,

    /// Frame width in pixels.
    #[arg(long, env = "CBF_COLS")]
    pub cols: Option<usize>,

    /// JSON metadata file with the frame shape.
    #[arg(long, env = "CBF_METADATA", conflicts_with_all = ["rows", "cols"])]
    pub metadata: Option<PathBuf>,

    /// Accept blobs holding fewer pixels than the frame shape.
    #[arg(long, default_value_t = false, env = "CBF_ALLOW_PARTIAL")]
    pub allow_partial: bool,

    /// Alarm threshold for the hottest pixel, in counts per second.
    ///
    /// When exceeded, a warning is logged and the exit code is 2.
    #[arg(long, env = "CBF_ALARM")]
    pub alarm: Option<f64>,

    /// Summary format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl Cli {
    /// Validate the arguments and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(alarm) = self.alarm {
            if !alarm.is_finite() || alarm <= 0.0 {
                return Err("alarm must be a positive number of counts per second".to_string());
            }
        }

        if self.metadata.is_some() {
            return Ok(());
        }

        match (self.rows, self.cols) {
            (Some(0), _) | (_, Some(0)) => {
                Err("rows and cols must be greater than 0".to_string())
            }
            (Some(_), Some(_)) => Ok(()),
            _ => Err(
                "Frame shape is required. Set --rows and --cols, or pass --metadata <file>"
                    .to_string(),
            ),
        }
    }

    /// Shape given directly on the command line, if both dimensions are set.
    pub fn explicit_shape(&self) -> Option<(usize, usize)> {
        self.rows.zip(self.cols)
    }

    /// Library options derived from the arguments.
    pub fn decode_config(&self) -> DecodeConfig {
        DecodeConfig {
            allow_partial: self.allow_partial,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
