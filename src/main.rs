//! cbf-inspect - Decode a CBF detector frame and print a summary.

use clap::Parser;
use serde::Serialize;
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, error, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cbf_reader::{is_cbf_header, Cli, Frame, FrameMetadata, FrameShape, OutputFormat};

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    if let Err(e) = cli.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let summary = match inspect(&cli) {
        Ok(summary) => summary,
        Err(e) => {
            error!("{}: {}", cli.input.display(), e);
            return ExitCode::FAILURE;
        }
    };

    if summary.alarm_exceeded {
        warn!(
            peak_rate = ?summary.peak_rate,
            alarm = ?cli.alarm,
            "hottest pixel exceeds the alarm threshold"
        );
    }

    match cli.format {
        OutputFormat::Text => print_text(&summary),
        OutputFormat::Json => match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                error!("Failed to serialize summary: {}", e);
                return ExitCode::FAILURE;
            }
        },
    }

    if summary.alarm_exceeded {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    }
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "cbf_reader=debug,cbf_inspect=debug"
    } else {
        "cbf_reader=info,cbf_inspect=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

// =============================================================================
// Inspect
// =============================================================================

#[derive(Debug, Serialize)]
struct FrameSummary {
    input: String,
    shape: FrameShape,
    #[serde(skip_serializing_if = "Option::is_none")]
    frame: Option<u64>,
    exposure_time: f64,
    total_counts: i64,
    max_count: Option<i32>,
    count_rate: Option<f64>,
    peak_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    alarm: Option<f64>,
    alarm_exceeded: bool,
}

impl FrameSummary {
    fn new(input: String, frame: &Frame, frame_number: Option<u64>, alarm: Option<f64>) -> Self {
        Self {
            input,
            shape: frame.shape(),
            frame: frame_number,
            exposure_time: frame.exposure_time(),
            total_counts: frame.total_counts(),
            max_count: frame.max_count(),
            count_rate: frame.count_rate(),
            peak_rate: frame.peak_rate(),
            alarm,
            alarm_exceeded: alarm.is_some_and(|threshold| frame.exceeds_alarm(threshold)),
        }
    }
}

fn inspect(cli: &Cli) -> Result<FrameSummary, String> {
    let (shape, frame_number) = resolve_shape(cli)?;

    let buffer = std::fs::read(&cli.input).map_err(|e| format!("cannot read frame: {}", e))?;
    debug!(bytes = buffer.len(), "loaded frame file");

    if !is_cbf_header(&buffer) {
        warn!("{} does not start with ###CBF, decoding anyway", cli.input.display());
    }

    let frame = Frame::decode(&buffer, shape, &cli.decode_config()).map_err(|e| e.to_string())?;

    Ok(FrameSummary::new(
        cli.input.display().to_string(),
        &frame,
        frame_number,
        cli.alarm,
    ))
}

/// Frame shape from --rows/--cols or from the metadata file, plus the
/// frame number when the metadata carries one.
fn resolve_shape(cli: &Cli) -> Result<(FrameShape, Option<u64>), String> {
    if let Some((rows, cols)) = cli.explicit_shape() {
        let shape = FrameShape::new(rows, cols).map_err(|e| e.to_string())?;
        return Ok((shape, None));
    }

    match cli.metadata.as_deref() {
        Some(path) => {
            let metadata = read_metadata(path)?;
            let shape = metadata.frame_shape().map_err(|e| e.to_string())?;
            Ok((shape, metadata.frame))
        }
        None => Err("no frame shape given".to_string()),
    }
}

fn read_metadata(path: &Path) -> Result<FrameMetadata, String> {
    let bytes = std::fs::read(path)
        .map_err(|e| format!("cannot read metadata {}: {}", path.display(), e))?;
    FrameMetadata::from_json(&bytes).map_err(|e| e.to_string())
}

fn print_text(summary: &FrameSummary) {
    println!("Frame:         {}", summary.input);
    if let Some(number) = summary.frame {
        println!("Frame number:  {}", number);
    }
    println!("Shape:         {} x {}", summary.shape.rows(), summary.shape.cols());
    println!("Exposure time: {} s", summary.exposure_time);
    println!("Total counts:  {}", summary.total_counts);
    if let Some(max) = summary.max_count {
        println!("Max count:     {}", max);
    }
    match summary.count_rate {
        Some(rate) => println!("Count rate:    {:.3e} / s", rate),
        None => println!("Count rate:    n/a (exposure time is not positive)"),
    }
    if let Some(rate) = summary.peak_rate {
        println!("Peak rate:     {:.3e} / s", rate);
    }
    if let Some(alarm) = summary.alarm {
        let state = if summary.alarm_exceeded { "EXCEEDED" } else { "ok" };
        println!("Alarm:         {:.3e} / s ({})", alarm, state);
    }
}
