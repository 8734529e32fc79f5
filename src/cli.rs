use crate::accel::profile::ProfileKind;
use crate::config::{AxisRange, Resolution};
use clap::{Parser, ValueEnum};

/// Which per-device dispatcher handles the event stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DeviceClass {
    /// Tablet pad: buttons, rings and strips, batched per sync marker.
    #[default]
    Pad,
    /// Relative pointer: REL_X/REL_Y motion through pointer acceleration.
    Pointer,
}

impl DeviceClass {
    pub fn as_str(self) -> &'static str {
        match self {
            DeviceClass::Pad => "pad",
            DeviceClass::Pointer => "pointer",
        }
    }
}

/// Format of the notifications written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Batches raw evdev events into device notifications.
/// Reads input_event structs from stdin and writes one notification per line to stdout.
#[derive(Parser, Debug, Clone)]
#[command(name = "input-dispatch", author, version, about, long_about = None)]
pub struct Args {
    /// Device class of the event stream.
    #[arg(short, long, value_enum, default_value_t = DeviceClass::Pad)]
    pub class: DeviceClass,

    /// Calibration of the first ring (ABS_WHEEL). Presence enables the axis.
    #[arg(long, value_name = "MIN:MAX", allow_hyphen_values = true)]
    pub ring: Option<AxisRange>,

    /// Calibration of the second ring (ABS_THROTTLE).
    #[arg(long, value_name = "MIN:MAX", allow_hyphen_values = true)]
    pub ring2: Option<AxisRange>,

    /// Calibration of the first strip (ABS_RX).
    #[arg(long, value_name = "MIN:MAX", allow_hyphen_values = true)]
    pub strip: Option<AxisRange>,

    /// Calibration of the second strip (ABS_RY).
    #[arg(long, value_name = "MIN:MAX", allow_hyphen_values = true)]
    pub strip2: Option<AxisRange>,

    /// Acceleration profile for pointer devices.
    #[arg(long, value_enum, default_value_t = ProfileKind::Pointer)]
    pub profile: ProfileKind,

    /// Pointer speed in [-1, 1]; 0 is the default curve.
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    pub speed: f64,

    /// Mouse resolution used to normalize deltas.
    #[arg(long, default_value = "1000")]
    pub dpi: u32,

    /// Touchpad resolution in units/mm, used instead of --dpi for touchpad profiles.
    #[arg(long, value_name = "X:Y")]
    pub resolution: Option<Resolution>,

    /// Touchpad diagonal in device units, fallback when the resolution is unknown.
    #[arg(long, value_name = "UNITS")]
    pub diagonal: Option<f64>,

    /// Output format for notifications.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Dump statistics to stderr every N milliseconds (0 = disabled, max 5000).
    #[arg(long, default_value = "0", value_name = "MS")]
    pub stats_interval: u64,

    /// Print statistics as JSON.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub stats_json: bool,

    /// Log filter directives (tracing EnvFilter syntax). RUST_LOG takes precedence.
    #[arg(long, default_value = "input_dispatch=info")]
    pub log_filter: String,

    /// Emit diagnostics on stderr as JSON.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub log_json: bool,

    /// Enable verbose logging (includes module targets, DEBUG level unless filtered).
    #[arg(short, long, action = clap::ArgAction::SetTrue)]
    pub verbose: bool,
}

/// Parses command line arguments using clap.
pub fn parse_args() -> Args {
    Args::parse()
}
