// Validated runtime configuration, derived from the command line.

use crate::accel::profile::ProfileKind;
use crate::accel::scale::DeltaScale;
use crate::cli::{Args, DeviceClass, OutputFormat};
use crate::device::{AbsInfo, StaticDevice};
use crate::error::{AccelError, ConfigError};
use crate::pad::axis::PadAxis;
use std::str::FromStr;
use std::time::Duration;

/// Upper bound for the periodic stats dump; timers further out are reported.
pub const MAX_STATS_INTERVAL_MS: u64 = 5000;

/// Calibrated range of an absolute axis, `MIN:MAX` on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisRange {
    pub min: i32,
    pub max: i32,
}

impl FromStr for AxisRange {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::AxisRange(s.to_string());
        let (min, max) = s.split_once(':').ok_or_else(invalid)?;
        let min: i32 = min.trim().parse().map_err(|_| invalid())?;
        let max: i32 = max.trim().parse().map_err(|_| invalid())?;
        if min >= max {
            return Err(invalid());
        }
        Ok(AxisRange { min, max })
    }
}

/// Touchpad resolution in units/mm, `X:Y` on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub x: i32,
    pub y: i32,
}

impl FromStr for Resolution {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::Resolution(s.to_string());
        let (x, y) = s.split_once(':').ok_or_else(invalid)?;
        let x: i32 = x.trim().parse().map_err(|_| invalid())?;
        let y: i32 = y.trim().parse().map_err(|_| invalid())?;
        if x <= 0 || y <= 0 {
            return Err(invalid());
        }
        Ok(Resolution { x, y })
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub class: DeviceClass,
    pub axes: Vec<(PadAxis, AxisRange)>,
    pub profile: ProfileKind,
    pub speed: f64,
    pub scale: DeltaScale,
    pub format: OutputFormat,
    pub stats_interval_ms: u64,
    pub stats_json: bool,
    pub log_filter: String,
    pub log_json: bool,
    pub verbose: bool,
}

impl TryFrom<&Args> for Config {
    type Error = ConfigError;

    fn try_from(a: &Args) -> Result<Self, Self::Error> {
        if !(-1.0..=1.0).contains(&a.speed) {
            return Err(AccelError::SpeedOutOfRange(a.speed).into());
        }
        if a.dpi == 0 {
            return Err(ConfigError::Dpi(a.dpi));
        }
        if a.stats_interval > MAX_STATS_INTERVAL_MS {
            return Err(ConfigError::StatsInterval(a.stats_interval));
        }

        let axes = [
            (PadAxis::Ring, a.ring),
            (PadAxis::Ring2, a.ring2),
            (PadAxis::Strip, a.strip),
            (PadAxis::Strip2, a.strip2),
        ]
        .into_iter()
        .filter_map(|(axis, range)| range.map(|r| (axis, r)))
        .collect();

        let scale = match a.profile {
            ProfileKind::Pointer => DeltaScale::from_dpi(a.dpi),
            ProfileKind::Touchpad | ProfileKind::TouchpadLowRes => {
                let (rx, ry) = a.resolution.map_or((0, 0), |r| (r.x, r.y));
                DeltaScale::from_resolution(rx, ry, a.diagonal.unwrap_or(0.0))
            }
        };

        Ok(Self {
            class: a.class,
            axes,
            profile: a.profile,
            speed: a.speed,
            scale,
            format: a.format,
            stats_interval_ms: a.stats_interval,
            stats_json: a.stats_json,
            log_filter: a.log_filter.clone(),
            log_json: a.log_json,
            verbose: a.verbose,
        })
    }
}

impl Config {
    /// Capabilities of the pad described by the axis calibration options.
    pub fn device(&self) -> StaticDevice {
        self.axes
            .iter()
            .fold(StaticDevice::new(), |dev, (axis, range)| {
                dev.with_abs(axis.evcode(), AbsInfo::new(range.min, range.max))
            })
    }

    pub fn stats_interval(&self) -> Option<Duration> {
        (self.stats_interval_ms > 0).then(|| Duration::from_millis(self.stats_interval_ms))
    }
}
