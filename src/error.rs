//! Error types shared across the crate.

use std::io;
use thiserror::Error;

/// Failures of the timer service that propagate to the caller.
///
/// Only construction failures are returned; arming failures at runtime are
/// logged and leave the service in its last armed state.
#[derive(Debug, Error)]
pub enum TimerError {
    #[error("failed to create timerfd: {0}")]
    Create(#[source] io::Error),

    #[error("failed to register timer source with the event loop: {0}")]
    Register(#[source] io::Error),
}

/// Motion filter configuration errors.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum AccelError {
    #[error("pointer speed {0} is outside of [-1, 1]")]
    SpeedOutOfRange(f64),
}

/// Invalid command line configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid axis range '{0}': expected MIN:MAX with MIN < MAX")]
    AxisRange(String),

    #[error("invalid resolution '{0}': expected X:Y in units/mm, both positive")]
    Resolution(String),

    #[error("invalid dpi {0}: must be greater than zero")]
    Dpi(u32),

    #[error("invalid stats interval {0} ms: must be at most 5000")]
    StatsInterval(u64),

    #[error(transparent)]
    Accel(#[from] AccelError),
}
