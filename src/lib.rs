// Module declarations for the library crate.

/// Reports a caller contract violation. Processing continues; the offending
/// input is expected to be dropped by the caller.
#[macro_export]
macro_rules! log_bug {
    ($($arg:tt)+) => {
        ::tracing::error!(bug = true, $($arg)+)
    };
}

pub mod accel;
pub mod cli;
pub mod config;
pub mod device;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod host;
pub mod logger;
pub mod pad;
pub mod ratelimit;
pub mod stats;
pub mod telemetry;
pub mod timer;
pub mod util;

// Re-export the types most hosts need, e.g., for tests or embedding.
pub use accel::{Coords, MotionFilter, PointerAccelerator};
pub use dispatch::{Dispatch, Notification, Notify, PointerDispatch, Recorder};
pub use pad::PadDispatch;
pub use timer::{TimerFlags, TimerId, TimerService};
