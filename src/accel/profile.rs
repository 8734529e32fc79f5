//! Acceleration profiles: pure functions mapping a velocity (units/ms) to a
//! unitless acceleration factor.

use super::AccelParams;
use serde::Serialize;

/// Touchpads see the same acceleration as mice once normalized. That is
/// technically correct but subjectively wrong, a touchpad is expected to be
/// a lot slower than a mouse.
pub const TP_MAGIC_SLOWDOWN: f64 = 0.4;

/// Some touchpads advertise a higher resolution than they deliver, the
/// big coordinate steps show up as cursor jumps at low speed.
pub const TP_MAGIC_LOW_RES_FACTOR: f64 = 4.0;

/// Below this velocity the factor ramps from 0 to 1 over 1/5 units/ms.
const LOW_SPEED_RAMP: f64 = 5.0;

/// Strategy used by [`PointerAccelerator`](super::PointerAccelerator).
pub trait AccelProfile {
    fn factor(&self, params: &AccelParams, velocity: f64, time: u64) -> f64;

    fn name(&self) -> &'static str {
        "custom"
    }
}

/// Closures are profiles too, e.g. for device-specific curves.
impl<F> AccelProfile for F
where
    F: Fn(&AccelParams, f64, u64) -> f64,
{
    fn factor(&self, params: &AccelParams, velocity: f64, time: u64) -> f64 {
        self(params, velocity, time)
    }
}

/// The shared linear curve: a low-speed ramp up to 1, a linear incline
/// above the threshold, capped at `max_accel`.
pub fn accel_profile_linear(velocity: f64, max_accel: f64, threshold: f64, incline: f64) -> f64 {
    let s1 = (velocity * LOW_SPEED_RAMP).min(1.0);
    let s2 = 1.0 + (velocity - threshold) * incline;

    s1.max(s2).min(max_accel)
}

/// Mice and other relative pointer devices.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearProfile;

impl AccelProfile for LinearProfile {
    fn factor(&self, params: &AccelParams, velocity: f64, _time: u64) -> f64 {
        accel_profile_linear(velocity, params.accel, params.threshold, params.incline)
    }

    fn name(&self) -> &'static str {
        "pointer"
    }
}

/// Touchpads: the linear curve evaluated on slowed-down velocity.
#[derive(Debug, Clone, Copy, Default)]
pub struct TouchpadProfile;

impl AccelProfile for TouchpadProfile {
    fn factor(&self, params: &AccelParams, velocity: f64, time: u64) -> f64 {
        LinearProfile.factor(params, velocity * TP_MAGIC_SLOWDOWN, time) * TP_MAGIC_SLOWDOWN
    }

    fn name(&self) -> &'static str {
        "touchpad"
    }
}

/// Touchpads that under-report their resolution. Minimizes jumps at low
/// speed while keeping roughly the regular touchpad feel at high speed.
#[derive(Debug, Clone, Copy, Default)]
pub struct LowResTouchpadProfile;

impl AccelProfile for LowResTouchpadProfile {
    fn factor(&self, params: &AccelParams, velocity: f64, _time: u64) -> f64 {
        let max_accel = params.accel * TP_MAGIC_LOW_RES_FACTOR;
        let threshold = params.threshold / TP_MAGIC_LOW_RES_FACTOR;
        let incline = params.incline * TP_MAGIC_LOW_RES_FACTOR;
        let scale = TP_MAGIC_SLOWDOWN / TP_MAGIC_LOW_RES_FACTOR;

        accel_profile_linear(velocity * scale, max_accel, threshold, incline) * scale
    }

    fn name(&self) -> &'static str {
        "touchpad-low-res"
    }
}

/// Profile selection, e.g. from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ProfileKind {
    #[default]
    Pointer,
    Touchpad,
    TouchpadLowRes,
}

impl ProfileKind {
    pub fn profile(self) -> Box<dyn AccelProfile> {
        match self {
            ProfileKind::Pointer => Box::new(LinearProfile),
            ProfileKind::Touchpad => Box::new(TouchpadProfile),
            ProfileKind::TouchpadLowRes => Box::new(LowResTouchpadProfile),
        }
    }
}
