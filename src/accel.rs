// Pointer acceleration: a velocity-tracking filter that scales raw motion
// deltas by a factor derived from recent motion history.

pub mod profile;
pub mod scale;


use crate::error::AccelError;
use bitflags::bitflags;
use profile::AccelProfile;
use serde::Serialize;
use std::f64::consts::PI;
use std::fmt;
use tracing::debug;

/// Default parameters for pointer acceleration profiles.
pub const DEFAULT_THRESHOLD: f64 = 0.4; // units/ms
pub const DEFAULT_ACCELERATION: f64 = 2.0; // unitless factor
pub const DEFAULT_INCLINE: f64 = 1.1; // unitless factor

/// Largest velocity difference to the initial tracker that still counts as
/// the same motion (units/ms).
pub const MAX_VELOCITY_DIFF: f64 = 1.0;
/// Trackers older than this (ms) are not considered for velocity.
pub const MOTION_TIMEOUT_MS: u64 = 300;
pub const NUM_POINTER_TRACKERS: usize = 16;

/// A 2-D motion delta in normalized device units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Coords {
    pub x: f64,
    pub y: f64,
}

impl Coords {
    pub const ZERO: Coords = Coords { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Coords { x, y }
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    #[inline]
    pub fn scaled(&self, factor: f64) -> Coords {
        Coords::new(self.x * factor, self.y * factor)
    }

    pub fn direction(&self) -> Direction {
        Direction::of(self.x, self.y)
    }
}

impl std::ops::AddAssign for Coords {
    fn add_assign(&mut self, rhs: Coords) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl fmt::Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

bitflags! {
    /// Compass octants a motion vector points into. Two vectors move in
    /// the same direction iff their octant sets intersect.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Direction: u8 {
        const N = 1 << 0;
        const NE = 1 << 1;
        const E = 1 << 2;
        const SE = 1 << 3;
        const S = 1 << 4;
        const SW = 1 << 5;
        const W = 1 << 6;
        const NW = 1 << 7;
    }
}

impl Direction {
    /// A zero vector agrees with every direction.
    pub const UNDEFINED: Direction = Direction::all();

    /// Classifies a motion vector. Screen coordinates: y grows southwards.
    pub fn of(dx: f64, dy: f64) -> Direction {
        if dx.abs() < 2.0 && dy.abs() < 2.0 {
            // too short for an angle, fall back to the signs
            return if dx > 0.0 {
                if dy > 0.0 {
                    Direction::S | Direction::SE | Direction::E
                } else if dy < 0.0 {
                    Direction::N | Direction::NE | Direction::E
                } else {
                    Direction::E
                }
            } else if dx < 0.0 {
                if dy > 0.0 {
                    Direction::S | Direction::SW | Direction::W
                } else if dy < 0.0 {
                    Direction::N | Direction::NW | Direction::W
                } else {
                    Direction::W
                }
            } else if dy > 0.0 {
                Direction::S
            } else if dy < 0.0 {
                Direction::N
            } else {
                Direction::UNDEFINED
            };
        }

        // r in [0, 8) octants, 0 is north, clockwise
        let r = (dy.atan2(dx) + 2.5 * PI).rem_euclid(2.0 * PI) * 4.0 / PI;
        // mark the one or two octants close enough to r
        let d1 = ((r + 0.9) as u32) % 8;
        let d2 = ((r + 0.1) as u32) % 8;
        Direction::from_bits_truncate((1u8 << d1) | (1u8 << d2))
    }
}

/// Tunables of the acceleration profiles, derived from the speed setting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccelParams {
    /// Velocity (units/ms) where acceleration kicks in.
    pub threshold: f64,
    /// Maximum acceleration factor.
    pub accel: f64,
    /// Slope of the factor above the threshold.
    pub incline: f64,
}

impl Default for AccelParams {
    fn default() -> Self {
        AccelParams {
            threshold: DEFAULT_THRESHOLD,
            accel: DEFAULT_ACCELERATION,
            incline: DEFAULT_INCLINE,
        }
    }
}

impl AccelParams {
    /// Tunables for a speed in [-1, 1].
    pub fn for_speed(speed: f64) -> Self {
        AccelParams {
            // delay when accel kicks in
            threshold: DEFAULT_THRESHOLD - speed / 6.0,
            // adjust max accel factor
            accel: DEFAULT_ACCELERATION + speed,
            // higher speed -> faster to reach max
            incline: DEFAULT_INCLINE + speed / 2.0,
        }
    }
}

/// A stateful motion filter, one per pointer device.
pub trait MotionFilter {
    /// Returns the accelerated version of `delta`, observed at `time` (ms).
    fn filter(&mut self, delta: Coords, time: u64) -> Coords;

    /// Changes the speed setting. Fails for values outside [-1, 1].
    fn set_speed(&mut self, speed: f64) -> Result<(), AccelError>;

    fn speed(&self) -> f64;
}

#[derive(Debug, Clone, Copy, Default)]
struct Tracker {
    delta: Coords, // accumulated since this tracker was the newest
    time: u64,     // ms
    dir: Direction,
}

impl Tracker {
    fn velocity(&self, time: u64) -> f64 {
        let tdelta = time.saturating_sub(self.time) as f64 + 1.0;
        self.delta.length() / tdelta // units/ms
    }
}

/// Velocity-tracking pointer acceleration with a pluggable profile.
pub struct PointerAccelerator {
    profile: Box<dyn AccelProfile>,
    params: AccelParams,
    speed: f64,

    last_velocity: f64, // units/ms
    last: Coords,

    trackers: Box<[Tracker; NUM_POINTER_TRACKERS]>,
    cur_tracker: usize,
}

impl fmt::Debug for PointerAccelerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointerAccelerator")
            .field("profile", &self.profile.name())
            .field("params", &self.params)
            .field("speed", &self.speed)
            .field("last_velocity", &self.last_velocity)
            .finish_non_exhaustive()
    }
}

impl PointerAccelerator {
    pub fn new(profile: Box<dyn AccelProfile>) -> Self {
        PointerAccelerator {
            profile,
            params: AccelParams::default(),
            speed: 0.0,
            last_velocity: 0.0,
            last: Coords::ZERO,
            trackers: Box::new([Tracker::default(); NUM_POINTER_TRACKERS]),
            cur_tracker: 0,
        }
    }

    pub fn params(&self) -> AccelParams {
        self.params
    }

    pub fn last_velocity(&self) -> f64 {
        self.last_velocity
    }

    /// The last unaccelerated delta fed to the filter.
    pub fn last_delta(&self) -> Coords {
        self.last
    }

    fn feed_trackers(&mut self, delta: Coords, time: u64) {
        for tracker in self.trackers.iter_mut() {
            tracker.delta += delta;
        }

        self.cur_tracker = (self.cur_tracker + 1) % NUM_POINTER_TRACKERS;
        self.trackers[self.cur_tracker] = Tracker {
            delta: Coords::ZERO,
            time,
            dir: delta.direction(),
        };
    }

    fn tracker_by_offset(&self, offset: usize) -> &Tracker {
        let index = (self.cur_tracker + NUM_POINTER_TRACKERS - offset) % NUM_POINTER_TRACKERS;
        &self.trackers[index]
    }

    /// Velocity of the oldest tracker that still belongs to the current
    /// motion: recent enough, same direction, similar velocity.
    pub(crate) fn calculate_velocity(&self, time: u64) -> f64 {
        let mut dir = self.tracker_by_offset(0).dir;
        let mut result = 0.0;
        let mut initial_velocity = 0.0;

        for offset in 1..NUM_POINTER_TRACKERS {
            let tracker = self.tracker_by_offset(offset);

            if tracker.time > time || time - tracker.time > MOTION_TIMEOUT_MS {
                break;
            }

            dir &= tracker.dir;
            if dir.is_empty() {
                break;
            }

            let velocity = tracker.velocity(time);
            if initial_velocity == 0.0 {
                initial_velocity = velocity;
                result = velocity;
            } else {
                if (initial_velocity - velocity).abs() > MAX_VELOCITY_DIFF {
                    break;
                }
                result = velocity;
            }
        }

        result // units/ms
    }

    /// Average acceleration over the transition from the previous velocity
    /// to `velocity`, by Simpson's rule.
    pub(crate) fn calculate_acceleration(&self, velocity: f64, time: u64) -> f64 {
        let profile = &self.profile;
        let params = &self.params;

        let mut factor = profile.factor(params, velocity, time);
        factor += profile.factor(params, self.last_velocity, time);
        factor += 4.0 * profile.factor(params, (self.last_velocity + velocity) / 2.0, time);

        factor / 6.0 // unitless factor
    }
}

impl MotionFilter for PointerAccelerator {
    fn filter(&mut self, delta: Coords, time: u64) -> Coords {
        self.feed_trackers(delta, time);
        let velocity = self.calculate_velocity(time);
        let accel_value = self.calculate_acceleration(velocity, time);

        self.last = delta;
        self.last_velocity = velocity;

        delta.scaled(accel_value)
    }

    fn set_speed(&mut self, speed: f64) -> Result<(), AccelError> {
        // also rejects NaN
        if !(-1.0..=1.0).contains(&speed) {
            return Err(AccelError::SpeedOutOfRange(speed));
        }

        self.params = AccelParams::for_speed(speed);
        self.speed = speed;
        debug!(speed, params = ?self.params, "pointer speed changed");
        Ok(())
    }

    fn speed(&self) -> f64 {
        self.speed
    }
}
