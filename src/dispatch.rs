// This module defines the seam between per-device dispatchers and the host:
// dispatchers consume raw evdev events and report batched notifications
// through a `Notify` sink provided by the caller.

use crate::accel::scale::DeltaScale;
use crate::accel::{Coords, MotionFilter};
use crate::event::get_event_type_name;
use crate::pad::axis::{AxisSet, AxisValues};
use crate::util::us_to_ms;
use input_linux_sys::{input_event, EV_REL, EV_SYN, REL_X, REL_Y};
use serde::Serialize;
use tracing::{debug, trace};

/// Logical state of a button in a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonState {
    Released,
    Pressed,
}

impl ButtonState {
    pub fn as_str(self) -> &'static str {
        match self {
            ButtonState::Released => "released",
            ButtonState::Pressed => "pressed",
        }
    }
}

/// Receiver of the notifications produced on each flush.
///
/// Times are in microseconds, as carried by the sync event that triggered
/// the flush.
pub trait Notify {
    /// The axes in `changed` moved; `values` holds the current value of every
    /// axis, entries outside `changed` are stale.
    fn axis_update(&mut self, time: u64, changed: AxisSet, values: &AxisValues);

    /// A button changed state. `values` is the axis snapshot at that point.
    fn button(&mut self, time: u64, values: &AxisValues, code: u16, state: ButtonState);

    /// Relative motion, after and before acceleration.
    fn motion(&mut self, _time: u64, _accel: Coords, _unaccel: Coords) {}
}

/// A per-device event consumer.
pub trait Dispatch {
    /// Feeds one event; `time` is the event time in microseconds.
    fn process(&mut self, event: &input_event, time: u64, sink: &mut dyn Notify);

    fn name(&self) -> &'static str;
}

/// An owned copy of a notification, e.g. for tests or JSON output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    Axis {
        time: u64,
        changed: AxisSet,
        values: AxisValues,
    },
    Button {
        time: u64,
        code: u16,
        state: ButtonState,
        values: AxisValues,
    },
    Motion {
        time: u64,
        accel: Coords,
        unaccel: Coords,
    },
}

impl Notification {
    pub fn time(&self) -> u64 {
        match self {
            Notification::Axis { time, .. }
            | Notification::Button { time, .. }
            | Notification::Motion { time, .. } => *time,
        }
    }
}

/// A sink that keeps every notification it receives.
#[derive(Debug, Default)]
pub struct Recorder {
    pub notifications: Vec<Notification>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns everything recorded so far.
    pub fn take(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Codes and states of the recorded button notifications, in order.
    pub fn buttons(&self) -> Vec<(u16, ButtonState)> {
        self.notifications
            .iter()
            .filter_map(|n| match n {
                Notification::Button { code, state, .. } => Some((*code, *state)),
                _ => None,
            })
            .collect()
    }
}

impl Notify for Recorder {
    fn axis_update(&mut self, time: u64, changed: AxisSet, values: &AxisValues) {
        self.notifications.push(Notification::Axis {
            time,
            changed,
            values: *values,
        });
    }

    fn button(&mut self, time: u64, values: &AxisValues, code: u16, state: ButtonState) {
        self.notifications.push(Notification::Button {
            time,
            code,
            state,
            values: *values,
        });
    }

    fn motion(&mut self, time: u64, accel: Coords, unaccel: Coords) {
        self.notifications.push(Notification::Motion {
            time,
            accel,
            unaccel,
        });
    }
}

/// Relative pointer dispatcher: accumulates `REL_X`/`REL_Y` until the sync
/// marker, then normalizes and accelerates the frame's motion.
pub struct PointerDispatch {
    filter: Box<dyn MotionFilter>,
    scale: DeltaScale,
    pending: Coords,
    dirty: bool,
}

impl PointerDispatch {
    pub fn new(filter: Box<dyn MotionFilter>, scale: DeltaScale) -> Self {
        PointerDispatch {
            filter,
            scale,
            pending: Coords::ZERO,
            dirty: false,
        }
    }

    pub fn filter(&self) -> &dyn MotionFilter {
        self.filter.as_ref()
    }

    pub fn filter_mut(&mut self) -> &mut dyn MotionFilter {
        self.filter.as_mut()
    }

    fn flush(&mut self, time: u64, sink: &mut dyn Notify) {
        if !self.dirty {
            return;
        }
        self.dirty = false;

        let unaccel = self.scale.apply(std::mem::take(&mut self.pending));
        // Nothing to accelerate, and feeding zero would reset the trackers.
        if unaccel.is_zero() {
            return;
        }

        let accel = self.filter.filter(unaccel, us_to_ms(time));
        sink.motion(time, accel, unaccel);
    }
}

impl Dispatch for PointerDispatch {
    fn process(&mut self, event: &input_event, time: u64, sink: &mut dyn Notify) {
        trace!(
            type_ = get_event_type_name(event.type_),
            code = event.code,
            value = event.value,
            "pointer event"
        );
        match (i32::from(event.type_), i32::from(event.code)) {
            (EV_REL, REL_X) => {
                self.pending.x += f64::from(event.value);
                self.dirty = true;
            }
            (EV_REL, REL_Y) => {
                self.pending.y += f64::from(event.value);
                self.dirty = true;
            }
            (EV_SYN, _) => self.flush(time, sink),
            _ => debug!(
                "pointer: ignoring {} code {:#x}",
                get_event_type_name(event.type_),
                event.code
            ),
        }
    }

    fn name(&self) -> &'static str {
        "pointer"
    }
}
