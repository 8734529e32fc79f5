// This module defines the per-device event batcher for tablet pads: button
// and axis changes are accumulated between two sync markers and emitted as
// one coherent set of notifications when the sync marker arrives.

pub mod axis;
pub mod buttons;
pub mod codes;

#[cfg(test)]
mod tests;

use crate::device::{AbsInfo, DeviceCapabilities};
use crate::dispatch::{ButtonState, Dispatch, Notify};
use crate::event::get_event_type_name;
use crate::log_bug;
use crate::ratelimit::{RateLimit, RateLimitState};
use axis::{AxisSet, AxisValues, PadAxis};
use bitflags::bitflags;
use buttons::ButtonSet;
use codes::get_abs_name;
use input_linux_sys::{
    input_event, ABS_MISC, ABS_RX, ABS_RY, ABS_THROTTLE, ABS_WHEEL, EV_ABS, EV_KEY, EV_SYN,
};
use std::time::Duration;
use tracing::{error, info, trace, warn};

/// Diagnostics caused by device input are limited to this many per interval.
const LOG_LIMIT_BURST: u32 = 5;
const LOG_LIMIT_INTERVAL: Duration = Duration::from_secs(3600);

bitflags! {
    /// Work pending for the next flush.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PadStatus: u8 {
        const AXES_UPDATED = 1 << 0;
        const BUTTONS_PRESSED = 1 << 1;
        const BUTTONS_RELEASED = 1 << 2;
    }
}

/// Event batcher for a single pad device.
///
/// Owns the button and axis state of exactly one device; nothing here is
/// shared, so no synchronization is needed.
#[derive(Debug)]
pub struct PadDispatch {
    status: PadStatus,
    changed_axes: AxisSet,
    axis_caps: AxisSet,
    axes: AxisValues,
    // Calibration snapshot taken at attach, `value` tracks the latest raw sample.
    absinfo: [AbsInfo; PadAxis::COUNT],
    buttons: ButtonSet,
    prev_buttons: ButtonSet,
    log_limit: RateLimit,
}

impl PadDispatch {
    /// Attaches to a device. Every axis the device supports is marked as
    /// changed so the first flush emits a full axis snapshot.
    pub fn new(device: &dyn DeviceCapabilities) -> Self {
        let mut pad = PadDispatch {
            status: PadStatus::empty(),
            changed_axes: AxisSet::empty(),
            axis_caps: AxisSet::empty(),
            axes: AxisValues::default(),
            absinfo: [AbsInfo::default(); PadAxis::COUNT],
            buttons: ButtonSet::new(),
            prev_buttons: ButtonSet::new(),
            log_limit: RateLimit::new(LOG_LIMIT_INTERVAL, LOG_LIMIT_BURST),
        };

        for axis in PadAxis::ALL {
            let code = axis.evcode();
            if !device.has_abs(code) {
                continue;
            }
            match device.abs_info(code) {
                Some(info) => {
                    pad.axis_caps |= AxisSet::from(axis);
                    pad.absinfo[axis.index()] = info;
                }
                None => log_bug!(
                    "Device advertises {} ({code:#x}) without calibration, ignoring axis",
                    get_abs_name(code)
                ),
            }
        }

        pad.mark_all_axes_changed();
        pad
    }

    fn mark_all_axes_changed(&mut self) {
        self.changed_axes = self.axis_caps;
        self.status |= PadStatus::AXES_UPDATED;
    }

    /// Returns whether a diagnostic at `time` may be logged.
    fn may_log(&mut self, time: u64) -> bool {
        match self.log_limit.test(time) {
            RateLimitState::Pass => true,
            RateLimitState::Threshold => {
                warn!(
                    "pad: diagnostic limit reached, discarding messages for {}",
                    crate::util::format_duration(LOG_LIMIT_INTERVAL)
                );
                true
            }
            RateLimitState::Exceeded => false,
        }
    }

    /// Handles an `EV_ABS` event. Unknown codes are dropped.
    pub fn process_axis(&mut self, code: u16, value: i32, time: u64) {
        match i32::from(code) {
            ABS_WHEEL | ABS_THROTTLE | ABS_RX | ABS_RY => {
                let Some(axis) = PadAxis::from_evcode(code) else {
                    if self.may_log(time) {
                        log_bug!("Invalid ABS event code {code:#x}");
                    }
                    return;
                };
                if !self.axis_caps.has(axis) {
                    if self.may_log(time) {
                        log_bug!(
                            "{} event for {} axis the device does not have",
                            get_abs_name(code),
                            axis.name()
                        );
                    }
                    return;
                }

                self.absinfo[axis.index()].value = value;
                self.changed_axes |= AxisSet::from(axis);
                self.status |= PadStatus::AXES_UPDATED;
            }
            ABS_MISC => {
                // used to forward the current tool and is always 15
            }
            _ => {
                if self.may_log(time) {
                    info!("Unhandled ABS event code {code:#x}");
                }
            }
        }
    }

    /// Handles an `EV_KEY` event; any nonzero value counts as pressed.
    pub fn process_key(&mut self, code: u16, value: i32, time: u64) {
        let pressed = value != 0;
        let in_range = if pressed {
            self.buttons.insert(code)
        } else {
            self.buttons.remove(code)
        };

        if !in_range {
            if self.may_log(time) {
                log_bug!("Button code {code:#x} outside of the key code space");
            }
            return;
        }

        self.status |= if pressed {
            PadStatus::BUTTONS_PRESSED
        } else {
            PadStatus::BUTTONS_RELEASED
        };
    }

    fn notify_axes(&mut self, time: u64, sink: &mut dyn Notify) {
        let changed = self.changed_axes & self.axis_caps;

        for axis in changed.axes() {
            self.axes[axis] = axis.normalize(&self.absinfo[axis.index()]);
        }

        if !changed.is_empty() {
            sink.axis_update(time, changed, &self.axes);
        }

        self.changed_axes = AxisSet::empty();
    }

    fn notify_buttons(&self, time: u64, state: ButtonState, sink: &mut dyn Notify) {
        let buttons = match state {
            ButtonState::Pressed => self.buttons.difference(&self.prev_buttons),
            ButtonState::Released => self.prev_buttons.difference(&self.buttons),
        };

        for code in &buttons {
            sink.button(time, &self.axes, code, state);
        }
    }

    /// Emits everything accumulated since the previous sync marker.
    ///
    /// Axis values are refreshed before any button notification references
    /// them, and releases are reported before presses.
    pub fn flush(&mut self, time: u64, sink: &mut dyn Notify) {
        if self.status.contains(PadStatus::AXES_UPDATED) {
            self.notify_axes(time, sink);
            self.status.remove(PadStatus::AXES_UPDATED);
        }

        if self.status.contains(PadStatus::BUTTONS_RELEASED) {
            self.notify_buttons(time, ButtonState::Released, sink);
            self.status.remove(PadStatus::BUTTONS_RELEASED);
        }

        if self.status.contains(PadStatus::BUTTONS_PRESSED) {
            self.notify_buttons(time, ButtonState::Pressed, sink);
            self.status.remove(PadStatus::BUTTONS_PRESSED);
        }

        self.prev_buttons = self.buttons;
    }

    pub fn axis_capabilities(&self) -> AxisSet {
        self.axis_caps
    }

    /// Axis values as of the last flush.
    pub fn axes(&self) -> &AxisValues {
        &self.axes
    }

    /// Buttons held down, including changes not yet flushed.
    pub fn buttons(&self) -> &ButtonSet {
        &self.buttons
    }

    pub fn pending(&self) -> PadStatus {
        self.status
    }
}

impl Dispatch for PadDispatch {
    fn process(&mut self, event: &input_event, time: u64, sink: &mut dyn Notify) {
        trace!(
            type_ = get_event_type_name(event.type_),
            code = event.code,
            value = event.value,
            "pad event"
        );
        match i32::from(event.type_) {
            EV_ABS => self.process_axis(event.code, event.value, time),
            EV_KEY => self.process_key(event.code, event.value, time),
            EV_SYN => self.flush(time, sink),
            _ => error!(
                "Unexpected event type {} ({:#x})",
                get_event_type_name(event.type_),
                event.type_
            ),
        }
    }

    fn name(&self) -> &'static str {
        "pad"
    }
}
