//! Common helper functions for tests and benchmarks.
use input_dispatch::device::{AbsInfo, StaticDevice};
use input_dispatch::dispatch::{Dispatch, Notification, Recorder};
use input_dispatch::host::{EventLoop, SourceId};
use input_linux_sys::{
    input_event, timeval, ABS_RX, ABS_RY, ABS_THROTTLE, ABS_WHEEL, BTN_0, BTN_1, BTN_2, BTN_3,
    EV_ABS, EV_KEY, EV_REL, EV_SYN, REL_X, REL_Y, SYN_REPORT,
};
use std::io;
use std::os::unix::io::RawFd;

// --- Constants ---
pub const BTN0: u16 = BTN_0 as u16;
pub const BTN1: u16 = BTN_1 as u16;
pub const BTN2: u16 = BTN_2 as u16;
pub const BTN3: u16 = BTN_3 as u16;

/// Calibration used by the standard test pad: a 72 step ring and a 4096
/// unit strip.
pub const RING_MAX: i32 = 71;
pub const STRIP_MAX: i32 = 4096;

// --- Event Creation Helpers ---

/// Creates an input_event with a specific microsecond timestamp.
pub fn ev(ts_us: u64, type_: i32, code: i32, value: i32) -> input_event {
    input_event {
        time: timeval {
            tv_sec: (ts_us / 1_000_000) as _,
            tv_usec: (ts_us % 1_000_000) as _,
        },
        type_: type_ as u16,
        code: code as u16,
        value,
    }
}

/// Creates an EV_KEY event; any nonzero value is a press.
pub fn key_ev(ts_us: u64, code: u16, value: i32) -> input_event {
    ev(ts_us, EV_KEY, i32::from(code), value)
}

pub fn abs_ev(ts_us: u64, code: i32, value: i32) -> input_event {
    ev(ts_us, EV_ABS, code, value)
}

pub fn rel_ev(ts_us: u64, code: i32, value: i32) -> input_event {
    ev(ts_us, EV_REL, code, value)
}

/// Creates the SYN_REPORT marker that ends a frame.
pub fn syn_ev(ts_us: u64) -> input_event {
    ev(ts_us, EV_SYN, SYN_REPORT, 0)
}

/// One pointer frame: REL_X, REL_Y and the sync marker, all at `ts_us`.
pub fn motion_frame(ts_us: u64, dx: i32, dy: i32) -> [input_event; 3] {
    [
        rel_ev(ts_us, REL_X, dx),
        rel_ev(ts_us, REL_Y, dy),
        syn_ev(ts_us),
    ]
}

// --- Device Helpers ---

/// A pad with one ring (ABS_WHEEL) and one strip (ABS_RX).
pub fn ring_and_strip_pad() -> StaticDevice {
    StaticDevice::new()
        .with_abs(ABS_WHEEL as u16, AbsInfo::new(0, RING_MAX))
        .with_abs(ABS_RX as u16, AbsInfo::new(0, STRIP_MAX))
}

/// A pad with both rings and both strips.
pub fn full_pad() -> StaticDevice {
    ring_and_strip_pad()
        .with_abs(ABS_THROTTLE as u16, AbsInfo::new(0, RING_MAX))
        .with_abs(ABS_RY as u16, AbsInfo::new(0, STRIP_MAX))
}

/// A pad without any axis, buttons only.
pub fn buttons_only_pad() -> StaticDevice {
    StaticDevice::new()
}

// --- Dispatch Helpers ---

/// Feeds `events` through `dispatch`, returning every notification in order.
pub fn run_events(dispatch: &mut dyn Dispatch, events: &[input_event]) -> Vec<Notification> {
    let mut recorder = Recorder::new();
    for event in events {
        let time = input_dispatch::event::event_microseconds(event);
        dispatch.process(event, time, &mut recorder);
    }
    recorder.take()
}

// --- Event Loop Helpers ---

/// An event loop that only records registrations.
#[derive(Debug, Default)]
pub struct RecordingLoop {
    pub added: Vec<RawFd>,
    pub removed: Vec<SourceId>,
    /// Makes the next `add_fd` call fail.
    pub fail_add: bool,
}

impl RecordingLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sources added and not removed yet.
    pub fn live(&self) -> usize {
        self.added.len() - self.removed.len()
    }
}

impl EventLoop for RecordingLoop {
    fn add_fd(&mut self, fd: RawFd) -> io::Result<SourceId> {
        if std::mem::take(&mut self.fail_add) {
            return Err(io::ErrorKind::OutOfMemory.into());
        }
        self.added.push(fd);
        Ok(SourceId::new(self.added.len() - 1))
    }

    fn remove_source(&mut self, id: SourceId) {
        self.removed.push(id);
    }
}

