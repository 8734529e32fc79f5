// fuzz/fuzz_targets/fuzz_pad_dispatch.rs
#![no_main]

use input_dispatch::device::{AbsInfo, StaticDevice};
use input_dispatch::dispatch::{Dispatch, Notification, Recorder};
use input_dispatch::event::{event_microseconds, read_event};
use input_dispatch::pad::axis::AxisKind;
use input_dispatch::pad::PadDispatch;
use input_linux_sys::{ABS_RX, ABS_RY, ABS_THROTTLE, ABS_WHEEL};
use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

// Upper bound on events per case to keep runs short.
const MAX_EVENTS_PER_FUZZ_CASE: usize = 1000;

fuzz_target!(|data: &[u8]| {
    // includes a degenerate calibration on ABS_RY
    let device = StaticDevice::new()
        .with_abs(ABS_WHEEL as u16, AbsInfo::new(0, 71))
        .with_abs(ABS_THROTTLE as u16, AbsInfo::new(-36, 35))
        .with_abs(ABS_RX as u16, AbsInfo::new(0, 4096))
        .with_abs(ABS_RY as u16, AbsInfo::new(1, 1));
    let mut pad = PadDispatch::new(&device);
    let mut rec = Recorder::new();
    let mut reader = Cursor::new(data);

    for _ in 0..MAX_EVENTS_PER_FUZZ_CASE {
        let Ok(Some(event)) = read_event(&mut reader) else {
            break;
        };
        pad.process(&event, event_microseconds(&event), &mut rec);
    }

    for n in rec.take() {
        if let Notification::Axis { changed, values, .. } = n {
            assert!(!changed.is_empty());
            for axis in changed.axes() {
                let v = values[axis];
                match axis.kind() {
                    AxisKind::Ring => assert!((0.0..1.0).contains(&v), "{axis:?} = {v}"),
                    AxisKind::Strip => assert!((0.0..=1.0).contains(&v), "{axis:?} = {v}"),
                }
            }
        }
    }
});
