//! Unit tests for the pad event batcher.

use super::axis::{AxisSet, PadAxis};
use super::{PadDispatch, PadStatus};
use crate::device::{AbsInfo, StaticDevice};
use crate::dispatch::{ButtonState, Dispatch, Notification, Recorder};
use approx::assert_abs_diff_eq;
use input_linux_sys::{
    input_event, timeval, ABS_MISC, ABS_RX, ABS_RY, ABS_THROTTLE, ABS_WHEEL, ABS_X, BTN_0, BTN_1,
    BTN_2, EV_ABS, EV_KEY, EV_REL, EV_SYN, REL_X,
};

// --- Test Helpers ---

const BTN0: u16 = BTN_0 as u16;
const BTN1: u16 = BTN_1 as u16;
const BTN2: u16 = BTN_2 as u16;

fn ev(ts_us: u64, type_: i32, code: i32, value: i32) -> input_event {
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

// Ring on ABS_WHEEL [0, 71], strip on ABS_RX [0, 4096].
fn ring_and_strip() -> StaticDevice {
    StaticDevice::new()
        .with_abs(ABS_WHEEL as u16, AbsInfo::new(0, 71))
        .with_abs(ABS_RX as u16, AbsInfo::new(0, 4096))
}

// Feeds the events, returns what the batcher reported.
fn run(pad: &mut PadDispatch, events: &[input_event]) -> Vec<Notification> {
    let mut rec = Recorder::new();
    for e in events {
        pad.process(e, crate::event::event_microseconds(e), &mut rec);
    }
    rec.take()
}

// Attaches and discards the initial axis snapshot.
fn attached(device: &StaticDevice) -> PadDispatch {
    let mut pad = PadDispatch::new(device);
    run(&mut pad, &[ev(0, EV_SYN, 0, 0)]);
    pad
}

// --- Axes ---

#[test]
fn first_flush_reports_every_supported_axis() {
    let mut pad = PadDispatch::new(&ring_and_strip());
    assert_eq!(pad.axis_capabilities(), AxisSet::RING | AxisSet::STRIP);
    assert!(pad.pending().contains(PadStatus::AXES_UPDATED));

    let out = run(&mut pad, &[ev(100, EV_SYN, 0, 0)]);
    assert_eq!(out.len(), 1);
    match &out[0] {
        Notification::Axis {
            time,
            changed,
            values,
        } => {
            assert_eq!(*time, 100);
            assert_eq!(*changed, AxisSet::RING | AxisSet::STRIP);
            assert_abs_diff_eq!(values[PadAxis::Ring], 0.75);
            assert_abs_diff_eq!(values[PadAxis::Strip], 0.0);
        }
        other => panic!("expected axis notification, got {other:?}"),
    }
}

#[test]
fn ring_minimum_reports_three_quarters() {
    let mut pad = attached(&ring_and_strip());

    let out = run(
        &mut pad,
        &[ev(1_000, EV_ABS, ABS_WHEEL, 0), ev(1_000, EV_SYN, 0, 0)],
    );
    assert_eq!(out.len(), 1);
    let Notification::Axis {
        changed, values, ..
    } = &out[0]
    else {
        panic!("expected axis notification, got {:?}", out[0]);
    };
    assert_eq!(*changed, AxisSet::RING);
    assert_abs_diff_eq!(values[PadAxis::Ring], 0.75);
}

#[test]
fn last_axis_value_in_a_frame_wins() {
    let mut pad = attached(&ring_and_strip());

    let out = run(
        &mut pad,
        &[
            ev(10, EV_ABS, ABS_RX, 100),
            ev(10, EV_ABS, ABS_RX, 2048),
            ev(10, EV_SYN, 0, 0),
        ],
    );
    assert_eq!(out.len(), 1);
    assert_abs_diff_eq!(pad.axes()[PadAxis::Strip], 0.5);
}

#[test]
fn axis_the_device_lacks_is_dropped() {
    let mut pad = attached(&ring_and_strip());

    let out = run(
        &mut pad,
        &[ev(10, EV_ABS, ABS_THROTTLE, 5), ev(10, EV_ABS, ABS_RY, 9), ev(10, EV_SYN, 0, 0)],
    );
    assert!(out.is_empty(), "unexpected notifications: {out:?}");
}

#[test]
fn misc_and_unknown_axes_are_ignored() {
    let mut pad = attached(&ring_and_strip());

    let out = run(
        &mut pad,
        &[ev(10, EV_ABS, ABS_MISC, 15), ev(10, EV_ABS, ABS_X, 300), ev(10, EV_SYN, 0, 0)],
    );
    assert!(out.is_empty(), "unexpected notifications: {out:?}");
    assert!(pad.pending().is_empty());
}

// --- Buttons ---

#[test]
fn presses_are_reported_in_ascending_code_order() {
    let mut pad = attached(&ring_and_strip());

    let out = run(
        &mut pad,
        &[
            ev(10, EV_KEY, BTN_1, 1),
            ev(10, EV_KEY, BTN_0, 1),
            ev(10, EV_SYN, 0, 0),
        ],
    );
    let buttons: Vec<_> = out
        .iter()
        .map(|n| match n {
            Notification::Button { code, state, .. } => (*code, *state),
            other => panic!("expected button notification, got {other:?}"),
        })
        .collect();
    assert_eq!(
        buttons,
        vec![(BTN0, ButtonState::Pressed), (BTN1, ButtonState::Pressed)]
    );

    // Only the button that actually changed is reported on release.
    let out = run(&mut pad, &[ev(20, EV_KEY, BTN_0, 0), ev(20, EV_SYN, 0, 0)]);
    assert_eq!(out.len(), 1);
    assert!(matches!(
        out[0],
        Notification::Button { code, state: ButtonState::Released, time: 20, .. } if code == BTN0
    ));
    assert!(pad.buttons().contains(BTN1));
}

#[test]
fn releases_come_before_presses() {
    let mut pad = attached(&ring_and_strip());
    run(&mut pad, &[ev(10, EV_KEY, BTN_2, 1), ev(10, EV_SYN, 0, 0)]);

    let mut rec = Recorder::new();
    for e in [
        ev(20, EV_KEY, BTN_0, 1),
        ev(20, EV_KEY, BTN_2, 0),
        ev(20, EV_SYN, 0, 0),
    ] {
        pad.process(&e, crate::event::event_microseconds(&e), &mut rec);
    }
    assert_eq!(
        rec.buttons(),
        vec![(BTN2, ButtonState::Released), (BTN0, ButtonState::Pressed)]
    );
}

#[test]
fn press_and_release_within_one_frame_cancel_out() {
    let mut pad = attached(&ring_and_strip());

    let out = run(
        &mut pad,
        &[
            ev(10, EV_KEY, BTN_0, 1),
            ev(10, EV_KEY, BTN_0, 0),
            ev(10, EV_SYN, 0, 0),
        ],
    );
    assert!(out.is_empty(), "unexpected notifications: {out:?}");
    assert!(pad.pending().is_empty());
}

#[test]
fn release_and_repress_within_one_frame_is_silent() {
    let mut pad = attached(&ring_and_strip());
    run(&mut pad, &[ev(10, EV_KEY, BTN_0, 1), ev(10, EV_SYN, 0, 0)]);

    let out = run(
        &mut pad,
        &[
            ev(20, EV_KEY, BTN_0, 0),
            ev(20, EV_KEY, BTN_0, 1),
            ev(20, EV_SYN, 0, 0),
        ],
    );
    assert!(out.is_empty(), "unexpected notifications: {out:?}");
    assert!(pad.buttons().contains(BTN0));
}

#[test]
fn key_repeat_counts_as_pressed() {
    let mut pad = attached(&ring_and_strip());
    run(&mut pad, &[ev(10, EV_KEY, BTN_0, 1), ev(10, EV_SYN, 0, 0)]);

    let out = run(&mut pad, &[ev(20, EV_KEY, BTN_0, 2), ev(20, EV_SYN, 0, 0)]);
    assert!(out.is_empty());
}

#[test]
fn button_notifications_carry_fresh_axis_values() {
    let mut pad = attached(&ring_and_strip());

    let out = run(
        &mut pad,
        &[
            ev(10, EV_ABS, ABS_RX, 4096),
            ev(10, EV_KEY, BTN_0, 1),
            ev(10, EV_SYN, 0, 0),
        ],
    );
    assert_eq!(out.len(), 2);
    assert!(matches!(out[0], Notification::Axis { .. }));
    let Notification::Button { values, .. } = &out[1] else {
        panic!("expected button notification, got {:?}", out[1]);
    };
    assert_abs_diff_eq!(values[PadAxis::Strip], 1.0);
}

#[test]
fn empty_frame_emits_nothing() {
    let mut pad = attached(&ring_and_strip());
    let out = run(&mut pad, &[ev(10, EV_SYN, 0, 0), ev(20, EV_SYN, 0, 0)]);
    assert!(out.is_empty());
}

#[test]
fn foreign_event_types_are_ignored() {
    let mut pad = attached(&ring_and_strip());
    let out = run(&mut pad, &[ev(10, EV_REL, REL_X, 3), ev(10, EV_SYN, 0, 0)]);
    assert!(out.is_empty());
}

#[test]
fn device_without_axes_reports_only_buttons() {
    let mut pad = PadDispatch::new(&StaticDevice::new());
    assert!(pad.axis_capabilities().is_empty());

    let out = run(&mut pad, &[ev(10, EV_KEY, BTN_0, 1), ev(10, EV_SYN, 0, 0)]);
    assert_eq!(out.len(), 1);
    assert!(matches!(out[0], Notification::Button { .. }));
}
