//! End-to-end scenarios for the pad event batcher.

use approx::assert_abs_diff_eq;
use input_dispatch::device::{AbsInfo, StaticDevice};
use input_dispatch::dispatch::{ButtonState, Notification};
use input_dispatch::pad::axis::{AxisSet, PadAxis};
use input_dispatch::pad::PadDispatch;
use input_linux_sys::{ABS_RX, ABS_RY, ABS_THROTTLE, ABS_WHEEL};

use test_helpers::*;

fn only_ring() -> StaticDevice {
    StaticDevice::new().with_abs(ABS_WHEEL as u16, AbsInfo::new(0, RING_MAX))
}

#[test]
fn ring_at_calibrated_minimum_reads_three_quarters() {
    let mut pad = PadDispatch::new(&only_ring());
    let out = run_events(&mut pad, &[abs_ev(100, ABS_WHEEL, 0), syn_ev(100)]);

    assert_eq!(out.len(), 1);
    let Notification::Axis {
        time,
        changed,
        values,
    } = out[0]
    else {
        panic!("expected an axis update, got {:?}", out[0]);
    };
    assert_eq!(time, 100);
    assert_eq!(changed, AxisSet::RING);
    assert_abs_diff_eq!(values[PadAxis::Ring], 0.75, epsilon = 1e-9);
}

#[test]
fn ring_wraps_through_north() {
    let mut pad = PadDispatch::new(&ring_and_strip_pad());
    run_events(&mut pad, &[syn_ev(0)]);

    // a quarter turn past the minimum is north
    let quarter = (RING_MAX + 1) / 4;
    let out = run_events(
        &mut pad,
        &[
            abs_ev(1_000, ABS_WHEEL, quarter - 1),
            syn_ev(1_000),
            abs_ev(2_000, ABS_WHEEL, quarter + 1),
            syn_ev(2_000),
        ],
    );

    let rings: Vec<f64> = out
        .iter()
        .map(|n| match n {
            Notification::Axis { values, .. } => values[PadAxis::Ring],
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(rings.len(), 2);
    assert!(rings[0] > 0.9 && rings[0] < 1.0, "{rings:?}");
    assert!(rings[1] > 0.0 && rings[1] < 0.1, "{rings:?}");
}

#[test]
fn frame_with_axes_and_buttons_reports_axes_first() {
    let mut pad = PadDispatch::new(&full_pad());
    run_events(&mut pad, &[syn_ev(0)]);

    let out = run_events(
        &mut pad,
        &[
            key_ev(5_000, BTN2, 1),
            abs_ev(5_000, ABS_RY, STRIP_MAX),
            key_ev(5_000, BTN0, 1),
            abs_ev(5_000, ABS_THROTTLE, 18),
            syn_ev(5_000),
        ],
    );

    assert_eq!(out.len(), 3, "{out:?}");
    match &out[0] {
        Notification::Axis {
            changed, values, ..
        } => {
            assert_eq!(*changed, AxisSet::RING2 | AxisSet::STRIP2);
            assert_abs_diff_eq!(values[PadAxis::Strip2], 1.0);
        }
        other => panic!("expected axis update first, got {other:?}"),
    }
    for (n, code) in out[1..].iter().zip([BTN0, BTN2]) {
        match n {
            Notification::Button {
                code: c,
                state,
                values,
                ..
            } => {
                assert_eq!(*c, code);
                assert_eq!(*state, ButtonState::Pressed);
                assert_abs_diff_eq!(values[PadAxis::Strip2], 1.0);
            }
            other => panic!("expected a button, got {other:?}"),
        }
    }
}

#[test]
fn chord_release_and_press_in_one_frame() {
    let mut pad = PadDispatch::new(&buttons_only_pad());
    let mut events = vec![key_ev(0, BTN0, 1), key_ev(0, BTN1, 1), syn_ev(0)];
    events.extend([key_ev(10, BTN0, 0), key_ev(10, BTN3, 1), syn_ev(10)]);

    let out = run_events(&mut pad, &events);
    let buttons: Vec<(u16, ButtonState)> = out
        .iter()
        .filter_map(|n| match n {
            Notification::Button { code, state, .. } => Some((*code, *state)),
            _ => None,
        })
        .collect();

    assert_eq!(
        buttons,
        vec![
            (BTN0, ButtonState::Pressed),
            (BTN1, ButtonState::Pressed),
            (BTN0, ButtonState::Released),
            (BTN3, ButtonState::Pressed),
        ]
    );
    assert!(pad.buttons().contains(BTN1));
    assert!(pad.buttons().contains(BTN3));
    assert!(!pad.buttons().contains(BTN0));
}

#[test]
fn strip_outside_calibration_is_clamped() {
    let mut pad = PadDispatch::new(&ring_and_strip_pad());
    run_events(&mut pad, &[syn_ev(0)]);

    let out = run_events(
        &mut pad,
        &[
            abs_ev(1, ABS_RX, -50),
            syn_ev(1),
            abs_ev(2, ABS_RX, STRIP_MAX + 50),
            syn_ev(2),
        ],
    );
    let strips: Vec<f64> = out
        .iter()
        .filter_map(|n| match n {
            Notification::Axis { values, .. } => Some(values[PadAxis::Strip]),
            _ => None,
        })
        .collect();
    assert_eq!(strips, vec![0.0, 1.0]);
}

#[test]
fn events_without_sync_are_held_back() {
    let mut pad = PadDispatch::new(&ring_and_strip_pad());
    run_events(&mut pad, &[syn_ev(0)]);

    let out = run_events(
        &mut pad,
        &[abs_ev(1, ABS_RX, 10), key_ev(1, BTN0, 1), abs_ev(2, ABS_RX, 20)],
    );
    assert!(out.is_empty());

    let out = run_events(&mut pad, &[syn_ev(3)]);
    assert_eq!(out.len(), 2);
    assert!(out.iter().all(|n| n.time() == 3));
}
