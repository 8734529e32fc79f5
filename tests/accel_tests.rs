//! Pointer motion through the dispatcher and the acceleration filter.

use approx::assert_abs_diff_eq;
use input_dispatch::accel::profile::ProfileKind;
use input_dispatch::accel::scale::DeltaScale;
use input_dispatch::accel::{Coords, MotionFilter, PointerAccelerator};
use input_dispatch::dispatch::{Notification, PointerDispatch};
use input_dispatch::error::AccelError;
use input_linux_sys::{REL_X, REL_Y};

use test_helpers::*;

const FRAME_US: u64 = 10_000;

fn pointer(scale: DeltaScale) -> PointerDispatch {
    PointerDispatch::new(
        Box::new(PointerAccelerator::new(ProfileKind::Pointer.profile())),
        scale,
    )
}

fn motions(out: &[Notification]) -> Vec<(Coords, Coords)> {
    out.iter()
        .filter_map(|n| match n {
            Notification::Motion { accel, unaccel, .. } => Some((*accel, *unaccel)),
            _ => None,
        })
        .collect()
}

#[test]
fn deltas_are_summed_per_frame_and_normalized() {
    let mut dispatch = pointer(DeltaScale::from_dpi(2000));
    let out = run_events(
        &mut dispatch,
        &[
            rel_ev(0, REL_X, 4),
            rel_ev(0, REL_X, 2),
            rel_ev(0, REL_Y, -8),
            syn_ev(0),
        ],
    );

    let m = motions(&out);
    assert_eq!(m.len(), 1);
    assert_eq!(m[0].1, Coords::new(3.0, -4.0));
}

#[test]
fn cancelling_motion_is_not_reported() {
    let mut dispatch = pointer(DeltaScale::default());
    let out = run_events(
        &mut dispatch,
        &[rel_ev(0, REL_X, 3), rel_ev(0, REL_X, -3), syn_ev(0), syn_ev(10)],
    );
    assert!(out.is_empty());
}

#[test]
fn steady_motion_settles_on_one_factor() {
    let mut dispatch = pointer(DeltaScale::default());
    let events: Vec<_> = (1..=30)
        .flat_map(|i| motion_frame(i * FRAME_US, 5, 0))
        .collect();

    let m = motions(&run_events(&mut dispatch, &events));
    assert_eq!(m.len(), 30);

    let (last, prev) = (m[29].0, m[28].0);
    assert_abs_diff_eq!(last.x, prev.x, epsilon = 1e-9);
    assert_eq!(last.y, 0.0);
    // ~0.5 units/ms is past the default threshold
    assert!(last.x > 5.0, "{last:?}");
    assert!(last.x < 10.0, "{last:?}");
}

#[test]
fn pause_resets_velocity() {
    let mut accel = PointerAccelerator::new(ProfileKind::Pointer.profile());
    for i in 1..=20 {
        accel.filter(Coords::new(8.0, 0.0), i * 10);
    }
    assert!(accel.last_velocity() > 0.0);

    accel.filter(Coords::new(8.0, 0.0), 200 + 1_000);
    assert_eq!(accel.last_velocity(), 0.0);
}

#[test]
fn speed_is_validated_through_the_dispatcher() {
    let mut dispatch = pointer(DeltaScale::default());
    let filter = dispatch.filter_mut();

    assert_eq!(filter.set_speed(2.0), Err(AccelError::SpeedOutOfRange(2.0)));
    assert!(filter.set_speed(-2.0).is_err());
    assert!(filter.set_speed(f64::NAN).is_err());
    assert_eq!(filter.speed(), 0.0);

    filter.set_speed(-0.5).unwrap();
    assert_eq!(dispatch.filter().speed(), -0.5);
}

#[test]
fn touchpad_profile_slows_down_small_motion() {
    let mut mouse = PointerAccelerator::new(ProfileKind::Pointer.profile());
    let mut touchpad = PointerAccelerator::new(ProfileKind::Touchpad.profile());

    let mut m = Coords::ZERO;
    let mut t = Coords::ZERO;
    for i in 1..=20 {
        m = mouse.filter(Coords::new(1.0, 0.0), i * 10);
        t = touchpad.filter(Coords::new(1.0, 0.0), i * 10);
    }
    assert!(t.x < m.x, "touchpad {t:?} mouse {m:?}");
}
