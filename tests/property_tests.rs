//! Property-based tests for the pad batcher, the acceleration filter and the
//! timer service using proptest.

use input_dispatch::accel::profile::ProfileKind;
use input_dispatch::accel::{Coords, MotionFilter, PointerAccelerator};
use input_dispatch::device::AbsInfo;
use input_dispatch::dispatch::{ButtonState, Notification};
use input_dispatch::pad::axis::{normalize_ring, normalize_strip};
use input_dispatch::pad::buttons::ButtonSet;
use input_dispatch::pad::PadDispatch;
use input_dispatch::timer::{ManualWakeup, TimerService, Wakeup};
use input_linux_sys::{ABS_WHEEL, BTN_0};
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

// Use the dev-dependency crate for helpers
use test_helpers::*;

// --- Test Constants ---
const MAX_FRAMES: usize = 64;
const MAX_EVENTS_PER_FRAME: usize = 12;
const NUM_BUTTONS: u16 = 16;
const NUM_TIMERS: u32 = 6;

/// A frame is a list of (button offset, pressed) key events followed by a sync.
fn arb_frames() -> impl Strategy<Value = Vec<Vec<(u16, bool)>>> {
    prop::collection::vec(
        prop::collection::vec((0..NUM_BUTTONS, any::<bool>()), 0..=MAX_EVENTS_PER_FRAME),
        1..=MAX_FRAMES,
    )
}

#[derive(Debug, Clone)]
enum TimerOp {
    Set(u32, u64),
    Cancel(u32),
    Advance(u64),
}

fn arb_timer_ops() -> impl Strategy<Value = Vec<TimerOp>> {
    prop::collection::vec(
        prop_oneof![
            (0..NUM_TIMERS, 1u64..2_000_000).prop_map(|(t, d)| TimerOp::Set(t, d)),
            (0..NUM_TIMERS).prop_map(TimerOp::Cancel),
            (0u64..1_000_000).prop_map(TimerOp::Advance),
        ],
        0..200,
    )
}

// --- Properties ---

proptest! {
    /// Property: each sync reports exactly the buttons whose state differs
    /// from the previous sync, releases first, each group in ascending code
    /// order.
    #[test]
    fn prop_button_notifications_are_the_state_diff(frames in arb_frames()) {
        let mut pad = PadDispatch::new(&buttons_only_pad());
        let mut prev: BTreeSet<u16> = BTreeSet::new();

        for (i, frame) in frames.iter().enumerate() {
            let ts = (i as u64 + 1) * 1_000;
            let mut cur = prev.clone();
            let mut events = Vec::new();
            for &(offset, pressed) in frame {
                let code = BTN_0 as u16 + offset;
                events.push(key_ev(ts, code, i32::from(pressed)));
                if pressed {
                    cur.insert(code);
                } else {
                    cur.remove(&code);
                }
            }
            events.push(syn_ev(ts));

            let got: Vec<(u16, ButtonState)> = run_events(&mut pad, &events)
                .into_iter()
                .filter_map(|n| match n {
                    Notification::Button { code, state, .. } => Some((code, state)),
                    _ => None,
                })
                .collect();

            let mut expected: Vec<(u16, ButtonState)> = prev
                .difference(&cur)
                .map(|c| (*c, ButtonState::Released))
                .collect();
            expected.extend(cur.difference(&prev).map(|c| (*c, ButtonState::Pressed)));

            // Every changed button is reported exactly once.
            let prev_set: ButtonSet = prev.iter().copied().collect();
            let cur_set: ButtonSet = cur.iter().copied().collect();
            let mut reported: Vec<u16> = got.iter().map(|(code, _)| *code).collect();
            reported.sort_unstable();
            let changed: Vec<u16> = prev_set.symmetric_difference(&cur_set).iter().collect();
            prop_assert_eq!(reported, changed);

            prop_assert_eq!(got, expected, "frame {}: {:?}", i, frame);
            prev = cur;
        }
    }

    /// Property: a sync with nothing pending reports nothing.
    #[test]
    fn prop_second_flush_is_silent(frames in arb_frames(), ring in 0..=RING_MAX) {
        let mut pad = PadDispatch::new(&ring_and_strip_pad());
        for (i, frame) in frames.iter().enumerate() {
            let ts = (i as u64 + 1) * 1_000;
            let mut events: Vec<_> = frame
                .iter()
                .map(|&(offset, pressed)| key_ev(ts, BTN_0 as u16 + offset, i32::from(pressed)))
                .collect();
            events.push(abs_ev(ts, ABS_WHEEL, ring));
            events.push(syn_ev(ts));
            run_events(&mut pad, &events);

            let again = run_events(&mut pad, &[syn_ev(ts + 1)]);
            prop_assert!(again.is_empty(), "unexpected {:?}", again);
        }
    }

    /// Property: ring values wrap into [0, 1), strip values stay in [0, 1].
    #[test]
    fn prop_normalized_axes_stay_in_range(
        min in -10_000i32..10_000,
        span in 1i32..10_000,
        value in -30_000i32..30_000,
    ) {
        let info = AbsInfo { value, ..AbsInfo::new(min, min + span) };
        let ring = normalize_ring(&info);
        let strip = normalize_strip(&info);
        prop_assert!((0.0..1.0).contains(&ring), "ring {}", ring);
        prop_assert!((0.0..=1.0).contains(&strip), "strip {}", strip);
    }

    /// Property: acceleration only scales a delta, it never turns it.
    #[test]
    fn prop_acceleration_preserves_direction(
        deltas in prop::collection::vec((-50i32..50, -50i32..50, 1u64..400), 1..100),
        speed in -1.0f64..=1.0,
        kind in prop_oneof![
            Just(ProfileKind::Pointer),
            Just(ProfileKind::Touchpad),
            Just(ProfileKind::TouchpadLowRes),
        ],
    ) {
        let mut accel = PointerAccelerator::new(kind.profile());
        accel.set_speed(speed).unwrap();

        let mut time = 0u64;
        for (dx, dy, dt) in deltas {
            time += dt;
            let delta = Coords::new(f64::from(dx), f64::from(dy));
            let out = accel.filter(delta, time);
            prop_assert!(out.x.is_finite() && out.y.is_finite());
            prop_assert!(out.x * delta.x >= 0.0 && out.y * delta.y >= 0.0, "{:?} -> {:?}", delta, out);
            // cross product of collinear vectors is zero
            prop_assert!((out.x * delta.y - out.y * delta.x).abs() < 1e-6);
        }
    }

    /// Property: the wakeup source is always programmed for the earliest
    /// armed deadline, and every timer fires at most once per arming.
    #[test]
    fn prop_wakeup_tracks_earliest_deadline(ops in arb_timer_ops()) {
        let fired = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let mut timers = TimerService::with_wakeup(ManualWakeup::new(1), None).unwrap();
        let ids: Vec<_> = (0..NUM_TIMERS)
            .map(|i| {
                let fired = std::rc::Rc::clone(&fired);
                timers.register(format!("t{i}"), move |now, id, _| fired.borrow_mut().push((id, now)))
            })
            .collect();
        let mut model: BTreeMap<u32, u64> = BTreeMap::new();

        for op in ops {
            match op {
                TimerOp::Set(t, offset) => {
                    let deadline = timers.wakeup().now() + offset;
                    timers.set(ids[t as usize], deadline);
                    model.insert(t, deadline);
                }
                TimerOp::Cancel(t) => {
                    timers.cancel(ids[t as usize]);
                    model.remove(&t);
                }
                TimerOp::Advance(us) => {
                    if timers.wakeup_mut().advance_by(us) {
                        timers.on_wakeup();
                    }
                    let now = timers.wakeup().now();
                    let due: Vec<u32> = model
                        .iter()
                        .filter(|(_, d)| **d <= now)
                        .map(|(t, _)| *t)
                        .collect();
                    for t in due {
                        model.remove(&t);
                    }
                }
            }

            prop_assert_eq!(timers.armed_deadline(), model.values().min().copied());
            prop_assert_eq!(timers.active_count(), model.len());
        }

        let fired = fired.borrow();
        for (id, now) in fired.iter() {
            prop_assert!(ids.contains(id));
            prop_assert!(*now > 0);
        }
        for &id in &ids {
            timers.cancel(id);
        }
        timers.destroy(None);
    }
}
