// fuzz/fuzz_targets/fuzz_accel.rs
#![no_main]

use arbitrary::Arbitrary;
use input_dispatch::accel::profile::ProfileKind;
use input_dispatch::accel::{Coords, MotionFilter, PointerAccelerator};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Motion {
    dx: i16,
    dy: i16,
    // ms since the previous motion
    dt: u16,
}

#[derive(Debug, Arbitrary)]
struct Input {
    profile: u8,
    speed: f64,
    motions: Vec<Motion>,
}

fuzz_target!(|input: Input| {
    let kind = match input.profile % 3 {
        0 => ProfileKind::Pointer,
        1 => ProfileKind::Touchpad,
        _ => ProfileKind::TouchpadLowRes,
    };
    let mut accel = PointerAccelerator::new(kind.profile());

    let accepted = accel.set_speed(input.speed).is_ok();
    assert_eq!(accepted, (-1.0..=1.0).contains(&input.speed));
    if !accepted {
        assert_eq!(accel.speed(), 0.0);
    }

    let mut time = 0u64;
    for m in input.motions.iter().take(1000) {
        time += u64::from(m.dt);
        let delta = Coords::new(f64::from(m.dx), f64::from(m.dy));
        let out = accel.filter(delta, time);
        assert!(out.x.is_finite() && out.y.is_finite());
        assert!(out.x * delta.x >= 0.0 && out.y * delta.y >= 0.0);
    }
});
