//! Logical pad axes and normalization of their raw values.

use crate::device::AbsInfo;
use bitflags::bitflags;
use input_linux_sys::{ABS_RX, ABS_RY, ABS_THROTTLE, ABS_WHEEL};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::ops::{Index, IndexMut};

/// Rotational axes wrap in [0, 1); strips are bounded in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisKind {
    Ring,
    Strip,
}

/// The closed set of absolute axes a pad exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PadAxis {
    Ring,
    Ring2,
    Strip,
    Strip2,
}

impl PadAxis {
    pub const COUNT: usize = 4;
    pub const ALL: [PadAxis; PadAxis::COUNT] =
        [PadAxis::Ring, PadAxis::Ring2, PadAxis::Strip, PadAxis::Strip2];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Maps a kernel `ABS_*` code to the logical axis it drives.
    pub fn from_evcode(code: u16) -> Option<PadAxis> {
        match i32::from(code) {
            ABS_WHEEL => Some(PadAxis::Ring),
            ABS_THROTTLE => Some(PadAxis::Ring2),
            ABS_RX => Some(PadAxis::Strip),
            ABS_RY => Some(PadAxis::Strip2),
            _ => None,
        }
    }

    pub const fn evcode(self) -> u16 {
        (match self {
            PadAxis::Ring => ABS_WHEEL,
            PadAxis::Ring2 => ABS_THROTTLE,
            PadAxis::Strip => ABS_RX,
            PadAxis::Strip2 => ABS_RY,
        }) as u16
    }

    pub const fn kind(self) -> AxisKind {
        match self {
            PadAxis::Ring | PadAxis::Ring2 => AxisKind::Ring,
            PadAxis::Strip | PadAxis::Strip2 => AxisKind::Strip,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            PadAxis::Ring => "ring",
            PadAxis::Ring2 => "ring2",
            PadAxis::Strip => "strip",
            PadAxis::Strip2 => "strip2",
        }
    }

    /// Canonical value of `info.value` for this axis.
    pub fn normalize(self, info: &AbsInfo) -> f64 {
        match self.kind() {
            AxisKind::Ring => normalize_ring(info),
            AxisKind::Strip => normalize_strip(info),
        }
    }
}

bitflags! {
    /// Set of logical axes, used both for capabilities and for the axes
    /// changed since the last flush.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AxisSet: u8 {
        const RING = 1 << 0;
        const RING2 = 1 << 1;
        const STRIP = 1 << 2;
        const STRIP2 = 1 << 3;
    }
}

impl From<PadAxis> for AxisSet {
    fn from(axis: PadAxis) -> Self {
        AxisSet::from_bits_truncate(1 << axis.index())
    }
}

impl AxisSet {
    #[inline]
    pub fn has(self, axis: PadAxis) -> bool {
        self.contains(AxisSet::from(axis))
    }

    /// Logical axes in the set, in ascending axis order.
    pub fn axes(self) -> impl Iterator<Item = PadAxis> {
        PadAxis::ALL.into_iter().filter(move |a| self.has(*a))
    }
}

impl Serialize for AxisSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.axes())
    }
}

/// Last normalized value per logical axis. Entries for axes that did not
/// change are stale and must be gated by a changed set. Serializes as an
/// array in axis order.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct AxisValues([f64; PadAxis::COUNT]);

impl AxisValues {
    /// Serializes only the axes in `set`.
    pub fn select(&self, set: AxisSet) -> SelectedAxes<'_> {
        SelectedAxes { values: self, set }
    }
}

impl Index<PadAxis> for AxisValues {
    type Output = f64;

    fn index(&self, axis: PadAxis) -> &f64 {
        &self.0[axis.index()]
    }
}

impl IndexMut<PadAxis> for AxisValues {
    fn index_mut(&mut self, axis: PadAxis) -> &mut f64 {
        &mut self.0[axis.index()]
    }
}

/// A view of [`AxisValues`] restricted to a set of axes.
pub struct SelectedAxes<'a> {
    values: &'a AxisValues,
    set: AxisSet,
}

impl Serialize for SelectedAxes<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.set.bits().count_ones() as usize))?;
        for axis in self.set.axes() {
            map.serialize_entry(axis.name(), &self.values[axis])?;
        }
        map.end()
    }
}

/// Ring position in [0, 1). 0 is the ring's northernmost point, a quarter
/// turn from the calibrated minimum, increasing clockwise.
pub fn normalize_ring(info: &AbsInfo) -> f64 {
    let range = info.range();
    if range <= 0.0 {
        return 0.0;
    }
    let value = (f64::from(info.value) - f64::from(info.minimum)) / range - 0.25;
    let wrapped = value.rem_euclid(1.0);
    // rem_euclid may round up to exactly 1.0 for tiny negative inputs
    if wrapped >= 1.0 {
        0.0
    } else {
        wrapped
    }
}

/// Strip position in [0, 1], clamped for values outside the calibration.
pub fn normalize_strip(info: &AbsInfo) -> f64 {
    let range = info.range();
    if range <= 0.0 {
        return 0.0;
    }
    ((f64::from(info.value) - f64::from(info.minimum)) / range).clamp(0.0, 1.0)
}
