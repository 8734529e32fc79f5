//! Device capability queries consumed by the per-device dispatchers.

use std::collections::HashMap;

/// Calibration and current state of one absolute axis, as reported by the
/// kernel for an `EV_ABS` code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AbsInfo {
    pub minimum: i32,
    pub maximum: i32,
    pub value: i32,
    /// Units per millimeter, 0 if unknown.
    pub resolution: i32,
}

impl AbsInfo {
    #[must_use]
    pub fn new(minimum: i32, maximum: i32) -> Self {
        AbsInfo {
            minimum,
            maximum,
            value: minimum,
            resolution: 0,
        }
    }

    /// Distance between maximum and minimum; non-positive for a bogus calibration.
    #[inline]
    pub fn range(&self) -> f64 {
        f64::from(self.maximum) - f64::from(self.minimum)
    }
}

/// What a device supports. Only absolute axes are queried by this crate.
pub trait DeviceCapabilities {
    fn has_abs(&self, code: u16) -> bool {
        self.abs_info(code).is_some()
    }

    fn abs_info(&self, code: u16) -> Option<AbsInfo>;
}

/// Capabilities described up front, e.g. from command line calibration or a
/// recorded device description.
#[derive(Debug, Clone, Default)]
pub struct StaticDevice {
    abs: HashMap<u16, AbsInfo>,
}

impl StaticDevice {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_abs(mut self, code: u16, info: AbsInfo) -> Self {
        self.abs.insert(code, info);
        self
    }
}

impl DeviceCapabilities for StaticDevice {
    fn abs_info(&self, code: u16) -> Option<AbsInfo> {
        self.abs.get(&code).copied()
    }
}
