//! Normalization of raw device deltas before acceleration.

use super::Coords;

/// Resolution all relative motion is normalized to.
pub const DEFAULT_MOUSE_DPI: f64 = 1000.0;
/// Fallback for touchpads without resolution: units per diagonal.
pub const DEFAULT_ACCEL_NUMERATOR: f64 = 1200.0;

const MM_PER_INCH: f64 = 25.4;

/// Per-axis coefficients that bring raw deltas to the default mouse
/// resolution, so a circle on the device does not turn into an ellipse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeltaScale {
    pub x: f64,
    pub y: f64,
}

impl Default for DeltaScale {
    fn default() -> Self {
        DeltaScale { x: 1.0, y: 1.0 }
    }
}

impl DeltaScale {
    /// Mouse with the given resolution. Zero is treated as the default DPI.
    pub fn from_dpi(dpi: u32) -> Self {
        if dpi == 0 {
            return Self::default();
        }
        let coeff = DEFAULT_MOUSE_DPI / f64::from(dpi);
        DeltaScale { x: coeff, y: coeff }
    }

    /// Touchpad with a known resolution in units/mm. Falls back to the
    /// diagonal when either resolution is unknown.
    pub fn from_resolution(res_x: i32, res_y: i32, diagonal: f64) -> Self {
        if res_x > 1 && res_y > 1 {
            DeltaScale {
                x: (DEFAULT_MOUSE_DPI / MM_PER_INCH) / f64::from(res_x),
                y: (DEFAULT_MOUSE_DPI / MM_PER_INCH) / f64::from(res_y),
            }
        } else {
            Self::from_diagonal(diagonal)
        }
    }

    /// Touchpad without resolution, scaled by its diagonal in device units.
    pub fn from_diagonal(diagonal: f64) -> Self {
        if diagonal <= 0.0 {
            return Self::default();
        }
        let coeff = DEFAULT_ACCEL_NUMERATOR / diagonal;
        DeltaScale { x: coeff, y: coeff }
    }

    #[inline]
    pub fn apply(&self, delta: Coords) -> Coords {
        Coords::new(delta.x * self.x, delta.y * self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn dpi_normalizes_to_default_resolution() {
        let scale = DeltaScale::from_dpi(2000);
        let out = scale.apply(Coords::new(10.0, -4.0));
        assert_abs_diff_eq!(out.x, 5.0);
        assert_abs_diff_eq!(out.y, -2.0);
        assert_eq!(DeltaScale::from_dpi(0), DeltaScale::default());
    }

    #[test]
    fn resolution_evens_out_axes() {
        let scale = DeltaScale::from_resolution(40, 20, 5000.0);
        assert_abs_diff_eq!(scale.x * 40.0, scale.y * 20.0, epsilon = 1e-12);
        assert_abs_diff_eq!(scale.x, 1000.0 / 25.4 / 40.0, epsilon = 1e-12);
    }

    #[test]
    fn unknown_resolution_falls_back_to_diagonal() {
        let scale = DeltaScale::from_resolution(0, 0, 2400.0);
        assert_abs_diff_eq!(scale.x, 0.5);
        assert_abs_diff_eq!(scale.y, 0.5);
    }
}
