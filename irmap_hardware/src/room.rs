//! Axis-aligned rectangular room used by the simulated rig.

/// Rectangle centred on the origin; the device sits at `(offset_x, offset_y)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulatedRoom {
    pub width: f64,
    pub height: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Default for SimulatedRoom {
    fn default() -> Self {
        Self {
            width: 3.0,
            height: 2.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

impl SimulatedRoom {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn with_offset(mut self, x: f64, y: f64) -> Self {
        self.offset_x = x;
        self.offset_y = y;
        self
    }

    /// Distance from the device to the first wall along `(dx, dy)`.
    ///
    /// Returns `None` when the device is outside the room or the direction is
    /// degenerate.
    pub fn cast(&self, dx: f64, dy: f64) -> Option<f64> {
        let half_w = self.width / 2.0;
        let half_h = self.height / 2.0;
        if self.offset_x.abs() >= half_w || self.offset_y.abs() >= half_h {
            return None;
        }
        let along = |d: f64, origin: f64, half: f64| -> f64 {
            if d > f64::EPSILON {
                (half - origin) / d
            } else if d < -f64::EPSILON {
                (-half - origin) / d
            } else {
                f64::INFINITY
            }
        };
        let t = along(dx, self.offset_x, half_w).min(along(dy, self.offset_y, half_h));
        t.is_finite().then_some(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cast_hits_nearest_wall() {
        let room = SimulatedRoom::new(4.0, 2.0);
        assert!((room.cast(1.0, 0.0).unwrap() - 2.0).abs() < 1e-12);
        assert!((room.cast(0.0, -1.0).unwrap() - 1.0).abs() < 1e-12);
        let diag = std::f64::consts::FRAC_1_SQRT_2;
        // y wall at 1.0 is hit first: t = 1 / sin(45)
        assert!((room.cast(diag, diag).unwrap() - 2f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn offset_device_sees_asymmetric_walls() {
        let room = SimulatedRoom::new(4.0, 2.0).with_offset(1.0, 0.0);
        assert!((room.cast(1.0, 0.0).unwrap() - 1.0).abs() < 1e-12);
        assert!((room.cast(-1.0, 0.0).unwrap() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn device_outside_room_has_no_echo() {
        let room = SimulatedRoom::new(2.0, 2.0).with_offset(5.0, 0.0);
        assert!(room.cast(1.0, 0.0).is_none());
        assert!(SimulatedRoom::default().cast(0.0, 0.0).is_none());
    }
}
