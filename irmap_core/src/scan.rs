//! Full-circle scan accumulator.
//!
//! The device sweeps half a circle (0..=180 degrees) at a time; the operator
//! turns it around between sweeps. Samples from both halves land in one
//! 360-slot buffer indexed by `angle + (179 if Right else 0)`, and the right
//! half is mirrored so both sweeps compose into one continuous ring.
//!
//! Every accepted sample (and every reset) pushes exactly one snapshot to the
//! configured [`DisplaySink`].

use crate::error::IrmapError;
use crate::sink::{DisplaySink, NullSink};

/// Number of slots in the full-circle buffer, one per degree.
pub const SLOT_COUNT: usize = 360;
/// Largest angle a half sweep can report.
pub const MAX_ANGLE: i32 = 180;
/// Slot offset applied to right-side samples.
///
/// Right angle 0 shares slot 179 with left angle 179, and right angle 1 shares
/// slot 180 with left angle 180; the last write wins.
pub const RIGHT_SLOT_OFFSET: usize = 179;
/// Padding added to the axis limits so points never touch the plot edge.
pub const DEFAULT_MARGIN: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    #[inline]
    pub fn slot_offset(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => RIGHT_SLOT_OFFSET,
        }
    }

    /// The device is physically rotated by 180 degrees between sweeps, which
    /// flips both axes for the right half.
    #[inline]
    fn signs(self) -> (f64, f64) {
        match self {
            Side::Left => (-1.0, 1.0),
            Side::Right => (1.0, -1.0),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// One polar reading from a half sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Degrees in `0..=180`.
    pub angle: i32,
    /// Non-negative distance, in whatever unit the sensor calibration yields.
    pub distance: f64,
    pub side: Side,
}

impl Sample {
    pub fn new(angle: i32, distance: f64, side: Side) -> Self {
        Self {
            angle,
            distance,
            side,
        }
    }

    fn validate(&self) -> Result<(), IrmapError> {
        if !(0..=MAX_ANGLE).contains(&self.angle) {
            return Err(IrmapError::Range(format!(
                "angle {} outside [0, {MAX_ANGLE}]",
                self.angle
            )));
        }
        if !(self.distance.is_finite() && self.distance >= 0.0) {
            return Err(IrmapError::Range(format!(
                "distance {} must be finite and >= 0",
                self.distance
            )));
        }
        Ok(())
    }

    /// Buffer slot this sample occupies.
    pub fn slot(&self) -> Result<usize, IrmapError> {
        self.validate()?;
        // validate() guarantees 0 <= angle <= 180
        let angle = self.angle.unsigned_abs() as usize;
        Ok(angle + self.side.slot_offset())
    }

    /// Signed Cartesian position relative to the device.
    pub fn to_point(&self) -> Point {
        let theta = f64::from(self.angle).to_radians();
        let (sx, sy) = self.side.signs();
        Point {
            x: theta.sin() * self.distance * sx,
            y: theta.cos() * self.distance * sy,
        }
    }
}

/// Fixed-size arena of 360 slots; `None` marks a slot with no sample yet.
#[derive(Debug, Clone, PartialEq)]
pub struct PointBuffer {
    slots: [Option<Point>; SLOT_COUNT],
}

impl Default for PointBuffer {
    fn default() -> Self {
        Self {
            slots: [None; SLOT_COUNT],
        }
    }
}

impl PointBuffer {
    pub fn get(&self, slot: usize) -> Option<Point> {
        self.slots.get(slot).copied().flatten()
    }

    /// Number of set slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Set points with their slot index, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, Point)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.map(|p| (i, p)))
    }

    /// X coordinates for all 360 slots, `NaN` where unset (plotters skip NaN).
    pub fn xs(&self) -> Vec<f64> {
        self.slots
            .iter()
            .map(|s| s.map_or(f64::NAN, |p| p.x))
            .collect()
    }

    /// Y coordinates for all 360 slots, `NaN` where unset.
    pub fn ys(&self) -> Vec<f64> {
        self.slots
            .iter()
            .map(|s| s.map_or(f64::NAN, |p| p.y))
            .collect()
    }

    fn set(&mut self, slot: usize, p: Point) -> Option<Point> {
        self.slots[slot].replace(p)
    }

    fn clear(&mut self) {
        self.slots = [None; SLOT_COUNT];
    }

    /// Largest `|x|` and `|y|` over set points, `(0, 0)` when empty.
    fn extent(&self) -> (f64, f64) {
        self.iter().fold((0.0f64, 0.0f64), |(mx, my), (_, p)| {
            (mx.max(p.x.abs()), my.max(p.y.abs()))
        })
    }
}

/// Symmetric plot limits: each axis spans `(-limit, +limit)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisBounds {
    pub x_limit: f64,
    pub y_limit: f64,
}

impl AxisBounds {
    /// `limit = max(1, max |coord|) + margin`, per axis.
    pub fn enclosing(points: &PointBuffer, margin: f64) -> Self {
        let (mx, my) = points.extent();
        Self {
            x_limit: mx.max(1.0) + margin,
            y_limit: my.max(1.0) + margin,
        }
    }

    pub fn x_range(&self) -> (f64, f64) {
        (-self.x_limit, self.x_limit)
    }

    pub fn y_range(&self) -> (f64, f64) {
        (-self.y_limit, self.y_limit)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x.abs() <= self.x_limit && p.y.abs() <= self.y_limit
    }
}

/// What a display sink receives: the whole buffer plus current bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanSnapshot {
    pub points: PointBuffer,
    pub bounds: AxisBounds,
}

pub struct ScanAccumulator<S: DisplaySink = NullSink> {
    state: ScanSnapshot,
    margin: f64,
    sink: S,
}

impl Default for ScanAccumulator<NullSink> {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanAccumulator<NullSink> {
    pub fn new() -> Self {
        Self::with_sink(NullSink)
    }
}

impl<S: DisplaySink> ScanAccumulator<S> {
    pub fn with_sink(sink: S) -> Self {
        let points = PointBuffer::default();
        let bounds = AxisBounds::enclosing(&points, DEFAULT_MARGIN);
        Self {
            state: ScanSnapshot { points, bounds },
            margin: DEFAULT_MARGIN,
            sink,
        }
    }

    /// Replace the axis padding. Bounds are recomputed silently; the next
    /// ingest or reset publishes them.
    pub fn with_margin(mut self, margin: f64) -> Result<Self, IrmapError> {
        if !(margin.is_finite() && margin >= 0.0) {
            return Err(IrmapError::Range(format!(
                "margin {margin} must be finite and >= 0"
            )));
        }
        self.margin = margin;
        self.state.bounds = AxisBounds::enclosing(&self.state.points, margin);
        Ok(self)
    }

    /// Place one sample, recompute bounds and notify the sink.
    ///
    /// Returns the slot written. Invalid samples are rejected before any state
    /// changes and produce no display update.
    pub fn ingest(&mut self, sample: Sample) -> Result<usize, IrmapError> {
        let slot = match sample.slot() {
            Ok(slot) => slot,
            Err(e) => {
                tracing::warn!(
                    angle = sample.angle,
                    distance = sample.distance,
                    side = %sample.side,
                    "rejecting scan sample"
                );
                return Err(e);
            }
        };
        let p = sample.to_point();
        let previous = self.state.points.set(slot, p);
        tracing::trace!(
            slot,
            x = p.x,
            y = p.y,
            overwrote = previous.is_some(),
            "scan sample placed"
        );
        self.refresh();
        Ok(slot)
    }

    /// Forget every sample and publish the default bounds.
    pub fn reset(&mut self) {
        self.state.points.clear();
        tracing::debug!("scan buffer cleared");
        self.refresh();
    }

    fn refresh(&mut self) {
        self.state.bounds = AxisBounds::enclosing(&self.state.points, self.margin);
        self.sink.update(&self.state);
    }

    pub fn points(&self) -> &PointBuffer {
        &self.state.points
    }

    pub fn bounds(&self) -> AxisBounds {
        self.state.bounds
    }

    pub fn margin(&self) -> f64 {
        self.margin
    }

    pub fn snapshot(&self) -> ScanSnapshot {
        self.state.clone()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_accumulator_has_default_box() {
        let acc = ScanAccumulator::new();
        assert!(acc.points().is_empty());
        assert_eq!(acc.bounds().x_range(), (-1.1, 1.1));
        assert_eq!(acc.bounds().y_range(), (-1.1, 1.1));
    }

    #[test]
    fn right_sweep_is_mirrored() {
        // Left 30 deg and right 30 deg point in opposite directions
        let l = Sample::new(30, 2.0, Side::Left).to_point();
        let r = Sample::new(30, 2.0, Side::Right).to_point();
        assert!((l.x + r.x).abs() < 1e-12);
        assert!((l.y + r.y).abs() < 1e-12);
        assert!(l.x < 0.0 && r.x > 0.0);
    }

    #[test]
    fn overwrite_keeps_last_value() {
        let mut acc = ScanAccumulator::new();
        acc.ingest(Sample::new(10, 1.0, Side::Left)).unwrap();
        acc.ingest(Sample::new(10, 4.0, Side::Left)).unwrap();
        assert_eq!(acc.points().len(), 1);
        let p = acc.points().get(10).unwrap();
        assert!((p.x.hypot(p.y) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn margin_is_configurable() {
        let acc = ScanAccumulator::new().with_margin(0.5).unwrap();
        assert_eq!(acc.bounds().x_limit, 1.5);
        assert!(ScanAccumulator::new().with_margin(-1.0).is_err());
        assert!(ScanAccumulator::new().with_margin(f64::NAN).is_err());
    }

    #[test]
    fn xs_ys_use_nan_for_unset_slots() {
        let mut acc = ScanAccumulator::new();
        acc.ingest(Sample::new(0, 2.0, Side::Left)).unwrap();
        let xs = acc.points().xs();
        let ys = acc.points().ys();
        assert_eq!(xs.len(), SLOT_COUNT);
        assert!((ys[0] - 2.0).abs() < 1e-12);
        assert!(xs[1].is_nan() && ys[359].is_nan());
    }
}
