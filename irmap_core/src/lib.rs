#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core IRMAP logic (hardware-agnostic).
//!
//! This crate turns IR rangefinder readings into a room outline and fits
//! response curves for sensor calibration. All hardware interactions go
//! through the `irmap_traits::AnalogInput`, `irmap_traits::Servo` and
//! `irmap_traits::DeviceClient` traits.
//!
//! ## Architecture
//!
//! - **Scan**: 360-slot point buffer, axis bounds and display updates (`scan`, `sink`)
//! - **Sweep**: half-circle sweeps over a device client (`sweep`)
//! - **Sensor**: mode-filtered analog reads mapped to distance (`sensor`)
//! - **Calibration**: exponential and power-law response fits (`calibration`)
//! - **Numerics**: weighted linear least squares and Levenberg-Marquardt (`lstsq`, `lm`)
//!
//! ## Slot layout
//!
//! Left samples occupy slots `0..=180`, right samples `179..=359`. The two
//! overlapping slots (179 and 180) hold whichever sample was written last.

pub mod calibration;
pub mod conversions;
pub mod error;
pub mod hw_error;
pub mod lm;
pub mod lstsq;
pub mod mocks;
pub mod scan;
pub mod sensor;
pub mod sink;
pub mod sweep;

pub use calibration::{
    CalibrationDataset, CalibrationReport, CurveCalibrator, FittedModel, OverlayRow,
    equation_string, evaluate, overlay, rms_error,
};
pub use error::{IrmapError, Report, Result};
pub use scan::{AxisBounds, Point, PointBuffer, Sample, ScanAccumulator, ScanSnapshot, Side};
pub use sensor::{IrSensor, SensorParams};
pub use sink::{ChannelSink, DisplaySink, NullSink};
pub use sweep::{IrRangefinder, SweepPlan, SweepReport, run_sweep};
