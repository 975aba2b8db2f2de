//! Half-circle sweeps: step the device through a plan of angles and feed the
//! readings into a [`ScanAccumulator`].
//!
//! Device failures abort the sweep with a typed error; retrying is up to the
//! caller.

use crate::error::IrmapError;
use crate::hw_error::map_hw_error;
use crate::scan::{MAX_ANGLE, Sample, ScanAccumulator, Side};
use crate::sensor::IrSensor;
use crate::sink::DisplaySink;
use irmap_traits::{AnalogInput, BoxError, Clock, DeviceClient, Servo};

/// Angles visited by one sweep: `min, min + step, ...` up to `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepPlan {
    min_angle: u8,
    max_angle: u8,
    step_deg: u8,
}

impl Default for SweepPlan {
    fn default() -> Self {
        Self {
            min_angle: 0,
            max_angle: 180,
            step_deg: 5,
        }
    }
}

impl SweepPlan {
    pub fn new(min_angle: u8, max_angle: u8, step_deg: u8) -> Result<Self, IrmapError> {
        if i32::from(max_angle) > MAX_ANGLE || min_angle > max_angle {
            return Err(IrmapError::Range(format!(
                "sweep {min_angle}..={max_angle} must lie within 0..={MAX_ANGLE}"
            )));
        }
        if step_deg == 0 {
            return Err(IrmapError::Range("sweep step must be >= 1 degree".into()));
        }
        Ok(Self {
            min_angle,
            max_angle,
            step_deg,
        })
    }

    pub fn min_angle(&self) -> u8 {
        self.min_angle
    }

    pub fn max_angle(&self) -> u8 {
        self.max_angle
    }

    pub fn angles(&self) -> impl Iterator<Item = u8> {
        (self.min_angle..=self.max_angle).step_by(usize::from(self.step_deg))
    }

    /// Number of readings one sweep takes; never zero.
    pub fn angle_count(&self) -> usize {
        usize::from((self.max_angle - self.min_angle) / self.step_deg) + 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub side: Side,
    pub samples: usize,
}

/// Run one sweep on `side` and home the device afterwards.
pub fn run_sweep<D, S>(
    device: &mut D,
    side: Side,
    plan: &SweepPlan,
    acc: &mut ScanAccumulator<S>,
) -> Result<SweepReport, IrmapError>
where
    D: DeviceClient + ?Sized,
    S: DisplaySink,
{
    tracing::info!(%side, angles = plan.angle_count(), "sweep started");
    let mut samples = 0;
    for angle in plan.angles() {
        let distance = device.measure(angle).map_err(|e| {
            let err = map_hw_error(&*e);
            tracing::warn!(%side, angle, error = %err, "sweep aborted");
            err
        })?;
        acc.ingest(Sample::new(i32::from(angle), distance, side))?;
        samples += 1;
    }
    device
        .home(plan.min_angle)
        .map_err(|e| map_hw_error(&*e))?;
    tracing::info!(%side, samples, "sweep complete");
    Ok(SweepReport { side, samples })
}

/// Servo-mounted IR sensor acting as a [`DeviceClient`].
pub struct IrRangefinder<S: Servo, A: AnalogInput, C: Clock> {
    servo: S,
    sensor: IrSensor<A, C>,
}

impl<S: Servo, A: AnalogInput, C: Clock> IrRangefinder<S, A, C> {
    pub fn new(servo: S, sensor: IrSensor<A, C>) -> Self {
        Self { servo, sensor }
    }

    pub fn sensor(&self) -> &IrSensor<A, C> {
        &self.sensor
    }
}

impl<S: Servo, A: AnalogInput, C: Clock> DeviceClient for IrRangefinder<S, A, C> {
    fn measure(&mut self, angle: u8) -> Result<f64, BoxError> {
        self.servo.set_angle(angle)?;
        Ok(self.sensor.read()?)
    }

    fn home(&mut self, angle: u8) -> Result<(), BoxError> {
        self.servo.set_angle(angle)
    }
}
