//! Noise-robust IR distance readings.
//!
//! A single analog read from an IR rangefinder jitters by a few counts. Each
//! measurement therefore takes a burst of reads, elects the most repeated
//! value (the mode), converts it to volts and maps volts to distance with a
//! user-supplied power fit `distance = a * volts ^ b`.

use crate::error::IrmapError;
use crate::hw_error::map_hw_error;
use irmap_traits::{AnalogInput, Clock};
use std::collections::BTreeMap;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorParams {
    pub powerfit_a: f64,
    pub powerfit_b: f64,
    pub analog_bits: u8,
    pub analog_max_voltage: f64,
    pub num_samples: u32,
    pub measure_time: Duration,
}

impl Default for SensorParams {
    fn default() -> Self {
        Self {
            powerfit_a: 0.28,
            powerfit_b: -1.15,
            analog_bits: 10,
            analog_max_voltage: 5.0,
            num_samples: 15,
            measure_time: Duration::from_millis(50),
        }
    }
}

impl SensorParams {
    /// Volts per ADC count: `max_voltage / (2^bits - 1)`.
    pub fn analog_to_voltage(&self) -> f64 {
        self.analog_max_voltage / (2f64.powi(i32::from(self.analog_bits)) - 1.0)
    }

    pub fn voltage_to_distance(&self, volts: f64) -> f64 {
        self.powerfit_a * volts.powf(self.powerfit_b)
    }

    pub fn validate(&self) -> Result<(), IrmapError> {
        if !(1..=16).contains(&self.analog_bits) {
            return Err(IrmapError::Config(format!(
                "analog_bits {} outside [1, 16]",
                self.analog_bits
            )));
        }
        if !(self.analog_max_voltage.is_finite() && self.analog_max_voltage > 0.0) {
            return Err(IrmapError::Config("analog_max_voltage must be > 0".into()));
        }
        if self.num_samples == 0 {
            return Err(IrmapError::Config("num_samples must be >= 1".into()));
        }
        if !(self.powerfit_a.is_finite() && self.powerfit_b.is_finite()) {
            return Err(IrmapError::Config("power fit must be finite".into()));
        }
        Ok(())
    }
}

/// Most repeated value; ties go to the smallest value.
pub fn mode(values: &[u16]) -> Option<u16> {
    let mut counts: BTreeMap<u16, usize> = BTreeMap::new();
    for &v in values {
        *counts.entry(v).or_default() += 1;
    }
    let mut best = None;
    let mut best_count = 0;
    for (&value, &count) in &counts {
        if count > best_count {
            best_count = count;
            best = Some(value);
        }
    }
    best
}

pub struct IrSensor<A: AnalogInput, C: Clock> {
    input: A,
    clock: C,
    params: SensorParams,
    scratch: Vec<u16>,
}

impl<A: AnalogInput, C: Clock> IrSensor<A, C> {
    pub fn new(input: A, clock: C, params: SensorParams) -> Result<Self, IrmapError> {
        params.validate()?;
        Ok(Self {
            input,
            clock,
            scratch: Vec::with_capacity(params.num_samples as usize),
            params,
        })
    }

    pub fn params(&self) -> &SensorParams {
        &self.params
    }

    /// Take `num_samples` reads, pausing `measure_time` after each, and
    /// return their mode.
    pub fn read_raw(&mut self) -> Result<u16, IrmapError> {
        self.scratch.clear();
        for _ in 0..self.params.num_samples {
            let v = self.input.read().map_err(|e| map_hw_error(&*e))?;
            self.scratch.push(v);
            self.clock.sleep(self.params.measure_time);
        }
        mode(&self.scratch).ok_or_else(|| IrmapError::Hardware("no samples".into()))
    }

    /// Best-guess distance for the current sensor pose.
    pub fn read(&mut self) -> Result<f64, IrmapError> {
        let raw = self.read_raw()?;
        let volts = f64::from(raw) * self.params.analog_to_voltage();
        let distance = self.params.voltage_to_distance(volts);
        tracing::debug!(raw, volts, distance, "ir sensor reading");
        if !(distance.is_finite() && distance >= 0.0) {
            return Err(IrmapError::Range(format!(
                "raw reading {raw} maps to unusable distance {distance}"
            )));
        }
        Ok(distance)
    }

    pub fn into_parts(self) -> (A, C) {
        (self.input, self.clock)
    }
}
