//! Test and helper mocks for irmap_core

use irmap_traits::{AnalogInput, BoxError, DeviceClient};

/// Device whose readings come from a closure of the angle.
///
/// Records every homing request; can be told to fail at one angle.
pub struct ScriptedDevice<F: FnMut(u8) -> f64> {
    distance_at: F,
    fail_at: Option<u8>,
    measured: Vec<u8>,
    homed: Vec<u8>,
}

impl<F: FnMut(u8) -> f64> ScriptedDevice<F> {
    pub fn new(distance_at: F) -> Self {
        Self {
            distance_at,
            fail_at: None,
            measured: Vec::new(),
            homed: Vec::new(),
        }
    }

    /// Make `measure(angle)` return an I/O timeout.
    pub fn failing_at(mut self, angle: u8) -> Self {
        self.fail_at = Some(angle);
        self
    }

    pub fn measured(&self) -> &[u8] {
        &self.measured
    }

    pub fn homed(&self) -> &[u8] {
        &self.homed
    }
}

impl<F: FnMut(u8) -> f64> DeviceClient for ScriptedDevice<F> {
    fn measure(&mut self, angle: u8) -> Result<f64, BoxError> {
        if self.fail_at == Some(angle) {
            return Err(Box::new(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                format!("device timeout at {angle} deg"),
            )));
        }
        self.measured.push(angle);
        Ok((self.distance_at)(angle))
    }

    fn home(&mut self, angle: u8) -> Result<(), BoxError> {
        self.homed.push(angle);
        Ok(())
    }
}

/// Analog input that replays a fixed sequence of counts, cycling forever.
pub struct ReplayAnalog {
    counts: Vec<u16>,
    next: usize,
}

impl ReplayAnalog {
    pub fn new(counts: Vec<u16>) -> Self {
        Self { counts, next: 0 }
    }
}

impl AnalogInput for ReplayAnalog {
    fn read(&mut self) -> Result<u16, BoxError> {
        if self.counts.is_empty() {
            return Err(Box::new(std::io::Error::other("replay analog has no counts")));
        }
        let v = self.counts[self.next % self.counts.len()];
        self.next += 1;
        Ok(v)
    }
}

/// An analog input that always errors with `message`.
pub struct FailingAnalog {
    message: &'static str,
}

impl FailingAnalog {
    pub fn new(message: &'static str) -> Self {
        Self { message }
    }
}

impl AnalogInput for FailingAnalog {
    fn read(&mut self) -> Result<u16, BoxError> {
        Err(Box::new(std::io::Error::other(self.message)))
    }
}
