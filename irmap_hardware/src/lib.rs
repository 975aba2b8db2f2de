//! Simulated IRMAP rig: a servo-mounted IR sensor inside a rectangular room.
//!
//! The servo and the analog input share the head state through `Rc<Cell<_>>`,
//! so pointing the servo changes what the next analog read returns. Both halves
//! implement the `irmap_traits` hardware traits and can be swapped for real
//! drivers without touching the core.
pub mod error;
mod room;

pub use room::SimulatedRoom;

use error::HwError;
use irmap_traits::{AnalogInput, BoxError, Servo};
use std::cell::Cell;
use std::rc::Rc;

/// Highest angle the servo accepts.
pub const SERVO_MAX_DEG: u8 = 180;

/// Deterministic ADC jitter applied cyclically; zero is the most common value,
/// so the mode of any window of 5 or more reads is the true level.
const JITTER: [i32; 10] = [0, 1, 0, -1, 0, 2, 0, -1, 0, 1];

/// Electrical model of the sensor: `distance = powerfit_a * volts ^ powerfit_b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalogModel {
    pub powerfit_a: f64,
    pub powerfit_b: f64,
    pub analog_bits: u8,
    pub analog_max_voltage: f64,
}

impl Default for AnalogModel {
    fn default() -> Self {
        Self {
            powerfit_a: 0.28,
            powerfit_b: -1.15,
            analog_bits: 10,
            analog_max_voltage: 5.0,
        }
    }
}

impl AnalogModel {
    pub fn max_raw(&self) -> u16 {
        let bits = u32::from(self.analog_bits.clamp(1, 16));
        u16::try_from((1u32 << bits) - 1).unwrap_or(u16::MAX)
    }

    pub fn volts_per_count(&self) -> f64 {
        self.analog_max_voltage / f64::from(self.max_raw())
    }

    /// ADC count the sensor would produce for a wall at `distance`.
    pub fn raw_for_distance(&self, distance: f64) -> u16 {
        let volts = (distance / self.powerfit_a).powf(1.0 / self.powerfit_b);
        let counts = (volts / self.volts_per_count()).round();
        if !counts.is_finite() || counts <= 0.0 {
            0
        } else {
            counts.min(f64::from(self.max_raw())) as u16
        }
    }
}

#[derive(Debug)]
struct Head {
    angle: Cell<u8>,
    flipped: Cell<bool>,
    reads: Cell<usize>,
}

/// Owner of the shared head state; hands out the servo and analog halves.
pub struct SimulatedRig {
    head: Rc<Head>,
    room: SimulatedRoom,
    model: AnalogModel,
}

impl SimulatedRig {
    pub fn new(room: SimulatedRoom, model: AnalogModel) -> Self {
        Self {
            head: Rc::new(Head {
                angle: Cell::new(0),
                flipped: Cell::new(false),
                reads: Cell::new(0),
            }),
            room,
            model,
        }
    }

    pub fn servo(&self) -> SimulatedServo {
        SimulatedServo {
            head: Rc::clone(&self.head),
        }
    }

    pub fn analog(&self) -> SimulatedAnalogInput {
        SimulatedAnalogInput {
            head: Rc::clone(&self.head),
            room: self.room,
            model: self.model,
        }
    }

    /// Physically turn the device around to scan the other half of the room.
    pub fn rotate_half_turn(&self) {
        let flipped = !self.head.flipped.get();
        self.head.flipped.set(flipped);
        tracing::debug!(flipped, "simulated rig rotated 180 degrees");
    }

    pub fn is_flipped(&self) -> bool {
        self.head.flipped.get()
    }

    pub fn angle(&self) -> u8 {
        self.head.angle.get()
    }

    /// Number of analog reads served so far.
    pub fn reads(&self) -> usize {
        self.head.reads.get()
    }

    /// Ground-truth wall distance for the current head pose.
    pub fn true_distance(&self) -> Option<f64> {
        wall_distance(&self.head, &self.room)
    }
}

fn wall_distance(head: &Head, room: &SimulatedRoom) -> Option<f64> {
    let theta = f64::from(head.angle.get()).to_radians();
    let (dx, dy) = if head.flipped.get() {
        (theta.sin(), -theta.cos())
    } else {
        (-theta.sin(), theta.cos())
    };
    room.cast(dx, dy)
}

pub struct SimulatedServo {
    head: Rc<Head>,
}

impl Servo for SimulatedServo {
    fn set_angle(&mut self, degrees: u8) -> Result<(), BoxError> {
        if degrees > SERVO_MAX_DEG {
            return Err(Box::new(HwError::ServoRange(degrees)));
        }
        tracing::trace!(degrees, "simulated servo move");
        self.head.angle.set(degrees);
        Ok(())
    }
}

pub struct SimulatedAnalogInput {
    head: Rc<Head>,
    room: SimulatedRoom,
    model: AnalogModel,
}

impl AnalogInput for SimulatedAnalogInput {
    fn read(&mut self) -> Result<u16, BoxError> {
        let n = self.head.reads.get();
        self.head.reads.set(n.wrapping_add(1));
        let distance = wall_distance(&self.head, &self.room)
            .ok_or_else(|| Box::new(HwError::NoEcho(self.head.angle.get())) as BoxError)?;
        let level = i32::from(self.model.raw_for_distance(distance));
        let noisy = (level + JITTER[n % JITTER.len()]).clamp(0, i32::from(self.model.max_raw()));
        Ok(u16::try_from(noisy).unwrap_or(0))
    }
}
