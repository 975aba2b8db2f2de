pub mod clock;

pub use clock::{Clock, MonotonicClock, SimClock};

/// Error type crossing the hardware trait boundary.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Raw analog input (ADC) the IR sensor is wired to.
pub trait AnalogInput {
    fn read(&mut self) -> Result<u16, BoxError>;
}

/// Hobby servo that points the sensor at an angle in degrees.
pub trait Servo {
    fn set_angle(&mut self, degrees: u8) -> Result<(), BoxError>;
}

/// Anything that can answer "how far is the wall at this angle?".
///
/// The angle is relative to the device's current physical heading; which half
/// of the room that is depends on how the operator placed the device.
pub trait DeviceClient {
    fn measure(&mut self, angle: u8) -> Result<f64, BoxError>;
    /// Return the head to its rest position after a sweep.
    fn home(&mut self, angle: u8) -> Result<(), BoxError>;
}
