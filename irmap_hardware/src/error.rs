use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("servo angle {0} outside 0..=180")]
    ServoRange(u8),
    #[error("no wall in view at {0} deg")]
    NoEcho(u8),
    #[error("analog read timeout")]
    Timeout,
}

pub type Result<T> = std::result::Result<T, HwError>;
