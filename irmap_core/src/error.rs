use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum IrmapError {
    /// Input outside its contract (angle, distance); never clamped.
    #[error("range error: {0}")]
    Range(String),
    /// Value outside a model's mathematical domain (e.g. log of a non-positive response).
    #[error("domain error: {0}")]
    Domain(String),
    /// Iterative fit stopped without meeting its tolerances.
    #[error("fit did not converge: {0}")]
    Convergence(String),
    #[error("invalid dataset: {0}")]
    Dataset(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("hardware fault: {0}")]
    HardwareFault(String),
    #[error("timeout waiting for sensor")]
    Timeout,
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
