//! Maps `Box<dyn Error>` from trait boundaries to typed `IrmapError`.
//!
//! The traits in `irmap_traits` use `Box<dyn Error + Send + Sync>` so any
//! driver can plug in; this module converts those to our typed error enum, with
//! an optional feature-gated path for `irmap_hardware::HwError` downcasting.

use crate::error::IrmapError;

/// Map a trait-boundary error to a typed `IrmapError`.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to string-based heuristics.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> IrmapError {
    // Device clients built on this crate already speak IrmapError
    if let Some(own) = e.downcast_ref::<IrmapError>() {
        return own.clone();
    }

    #[cfg(feature = "hardware-errors")]
    {
        use irmap_hardware::error::HwError;
        if let Some(hw) = e.downcast_ref::<HwError>() {
            return match hw {
                HwError::Timeout => IrmapError::Timeout,
                HwError::ServoRange(deg) => {
                    IrmapError::Range(format!("servo angle {deg} outside 0..=180"))
                }
                other => IrmapError::HardwareFault(other.to_string()),
            };
        }
    }

    // Fallback: string-based detection
    let s = e.to_string();
    if s.to_lowercase().contains("timeout") {
        IrmapError::Timeout
    } else {
        IrmapError::Hardware(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn foreign_timeout_maps_by_message() {
        let e = std::io::Error::other("adc timeout after 20ms");
        assert_eq!(map_hw_error(&e), IrmapError::Timeout);
    }

    #[test]
    fn foreign_error_keeps_message() {
        let e = std::io::Error::other("bus glitch");
        assert_eq!(map_hw_error(&e), IrmapError::Hardware("bus glitch".into()));
    }

    #[cfg(feature = "hardware-errors")]
    #[test]
    fn typed_hardware_errors_downcast() {
        use irmap_hardware::error::HwError;
        assert_eq!(map_hw_error(&HwError::Timeout), IrmapError::Timeout);
        assert!(matches!(
            map_hw_error(&HwError::ServoRange(200)),
            IrmapError::Range(_)
        ));
        assert_eq!(
            map_hw_error(&HwError::NoEcho(42)),
            IrmapError::HardwareFault("no wall in view at 42 deg".into())
        );
    }
}
