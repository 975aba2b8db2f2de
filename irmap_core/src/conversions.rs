//! Conversions from `irmap_config` schemas to core types.
//!
//! Config structs are plain deserialized data; these impls are the one place
//! where they become validated core values.

use crate::calibration::CalibrationDataset;
use crate::error::IrmapError;
use crate::sensor::SensorParams;
use crate::sweep::SweepPlan;
use std::time::Duration;

impl From<&irmap_config::SensorCfg> for SensorParams {
    fn from(c: &irmap_config::SensorCfg) -> Self {
        Self {
            powerfit_a: c.powerfit_a,
            powerfit_b: c.powerfit_b,
            analog_bits: c.analog_bits,
            analog_max_voltage: c.analog_max_voltage,
            num_samples: c.num_samples,
            measure_time: Duration::from_millis(c.measure_time_ms),
        }
    }
}

impl TryFrom<&irmap_config::SweepCfg> for SweepPlan {
    type Error = IrmapError;

    fn try_from(c: &irmap_config::SweepCfg) -> Result<Self, Self::Error> {
        SweepPlan::new(c.min_angle, c.max_angle, c.step_deg)
    }
}

impl TryFrom<&irmap_config::DatasetFile> for CalibrationDataset {
    type Error = IrmapError;

    fn try_from(d: &irmap_config::DatasetFile) -> Result<Self, Self::Error> {
        CalibrationDataset::new(d.distance.clone(), d.response.clone())
    }
}

impl TryFrom<irmap_config::DatasetFile> for CalibrationDataset {
    type Error = IrmapError;

    fn try_from(d: irmap_config::DatasetFile) -> Result<Self, Self::Error> {
        CalibrationDataset::new(d.distance, d.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensor_defaults_agree() {
        let params = SensorParams::from(&irmap_config::SensorCfg::default());
        assert_eq!(params, SensorParams::default());
    }

    #[test]
    fn sweep_cfg_is_validated() {
        let bad = irmap_config::SweepCfg {
            min_angle: 0,
            max_angle: 200,
            step_deg: 5,
        };
        assert!(matches!(SweepPlan::try_from(&bad), Err(IrmapError::Range(_))));
        let ok = SweepPlan::try_from(&irmap_config::SweepCfg::default()).unwrap();
        assert_eq!(ok, SweepPlan::default());
    }

    #[test]
    fn dataset_file_keeps_pairs() {
        let file = irmap_config::parse_dataset_json(r#"{"x": [9, 4, 1], "y": [1, 2, 3]}"#).unwrap();
        let ds = CalibrationDataset::try_from(file).unwrap();
        assert_eq!(ds.distance(), &[1.0, 2.0, 3.0]);
        assert_eq!(ds.response(), &[9.0, 4.0, 1.0]);
    }
}
