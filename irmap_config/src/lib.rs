#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas and calibration dataset parsing for IRMAP.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - Calibration datasets load from the JSON layout written by the bench rig
//!   (`{"x": [...responses], "y": [...distances]}`) or from a strict CSV.
use serde::Deserialize;
use std::path::Path;

/// Minimum number of points either curve fit can work with.
pub const MIN_DATASET_POINTS: usize = 3;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SensorCfg {
    /// `a` in `distance = a * volts ^ b`
    pub powerfit_a: f64,
    /// `b` in `distance = a * volts ^ b`
    pub powerfit_b: f64,
    /// ADC resolution in bits
    pub analog_bits: u8,
    /// Voltage that maps to the highest ADC count
    pub analog_max_voltage: f64,
    /// Reads per measurement; the mode wins
    pub num_samples: u32,
    /// Pause between successive reads (ms)
    pub measure_time_ms: u64,
}

impl Default for SensorCfg {
    fn default() -> Self {
        Self {
            powerfit_a: 0.28,
            powerfit_b: -1.15,
            analog_bits: 10,
            analog_max_voltage: 5.0,
            num_samples: 15,
            measure_time_ms: 50,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SweepCfg {
    pub min_angle: u8,
    pub max_angle: u8,
    pub step_deg: u8,
}

impl Default for SweepCfg {
    fn default() -> Self {
        Self {
            min_angle: 0,
            max_angle: 180,
            step_deg: 5,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DisplayCfg {
    /// Padding added around the furthest point on each axis
    pub margin: f64,
}

impl Default for DisplayCfg {
    fn default() -> Self {
        Self { margin: 0.1 }
    }
}

/// Room used by the simulated rig (`irmap scan` without hardware).
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SimulationCfg {
    pub room_width: f64,
    pub room_height: f64,
    /// Device position relative to the room centre
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Default for SimulationCfg {
    fn default() -> Self {
        Self {
            room_width: 3.0,
            room_height: 2.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub sensor: SensorCfg,
    pub sweep: SweepCfg,
    pub display: DisplayCfg,
    pub simulation: SimulationCfg,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Sensor
        if !(1..=16).contains(&self.sensor.analog_bits) {
            eyre::bail!("sensor.analog_bits must be in [1, 16]");
        }
        if !(self.sensor.analog_max_voltage.is_finite() && self.sensor.analog_max_voltage > 0.0) {
            eyre::bail!("sensor.analog_max_voltage must be > 0");
        }
        if !self.sensor.powerfit_a.is_finite() || self.sensor.powerfit_a == 0.0 {
            eyre::bail!("sensor.powerfit_a must be finite and non-zero");
        }
        if !self.sensor.powerfit_b.is_finite() || self.sensor.powerfit_b == 0.0 {
            eyre::bail!("sensor.powerfit_b must be finite and non-zero");
        }
        if self.sensor.num_samples == 0 {
            eyre::bail!("sensor.num_samples must be >= 1");
        }
        if self.sensor.measure_time_ms > 10_000 {
            eyre::bail!("sensor.measure_time_ms is unreasonably large (>10s)");
        }

        // Sweep
        if self.sweep.max_angle > 180 {
            eyre::bail!("sweep.max_angle must be <= 180");
        }
        if self.sweep.min_angle > self.sweep.max_angle {
            eyre::bail!("sweep.min_angle must be <= sweep.max_angle");
        }
        if self.sweep.step_deg == 0 {
            eyre::bail!("sweep.step_deg must be >= 1");
        }

        // Display
        if !(self.display.margin.is_finite() && self.display.margin >= 0.0) {
            eyre::bail!("display.margin must be >= 0");
        }

        // Simulation
        let sim = &self.simulation;
        if !(sim.room_width.is_finite() && sim.room_width > 0.0)
            || !(sim.room_height.is_finite() && sim.room_height > 0.0)
        {
            eyre::bail!("simulation room dimensions must be > 0");
        }
        if sim.offset_x.abs() >= sim.room_width / 2.0 || sim.offset_y.abs() >= sim.room_height / 2.0
        {
            eyre::bail!("simulation offset places the device outside the room");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got '{rot}'");
        }

        Ok(())
    }
}

/// Calibration dataset as stored on disk.
///
/// The bench rig writes raw sensor responses under `"x"` and the measured
/// distances under `"y"`; the descriptive names are accepted as aliases.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DatasetFile {
    #[serde(rename = "y", alias = "distance")]
    pub distance: Vec<f64>,
    #[serde(rename = "x", alias = "response")]
    pub response: Vec<f64>,
}

/// One row of the CSV dataset layout.
///
/// Expected headers:
/// distance,response
///
/// Example:
/// distance,response
/// 0.4,63.2
/// 0.8,31.5
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct DatasetRow {
    pub distance: f64,
    pub response: f64,
}

impl DatasetFile {
    pub fn len(&self) -> usize {
        self.distance.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distance.is_empty()
    }

    /// Structural checks shared by every loader.
    pub fn check(&self) -> eyre::Result<()> {
        if self.distance.len() != self.response.len() {
            eyre::bail!(
                "dataset arrays differ in length: {} distances vs {} responses",
                self.distance.len(),
                self.response.len()
            );
        }
        if self.distance.len() < MIN_DATASET_POINTS {
            eyre::bail!(
                "dataset requires at least {MIN_DATASET_POINTS} points, got {}",
                self.distance.len()
            );
        }
        if let Some(idx) = self
            .distance
            .iter()
            .chain(self.response.iter())
            .position(|v| !v.is_finite())
        {
            eyre::bail!("dataset contains a non-finite value (entry {idx})");
        }
        Ok(())
    }
}

impl FromIterator<DatasetRow> for DatasetFile {
    fn from_iter<I: IntoIterator<Item = DatasetRow>>(iter: I) -> Self {
        let (distance, response) = iter.into_iter().map(|r| (r.distance, r.response)).unzip();
        Self { distance, response }
    }
}

pub fn parse_dataset_json(text: &str) -> eyre::Result<DatasetFile> {
    let data: DatasetFile =
        serde_json::from_str(text).map_err(|e| eyre::eyre!("invalid dataset JSON: {e}"))?;
    data.check()?;
    Ok(data)
}

pub fn load_dataset_json(path: &Path) -> eyre::Result<DatasetFile> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("open dataset {:?}: {}", path, e))?;
    parse_dataset_json(&text)
}

pub fn load_dataset_csv(path: &Path) -> eyre::Result<DatasetFile> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open dataset CSV {:?}: {}", path, e))?;

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let expected = ["distance", "response"];
    let actual: Vec<String> = headers.iter().map(|s| s.trim().to_string()).collect();
    if actual != expected {
        eyre::bail!(
            "dataset CSV must have headers 'distance,response', got: {}",
            actual.join(",")
        );
    }

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<DatasetRow>().enumerate() {
        match rec {
            Ok(row) => rows.push(row),
            Err(e) => {
                eyre::bail!("invalid CSV row {}: {}", idx + 2, e);
            }
        }
    }

    let data: DatasetFile = rows.into_iter().collect();
    data.check()?;
    Ok(data)
}

/// Pick the loader from the file extension (`.csv`, anything else is JSON).
pub fn load_dataset(path: &Path) -> eyre::Result<DatasetFile> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    if is_csv {
        load_dataset_csv(path)
    } else {
        load_dataset_json(path)
    }
}
