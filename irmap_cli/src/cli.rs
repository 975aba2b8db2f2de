//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use irmap_core::Side;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "irmap", version, about = "IR room mapper and sensor calibration")]
pub struct Cli {
    /// Path to config TOML (built-in defaults when omitted)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Emit results, logs and errors as JSON
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

/// Which half (or both halves) of the room to sweep.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum SideArg {
    /// Device facing forward; sweep the left half
    Left,
    /// Device turned around; sweep the right half
    Right,
    /// Left sweep, turn the device around, right sweep
    Both,
}

impl SideArg {
    /// Sweeps to run, in order.
    pub fn sides(self) -> &'static [Side] {
        match self {
            SideArg::Left => &[Side::Left],
            SideArg::Right => &[Side::Right],
            SideArg::Both => &[Side::Left, Side::Right],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SideArg::Left => "left",
            SideArg::Right => "right",
            SideArg::Both => "both",
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fit exponential and power-law response curves to a dataset
    Calibrate {
        /// Dataset file: JSON `{"x": responses, "y": distances}` or CSV `distance,response`
        #[arg(long, value_name = "FILE")]
        dataset: PathBuf,
        /// Also print observed vs fitted values per point
        #[arg(long, action = ArgAction::SetTrue)]
        table: bool,
    },
    /// Sweep the simulated rig and print the room outline
    Scan {
        #[arg(long, value_enum, default_value_t = SideArg::Both)]
        side: SideArg,
        /// Print one line per display update
        #[arg(long, action = ArgAction::SetTrue)]
        live: bool,
    },
    /// Validate the config and take one simulated reading
    SelfCheck,
}
