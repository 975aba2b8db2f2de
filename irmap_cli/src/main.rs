#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! `irmap` command-line entry point.

mod calibrate;
mod cli;
mod error_fmt;
mod logging;
mod scan;

use clap::Parser;
use cli::{Cli, Commands};
use eyre::WrapErr;
use irmap_config::Config;
use std::path::Path;

fn load_config(path: Option<&Path>) -> eyre::Result<Config> {
    let cfg = match path {
        Some(p) => {
            let text = std::fs::read_to_string(p)
                .wrap_err_with(|| format!("read config {}", p.display()))?;
            irmap_config::load_toml(&text)
                .map_err(|e| eyre::eyre!("invalid configuration in {}: {e}", p.display()))?
        }
        None => Config::default(),
    };
    cfg.validate().wrap_err("invalid configuration")?;
    Ok(cfg)
}

fn run(cli: &Cli) -> eyre::Result<()> {
    let cfg = load_config(cli.config.as_deref())?;
    let _log_guard = logging::init(&cli.log_level, cli.json, &cfg.logging)?;
    tracing::debug!(config = ?cli.config, "configuration loaded");

    match &cli.cmd {
        Commands::Calibrate { dataset, table } => {
            calibrate::run_calibrate(dataset, *table, cli.json)
        }
        Commands::Scan { side, live } => scan::run_scan(&cfg, *side, *live, cli.json),
        Commands::SelfCheck => scan::run_self_check(&cfg, cli.json),
    }
}

fn main() {
    let _ = color_eyre::install();
    let cli = Cli::parse();

    if let Err(err) = run(&cli) {
        tracing::error!(error = %err, "irmap failed");
        if cli.json {
            eprintln!("{}", error_fmt::format_error_json(&err));
        } else {
            eprintln!("{}", error_fmt::humanize(&err));
        }
        std::process::exit(error_fmt::exit_code_for_error(&err));
    }
}
