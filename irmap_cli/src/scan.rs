//! `irmap scan` and `irmap self-check` on the simulated rig.

use crate::cli::SideArg;
use irmap_config::Config;
use irmap_core::{
    IrRangefinder, IrSensor, ScanAccumulator, ScanSnapshot, SensorParams, Side, SweepPlan,
    run_sweep,
};
use irmap_hardware::{
    AnalogModel, SimulatedAnalogInput, SimulatedRig, SimulatedRoom, SimulatedServo,
};
use irmap_traits::{DeviceClient, SimClock};
use serde_json::json;

type SimDevice = IrRangefinder<SimulatedServo, SimulatedAnalogInput, SimClock>;

fn build_rig(cfg: &Config) -> eyre::Result<(SimulatedRig, SimDevice)> {
    let sim = &cfg.simulation;
    let room = SimulatedRoom::new(sim.room_width, sim.room_height)
        .with_offset(sim.offset_x, sim.offset_y);
    let model = AnalogModel {
        powerfit_a: cfg.sensor.powerfit_a,
        powerfit_b: cfg.sensor.powerfit_b,
        analog_bits: cfg.sensor.analog_bits,
        analog_max_voltage: cfg.sensor.analog_max_voltage,
    };
    let rig = SimulatedRig::new(room, model);
    // Simulated reads need no real settling time
    let sensor = IrSensor::new(rig.analog(), SimClock::new(), SensorParams::from(&cfg.sensor))?;
    let device = IrRangefinder::new(rig.servo(), sensor);
    Ok((rig, device))
}

fn snapshot_line(n: usize, s: &ScanSnapshot, json_out: bool) -> String {
    if json_out {
        json!({
            "update": n,
            "points": s.points.len(),
            "x_limit": s.bounds.x_limit,
            "y_limit": s.bounds.y_limit,
        })
        .to_string()
    } else {
        format!(
            "update {n}: points={} x=±{:.3} y=±{:.3}",
            s.points.len(),
            s.bounds.x_limit,
            s.bounds.y_limit
        )
    }
}

pub fn run_scan(cfg: &Config, side: SideArg, live: bool, json_out: bool) -> eyre::Result<()> {
    let (rig, mut device) = build_rig(cfg)?;
    let plan = SweepPlan::try_from(&cfg.sweep)?;

    let mut updates = 0usize;
    let sink = |s: &ScanSnapshot| {
        updates += 1;
        if live {
            println!("{}", snapshot_line(updates, s, json_out));
        }
    };
    let mut acc = ScanAccumulator::with_sink(sink).with_margin(cfg.display.margin)?;

    let mut samples = 0;
    for &half in side.sides() {
        // The right half is scanned with the device turned around
        if (half == Side::Right) != rig.is_flipped() {
            rig.rotate_half_turn();
        }
        samples += run_sweep(&mut device, half, &plan, &mut acc)?.samples;
    }

    let snapshot = acc.snapshot();
    let bounds = snapshot.bounds;
    if json_out {
        let points: Vec<_> = snapshot
            .points
            .iter()
            .map(|(slot, p)| json!({ "slot": slot, "x": p.x, "y": p.y }))
            .collect();
        println!(
            "{}",
            json!({
                "side": side.as_str(),
                "samples": samples,
                "points": points,
                "bounds": { "x_limit": bounds.x_limit, "y_limit": bounds.y_limit },
            })
        );
    } else {
        for (slot, p) in snapshot.points.iter() {
            println!("{slot:>3} {:>8.3} {:>8.3}", p.x, p.y);
        }
        println!(
            "bounds: x=[{:.3}, {:.3}] y=[{:.3}, {:.3}]",
            -bounds.x_limit, bounds.x_limit, -bounds.y_limit, bounds.y_limit
        );
        println!("samples: {samples}");
    }
    Ok(())
}

pub fn run_self_check(cfg: &Config, json_out: bool) -> eyre::Result<()> {
    let (rig, mut device) = build_rig(cfg)?;
    let angle = cfg.sweep.min_angle;
    let distance = device
        .measure(angle)
        .map_err(|e| irmap_core::hw_error::map_hw_error(&*e))?;
    tracing::info!(angle, distance, reads = rig.reads(), "self-check reading");
    if json_out {
        println!(
            "{}",
            json!({ "status": "ok", "angle": angle, "distance": distance })
        );
    } else {
        println!("OK: {distance:.3} m at {angle} deg");
    }
    Ok(())
}
