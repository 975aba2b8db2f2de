use irmap_core::mocks::{FailingAnalog, ReplayAnalog, ScriptedDevice};
use irmap_core::{
    IrRangefinder, IrSensor, IrmapError, ScanAccumulator, SensorParams, Side, SweepPlan, run_sweep,
};
use irmap_hardware::{AnalogModel, SimulatedRig, SimulatedRoom};
use irmap_traits::{DeviceClient, SimClock};
use rstest::rstest;
use std::time::Duration;

fn rig_device(rig: &SimulatedRig, clock: SimClock) -> impl DeviceClient {
    let sensor = IrSensor::new(rig.analog(), clock, SensorParams::default()).unwrap();
    IrRangefinder::new(rig.servo(), sensor)
}

#[test]
fn full_scan_traces_the_room() {
    let rig = SimulatedRig::new(SimulatedRoom::new(3.0, 2.0), AnalogModel::default());
    let clock = SimClock::new();
    let mut device = rig_device(&rig, clock.clone());
    let plan = SweepPlan::default();
    let mut acc = ScanAccumulator::new();

    let left = run_sweep(&mut device, Side::Left, &plan, &mut acc).unwrap();
    rig.rotate_half_turn();
    let right = run_sweep(&mut device, Side::Right, &plan, &mut acc).unwrap();

    assert_eq!(left.samples + right.samples, 74);
    assert_eq!(rig.angle(), 0, "device homes after each sweep");
    assert_eq!(rig.reads(), 74 * 15);
    assert_eq!(clock.elapsed(), Duration::from_millis(74 * 15 * 50));

    // Both halves land on the 3 x 2 m walls within ADC quantisation
    for (slot, p) in acc.points().iter() {
        let off_x = (p.x.abs() - 1.5).abs();
        let off_y = (p.y.abs() - 1.0).abs();
        assert!(
            off_x.min(off_y) < 0.1,
            "slot {slot} at ({:.3}, {:.3}) is off the walls",
            p.x,
            p.y
        );
    }
    let b = acc.bounds();
    assert!(b.x_limit > 1.5 && b.x_limit < 1.7, "{b:?}");
    assert!(b.y_limit > 1.0 && b.y_limit < 1.2, "{b:?}");
}

#[test]
fn halves_face_opposite_walls() {
    let room = SimulatedRoom::new(4.0, 2.0).with_offset(0.0, 0.5);
    let rig = SimulatedRig::new(room, AnalogModel::default());
    let mut device = rig_device(&rig, SimClock::new());
    let plan = SweepPlan::new(0, 0, 1).unwrap();
    let mut acc = ScanAccumulator::new();

    run_sweep(&mut device, Side::Left, &plan, &mut acc).unwrap();
    rig.rotate_half_turn();
    run_sweep(&mut device, Side::Right, &plan, &mut acc).unwrap();

    let front = acc.points().get(0).unwrap();
    let back = acc.points().get(179).unwrap();
    assert!((front.y - 0.5).abs() < 0.05, "{front:?}");
    assert!((back.y + 1.5).abs() < 0.1, "{back:?}");
}

#[test]
fn scripted_device_records_visits_and_homing() {
    let mut device = ScriptedDevice::new(|angle| 1.0 + f64::from(angle) / 180.0);
    let plan = SweepPlan::new(30, 90, 30).unwrap();
    let mut acc = ScanAccumulator::new();
    let report = run_sweep(&mut device, Side::Right, &plan, &mut acc).unwrap();
    assert_eq!(report.samples, 3);
    assert_eq!(device.measured(), &[30, 60, 90]);
    assert_eq!(device.homed(), &[30]);
    assert!(acc.points().get(30 + 179).is_some());
}

#[test]
fn device_failure_aborts_without_homing() {
    let mut device = ScriptedDevice::new(|_| 1.0).failing_at(45);
    let mut acc = ScanAccumulator::new();
    let err = run_sweep(&mut device, Side::Left, &SweepPlan::default(), &mut acc).unwrap_err();
    assert_eq!(err, IrmapError::Timeout);
    assert_eq!(acc.points().len(), 9);
    assert!(device.homed().is_empty());
}

#[test]
fn bad_distance_from_device_is_a_range_error() {
    let mut device = ScriptedDevice::new(|_| -1.0);
    let mut acc = ScanAccumulator::new();
    let err = run_sweep(&mut device, Side::Left, &SweepPlan::default(), &mut acc).unwrap_err();
    assert!(matches!(err, IrmapError::Range(_)));
    assert!(acc.points().is_empty());
}

#[test]
fn no_echo_surfaces_as_hardware_fault() {
    // Device sits outside the room, so nothing reflects
    let room = SimulatedRoom::new(1.0, 1.0).with_offset(5.0, 0.0);
    let rig = SimulatedRig::new(room, AnalogModel::default());
    let mut device = rig_device(&rig, SimClock::new());
    let err = device.measure(0).unwrap_err();
    let mapped = irmap_core::hw_error::map_hw_error(&*err);
    assert!(matches!(mapped, IrmapError::HardwareFault(_)), "{mapped:?}");
}

#[rstest]
#[case(vec![100, 101, 100, 99, 100], 100)]
#[case(vec![7, 9, 9, 7], 7)]
#[case(vec![512], 512)]
fn sensor_elects_mode(#[case] counts: Vec<u16>, #[case] expected: u16) {
    let params = SensorParams {
        num_samples: u32::try_from(counts.len()).unwrap(),
        ..SensorParams::default()
    };
    let mut sensor = IrSensor::new(ReplayAnalog::new(counts), SimClock::new(), params).unwrap();
    assert_eq!(sensor.read_raw().unwrap(), expected);
}

#[test]
fn sensor_maps_mode_through_power_fit() {
    let params = SensorParams::default();
    let mut sensor =
        IrSensor::new(ReplayAnalog::new(vec![200, 201, 200]), SimClock::new(), params).unwrap();
    let volts = 200.0 * 5.0 / 1023.0;
    let expected = 0.28 * f64::powf(volts, -1.15);
    assert!((sensor.read().unwrap() - expected).abs() < 1e-12);
}

#[test]
fn zero_count_is_not_a_distance() {
    let mut sensor =
        IrSensor::new(ReplayAnalog::new(vec![0]), SimClock::new(), SensorParams::default())
            .unwrap();
    assert!(matches!(sensor.read(), Err(IrmapError::Range(_))));
}

#[test]
fn sensor_errors_are_typed() {
    let mut sensor = IrSensor::new(
        FailingAnalog::new("adc timeout"),
        SimClock::new(),
        SensorParams::default(),
    )
    .unwrap();
    assert_eq!(sensor.read_raw().unwrap_err(), IrmapError::Timeout);

    let mut sensor = IrSensor::new(
        FailingAnalog::new("spi bus fault"),
        SimClock::new(),
        SensorParams::default(),
    )
    .unwrap();
    assert_eq!(
        sensor.read().unwrap_err(),
        IrmapError::Hardware("spi bus fault".into())
    );
}
