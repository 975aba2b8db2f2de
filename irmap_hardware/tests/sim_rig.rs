use irmap_hardware::error::HwError;
use irmap_hardware::{AnalogModel, SimulatedRig, SimulatedRoom};
use irmap_traits::{AnalogInput, Servo};
use rstest::rstest;

fn mode(values: &[u16]) -> u16 {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let mut best = (sorted[0], 0);
    let mut i = 0;
    while i < sorted.len() {
        let run = sorted[i..].iter().take_while(|v| **v == sorted[i]).count();
        if run > best.1 {
            best = (sorted[i], run);
        }
        i += run;
    }
    best.0
}

#[rstest]
#[case(0, 1.0)]
#[case(90, 1.5)]
#[case(180, 1.0)]
fn square_on_walls(#[case] angle: u8, #[case] expected: f64) {
    let rig = SimulatedRig::new(SimulatedRoom::new(3.0, 2.0), AnalogModel::default());
    rig.servo().set_angle(angle).unwrap();
    assert!((rig.true_distance().unwrap() - expected).abs() < 1e-9);
}

#[test]
fn jitter_never_beats_the_true_level() {
    let model = AnalogModel::default();
    let rig = SimulatedRig::new(SimulatedRoom::default(), model);
    rig.servo().set_angle(90).unwrap();
    let mut adc = rig.analog();
    let level = model.raw_for_distance(1.5);
    for window in 0..10 {
        let reads: Vec<u16> = (0..15).map(|_| adc.read().unwrap()).collect();
        assert_eq!(mode(&reads), level, "window {window}: {reads:?}");
        assert!(reads.iter().all(|r| r.abs_diff(level) <= 2));
    }
    assert_eq!(rig.reads(), 150);
}

#[test]
fn rotation_toggles() {
    let rig = SimulatedRig::new(SimulatedRoom::default(), AnalogModel::default());
    assert!(!rig.is_flipped());
    rig.rotate_half_turn();
    assert!(rig.is_flipped());
    rig.rotate_half_turn();
    assert!(!rig.is_flipped());
}

#[test]
fn device_outside_room_has_no_echo() {
    let room = SimulatedRoom::new(1.0, 1.0).with_offset(0.0, 2.0);
    let rig = SimulatedRig::new(room, AnalogModel::default());
    let err = rig.analog().read().unwrap_err();
    assert!(matches!(
        err.downcast_ref::<HwError>(),
        Some(HwError::NoEcho(0))
    ));
}
