use irmap_config::load_toml;
use rstest::rstest;

const FULL: &str = r#"
[sensor]
powerfit_a = 29.988
powerfit_b = -1.173
analog_bits = 10
analog_max_voltage = 3.3
num_samples = 15
measure_time_ms = 50

[sweep]
min_angle = 0
max_angle = 180
step_deg = 5

[display]
margin = 0.1

[simulation]
room_width = 4.0
room_height = 3.0
offset_x = 0.5
offset_y = -0.25

[logging]
level = "debug"
rotation = "daily"
"#;

#[test]
fn accepts_full_config() {
    let cfg = load_toml(FULL).expect("parse TOML");
    cfg.validate().expect("valid config should pass");
    assert_eq!(cfg.sensor.num_samples, 15);
    assert!((cfg.sensor.analog_max_voltage - 3.3).abs() < 1e-12);
    assert_eq!(cfg.sweep.step_deg, 5);
    assert_eq!(cfg.logging.rotation.as_deref(), Some("daily"));
}

#[test]
fn empty_config_uses_defaults() {
    let cfg = load_toml("").expect("parse empty TOML");
    cfg.validate().expect("defaults are valid");
    assert_eq!(cfg.sensor.analog_bits, 10);
    assert_eq!(cfg.sensor.measure_time_ms, 50);
    assert_eq!((cfg.sweep.min_angle, cfg.sweep.max_angle), (0, 180));
    assert!((cfg.display.margin - 0.1).abs() < 1e-12);
}

#[rstest]
#[case("[sensor]\nanalog_bits = 0", "analog_bits must be in [1, 16]")]
#[case("[sensor]\nanalog_bits = 17", "analog_bits must be in [1, 16]")]
#[case("[sensor]\nanalog_max_voltage = 0.0", "analog_max_voltage must be > 0")]
#[case("[sensor]\npowerfit_b = 0.0", "powerfit_b must be finite and non-zero")]
#[case("[sensor]\nnum_samples = 0", "num_samples must be >= 1")]
#[case("[sweep]\nmax_angle = 200", "max_angle must be <= 180")]
#[case("[sweep]\nmin_angle = 90\nmax_angle = 45", "min_angle must be <= sweep.max_angle")]
#[case("[sweep]\nstep_deg = 0", "step_deg must be >= 1")]
#[case("[display]\nmargin = -0.5", "margin must be >= 0")]
#[case("[simulation]\nroom_width = 0.0", "room dimensions must be > 0")]
#[case("[simulation]\noffset_x = 2.0", "outside the room")]
#[case("[logging]\nrotation = \"weekly\"", "never|daily|hourly")]
fn rejects_out_of_range_values(#[case] toml: &str, #[case] needle: &str) {
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should reject");
    assert!(
        format!("{err}").contains(needle),
        "expected '{needle}' in '{err}'"
    );
}

#[test]
fn unknown_type_is_a_parse_error() {
    let err = load_toml("[sweep]\nstep_deg = \"five\"").expect_err("string for u8");
    assert!(format!("{err}").contains("step_deg"));
}
