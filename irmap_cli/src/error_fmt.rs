//! Human-readable error descriptions and structured JSON error formatting.

use irmap_core::IrmapError;

/// Stable name for each error kind, used as the JSON `reason`.
pub fn reason_name(e: &IrmapError) -> &'static str {
    match e {
        IrmapError::Range(_) => "Range",
        IrmapError::Domain(_) => "Domain",
        IrmapError::Convergence(_) => "Convergence",
        IrmapError::Dataset(_) => "Dataset",
        IrmapError::Config(_) => "Config",
        IrmapError::Hardware(_) | IrmapError::HardwareFault(_) => "Hardware",
        IrmapError::Timeout => "Timeout",
    }
}

fn chain_message(err: &eyre::Report) -> String {
    err.chain()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(": ")
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(e) = err.downcast_ref::<IrmapError>() {
        return match e {
            IrmapError::Range(msg) => format!(
                "What happened: A value was out of range ({msg}).\nLikely causes: A sample angle outside 0..=180, or a sensor reading that maps to no usable distance.\nHow to fix: Check [sweep] angles and the [sensor] power fit in the config."
            ),
            IrmapError::Domain(msg) => format!(
                "What happened: The dataset is outside a model's domain ({msg}).\nLikely causes: A zero or negative response (exponential fit takes its log) or a negative distance (power-law fit).\nHow to fix: Remove or re-measure the offending points, then rerun."
            ),
            IrmapError::Convergence(msg) => format!(
                "What happened: The power-law fit did not converge ({msg}).\nLikely causes: Very noisy data or responses that do not follow a power law.\nHow to fix: Inspect the dataset with --table and drop outliers."
            ),
            IrmapError::Dataset(msg) => format!(
                "What happened: The calibration dataset is unusable ({msg}).\nLikely causes: Too few distinct distances or mismatched columns.\nHow to fix: Measure at least 3 different distances."
            ),
            IrmapError::Config(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
            IrmapError::Timeout => "What happened: Sensor read timed out.\nLikely causes: ADC not wired correctly or no power.\nHow to fix: Verify the sensor wiring and power.".to_string(),
            IrmapError::Hardware(msg) | IrmapError::HardwareFault(msg) => format!(
                "What happened: The device reported a fault ({msg}).\nLikely causes: No wall within sensor range, or a servo/ADC problem.\nHow to fix: Move the device closer to the walls and check its wiring."
            ),
        };
    }

    // String-based heuristics for errors coming from config or dataset loading
    let msg = chain_message(err);
    let lower = msg.to_ascii_lowercase();

    if lower.contains("dataset csv must have headers") {
        return "Invalid headers in dataset CSV. Expected 'distance,response'.".to_string();
    }

    if lower.contains("invalid dataset json") || lower.contains("dataset requires") {
        return format!(
            "What happened: The calibration dataset could not be read ({msg}).\nLikely causes: Missing \"x\"/\"y\" arrays, arrays of different length, or fewer than 3 points.\nHow to fix: Fix the dataset file and rerun."
        );
    }

    if lower.contains("invalid configuration") {
        return format!(
            "What happened: Configuration is invalid ({msg}).\nLikely causes: Out-of-range values in [sensor], [sweep], [display] or [simulation].\nHow to fix: Edit the TOML config and try again."
        );
    }

    // Generic fallback
    format!("Something went wrong: {msg}\nHow to fix: Re-run with --log-level=debug for details.")
}

/// Map typed errors to stable exit codes; everything else returns 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match err.downcast_ref::<IrmapError>() {
        Some(IrmapError::Range(_)) => 3,
        Some(IrmapError::Domain(_)) => 4,
        Some(IrmapError::Convergence(_)) => 5,
        _ => 1,
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let reason = err
        .downcast_ref::<IrmapError>()
        .map_or("Error", reason_name);
    json!({ "reason": reason, "message": humanize(err) }).to_string()
}
