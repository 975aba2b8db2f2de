//! `irmap calibrate`: fit both response curves to a dataset file.

use irmap_core::{CalibrationDataset, CalibrationReport, CurveCalibrator, FittedModel, IrmapError};
use serde_json::{Value, json};
use std::path::Path;

pub fn run_calibrate(path: &Path, table: bool, json_out: bool) -> eyre::Result<()> {
    let file = irmap_config::load_dataset(path)?;
    let dataset = CalibrationDataset::try_from(file)?;
    tracing::info!(path = %path.display(), points = dataset.len(), "dataset loaded");

    let report = CurveCalibrator::new().calibrate(&dataset);
    if json_out {
        println!("{}", report_json(&report, &dataset, table));
    } else {
        print_report(&report);
        if table {
            print_table(&report, &dataset);
        }
    }

    // A failed fit still fails the command once the other one is reported
    if let Err(e) = &report.exponential {
        return Err(e.clone().into());
    }
    if let Err(e) = &report.power_law {
        return Err(e.clone().into());
    }
    Ok(())
}

fn line(label: &str, fit: &Result<FittedModel, IrmapError>) -> String {
    match fit {
        Ok(model) => format!("{label}: {model}"),
        Err(e) => format!("{label}: unavailable ({e})"),
    }
}

fn print_report(report: &CalibrationReport) {
    println!("{}", line("Exponential fit", &report.exponential));
    println!("{}", line("Power-law fit", &report.power_law));
}

fn cell(fit: &Result<FittedModel, IrmapError>, x: f64) -> String {
    fit.as_ref()
        .map_or_else(|_| "-".to_string(), |m| format!("{:.4}", m.evaluate(x)))
}

fn print_table(report: &CalibrationReport, dataset: &CalibrationDataset) {
    println!(
        "{:>10} {:>12} {:>12} {:>12}",
        "distance", "observed", "exponential", "power_law"
    );
    for (&d, &r) in dataset.distance().iter().zip(dataset.response()) {
        println!(
            "{:>10.4} {:>12.4} {:>12} {:>12}",
            d,
            r,
            cell(&report.exponential, d),
            cell(&report.power_law, d)
        );
    }
}

fn model_json(fit: &Result<FittedModel, IrmapError>, dataset: &CalibrationDataset) -> Value {
    match fit {
        Ok(model @ FittedModel::Exponential { a, b, c }) => json!({
            "equation": model.to_string(),
            "a": a, "b": b, "c": c,
            "rms_error": irmap_core::rms_error(model, dataset),
        }),
        Ok(model @ FittedModel::PowerLaw { a, b }) => json!({
            "equation": model.to_string(),
            "a": a, "b": b,
            "rms_error": irmap_core::rms_error(model, dataset),
        }),
        Err(e) => json!({ "error": e.to_string() }),
    }
}

fn report_json(report: &CalibrationReport, dataset: &CalibrationDataset, table: bool) -> Value {
    let mut out = json!({
        "points": dataset.len(),
        "exponential": model_json(&report.exponential, dataset),
        "power_law": model_json(&report.power_law, dataset),
    });
    if table {
        let eval = |fit: &Result<FittedModel, IrmapError>, x: f64| {
            fit.as_ref().ok().map(|m| m.evaluate(x))
        };
        let rows: Vec<Value> = dataset
            .distance()
            .iter()
            .zip(dataset.response())
            .map(|(&d, &r)| {
                json!({
                    "distance": d,
                    "observed": r,
                    "exponential": eval(&report.exponential, d),
                    "power_law": eval(&report.power_law, d),
                })
            })
            .collect();
        out["overlay"] = Value::Array(rows);
    }
    out
}
