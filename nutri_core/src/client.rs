//! Client anthropometrics loader.
//!
//! The client-record system exports the most recent clinical visit as a
//! JSON file; this module reads it into [`BodyMeasurements`].

use crate::{BodyMeasurements, Result, Sex};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::Path;

/// Measurement file format (matches the client-record export)
#[derive(Debug, Deserialize)]
struct MeasurementFile {
    sex: String,
    weight_kg: Option<f64>,
    height_cm: Option<f64>,
    age_years: Option<f64>,
    #[serde(default)]
    body_fat_percent: Option<f64>,
    #[serde(default)]
    measured_on: Option<NaiveDate>,
}

/// Load client measurements from a JSON file
///
/// Returns None if the file doesn't exist or cannot be read or parsed.
/// Fields still being filled in on the client record (`null` weight, height
/// or age) load as `0.0` so the calculators report "not computable".
pub fn load_client_measurements(path: &Path) -> Result<Option<BodyMeasurements>> {
    if !path.exists() {
        tracing::debug!("No client measurement file found at {:?}", path);
        return Ok(None);
    }

    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            tracing::warn!(
                "Failed to read client measurements at {:?}: {}. Ignoring file.",
                path,
                e
            );
            return Ok(None);
        }
    };

    let file: MeasurementFile = match serde_json::from_str(&contents) {
        Ok(file) => file,
        Err(e) => {
            tracing::warn!(
                "Failed to parse client measurements at {:?}: {}. Ignoring file.",
                path,
                e
            );
            return Ok(None);
        }
    };

    let Some(sex) = parse_sex(&file.sex) else {
        tracing::warn!(
            "Unknown sex '{}' in client measurements at {:?}. Ignoring file.",
            file.sex,
            path
        );
        return Ok(None);
    };

    tracing::info!(
        "Loaded client measurements from {:?} (measured on {:?})",
        path,
        file.measured_on
    );

    Ok(Some(BodyMeasurements {
        sex,
        weight_kg: file.weight_kg.unwrap_or(0.0),
        height_cm: file.height_cm.unwrap_or(0.0),
        age_years: file.age_years.unwrap_or(0.0),
        body_fat_percent: file.body_fat_percent,
    }))
}

/// Parse sex string into enum
pub fn parse_sex(s: &str) -> Option<Sex> {
    match s.trim().to_lowercase().as_str() {
        "male" | "m" => Some(Sex::Male),
        "female" | "f" => Some(Sex::Female),
        _ => None,
    }
}
