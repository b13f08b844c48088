//! Line-oriented `key=value` parameter file reader.
//!
//! `#` starts a comment, blank lines are skipped, unknown keys are ignored.
//! All eight tracker keys must appear: `v`, `dth`, `k`, `q`, `r`, `n`,
//! `bth`, `nmiss`.

use std::path::Path;

use mht_core::MhtParams;

use crate::error::CliError;

const REQUIRED_KEYS: [&str; 8] = ["v", "dth", "k", "q", "r", "n", "bth", "nmiss"];

/// Read tracker parameters from a file.
pub fn read_params(path: &Path) -> Result<MhtParams, CliError> {
    let contents = std::fs::read_to_string(path)?;
    parse_params(&contents)
}

/// Parse the contents of a parameter file.
pub fn parse_params(contents: &str) -> Result<MhtParams, CliError> {
    let mut params = MhtParams::default();
    let mut missing: Vec<&str> = REQUIRED_KEYS.to_vec();

    for line in contents.lines() {
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let (key, value) = line.split_once('=').ok_or_else(|| {
            CliError::ParamsFile(format!("malformed line (expected key=value): {line:?}"))
        })?;
        let (key, value) = (key.trim(), value.trim());

        match key {
            "v" => params.image_area = parse_real(key, value)?,
            "dth" => params.gating_area = parse_real(key, value)?,
            "k" => params.initial_gain = parse_real(key, value)?,
            "q" => params.process_noise = parse_real(key, value)?,
            "r" => params.measurement_noise = parse_real(key, value)?,
            "n" => params.scan_depth = parse_count(key, value)?,
            "bth" => params.branch_limit = parse_count(key, value)?,
            "nmiss" => params.miss_limit = parse_count(key, value)?,
            _ => continue,
        }
        missing.retain(|&k| k != key);
    }

    if !missing.is_empty() {
        return Err(CliError::ParamsFile(format!(
            "parameters not found: {}",
            missing.join(", ")
        )));
    }
    Ok(params)
}

fn parse_real(key: &str, value: &str) -> Result<f64, CliError> {
    value
        .parse()
        .map_err(|_| CliError::ParamsFile(format!("incorrect value for {key}: {value:?}")))
}

fn parse_count(key: &str, value: &str) -> Result<usize, CliError> {
    // Counts may be written as floats (e.g. `bth = 100.0`) but must be
    // non-negative integers.
    let real: f64 = parse_real(key, value)?;
    if !real.is_finite() || real < 0.0 || real.fract() != 0.0 {
        return Err(CliError::ParamsFile(format!(
            "{key} must be a non-negative integer, got {value:?}"
        )));
    }
    Ok(real as usize)
}
