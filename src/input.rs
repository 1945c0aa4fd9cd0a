//! Common routines for handling input data.
use crate::emissions::HourlyEmissions;
use crate::model::{Model, ModelParameters};
use anyhow::{Context, Result, bail, ensure};
use log::info;
use serde::de::{Deserialize, DeserializeOwned, Deserializer};
use std::fs;
use std::path::Path;

mod emissions;
use emissions::{GRID_EMISSIONS_FILE_NAME, IMPORT_EMISSIONS_FILE_NAME, read_hourly_emissions};
mod profile;
use profile::read_profiles;
mod resource;
use resource::read_resources;
mod storage;
use storage::read_storage;

/// Read a series of type `T`s from a CSV file.
///
/// Will raise an error if the file is empty.
///
/// # Arguments
///
/// * `file_path` - Path to the CSV file
pub fn read_csv<T: DeserializeOwned>(file_path: &Path) -> Result<Vec<T>> {
    let vec = read_csv_optional(file_path)?;
    ensure!(
        !vec.is_empty(),
        "{}: CSV file cannot be empty",
        file_path.display()
    );

    Ok(vec)
}

/// Read a series of type `T`s from a CSV file, allowing the file to contain no records.
///
/// # Arguments
///
/// * `file_path` - Path to the CSV file
pub fn read_csv_optional<T: DeserializeOwned>(file_path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_path(file_path)
        .with_context(|| input_err_msg(file_path))?;

    let mut vec = Vec::new();
    for result in reader.deserialize() {
        let record: T = result.with_context(|| input_err_msg(file_path))?;
        vec.push(record);
    }

    Ok(vec)
}

/// Parse a TOML file at the specified path.
///
/// # Arguments
///
/// * `file_path` - Path to the TOML file
///
/// # Returns
///
/// * The deserialised TOML data or an error if the file could not be read or parsed.
pub fn read_toml<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let toml_str = fs::read_to_string(file_path).with_context(|| input_err_msg(file_path))?;
    let toml_data = toml::from_str(&toml_str).with_context(|| input_err_msg(file_path))?;
    Ok(toml_data)
}

/// Format an error message to include the file path. To be used with `anyhow::Context`.
pub fn input_err_msg<P: AsRef<Path>>(file_path: P) -> String {
    format!("Error reading {}", file_path.as_ref().display())
}

/// Read a yes/no flag.
///
/// Accepts `y`, `yes` or `true` and `n`, `no` or `false` (case-insensitive). An empty field is
/// treated as `n`.
pub fn deserialise_yes_no<'de, D>(deserialiser: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value: String = Deserialize::deserialize(deserialiser)?;
    match value.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "true" => Ok(true),
        "n" | "no" | "false" | "" => Ok(false),
        _ => Err(serde::de::Error::custom(format!(
            "Invalid value for flag: {value} (expected y or n)"
        ))),
    }
}

/// Read an f64, checking that it is between 0 and 1
pub fn deserialise_proportion<'de, D, T>(deserialiser: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Copy + Into<f64>,
{
    let value: T = Deserialize::deserialize(deserialiser)?;
    if !(0.0..=1.0).contains(&value.into()) {
        Err(serde::de::Error::custom("Value must be between 0 and 1"))?;
    }

    Ok(value)
}

/// Read an f64, checking that it is between 0 and 1 and not zero
pub fn deserialise_proportion_nonzero<'de, D, T>(deserialiser: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Copy + Into<f64>,
{
    let value: T = deserialise_proportion(deserialiser)?;
    if value.into() == 0.0 {
        Err(serde::de::Error::custom("Value cannot be zero"))?;
    }

    Ok(value)
}

/// Check that a value is finite and not negative
pub fn check_non_negative(name: &str, value: f64) -> Result<()> {
    ensure!(
        value.is_finite() && value >= 0.0,
        "{name} must be a finite number greater than or equal to zero (got {value})"
    );

    Ok(())
}

/// Read an optional hourly emissions file.
///
/// If the file is not present, emission rates of zero are used for every hour.
fn read_optional_emissions(
    model_dir: &Path,
    file_name: &str,
    num_hours: usize,
) -> Result<HourlyEmissions> {
    let file_path = model_dir.join(file_name);
    if !file_path.is_file() {
        log::warn!("No {file_name} file provided; assuming zero emissions");
        return Ok(HourlyEmissions::zero(num_hours));
    }

    let emissions = read_hourly_emissions(&file_path)?;
    if emissions.num_hours() != num_hours {
        bail!(
            "{}: expected {num_hours} hours of emissions data to match the profiles, found {}",
            input_err_msg(&file_path),
            emissions.num_hours()
        );
    }

    Ok(emissions)
}

/// Read a model from the specified directory.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
///
/// # Returns
///
/// The loaded model or an error if any of the input files are missing or invalid.
pub fn load_model<P: AsRef<Path>>(model_dir: P) -> Result<Model> {
    let model_dir = model_dir.as_ref();
    let parameters = ModelParameters::from_path(model_dir)?;
    let resources = read_resources(model_dir)?;
    let storage = read_storage(model_dir)?;
    let profiles = read_profiles(model_dir, &resources)?;
    let num_hours = profiles.num_hours();
    let grid_emissions = read_optional_emissions(model_dir, GRID_EMISSIONS_FILE_NAME, num_hours)?;
    let import_emissions =
        read_optional_emissions(model_dir, IMPORT_EMISSIONS_FILE_NAME, num_hours)?;

    info!(
        "Read {} resources and {} storage resources over {num_hours} hours",
        resources.len(),
        storage.len()
    );

    Ok(Model {
        model_path: model_dir.to_path_buf(),
        parameters,
        resources,
        storage,
        profiles,
        grid_emissions,
        import_emissions,
    })
}
