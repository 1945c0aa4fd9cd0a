//! Code for reading the hourly demand and output profiles.
use super::*;
use crate::profile::HourlyProfiles;
use crate::resource::{ResourceID, ResourceMap};
use crate::units::Capacity;
use indexmap::IndexMap;
use log::warn;

const PROFILES_FILE_NAME: &str = "profiles.csv";
const DEMAND_COLUMN: &str = "demand";
const HOUR_COLUMN: &str = "hour";

/// Read the hourly profiles from the specified model directory.
///
/// The file has a `demand` column and one column for each non-dispatchable resource, named by
/// resource ID. An optional `hour` column is ignored, as are columns which do not refer to a
/// non-dispatchable resource (with a warning).
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `resources` - All generation resources
pub fn read_profiles(model_dir: &Path, resources: &ResourceMap) -> Result<HourlyProfiles> {
    let file_path = model_dir.join(PROFILES_FILE_NAME);
    let mut reader = csv::Reader::from_path(&file_path).with_context(|| input_err_msg(&file_path))?;
    read_profiles_from_reader(&mut reader, resources).with_context(|| input_err_msg(&file_path))
}

fn read_profiles_from_reader<R: std::io::Read>(
    reader: &mut csv::Reader<R>,
    resources: &ResourceMap,
) -> Result<HourlyProfiles> {
    let headers = reader.headers()?.clone();
    let mut demand_column = None;
    let mut output_columns = Vec::new();
    for (idx, header) in headers.iter().enumerate() {
        let header = header.trim();
        if header.eq_ignore_ascii_case(DEMAND_COLUMN) {
            demand_column = Some(idx);
            continue;
        }
        if header.eq_ignore_ascii_case(HOUR_COLUMN) {
            continue;
        }

        match resources.get(header) {
            Some(resource) if !resource.dispatchable => {
                output_columns.push((idx, resource.id.clone()));
            }
            Some(_) => warn!("Ignoring profile for dispatchable resource {header}"),
            None => warn!("Ignoring profile column {header}: no such resource"),
        }
    }
    let Some(demand_column) = demand_column else {
        bail!("Missing {DEMAND_COLUMN} column");
    };

    for resource in resources.values().filter(|resource| !resource.dispatchable) {
        ensure!(
            output_columns.iter().any(|(_, id)| *id == resource.id),
            "Missing profile for non-dispatchable resource {}",
            resource.id
        );
    }

    let mut demand = Vec::new();
    let mut outputs: IndexMap<ResourceID, Vec<f64>> = output_columns
        .iter()
        .map(|(_, id)| (id.clone(), Vec::new()))
        .collect();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let parse = |idx: usize| -> Result<f64> {
            let field = record.get(idx).unwrap_or_default().trim();
            field
                .parse()
                .with_context(|| format!("Invalid value in row {}: {field}", row + 1))
        };

        demand.push(Capacity(parse(demand_column)?));
        for (idx, id) in &output_columns {
            outputs[id].push(parse(*idx)?);
        }
    }

    HourlyProfiles::new(demand, outputs)
}
