//! The module responsible for writing output data to disk.
use crate::model::Model;
use crate::resource::ResourceID;
use crate::simulation::optimisation::Solution;
use crate::simulation::results::{CapacityResult, GenerationResults, StorageResult};
use crate::storage::StorageID;
use crate::units::{Capacity, Dimensionless, Energy, Money, MoneyPerEnergy};
use anyhow::{Context, Result, ensure};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};

pub mod metadata;
use metadata::write_metadata;

/// The output file name for new resource capacity
const CAPACITY_FILE_NAME: &str = "capacity.csv";

/// The output file name for new storage capacity
const STORAGE_CAPACITY_FILE_NAME: &str = "storage_capacity.csv";

/// The output file name for annual generation
const GENERATION_FILE_NAME: &str = "generation.csv";

/// The output file name for hourly storage operation
const STORAGE_DISPATCH_FILE_NAME: &str = "storage_dispatch.csv";

/// The output file name for the run summary
const SUMMARY_FILE_NAME: &str = "summary.csv";

/// The output file name for demand balance duals
const DEMAND_DUALS_FILE_NAME: &str = "debug_demand_duals.csv";

/// Get the default output directory for the model specified at `model_dir`
pub fn get_output_dir(model_dir: &Path, results_root: PathBuf) -> Result<PathBuf> {
    // Get the model name from the dir path. This ends up being convoluted because we need to check
    // for all possible errors. Ugh.
    let model_dir = model_dir
        .canonicalize() // canonicalise in case the user has specified "."
        .context("Could not resolve path to model")?;

    let model_name = model_dir
        .file_name()
        .context("Model cannot be in root folder")?
        .to_str()
        .context("Invalid chars in model dir name")?;

    // Construct path
    let mut output_dir = results_root;
    output_dir.push(model_name);

    Ok(output_dir)
}

/// Create a new output directory for the model, optionally overwriting existing data.
///
/// # Arguments
///
/// * `output_dir` - The output directory to create
/// * `allow_overwrite` - Whether to delete and recreate the folder if it is non-empty
///
/// # Returns
///
/// `true` if existing output data was deleted, `false` if not. An error is returned if the folder
/// contains files and `allow_overwrite` is `false`.
pub fn create_output_directory(output_dir: &Path, allow_overwrite: bool) -> Result<bool> {
    // If the folder already exists, then delete it
    let overwrite = if let Ok(mut it) = fs::read_dir(output_dir) {
        if it.next().is_none() {
            // Folder exists and is empty: nothing to do
            return Ok(false);
        }

        ensure!(
            allow_overwrite,
            "Output folder already exists and is not empty. \
            Please delete the folder or pass the --overwrite command-line option."
        );

        fs::remove_dir_all(output_dir).context("Could not delete folder")?;
        true
    } else {
        false
    };

    // Try to create the directory, with parents
    fs::create_dir_all(output_dir)?;

    Ok(overwrite)
}

/// Represents a row in the capacity CSV files
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct CapacityRow<ID> {
    id: ID,
    build_year: u32,
    new_capacity: Capacity,
    cumulative_capacity: Capacity,
}

/// Represents a row in the generation CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct GenerationRow {
    build_year: u32,
    resource_id: ResourceID,
    generation: Energy,
    fraction: Dimensionless,
}

/// Represents a row in the storage dispatch CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct StorageDispatchRow {
    storage_id: StorageID,
    build_year: u32,
    hour: usize,
    charge: Energy,
    discharge: Energy,
    net_source: Energy,
    state_of_charge: Energy,
}

/// Represents the single row of the summary CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct SummaryRow {
    objective_value: Money,
    total_capacity: Capacity,
    total_storage_capacity: Capacity,
    final_year_generation: Energy,
}

/// Represents a row in the demand duals CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct DemandDualsRow {
    build_year: u32,
    hour: usize,
    value: MoneyPerEnergy,
}

/// Write the capacity results for generation or storage resources
fn write_capacity_rows<ID: Serialize + Clone>(
    writer: &mut csv::Writer<File>,
    results: &IndexMap<ID, CapacityResult>,
) -> Result<()> {
    for (id, result) in results {
        for (year, new_capacity) in (0..).zip(result.new_by_year.iter().copied()) {
            writer.serialize(CapacityRow {
                id: id.clone(),
                build_year: year,
                new_capacity,
                cumulative_capacity: result.cumulative(year),
            })?;
        }
    }

    Ok(())
}

/// For writing extra debug information about the model
struct DebugDataWriter {
    demand_duals_writer: csv::Writer<File>,
}

impl DebugDataWriter {
    /// Open CSV files to write debug info to
    ///
    /// # Arguments
    ///
    /// * `output_path` - Folder where files will be saved
    fn create(output_path: &Path) -> Result<Self> {
        let file_path = output_path.join(DEMAND_DUALS_FILE_NAME);
        Ok(Self {
            demand_duals_writer: csv::Writer::from_path(file_path)?,
        })
    }

    /// Write demand balance duals to file
    fn write_demand_duals(&mut self, solution: &Solution) -> Result<()> {
        for (build_year, hour, value) in solution.iter_demand_duals() {
            self.demand_duals_writer.serialize(DemandDualsRow {
                build_year,
                hour,
                value,
            })?;
        }

        Ok(())
    }

    /// Flush the underlying streams
    fn flush(&mut self) -> Result<()> {
        self.demand_duals_writer.flush()?;

        Ok(())
    }
}

/// An object for writing results to file
pub struct DataWriter {
    capacity_writer: csv::Writer<File>,
    storage_capacity_writer: csv::Writer<File>,
    generation_writer: csv::Writer<File>,
    storage_dispatch_writer: csv::Writer<File>,
    summary_writer: csv::Writer<File>,
    debug_writer: Option<DebugDataWriter>,
}

impl DataWriter {
    /// Open CSV files to write output data to and write run metadata
    ///
    /// # Arguments
    ///
    /// * `output_path` - Folder where files will be saved
    /// * `model` - The model being run
    /// * `save_debug_info` - Whether to include extra CSV files for debugging model
    pub fn create(output_path: &Path, model: &Model, save_debug_info: bool) -> Result<Self> {
        write_metadata(output_path, model).context("Failed to save metadata")?;

        let new_writer = |file_name| {
            let file_path = output_path.join(file_name);
            csv::Writer::from_path(file_path)
        };

        let debug_writer = if save_debug_info {
            // Create debug CSV files
            Some(DebugDataWriter::create(output_path)?)
        } else {
            None
        };

        Ok(Self {
            capacity_writer: new_writer(CAPACITY_FILE_NAME)?,
            storage_capacity_writer: new_writer(STORAGE_CAPACITY_FILE_NAME)?,
            generation_writer: new_writer(GENERATION_FILE_NAME)?,
            storage_dispatch_writer: new_writer(STORAGE_DISPATCH_FILE_NAME)?,
            summary_writer: new_writer(SUMMARY_FILE_NAME)?,
            debug_writer,
        })
    }

    /// Write new and cumulative capacity for each generation resource and build year
    pub fn write_capacity(&mut self, results: &IndexMap<ResourceID, CapacityResult>) -> Result<()> {
        write_capacity_rows(&mut self.capacity_writer, results)
    }

    /// Write new and cumulative capacity for each storage resource and build year
    pub fn write_storage_capacity(
        &mut self,
        results: &IndexMap<StorageID, StorageResult>,
    ) -> Result<()> {
        let capacity: IndexMap<_, _> = results
            .iter()
            .map(|(id, result)| (id.clone(), result.capacity.clone()))
            .collect();
        write_capacity_rows(&mut self.storage_capacity_writer, &capacity)
    }

    /// Write annual generation for each build year
    pub fn write_generation(&mut self, results: &[GenerationResults]) -> Result<()> {
        for year_results in results {
            for (resource_id, generation) in &year_results.by_resource {
                self.generation_writer.serialize(GenerationRow {
                    build_year: year_results.year,
                    resource_id: resource_id.clone(),
                    generation: *generation,
                    fraction: year_results.fraction(resource_id),
                })?;
            }
        }

        Ok(())
    }

    /// Write hourly storage operation
    pub fn write_storage_dispatch(
        &mut self,
        results: &IndexMap<StorageID, StorageResult>,
    ) -> Result<()> {
        for (storage_id, result) in results {
            for hour in &result.hourly {
                self.storage_dispatch_writer.serialize(StorageDispatchRow {
                    storage_id: storage_id.clone(),
                    build_year: hour.year,
                    hour: hour.hour,
                    charge: hour.charge,
                    discharge: hour.discharge,
                    net_source: hour.net_source,
                    state_of_charge: hour.state_of_charge,
                })?;
            }
        }

        Ok(())
    }

    /// Write the objective value and totals for the run
    pub fn write_summary(
        &mut self,
        solution: &Solution,
        capacity: &IndexMap<ResourceID, CapacityResult>,
        storage: &IndexMap<StorageID, StorageResult>,
        generation: &[GenerationResults],
    ) -> Result<()> {
        self.summary_writer.serialize(SummaryRow {
            objective_value: solution.objective_value,
            total_capacity: capacity.values().map(CapacityResult::total).sum(),
            total_storage_capacity: storage.values().map(|s| s.capacity.total()).sum(),
            final_year_generation: generation
                .last()
                .map_or(Energy(0.0), |results| results.total),
        })?;

        Ok(())
    }

    /// Write debug info to CSV, if enabled
    pub fn write_debug_info(&mut self, solution: &Solution) -> Result<()> {
        if let Some(wtr) = &mut self.debug_writer {
            wtr.write_demand_duals(solution)?;
        }

        Ok(())
    }

    /// Flush the underlying streams
    pub fn flush(&mut self) -> Result<()> {
        self.capacity_writer.flush()?;
        self.storage_capacity_writer.flush()?;
        self.generation_writer.flush()?;
        self.storage_dispatch_writer.flush()?;
        self.summary_writer.flush()?;
        if let Some(wtr) = &mut self.debug_writer {
            wtr.flush()?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::single_year_model;
    use crate::simulation::optimisation::perform_optimisation;
    use crate::simulation::results::{capacity_results, generation_results, storage_results};
    use itertools::Itertools;
    use rstest::rstest;
    use tempfile::tempdir;

    fn capacity_result() -> CapacityResult {
        CapacityResult {
            existing: Capacity(5.0),
            new_by_year: vec![Capacity(1.0), Capacity(2.0)],
            fraction: Dimensionless(1.0),
        }
    }

    #[test]
    fn test_write_capacity() {
        let dir = tempdir().unwrap();
        let results: IndexMap<ResourceID, _> =
            [("gas".into(), capacity_result())].into_iter().collect();

        // Write capacity
        {
            let mut writer = csv::Writer::from_path(dir.path().join(CAPACITY_FILE_NAME)).unwrap();
            write_capacity_rows(&mut writer, &results).unwrap();
            writer.flush().unwrap();
        }

        // Read back and compare
        let expected = vec![
            CapacityRow {
                id: ResourceID::from("gas"),
                build_year: 0,
                new_capacity: Capacity(1.0),
                cumulative_capacity: Capacity(6.0),
            },
            CapacityRow {
                id: ResourceID::from("gas"),
                build_year: 1,
                new_capacity: Capacity(2.0),
                cumulative_capacity: Capacity(8.0),
            },
        ];
        let records: Vec<CapacityRow<ResourceID>> =
            csv::Reader::from_path(dir.path().join(CAPACITY_FILE_NAME))
                .unwrap()
                .into_deserialize()
                .try_collect()
                .unwrap();
        assert_eq!(records, expected);
    }

    #[rstest]
    fn test_data_writer(single_year_model: Model) {
        let dir = tempdir().unwrap();
        let solution = perform_optimisation(&single_year_model).unwrap();
        let capacity = capacity_results(&single_year_model, &solution);
        let storage = storage_results(&single_year_model, &solution);
        let generation = vec![generation_results(&single_year_model, &solution, 0)];

        {
            let mut writer = DataWriter::create(dir.path(), &single_year_model, true).unwrap();
            writer.write_capacity(&capacity).unwrap();
            writer.write_storage_capacity(&storage).unwrap();
            writer.write_generation(&generation).unwrap();
            writer.write_storage_dispatch(&storage).unwrap();
            writer
                .write_summary(&solution, &capacity, &storage, &generation)
                .unwrap();
            writer.write_debug_info(&solution).unwrap();
            writer.flush().unwrap();
        }

        let summary: Vec<SummaryRow> = csv::Reader::from_path(dir.path().join(SUMMARY_FILE_NAME))
            .unwrap()
            .into_deserialize()
            .try_collect()
            .unwrap();
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].objective_value, solution.objective_value);

        // One row per storage resource, build year and hour
        let dispatch: Vec<StorageDispatchRow> =
            csv::Reader::from_path(dir.path().join(STORAGE_DISPATCH_FILE_NAME))
                .unwrap()
                .into_deserialize()
                .try_collect()
                .unwrap();
        assert_eq!(dispatch.len(), single_year_model.num_hours());

        let duals: Vec<DemandDualsRow> =
            csv::Reader::from_path(dir.path().join(DEMAND_DUALS_FILE_NAME))
                .unwrap()
                .into_deserialize()
                .try_collect()
                .unwrap();
        assert_eq!(duals.len(), single_year_model.num_hours());
        assert!(dir.path().join("metadata.toml").is_file());
    }

    #[test]
    fn test_create_output_directory_new_directory() {
        let temp_dir = tempdir().unwrap();
        let output_dir = temp_dir.path().join("results");

        // Create a new directory should succeed and return false (no overwrite)
        let result = create_output_directory(&output_dir, false).unwrap();
        assert!(!result);
        assert!(output_dir.is_dir());
    }

    #[test]
    fn test_create_output_directory_existing_empty_directory() {
        let temp_dir = tempdir().unwrap();
        let output_dir = temp_dir.path().join("results");
        fs::create_dir(&output_dir).unwrap();

        let result = create_output_directory(&output_dir, false).unwrap();
        assert!(!result);
        assert!(output_dir.is_dir());
    }

    #[test]
    fn test_create_output_directory_existing_with_files() {
        let temp_dir = tempdir().unwrap();
        let output_dir = temp_dir.path().join("results");
        fs::create_dir(&output_dir).unwrap();
        fs::write(output_dir.join("summary.csv"), "data").unwrap();

        // Without overwrite, this is an error and the file is kept
        assert!(create_output_directory(&output_dir, false).is_err());
        assert!(output_dir.join("summary.csv").is_file());

        // With overwrite, the folder is recreated empty
        let result = create_output_directory(&output_dir, true).unwrap();
        assert!(result);
        assert!(output_dir.is_dir());
        assert!(fs::read_dir(&output_dir).unwrap().next().is_none());
    }

    #[test]
    fn test_get_output_dir() {
        let temp_dir = tempdir().unwrap();
        let model_dir = temp_dir.path().join("harbor");
        fs::create_dir(&model_dir).unwrap();

        let output_dir = get_output_dir(&model_dir, PathBuf::from("results")).unwrap();
        assert_eq!(output_dir, PathBuf::from("results").join("harbor"));
    }
}
