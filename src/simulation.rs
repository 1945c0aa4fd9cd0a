//! Functionality for running the capacity-expansion optimisation and reporting its results.
use crate::model::Model;
use crate::output::DataWriter;
use anyhow::Result;
use log::info;
use std::path::Path;

pub mod optimisation;
use optimisation::perform_optimisation;
pub mod results;
use results::{capacity_results, generation_results, storage_results};

/// Run the optimisation and write the results.
///
/// # Arguments:
///
/// * `model` - The model to run
/// * `output_path` - The folder to which output files will be written
/// * `debug_model` - Whether to write additional information (e.g. duals) to output files
pub fn run(model: &Model, output_path: &Path, debug_model: bool) -> Result<()> {
    let mut writer = DataWriter::create(output_path, model, debug_model)?;

    info!(
        "Optimising {} build years of {} hours",
        model.parameters.build_years,
        model.num_hours()
    );
    let solution = perform_optimisation(model)?;

    let capacity = capacity_results(model, &solution);
    let storage = storage_results(model, &solution);
    let generation: Vec<_> = model
        .iter_build_years()
        .map(|year| generation_results(model, &solution, year))
        .collect();

    for (resource_id, result) in &capacity {
        info!(
            "{resource_id}: {} MW installed ({:.1}% of capacity)",
            result.total(),
            result.fraction.value() * 100.0
        );
    }

    writer.write_capacity(&capacity)?;
    writer.write_storage_capacity(&storage)?;
    writer.write_generation(&generation)?;
    writer.write_storage_dispatch(&storage)?;
    writer.write_summary(&solution, &capacity, &storage, &generation)?;
    writer.write_debug_info(&solution)?;

    // Flush output data
    writer.flush()?;

    Ok(())
}
