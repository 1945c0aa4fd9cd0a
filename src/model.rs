//! The model represents the static input data provided by the user.
use crate::emissions::HourlyEmissions;
use crate::finance::discount_factors;
use crate::profile::HourlyProfiles;
use crate::resource::{Resource, ResourceMap};
use crate::storage::StorageMap;
use crate::units::Dimensionless;
use std::path::PathBuf;

pub mod parameters;
pub use parameters::ModelParameters;

/// Model definition
pub struct Model {
    /// Path to model folder
    pub model_path: PathBuf,
    /// Parameters from the model TOML file
    pub parameters: ModelParameters,
    /// Generation resources
    pub resources: ResourceMap,
    /// Storage resources
    pub storage: StorageMap,
    /// Hourly demand and non-dispatchable output
    pub profiles: HourlyProfiles,
    /// Emission rates for electricity drawn from the grid
    pub grid_emissions: HourlyEmissions,
    /// Emission rates for imported electricity
    pub import_emissions: HourlyEmissions,
}

impl Model {
    /// The number of simulated hours in each build year
    pub fn num_hours(&self) -> usize {
        self.profiles.num_hours()
    }

    /// Iterate over the build years
    pub fn iter_build_years(&self) -> std::ops::Range<u32> {
        0..self.parameters.build_years
    }

    /// Iterate over the dispatchable resources
    pub fn iter_dispatchable(&self) -> impl Iterator<Item = &Resource> {
        self.resources
            .values()
            .filter(|resource| resource.dispatchable)
            .map(AsRef::as_ref)
    }

    /// Iterate over the non-dispatchable resources
    pub fn iter_nondispatchable(&self) -> impl Iterator<Item = &Resource> {
        self.resources
            .values()
            .filter(|resource| !resource.dispatchable)
            .map(AsRef::as_ref)
    }

    /// The discount factor for each build year
    pub fn discount_factors(&self) -> Vec<Dimensionless> {
        let params = &self.parameters;
        discount_factors(
            params.cost,
            params.discount_rate,
            params.timespan,
            params.build_years,
        )
    }
}
