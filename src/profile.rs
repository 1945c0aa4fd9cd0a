//! Hourly demand and output profiles for the simulated year.
use crate::resource::ResourceID;
use crate::units::{Capacity, Dimensionless, EnergyPerCapacity};
use anyhow::{Result, ensure};
use indexmap::IndexMap;

/// Hourly demand together with the normalised output profile of each non-dispatchable resource.
///
/// Every series covers the same number of hours.
#[derive(PartialEq, Debug, Clone)]
pub struct HourlyProfiles {
    demand: Vec<Capacity>,
    normalised: IndexMap<ResourceID, Vec<Dimensionless>>,
}

impl HourlyProfiles {
    /// Create a new set of profiles.
    ///
    /// Each output profile is scaled so that its maximum is one.
    ///
    /// # Arguments
    ///
    /// * `demand` - Demand for each hour
    /// * `outputs` - Raw hourly output for each non-dispatchable resource
    pub fn new(demand: Vec<Capacity>, outputs: IndexMap<ResourceID, Vec<f64>>) -> Result<Self> {
        ensure!(!demand.is_empty(), "Demand profile must cover at least one hour");
        for (hour, value) in demand.iter().enumerate() {
            ensure!(
                value.is_finite() && *value >= Capacity(0.0),
                "Invalid demand for hour {hour}: {value}"
            );
        }

        let mut normalised = IndexMap::new();
        for (id, values) in outputs {
            ensure!(
                values.len() == demand.len(),
                "Output profile for {id} covers {} hours but demand covers {}",
                values.len(),
                demand.len()
            );
            ensure!(
                values.iter().all(|value| value.is_finite() && *value >= 0.0),
                "Output profile for {id} contains negative or non-finite values"
            );

            let max = values.iter().copied().fold(0.0, f64::max);
            ensure!(
                max > 0.0,
                "Output profile for {id} must contain at least one positive value"
            );

            let scaled = values.iter().map(|value| Dimensionless(value / max)).collect();
            normalised.insert(id, scaled);
        }

        Ok(Self { demand, normalised })
    }

    /// The number of hours covered by the profiles
    pub fn num_hours(&self) -> usize {
        self.demand.len()
    }

    /// Demand in the given hour
    pub fn demand(&self, hour: usize) -> Capacity {
        self.demand[hour]
    }

    /// Whether there is an output profile for the given resource
    pub fn contains(&self, resource_id: &ResourceID) -> bool {
        self.normalised.contains_key(resource_id)
    }

    /// Output in the given hour for each MW of capacity.
    ///
    /// # Panics
    ///
    /// If there is no profile for `resource_id`.
    pub fn normalised(&self, resource_id: &ResourceID, hour: usize) -> Dimensionless {
        self.series(resource_id)[hour]
    }

    /// Annual output for each MW of capacity
    pub fn normalised_sum(&self, resource_id: &ResourceID) -> EnergyPerCapacity {
        EnergyPerCapacity(self.series(resource_id).iter().map(|x| x.value()).sum())
    }

    fn series(&self, resource_id: &ResourceID) -> &[Dimensionless] {
        self.normalised
            .get(resource_id)
            .unwrap_or_else(|| panic!("No output profile for resource {resource_id}"))
    }
}
