//! Summaries of installed capacity, generation and storage operation derived from a solution.
use super::optimisation::Solution;
use crate::model::Model;
use crate::resource::ResourceID;
use crate::storage::StorageID;
use crate::units::{Capacity, Dimensionless, Energy};
use indexmap::IndexMap;

/// Installed capacity for a resource
#[derive(Debug, Clone, PartialEq)]
pub struct CapacityResult {
    /// Capacity installed before the first build year
    pub existing: Capacity,
    /// New capacity built in each build year
    pub new_by_year: Vec<Capacity>,
    /// Fraction of the total installed capacity across all resources
    pub fraction: Dimensionless,
}

impl CapacityResult {
    /// Capacity available in the given build year
    pub fn cumulative(&self, year: u32) -> Capacity {
        self.existing + self.new_by_year[..=year as usize].iter().copied().sum::<Capacity>()
    }

    /// Capacity available by the end of the final build year
    pub fn total(&self) -> Capacity {
        self.existing + self.new_by_year.iter().copied().sum::<Capacity>()
    }
}

/// Generation by each resource in a single build year
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResults {
    /// The build year
    pub year: u32,
    /// Annual generation for each resource
    pub by_resource: IndexMap<ResourceID, Energy>,
    /// Total annual generation
    pub total: Energy,
}

impl GenerationResults {
    /// The given resource's fraction of total generation (zero if nothing is generated)
    pub fn fraction(&self, resource_id: &ResourceID) -> Dimensionless {
        let generation = self.by_resource[resource_id];
        if self.total > Energy(0.0) {
            generation / self.total
        } else {
            Dimensionless(0.0)
        }
    }
}

/// Operation of a storage resource in a single hour
#[derive(Debug, Clone, PartialEq)]
pub struct StorageHour {
    /// The build year
    pub year: u32,
    /// The hour within the year
    pub hour: usize,
    /// Energy charged
    pub charge: Energy,
    /// Energy discharged, after efficiency losses
    pub discharge: Energy,
    /// Net energy supplied (discharge minus charge)
    pub net_source: Energy,
    /// State of charge at the end of the hour
    pub state_of_charge: Energy,
}

/// Installed capacity and hourly operation for a storage resource
#[derive(Debug, Clone, PartialEq)]
pub struct StorageResult {
    /// Installed capacity
    pub capacity: CapacityResult,
    /// Operation in each build year and hour
    pub hourly: Vec<StorageHour>,
}

/// Fill in the capacity fraction for each result, leaving zeros if the total is zero
fn set_capacity_fractions<K>(results: &mut IndexMap<K, CapacityResult>) {
    let total: Capacity = results.values().map(CapacityResult::total).sum();
    if total <= Capacity(0.0) {
        return;
    }

    for result in results.values_mut() {
        result.fraction = result.total() / total;
    }
}

/// Calculate the installed capacity of each generation resource.
///
/// Fractions are relative to the total installed generation capacity. If this total is zero, all
/// fractions are zero.
pub fn capacity_results(model: &Model, solution: &Solution) -> IndexMap<ResourceID, CapacityResult> {
    let mut results: IndexMap<_, _> = model
        .resources
        .values()
        .map(|resource| {
            let result = CapacityResult {
                existing: resource.existing_capacity,
                new_by_year: model
                    .iter_build_years()
                    .map(|year| solution.capacity(&resource.id, year))
                    .collect(),
                fraction: Dimensionless(0.0),
            };
            (resource.id.clone(), result)
        })
        .collect();
    set_capacity_fractions(&mut results);

    results
}

/// Calculate annual generation by each resource in the given build year.
///
/// Dispatchable generation is the sum of hourly generation. Non-dispatchable generation is the
/// annual output per MW of its profile multiplied by the capacity available in that year.
pub fn generation_results(model: &Model, solution: &Solution, year: u32) -> GenerationResults {
    let capacity = capacity_results(model, solution);
    let by_resource: IndexMap<_, _> = model
        .resources
        .values()
        .map(|resource| {
            let generation = if resource.dispatchable {
                (0..model.num_hours())
                    .map(|hour| solution.generation(&resource.id, year, hour))
                    .sum::<Energy>()
            } else {
                model.profiles.normalised_sum(&resource.id) * capacity[&resource.id].cumulative(year)
            };
            (resource.id.clone(), generation)
        })
        .collect();
    let total: Energy = by_resource.values().copied().sum();

    GenerationResults {
        year,
        by_resource,
        total,
    }
}

/// Calculate installed capacity and hourly operation of each storage resource.
///
/// Capacity fractions are relative to total installed storage capacity.
pub fn storage_results(model: &Model, solution: &Solution) -> IndexMap<StorageID, StorageResult> {
    let mut capacity: IndexMap<_, _> = model
        .storage
        .values()
        .map(|storage| {
            let result = CapacityResult {
                existing: storage.existing_capacity,
                new_by_year: model
                    .iter_build_years()
                    .map(|year| solution.storage_capacity(&storage.id, year))
                    .collect(),
                fraction: Dimensionless(0.0),
            };
            (storage.id.clone(), result)
        })
        .collect();
    set_capacity_fractions(&mut capacity);

    capacity
        .into_iter()
        .map(|(id, capacity)| {
            let efficiency = model.storage[&id].efficiency;
            let hourly = model
                .iter_build_years()
                .flat_map(|year| (0..model.num_hours()).map(move |hour| (year, hour)))
                .map(|(year, hour)| {
                    let charge = solution.charge(&id, year, hour);
                    let discharge = solution.discharge(&id, year, hour) * efficiency;
                    StorageHour {
                        year,
                        hour,
                        charge,
                        discharge,
                        net_source: discharge - charge,
                        state_of_charge: solution.state_of_charge(&id, year, hour),
                    }
                })
                .collect();
            (id, StorageResult { capacity, hourly })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::single_year_model;
    use crate::simulation::optimisation::perform_optimisation;
    use crate::units::MoneyPerCapacity;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;
    use std::rc::Rc;

    #[test]
    fn test_capacity_result() {
        let result = CapacityResult {
            existing: Capacity(5.0),
            new_by_year: vec![Capacity(1.0), Capacity(2.0)],
            fraction: Dimensionless(0.0),
        };
        assert_eq!(result.cumulative(0), Capacity(6.0));
        assert_eq!(result.cumulative(1), Capacity(8.0));
        assert_eq!(result.total(), Capacity(8.0));
    }

    #[test]
    fn test_capacity_fractions_zero_total() {
        let mut results: IndexMap<ResourceID, _> = [(
            "a".into(),
            CapacityResult {
                existing: Capacity(0.0),
                new_by_year: vec![Capacity(0.0)],
                fraction: Dimensionless(0.0),
            },
        )]
        .into_iter()
        .collect();
        set_capacity_fractions(&mut results);
        assert_eq!(results[0].fraction, Dimensionless(0.0));
    }

    #[test]
    fn test_generation_fraction_zero_total() {
        let results = GenerationResults {
            year: 0,
            by_resource: [("a".into(), Energy(0.0))].into_iter().collect(),
            total: Energy(0.0),
        };
        assert_eq!(results.fraction(&"a".into()), Dimensionless(0.0));
    }

    #[rstest]
    fn test_results_with_solar(mut single_year_model: Model) {
        let solar_id = ResourceID::from("solar");
        let mut solar = (*single_year_model.resources[&solar_id]).clone();
        solar.capex = MoneyPerCapacity(50.0);
        single_year_model.resources.insert(solar_id.clone(), Rc::new(solar));
        single_year_model.storage.clear();

        let solution = perform_optimisation(&single_year_model).unwrap();
        let capacity = capacity_results(&single_year_model, &solution);
        assert_approx_eq!(
            Capacity,
            capacity[&solar_id].total(),
            Capacity(10.0),
            epsilon = 1e-6
        );
        assert_approx_eq!(
            Dimensionless,
            capacity[&solar_id].fraction,
            Dimensionless(0.5),
            epsilon = 1e-6
        );

        // Gas covers the first hour and tops up solar in the second
        let generation = generation_results(&single_year_model, &solution, 0);
        assert_approx_eq!(
            Energy,
            generation.by_resource[&ResourceID::from("gas")],
            Energy(20.0),
            epsilon = 1e-6
        );
        assert_approx_eq!(
            Energy,
            generation.by_resource[&solar_id],
            Energy(10.0),
            epsilon = 1e-6
        );
        assert_approx_eq!(Energy, generation.total, Energy(30.0), epsilon = 1e-6);
        assert_approx_eq!(
            Dimensionless,
            generation.fraction(&solar_id),
            Dimensionless(1.0 / 3.0),
            epsilon = 1e-6
        );

        assert!(storage_results(&single_year_model, &solution).is_empty());
    }

    #[rstest]
    fn test_storage_results(single_year_model: Model) {
        let solution = perform_optimisation(&single_year_model).unwrap();
        let results = storage_results(&single_year_model, &solution);
        let battery = &results[&StorageID::from("battery")];
        assert_eq!(battery.hourly.len(), single_year_model.num_hours());
        for hour in &battery.hourly {
            assert_approx_eq!(
                Energy,
                hour.net_source,
                hour.discharge - hour.charge,
                epsilon = 1e-9
            );
        }
    }
}
