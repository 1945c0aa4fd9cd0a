//! Fixtures for tests
use crate::emissions::{EmissionRates, HourlyEmissions};
use crate::model::{Model, ModelParameters};
use crate::profile::HourlyProfiles;
use crate::resource::{Resource, ResourceKind, ResourceMap};
use crate::storage::{Storage, StorageMap};
use crate::units::{
    Capacity, Dimensionless, Energy, EnergyPerCapacity, HeatRate, MoneyPerCapacity,
    MoneyPerEnergy,
};
use indexmap::indexmap;
use rstest::fixture;
use std::path::PathBuf;
use std::rc::Rc;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

/// A resource with no costs other than those given
fn resource(id: &str, dispatchable: bool, capex: f64, variable_cost: f64) -> Resource {
    Resource {
        id: id.into(),
        description: String::new(),
        kind: ResourceKind::Generic,
        dispatchable,
        existing_capacity: Capacity(0.0),
        max_capacity: None,
        capex: MoneyPerCapacity(capex),
        capex_decline: Dimensionless(0.0),
        fixed_cost: MoneyPerCapacity(0.0),
        variable_cost: MoneyPerEnergy(variable_cost),
        heat_rate: HeatRate(0.0),
        emissions: EmissionRates::default(),
    }
}

/// A cheap dispatchable resource and a prohibitively expensive solar resource
#[fixture]
pub fn resources() -> ResourceMap {
    [resource("gas", true, 100.0, 1.0), resource("solar", false, 1e6, 0.0)]
        .into_iter()
        .map(|resource| (resource.id.clone(), Rc::new(resource)))
        .collect()
}

#[fixture]
pub fn storage() -> Storage {
    Storage {
        id: "battery".into(),
        description: String::new(),
        existing_capacity: Capacity(0.0),
        max_capacity: None,
        resilient: false,
        replaces_diesel_genset: false,
        capex: MoneyPerCapacity(1000.0),
        capex_decline: Dimensionless(0.0),
        fixed_cost: MoneyPerCapacity(0.0),
        variable_cost: MoneyPerEnergy(0.0),
        efficiency: Dimensionless(1.0),
        duration: EnergyPerCapacity(1.0),
    }
}

#[fixture]
pub fn storage_map(storage: Storage) -> StorageMap {
    indexmap! { storage.id.clone() => Rc::new(storage) }
}

/// Two hours of demand, with solar only generating in the second
#[fixture]
pub fn profiles() -> HourlyProfiles {
    HourlyProfiles::new(
        vec![Capacity(10.0), Capacity(20.0)],
        indexmap! { "solar".into() => vec![0.0, 1.0] },
    )
    .unwrap()
}

/// A model with a single build year whose costs are undiscounted
#[fixture]
pub fn single_year_model(
    resources: ResourceMap,
    storage_map: StorageMap,
    profiles: HourlyProfiles,
) -> Model {
    let parameters = ModelParameters {
        build_years: 1,
        timespan: 1,
        discount_rate: Dimensionless(0.0),
        cost: Dimensionless(1.0),
        initial_state_of_charge: Energy(0.0),
        storage_charges_from_portfolio: false,
        ..ModelParameters::default()
    };
    let num_hours = profiles.num_hours();

    Model {
        model_path: PathBuf::from("model"),
        parameters,
        resources,
        storage: storage_map,
        profiles,
        grid_emissions: HourlyEmissions::zero(num_hours),
        import_emissions: HourlyEmissions::zero(num_hours),
    }
}

/// A model with two build years and default financial parameters
#[fixture]
pub fn model(single_year_model: Model) -> Model {
    let mut model = single_year_model;
    let defaults = ModelParameters::default();
    model.parameters = ModelParameters {
        build_years: 2,
        initial_state_of_charge: Energy(0.0),
        ..defaults
    };

    model
}
