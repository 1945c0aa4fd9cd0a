//! Integration tests which load and optimise the bundled example model.
use float_cmp::approx_eq;
use harboropt::input::load_model;
use harboropt::model::Model;
use harboropt::simulation::optimisation::perform_optimisation;
use harboropt::simulation::results::{capacity_results, generation_results, storage_results};
use harboropt::resource::ResourceID;
use harboropt::storage::StorageID;
use harboropt::units::Energy;
use std::path::{Path, PathBuf};

/// Get the path to the bundled example model.
fn get_model_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("demos").join("harbor")
}

fn load() -> Model {
    unsafe { std::env::set_var("HARBOROPT_LOG_LEVEL", "off") };
    load_model(get_model_dir()).unwrap()
}

/// An integration test which attempts to load the example model
#[test]
fn test_load_model() {
    let model = load();
    assert_eq!(model.num_hours(), 24);
    assert_eq!(model.parameters.build_years, 2);
    assert_eq!(model.resources.len(), 5);
    assert_eq!(model.storage.len(), 3);
}

/// Optimise the example model and check that the results are consistent
#[test]
fn test_optimise_model() {
    let model = load();
    let solution = perform_optimisation(&model).unwrap();
    let final_year = model.parameters.final_build_year();

    // Installed capacity fractions sum to one
    let capacity = capacity_results(&model, &solution);
    let total_fraction: f64 = capacity.values().map(|result| result.fraction.value()).sum();
    assert!(approx_eq!(f64, total_fraction, 1.0, epsilon = 1e-6));

    // Generation and storage discharge cover demand in every hour of the final build year
    let storage = storage_results(&model, &solution);
    let generation = generation_results(&model, &solution, final_year);
    assert!(generation.total > Energy(0.0));
    for hour in 0..model.num_hours() {
        let dispatchable: f64 = model
            .iter_dispatchable()
            .map(|resource| solution.generation(&resource.id, final_year, hour).value())
            .sum();
        let nondispatchable: f64 = model
            .iter_nondispatchable()
            .map(|resource| {
                model.profiles.normalised(&resource.id, hour).value()
                    * capacity[&resource.id].cumulative(final_year).value()
            })
            .sum();
        let net_storage: f64 = storage
            .values()
            .map(|result| {
                let idx = final_year as usize * model.num_hours() + hour;
                result.hourly[idx].discharge.value()
            })
            .sum();
        let supply = dispatchable + nondispatchable + net_storage;
        assert!(supply + 1e-6 >= model.profiles.demand(hour).value());
    }

    // Replacing diesel gensets is credited, so it is built up to its limit
    let diesel = &storage[&StorageID::from("diesel_replacement_battery")];
    assert!(approx_eq!(
        f64,
        diesel.capacity.total().value(),
        20.0,
        epsilon = 1e-6
    ));

    // Hydro output is limited in every hour
    let hydro = ResourceID::from("hydropower");
    for hour in 0..model.num_hours() {
        let generation = solution.generation(&hydro, final_year, hour);
        assert!(generation.value() <= model.parameters.hydro_power_limit.value() + 1e-6);
    }
}
