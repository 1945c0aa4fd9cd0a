//! Objective function coefficients for the capacity-expansion problem.
use crate::emissions::monetise;
use crate::finance::capex_in_year;
use crate::model::Model;
use crate::resource::{Resource, ResourceKind};
use crate::storage::Storage;
use crate::units::{Dimensionless, MoneyPerCapacity, MoneyPerEnergy};

/// The cost of each MWh generated by a dispatchable resource in the given year and hour.
///
/// This covers variable operating costs, monetised emissions, gas fuel and import transmission,
/// multiplied by the discount factor for the year.
pub fn generation_cost(
    model: &Model,
    resource: &Resource,
    year: u32,
    hour: usize,
    discount_factors: &[Dimensionless],
) -> MoneyPerEnergy {
    let params = &model.parameters;
    let prices = params.emission_prices();
    let mut cost = resource.variable_cost;
    match resource.kind {
        ResourceKind::Import => {
            cost += model.import_emissions.monetised(hour, &prices);
            cost += params.transmission_cost_per_mwh;
        }
        ResourceKind::Gas => {
            cost += monetise(&resource.emissions, &prices);
            cost += resource.heat_rate * params.gas_fuel_cost;
        }
        ResourceKind::Generic | ResourceKind::Hydro => {
            cost += monetise(&resource.emissions, &prices);
        }
    }

    cost * discount_factors[year as usize]
}

/// The cost of each MW of resource capacity built in the given year.
///
/// For non-dispatchable resources, this also includes the variable and emissions costs of the
/// energy which the capacity will generate, since there are no generation variables for them.
pub fn capacity_cost(
    model: &Model,
    resource: &Resource,
    year: u32,
    discount_factors: &[Dimensionless],
) -> MoneyPerCapacity {
    let discount_factor = discount_factors[year as usize];
    let mut cost = capex_in_year(resource.capex, resource.capex_decline, year)
        + resource.fixed_cost * discount_factor;

    if !resource.dispatchable {
        let prices = model.parameters.emission_prices();
        let per_mwh = resource.variable_cost + monetise(&resource.emissions, &prices);
        cost += per_mwh * model.profiles.normalised_sum(&resource.id) * discount_factor;
    }

    cost
}

/// The cost of each MW of storage capacity built in the given year.
///
/// Resilient storage receives an incentive which can reduce its capital cost to zero. Storage which
/// replaces diesel gensets is credited with the genset's avoided emissions, fuel and fixed costs.
pub fn storage_capacity_cost(
    model: &Model,
    storage: &Storage,
    year: u32,
    discount_factors: &[Dimensionless],
) -> MoneyPerCapacity {
    let params = &model.parameters;
    let discount_factor = discount_factors[year as usize];
    let mut capex = capex_in_year(storage.capex, storage.capex_decline, year);
    let mut fixed = storage.fixed_cost * discount_factor;

    if storage.resilient {
        let incentive = params.resilience_incentive() * storage.duration;
        capex = (capex - incentive).max(MoneyPerCapacity(0.0));
    }

    if storage.replaces_diesel_genset {
        let emissions: MoneyPerCapacity =
            monetise(&params.diesel_genset_emissions(), &params.emission_prices());
        let fuel = params.diesel_genset_mmbtu_per_mwh
            * params.diesel_genset_cost_per_mmbtu
            * params.diesel_genset_hours_per_year;
        capex -= (emissions + fuel) * discount_factor;
        fixed -= params.diesel_genset_fixed_cost_per_mw_year * discount_factor;
    }

    capex + fixed
}

/// The cost of each MWh charged by a storage resource in the given hour.
///
/// Grid emissions are only charged for if storage is charged from the wider grid.
pub fn charge_cost(model: &Model, storage: &Storage, hour: usize) -> MoneyPerEnergy {
    let params = &model.parameters;
    if params.storage_charges_from_portfolio {
        storage.variable_cost
    } else {
        storage.variable_cost
            + model
                .grid_emissions
                .monetised(hour, &params.emission_prices())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emissions::{EmissionRates, HourlyEmissions};
    use crate::fixture::model;
    use crate::resource::ResourceID;
    use crate::storage::StorageID;
    use crate::units::{EnergyPerCapacity, HeatRate, MassPerEnergy, MoneyPerHeat};
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    fn resource(model: &Model, id: &str) -> Resource {
        (*model.resources[&ResourceID::from(id)]).clone()
    }

    fn storage(model: &Model, id: &str) -> Storage {
        (*model.storage[&StorageID::from(id)]).clone()
    }

    #[rstest]
    fn test_generation_cost_gas(mut model: Model) {
        model.parameters.gas_fuel_cost = MoneyPerHeat(8.0);
        model.parameters.carbon_cost_per_ton = crate::units::MoneyPerMass(50.0);
        let mut gas = resource(&model, "gas");
        gas.kind = ResourceKind::Gas;
        gas.variable_cost = MoneyPerEnergy(3.0);
        gas.heat_rate = HeatRate(7.0);
        gas.emissions = EmissionRates {
            co2: MassPerEnergy(0.4),
            ..EmissionRates::default()
        };

        // (3 + 0.4 * 50 + 7 * 8) * 2
        let cost = generation_cost(&model, &gas, 0, 0, &[Dimensionless(2.0)]);
        assert_approx_eq!(MoneyPerEnergy, cost, MoneyPerEnergy(158.0));
    }

    #[rstest]
    fn test_generation_cost_import(mut model: Model) {
        let num_hours = model.num_hours();
        model.import_emissions = HourlyEmissions::zero(num_hours);
        model.import_emissions.0[1].co2 = MassPerEnergy(0.5);
        model.parameters.carbon_cost_per_ton = crate::units::MoneyPerMass(50.0);
        model.parameters.transmission_cost_per_mwh = MoneyPerEnergy(2.0);
        let mut import = resource(&model, "gas");
        import.kind = ResourceKind::Import;
        import.variable_cost = MoneyPerEnergy(1.0);

        // Static emission rates are ignored for imports
        import.emissions.co2 = MassPerEnergy(100.0);

        let cost = generation_cost(&model, &import, 0, 0, &[Dimensionless(1.0)]);
        assert_approx_eq!(MoneyPerEnergy, cost, MoneyPerEnergy(3.0));
        let cost = generation_cost(&model, &import, 0, 1, &[Dimensionless(1.0)]);
        assert_approx_eq!(MoneyPerEnergy, cost, MoneyPerEnergy(28.0));
    }

    #[rstest]
    fn test_capacity_cost_dispatchable(model: Model) {
        let mut gas = resource(&model, "gas");
        gas.capex = MoneyPerCapacity(1000.0);
        gas.capex_decline = Dimensionless(0.1);
        gas.fixed_cost = MoneyPerCapacity(10.0);

        let factors = [Dimensionless(3.0), Dimensionless(2.0)];
        let cost = capacity_cost(&model, &gas, 0, &factors);
        assert_approx_eq!(MoneyPerCapacity, cost, MoneyPerCapacity(1030.0));
        let cost = capacity_cost(&model, &gas, 1, &factors);
        assert_approx_eq!(MoneyPerCapacity, cost, MoneyPerCapacity(920.0));
    }

    #[rstest]
    fn test_capacity_cost_nondispatchable(model: Model) {
        let mut solar = resource(&model, "solar");
        solar.capex = MoneyPerCapacity(100.0);
        solar.fixed_cost = MoneyPerCapacity(0.0);
        solar.variable_cost = MoneyPerEnergy(2.0);
        let normalised_sum = model.profiles.normalised_sum(&solar.id);

        let cost = capacity_cost(&model, &solar, 0, &[Dimensionless(1.0)]);
        let expected = MoneyPerCapacity(100.0) + MoneyPerEnergy(2.0) * normalised_sum;
        assert_approx_eq!(MoneyPerCapacity, cost, expected);
        assert!(normalised_sum > EnergyPerCapacity(0.0));
    }

    #[rstest]
    fn test_storage_capacity_cost_resilient(mut model: Model) {
        model.parameters.storage_resilience_incentive_per_kwh = 0.1;
        let mut battery = storage(&model, "battery");
        battery.capex = MoneyPerCapacity(1000.0);
        battery.fixed_cost = MoneyPerCapacity(10.0);
        battery.duration = EnergyPerCapacity(4.0);
        battery.resilient = true;

        // Incentive of 100 $/MWh over 4 hours
        let cost = storage_capacity_cost(&model, &battery, 0, &[Dimensionless(1.0)]);
        assert_approx_eq!(MoneyPerCapacity, cost, MoneyPerCapacity(610.0));

        // Capex is clamped at zero, but fixed costs remain
        model.parameters.storage_resilience_incentive_per_kwh = 1000.0;
        let cost = storage_capacity_cost(&model, &battery, 0, &[Dimensionless(1.0)]);
        assert_approx_eq!(MoneyPerCapacity, cost, MoneyPerCapacity(10.0));
    }

    #[rstest]
    fn test_storage_capacity_cost_diesel(model: Model) {
        let mut battery = storage(&model, "battery");
        battery.capex = MoneyPerCapacity(10_000_000.0);
        battery.fixed_cost = MoneyPerCapacity(50_000.0);
        battery.replaces_diesel_genset = true;

        // Default genset: emissions 360100 and fuel 4 * 20 * 24 = 1920 per MW-year, fixed 35000
        let cost = storage_capacity_cost(&model, &battery, 0, &[Dimensionless(2.0)]);
        let expected = 10_000_000.0 - (360_100.0 + 1920.0) * 2.0 + (50_000.0 - 35_000.0) * 2.0;
        assert_approx_eq!(
            MoneyPerCapacity,
            cost,
            MoneyPerCapacity(expected),
            epsilon = 1e-6
        );
    }

    #[rstest]
    fn test_charge_cost(mut model: Model) {
        let num_hours = model.num_hours();
        model.grid_emissions = HourlyEmissions::zero(num_hours);
        model.grid_emissions.0[0].co2 = MassPerEnergy(0.5);
        model.parameters.carbon_cost_per_ton = crate::units::MoneyPerMass(50.0);
        let mut battery = storage(&model, "battery");
        battery.variable_cost = MoneyPerEnergy(1.0);

        assert_approx_eq!(
            MoneyPerEnergy,
            charge_cost(&model, &battery, 0),
            MoneyPerEnergy(26.0)
        );

        model.parameters.storage_charges_from_portfolio = true;
        assert_approx_eq!(
            MoneyPerEnergy,
            charge_cost(&model, &battery, 0),
            MoneyPerEnergy(1.0)
        );
    }
}
