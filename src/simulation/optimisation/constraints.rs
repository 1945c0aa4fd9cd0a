//! Code for adding constraints to the capacity-expansion optimisation problem.
use super::VariableMap;
use crate::model::Model;
use crate::resource::{Resource, ResourceKind};
use crate::storage::Storage;
use crate::units::UnitType;
use highs::RowProblem as Problem;
use itertools::iproduct;

/// Corresponding variables for a constraint along with the row offset in the solution
#[derive(Debug)]
pub struct KeysWithOffset<T> {
    offset: usize,
    keys: Vec<T>,
}

impl<T> KeysWithOffset<T> {
    /// Zip the keys with the corresponding dual values in the solution, accounting for the offset
    pub fn zip_duals<'a, U>(&'a self, duals: &'a [f64]) -> impl Iterator<Item = (&'a T, U)>
    where
        U: UnitType,
    {
        assert!(
            self.offset + self.keys.len() <= duals.len(),
            "Bad constraint keys: dual rows out of range"
        );

        self.keys
            .iter()
            .zip(duals[self.offset..].iter().copied().map(U::new))
    }
}

/// Indicates the build year and hour covered by each demand balance constraint
pub type DemandBalanceKeys = KeysWithOffset<(u32, usize)>;

/// The keys for different constraints
#[derive(Debug)]
pub struct ConstraintKeys {
    /// Keys for demand balance constraints
    pub demand_balance_keys: DemandBalanceKeys,
}

/// Add constraints for the capacity-expansion model.
///
/// Note: the ordering of constraints is important, as the dual values of the demand balance
/// constraints are retrieved later by row offset.
///
/// # Arguments
///
/// * `problem` - The optimisation problem
/// * `variables` - The variables in the problem
/// * `model` - The model
///
/// # Returns
///
/// Keys for the constraints whose dual values are reported.
pub fn add_model_constraints(
    problem: &mut Problem,
    variables: &VariableMap,
    model: &Model,
) -> ConstraintKeys {
    let demand_balance_keys = add_demand_balance_constraints(problem, variables, model);
    add_hydro_constraints(problem, variables, model);
    add_dispatchable_capacity_constraints(problem, variables, model);
    add_capacity_limit_constraints(problem, variables, model);
    for storage in model.storage.values() {
        add_storage_constraints(problem, variables, model, storage);
    }

    ConstraintKeys {
        demand_balance_keys,
    }
}

/// Add demand balance constraints.
///
/// In every year and hour, supply from dispatchable generation, storage discharge and
/// non-dispatchable capacity must meet demand. Demand only applies in the final build year;
/// earlier build years only need to balance the storage which is charged from the portfolio.
/// Output from existing non-dispatchable capacity is subtracted from the right-hand side.
fn add_demand_balance_constraints(
    problem: &mut Problem,
    variables: &VariableMap,
    model: &Model,
) -> DemandBalanceKeys {
    // Row offset in problem. This line **must** come before we add more constraints.
    let offset = problem.num_rows();

    let params = &model.parameters;
    let mut keys = Vec::new();
    let mut terms = Vec::new();
    for (year, hour) in iproduct!(model.iter_build_years(), 0..model.num_hours()) {
        for resource in model.iter_dispatchable() {
            terms.push((variables.generation_var(&resource.id, year, hour), 1.0));
        }

        for storage in model.storage.values() {
            terms.push((
                variables.discharge_var(&storage.id, year, hour),
                storage.efficiency.value(),
            ));
            if params.storage_charges_from_portfolio {
                terms.push((variables.charge_var(&storage.id, year, hour), -1.0));
            }
        }

        let mut existing_output = 0.0;
        for resource in model.iter_nondispatchable() {
            let scale = model.profiles.normalised(&resource.id, hour);
            for vintage in 0..=year {
                terms.push((variables.capacity_var(&resource.id, vintage), scale.value()));
            }
            existing_output += (resource.existing_capacity * scale).value();
        }

        let demand = if year == params.final_build_year() {
            model.profiles.demand(hour).value()
        } else {
            0.0
        };
        problem.add_row(demand - existing_output.., terms.drain(..));
        keys.push((year, hour));
    }

    DemandBalanceKeys { offset, keys }
}

/// Add the hourly power and annual energy limits shared by all hydro resources
fn add_hydro_constraints(problem: &mut Problem, variables: &VariableMap, model: &Model) {
    let hydro: Vec<&Resource> = model
        .iter_dispatchable()
        .filter(|resource| resource.kind == ResourceKind::Hydro)
        .collect();
    if hydro.is_empty() {
        return;
    }

    let params = &model.parameters;
    for year in model.iter_build_years() {
        for hour in 0..model.num_hours() {
            let terms = hydro
                .iter()
                .map(|resource| (variables.generation_var(&resource.id, year, hour), 1.0));
            problem.add_row(..=params.hydro_power_limit.value(), terms);
        }

        let terms = iproduct!(hydro.iter(), 0..model.num_hours())
            .map(|(resource, hour)| (variables.generation_var(&resource.id, year, hour), 1.0));
        problem.add_row(..=params.hydro_energy_limit.value(), terms);
    }
}

/// Limit the output of dispatchable resources to their installed capacity.
///
/// Capacity built in a given year is available in that year and all later ones.
fn add_dispatchable_capacity_constraints(
    problem: &mut Problem,
    variables: &VariableMap,
    model: &Model,
) {
    let mut terms = Vec::new();
    for resource in model.iter_dispatchable() {
        for (year, hour) in iproduct!(model.iter_build_years(), 0..model.num_hours()) {
            for vintage in 0..=year {
                terms.push((variables.capacity_var(&resource.id, vintage), 1.0));
            }
            terms.push((variables.generation_var(&resource.id, year, hour), -1.0));

            // existing + new - gen >= 0
            problem.add_row(-resource.existing_capacity.value().., terms.drain(..));
        }
    }
}

/// Limit total installed capacity for resources which have a maximum
fn add_capacity_limit_constraints(problem: &mut Problem, variables: &VariableMap, model: &Model) {
    for resource in model.resources.values() {
        if let Some(max_capacity) = resource.max_capacity {
            let terms = model
                .iter_build_years()
                .map(|vintage| (variables.capacity_var(&resource.id, vintage), 1.0));
            let headroom = max_capacity - resource.existing_capacity;
            problem.add_row(..=headroom.value(), terms);
        }
    }

    for storage in model.storage.values() {
        if let Some(max_capacity) = storage.max_capacity {
            let terms = model
                .iter_build_years()
                .map(|vintage| (variables.storage_capacity_var(&storage.id, vintage), 1.0));
            let headroom = max_capacity - storage.existing_capacity;
            problem.add_row(..=headroom.value(), terms);
        }
    }
}

/// Add power, energy and state-of-charge constraints for a storage resource.
///
/// Only the grid fraction of resilient storage can be used for charging and discharging.
fn add_storage_constraints(
    problem: &mut Problem,
    variables: &VariableMap,
    model: &Model,
    storage: &Storage,
) {
    let params = &model.parameters;
    let fraction = storage
        .grid_fraction(params.resilient_storage_grid_fraction)
        .value();
    let duration = storage.duration.value();
    let existing = storage.existing_capacity.value();
    let initial = params.initial_state_of_charge.value();
    let last_hour = model.num_hours() - 1;

    let mut terms = Vec::new();
    for (year, hour) in iproduct!(model.iter_build_years(), 0..model.num_hours()) {
        let charge = variables.charge_var(&storage.id, year, hour);
        let discharge = variables.discharge_var(&storage.id, year, hour);
        let soc = variables.state_of_charge_var(&storage.id, year, hour);
        let new_capacity: Vec<_> = (0..=year)
            .map(|vintage| variables.storage_capacity_var(&storage.id, vintage))
            .collect();

        // Power: f * (existing + new) - charge >= 0, and likewise for discharge
        for var in [charge, discharge] {
            terms.extend(new_capacity.iter().map(|&capacity| (capacity, fraction)));
            terms.push((var, -1.0));
            problem.add_row(-fraction * existing.., terms.drain(..));
        }

        // Energy: f * duration * (existing + new) - soc >= 0
        terms.extend(
            new_capacity
                .iter()
                .map(|&capacity| (capacity, fraction * duration)),
        );
        terms.push((soc, -1.0));
        problem.add_row(-fraction * duration * existing.., terms.drain(..));

        // State-of-charge recursion
        if hour == 0 {
            problem.add_row(
                initial..=initial,
                [(soc, 1.0), (discharge, 1.0), (charge, -1.0)],
            );
        } else {
            let previous_soc = variables.state_of_charge_var(&storage.id, year, hour - 1);
            problem.add_row(
                0.0..=0.0,
                [
                    (previous_soc, 1.0),
                    (soc, -1.0),
                    (discharge, -1.0),
                    (charge, 1.0),
                ],
            );
        }

        // Storage must finish where it started
        if year == params.final_build_year() && hour == last_hour {
            problem.add_row(initial..=initial, [(soc, 1.0)]);
        }
    }
}
