//! Code for performing the capacity-expansion optimisation.
//!
//! Decision variables for capacity, generation and storage operation are added to a linear
//! program in grouped passes, along with constraints for demand balance, resource limits and
//! storage state of charge. The problem is solved with HiGHS.
use crate::model::Model;
use crate::resource::ResourceID;
use crate::storage::StorageID;
use crate::units::{Capacity, Dimensionless, Energy, Money, MoneyPerEnergy};
use anyhow::Result;
use highs::{HighsModelStatus, HighsStatus, RowProblem as Problem, Sense};
use indexmap::IndexMap;
use itertools::iproduct;
use log::{LevelFilter, debug, info};
use std::error::Error;
use std::fmt;
use std::hash::Hash;
use std::ops::Range;

mod constraints;
use constraints::{ConstraintKeys, add_model_constraints};
mod costs;
use costs::{capacity_cost, charge_cost, generation_cost, storage_capacity_cost};

/// A decision variable in the optimisation
///
/// Note that this type does **not** include the value of the variable; it just refers to a
/// particular column of the problem.
type Variable = highs::Col;

/// Variables for new resource capacity, keyed by resource and build year
type CapacityVariableMap = IndexMap<(ResourceID, u32), Variable>;

/// Variables for new storage capacity, keyed by storage resource and build year
type StorageCapacityVariableMap = IndexMap<(StorageID, u32), Variable>;

/// Variables for generation, keyed by resource, build year and hour
type GenerationVariableMap = IndexMap<(ResourceID, u32, usize), Variable>;

/// Variables for storage operation, keyed by storage resource, build year and hour
type StorageVariableMap = IndexMap<(StorageID, u32, usize), Variable>;

/// A map for easy lookup of variables in the problem.
///
/// The entries are ordered (see [`IndexMap`]).
///
/// We use this data structure for two things:
///
/// 1. In order to define constraints for the optimisation
/// 2. To keep track of the combination of parameters that each variable corresponds to, for when we
///    are reading the results of the optimisation.
#[derive(Debug)]
pub struct VariableMap {
    capacity_vars: CapacityVariableMap,
    capacity_var_idx: Range<usize>,
    storage_capacity_vars: StorageCapacityVariableMap,
    storage_capacity_var_idx: Range<usize>,
    generation_vars: GenerationVariableMap,
    generation_var_idx: Range<usize>,
    charge_vars: StorageVariableMap,
    charge_var_idx: Range<usize>,
    discharge_vars: StorageVariableMap,
    discharge_var_idx: Range<usize>,
    state_of_charge_vars: StorageVariableMap,
    state_of_charge_var_idx: Range<usize>,
}

/// Add a group of variables to the problem, returning the range of columns they occupy.
///
/// # Arguments
///
/// * `problem` - The optimisation problem
/// * `variables` - The map to insert the new variables into
/// * `entries` - The key and objective coefficient for each variable
fn add_variables<K, I>(
    problem: &mut Problem,
    variables: &mut IndexMap<K, Variable>,
    entries: I,
) -> Range<usize>
where
    K: Eq + Hash,
    I: IntoIterator<Item = (K, f64)>,
{
    // This line **must** come before we add more variables
    let start = problem.num_cols();

    for (key, coeff) in entries {
        let var = problem.add_column(coeff, 0.0..);
        let existing = variables.insert(key, var).is_some();
        assert!(!existing, "Duplicate entry for var");
    }

    start..problem.num_cols()
}

impl VariableMap {
    /// Add all the variables for the model to the problem.
    ///
    /// # Arguments
    ///
    /// * `problem` - The optimisation problem
    /// * `model` - The model
    /// * `discount_factors` - The discount factor for each build year
    fn new(problem: &mut Problem, model: &Model, discount_factors: &[Dimensionless]) -> Self {
        let years = model.iter_build_years();
        let hours = 0..model.num_hours();

        let mut capacity_vars = CapacityVariableMap::new();
        let capacity_var_idx = add_variables(
            problem,
            &mut capacity_vars,
            iproduct!(model.resources.values(), years.clone()).map(|(resource, year)| {
                let cost = capacity_cost(model, resource, year, discount_factors);
                ((resource.id.clone(), year), cost.value())
            }),
        );

        let mut storage_capacity_vars = StorageCapacityVariableMap::new();
        let storage_capacity_var_idx = add_variables(
            problem,
            &mut storage_capacity_vars,
            iproduct!(model.storage.values(), years.clone()).map(|(storage, year)| {
                let cost = storage_capacity_cost(model, storage, year, discount_factors);
                ((storage.id.clone(), year), cost.value())
            }),
        );

        let mut generation_vars = GenerationVariableMap::new();
        let generation_var_idx = add_variables(
            problem,
            &mut generation_vars,
            iproduct!(model.iter_dispatchable(), years.clone(), hours.clone()).map(
                |(resource, year, hour)| {
                    let cost = generation_cost(model, resource, year, hour, discount_factors);
                    ((resource.id.clone(), year, hour), cost.value())
                },
            ),
        );

        let storage_keys = || {
            iproduct!(model.storage.values(), years.clone(), hours.clone())
        };

        let mut charge_vars = StorageVariableMap::new();
        let charge_var_idx = add_variables(
            problem,
            &mut charge_vars,
            storage_keys().map(|(storage, year, hour)| {
                let cost = charge_cost(model, storage, hour);
                ((storage.id.clone(), year, hour), cost.value())
            }),
        );

        let mut discharge_vars = StorageVariableMap::new();
        let discharge_var_idx = add_variables(
            problem,
            &mut discharge_vars,
            storage_keys().map(|(storage, year, hour)| ((storage.id.clone(), year, hour), 0.0)),
        );

        let mut state_of_charge_vars = StorageVariableMap::new();
        let state_of_charge_var_idx = add_variables(
            problem,
            &mut state_of_charge_vars,
            storage_keys().map(|(storage, year, hour)| ((storage.id.clone(), year, hour), 0.0)),
        );

        Self {
            capacity_vars,
            capacity_var_idx,
            storage_capacity_vars,
            storage_capacity_var_idx,
            generation_vars,
            generation_var_idx,
            charge_vars,
            charge_var_idx,
            discharge_vars,
            discharge_var_idx,
            state_of_charge_vars,
            state_of_charge_var_idx,
        }
    }

    /// The total number of variables
    fn len(&self) -> usize {
        self.capacity_vars.len()
            + self.storage_capacity_vars.len()
            + self.generation_vars.len()
            + self.charge_vars.len()
            + self.discharge_vars.len()
            + self.state_of_charge_vars.len()
    }

    /// Get the capacity variable for the given resource and build year
    fn capacity_var(&self, resource_id: &ResourceID, year: u32) -> Variable {
        *self
            .capacity_vars
            .get(&(resource_id.clone(), year))
            .expect("No capacity variable found for given params")
    }

    /// Get the storage capacity variable for the given storage resource and build year
    fn storage_capacity_var(&self, storage_id: &StorageID, year: u32) -> Variable {
        *self
            .storage_capacity_vars
            .get(&(storage_id.clone(), year))
            .expect("No storage capacity variable found for given params")
    }

    /// Get the generation variable for the given resource, build year and hour
    fn generation_var(&self, resource_id: &ResourceID, year: u32, hour: usize) -> Variable {
        *self
            .generation_vars
            .get(&(resource_id.clone(), year, hour))
            .expect("No generation variable found for given params")
    }

    /// Get the charge variable for the given storage resource, build year and hour
    fn charge_var(&self, storage_id: &StorageID, year: u32, hour: usize) -> Variable {
        *self
            .charge_vars
            .get(&(storage_id.clone(), year, hour))
            .expect("No charge variable found for given params")
    }

    /// Get the discharge variable for the given storage resource, build year and hour
    fn discharge_var(&self, storage_id: &StorageID, year: u32, hour: usize) -> Variable {
        *self
            .discharge_vars
            .get(&(storage_id.clone(), year, hour))
            .expect("No discharge variable found for given params")
    }

    /// Get the state-of-charge variable for the given storage resource, build year and hour
    fn state_of_charge_var(&self, storage_id: &StorageID, year: u32, hour: usize) -> Variable {
        *self
            .state_of_charge_vars
            .get(&(storage_id.clone(), year, hour))
            .expect("No state-of-charge variable found for given params")
    }
}

/// The solution to the capacity-expansion optimisation problem
#[derive(Debug)]
pub struct Solution {
    solution: highs::Solution,
    variables: VariableMap,
    constraint_keys: ConstraintKeys,
    /// The objective value for the solution
    pub objective_value: Money,
}

impl Solution {
    /// Zip a group of variables with their values in the solution
    fn zip_columns<'a, K>(
        &'a self,
        variables: &'a IndexMap<K, Variable>,
        idx: &Range<usize>,
    ) -> impl Iterator<Item = (&'a K, f64)> {
        variables
            .keys()
            .zip(self.solution.columns()[idx.clone()].iter().copied())
    }

    /// Look up the value of a single variable in the solution
    fn column_value<K: Eq + Hash>(
        &self,
        variables: &IndexMap<K, Variable>,
        idx: &Range<usize>,
        key: &K,
    ) -> f64 {
        let pos = variables
            .get_index_of(key)
            .expect("No variable found for given params");
        self.solution.columns()[idx.start + pos]
    }

    /// Iterate over new resource capacity for each resource and build year
    pub fn iter_capacity(&self) -> impl Iterator<Item = (&ResourceID, u32, Capacity)> {
        self.zip_columns(&self.variables.capacity_vars, &self.variables.capacity_var_idx)
            .map(|((resource_id, year), value)| (resource_id, *year, Capacity(value)))
    }

    /// Iterate over new storage capacity for each storage resource and build year
    pub fn iter_storage_capacity(&self) -> impl Iterator<Item = (&StorageID, u32, Capacity)> {
        self.zip_columns(
            &self.variables.storage_capacity_vars,
            &self.variables.storage_capacity_var_idx,
        )
        .map(|((storage_id, year), value)| (storage_id, *year, Capacity(value)))
    }

    /// Iterate over generation for each dispatchable resource, build year and hour
    pub fn iter_generation(&self) -> impl Iterator<Item = (&ResourceID, u32, usize, Energy)> {
        self.zip_columns(
            &self.variables.generation_vars,
            &self.variables.generation_var_idx,
        )
        .map(|((resource_id, year, hour), value)| (resource_id, *year, *hour, Energy(value)))
    }

    /// New capacity for the given resource built in the given year
    pub fn capacity(&self, resource_id: &ResourceID, year: u32) -> Capacity {
        Capacity(self.column_value(
            &self.variables.capacity_vars,
            &self.variables.capacity_var_idx,
            &(resource_id.clone(), year),
        ))
    }

    /// New capacity for the given storage resource built in the given year
    pub fn storage_capacity(&self, storage_id: &StorageID, year: u32) -> Capacity {
        Capacity(self.column_value(
            &self.variables.storage_capacity_vars,
            &self.variables.storage_capacity_var_idx,
            &(storage_id.clone(), year),
        ))
    }

    /// Generation by the given dispatchable resource in the given year and hour
    pub fn generation(&self, resource_id: &ResourceID, year: u32, hour: usize) -> Energy {
        Energy(self.column_value(
            &self.variables.generation_vars,
            &self.variables.generation_var_idx,
            &(resource_id.clone(), year, hour),
        ))
    }

    /// Energy charged by the given storage resource in the given year and hour
    pub fn charge(&self, storage_id: &StorageID, year: u32, hour: usize) -> Energy {
        Energy(self.column_value(
            &self.variables.charge_vars,
            &self.variables.charge_var_idx,
            &(storage_id.clone(), year, hour),
        ))
    }

    /// Energy discharged by the given storage resource in the given year and hour (before
    /// efficiency losses)
    pub fn discharge(&self, storage_id: &StorageID, year: u32, hour: usize) -> Energy {
        Energy(self.column_value(
            &self.variables.discharge_vars,
            &self.variables.discharge_var_idx,
            &(storage_id.clone(), year, hour),
        ))
    }

    /// State of charge of the given storage resource at the end of the given year and hour
    pub fn state_of_charge(&self, storage_id: &StorageID, year: u32, hour: usize) -> Energy {
        Energy(self.column_value(
            &self.variables.state_of_charge_vars,
            &self.variables.state_of_charge_var_idx,
            &(storage_id.clone(), year, hour),
        ))
    }

    /// Iterate over the marginal cost of meeting demand in each build year and hour.
    ///
    /// These are the dual values of the demand balance constraints.
    pub fn iter_demand_duals(&self) -> impl Iterator<Item = (u32, usize, MoneyPerEnergy)> {
        self.constraint_keys
            .demand_balance_keys
            .zip_duals(self.solution.dual_rows())
            .map(|((year, hour), dual)| (*year, *hour, dual))
    }
}

/// An error from the solver
#[derive(Debug, Clone)]
pub enum ModelError {
    /// The model definition is incoherent.
    ///
    /// Users should not be able to trigger this error.
    Incoherent(HighsStatus),
    /// An optimal solution could not be found
    NonOptimal(HighsModelStatus),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::Incoherent(status) => write!(f, "Incoherent model: {status:?}"),
            ModelError::NonOptimal(status) => {
                write!(f, "Could not find optimal result: {status:?}")
            }
        }
    }
}

impl Error for ModelError {}

/// Try to solve the model, returning an error if the model is incoherent or result is non-optimal
pub fn solve_optimal(model: highs::Model) -> Result<highs::SolvedModel, ModelError> {
    let solved = model.try_solve().map_err(ModelError::Incoherent)?;

    match solved.status() {
        HighsModelStatus::Optimal => Ok(solved),
        status => Err(ModelError::NonOptimal(status)),
    }
}

/// Whether the HiGHS solver should write to the console, given the program's log level
fn highs_logging_enabled(log_level: Option<LevelFilter>) -> bool {
    // Logging is disabled or was never set up (e.g. when running tests)
    !matches!(log_level, None | Some(LevelFilter::Off))
}

/// Enable logging for the HiGHS solver
fn enable_highs_logging(model: &mut highs::Model) {
    if !highs_logging_enabled(crate::log::log_level()) {
        return;
    }

    model.set_option("log_to_console", true);
    model.set_option("output_flag", true);
}

/// Perform the capacity-expansion optimisation.
///
/// # Arguments
///
/// * `model` - The model
///
/// # Returns
///
/// A solution containing new capacity, dispatch and the marginal cost of meeting demand, or an
/// error if the solver could not find an optimal solution.
pub fn perform_optimisation(model: &Model) -> Result<Solution> {
    let discount_factors = model.discount_factors();

    // Set up problem
    let mut problem = Problem::default();
    let variables = VariableMap::new(&mut problem, model, &discount_factors);
    let constraint_keys = add_model_constraints(&mut problem, &variables, model);
    debug!(
        "Optimisation problem has {} variables and {} constraints",
        variables.len(),
        problem.num_rows()
    );

    // Solve problem
    let mut highs_model = problem.optimise(Sense::Minimise);
    enable_highs_logging(&mut highs_model);
    let solved = solve_optimal(highs_model)?;
    let objective_value = Money(solved.objective_value());
    info!("Found optimal solution with objective value {objective_value}");

    Ok(Solution {
        solution: solved.get_solution(),
        variables,
        constraint_keys,
        objective_value,
    })
}
