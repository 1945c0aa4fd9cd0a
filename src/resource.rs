//! Generation resources are technologies which produce electricity, either on demand
//! (dispatchable) or following an hourly profile (non-dispatchable).
use crate::emissions::EmissionRates;
use crate::id::{define_id_getter, define_id_type};
use crate::units::{Capacity, Dimensionless, HeatRate, MoneyPerCapacity, MoneyPerEnergy};
use indexmap::IndexMap;
use serde_string_enum::DeserializeLabeledStringEnum;
use std::rc::Rc;

define_id_type! {ResourceID}

/// A map of [`Resource`]s, keyed by resource ID
pub type ResourceMap = IndexMap<ResourceID, Rc<Resource>>;

/// Special treatment applied to a resource when building the optimisation problem
#[derive(PartialEq, Eq, Debug, Clone, Copy, Default, DeserializeLabeledStringEnum)]
pub enum ResourceKind {
    /// No special treatment
    #[default]
    #[string = "generic"]
    Generic,
    /// Burns gas, so pays for fuel according to its heat rate
    #[string = "gas"]
    Gas,
    /// Electricity imported from outside the basin
    #[string = "import"]
    Import,
    /// Subject to the shared hydro power and energy limits
    #[string = "hydro"]
    Hydro,
}

/// A generation resource
#[derive(PartialEq, Debug, Clone)]
pub struct Resource {
    /// Unique identifier for the resource (e.g. "solar_pv")
    pub id: ResourceID,
    /// Text description of the resource
    pub description: String,
    /// Special treatment for this resource
    pub kind: ResourceKind,
    /// Whether the optimiser chooses the hourly output of this resource
    pub dispatchable: bool,
    /// Capacity already installed before the first build year
    pub existing_capacity: Capacity,
    /// Upper limit on total installed capacity (existing plus new), if any
    pub max_capacity: Option<Capacity>,
    /// Capital cost of building new capacity in the first build year
    pub capex: MoneyPerCapacity,
    /// Fractional decline in capital cost for each build year
    pub capex_decline: Dimensionless,
    /// Annual fixed operating cost
    pub fixed_cost: MoneyPerCapacity,
    /// Variable operating cost
    pub variable_cost: MoneyPerEnergy,
    /// Fuel burned for each MWh generated (only used for gas resources)
    pub heat_rate: HeatRate,
    /// Emission rates for each MWh generated
    pub emissions: EmissionRates,
}
define_id_getter! {Resource, ResourceID}

impl Resource {
    /// Whether the resource has capacity installed before the first build year
    pub fn is_legacy(&self) -> bool {
        self.existing_capacity > Capacity(0.0)
    }
}
