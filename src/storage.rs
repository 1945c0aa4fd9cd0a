//! Storage resources which charge from the grid and discharge to meet demand.
use crate::id::{define_id_getter, define_id_type};
use crate::units::{
    Capacity, Dimensionless, EnergyPerCapacity, MoneyPerCapacity, MoneyPerEnergy,
};
use indexmap::IndexMap;
use std::rc::Rc;

define_id_type! {StorageID}

/// A map of [`Storage`] resources, keyed by storage ID
pub type StorageMap = IndexMap<StorageID, Rc<Storage>>;

/// A storage resource
#[derive(PartialEq, Debug, Clone)]
pub struct Storage {
    /// Unique identifier for the storage resource (e.g. "battery_4hr")
    pub id: StorageID,
    /// Text description of the storage resource
    pub description: String,
    /// Capacity already installed before the first build year
    pub existing_capacity: Capacity,
    /// Upper limit on total installed capacity (existing plus new), if any
    pub max_capacity: Option<Capacity>,
    /// Whether part of the capacity is held back for local backup
    pub resilient: bool,
    /// Whether each MW built displaces a backup diesel genset
    pub replaces_diesel_genset: bool,
    /// Capital cost of building new capacity in the first build year
    pub capex: MoneyPerCapacity,
    /// Fractional decline in capital cost for each build year
    pub capex_decline: Dimensionless,
    /// Annual fixed operating cost
    pub fixed_cost: MoneyPerCapacity,
    /// Cost for each MWh charged
    pub variable_cost: MoneyPerEnergy,
    /// Round-trip efficiency
    pub efficiency: Dimensionless,
    /// Ratio of energy capacity to power capacity
    pub duration: EnergyPerCapacity,
}
define_id_getter! {Storage, StorageID}

impl Storage {
    /// The fraction of this resource's capacity which is available to the grid
    pub fn grid_fraction(&self, resilient_grid_fraction: Dimensionless) -> Dimensionless {
        if self.resilient {
            resilient_grid_fraction
        } else {
            Dimensionless(1.0)
        }
    }
}
