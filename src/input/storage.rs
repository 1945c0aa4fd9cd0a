//! Code for reading storage resources from a CSV file.
use super::*;
use crate::id::collect_unique_ids;
use crate::storage::{Storage, StorageID, StorageMap};
use crate::units::{
    Capacity, Dimensionless, EnergyPerCapacity, MoneyPerCapacity, MoneyPerEnergy,
};
use serde::Deserialize;
use std::rc::Rc;

const STORAGE_FILE_NAME: &str = "storage.csv";

/// A row of `storage.csv`
#[derive(PartialEq, Debug, Deserialize)]
struct StorageRaw {
    storage_id: String,
    #[serde(default)]
    description: String,
    existing_mw: Option<Capacity>,
    max_capacity_mw: Option<Capacity>,
    #[serde(default, deserialize_with = "deserialise_yes_no")]
    resilient: bool,
    #[serde(default, deserialize_with = "deserialise_yes_no")]
    replaces_diesel_genset: bool,
    capex: MoneyPerCapacity,
    capex_decline: Option<Dimensionless>,
    fixed: MoneyPerCapacity,
    variable: MoneyPerEnergy,
    #[serde(deserialize_with = "deserialise_proportion_nonzero")]
    efficiency: Dimensionless,
    duration_hours: EnergyPerCapacity,
}

impl StorageRaw {
    fn into_storage(self) -> Result<Storage> {
        let storage = Storage {
            id: StorageID::from(self.storage_id),
            description: self.description,
            existing_capacity: self.existing_mw.unwrap_or_default(),
            max_capacity: self.max_capacity_mw,
            resilient: self.resilient,
            replaces_diesel_genset: self.replaces_diesel_genset,
            capex: self.capex,
            capex_decline: self.capex_decline.unwrap_or_default(),
            fixed_cost: self.fixed,
            variable_cost: self.variable,
            efficiency: self.efficiency,
            duration: self.duration_hours,
        };
        validate_storage(&storage)
            .with_context(|| format!("Invalid storage resource {}", storage.id))?;

        Ok(storage)
    }
}

/// Check that the values for a storage resource are sensible
fn validate_storage(storage: &Storage) -> Result<()> {
    check_non_negative("existing_mw", storage.existing_capacity.value())?;
    check_non_negative("capex", storage.capex.value())?;
    check_non_negative("fixed", storage.fixed_cost.value())?;
    check_non_negative("variable", storage.variable_cost.value())?;
    ensure!(
        storage.duration.is_finite() && storage.duration > EnergyPerCapacity(0.0),
        "duration_hours must be a finite number greater than zero"
    );
    ensure!(
        (0.0..1.0).contains(&storage.capex_decline.value()),
        "capex_decline must be at least 0 and less than 1"
    );

    if let Some(max_capacity) = storage.max_capacity {
        ensure!(
            max_capacity.is_finite() && max_capacity >= storage.existing_capacity,
            "max_capacity_mw must be finite and at least existing_mw"
        );
    }

    // Each MW built earns a credit for a displaced genset, so the number of gensets must be bounded
    ensure!(
        !storage.replaces_diesel_genset || storage.max_capacity.is_some(),
        "Storage which replaces diesel gensets must have a value for max_capacity_mw"
    );

    Ok(())
}

/// Read storage resources from the specified model directory.
///
/// The file may be missing or contain a header only, in which case no storage is modelled.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
pub fn read_storage(model_dir: &Path) -> Result<StorageMap> {
    let file_path = model_dir.join(STORAGE_FILE_NAME);
    if !file_path.is_file() {
        log::info!("No {STORAGE_FILE_NAME} file provided; no storage will be modelled");
        return Ok(StorageMap::new());
    }

    let raw: Vec<StorageRaw> = read_csv_optional(&file_path)?;
    read_storage_from_iter(raw).with_context(|| input_err_msg(&file_path))
}

fn read_storage_from_iter<I>(iter: I) -> Result<StorageMap>
where
    I: IntoIterator<Item = StorageRaw>,
{
    let storage = iter
        .into_iter()
        .map(StorageRaw::into_storage)
        .collect::<Result<Vec<_>>>()?;

    Ok(collect_unique_ids(storage)?
        .into_iter()
        .map(|(id, storage)| (id, Rc::new(storage)))
        .collect())
}
