//! Code for reading generation resources from a CSV file.
use super::*;
use crate::emissions::EmissionRates;
use crate::id::collect_unique_ids;
use crate::resource::{Resource, ResourceID, ResourceKind, ResourceMap};
use crate::units::{
    Capacity, Dimensionless, HeatRate, MassPerEnergy, MoneyPerCapacity, MoneyPerEnergy,
};
use serde::Deserialize;
use std::rc::Rc;

const RESOURCES_FILE_NAME: &str = "resources.csv";

/// A row of `resources.csv`.
///
/// Optional numeric columns may be left blank, in which case they are zero.
#[derive(PartialEq, Debug, Deserialize)]
struct ResourceRaw {
    resource_id: String,
    #[serde(default)]
    description: String,
    kind: Option<ResourceKind>,
    #[serde(deserialize_with = "deserialise_yes_no")]
    dispatchable: bool,
    existing_mw: Option<Capacity>,
    max_capacity_mw: Option<Capacity>,
    capex: MoneyPerCapacity,
    capex_decline: Option<Dimensionless>,
    fixed: MoneyPerCapacity,
    variable: MoneyPerEnergy,
    heat_rate: Option<HeatRate>,
    co2: Option<MassPerEnergy>,
    pm25: Option<MassPerEnergy>,
    nox: Option<MassPerEnergy>,
    so2: Option<MassPerEnergy>,
    pm10: Option<MassPerEnergy>,
}

impl ResourceRaw {
    fn into_resource(self) -> Result<Resource> {
        let id = ResourceID::from(self.resource_id);
        let resource = Resource {
            id,
            description: self.description,
            kind: self.kind.unwrap_or_default(),
            dispatchable: self.dispatchable,
            existing_capacity: self.existing_mw.unwrap_or_default(),
            max_capacity: self.max_capacity_mw,
            capex: self.capex,
            capex_decline: self.capex_decline.unwrap_or_default(),
            fixed_cost: self.fixed,
            variable_cost: self.variable,
            heat_rate: self.heat_rate.unwrap_or_default(),
            emissions: EmissionRates {
                co2: self.co2.unwrap_or_default(),
                pm25: self.pm25.unwrap_or_default(),
                nox: self.nox.unwrap_or_default(),
                so2: self.so2.unwrap_or_default(),
                pm10: self.pm10.unwrap_or_default(),
            },
        };
        validate_resource(&resource).with_context(|| format!("Invalid resource {}", resource.id))?;

        Ok(resource)
    }
}

/// Check that the values for a resource are sensible
fn validate_resource(resource: &Resource) -> Result<()> {
    check_non_negative("existing_mw", resource.existing_capacity.value())?;
    check_non_negative("capex", resource.capex.value())?;
    check_non_negative("fixed", resource.fixed_cost.value())?;
    check_non_negative("variable", resource.variable_cost.value())?;
    check_non_negative("heat_rate", resource.heat_rate.value())?;
    for (pollutant, rate) in resource.emissions.iter() {
        check_non_negative(&format!("{pollutant} emission rate"), rate.value())?;
    }

    ensure!(
        (0.0..1.0).contains(&resource.capex_decline.value()),
        "capex_decline must be at least 0 and less than 1"
    );

    if let Some(max_capacity) = resource.max_capacity {
        ensure!(
            max_capacity.is_finite() && max_capacity >= resource.existing_capacity,
            "max_capacity_mw must be finite and at least existing_mw"
        );
    }

    if !resource.dispatchable {
        ensure!(
            resource.kind == ResourceKind::Generic,
            "Non-dispatchable resources must be of kind generic"
        );
    }

    Ok(())
}

/// Read generation resources from the specified model directory.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
///
/// # Returns
///
/// A map of resources, in the order in which they appear in the file.
pub fn read_resources(model_dir: &Path) -> Result<ResourceMap> {
    let file_path = model_dir.join(RESOURCES_FILE_NAME);
    let raw: Vec<ResourceRaw> = read_csv(&file_path)?;
    read_resources_from_iter(raw).with_context(|| input_err_msg(&file_path))
}

fn read_resources_from_iter<I>(iter: I) -> Result<ResourceMap>
where
    I: IntoIterator<Item = ResourceRaw>,
{
    let resources = iter
        .into_iter()
        .map(ResourceRaw::into_resource)
        .collect::<Result<Vec<_>>>()?;
    let resources = collect_unique_ids(resources)?;

    Ok(resources
        .into_iter()
        .map(|(id, resource)| (id, Rc::new(resource)))
        .collect())
}
