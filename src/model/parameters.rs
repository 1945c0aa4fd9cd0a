//! Defines the `ModelParameters` struct, which represents the contents of `model.toml`.
use crate::emissions::{EmissionPrices, PollutantValues};
use crate::input::{check_non_negative, deserialise_proportion, input_err_msg, read_toml};
use crate::units::{
    Capacity, Dimensionless, Energy, EnergyPerCapacity, HeatRate, MassPerCapacity,
    MoneyPerCapacity, MoneyPerEnergy, MoneyPerHeat, MoneyPerMass,
};
use anyhow::{Context, Result, ensure};
use log::warn;
use serde::Deserialize;
use std::path::Path;

const MODEL_PARAMETERS_FILE_NAME: &str = "model.toml";

/// The number of kWh in a MWh
const KWH_PER_MWH: f64 = 1000.0;

macro_rules! define_unit_param_default {
    ($name:ident, $type: ty, $value: expr) => {
        fn $name() -> $type {
            <$type>::new($value)
        }
    };
}

macro_rules! define_param_default {
    ($name:ident, $type: ty, $value: expr) => {
        fn $name() -> $type {
            $value
        }
    };
}

define_param_default!(default_timespan, u32, 30);
define_param_default!(default_build_years, u32, 1);
define_unit_param_default!(default_discount_rate, Dimensionless, 0.06);
define_unit_param_default!(default_cost, Dimensionless, 1.0);
define_unit_param_default!(default_gas_fuel_cost, MoneyPerHeat, 8.0);
define_unit_param_default!(default_transmission_cost, MoneyPerEnergy, 2.0);
define_param_default!(default_resilience_incentive_per_kwh, f64, 1000.0);
define_unit_param_default!(default_resilient_grid_fraction, Dimensionless, 0.7);
define_unit_param_default!(default_carbon_cost, MoneyPerMass, 50.0);
define_unit_param_default!(default_pm25_cost, MoneyPerMass, 100_000.0);
define_unit_param_default!(default_nox_cost, MoneyPerMass, 10_000.0);
define_unit_param_default!(default_so2_cost, MoneyPerMass, 20_000.0);
define_unit_param_default!(default_pm10_cost, MoneyPerMass, 50_000.0);
define_unit_param_default!(default_diesel_genset_emissions, MassPerCapacity, 2.0);
define_unit_param_default!(default_diesel_genset_fixed_cost, MoneyPerCapacity, 35_000.0);
define_unit_param_default!(default_diesel_genset_heat_rate, HeatRate, 4.0);
define_unit_param_default!(default_diesel_genset_fuel_cost, MoneyPerHeat, 20.0);
define_unit_param_default!(default_diesel_genset_hours, EnergyPerCapacity, 24.0);
define_unit_param_default!(default_hydro_power_limit, Capacity, 9594.8);
define_unit_param_default!(default_hydro_energy_limit, Energy, 13_808_000.0);

/// Represents the contents of the entire model file.
///
/// Every parameter has a default value, so an empty file is valid.
#[derive(Debug, Deserialize, PartialEq)]
pub struct ModelParameters {
    /// Energy held in each storage resource at the start of every build year and at the end of
    /// the final build year
    #[serde(default)]
    pub initial_state_of_charge: Energy,
    /// The number of years over which recurring costs are incurred
    #[serde(default = "default_timespan")]
    pub timespan: u32,
    /// The number of build years in which new capacity can be built
    #[serde(default = "default_build_years")]
    pub build_years: u32,
    /// The rate at which money loses value each year
    #[serde(default = "default_discount_rate")]
    pub discount_rate: Dimensionless,
    /// Multiplier applied to all discount factors
    #[serde(default = "default_cost")]
    pub cost: Dimensionless,
    /// Fuel cost for gas resources
    #[serde(default = "default_gas_fuel_cost")]
    pub gas_fuel_cost: MoneyPerHeat,
    /// Transmission cost for imported electricity
    #[serde(default = "default_transmission_cost")]
    pub transmission_cost_per_mwh: MoneyPerEnergy,
    /// Incentive for resilient storage, in $ per kWh of energy capacity
    #[serde(default = "default_resilience_incentive_per_kwh")]
    pub storage_resilience_incentive_per_kwh: f64,
    /// The fraction of resilient storage capacity available to the grid
    #[serde(default = "default_resilient_grid_fraction")]
    #[serde(deserialize_with = "deserialise_proportion")]
    pub resilient_storage_grid_fraction: Dimensionless,
    /// Monetised damage for each ton of CO2 emitted
    #[serde(default = "default_carbon_cost")]
    pub carbon_cost_per_ton: MoneyPerMass,
    /// Monetised damage for each ton of PM2.5 emitted
    #[serde(default = "default_pm25_cost")]
    pub pm25_cost_per_ton: MoneyPerMass,
    /// Monetised damage for each ton of NOx emitted
    #[serde(default = "default_nox_cost")]
    pub nox_cost_per_ton: MoneyPerMass,
    /// Monetised damage for each ton of SO2 emitted
    #[serde(default = "default_so2_cost")]
    pub so2_cost_per_ton: MoneyPerMass,
    /// Monetised damage for each ton of PM10 emitted
    #[serde(default = "default_pm10_cost")]
    pub pm10_cost_per_ton: MoneyPerMass,
    /// Annual CO2 emissions of a diesel genset, per MW
    #[serde(default = "default_diesel_genset_emissions")]
    pub diesel_genset_carbon_per_mw: MassPerCapacity,
    /// Annual PM2.5 emissions of a diesel genset, per MW
    #[serde(default = "default_diesel_genset_emissions")]
    pub diesel_genset_pm25_per_mw: MassPerCapacity,
    /// Annual NOx emissions of a diesel genset, per MW
    #[serde(default = "default_diesel_genset_emissions")]
    pub diesel_genset_nox_per_mw: MassPerCapacity,
    /// Annual SO2 emissions of a diesel genset, per MW
    #[serde(default = "default_diesel_genset_emissions")]
    pub diesel_genset_so2_per_mw: MassPerCapacity,
    /// Annual PM10 emissions of a diesel genset, per MW
    #[serde(default = "default_diesel_genset_emissions")]
    pub diesel_genset_pm10_per_mw: MassPerCapacity,
    /// Annual fixed cost of a diesel genset
    #[serde(default = "default_diesel_genset_fixed_cost")]
    pub diesel_genset_fixed_cost_per_mw_year: MoneyPerCapacity,
    /// Fuel burned by a diesel genset for each MWh generated
    #[serde(default = "default_diesel_genset_heat_rate")]
    pub diesel_genset_mmbtu_per_mwh: HeatRate,
    /// Diesel fuel cost
    #[serde(default = "default_diesel_genset_fuel_cost")]
    pub diesel_genset_cost_per_mmbtu: MoneyPerHeat,
    /// Hours for which a diesel genset runs each year
    #[serde(default = "default_diesel_genset_hours")]
    pub diesel_genset_hours_per_year: EnergyPerCapacity,
    /// Maximum combined output of hydro resources in any hour
    #[serde(default = "default_hydro_power_limit")]
    pub hydro_power_limit: Capacity,
    /// Maximum combined output of hydro resources in each build year
    #[serde(default = "default_hydro_energy_limit")]
    pub hydro_energy_limit: Energy,
    /// Whether storage is charged from the modelled portfolio instead of the wider grid.
    ///
    /// If set, charging counts against demand and grid emissions are not charged for.
    #[serde(default)]
    pub storage_charges_from_portfolio: bool,
}

impl Default for ModelParameters {
    fn default() -> Self {
        toml::from_str("").expect("Empty model file should contain default parameters")
    }
}

/// Check that the `build_years` and `timespan` parameters are valid
fn check_years(build_years: u32, timespan: u32) -> Result<()> {
    ensure!(build_years > 0, "build_years cannot be zero");
    ensure!(
        timespan >= build_years,
        "timespan must be at least as long as build_years"
    );

    Ok(())
}

/// Check that the `discount_rate` parameter is valid
fn check_discount_rate(value: Dimensionless) -> Result<()> {
    ensure!(
        value.is_finite() && value > Dimensionless(-1.0),
        "discount_rate must be a finite number greater than -1"
    );

    Ok(())
}

impl ModelParameters {
    /// Read a model file from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `model_dir` - Folder containing model configuration files
    ///
    /// # Returns
    ///
    /// The model file contents as a [`ModelParameters`] struct or an error if the file is invalid
    pub fn from_path<P: AsRef<Path>>(model_dir: P) -> Result<ModelParameters> {
        let file_path = model_dir.as_ref().join(MODEL_PARAMETERS_FILE_NAME);
        let model_params: ModelParameters = read_toml(&file_path)?;

        model_params
            .validate()
            .with_context(|| input_err_msg(file_path))?;

        Ok(model_params)
    }

    /// Validate parameters after reading in file
    fn validate(&self) -> Result<()> {
        // build_years and timespan
        check_years(self.build_years, self.timespan)?;

        // discount_rate
        check_discount_rate(self.discount_rate)?;

        // resilient_storage_grid_fraction already validated with deserialise_proportion

        let non_negative = [
            ("initial_state_of_charge", self.initial_state_of_charge.value()),
            ("cost", self.cost.value()),
            ("gas_fuel_cost", self.gas_fuel_cost.value()),
            ("transmission_cost_per_mwh", self.transmission_cost_per_mwh.value()),
            (
                "storage_resilience_incentive_per_kwh",
                self.storage_resilience_incentive_per_kwh,
            ),
            (
                "diesel_genset_fixed_cost_per_mw_year",
                self.diesel_genset_fixed_cost_per_mw_year.value(),
            ),
            ("diesel_genset_mmbtu_per_mwh", self.diesel_genset_mmbtu_per_mwh.value()),
            ("diesel_genset_cost_per_mmbtu", self.diesel_genset_cost_per_mmbtu.value()),
            ("diesel_genset_hours_per_year", self.diesel_genset_hours_per_year.value()),
            ("hydro_power_limit", self.hydro_power_limit.value()),
            ("hydro_energy_limit", self.hydro_energy_limit.value()),
        ];
        for (name, value) in non_negative {
            check_non_negative(name, value)?;
        }
        for (pollutant, price) in self.emission_prices().iter() {
            check_non_negative(&format!("{pollutant} cost per ton"), price.value())?;
        }
        for (pollutant, rate) in self.diesel_genset_emissions().iter() {
            check_non_negative(&format!("diesel genset {pollutant} per MW"), rate.value())?;
        }

        if self.discount_rate < Dimensionless(0.0) {
            warn!("discount_rate is negative: future costs will be weighted more than present ones");
        }

        Ok(())
    }

    /// The monetised damage for each ton of each pollutant
    pub fn emission_prices(&self) -> EmissionPrices {
        PollutantValues {
            co2: self.carbon_cost_per_ton,
            pm25: self.pm25_cost_per_ton,
            nox: self.nox_cost_per_ton,
            so2: self.so2_cost_per_ton,
            pm10: self.pm10_cost_per_ton,
        }
    }

    /// The annual emissions of a diesel genset, per MW
    pub fn diesel_genset_emissions(&self) -> PollutantValues<MassPerCapacity> {
        PollutantValues {
            co2: self.diesel_genset_carbon_per_mw,
            pm25: self.diesel_genset_pm25_per_mw,
            nox: self.diesel_genset_nox_per_mw,
            so2: self.diesel_genset_so2_per_mw,
            pm10: self.diesel_genset_pm10_per_mw,
        }
    }

    /// The resilience incentive for each MWh of storage energy capacity
    pub fn resilience_incentive(&self) -> MoneyPerEnergy {
        MoneyPerEnergy(self.storage_resilience_incentive_per_kwh * KWH_PER_MWH)
    }

    /// The index of the final build year
    pub fn final_build_year(&self) -> u32 {
        self.build_years - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_default_parameters() {
        let params = ModelParameters::default();
        assert_eq!(params.timespan, 30);
        assert_eq!(params.build_years, 1);
        assert_eq!(params.discount_rate, Dimensionless(0.06));
        assert_eq!(params.resilient_storage_grid_fraction, Dimensionless(0.7));
        assert_eq!(params.hydro_power_limit, Capacity(9594.8));
        assert_eq!(params.hydro_energy_limit, Energy(13_808_000.0));
        assert!(!params.storage_charges_from_portfolio);
        assert_eq!(params.resilience_incentive(), MoneyPerEnergy(1_000_000.0));
        assert_eq!(params.emission_prices().pm25, MoneyPerMass(100_000.0));
        assert_eq!(
            params.diesel_genset_emissions().nox,
            MassPerCapacity(2.0)
        );
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_model_params_from_path() {
        let dir = tempdir().unwrap();
        {
            let mut file = File::create(dir.path().join(MODEL_PARAMETERS_FILE_NAME)).unwrap();
            writeln!(
                file,
                "build_years = 3\ndiscount_rate = 0.05\nstorage_charges_from_portfolio = true"
            )
            .unwrap();
        }

        let model_params = ModelParameters::from_path(dir.path()).unwrap();
        assert_eq!(model_params.build_years, 3);
        assert_eq!(model_params.final_build_year(), 2);
        assert_eq!(model_params.discount_rate, Dimensionless(0.05));
        assert!(model_params.storage_charges_from_portfolio);
        assert_eq!(model_params.timespan, 30);
    }

    #[test]
    fn test_model_params_bad_grid_fraction() {
        assert!(
            toml::from_str::<ModelParameters>("resilient_storage_grid_fraction = 1.5").is_err()
        );
    }

    #[rstest]
    #[case(1, 30, true)]
    #[case(30, 30, true)]
    #[case(0, 30, false)] // No build years
    #[case(5, 4, false)] // Timespan shorter than build years
    fn test_check_years(#[case] build_years: u32, #[case] timespan: u32, #[case] valid: bool) {
        assert_eq!(check_years(build_years, timespan).is_ok(), valid);
    }

    #[rstest]
    #[case(0.06, true)]
    #[case(0.0, true)]
    #[case(-0.5, true)]
    #[case(-1.0, false)]
    #[case(f64::INFINITY, false)]
    #[case(f64::NAN, false)]
    fn test_check_discount_rate(#[case] value: f64, #[case] valid: bool) {
        assert_eq!(check_discount_rate(Dimensionless(value)).is_ok(), valid);
    }

    #[test]
    fn test_validate_negative_cost() {
        let params = ModelParameters {
            gas_fuel_cost: MoneyPerHeat(-1.0),
            ..ModelParameters::default()
        };
        assert!(params.validate().is_err());
    }
}
