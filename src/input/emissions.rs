//! Code for reading hourly emission rates.
use super::*;
use crate::emissions::{EmissionRates, HourlyEmissions};

/// Emission rates for electricity drawn from the grid
pub const GRID_EMISSIONS_FILE_NAME: &str = "grid_emissions.csv";

/// Emission rates for electricity imported from outside the basin
pub const IMPORT_EMISSIONS_FILE_NAME: &str = "import_emissions.csv";

/// Read hourly emission rates from a CSV file.
///
/// The file has one row for each hour and a column for each pollutant (`co2`, `pm25`, `nox`,
/// `so2` and `pm10`, in tons/MWh). Any other columns (e.g. `hour`) are ignored.
pub fn read_hourly_emissions(file_path: &Path) -> Result<HourlyEmissions> {
    let rates: Vec<EmissionRates> = read_csv(file_path)?;
    for (hour, hour_rates) in rates.iter().enumerate() {
        for (pollutant, rate) in hour_rates.iter() {
            check_non_negative(&format!("{pollutant} emission rate"), rate.value())
                .with_context(|| format!("Invalid emissions for hour {hour}"))
                .with_context(|| input_err_msg(file_path))?;
        }
    }

    Ok(HourlyEmissions(rates))
}
