//! Emission rates for pollutants and their monetised cost.
use crate::units::{MassPerEnergy, MoneyPerEnergy, MoneyPerMass};
use serde::Deserialize;
use std::ops::Mul;
use strum::{Display, EnumIter, IntoEnumIterator};

/// A pollutant whose emissions are priced in the objective function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display)]
pub enum Pollutant {
    /// Carbon dioxide
    #[strum(serialize = "CO2")]
    CO2,
    /// Fine particulate matter
    #[strum(serialize = "PM2.5")]
    PM25,
    /// Nitrogen oxides
    #[strum(serialize = "NOX")]
    NOx,
    /// Sulphur dioxide
    #[strum(serialize = "SO2")]
    SO2,
    /// Coarse particulate matter
    #[strum(serialize = "PM10")]
    PM10,
}

/// An amount of each pollutant.
///
/// The unit depends on where it is used: for generation it is tons per MWh, but the same
/// structure is used for tons per MW-year and for cost per ton.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct PollutantValues<T> {
    /// Carbon dioxide
    pub co2: T,
    /// Fine particulate matter
    pub pm25: T,
    /// Nitrogen oxides
    pub nox: T,
    /// Sulphur dioxide
    pub so2: T,
    /// Coarse particulate matter
    pub pm10: T,
}

impl<T: Copy> PollutantValues<T> {
    /// Get the value for the given pollutant
    pub fn get(&self, pollutant: Pollutant) -> T {
        match pollutant {
            Pollutant::CO2 => self.co2,
            Pollutant::PM25 => self.pm25,
            Pollutant::NOx => self.nox,
            Pollutant::SO2 => self.so2,
            Pollutant::PM10 => self.pm10,
        }
    }

    /// Iterate over pollutants with their values
    pub fn iter(&self) -> impl Iterator<Item = (Pollutant, T)> + '_ {
        Pollutant::iter().map(|pollutant| (pollutant, self.get(pollutant)))
    }
}

/// Emission rates for generating one MWh of electricity
pub type EmissionRates = PollutantValues<MassPerEnergy>;

/// The monetised damage caused by emitting one ton of each pollutant
pub type EmissionPrices = PollutantValues<MoneyPerMass>;

/// Calculate the monetised cost of emissions.
///
/// This is the sum over all pollutants of the emission rate multiplied by the price of that
/// pollutant.
pub fn monetise<R, P, O>(rates: &PollutantValues<R>, prices: &PollutantValues<P>) -> O
where
    R: Copy + Mul<P, Output = O>,
    P: Copy,
    O: std::iter::Sum,
{
    Pollutant::iter()
        .map(|pollutant| rates.get(pollutant) * prices.get(pollutant))
        .sum()
}

/// Emission rates for every hour of the simulated year
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HourlyEmissions(pub Vec<EmissionRates>);

impl HourlyEmissions {
    /// Create a series of zero emission rates of the given length
    pub fn zero(num_hours: usize) -> Self {
        Self(vec![EmissionRates::default(); num_hours])
    }

    /// The number of hours covered
    pub fn num_hours(&self) -> usize {
        self.0.len()
    }

    /// The emission rates for the given hour
    pub fn get(&self, hour: usize) -> &EmissionRates {
        &self.0[hour]
    }

    /// The monetised cost of emissions for each MWh in the given hour
    pub fn monetised(&self, hour: usize, prices: &EmissionPrices) -> MoneyPerEnergy {
        monetise(self.get(hour), prices)
    }
}
