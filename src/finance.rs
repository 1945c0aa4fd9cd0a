//! General functions related to finance.
use crate::units::{Dimensionless, MoneyPerCapacity};

/// Calculate the extrapolation factor for a recurring annual cost incurred from a given build
/// year until the end of the modelled timespan.
///
/// The factor is the present value of one unit of cost per year over the remaining
/// `timespan - year` years, multiplied by `cost`. With a discount rate of zero this reduces to
/// `cost * (timespan - year)`.
pub fn discount_factor(
    cost: Dimensionless,
    discount_rate: Dimensionless,
    timespan: u32,
    year: u32,
) -> Dimensionless {
    let remaining_years = Dimensionless(f64::from(timespan.saturating_sub(year)));
    let growth_rate = Dimensionless(1.0) + discount_rate;
    let value_decay_year = Dimensionless(1.0) / growth_rate;

    // Rates too small to change 1 + r behave as zero
    let denominator = Dimensionless(1.0) - value_decay_year;
    if denominator.value().abs() < f64::EPSILON {
        return cost * remaining_years;
    }

    let value_decay_horizon = Dimensionless(1.0) / growth_rate.powf(remaining_years.value());
    cost * (Dimensionless(1.0) - value_decay_horizon) / denominator
}

/// Calculate the extrapolation factors for every build year.
///
/// # Arguments
///
/// * `cost` - Multiplier applied to every factor
/// * `discount_rate` - The rate at which money loses value each year
/// * `timespan` - The number of years over which costs are incurred
/// * `build_years` - The number of build years
pub fn discount_factors(
    cost: Dimensionless,
    discount_rate: Dimensionless,
    timespan: u32,
    build_years: u32,
) -> Vec<Dimensionless> {
    (0..build_years)
        .map(|year| discount_factor(cost, discount_rate, timespan, year))
        .collect()
}

/// The capital cost of building capacity in the given build year, allowing for an annual decline
/// in costs
pub fn capex_in_year(
    capex: MoneyPerCapacity,
    annual_decline: Dimensionless,
    year: u32,
) -> MoneyPerCapacity {
    capex * (Dimensionless(1.0) - annual_decline).powf(f64::from(year))
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    #[rstest]
    #[case(1.0, 0.06, 30, 0, 14.59072102057877)]
    #[case(1.0, 0.06, 30, 29, 1.0)] // Final year only
    #[case(2.0, 0.06, 30, 0, 29.18144204115754)]
    #[case(1.0, 0.0, 30, 0, 30.0)] // Undiscounted
    #[case(1.0, 0.0, 30, 10, 20.0)]
    #[case(1.0, 0.06, 5, 5, 0.0)] // No years remaining
    #[case(1.0, 1e-17, 30, 0, 30.0)] // Below floating-point resolution
    #[case(1.0, -1e-17, 30, 0, 30.0)]
    fn test_discount_factor(
        #[case] cost: f64,
        #[case] discount_rate: f64,
        #[case] timespan: u32,
        #[case] year: u32,
        #[case] expected: f64,
    ) {
        let result = discount_factor(
            Dimensionless(cost),
            Dimensionless(discount_rate),
            timespan,
            year,
        );
        assert_approx_eq!(f64, result.value(), expected, epsilon = 1e-9);
    }

    #[test]
    fn test_discount_factors_decrease_with_build_year() {
        let factors = discount_factors(Dimensionless(1.0), Dimensionless(0.06), 30, 3);
        assert_eq!(factors.len(), 3);
        assert!(factors[0] > factors[1]);
        assert!(factors[1] > factors[2]);
    }

    #[rstest]
    #[case(1000.0, 0.1, 0, 1000.0)]
    #[case(1000.0, 0.1, 1, 900.0)]
    #[case(1000.0, 0.1, 2, 810.0)]
    #[case(1000.0, 0.0, 5, 1000.0)]
    fn test_capex_in_year(
        #[case] capex: f64,
        #[case] decline: f64,
        #[case] year: u32,
        #[case] expected: f64,
    ) {
        let result = capex_in_year(MoneyPerCapacity(capex), Dimensionless(decline), year);
        assert_approx_eq!(MoneyPerCapacity, result, MoneyPerCapacity(expected), epsilon = 1e-9);
    }
}
