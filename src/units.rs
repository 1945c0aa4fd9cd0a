//! This module defines various unit types and their conversions.
//!
//! Quantities are stored as `f64` values in the units used throughout the model input files: MW
//! for capacity, MWh for energy, (short) tons for emissions, MMBtu for fuel heat content and US
//! dollars for money.
use serde::{Deserialize, Serialize};

/// A quantity stored as an `f64` with a particular unit
pub trait UnitType: Copy + std::fmt::Debug + PartialOrd {
    /// Create from a raw value
    fn new(value: f64) -> Self;

    /// The raw value
    fn value(&self) -> f64;
}

/// Common functionality for all unit types
macro_rules! base_unit_struct {
    ($name:ident) => {
        /// Represents a type of quantity.
        #[derive(
            Debug,
            Default,
            Clone,
            Copy,
            PartialEq,
            PartialOrd,
            Serialize,
            Deserialize,
            derive_more::Add,
            derive_more::Sub,
            derive_more::Display,
        )]
        pub struct $name(pub f64);

        impl $name {
            /// Creates a new instance of the unit type from a f64 value.
            pub const fn new(val: f64) -> Self {
                Self(val)
            }

            /// Returns the value of the unit type as a f64.
            pub const fn value(self) -> f64 {
                self.0
            }

            /// Whether the underlying value is neither infinite nor NaN
            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }

            /// Return the larger of two values
            pub fn max(self, other: Self) -> Self {
                Self(self.0.max(other.0))
            }
        }

        impl UnitType for $name {
            fn new(value: f64) -> Self {
                Self(value)
            }

            fn value(&self) -> f64 {
                self.0
            }
        }

        impl std::ops::AddAssign for $name {
            fn add_assign(&mut self, rhs: Self) {
                self.0 += rhs.0;
            }
        }

        impl std::ops::SubAssign for $name {
            fn sub_assign(&mut self, rhs: Self) {
                self.0 -= rhs.0;
            }
        }

        impl std::iter::Sum for $name {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                Self(iter.map(|x| x.0).sum())
            }
        }

        impl float_cmp::ApproxEq for $name {
            type Margin = float_cmp::F64Margin;

            fn approx_eq<M: Into<Self::Margin>>(self, other: Self, margin: M) -> bool {
                float_cmp::ApproxEq::approx_eq(self.0, other.0, margin)
            }
        }
    };
}

macro_rules! unit_struct {
    ($name:ident) => {
        base_unit_struct!($name);

        impl std::ops::Mul<Dimensionless> for $name {
            type Output = $name;
            fn mul(self, rhs: Dimensionless) -> $name {
                $name(self.0 * rhs.0)
            }
        }

        impl std::ops::Mul<$name> for Dimensionless {
            type Output = $name;
            fn mul(self, rhs: $name) -> $name {
                $name(self.0 * rhs.0)
            }
        }

        impl std::ops::Div<Dimensionless> for $name {
            type Output = $name;
            fn div(self, rhs: Dimensionless) -> $name {
                $name(self.0 / rhs.0)
            }
        }

        impl std::ops::Div<$name> for $name {
            type Output = Dimensionless;
            fn div(self, rhs: $name) -> Dimensionless {
                Dimensionless(self.0 / rhs.0)
            }
        }
    };
}

macro_rules! impl_mul {
    ($Lhs:ty, $Rhs:ty, $Out:ty) => {
        impl std::ops::Mul<$Rhs> for $Lhs {
            type Output = $Out;
            fn mul(self, rhs: $Rhs) -> $Out {
                <$Out>::new(self.0 * rhs.0)
            }
        }
        impl std::ops::Mul<$Lhs> for $Rhs {
            type Output = $Out;
            fn mul(self, lhs: $Lhs) -> $Out {
                <$Out>::new(self.0 * lhs.0)
            }
        }
    };
}

macro_rules! impl_div {
    ($Lhs:ty, $Rhs:ty, $Out:ty) => {
        impl std::ops::Div<$Rhs> for $Lhs {
            type Output = $Out;
            fn div(self, rhs: $Rhs) -> $Out {
                <$Out>::new(self.0 / rhs.0)
            }
        }
    };
}

base_unit_struct!(Dimensionless);

impl std::ops::Mul for Dimensionless {
    type Output = Dimensionless;

    fn mul(self, rhs: Dimensionless) -> Self::Output {
        Dimensionless(self.0 * rhs.0)
    }
}

impl std::ops::Div for Dimensionless {
    type Output = Dimensionless;

    fn div(self, rhs: Dimensionless) -> Self::Output {
        Dimensionless(self.0 / rhs.0)
    }
}

impl Dimensionless {
    /// Raise to a power
    pub fn powf(self, rhs: f64) -> Self {
        Dimensionless(self.0.powf(rhs))
    }
}

impl From<f64> for Dimensionless {
    fn from(val: f64) -> Self {
        Self(val)
    }
}

impl From<Dimensionless> for f64 {
    fn from(val: Dimensionless) -> Self {
        val.0
    }
}

// Base quantities
unit_struct!(Money);
unit_struct!(Capacity);
unit_struct!(Energy);
unit_struct!(Mass);

// Derived quantities
unit_struct!(MoneyPerCapacity);
unit_struct!(MoneyPerEnergy);
unit_struct!(MoneyPerMass);
unit_struct!(MassPerEnergy);
unit_struct!(MassPerCapacity);
unit_struct!(EnergyPerCapacity);
unit_struct!(HeatRate);
unit_struct!(MoneyPerHeat);

// Multiplication rules
impl_mul!(MoneyPerCapacity, Capacity, Money);
impl_mul!(MoneyPerEnergy, Energy, Money);
impl_mul!(MoneyPerEnergy, EnergyPerCapacity, MoneyPerCapacity);
impl_mul!(EnergyPerCapacity, Capacity, Energy);
impl_mul!(MassPerEnergy, MoneyPerMass, MoneyPerEnergy);
impl_mul!(MassPerEnergy, Energy, Mass);
impl_mul!(MassPerCapacity, MoneyPerMass, MoneyPerCapacity);
impl_mul!(Mass, MoneyPerMass, Money);
impl_mul!(HeatRate, MoneyPerHeat, MoneyPerEnergy);

// Division rules
impl_div!(Money, Capacity, MoneyPerCapacity);
impl_div!(Money, Energy, MoneyPerEnergy);
impl_div!(Energy, Capacity, EnergyPerCapacity);

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn test_derived_units() {
        let per_mwh = MassPerEnergy(0.5) * MoneyPerMass(50.0);
        assert_eq!(per_mwh, MoneyPerEnergy(25.0));

        let per_mw = MoneyPerEnergy(1000.0) * EnergyPerCapacity(4.0);
        assert_eq!(per_mw, MoneyPerCapacity(4000.0));

        let fuel = HeatRate(7.5) * MoneyPerHeat(8.0);
        assert_approx_eq!(MoneyPerEnergy, fuel, MoneyPerEnergy(60.0));
    }

    #[test]
    fn test_ratio_is_dimensionless() {
        assert_eq!(Capacity(5.0) / Capacity(20.0), Dimensionless(0.25));
        assert_eq!(Energy(3.0) * Dimensionless(2.0), Energy(6.0));
    }

    #[test]
    fn test_sum() {
        let total: Money = [Money(1.0), Money(2.5), Money(-0.5)].into_iter().sum();
        assert_eq!(total, Money(3.0));
    }
}
