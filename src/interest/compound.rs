use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::{nth_root, pow_u32, Rate};
use crate::errors::{MortgageError, Result};

/// how a quoted nominal annual rate becomes a per-payment rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CompoundingConvention {
    /// canadian convention, nominal rate compounded twice a year
    #[default]
    SemiAnnual,
    /// nominal rate divided by the number of payments, compounded per payment
    Monthly,
}

impl CompoundingConvention {
    /// periodic rate for the given payment count per year
    pub fn periodic_rate(&self, nominal_annual: Rate, periods_per_year: u32) -> Result<Rate> {
        match self {
            CompoundingConvention::SemiAnnual => effective_periodic_rate(nominal_annual, periods_per_year),
            CompoundingConvention::Monthly => {
                validate_rate_inputs(nominal_annual, periods_per_year)?;
                Ok(Rate::from_decimal(nominal_annual.as_decimal() / Decimal::from(periods_per_year)))
            }
        }
    }
}

/// effective rate per payment for a nominal annual rate compounded semi-annually:
/// (1 + nominal/2)^(2/periods) - 1
pub fn effective_periodic_rate(nominal_annual: Rate, periods_per_year: u32) -> Result<Rate> {
    validate_rate_inputs(nominal_annual, periods_per_year)?;

    if nominal_annual.is_zero() {
        return Ok(Rate::ZERO);
    }

    let half_year_factor = Decimal::ONE + nominal_annual.as_decimal() / dec!(2);
    let annual_factor = half_year_factor
        .checked_mul(half_year_factor)
        .ok_or_else(|| MortgageError::overflow(format!("annual factor for {}", nominal_annual)))?;

    let periodic_factor = match periods_per_year {
        1 => annual_factor,
        2 => half_year_factor,
        n => nth_root(annual_factor, n).ok_or_else(|| MortgageError::CalculationError {
            message: format!("periodic rate for {} did not converge at {} periods", nominal_annual, n),
        })?,
    };

    Ok(Rate::from_decimal(periodic_factor - Decimal::ONE))
}

/// annual effective rate implied by compounding a periodic rate
pub fn effective_annual_rate(periodic: Rate, periods_per_year: u32) -> Result<Rate> {
    let factor = pow_u32(Decimal::ONE + periodic.as_decimal(), periods_per_year)
        .ok_or_else(|| MortgageError::overflow(format!("compounding {} over {} periods", periodic, periods_per_year)))?;
    Ok(Rate::from_decimal(factor - Decimal::ONE))
}

fn validate_rate_inputs(nominal_annual: Rate, periods_per_year: u32) -> Result<()> {
    if nominal_annual.is_negative() {
        return Err(MortgageError::invalid(
            "nominal_annual_rate",
            format!("must not be negative, got {}", nominal_annual),
        ));
    }
    if periods_per_year == 0 {
        return Err(MortgageError::invalid("periods_per_year", "must be greater than zero"));
    }
    Ok(())
}
