use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{MortgageError, Result};

/// payment frequency for a residential mortgage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentFrequency {
    #[default]
    Monthly,
    BiWeekly,
    Weekly,
    /// monthly payment divided by two, paid every two weeks
    AcceleratedBiWeekly,
    /// monthly payment divided by four, paid every week
    AcceleratedWeekly,
}

impl PaymentFrequency {
    /// number of payments per year
    pub fn periods_per_year(&self) -> u32 {
        match self {
            PaymentFrequency::Monthly => 12,
            PaymentFrequency::BiWeekly | PaymentFrequency::AcceleratedBiWeekly => 26,
            PaymentFrequency::Weekly | PaymentFrequency::AcceleratedWeekly => 52,
        }
    }

    /// divisor applied to the monthly payment for accelerated schedules
    pub fn accelerated_divisor(&self) -> Option<u32> {
        match self {
            PaymentFrequency::AcceleratedBiWeekly => Some(2),
            PaymentFrequency::AcceleratedWeekly => Some(4),
            _ => None,
        }
    }

    /// days between payments, `None` for calendar-monthly
    pub fn days_between_payments(&self) -> Option<i64> {
        match self {
            PaymentFrequency::Monthly => None,
            PaymentFrequency::BiWeekly | PaymentFrequency::AcceleratedBiWeekly => Some(14),
            PaymentFrequency::Weekly | PaymentFrequency::AcceleratedWeekly => Some(7),
        }
    }

    /// frequency implied by a bare periods-per-year count
    pub fn from_periods_per_year(periods: u32) -> Option<Self> {
        match periods {
            12 => Some(PaymentFrequency::Monthly),
            26 => Some(PaymentFrequency::BiWeekly),
            52 => Some(PaymentFrequency::Weekly),
            _ => None,
        }
    }
}

/// down payment, given either as a percentage of price or a dollar amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownPayment {
    /// percentage of purchase price (e.g., 20 for 20%)
    Percent(Decimal),
    Amount(Money),
}

impl DownPayment {
    /// resolve to a dollar amount against a purchase price
    pub fn resolve(&self, purchase_price: Money) -> Result<Money> {
        let amount = match self {
            DownPayment::Percent(p) => {
                if *p < Decimal::ZERO || *p > Decimal::from(100) {
                    return Err(MortgageError::invalid(
                        "down_payment",
                        format!("percentage must be between 0 and 100, got {}", p),
                    ));
                }
                purchase_price * Rate::from_percent(*p)
            }
            DownPayment::Amount(a) => *a,
        };

        if amount.is_negative() {
            return Err(MortgageError::invalid("down_payment", "must not be negative"));
        }
        Ok(amount)
    }
}

/// rate type of a mortgage, drives the prepayment penalty rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MortgageType {
    #[default]
    Fixed,
    Variable,
}

/// whether a mortgage carries default insurance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsuranceStatus {
    /// down payment under 20%, premium added to principal
    Insured,
    /// down payment of 20% or more
    Conventional,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_periods_per_year() {
        assert_eq!(PaymentFrequency::Monthly.periods_per_year(), 12);
        assert_eq!(PaymentFrequency::BiWeekly.periods_per_year(), 26);
        assert_eq!(PaymentFrequency::AcceleratedWeekly.periods_per_year(), 52);
        assert_eq!(PaymentFrequency::from_periods_per_year(26), Some(PaymentFrequency::BiWeekly));
        assert_eq!(PaymentFrequency::from_periods_per_year(4), None);
    }

    #[test]
    fn test_down_payment_resolution() {
        let price = Money::from_major(500_000);
        assert_eq!(DownPayment::Percent(dec!(20)).resolve(price).unwrap(), Money::from_major(100_000));
        assert_eq!(
            DownPayment::Amount(Money::from_major(50_000)).resolve(price).unwrap(),
            Money::from_major(50_000)
        );
        assert!(DownPayment::Percent(dec!(120)).resolve(price).is_err());
        assert!(DownPayment::Amount(Money::from_major(-1)).resolve(price).is_err());
    }

    #[test]
    fn test_frequency_serde_names() {
        let json = serde_json::to_string(&PaymentFrequency::AcceleratedBiWeekly).unwrap();
        assert_eq!(json, "\"accelerated_bi_weekly\"");
    }
}
