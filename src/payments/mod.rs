pub mod amortization;
pub mod prepayment;

use rust_decimal::Decimal;

use crate::decimal::{pow_u32, Money, Rate};
use crate::errors::{MortgageError, Result};
use crate::interest::CompoundingConvention;
use crate::types::PaymentFrequency;

pub use amortization::{generate_schedule, AmortizationRow, AmortizationSchedule, ScheduleIter, ScheduleSummary};
pub use prepayment::{PrepaymentInput, PrepaymentResult, PrepaymentSimulator};

/// number of payments in `years` at `periods_per_year`, rejecting lengths past `u32`
pub(crate) fn total_payments(field: &str, years: u32, periods_per_year: u32) -> Result<u32> {
    years
        .checked_mul(periods_per_year)
        .ok_or_else(|| MortgageError::invalid(field, format!("{} years is too long a schedule", years)))
}

/// level payment that retires `principal` over `number_of_payments` at `periodic_rate`
///
/// payment = P * r / (1 - (1 + r)^-n), or P / n when the rate is zero
pub fn calculate_payment(principal: Money, periodic_rate: Rate, number_of_payments: u32) -> Result<Money> {
    if number_of_payments == 0 {
        return Err(MortgageError::invalid("number_of_payments", "must be greater than zero"));
    }
    if principal.is_negative() {
        return Err(MortgageError::invalid("principal", "must not be negative"));
    }
    if periodic_rate.is_negative() {
        return Err(MortgageError::invalid("periodic_rate", "must not be negative"));
    }

    if principal.is_zero() {
        return Ok(Money::ZERO);
    }

    if periodic_rate.is_zero() {
        return Ok(principal / Decimal::from(number_of_payments));
    }

    // P * r * (1 + r)^n / ((1 + r)^n - 1)
    let r = periodic_rate.as_decimal();
    let compound = compound_factor(r, number_of_payments)?;
    let denominator = compound - Decimal::ONE;
    if denominator.is_zero() {
        return Ok(principal / Decimal::from(number_of_payments));
    }

    principal
        .as_decimal()
        .checked_mul(r)
        .and_then(|scaled| scaled.checked_mul(compound))
        .and_then(|numerator| numerator.checked_div(denominator))
        .map(Money::from_decimal)
        .ok_or_else(|| MortgageError::overflow(format!("payment on {} over {} periods", principal, number_of_payments)))
}

/// principal a level payment can retire, the inverse of `calculate_payment`
pub fn present_value(payment: Money, periodic_rate: Rate, number_of_payments: u32) -> Result<Money> {
    if number_of_payments == 0 {
        return Err(MortgageError::invalid("number_of_payments", "must be greater than zero"));
    }
    if payment.is_negative() {
        return Err(MortgageError::invalid("payment", "must not be negative"));
    }
    if periodic_rate.is_negative() {
        return Err(MortgageError::invalid("periodic_rate", "must not be negative"));
    }

    if periodic_rate.is_zero() {
        return Ok(payment * Decimal::from(number_of_payments));
    }

    // A * ((1 + r)^n - 1) / (r * (1 + r)^n)
    let r = periodic_rate.as_decimal();
    let compound = compound_factor(r, number_of_payments)?;
    r.checked_mul(compound)
        .and_then(|denominator| {
            payment
                .as_decimal()
                .checked_mul(compound - Decimal::ONE)?
                .checked_div(denominator)
        })
        .map(Money::from_decimal)
        .ok_or_else(|| MortgageError::overflow(format!("present value of {} over {} periods", payment, number_of_payments)))
}

/// (1 + r)^n
fn compound_factor(r: Decimal, number_of_payments: u32) -> Result<Decimal> {
    pow_u32(Decimal::ONE + r, number_of_payments)
        .ok_or_else(|| MortgageError::overflow(format!("compounding {} over {} periods", r, number_of_payments)))
}

/// regular payment for a mortgage at the given frequency
///
/// accelerated frequencies pay the monthly amount split in two or four
pub fn periodic_payment(
    principal: Money,
    annual_rate: Rate,
    amortization_years: u32,
    frequency: PaymentFrequency,
    convention: CompoundingConvention,
) -> Result<Money> {
    if amortization_years == 0 {
        return Err(MortgageError::invalid("amortization_years", "must be greater than zero"));
    }

    match frequency.accelerated_divisor() {
        Some(divisor) => {
            let monthly_rate = convention.periodic_rate(annual_rate, 12)?;
            let months = total_payments("amortization_years", amortization_years, 12)?;
            let monthly = calculate_payment(principal, monthly_rate, months)?;
            Ok(monthly / Decimal::from(divisor))
        }
        None => {
            let periods = frequency.periods_per_year();
            let rate = convention.periodic_rate(annual_rate, periods)?;
            let count = total_payments("amortization_years", amortization_years, periods)?;
            calculate_payment(principal, rate, count)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interest::effective_periodic_rate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_canadian_monthly_payment() {
        let rate = effective_periodic_rate(Rate::from_percent(dec!(5.5)), 12).unwrap();
        let payment = calculate_payment(Money::from_major(400_000), rate, 300).unwrap();
        assert_eq!(payment.round_dp(2), Money::from_cents(244157));
    }

    #[test]
    fn test_zero_rate_is_straight_line() {
        let payment = calculate_payment(Money::from_major(120_000), Rate::ZERO, 120).unwrap();
        assert_eq!(payment, Money::from_major(1_000));
    }

    #[test]
    fn test_zero_principal() {
        let rate = Rate::from_decimal(dec!(0.004));
        assert_eq!(calculate_payment(Money::ZERO, rate, 300).unwrap(), Money::ZERO);
    }

    #[test]
    fn test_zero_payments_rejected() {
        let result = calculate_payment(Money::from_major(1_000), Rate::ZERO, 0);
        assert!(matches!(result, Err(MortgageError::InvalidInput { .. })));
    }

    #[test]
    fn test_extreme_rate_is_a_calculation_error() {
        // a 23% monthly rate compounded over 360 months leaves the decimal range
        let rate = Rate::from_decimal(dec!(0.23219));
        assert!(matches!(
            calculate_payment(Money::from_major(100_000), rate, 360),
            Err(MortgageError::CalculationError { .. })
        ));
        assert!(matches!(
            present_value(Money::from_major(1_000), rate, 360),
            Err(MortgageError::CalculationError { .. })
        ));
    }

    #[test]
    fn test_schedule_length_overflow_rejected() {
        let result = periodic_payment(
            Money::from_major(400_000),
            Rate::from_percent(dec!(5.5)),
            400_000_000,
            PaymentFrequency::Weekly,
            CompoundingConvention::SemiAnnual,
        );
        assert!(matches!(result, Err(MortgageError::InvalidInput { .. })));
        assert_eq!(total_payments("years", 25, 12).unwrap(), 300);
    }

    #[test]
    fn test_present_value_inverts_payment() {
        let rate = effective_periodic_rate(Rate::from_percent(dec!(6.0)), 12).unwrap();
        let payment = calculate_payment(Money::from_major(750_000), rate, 300).unwrap();
        let principal = present_value(payment, rate, 300).unwrap();
        assert!((principal - Money::from_major(750_000)).abs() < Money::from_cents(1));

        assert_eq!(present_value(Money::from_major(100), Rate::ZERO, 12).unwrap(), Money::from_major(1_200));
    }

    #[test]
    fn test_accelerated_bi_weekly_is_half_monthly() {
        let principal = Money::from_major(400_000);
        let rate = Rate::from_percent(dec!(5.5));
        let convention = CompoundingConvention::SemiAnnual;

        let monthly = periodic_payment(principal, rate, 25, PaymentFrequency::Monthly, convention).unwrap();
        let accelerated =
            periodic_payment(principal, rate, 25, PaymentFrequency::AcceleratedBiWeekly, convention).unwrap();
        let bi_weekly = periodic_payment(principal, rate, 25, PaymentFrequency::BiWeekly, convention).unwrap();

        assert_eq!(accelerated, monthly / dec!(2));
        assert!(accelerated > bi_weekly);
    }
}
