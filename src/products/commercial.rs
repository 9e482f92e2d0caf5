use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::LendingPolicy;
use crate::decimal::{Money, Rate};
use crate::errors::{ensure_non_negative, ensure_positive, MortgageError, Result};
use crate::payments::{calculate_payment, present_value, total_payments};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommercialInput {
    pub property_value: Money,
    /// annual net operating income
    pub net_operating_income: Money,
    pub annual_rate: Rate,
    pub amortization_years: u32,
    /// loan to test, defaults to the maximum supportable loan
    #[serde(default)]
    pub requested_amount: Option<Money>,
}

/// constraint that sets the maximum loan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingConstraint {
    LoanToValue,
    DebtServiceCoverage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommercialResult {
    pub ltv_limit: Money,
    pub dscr_limit: Money,
    pub max_loan: Money,
    pub binding_constraint: BindingConstraint,
    pub loan_amount: Money,
    pub monthly_payment: Money,
    pub annual_debt_service: Money,
    /// noi over annual debt service, 125% reads as 1.25x
    pub debt_service_coverage: Option<Rate>,
    pub loan_to_value: Rate,
    pub within_limits: bool,
}

/// income property sizing by loan-to-value and debt service coverage
pub struct CommercialMortgageCalculator<'a> {
    policy: &'a LendingPolicy,
}

impl<'a> CommercialMortgageCalculator<'a> {
    pub fn new(policy: &'a LendingPolicy) -> Self {
        Self { policy }
    }

    pub fn calculate(&self, input: &CommercialInput) -> Result<CommercialResult> {
        ensure_positive("property_value", input.property_value)?;
        ensure_non_negative("net_operating_income", input.net_operating_income)?;
        if input.annual_rate.is_negative() {
            return Err(MortgageError::invalid("annual_rate", "must not be negative"));
        }
        if input.amortization_years == 0 {
            return Err(MortgageError::invalid("amortization_years", "must be greater than zero"));
        }
        if let Some(requested) = input.requested_amount {
            ensure_non_negative("requested_amount", requested)?;
        }

        let commercial = &self.policy.commercial;
        if commercial.min_dscr.is_zero() || commercial.min_dscr.is_negative() {
            return Err(MortgageError::InvalidConfiguration {
                message: "commercial.min_dscr must be greater than zero".to_string(),
            });
        }
        let monthly_rate = self.policy.compounding.periodic_rate(input.annual_rate, 12)?;
        let number_of_payments = total_payments("amortization_years", input.amortization_years, 12)?;

        let ltv_limit = input.property_value * commercial.max_ltv;
        let max_monthly_service = input.net_operating_income / commercial.min_dscr.as_decimal() / Decimal::from(12);
        let dscr_limit = present_value(max_monthly_service, monthly_rate, number_of_payments)?;

        let (max_loan, binding_constraint) = if dscr_limit < ltv_limit {
            (dscr_limit, BindingConstraint::DebtServiceCoverage)
        } else {
            (ltv_limit, BindingConstraint::LoanToValue)
        };

        let loan_amount = input.requested_amount.unwrap_or(max_loan);
        let monthly_payment = calculate_payment(loan_amount, monthly_rate, number_of_payments)?;
        let annual_debt_service = monthly_payment * Decimal::from(12);
        let debt_service_coverage = input.net_operating_income.ratio_to(annual_debt_service);
        let loan_to_value = Rate::from_decimal(loan_amount.as_decimal() / input.property_value.as_decimal());

        let within_limits = loan_amount <= max_loan;

        debug!(
            "commercial loan {} against max {} ({:?}), dscr {:?}",
            loan_amount, max_loan, binding_constraint, debt_service_coverage
        );

        Ok(CommercialResult {
            ltv_limit,
            dscr_limit,
            max_loan,
            binding_constraint,
            loan_amount,
            monthly_payment,
            annual_debt_service,
            debt_service_coverage,
            loan_to_value,
            within_limits,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn input(noi: i64, requested: Option<Money>) -> CommercialInput {
        CommercialInput {
            property_value: Money::from_major(2_000_000),
            net_operating_income: Money::from_major(noi),
            annual_rate: Rate::from_percent(dec!(6.0)),
            amortization_years: 25,
            requested_amount: requested,
        }
    }

    #[test]
    fn test_ltv_binds_with_strong_income() {
        let policy = LendingPolicy::default();
        let result = CommercialMortgageCalculator::new(&policy).calculate(&input(400_000, None)).unwrap();

        assert_eq!(result.ltv_limit, Money::from_major(1_500_000));
        assert_eq!(result.binding_constraint, BindingConstraint::LoanToValue);
        assert_eq!(result.max_loan, Money::from_major(1_500_000));
        assert_eq!(result.loan_to_value, Rate::from_percent(dec!(75)));
        assert!(result.debt_service_coverage.unwrap() > Rate::from_percent(dec!(125)));
        assert!(result.within_limits);
    }

    #[test]
    fn test_dscr_binds_with_weak_income() {
        let policy = LendingPolicy::default();
        let result = CommercialMortgageCalculator::new(&policy).calculate(&input(120_000, None)).unwrap();

        assert_eq!(result.binding_constraint, BindingConstraint::DebtServiceCoverage);
        assert!(result.max_loan < result.ltv_limit);
        // coverage at the maximum loan sits on the 1.25x floor
        let dscr = result.debt_service_coverage.unwrap().as_decimal();
        assert!((dscr - dec!(1.25)).abs() < dec!(0.0001));
    }

    #[test]
    fn test_requested_amount_over_limit() {
        let policy = LendingPolicy::default();
        let result = CommercialMortgageCalculator::new(&policy)
            .calculate(&input(400_000, Some(Money::from_major(1_700_000))))
            .unwrap();

        assert_eq!(result.loan_amount, Money::from_major(1_700_000));
        assert!(!result.within_limits);
    }

    #[test]
    fn test_oversized_amortization_rejected() {
        let policy = LendingPolicy::default();
        let mut scenario = input(400_000, None);
        scenario.amortization_years = u32::MAX;
        assert!(matches!(
            CommercialMortgageCalculator::new(&policy).calculate(&scenario),
            Err(MortgageError::InvalidInput { ref field, .. }) if field == "amortization_years"
        ));
    }
}
