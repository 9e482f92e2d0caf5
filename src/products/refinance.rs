use log::debug;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::LendingPolicy;
use crate::decimal::{Money, Rate};
use crate::errors::{ensure_non_negative, ensure_positive, MortgageError, Result};
use crate::payments::{calculate_payment, total_payments};
use crate::types::MortgageType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefinanceInput {
    pub current_balance: Money,
    pub current_rate: Rate,
    #[serde(default)]
    pub mortgage_type: MortgageType,
    /// months left in the current term, drives the rate differential
    pub months_remaining_in_term: u32,
    /// years left on the current amortization
    pub remaining_amortization_years: u32,
    /// lender rate for a term matching the remaining months, defaults to `new_rate`
    #[serde(default)]
    pub comparison_rate: Option<Rate>,
    pub new_rate: Rate,
    pub new_amortization_years: u32,
    /// legal, appraisal and discharge fees
    #[serde(default)]
    pub refinance_fees: Money,
}

/// which rule set the prepayment penalty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PenaltyMethod {
    MonthsInterest,
    InterestRateDifferential,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PenaltyCalculation {
    pub months_interest: Money,
    pub interest_rate_differential: Money,
    pub penalty: Money,
    pub method: PenaltyMethod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefinanceResult {
    pub penalty: PenaltyCalculation,
    pub current_payment: Money,
    pub new_payment: Money,
    /// negative when the new payment is higher
    pub monthly_savings: Money,
    pub total_cost: Money,
    /// months of savings needed to recover the cost, `None` without savings
    pub break_even_months: Option<u32>,
}

/// break-mortgage penalty and refinance payback calculator
pub struct RefinanceCalculator<'a> {
    policy: &'a LendingPolicy,
}

impl<'a> RefinanceCalculator<'a> {
    pub fn new(policy: &'a LendingPolicy) -> Self {
        Self { policy }
    }

    /// fixed mortgages pay the greater of months' interest and the rate differential,
    /// variable mortgages pay months' interest only
    pub fn penalty(
        &self,
        balance: Money,
        contract_rate: Rate,
        comparison_rate: Rate,
        months_remaining: u32,
        mortgage_type: MortgageType,
    ) -> PenaltyCalculation {
        let months = Decimal::from(self.policy.refinance.penalty_months_interest);
        let months_interest = balance * contract_rate * (months / Decimal::from(12));

        let differential = (contract_rate - comparison_rate).max(Rate::ZERO);
        let interest_rate_differential =
            balance * differential * (Decimal::from(months_remaining) / Decimal::from(12));

        let (penalty, method) = match mortgage_type {
            MortgageType::Variable => (months_interest, PenaltyMethod::MonthsInterest),
            MortgageType::Fixed if interest_rate_differential > months_interest => {
                (interest_rate_differential, PenaltyMethod::InterestRateDifferential)
            }
            MortgageType::Fixed => (months_interest, PenaltyMethod::MonthsInterest),
        };

        PenaltyCalculation {
            months_interest,
            interest_rate_differential,
            penalty,
            method,
        }
    }

    pub fn calculate(&self, input: &RefinanceInput) -> Result<RefinanceResult> {
        ensure_positive("current_balance", input.current_balance)?;
        ensure_non_negative("refinance_fees", input.refinance_fees)?;
        for (field, rate) in [("current_rate", input.current_rate), ("new_rate", input.new_rate)] {
            if rate.is_negative() {
                return Err(MortgageError::invalid(field, "must not be negative"));
            }
        }
        if input.remaining_amortization_years == 0 || input.new_amortization_years == 0 {
            return Err(MortgageError::invalid("amortization_years", "must be greater than zero"));
        }

        let comparison_rate = input.comparison_rate.unwrap_or(input.new_rate);
        let penalty = self.penalty(
            input.current_balance,
            input.current_rate,
            comparison_rate,
            input.months_remaining_in_term,
            input.mortgage_type,
        );

        let convention = self.policy.compounding;
        let current_payment = calculate_payment(
            input.current_balance,
            convention.periodic_rate(input.current_rate, 12)?,
            total_payments("remaining_amortization_years", input.remaining_amortization_years, 12)?,
        )?;
        let new_payment = calculate_payment(
            input.current_balance,
            convention.periodic_rate(input.new_rate, 12)?,
            total_payments("new_amortization_years", input.new_amortization_years, 12)?,
        )?;

        let monthly_savings = current_payment - new_payment;
        let total_cost = penalty.penalty + input.refinance_fees;
        let break_even_months = if monthly_savings.is_positive() {
            (total_cost.as_decimal() / monthly_savings.as_decimal()).ceil().to_u32()
        } else {
            None
        };

        debug!(
            "refinance penalty {} ({:?}), savings {} per month",
            penalty.penalty, penalty.method, monthly_savings
        );

        Ok(RefinanceResult {
            penalty,
            current_payment,
            new_payment,
            monthly_savings,
            total_cost,
            break_even_months,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn input(mortgage_type: MortgageType) -> RefinanceInput {
        RefinanceInput {
            current_balance: Money::from_major(400_000),
            current_rate: Rate::from_percent(dec!(5.5)),
            mortgage_type,
            months_remaining_in_term: 36,
            remaining_amortization_years: 22,
            comparison_rate: Some(Rate::from_percent(dec!(3.5))),
            new_rate: Rate::from_percent(dec!(4.0)),
            new_amortization_years: 22,
            refinance_fees: Money::from_major(2_000),
        }
    }

    #[test]
    fn test_fixed_uses_rate_differential() {
        let policy = LendingPolicy::default();
        let result = RefinanceCalculator::new(&policy).calculate(&input(MortgageType::Fixed)).unwrap();

        assert_eq!(result.penalty.months_interest, Money::from_major(5_500));
        assert_eq!(result.penalty.interest_rate_differential, Money::from_major(24_000));
        assert_eq!(result.penalty.penalty, Money::from_major(24_000));
        assert_eq!(result.penalty.method, PenaltyMethod::InterestRateDifferential);
        assert_eq!(result.total_cost, Money::from_major(26_000));
    }

    #[test]
    fn test_variable_uses_months_interest() {
        let policy = LendingPolicy::default();
        let result = RefinanceCalculator::new(&policy).calculate(&input(MortgageType::Variable)).unwrap();

        assert_eq!(result.penalty.penalty, Money::from_major(5_500));
        assert_eq!(result.penalty.method, PenaltyMethod::MonthsInterest);
    }

    #[test]
    fn test_fixed_falls_back_to_months_interest() {
        let policy = LendingPolicy::default();
        let penalty = RefinanceCalculator::new(&policy).penalty(
            Money::from_major(400_000),
            Rate::from_percent(dec!(5.5)),
            Rate::from_percent(dec!(5.25)),
            6,
            MortgageType::Fixed,
        );
        // differential 0.25% over six months is 500
        assert_eq!(penalty.interest_rate_differential, Money::from_major(500));
        assert_eq!(penalty.penalty, Money::from_major(5_500));
        assert_eq!(penalty.method, PenaltyMethod::MonthsInterest);
    }

    #[test]
    fn test_break_even() {
        let policy = LendingPolicy::default();
        let result = RefinanceCalculator::new(&policy).calculate(&input(MortgageType::Fixed)).unwrap();

        assert!(result.monthly_savings.is_positive());
        assert_eq!(result.monthly_savings, result.current_payment - result.new_payment);
        let expected = (dec!(26000) / result.monthly_savings.as_decimal()).ceil().to_u32();
        assert_eq!(result.break_even_months, expected);
    }

    #[test]
    fn test_no_break_even_without_savings() {
        let mut scenario = input(MortgageType::Fixed);
        scenario.new_rate = Rate::from_percent(dec!(6.5));

        let policy = LendingPolicy::default();
        let result = RefinanceCalculator::new(&policy).calculate(&scenario).unwrap();
        assert!(result.monthly_savings.is_negative());
        assert_eq!(result.break_even_months, None);
    }
}
