use log::warn;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::LendingPolicy;
use crate::decimal::{Money, Rate};
use crate::errors::{ensure_non_negative, ensure_positive, MortgageError, Result};
use crate::payments::{calculate_payment, total_payments};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HelocInput {
    pub home_value: Money,
    #[serde(default)]
    pub mortgage_balance: Money,
    pub draw_amount: Money,
    pub annual_rate: Rate,
    /// repayment period for the principal and interest payment
    pub repayment_years: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HelocResult {
    pub credit_limit: Money,
    pub available_equity: Money,
    /// draw after clamping to the credit limit
    pub draw_amount: Money,
    pub draw_capped: bool,
    pub interest_only_payment: Money,
    pub amortized_payment: Money,
    pub combined_ltv: Rate,
}

/// home equity line of credit calculator
pub struct HelocCalculator<'a> {
    policy: &'a LendingPolicy,
}

impl<'a> HelocCalculator<'a> {
    pub fn new(policy: &'a LendingPolicy) -> Self {
        Self { policy }
    }

    /// credit limit is the lower of the combined and revolving caps
    pub fn credit_limit(&self, home_value: Money, mortgage_balance: Money) -> Money {
        let combined = home_value * self.policy.heloc.max_combined_ltv - mortgage_balance;
        let revolving = home_value * self.policy.heloc.max_revolving_ltv;
        combined.min(revolving).non_negative()
    }

    pub fn calculate(&self, input: &HelocInput) -> Result<HelocResult> {
        ensure_positive("home_value", input.home_value)?;
        ensure_non_negative("mortgage_balance", input.mortgage_balance)?;
        ensure_non_negative("draw_amount", input.draw_amount)?;
        if input.annual_rate.is_negative() {
            return Err(MortgageError::invalid("annual_rate", "must not be negative"));
        }
        if input.repayment_years == 0 {
            return Err(MortgageError::invalid("repayment_years", "must be greater than zero"));
        }

        let credit_limit = self.credit_limit(input.home_value, input.mortgage_balance);
        let draw_capped = input.draw_amount > credit_limit;
        if draw_capped {
            warn!("heloc draw {} exceeds credit limit {}, clamping", input.draw_amount, credit_limit);
        }
        let draw_amount = input.draw_amount.min(credit_limit);

        // interest-only is simple monthly interest on the drawn balance
        let interest_only_payment = draw_amount * input.annual_rate / Decimal::from(12);
        let monthly_rate = self.policy.compounding.periodic_rate(input.annual_rate, 12)?;
        let amortized_payment = calculate_payment(
            draw_amount,
            monthly_rate,
            total_payments("repayment_years", input.repayment_years, 12)?,
        )?;

        let combined_ltv = Rate::from_decimal(
            (input.mortgage_balance + draw_amount).as_decimal() / input.home_value.as_decimal(),
        );

        Ok(HelocResult {
            credit_limit,
            available_equity: (input.home_value - input.mortgage_balance).non_negative(),
            draw_amount,
            draw_capped,
            interest_only_payment,
            amortized_payment,
            combined_ltv,
        })
    }
}
