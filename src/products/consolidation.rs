use log::{debug, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::LendingPolicy;
use crate::decimal::{Money, Rate};
use crate::errors::{ensure_non_negative, ensure_positive, MortgageError, Result};
use crate::payments::{calculate_payment, total_payments};

/// a debt rolled into the mortgage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedDebt {
    #[serde(default)]
    pub name: String,
    pub balance: Money,
    pub monthly_payment: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidationInput {
    pub home_value: Money,
    pub mortgage_balance: Money,
    pub mortgage_rate: Rate,
    pub remaining_amortization_years: u32,
    /// rate on the consolidated mortgage, defaults to `mortgage_rate`
    #[serde(default)]
    pub new_rate: Option<Rate>,
    pub new_amortization_years: u32,
    pub annual_income: Money,
    pub debts: Vec<ConsolidatedDebt>,
    /// obligations that stay outside the mortgage
    #[serde(default)]
    pub other_monthly_debts: Money,
    #[serde(default)]
    pub property_tax_annual: Money,
    #[serde(default)]
    pub monthly_heating: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidationResult {
    pub available_equity: Money,
    pub total_debt_balance: Money,
    /// equity covers every debt being consolidated
    pub feasible: bool,
    pub current_mortgage_payment: Money,
    pub current_debt_payments: Money,
    pub new_mortgage_balance: Money,
    pub new_mortgage_payment: Money,
    pub monthly_savings: Money,
    pub tds_before: Rate,
    pub tds_after: Rate,
    pub max_tds: Rate,
    pub within_tds_limit: bool,
}

/// rolls unsecured debt into a refinanced mortgage
pub struct DebtConsolidationCalculator<'a> {
    policy: &'a LendingPolicy,
}

impl<'a> DebtConsolidationCalculator<'a> {
    pub fn new(policy: &'a LendingPolicy) -> Self {
        Self { policy }
    }

    /// equity that can be borrowed against, floored at zero
    pub fn available_equity(&self, home_value: Money, mortgage_balance: Money) -> Money {
        (home_value * self.policy.consolidation.max_ltv - mortgage_balance).non_negative()
    }

    pub fn calculate(&self, input: &ConsolidationInput) -> Result<ConsolidationResult> {
        ensure_positive("home_value", input.home_value)?;
        ensure_positive("annual_income", input.annual_income)?;
        ensure_non_negative("mortgage_balance", input.mortgage_balance)?;
        ensure_non_negative("other_monthly_debts", input.other_monthly_debts)?;
        ensure_non_negative("property_tax_annual", input.property_tax_annual)?;
        ensure_non_negative("monthly_heating", input.monthly_heating)?;
        for debt in &input.debts {
            ensure_non_negative("debts.balance", debt.balance)?;
            ensure_non_negative("debts.monthly_payment", debt.monthly_payment)?;
        }
        if input.remaining_amortization_years == 0 || input.new_amortization_years == 0 {
            return Err(MortgageError::invalid("amortization_years", "must be greater than zero"));
        }

        let available_equity = self.available_equity(input.home_value, input.mortgage_balance);
        let total_debt_balance: Money = input.debts.iter().map(|d| d.balance).sum();
        let current_debt_payments: Money = input.debts.iter().map(|d| d.monthly_payment).sum();
        let feasible = available_equity >= total_debt_balance;
        if !feasible {
            warn!(
                "debts of {} exceed available equity {}, consolidation not feasible",
                total_debt_balance, available_equity
            );
        }

        let convention = self.policy.compounding;
        let current_mortgage_payment = calculate_payment(
            input.mortgage_balance,
            convention.periodic_rate(input.mortgage_rate, 12)?,
            total_payments("remaining_amortization_years", input.remaining_amortization_years, 12)?,
        )?;

        let new_mortgage_balance = input.mortgage_balance + total_debt_balance;
        let new_rate = input.new_rate.unwrap_or(input.mortgage_rate);
        let new_mortgage_payment = calculate_payment(
            new_mortgage_balance,
            convention.periodic_rate(new_rate, 12)?,
            total_payments("new_amortization_years", input.new_amortization_years, 12)?,
        )?;

        let fixed_costs = input.property_tax_annual / Decimal::from(12) + input.monthly_heating + input.other_monthly_debts;
        let monthly_income = input.annual_income / Decimal::from(12);
        let tds = |obligations: Money| Rate::from_decimal(obligations.as_decimal() / monthly_income.as_decimal());

        let tds_before = tds(current_mortgage_payment + current_debt_payments + fixed_costs);
        let tds_after = tds(new_mortgage_payment + fixed_costs);
        let max_tds = self.policy.consolidation.max_tds;

        let monthly_savings = current_mortgage_payment + current_debt_payments - new_mortgage_payment;

        debug!(
            "consolidating {} into mortgage: tds {} -> {}, savings {}",
            total_debt_balance, tds_before, tds_after, monthly_savings
        );

        Ok(ConsolidationResult {
            available_equity,
            total_debt_balance,
            feasible,
            current_mortgage_payment,
            current_debt_payments,
            new_mortgage_balance,
            new_mortgage_payment,
            monthly_savings,
            tds_before,
            tds_after,
            max_tds,
            within_tds_limit: tds_after <= max_tds,
        })
    }
}
