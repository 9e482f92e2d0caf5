use log::{debug, trace};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::LendingPolicy;
use crate::decimal::{Money, Rate};
use crate::errors::{ensure_non_negative, ensure_positive, MortgageError, Result};
use crate::insurance::meets_minimum;
use crate::qualification::ratios::{DebtServiceCalculator, QualificationInput, QualificationResult};

/// borrower figures for a maximum purchase price search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffordabilityInput {
    pub annual_income: Money,
    #[serde(default)]
    pub monthly_debts: Money,
    pub down_payment: Money,
    pub contract_rate: Rate,
    pub amortization_years: u32,
    #[serde(default)]
    pub property_tax_annual: Money,
    #[serde(default)]
    pub monthly_heating: Money,
    #[serde(default)]
    pub monthly_condo_fees: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffordabilityResult {
    /// zero when no price in the search range qualifies
    pub max_purchase_price: Money,
    pub max_loan: Money,
    pub iterations: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualification: Option<QualificationResult>,
}

/// bisection over purchase price for the highest price that still qualifies
pub struct AffordabilitySolver<'a> {
    policy: &'a LendingPolicy,
}

impl<'a> AffordabilitySolver<'a> {
    pub fn new(policy: &'a LendingPolicy) -> Self {
        Self { policy }
    }

    pub fn solve(&self, input: &AffordabilityInput) -> Result<AffordabilityResult> {
        ensure_positive("annual_income", input.annual_income)?;
        ensure_non_negative("monthly_debts", input.monthly_debts)?;
        ensure_non_negative("down_payment", input.down_payment)?;
        ensure_non_negative("property_tax_annual", input.property_tax_annual)?;
        ensure_non_negative("monthly_heating", input.monthly_heating)?;
        ensure_non_negative("monthly_condo_fees", input.monthly_condo_fees)?;
        if input.amortization_years == 0 {
            return Err(MortgageError::invalid("amortization_years", "must be greater than zero"));
        }

        let search = &self.policy.affordability;
        // prices at or below the down payment are never feasible, so the search starts above it
        let mut low = search.lower_bound.max(input.down_payment);
        let mut high = search.upper_bound;
        let mut best: Option<(Money, QualificationResult)> = None;
        let mut iterations = 0;

        while iterations < search.max_iterations && high - low >= search.tolerance {
            iterations += 1;
            let candidate = ((low + high) / Decimal::from(2)).round_dp(2);

            match self.evaluate(input, candidate)? {
                Some(qualification) => {
                    trace!("iteration {}: {} qualifies (tds {})", iterations, candidate, qualification.tds_ratio);
                    low = candidate;
                    best = Some((candidate, qualification));
                }
                None => {
                    trace!("iteration {}: {} does not qualify", iterations, candidate);
                    high = candidate;
                }
            }
        }

        let result = match best {
            Some((price, qualification)) => AffordabilityResult {
                max_purchase_price: price,
                max_loan: qualification.total_loan,
                iterations,
                qualification: Some(qualification),
            },
            None => AffordabilityResult {
                max_purchase_price: Money::ZERO,
                max_loan: Money::ZERO,
                iterations,
                qualification: None,
            },
        };

        debug!(
            "affordability search converged after {} iterations: max price {}",
            iterations, result.max_purchase_price
        );

        Ok(result)
    }

    /// qualification at `price` when the purchase is feasible, `None` otherwise
    fn evaluate(&self, input: &AffordabilityInput, price: Money) -> Result<Option<QualificationResult>> {
        if !price.is_positive() {
            return Ok(None);
        }
        if price <= input.down_payment || !meets_minimum(price, input.down_payment, &self.policy.down_payment) {
            return Ok(None);
        }

        let qualification_input = QualificationInput {
            annual_income: input.annual_income,
            monthly_debts: input.monthly_debts,
            property_tax_annual: input.property_tax_annual,
            monthly_heating: input.monthly_heating,
            monthly_condo_fees: input.monthly_condo_fees,
            purchase_price: price,
            down_payment: input.down_payment,
            contract_rate: input.contract_rate,
            amortization_years: input.amortization_years,
        };

        match DebtServiceCalculator::new(self.policy).qualify(&qualification_input) {
            Ok(result) if result.qualifies => Ok(Some(result)),
            Ok(_) => Ok(None),
            Err(MortgageError::IneligibleForInsurance { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// maximum purchase price under the default canadian policy
pub fn solve_max_purchase_price(input: &AffordabilityInput) -> Result<AffordabilityResult> {
    let policy = LendingPolicy::default();
    AffordabilitySolver::new(&policy).solve(input)
}
