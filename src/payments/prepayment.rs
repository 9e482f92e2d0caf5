use log::{debug, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::PrepaymentPolicy;
use crate::decimal::{Money, Rate};
use crate::errors::{ensure_non_negative, ensure_positive, MortgageError, Result};
use crate::interest::CompoundingConvention;
use crate::types::PaymentFrequency;

use super::amortization::AmortizationSchedule;
use super::periodic_payment;

/// residual balance treated as fully repaid
const BALANCE_EPSILON: Money = Money::from_cents_const(1);

/// prepayment scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrepaymentInput {
    pub principal: Money,
    pub annual_rate: Rate,
    pub amortization_years: u32,
    #[serde(default)]
    pub frequency: PaymentFrequency,
    /// lump sum paid once a year
    #[serde(default)]
    pub annual_lump_sum: Money,
    /// payment within each year the lump sum lands on, 1-based
    #[serde(default = "default_lump_sum_period")]
    pub lump_sum_period: u32,
    /// extra amount added to every regular payment
    #[serde(default)]
    pub payment_increase: Money,
}

fn default_lump_sum_period() -> u32 {
    1
}

/// outcome of a prepayment simulation against the base schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrepaymentResult {
    pub regular_payment: Money,
    pub applied_payment_increase: Money,
    pub applied_annual_lump_sum: Money,
    pub payment_increase_capped: bool,
    pub lump_sum_capped: bool,
    pub base_periods: u32,
    pub base_total_interest: Money,
    pub periods_to_payoff: u32,
    pub total_interest: Money,
    pub total_prepaid: Money,
    pub interest_saved: Money,
    pub periods_saved: u32,
    /// time saved expressed in years
    pub years_saved: Decimal,
    pub paid_off: bool,
}

/// simulates lump sums and payment increases within lender privileges
pub struct PrepaymentSimulator {
    policy: PrepaymentPolicy,
    convention: CompoundingConvention,
}

impl PrepaymentSimulator {
    pub fn new(policy: PrepaymentPolicy, convention: CompoundingConvention) -> Self {
        Self { policy, convention }
    }

    /// run the scenario period by period until the balance is retired
    pub fn simulate(&self, input: &PrepaymentInput) -> Result<PrepaymentResult> {
        ensure_positive("principal", input.principal)?;
        ensure_non_negative("annual_lump_sum", input.annual_lump_sum)?;
        ensure_non_negative("payment_increase", input.payment_increase)?;

        let periods_per_year = input.frequency.periods_per_year();
        if input.lump_sum_period == 0 || input.lump_sum_period > periods_per_year {
            return Err(MortgageError::invalid(
                "lump_sum_period",
                format!("must be between 1 and {}", periods_per_year),
            ));
        }

        let regular_payment = periodic_payment(
            input.principal,
            input.annual_rate,
            input.amortization_years,
            input.frequency,
            self.convention,
        )?;
        let base = AmortizationSchedule::with_convention(
            input.principal,
            input.annual_rate,
            input.amortization_years,
            periods_per_year,
            regular_payment,
            self.convention,
        )?;
        let base_summary = base.summary();
        let periodic_rate = base.periodic_rate();

        let (applied_payment_increase, payment_increase_capped) = cap(
            input.payment_increase,
            regular_payment * self.policy.payment_increase_limit,
            "payment increase",
        );
        let (applied_annual_lump_sum, lump_sum_capped) = cap(
            input.annual_lump_sum,
            input.principal * self.policy.lump_sum_limit,
            "annual lump sum",
        );

        let iteration_cap = base.total_periods().saturating_mul(self.policy.iteration_cap_multiplier);
        let payment = regular_payment + applied_payment_increase;

        let mut balance = input.principal;
        let mut period = 0;
        let mut total_interest = Money::ZERO;
        let mut total_prepaid = Money::ZERO;

        while balance.is_positive() && period < iteration_cap {
            period += 1;

            let interest = balance * periodic_rate;
            let due = payment.min(balance + interest);
            total_interest += interest;
            balance = (balance + interest - due).non_negative();
            if balance < BALANCE_EPSILON {
                balance = Money::ZERO;
            }

            let extra = due - regular_payment.min(due);
            total_prepaid += extra;

            if balance.is_positive() && (period - 1) % periods_per_year + 1 == input.lump_sum_period {
                let lump = applied_annual_lump_sum.min(balance);
                balance -= lump;
                total_prepaid += lump;
            }
        }

        let paid_off = !balance.is_positive();
        if !paid_off {
            warn!("prepayment simulation hit the {} period cap with {} outstanding", iteration_cap, balance);
        }

        let periods_saved = base_summary.payoff_period.saturating_sub(period);
        debug!(
            "prepayment: payoff in {} periods vs {}, interest saved {}",
            period,
            base_summary.payoff_period,
            base_summary.total_interest - total_interest
        );

        Ok(PrepaymentResult {
            regular_payment,
            applied_payment_increase,
            applied_annual_lump_sum,
            payment_increase_capped,
            lump_sum_capped,
            base_periods: base_summary.payoff_period,
            base_total_interest: base_summary.total_interest,
            periods_to_payoff: period,
            total_interest,
            total_prepaid,
            interest_saved: (base_summary.total_interest - total_interest).non_negative(),
            periods_saved,
            years_saved: (Decimal::from(periods_saved) / Decimal::from(periods_per_year)).round_dp(2),
            paid_off,
        })
    }
}

/// clamp to the privilege limit, reporting whether clamping happened
fn cap(requested: Money, limit: Money, what: &str) -> (Money, bool) {
    if requested > limit {
        warn!("{} of {} exceeds prepayment privilege, capped at {}", what, requested, limit);
        (limit, true)
    } else {
        (requested, false)
    }
}
