use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::LendingPolicy;
use crate::decimal::{Money, Rate};
use crate::errors::{ensure_positive, MortgageError, Result};
use crate::insurance::{minimum_down_payment, PremiumCalculator};
use crate::payments::{periodic_payment, AmortizationSchedule};
use crate::types::{DownPayment, InsuranceStatus, PaymentFrequency};

/// longest amortization accepted
const MAX_AMORTIZATION_YEARS: u32 = 30;

/// purchase and loan terms for a residential mortgage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MortgageInputs {
    pub purchase_price: Money,
    pub down_payment: DownPayment,
    /// nominal annual rate, compounded per the policy convention
    pub annual_rate: Rate,
    pub amortization_years: u32,
    #[serde(default)]
    pub frequency: PaymentFrequency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

/// payment and cost breakdown for a purchase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MortgageSummary {
    pub purchase_price: Money,
    pub down_payment: Money,
    pub down_payment_ratio: Rate,
    pub minimum_down_payment: Money,
    pub insurance_status: InsuranceStatus,
    pub insurance_premium: Money,
    /// price less down payment, before the premium
    pub base_loan: Money,
    /// amount amortized, base loan plus premium
    pub total_mortgage: Money,
    pub frequency: PaymentFrequency,
    pub periodic_payment: Money,
    pub number_of_payments: u32,
    pub total_paid: Money,
    pub total_interest: Money,
    /// down payment plus everything paid over the life of the loan
    pub total_cost: Money,
}

impl MortgageSummary {
    /// same figures rounded to whole dollars for display
    pub fn rounded(&self) -> Self {
        Self {
            purchase_price: self.purchase_price.round_whole(),
            down_payment: self.down_payment.round_whole(),
            down_payment_ratio: self.down_payment_ratio.round_dp(4),
            minimum_down_payment: self.minimum_down_payment.round_whole(),
            insurance_status: self.insurance_status,
            insurance_premium: self.insurance_premium.round_whole(),
            base_loan: self.base_loan.round_whole(),
            total_mortgage: self.total_mortgage.round_whole(),
            frequency: self.frequency,
            periodic_payment: self.periodic_payment.round_whole(),
            number_of_payments: self.number_of_payments,
            total_paid: self.total_paid.round_whole(),
            total_interest: self.total_interest.round_whole(),
            total_cost: self.total_cost.round_whole(),
        }
    }
}

/// mortgage payment calculator over a lending policy
pub struct MortgageCalculator<'a> {
    policy: &'a LendingPolicy,
}

impl<'a> MortgageCalculator<'a> {
    pub fn new(policy: &'a LendingPolicy) -> Self {
        Self { policy }
    }

    /// premium, payment and lifetime totals for a purchase
    pub fn calculate(&self, inputs: &MortgageInputs) -> Result<MortgageSummary> {
        let plan = self.plan(inputs)?;
        let schedule = self.build_schedule(inputs, &plan)?;
        let totals = schedule.summary();

        debug!(
            "mortgage of {} at {}: {} x {} over {} payments",
            plan.total_mortgage,
            inputs.annual_rate,
            plan.payment,
            inputs.frequency.periods_per_year(),
            totals.payoff_period
        );

        Ok(MortgageSummary {
            purchase_price: inputs.purchase_price,
            down_payment: plan.down_payment,
            down_payment_ratio: plan.down_payment_ratio,
            minimum_down_payment: plan.minimum_down_payment,
            insurance_status: plan.status,
            insurance_premium: plan.premium,
            base_loan: plan.base_loan,
            total_mortgage: plan.total_mortgage,
            frequency: inputs.frequency,
            periodic_payment: plan.payment,
            number_of_payments: totals.payoff_period,
            total_paid: totals.total_paid,
            total_interest: totals.total_interest,
            total_cost: plan.down_payment + totals.total_paid,
        })
    }

    /// amortization schedule for the purchase, starting on `start_date` when given
    pub fn schedule(&self, inputs: &MortgageInputs) -> Result<AmortizationSchedule> {
        let plan = self.plan(inputs)?;
        self.build_schedule(inputs, &plan)
    }

    fn build_schedule(&self, inputs: &MortgageInputs, plan: &LoanPlan) -> Result<AmortizationSchedule> {
        let schedule = AmortizationSchedule::with_convention(
            plan.total_mortgage,
            inputs.annual_rate,
            inputs.amortization_years,
            inputs.frequency.periods_per_year(),
            plan.payment,
            self.policy.compounding,
        )?;

        Ok(match inputs.start_date {
            Some(date) => schedule.start_date(date),
            None => schedule,
        })
    }

    fn plan(&self, inputs: &MortgageInputs) -> Result<LoanPlan> {
        ensure_positive("purchase_price", inputs.purchase_price)?;
        if inputs.annual_rate.is_negative() {
            return Err(MortgageError::invalid("annual_rate", "must not be negative"));
        }
        if inputs.amortization_years == 0 || inputs.amortization_years > MAX_AMORTIZATION_YEARS {
            return Err(MortgageError::invalid(
                "amortization_years",
                format!("must be between 1 and {}, got {}", MAX_AMORTIZATION_YEARS, inputs.amortization_years),
            ));
        }

        let down_payment = inputs.down_payment.resolve(inputs.purchase_price)?;
        if down_payment >= inputs.purchase_price {
            return Err(MortgageError::invalid(
                "down_payment",
                format!("must be less than the purchase price {}", inputs.purchase_price),
            ));
        }

        let minimum = minimum_down_payment(inputs.purchase_price, &self.policy.down_payment);
        if down_payment < minimum {
            return Err(MortgageError::BelowMinimumDownPayment {
                required: minimum,
                provided: down_payment,
            });
        }

        let quote = PremiumCalculator::new(&self.policy.insurance).quote(inputs.purchase_price, down_payment)?;
        let payment = periodic_payment(
            quote.insured_principal,
            inputs.annual_rate,
            inputs.amortization_years,
            inputs.frequency,
            self.policy.compounding,
        )?;

        Ok(LoanPlan {
            down_payment,
            down_payment_ratio: Rate::ONE - quote.loan_to_value,
            minimum_down_payment: minimum,
            status: quote.status,
            premium: quote.premium,
            base_loan: quote.loan_amount,
            total_mortgage: quote.insured_principal,
            payment,
        })
    }
}

struct LoanPlan {
    down_payment: Money,
    down_payment_ratio: Rate,
    minimum_down_payment: Money,
    status: InsuranceStatus,
    premium: Money,
    base_loan: Money,
    total_mortgage: Money,
    payment: Money,
}

/// mortgage summary under the default canadian policy
pub fn calculate_mortgage(inputs: &MortgageInputs) -> Result<MortgageSummary> {
    let policy = LendingPolicy::default();
    MortgageCalculator::new(&policy).calculate(inputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn inputs(down_payment: DownPayment) -> MortgageInputs {
        MortgageInputs {
            purchase_price: Money::from_major(500_000),
            down_payment,
            annual_rate: Rate::from_percent(dec!(5.5)),
            amortization_years: 25,
            frequency: PaymentFrequency::Monthly,
            start_date: None,
        }
    }

    #[test]
    fn test_conventional_purchase() {
        let summary = calculate_mortgage(&inputs(DownPayment::Percent(dec!(20)))).unwrap();

        assert_eq!(summary.down_payment, Money::from_major(100_000));
        assert_eq!(summary.insurance_status, InsuranceStatus::Conventional);
        assert_eq!(summary.insurance_premium, Money::ZERO);
        assert_eq!(summary.total_mortgage, Money::from_major(400_000));
        assert_eq!(summary.periodic_payment.round_dp(2), Money::from_cents(244157));
        assert_eq!(summary.number_of_payments, 300);
        assert_eq!(summary.total_paid, summary.total_mortgage + summary.total_interest);
        assert_eq!(summary.total_cost, summary.down_payment + summary.total_paid);
    }

    #[test]
    fn test_insured_purchase_adds_premium() {
        let summary = calculate_mortgage(&inputs(DownPayment::Amount(Money::from_major(50_000)))).unwrap();

        assert_eq!(summary.insurance_status, InsuranceStatus::Insured);
        assert_eq!(summary.insurance_premium, Money::from_major(13_950));
        assert_eq!(summary.total_mortgage, Money::from_major(463_950));
        assert_eq!(summary.periodic_payment.round_whole(), Money::from_major(2_832));
    }

    #[test]
    fn test_rounded_view() {
        let summary = calculate_mortgage(&inputs(DownPayment::Percent(dec!(20)))).unwrap();
        let rounded = summary.rounded();
        assert_eq!(rounded.periodic_payment, Money::from_major(2_442));
        assert_eq!(rounded.total_mortgage, summary.total_mortgage);
    }

    #[test]
    fn test_accelerated_pays_off_early() {
        let mut scenario = inputs(DownPayment::Percent(dec!(20)));
        scenario.frequency = PaymentFrequency::AcceleratedBiWeekly;

        let monthly = calculate_mortgage(&inputs(DownPayment::Percent(dec!(20)))).unwrap();
        let accelerated = calculate_mortgage(&scenario).unwrap();

        assert_eq!(accelerated.periodic_payment, monthly.periodic_payment / dec!(2));
        assert!(accelerated.number_of_payments < 25 * 26);
        assert!(accelerated.total_interest < monthly.total_interest);
    }

    #[test]
    fn test_below_minimum_down_payment() {
        let result = calculate_mortgage(&inputs(DownPayment::Amount(Money::from_major(20_000))));
        assert!(matches!(
            result,
            Err(MortgageError::BelowMinimumDownPayment { required, .. }) if required == Money::from_major(25_000)
        ));
    }

    #[test]
    fn test_down_payment_must_be_below_price() {
        let result = calculate_mortgage(&inputs(DownPayment::Percent(dec!(100))));
        assert!(matches!(result, Err(MortgageError::InvalidInput { .. })));
    }

    #[test]
    fn test_amortization_bounds() {
        let mut scenario = inputs(DownPayment::Percent(dec!(20)));
        scenario.amortization_years = 0;
        assert!(calculate_mortgage(&scenario).is_err());
        scenario.amortization_years = 31;
        assert!(calculate_mortgage(&scenario).is_err());
    }

    #[test]
    fn test_high_value_purchase_needs_twenty_percent() {
        let scenario = MortgageInputs {
            purchase_price: Money::from_major(1_200_000),
            down_payment: DownPayment::Percent(dec!(15)),
            annual_rate: Rate::from_percent(dec!(5.0)),
            amortization_years: 25,
            frequency: PaymentFrequency::Monthly,
            start_date: None,
        };
        // 15% is under the 20% minimum at this price
        assert!(matches!(
            calculate_mortgage(&scenario),
            Err(MortgageError::BelowMinimumDownPayment { .. })
        ));
    }

    #[test]
    fn test_schedule_with_dates() {
        let mut scenario = inputs(DownPayment::Percent(dec!(20)));
        scenario.start_date = NaiveDate::from_ymd_opt(2025, 1, 31);

        let policy = LendingPolicy::default();
        let schedule = MortgageCalculator::new(&policy).schedule(&scenario).unwrap().max_rows(2);
        let rows: Vec<_> = schedule.rows().collect();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].payment_date, NaiveDate::from_ymd_opt(2025, 1, 31));
        assert_eq!(rows[1].payment_date, NaiveDate::from_ymd_opt(2025, 2, 28));
    }
}
