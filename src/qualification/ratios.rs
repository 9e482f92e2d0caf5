use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::LendingPolicy;
use crate::decimal::{Money, Rate};
use crate::errors::{ensure_non_negative, ensure_positive, MortgageError, Result};
use crate::insurance::PremiumCalculator;
use crate::interest::stress_test_rate;
use crate::payments::{calculate_payment, total_payments};
use crate::types::InsuranceStatus;

/// borrower and property figures for a gds/tds check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualificationInput {
    pub annual_income: Money,
    #[serde(default)]
    pub monthly_debts: Money,
    #[serde(default)]
    pub property_tax_annual: Money,
    #[serde(default)]
    pub monthly_heating: Money,
    #[serde(default)]
    pub monthly_condo_fees: Money,
    pub purchase_price: Money,
    pub down_payment: Money,
    pub contract_rate: Rate,
    pub amortization_years: u32,
}

/// debt service ratios at the stress-test rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualificationResult {
    pub gds_ratio: Rate,
    pub tds_ratio: Rate,
    pub qualifies: bool,
    pub max_gds: Rate,
    pub max_tds: Rate,
    pub stress_test_rate: Rate,
    /// monthly payment at the stress-test rate
    pub qualifying_payment: Money,
    pub housing_costs: Money,
    pub insurance_status: InsuranceStatus,
    pub insurance_premium: Money,
    /// loan plus insurance premium
    pub total_loan: Money,
}

/// gross and total debt service calculator
pub struct DebtServiceCalculator<'a> {
    policy: &'a LendingPolicy,
}

impl<'a> DebtServiceCalculator<'a> {
    pub fn new(policy: &'a LendingPolicy) -> Self {
        Self { policy }
    }

    /// evaluate gds/tds against the insured or conventional ceilings
    pub fn qualify(&self, input: &QualificationInput) -> Result<QualificationResult> {
        ensure_positive("annual_income", input.annual_income)?;
        ensure_non_negative("monthly_debts", input.monthly_debts)?;
        ensure_non_negative("property_tax_annual", input.property_tax_annual)?;
        ensure_non_negative("monthly_heating", input.monthly_heating)?;
        ensure_non_negative("monthly_condo_fees", input.monthly_condo_fees)?;
        ensure_non_negative("purchase_price", input.purchase_price)?;
        ensure_non_negative("down_payment", input.down_payment)?;
        if input.amortization_years == 0 {
            return Err(MortgageError::invalid("amortization_years", "must be greater than zero"));
        }
        if input.purchase_price.is_positive() && input.down_payment >= input.purchase_price {
            return Err(MortgageError::invalid(
                "down_payment",
                format!("must be less than the purchase price {}", input.purchase_price),
            ));
        }

        let (insurance_status, insurance_premium, total_loan) = if input.purchase_price.is_positive() {
            let quote = PremiumCalculator::new(&self.policy.insurance).quote(input.purchase_price, input.down_payment)?;
            (quote.status, quote.premium, quote.insured_principal)
        } else {
            (InsuranceStatus::Insured, Money::ZERO, Money::ZERO)
        };

        // qualification never uses the contract rate
        let qualifying_rate = stress_test_rate(input.contract_rate, &self.policy.stress_test);
        let monthly_rate = self.policy.compounding.periodic_rate(qualifying_rate, 12)?;
        let qualifying_payment = calculate_payment(
            total_loan,
            monthly_rate,
            total_payments("amortization_years", input.amortization_years, 12)?,
        )?;

        let housing_costs = qualifying_payment
            + input.property_tax_annual / Decimal::from(12)
            + input.monthly_heating
            + input.monthly_condo_fees * self.policy.debt_service.condo_fee_factor;

        let monthly_income = input.annual_income / Decimal::from(12);
        let gds_ratio = Rate::from_decimal(housing_costs.as_decimal() / monthly_income.as_decimal());
        let tds_ratio = Rate::from_decimal(
            (housing_costs + input.monthly_debts).as_decimal() / monthly_income.as_decimal(),
        );

        let limits = &self.policy.debt_service;
        let (max_gds, max_tds) = match insurance_status {
            InsuranceStatus::Conventional => (limits.conventional_max_gds, limits.conventional_max_tds),
            InsuranceStatus::Insured => (limits.insured_max_gds, limits.insured_max_tds),
        };

        let qualifies = gds_ratio <= max_gds && tds_ratio <= max_tds && input.purchase_price.is_positive();

        Ok(QualificationResult {
            gds_ratio,
            tds_ratio,
            qualifies,
            max_gds,
            max_tds,
            stress_test_rate: qualifying_rate,
            qualifying_payment,
            housing_costs,
            insurance_status,
            insurance_premium,
            total_loan,
        })
    }
}

/// qualify under the default canadian policy
pub fn qualify(input: &QualificationInput) -> Result<QualificationResult> {
    let policy = LendingPolicy::default();
    DebtServiceCalculator::new(&policy).qualify(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn input() -> QualificationInput {
        QualificationInput {
            annual_income: Money::from_major(120_000),
            monthly_debts: Money::from_major(400),
            property_tax_annual: Money::from_major(4_200),
            monthly_heating: Money::from_major(150),
            monthly_condo_fees: Money::ZERO,
            purchase_price: Money::from_major(500_000),
            down_payment: Money::from_major(100_000),
            contract_rate: Rate::from_percent(dec!(4.5)),
            amortization_years: 25,
        }
    }

    #[test]
    fn test_uses_stress_test_rate() {
        let result = qualify(&input()).unwrap();
        assert_eq!(result.stress_test_rate, Rate::from_percent(dec!(6.5)));

        let policy = LendingPolicy::default();
        let stressed = policy.compounding.periodic_rate(Rate::from_percent(dec!(6.5)), 12).unwrap();
        let expected = calculate_payment(Money::from_major(400_000), stressed, 300).unwrap();
        assert_eq!(result.qualifying_payment, expected);

        let contract = policy.compounding.periodic_rate(Rate::from_percent(dec!(4.5)), 12).unwrap();
        assert!(result.qualifying_payment > calculate_payment(Money::from_major(400_000), contract, 300).unwrap());
    }

    #[test]
    fn test_ratio_arithmetic() {
        let result = qualify(&input()).unwrap();
        let monthly_income = dec!(10000);
        let housing = result.qualifying_payment.as_decimal() + dec!(350) + dec!(150);

        assert_eq!(result.housing_costs.as_decimal(), housing);
        assert_eq!(result.gds_ratio.as_decimal(), housing / monthly_income);
        assert_eq!(result.tds_ratio.as_decimal(), (housing + dec!(400)) / monthly_income);
    }

    #[test]
    fn test_conventional_thresholds() {
        let result = qualify(&input()).unwrap();
        assert_eq!(result.insurance_status, InsuranceStatus::Conventional);
        assert_eq!(result.max_gds, Rate::from_percent(dec!(45)));
        assert_eq!(result.max_tds, Rate::from_percent(dec!(50)));
        assert_eq!(result.insurance_premium, Money::ZERO);
        assert!(result.qualifies);
    }

    #[test]
    fn test_insured_thresholds_and_premium() {
        let mut scenario = input();
        scenario.down_payment = Money::from_major(50_000);

        let result = qualify(&scenario).unwrap();
        assert_eq!(result.insurance_status, InsuranceStatus::Insured);
        assert_eq!(result.max_gds, Rate::from_percent(dec!(39)));
        assert_eq!(result.max_tds, Rate::from_percent(dec!(44)));
        assert_eq!(result.insurance_premium, Money::from_major(13_950));
        assert_eq!(result.total_loan, Money::from_major(463_950));
    }

    #[test]
    fn test_condo_fees_count_half() {
        let mut with_fees = input();
        with_fees.monthly_condo_fees = Money::from_major(400);

        let base = qualify(&input()).unwrap();
        let result = qualify(&with_fees).unwrap();
        assert_eq!(result.housing_costs - base.housing_costs, Money::from_major(200));
    }

    #[test]
    fn test_fails_when_debts_too_high() {
        let mut scenario = input();
        scenario.monthly_debts = Money::from_major(3_000);
        let result = qualify(&scenario).unwrap();
        assert!(result.gds_ratio <= result.max_gds);
        assert!(result.tds_ratio > result.max_tds);
        assert!(!result.qualifies);
    }

    #[test]
    fn test_idempotent() {
        let first = qualify(&input()).unwrap();
        let second = qualify(&input()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_zero_income_rejected() {
        let mut scenario = input();
        scenario.annual_income = Money::ZERO;
        assert!(matches!(qualify(&scenario), Err(MortgageError::InvalidInput { .. })));
    }

    #[test]
    fn test_zero_price_never_qualifies() {
        let mut scenario = input();
        scenario.purchase_price = Money::ZERO;
        scenario.down_payment = Money::ZERO;
        let result = qualify(&scenario).unwrap();
        assert!(!result.qualifies);
    }

    #[test]
    fn test_down_payment_covering_price_rejected() {
        let mut scenario = input();
        scenario.down_payment = scenario.purchase_price;
        assert!(matches!(
            qualify(&scenario),
            Err(MortgageError::InvalidInput { ref field, .. }) if field == "down_payment"
        ));

        scenario.down_payment = Money::from_major(600_000);
        assert!(matches!(qualify(&scenario), Err(MortgageError::InvalidInput { .. })));
    }

    #[test]
    fn test_oversized_amortization_rejected() {
        let mut scenario = input();
        scenario.amortization_years = 400_000_000;
        assert!(matches!(
            qualify(&scenario),
            Err(MortgageError::InvalidInput { ref field, .. }) if field == "amortization_years"
        ));
    }

    #[test]
    fn test_ineligible_insurance_propagates() {
        let mut scenario = input();
        scenario.purchase_price = Money::from_major(1_200_000);
        scenario.down_payment = Money::from_major(180_000);
        assert!(matches!(qualify(&scenario), Err(MortgageError::IneligibleForInsurance { .. })));
    }
}
