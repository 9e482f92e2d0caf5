use serde::{Deserialize, Serialize};

use crate::config::InsurancePolicy;
use crate::decimal::{Money, Rate};
use crate::errors::{ensure_non_negative, ensure_positive, MortgageError, Result};
use crate::types::InsuranceStatus;

/// premium quote for a purchase
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PremiumQuote {
    pub status: InsuranceStatus,
    pub loan_amount: Money,
    pub loan_to_value: Rate,
    pub premium_rate: Rate,
    pub premium: Money,
    /// loan plus premium, the amount actually amortized
    pub insured_principal: Money,
}

/// mortgage default insurance premium calculator
pub struct PremiumCalculator<'a> {
    policy: &'a InsurancePolicy,
}

impl<'a> PremiumCalculator<'a> {
    pub fn new(policy: &'a InsurancePolicy) -> Self {
        Self { policy }
    }

    /// premium added to principal for a purchase
    pub fn premium(&self, purchase_price: Money, down_payment: Money) -> Result<Money> {
        Ok(self.quote(purchase_price, down_payment)?.premium)
    }

    /// full quote including ltv, tier rate and insured principal
    pub fn quote(&self, purchase_price: Money, down_payment: Money) -> Result<PremiumQuote> {
        ensure_positive("purchase_price", purchase_price)?;
        ensure_non_negative("down_payment", down_payment)?;

        let loan_amount = (purchase_price - down_payment).non_negative();
        let down_payment_ratio = down_payment
            .ratio_to(purchase_price)
            .unwrap_or(Rate::ONE)
            .min(Rate::ONE);
        let loan_to_value = Rate::ONE - down_payment_ratio;

        if down_payment_ratio >= self.policy.conventional_threshold {
            return Ok(PremiumQuote {
                status: InsuranceStatus::Conventional,
                loan_amount,
                loan_to_value,
                premium_rate: Rate::ZERO,
                premium: Money::ZERO,
                insured_principal: loan_amount,
            });
        }

        if purchase_price >= self.policy.max_insurable_price {
            return Err(MortgageError::IneligibleForInsurance {
                purchase_price,
                down_payment_ratio,
                max_insurable_price: self.policy.max_insurable_price,
            });
        }

        let premium_rate = self.premium_rate(loan_to_value);
        let premium = loan_amount * premium_rate;

        Ok(PremiumQuote {
            status: InsuranceStatus::Insured,
            loan_amount,
            loan_to_value,
            premium_rate,
            premium,
            insured_principal: loan_amount + premium,
        })
    }

    /// tier rate for a loan-to-value; brackets are open below and closed above
    pub fn premium_rate(&self, loan_to_value: Rate) -> Rate {
        self.policy
            .premium_tiers
            .iter()
            .find(|tier| loan_to_value > tier.ltv_above && loan_to_value <= tier.ltv_up_to)
            .map(|tier| tier.premium_rate)
            .unwrap_or(Rate::ZERO)
    }
}

/// premium under the default insurance policy
pub fn calculate_insurance_premium(purchase_price: Money, down_payment: Money) -> Result<Money> {
    let policy = InsurancePolicy::default();
    PremiumCalculator::new(&policy).premium(purchase_price, down_payment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_twenty_percent_is_conventional() {
        let premium = calculate_insurance_premium(Money::from_major(500_000), Money::from_major(100_000)).unwrap();
        assert_eq!(premium, Money::ZERO);
    }

    #[test]
    fn test_just_above_minimum_uses_top_tier() {
        // 5.1% down, ltv 94.9%
        let premium = calculate_insurance_premium(Money::from_major(500_000), Money::from_major(25_500)).unwrap();
        assert_eq!(premium, Money::from_major(474_500) * Rate::from_percent(dec!(4.0)));
        assert_eq!(premium, Money::from_major(18_980));
    }

    #[test]
    fn test_ten_percent_down() {
        let premium = calculate_insurance_premium(Money::from_major(500_000), Money::from_major(50_000)).unwrap();
        assert_eq!(premium, Money::from_major(13_950));
    }

    #[test]
    fn test_tier_boundaries() {
        let policy = InsurancePolicy::default();
        let calc = PremiumCalculator::new(&policy);

        assert_eq!(calc.premium_rate(Rate::from_percent(dec!(80))), Rate::ZERO);
        assert_eq!(calc.premium_rate(Rate::from_percent(dec!(80.01))), Rate::from_percent(dec!(2.8)));
        assert_eq!(calc.premium_rate(Rate::from_percent(dec!(85))), Rate::from_percent(dec!(2.8)));
        assert_eq!(calc.premium_rate(Rate::from_percent(dec!(85.01))), Rate::from_percent(dec!(3.1)));
        assert_eq!(calc.premium_rate(Rate::from_percent(dec!(90))), Rate::from_percent(dec!(3.1)));
        assert_eq!(calc.premium_rate(Rate::from_percent(dec!(90.01))), Rate::from_percent(dec!(4.0)));
        assert_eq!(calc.premium_rate(Rate::from_percent(dec!(95))), Rate::from_percent(dec!(4.0)));
    }

    #[test]
    fn test_quote_adds_premium_to_principal() {
        let policy = InsurancePolicy::default();
        let quote = PremiumCalculator::new(&policy)
            .quote(Money::from_major(400_000), Money::from_major(60_000))
            .unwrap();

        assert_eq!(quote.status, InsuranceStatus::Insured);
        assert_eq!(quote.loan_to_value, Rate::from_percent(dec!(85)));
        assert_eq!(quote.premium_rate, Rate::from_percent(dec!(2.8)));
        assert_eq!(quote.premium, Money::from_major(9_520));
        assert_eq!(quote.insured_principal, Money::from_major(349_520));
    }

    #[test]
    fn test_million_dollar_purchase_requires_twenty_percent() {
        let result = calculate_insurance_premium(Money::from_major(1_200_000), Money::from_major(180_000));
        assert!(matches!(result, Err(MortgageError::IneligibleForInsurance { .. })));

        let premium = calculate_insurance_premium(Money::from_major(1_200_000), Money::from_major(240_000)).unwrap();
        assert_eq!(premium, Money::ZERO);

        let result = calculate_insurance_premium(Money::from_major(1_000_000), Money::from_major(100_000));
        assert!(matches!(result, Err(MortgageError::IneligibleForInsurance { .. })));
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(calculate_insurance_premium(Money::ZERO, Money::ZERO).is_err());
        assert!(calculate_insurance_premium(Money::from_major(100), Money::from_major(-1)).is_err());
    }
}
