use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{MortgageError, Result};
use crate::interest::CompoundingConvention;

/// lending rules applied by every calculator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LendingPolicy {
    pub compounding: CompoundingConvention,
    pub stress_test: StressTestPolicy,
    pub debt_service: DebtServicePolicy,
    pub insurance: InsurancePolicy,
    pub down_payment: DownPaymentPolicy,
    pub affordability: AffordabilitySearch,
    pub prepayment: PrepaymentPolicy,
    pub heloc: HelocPolicy,
    pub refinance: RefinancePolicy,
    pub consolidation: DebtConsolidationPolicy,
    pub land_transfer_tax: LandTransferTaxPolicy,
    pub commercial: CommercialPolicy,
}

/// qualifying rate rule: max(contract + buffer, floor)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StressTestPolicy {
    pub buffer: Rate,
    pub floor: Rate,
}

impl Default for StressTestPolicy {
    fn default() -> Self {
        Self {
            buffer: Rate::from_percent(dec!(2.0)),
            floor: Rate::from_percent(dec!(5.25)),
        }
    }
}

/// gds/tds ceilings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebtServicePolicy {
    pub insured_max_gds: Rate,
    pub insured_max_tds: Rate,
    pub conventional_max_gds: Rate,
    pub conventional_max_tds: Rate,
    /// share of condo fees counted as housing cost
    pub condo_fee_factor: Rate,
}

impl Default for DebtServicePolicy {
    fn default() -> Self {
        Self {
            insured_max_gds: Rate::from_percent(dec!(39)),
            insured_max_tds: Rate::from_percent(dec!(44)),
            conventional_max_gds: Rate::from_percent(dec!(45)),
            conventional_max_tds: Rate::from_percent(dec!(50)),
            condo_fee_factor: Rate::from_percent(dec!(50)),
        }
    }
}

/// one premium bracket, open below and closed above: (ltv_above, ltv_up_to]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PremiumTier {
    pub ltv_above: Rate,
    pub ltv_up_to: Rate,
    pub premium_rate: Rate,
}

/// mortgage default insurance rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsurancePolicy {
    /// down payment ratio at which a mortgage is conventional
    pub conventional_threshold: Rate,
    /// purchase price at or above which insurance is unavailable
    pub max_insurable_price: Money,
    pub premium_tiers: Vec<PremiumTier>,
}

impl Default for InsurancePolicy {
    fn default() -> Self {
        Self {
            conventional_threshold: Rate::from_percent(dec!(20)),
            max_insurable_price: Money::from_major(1_000_000),
            premium_tiers: vec![
                PremiumTier {
                    ltv_above: Rate::from_percent(dec!(80)),
                    ltv_up_to: Rate::from_percent(dec!(85)),
                    premium_rate: Rate::from_percent(dec!(2.8)),
                },
                PremiumTier {
                    ltv_above: Rate::from_percent(dec!(85)),
                    ltv_up_to: Rate::from_percent(dec!(90)),
                    premium_rate: Rate::from_percent(dec!(3.1)),
                },
                PremiumTier {
                    ltv_above: Rate::from_percent(dec!(90)),
                    ltv_up_to: Rate::from_percent(dec!(100)),
                    premium_rate: Rate::from_percent(dec!(4.0)),
                },
            ],
        }
    }
}

/// marginal slice of the minimum down payment schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DownPaymentTier {
    pub up_to: Money,
    pub rate: Rate,
}

/// minimum down payment schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownPaymentPolicy {
    /// marginal tiers applied below the high value threshold, ascending
    pub tiers: Vec<DownPaymentTier>,
    /// price at or above which the flat rate applies to the whole price
    pub high_value_threshold: Money,
    pub high_value_rate: Rate,
}

impl Default for DownPaymentPolicy {
    fn default() -> Self {
        Self {
            tiers: vec![
                DownPaymentTier {
                    up_to: Money::from_major(500_000),
                    rate: Rate::from_percent(dec!(5)),
                },
                DownPaymentTier {
                    up_to: Money::from_major(1_000_000),
                    rate: Rate::from_percent(dec!(10)),
                },
            ],
            high_value_threshold: Money::from_major(1_000_000),
            high_value_rate: Rate::from_percent(dec!(20)),
        }
    }
}

/// bounds of the max purchase price search
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AffordabilitySearch {
    pub lower_bound: Money,
    pub upper_bound: Money,
    pub max_iterations: u32,
    /// stop once the search interval is narrower than this
    pub tolerance: Money,
}

impl Default for AffordabilitySearch {
    fn default() -> Self {
        Self {
            lower_bound: Money::ZERO,
            upper_bound: Money::from_major(3_000_000),
            max_iterations: 100,
            tolerance: Money::from_major(100),
        }
    }
}

/// lender prepayment privileges
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrepaymentPolicy {
    /// annual lump sum cap as a share of the original principal
    pub lump_sum_limit: Rate,
    /// payment increase cap as a share of the regular payment
    pub payment_increase_limit: Rate,
    /// simulation stops after this many times the scheduled term
    pub iteration_cap_multiplier: u32,
}

impl Default for PrepaymentPolicy {
    fn default() -> Self {
        Self {
            lump_sum_limit: Rate::from_percent(dec!(15)),
            payment_increase_limit: Rate::from_percent(dec!(100)),
            iteration_cap_multiplier: 2,
        }
    }
}

/// home equity line of credit limits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HelocPolicy {
    /// combined mortgage + heloc cap as a share of home value
    pub max_combined_ltv: Rate,
    /// revolving portion cap as a share of home value
    pub max_revolving_ltv: Rate,
}

impl Default for HelocPolicy {
    fn default() -> Self {
        Self {
            max_combined_ltv: Rate::from_percent(dec!(80)),
            max_revolving_ltv: Rate::from_percent(dec!(65)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefinancePolicy {
    /// months of interest charged as the minimum penalty
    pub penalty_months_interest: u32,
}

impl Default for RefinancePolicy {
    fn default() -> Self {
        Self {
            penalty_months_interest: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebtConsolidationPolicy {
    /// maximum refinance ltv when pulling equity
    pub max_ltv: Rate,
    /// tds ceiling after consolidation
    pub max_tds: Rate,
}

impl Default for DebtConsolidationPolicy {
    fn default() -> Self {
        Self {
            max_ltv: Rate::from_percent(dec!(80)),
            max_tds: Rate::from_percent(dec!(50)),
        }
    }
}

/// marginal tax bracket, `up_to: None` is the open top bracket
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub up_to: Option<Money>,
    pub rate: Rate,
}

/// ontario and toronto land transfer tax brackets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandTransferTaxPolicy {
    pub provincial_brackets: Vec<TaxBracket>,
    pub municipal_brackets: Vec<TaxBracket>,
    pub provincial_first_time_rebate: Money,
    pub municipal_first_time_rebate: Money,
}

impl Default for LandTransferTaxPolicy {
    fn default() -> Self {
        let brackets = vec![
            TaxBracket { up_to: Some(Money::from_major(55_000)), rate: Rate::from_percent(dec!(0.5)) },
            TaxBracket { up_to: Some(Money::from_major(250_000)), rate: Rate::from_percent(dec!(1.0)) },
            TaxBracket { up_to: Some(Money::from_major(400_000)), rate: Rate::from_percent(dec!(1.5)) },
            TaxBracket { up_to: Some(Money::from_major(2_000_000)), rate: Rate::from_percent(dec!(2.0)) },
            TaxBracket { up_to: None, rate: Rate::from_percent(dec!(2.5)) },
        ];

        Self {
            provincial_brackets: brackets.clone(),
            municipal_brackets: brackets,
            provincial_first_time_rebate: Money::from_major(4_000),
            municipal_first_time_rebate: Money::from_major(4_475),
        }
    }
}

/// commercial underwriting limits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommercialPolicy {
    pub max_ltv: Rate,
    /// minimum debt service coverage ratio, e.g. 1.25x
    pub min_dscr: Rate,
}

impl Default for CommercialPolicy {
    fn default() -> Self {
        Self {
            max_ltv: Rate::from_percent(dec!(75)),
            min_dscr: Rate::from_percent(dec!(125)),
        }
    }
}

impl LendingPolicy {
    /// federal residential rules as published for insured and uninsured lending
    pub fn canadian() -> Self {
        Self::default()
    }

    /// parse a policy document; missing sections fall back to defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let policy: LendingPolicy = serde_json::from_str(json)?;
        policy.validate()?;
        Ok(policy)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// check internal consistency of the policy
    pub fn validate(&self) -> Result<()> {
        ensure_fraction("stress_test.floor", self.stress_test.floor)?;
        if self.stress_test.buffer.is_negative() {
            return Err(invalid_config("stress_test.buffer must not be negative"));
        }

        let ds = &self.debt_service;
        for (name, value) in [
            ("debt_service.insured_max_gds", ds.insured_max_gds),
            ("debt_service.insured_max_tds", ds.insured_max_tds),
            ("debt_service.conventional_max_gds", ds.conventional_max_gds),
            ("debt_service.conventional_max_tds", ds.conventional_max_tds),
            ("debt_service.condo_fee_factor", ds.condo_fee_factor),
        ] {
            ensure_fraction(name, value)?;
        }
        if ds.insured_max_gds > ds.insured_max_tds || ds.conventional_max_gds > ds.conventional_max_tds {
            return Err(invalid_config("gds ceiling must not exceed tds ceiling"));
        }

        ensure_fraction("insurance.conventional_threshold", self.insurance.conventional_threshold)?;
        let mut previous_upper = Rate::ZERO;
        for tier in &self.insurance.premium_tiers {
            if tier.ltv_above >= tier.ltv_up_to || tier.ltv_above < previous_upper {
                return Err(invalid_config("premium tiers must be ascending and non-overlapping"));
            }
            ensure_fraction("insurance.premium_tiers.premium_rate", tier.premium_rate)?;
            previous_upper = tier.ltv_up_to;
        }

        let mut previous_cap = Money::ZERO;
        for tier in &self.down_payment.tiers {
            if tier.up_to <= previous_cap {
                return Err(invalid_config("down payment tiers must be ascending"));
            }
            ensure_fraction("down_payment.tiers.rate", tier.rate)?;
            previous_cap = tier.up_to;
        }
        ensure_fraction("down_payment.high_value_rate", self.down_payment.high_value_rate)?;

        let search = &self.affordability;
        if search.upper_bound <= search.lower_bound || search.lower_bound.is_negative() {
            return Err(invalid_config("affordability bounds must satisfy 0 <= lower < upper"));
        }
        if search.max_iterations == 0 || !search.tolerance.is_positive() {
            return Err(invalid_config("affordability search needs iterations and a positive tolerance"));
        }

        if self.prepayment.iteration_cap_multiplier == 0 {
            return Err(invalid_config("prepayment.iteration_cap_multiplier must be at least 1"));
        }

        ensure_fraction("heloc.max_combined_ltv", self.heloc.max_combined_ltv)?;
        ensure_fraction("heloc.max_revolving_ltv", self.heloc.max_revolving_ltv)?;
        ensure_fraction("consolidation.max_ltv", self.consolidation.max_ltv)?;
        ensure_fraction("consolidation.max_tds", self.consolidation.max_tds)?;
        ensure_fraction("commercial.max_ltv", self.commercial.max_ltv)?;
        if self.commercial.min_dscr.as_decimal() <= rust_decimal::Decimal::ZERO {
            return Err(invalid_config("commercial.min_dscr must be positive"));
        }

        for brackets in [
            &self.land_transfer_tax.provincial_brackets,
            &self.land_transfer_tax.municipal_brackets,
        ] {
            validate_brackets(brackets)?;
        }

        Ok(())
    }
}

fn validate_brackets(brackets: &[TaxBracket]) -> Result<()> {
    let mut previous = Money::ZERO;
    for (i, bracket) in brackets.iter().enumerate() {
        match bracket.up_to {
            Some(cap) if cap <= previous => {
                return Err(invalid_config("tax brackets must be ascending"));
            }
            Some(cap) => previous = cap,
            None if i + 1 != brackets.len() => {
                return Err(invalid_config("only the last tax bracket may be open ended"));
            }
            None => {}
        }
        ensure_fraction("land_transfer_tax.rate", bracket.rate)?;
    }
    Ok(())
}

fn ensure_fraction(name: &str, rate: Rate) -> Result<()> {
    if rate.is_negative() || rate > Rate::ONE {
        return Err(invalid_config(&format!("{} must be between 0 and 1, got {}", name, rate)));
    }
    Ok(())
}

fn invalid_config(message: &str) -> MortgageError {
    MortgageError::InvalidConfiguration {
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_is_valid() {
        let policy = LendingPolicy::canadian();
        assert!(policy.validate().is_ok());
        assert_eq!(policy.stress_test.floor, Rate::from_percent(dec!(5.25)));
        assert_eq!(policy.insurance.premium_tiers.len(), 3);
        assert_eq!(policy.compounding, CompoundingConvention::SemiAnnual);
    }

    #[test]
    fn test_json_round_trip() {
        let policy = LendingPolicy::canadian();
        let json = policy.to_json().unwrap();
        let parsed = LendingPolicy::from_json(&json).unwrap();
        assert_eq!(parsed, policy);
    }

    #[test]
    fn test_partial_override() {
        let json = r#"{ "stress_test": { "floor": "0.0575" }, "compounding": "monthly" }"#;
        let policy = LendingPolicy::from_json(json).unwrap();
        assert_eq!(policy.stress_test.floor, Rate::from_percent(dec!(5.75)));
        assert_eq!(policy.stress_test.buffer, Rate::from_percent(dec!(2)));
        assert_eq!(policy.compounding, CompoundingConvention::Monthly);
        assert_eq!(policy.debt_service, DebtServicePolicy::default());
    }

    #[test]
    fn test_rejects_inconsistent_policy() {
        let mut policy = LendingPolicy::canadian();
        policy.debt_service.insured_max_gds = Rate::from_percent(dec!(50));
        assert!(matches!(policy.validate(), Err(MortgageError::InvalidConfiguration { .. })));

        let mut policy = LendingPolicy::canadian();
        policy.affordability.upper_bound = Money::ZERO;
        assert!(policy.validate().is_err());

        let mut policy = LendingPolicy::canadian();
        policy.insurance.premium_tiers.reverse();
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_malformed_json() {
        let err = LendingPolicy::from_json("{ not json").unwrap_err();
        assert!(matches!(err, MortgageError::InvalidConfiguration { .. }));
    }
}
