use serde::{Deserialize, Serialize};

use crate::config::{LandTransferTaxPolicy, TaxBracket};
use crate::decimal::Money;
use crate::errors::{ensure_positive, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandTransferTaxInput {
    pub purchase_price: Money,
    #[serde(default)]
    pub first_time_buyer: bool,
    /// property sits inside the municipality levying its own tax
    #[serde(default)]
    pub municipal: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandTransferTaxResult {
    pub provincial_tax: Money,
    pub provincial_rebate: Money,
    pub municipal_tax: Money,
    pub municipal_rebate: Money,
    /// tax payable after rebates
    pub total_tax: Money,
}

pub struct LandTransferTaxCalculator<'a> {
    policy: &'a LandTransferTaxPolicy,
}

impl<'a> LandTransferTaxCalculator<'a> {
    pub fn new(policy: &'a LandTransferTaxPolicy) -> Self {
        Self { policy }
    }

    pub fn calculate(&self, input: &LandTransferTaxInput) -> Result<LandTransferTaxResult> {
        ensure_positive("purchase_price", input.purchase_price)?;

        let provincial_tax = marginal_tax(input.purchase_price, &self.policy.provincial_brackets);
        let municipal_tax = if input.municipal {
            marginal_tax(input.purchase_price, &self.policy.municipal_brackets)
        } else {
            Money::ZERO
        };

        // rebates never exceed the tax they offset
        let (provincial_rebate, municipal_rebate) = if input.first_time_buyer {
            (
                self.policy.provincial_first_time_rebate.min(provincial_tax),
                self.policy.municipal_first_time_rebate.min(municipal_tax),
            )
        } else {
            (Money::ZERO, Money::ZERO)
        };

        Ok(LandTransferTaxResult {
            provincial_tax,
            provincial_rebate,
            municipal_tax,
            municipal_rebate,
            total_tax: provincial_tax - provincial_rebate + municipal_tax - municipal_rebate,
        })
    }
}

/// tax on `amount` with each bracket rate applied only to its slice
pub fn marginal_tax(amount: Money, brackets: &[TaxBracket]) -> Money {
    let mut tax = Money::ZERO;
    let mut floor = Money::ZERO;

    for bracket in brackets {
        if amount <= floor {
            break;
        }
        let ceiling = bracket.up_to.map_or(amount, |up_to| up_to.min(amount));
        tax += (ceiling - floor) * bracket.rate;
        floor = ceiling;
    }

    tax
}
