use thiserror::Error;

use crate::decimal::{Money, Rate};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MortgageError {
    #[error("invalid input: {field}: {reason}")]
    InvalidInput {
        field: String,
        reason: String,
    },

    #[error(
        "ineligible for mortgage insurance: purchase price {purchase_price} is at or above {max_insurable_price} with down payment ratio {down_payment_ratio}"
    )]
    IneligibleForInsurance {
        purchase_price: Money,
        down_payment_ratio: Rate,
        max_insurable_price: Money,
    },

    #[error("down payment below minimum: required {required}, provided {provided}")]
    BelowMinimumDownPayment {
        required: Money,
        provided: Money,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("calculation error: {message}")]
    CalculationError {
        message: String,
    },
}

impl MortgageError {
    /// shorthand for an invalid input on a named field
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        MortgageError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// arithmetic that left the representable decimal range
    pub fn overflow(what: impl Into<String>) -> Self {
        MortgageError::CalculationError {
            message: format!("{} overflowed", what.into()),
        }
    }
}

impl From<serde_json::Error> for MortgageError {
    fn from(e: serde_json::Error) -> Self {
        MortgageError::InvalidConfiguration {
            message: e.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MortgageError>;

/// reject negative amounts
pub(crate) fn ensure_non_negative(field: &str, amount: Money) -> Result<()> {
    if amount.is_negative() {
        return Err(MortgageError::invalid(field, format!("must not be negative, got {}", amount)));
    }
    Ok(())
}

/// reject zero or negative amounts
pub(crate) fn ensure_positive(field: &str, amount: Money) -> Result<()> {
    if !amount.is_positive() {
        return Err(MortgageError::invalid(field, format!("must be greater than zero, got {}", amount)));
    }
    Ok(())
}
