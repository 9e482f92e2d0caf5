pub mod config;
pub mod decimal;
pub mod errors;
pub mod insurance;
pub mod interest;
pub mod payments;
pub mod products;
pub mod qualification;
pub mod types;

// re-export key types
pub use config::LendingPolicy;
pub use decimal::{Money, Rate};
pub use errors::{MortgageError, Result};
pub use insurance::{calculate_insurance_premium, minimum_down_payment, PremiumCalculator, PremiumQuote};
pub use interest::{effective_annual_rate, effective_periodic_rate, stress_test_rate, CompoundingConvention};
pub use payments::{
    calculate_payment, generate_schedule, periodic_payment, AmortizationRow, AmortizationSchedule,
    PrepaymentInput, PrepaymentResult, PrepaymentSimulator, ScheduleSummary,
};
pub use products::{
    calculate_mortgage, CommercialMortgageCalculator, DebtConsolidationCalculator, HelocCalculator,
    LandTransferTaxCalculator, MortgageCalculator, MortgageInputs, MortgageSummary, RefinanceCalculator,
};
pub use qualification::{
    qualify, solve_max_purchase_price, AffordabilityInput, AffordabilityResult, AffordabilitySolver,
    DebtServiceCalculator, QualificationInput, QualificationResult,
};
pub use types::{DownPayment, InsuranceStatus, MortgageType, PaymentFrequency};

// re-export external dependencies that users will need
pub use chrono;
pub use rust_decimal::Decimal;
