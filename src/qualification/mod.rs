pub mod affordability;
pub mod ratios;

pub use affordability::{solve_max_purchase_price, AffordabilityInput, AffordabilityResult, AffordabilitySolver};
pub use ratios::{qualify, DebtServiceCalculator, QualificationInput, QualificationResult};
