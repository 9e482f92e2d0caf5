pub mod compound;
pub mod stress;

pub use compound::{effective_annual_rate, effective_periodic_rate, CompoundingConvention};
pub use stress::stress_test_rate;
