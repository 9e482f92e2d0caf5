pub mod down_payment;
pub mod premium;

pub use down_payment::{meets_minimum, minimum_down_payment};
pub use premium::{calculate_insurance_premium, PremiumCalculator, PremiumQuote};
