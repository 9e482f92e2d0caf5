use crate::config::DownPaymentPolicy;
use crate::decimal::Money;

/// minimum down payment required for a purchase price
///
/// below the high value threshold each tier applies to its slice of the price;
/// at or above it the flat rate applies to the whole price
pub fn minimum_down_payment(purchase_price: Money, policy: &DownPaymentPolicy) -> Money {
    if !purchase_price.is_positive() {
        return Money::ZERO;
    }

    if purchase_price >= policy.high_value_threshold {
        return purchase_price * policy.high_value_rate;
    }

    let mut required = Money::ZERO;
    let mut floor = Money::ZERO;
    for tier in &policy.tiers {
        if purchase_price <= floor {
            break;
        }
        let slice = purchase_price.min(tier.up_to) - floor;
        required += slice * tier.rate;
        floor = tier.up_to;
    }

    // anything above the last tier is charged at the last tier's rate
    if let Some(last) = policy.tiers.last() {
        if purchase_price > floor {
            required += (purchase_price - floor) * last.rate;
        }
    }

    required
}

/// whether a down payment meets the minimum for the price
pub fn meets_minimum(purchase_price: Money, down_payment: Money, policy: &DownPaymentPolicy) -> bool {
    down_payment >= minimum_down_payment(purchase_price, policy)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> DownPaymentPolicy {
        DownPaymentPolicy::default()
    }

    #[test]
    fn test_five_percent_up_to_half_million() {
        assert_eq!(minimum_down_payment(Money::from_major(400_000), &policy()), Money::from_major(20_000));
        assert_eq!(minimum_down_payment(Money::from_major(500_000), &policy()), Money::from_major(25_000));
    }

    #[test]
    fn test_ten_percent_on_second_slice() {
        assert_eq!(minimum_down_payment(Money::from_major(750_000), &policy()), Money::from_major(50_000));
        assert_eq!(minimum_down_payment(Money::from_major(999_999), &policy()), Money::from_cents(7_499_990));
    }

    #[test]
    fn test_twenty_percent_at_one_million() {
        assert_eq!(minimum_down_payment(Money::from_major(1_000_000), &policy()), Money::from_major(200_000));
        assert_eq!(minimum_down_payment(Money::from_major(1_500_000), &policy()), Money::from_major(300_000));
    }

    #[test]
    fn test_meets_minimum() {
        assert!(meets_minimum(Money::from_major(750_000), Money::from_major(50_000), &policy()));
        assert!(!meets_minimum(Money::from_major(750_001), Money::from_major(50_000), &policy()));
        assert!(meets_minimum(Money::ZERO, Money::ZERO, &policy()));
    }
}
