/// lump sums and payment increases against the base schedule
use mortgage_engine_rs::{LendingPolicy, Money, PaymentFrequency, PrepaymentInput, PrepaymentSimulator, Rate};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let policy = LendingPolicy::default();
    let simulator = PrepaymentSimulator::new(policy.prepayment, policy.compounding);

    let input = PrepaymentInput {
        principal: Money::from_major(400_000),
        annual_rate: Rate::from_percent(dec!(5.5)),
        amortization_years: 25,
        frequency: PaymentFrequency::Monthly,
        annual_lump_sum: Money::from_major(10_000),
        lump_sum_period: 1,
        payment_increase: Money::from_major(200),
    };

    let result = simulator.simulate(&input)?;

    println!("regular payment: ${}", result.regular_payment.round_whole());
    println!("paid off after {} payments ({} saved)", result.periods_to_payoff, result.periods_saved);
    println!("interest saved:  ${}", result.interest_saved.round_whole());
    println!("years saved:     {}", result.years_saved.round_dp(1));

    Ok(())
}
