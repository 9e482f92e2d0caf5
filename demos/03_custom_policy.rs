/// override part of the lending policy from json
use mortgage_engine_rs::{
    DebtServiceCalculator, LendingPolicy, Money, QualificationInput, Rate,
};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // tighter stress test, everything else stays at the defaults
    let policy = LendingPolicy::from_json(
        r#"{
            "stress_test": { "buffer": "0.03", "floor": "0.06" }
        }"#,
    )?;

    let input = QualificationInput {
        annual_income: Money::from_major(120_000),
        monthly_debts: Money::from_major(400),
        property_tax_annual: Money::from_major(4_200),
        monthly_heating: Money::from_major(150),
        monthly_condo_fees: Money::ZERO,
        purchase_price: Money::from_major(500_000),
        down_payment: Money::from_major(100_000),
        contract_rate: Rate::from_percent(dec!(4.5)),
        amortization_years: 25,
    };

    let default_policy = LendingPolicy::default();
    let standard = DebtServiceCalculator::new(&default_policy).qualify(&input)?;
    let strict = DebtServiceCalculator::new(&policy).qualify(&input)?;

    println!("default stress rate {}: gds {}", standard.stress_test_rate, standard.gds_ratio.round_dp(4));
    println!("custom stress rate {}: gds {}", strict.stress_test_rate, strict.gds_ratio.round_dp(4));
    println!("{}", policy.to_json()?);

    Ok(())
}
