/// how much house can a household afford, and does it qualify
use mortgage_engine_rs::{qualify, solve_max_purchase_price, AffordabilityInput, Money, QualificationInput, Rate};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let input = AffordabilityInput {
        annual_income: Money::from_major(85_000),
        monthly_debts: Money::from_major(500),
        down_payment: Money::from_major(50_000),
        contract_rate: Rate::from_percent(dec!(5.5)),
        amortization_years: 25,
        property_tax_annual: Money::from_major(3_000),
        monthly_heating: Money::from_major(150),
        monthly_condo_fees: Money::ZERO,
    };

    let result = solve_max_purchase_price(&input)?;
    println!(
        "max purchase price: ${} (loan ${}, {} iterations)",
        result.max_purchase_price.round_whole(),
        result.max_loan.round_whole(),
        result.iterations
    );

    // re-check the answer directly
    let check = qualify(&QualificationInput {
        annual_income: input.annual_income,
        monthly_debts: input.monthly_debts,
        property_tax_annual: input.property_tax_annual,
        monthly_heating: input.monthly_heating,
        monthly_condo_fees: input.monthly_condo_fees,
        purchase_price: result.max_purchase_price,
        down_payment: input.down_payment,
        contract_rate: input.contract_rate,
        amortization_years: input.amortization_years,
    })?;

    println!(
        "gds {} / {}, tds {} / {}, stress rate {}",
        check.gds_ratio.round_dp(4),
        check.max_gds,
        check.tds_ratio.round_dp(4),
        check.max_tds,
        check.stress_test_rate
    );

    Ok(())
}
