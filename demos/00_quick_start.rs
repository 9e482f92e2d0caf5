/// quick start - payment on a conventional purchase
use mortgage_engine_rs::{calculate_mortgage, DownPayment, Money, MortgageInputs, PaymentFrequency, Rate};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // $500,000 home, 20% down, 5.5% over 25 years
    let inputs = MortgageInputs {
        purchase_price: Money::from_major(500_000),
        down_payment: DownPayment::Percent(dec!(20)),
        annual_rate: Rate::from_percent(dec!(5.5)),
        amortization_years: 25,
        frequency: PaymentFrequency::Monthly,
        start_date: None,
    };

    let summary = calculate_mortgage(&inputs)?;

    println!("monthly payment: ${}", summary.periodic_payment.round_whole());
    println!("total interest:  ${}", summary.total_interest.round_whole());
    println!("{}", serde_json::to_string_pretty(&summary.rounded())?);

    Ok(())
}
