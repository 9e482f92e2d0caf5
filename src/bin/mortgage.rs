use std::error::Error;
use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};
use log::info;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use mortgage_engine_rs::insurance::minimum_down_payment;
use mortgage_engine_rs::products::{
    CommercialInput, ConsolidationInput, HelocInput, LandTransferTaxInput, RefinanceInput,
};
use mortgage_engine_rs::{
    AffordabilityInput, AffordabilitySolver, CommercialMortgageCalculator, DebtConsolidationCalculator,
    DebtServiceCalculator, HelocCalculator, LandTransferTaxCalculator, LendingPolicy, Money, MortgageCalculator,
    MortgageInputs, PrepaymentInput, PrepaymentSimulator, PremiumCalculator, QualificationInput,
    RefinanceCalculator,
};

type CliResult = Result<Value, Box<dyn Error>>;

/// rows shown by `schedule` unless overridden
const DEFAULT_PREVIEW_ROWS: usize = 12;

/// Canadian mortgage qualification and amortization calculations
#[derive(Parser)]
#[command(
    name = "mortgage",
    version,
    about = "Canadian mortgage qualification and amortization calculations",
    long_about = "Reads a JSON document from --input or stdin and prints the result as JSON. \
                  Amounts are decimal strings; rates are fractions (0.055 for 5.5%)."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Lending policy JSON overriding the default Canadian rules
    #[arg(long, global = true)]
    policy: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Payment, insurance premium and lifetime cost of a purchase
    Payment(PaymentArgs),
    /// Mortgage default insurance premium for a purchase
    Insurance(InputArgs),
    /// GDS/TDS qualification at the stress-test rate
    Qualify(InputArgs),
    /// Maximum affordable purchase price
    Afford(InputArgs),
    /// Amortization schedule preview
    Schedule(ScheduleArgs),
    /// Lump sum and payment increase savings
    Prepayment(InputArgs),
    /// Home equity line of credit limit and payments
    Heloc(InputArgs),
    /// Break penalty and refinance payback
    Refinance(InputArgs),
    /// Roll unsecured debt into the mortgage
    Consolidate(InputArgs),
    /// Ontario and Toronto land transfer tax
    LandTransferTax(InputArgs),
    /// Commercial loan sizing by LTV and DSCR
    Commercial(InputArgs),
    /// Print the effective lending policy
    Policy,
}

#[derive(Args)]
struct InputArgs {
    /// Path to JSON input file, stdin when omitted
    #[arg(long)]
    input: Option<PathBuf>,
}

#[derive(Args)]
struct PaymentArgs {
    #[command(flatten)]
    source: InputArgs,

    /// Print full precision instead of whole dollars
    #[arg(long)]
    exact: bool,
}

#[derive(Args)]
struct ScheduleArgs {
    #[command(flatten)]
    source: InputArgs,

    /// Number of rows to print
    #[arg(long, default_value_t = DEFAULT_PREVIEW_ROWS)]
    rows: usize,

    /// Print every row of the schedule
    #[arg(long, conflicts_with = "rows")]
    all: bool,
}

#[derive(Deserialize)]
struct InsuranceRequest {
    purchase_price: Money,
    down_payment: Money,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = load_policy(cli.policy.as_deref()).and_then(|policy| run(cli.command, &policy));

    match result {
        Ok(value) => match serde_json::to_string_pretty(&value) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("error: {}", e);
                process::exit(1);
            }
        },
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}

fn run(command: Commands, policy: &LendingPolicy) -> CliResult {
    match command {
        Commands::Payment(args) => {
            let inputs: MortgageInputs = read_input(&args.source)?;
            let summary = MortgageCalculator::new(policy).calculate(&inputs)?;
            let summary = if args.exact { summary } else { summary.rounded() };
            Ok(serde_json::to_value(summary)?)
        }
        Commands::Insurance(args) => {
            let request: InsuranceRequest = read_input(&args)?;
            let quote = PremiumCalculator::new(&policy.insurance).quote(request.purchase_price, request.down_payment)?;
            let minimum = minimum_down_payment(request.purchase_price, &policy.down_payment);
            Ok(json!({ "quote": quote, "minimum_down_payment": minimum }))
        }
        Commands::Qualify(args) => {
            let input: QualificationInput = read_input(&args)?;
            Ok(serde_json::to_value(DebtServiceCalculator::new(policy).qualify(&input)?)?)
        }
        Commands::Afford(args) => {
            let input: AffordabilityInput = read_input(&args)?;
            let result = AffordabilitySolver::new(policy).solve(&input)?;
            info!("max purchase price {} after {} iterations", result.max_purchase_price, result.iterations);
            Ok(serde_json::to_value(result)?)
        }
        Commands::Schedule(args) => {
            let inputs: MortgageInputs = read_input(&args.source)?;
            let schedule = MortgageCalculator::new(policy).schedule(&inputs)?;
            let summary = schedule.summary();
            let schedule = if args.all { schedule } else { schedule.max_rows(args.rows) };
            let rows: Vec<_> = schedule.rows().collect();
            Ok(json!({ "summary": summary, "rows": rows }))
        }
        Commands::Prepayment(args) => {
            let input: PrepaymentInput = read_input(&args)?;
            let simulator = PrepaymentSimulator::new(policy.prepayment, policy.compounding);
            Ok(serde_json::to_value(simulator.simulate(&input)?)?)
        }
        Commands::Heloc(args) => {
            let input: HelocInput = read_input(&args)?;
            Ok(serde_json::to_value(HelocCalculator::new(policy).calculate(&input)?)?)
        }
        Commands::Refinance(args) => {
            let input: RefinanceInput = read_input(&args)?;
            Ok(serde_json::to_value(RefinanceCalculator::new(policy).calculate(&input)?)?)
        }
        Commands::Consolidate(args) => {
            let input: ConsolidationInput = read_input(&args)?;
            Ok(serde_json::to_value(DebtConsolidationCalculator::new(policy).calculate(&input)?)?)
        }
        Commands::LandTransferTax(args) => {
            let input: LandTransferTaxInput = read_input(&args)?;
            let result = LandTransferTaxCalculator::new(&policy.land_transfer_tax).calculate(&input)?;
            Ok(serde_json::to_value(result)?)
        }
        Commands::Commercial(args) => {
            let input: CommercialInput = read_input(&args)?;
            Ok(serde_json::to_value(CommercialMortgageCalculator::new(policy).calculate(&input)?)?)
        }
        Commands::Policy => Ok(serde_json::to_value(policy)?),
    }
}

fn load_policy(path: Option<&Path>) -> Result<LendingPolicy, Box<dyn Error>> {
    match path {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .map_err(|e| format!("failed to read policy '{}': {}", path.display(), e))?;
            Ok(LendingPolicy::from_json(&contents)?)
        }
        None => Ok(LendingPolicy::default()),
    }
}

/// deserialize the request from `--input` or piped stdin
fn read_input<T: DeserializeOwned>(args: &InputArgs) -> Result<T, Box<dyn Error>> {
    let contents = match &args.input {
        Some(path) => fs::read_to_string(path)
            .map_err(|e| format!("failed to read '{}': {}", path.display(), e))?,
        None => {
            if io::stdin().is_terminal() {
                return Err("no input: pass --input <file> or pipe JSON on stdin".into());
            }
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let value = serde_json::from_str(contents.trim()).map_err(|e| format!("failed to parse input: {}", e))?;
    Ok(value)
}
