pub mod commercial;
pub mod consolidation;
pub mod heloc;
pub mod land_transfer_tax;
pub mod mortgage;
pub mod refinance;

pub use commercial::{BindingConstraint, CommercialInput, CommercialMortgageCalculator, CommercialResult};
pub use consolidation::{ConsolidatedDebt, ConsolidationInput, ConsolidationResult, DebtConsolidationCalculator};
pub use heloc::{HelocCalculator, HelocInput, HelocResult};
pub use land_transfer_tax::{marginal_tax, LandTransferTaxCalculator, LandTransferTaxInput, LandTransferTaxResult};
pub use mortgage::{calculate_mortgage, MortgageCalculator, MortgageInputs, MortgageSummary};
pub use refinance::{PenaltyCalculation, PenaltyMethod, RefinanceCalculator, RefinanceInput, RefinanceResult};
