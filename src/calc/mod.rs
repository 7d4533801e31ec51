mod error;
mod growth;
mod loans;
mod net_worth;
mod tax;
mod types;
mod withdrawal;

pub use error::{CalcError, CalcResult};
pub use growth::{inflation_impact, rd_maturity, sip_future_value};
pub use loans::{amortization_schedule, calculate_emi, compare_loans, monthly_emi};
pub use net_worth::calculate_net_worth;
pub use tax::{
    CESS_RATE_PERCENT, NEW_REGIME_SLABS, OLD_REGIME_SLABS, STANDARD_DEDUCTION, allowed_deductions,
    calculate_tax, compare_regimes, slab_tax, slabs_for,
};
pub use types::{
    AmortizationRow, AmortizationYear, AssetCategory, AssetEntry, CategoryTotal, CorpusYear,
    Deductions, EmiResult, GrowthYear, InflationPlan, InflationResult, InflationYear,
    LedgerEntry, LiabilityCategory, LiabilityEntry, LoanComparison, LoanOffer, LoanQuote,
    LoanTerms, NetWorthResult, RdPlan, RdResult, RegimeTax, SipPlan, SipResult, SlabTax,
    SwpPlan, SwpResult, TaxComparison, TaxProfile, TaxRegime, TaxSlab,
};
pub use withdrawal::simulate_swp;
