use serde::{Serialize, Serializer};

// 2^63; every rounded amount strictly inside (-2^63, 2^63) fits an i64.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// A currency amount rounded to whole units. Amounts beyond the `i64` range
/// keep their magnitude as a float instead of saturating.
struct WholeUnits(f64);

impl Serialize for WholeUnits {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let rounded = self.0.round();
        if rounded.abs() < I64_BOUND {
            serializer.serialize_i64(rounded as i64)
        } else {
            serializer.serialize_f64(rounded)
        }
    }
}

/// Currency amounts are carried at full precision and only rounded to whole
/// units when a result is serialized.
pub(crate) fn whole_units<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    WholeUnits(*value).serialize(serializer)
}

pub(crate) fn whole_units_opt<S: Serializer>(
    value: &Option<f64>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => serializer.serialize_some(&WholeUnits(*v)),
        None => serializer.serialize_none(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoanTerms {
    pub principal: f64,
    pub annual_rate_percent: f64,
    pub tenure_years: u32,
}

impl LoanTerms {
    pub fn monthly_rate(&self) -> f64 {
        self.annual_rate_percent / 12.0 / 100.0
    }

    pub fn total_months(&self) -> u32 {
        self.tenure_years * 12
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SipPlan {
    pub monthly_amount: f64,
    pub annual_return_percent: f64,
    pub years: u32,
    pub annual_step_up_percent: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwpPlan {
    pub initial_corpus: f64,
    pub monthly_withdrawal: f64,
    pub annual_return_percent: f64,
    pub years: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RdPlan {
    pub monthly_deposit: f64,
    pub annual_rate_percent: f64,
    pub years: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InflationPlan {
    pub present_amount: f64,
    pub annual_inflation_percent: f64,
    pub years: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoanOffer {
    pub id: String,
    pub name: String,
    pub terms: LoanTerms,
    pub processing_fee: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssetCategory {
    Cash,
    BankDeposits,
    Investments,
    Retirement,
    RealEstate,
    Gold,
    Vehicles,
    Other,
}

impl AssetCategory {
    pub fn is_liquid(self) -> bool {
        matches!(self, AssetCategory::Cash | AssetCategory::BankDeposits)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LiabilityCategory {
    HomeLoan,
    CarLoan,
    EducationLoan,
    PersonalLoan,
    CreditCard,
    Other,
}

impl LiabilityCategory {
    pub fn is_unsecured(self) -> bool {
        matches!(
            self,
            LiabilityCategory::PersonalLoan | LiabilityCategory::CreditCard
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry<C> {
    pub id: String,
    pub name: String,
    pub value: f64,
    pub category: C,
}

pub type AssetEntry = LedgerEntry<AssetCategory>;
pub type LiabilityEntry = LedgerEntry<LiabilityCategory>;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxRegime {
    New,
    Old,
}

/// Old-regime deductions as claimed; caps are applied during computation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Deductions {
    pub section_80c: f64,
    pub section_80d: f64,
    pub nps_80ccd_1b: f64,
    pub home_loan_interest: f64,
    pub savings_interest_80tta: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaxProfile {
    pub gross_income: f64,
    pub regime: TaxRegime,
    pub deductions: Deductions,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxSlab {
    #[serde(serialize_with = "whole_units")]
    pub lower: f64,
    #[serde(serialize_with = "whole_units_opt")]
    pub upper: Option<f64>,
    pub rate_percent: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthYear {
    pub year: u32,
    #[serde(serialize_with = "whole_units")]
    pub invested: f64,
    #[serde(serialize_with = "whole_units")]
    pub value: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SipResult {
    #[serde(serialize_with = "whole_units")]
    pub future_value: f64,
    #[serde(serialize_with = "whole_units")]
    pub total_invested: f64,
    #[serde(serialize_with = "whole_units")]
    pub estimated_returns: f64,
    pub yearly: Vec<GrowthYear>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorpusYear {
    pub year: u32,
    #[serde(serialize_with = "whole_units")]
    pub withdrawn: f64,
    #[serde(serialize_with = "whole_units")]
    pub closing_corpus: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwpResult {
    #[serde(serialize_with = "whole_units")]
    pub initial_corpus: f64,
    #[serde(serialize_with = "whole_units")]
    pub total_withdrawn: f64,
    #[serde(serialize_with = "whole_units")]
    pub final_corpus: f64,
    pub corpus_depleted: bool,
    pub months_lasted: u32,
    pub yearly: Vec<CorpusYear>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RdResult {
    #[serde(serialize_with = "whole_units")]
    pub maturity_value: f64,
    #[serde(serialize_with = "whole_units")]
    pub total_deposited: f64,
    #[serde(serialize_with = "whole_units")]
    pub interest_earned: f64,
    pub effective_annual_yield_percent: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InflationYear {
    pub year: u32,
    #[serde(serialize_with = "whole_units")]
    pub value_needed: f64,
    #[serde(serialize_with = "whole_units")]
    pub purchasing_power: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InflationResult {
    #[serde(serialize_with = "whole_units")]
    pub present_amount: f64,
    #[serde(serialize_with = "whole_units")]
    pub future_value_needed: f64,
    #[serde(serialize_with = "whole_units")]
    pub future_purchasing_power: f64,
    #[serde(serialize_with = "whole_units")]
    pub purchasing_power_loss: f64,
    pub yearly: Vec<InflationYear>,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationRow {
    pub month: u32,
    #[serde(serialize_with = "whole_units")]
    pub interest: f64,
    #[serde(serialize_with = "whole_units")]
    pub principal: f64,
    #[serde(serialize_with = "whole_units")]
    pub balance: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationYear {
    pub year: u32,
    #[serde(serialize_with = "whole_units")]
    pub principal_paid: f64,
    #[serde(serialize_with = "whole_units")]
    pub interest_paid: f64,
    #[serde(serialize_with = "whole_units")]
    pub closing_balance: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmiResult {
    #[serde(serialize_with = "whole_units")]
    pub principal: f64,
    #[serde(serialize_with = "whole_units")]
    pub emi: f64,
    #[serde(serialize_with = "whole_units")]
    pub total_payable: f64,
    #[serde(serialize_with = "whole_units")]
    pub total_interest: f64,
    pub yearly: Vec<AmortizationYear>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanQuote {
    pub id: String,
    pub name: String,
    #[serde(serialize_with = "whole_units")]
    pub emi: f64,
    #[serde(serialize_with = "whole_units")]
    pub total_interest: f64,
    #[serde(serialize_with = "whole_units")]
    pub total_payable: f64,
    #[serde(serialize_with = "whole_units")]
    pub processing_fee: f64,
    #[serde(serialize_with = "whole_units")]
    pub total_cost: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanComparison {
    pub loans: Vec<LoanQuote>,
    pub cheapest_id: String,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal<C> {
    pub category: C,
    #[serde(serialize_with = "whole_units")]
    pub total: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetWorthResult {
    #[serde(serialize_with = "whole_units")]
    pub total_assets: f64,
    #[serde(serialize_with = "whole_units")]
    pub total_liabilities: f64,
    #[serde(serialize_with = "whole_units")]
    pub net_worth: f64,
    pub debt_to_asset_ratio: Option<f64>,
    pub liquidity_ratio: Option<f64>,
    pub asset_breakdown: Vec<CategoryTotal<AssetCategory>>,
    pub liability_breakdown: Vec<CategoryTotal<LiabilityCategory>>,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlabTax {
    #[serde(flatten)]
    pub slab: TaxSlab,
    #[serde(serialize_with = "whole_units")]
    pub taxable_amount: f64,
    #[serde(serialize_with = "whole_units")]
    pub tax: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegimeTax {
    pub regime: TaxRegime,
    #[serde(serialize_with = "whole_units")]
    pub gross_income: f64,
    #[serde(serialize_with = "whole_units")]
    pub standard_deduction: f64,
    #[serde(serialize_with = "whole_units")]
    pub deductions_allowed: f64,
    #[serde(serialize_with = "whole_units")]
    pub taxable_income: f64,
    #[serde(serialize_with = "whole_units")]
    pub tax_before_cess: f64,
    #[serde(serialize_with = "whole_units")]
    pub cess: f64,
    #[serde(serialize_with = "whole_units")]
    pub total_tax: f64,
    pub effective_rate_percent: f64,
    pub slabs: Vec<SlabTax>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxComparison {
    pub new_regime: RegimeTax,
    pub old_regime: RegimeTax,
    pub recommended: TaxRegime,
    #[serde(serialize_with = "whole_units")]
    pub savings: f64,
}
