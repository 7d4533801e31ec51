use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router, async_trait,
    extract::{FromRequest, FromRequestParts, Json, Path, Query, Request, State},
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tokio::net::TcpListener;

use crate::calc::{
    AmortizationRow, AssetCategory, AssetEntry, CalcResult, Deductions, EmiResult, InflationPlan,
    LedgerEntry, LiabilityCategory, LiabilityEntry, LoanOffer, LoanTerms, RdPlan, SipPlan,
    SwpPlan, TaxProfile, TaxRegime, amortization_schedule, calculate_emi, calculate_net_worth,
    calculate_tax, compare_loans, compare_regimes, inflation_impact, rd_maturity,
    simulate_swp, sip_future_value,
};
use crate::content::ContentRepository;

#[derive(Clone)]
pub struct AppState {
    content: Arc<dyn ContentRepository>,
}

impl AppState {
    pub fn new(content: Arc<dyn ContentRepository>) -> Self {
        Self { content }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiTaxRegime {
    #[serde(alias = "NEW", alias = "New")]
    New,
    #[serde(alias = "OLD", alias = "Old")]
    Old,
}

impl From<ApiTaxRegime> for TaxRegime {
    fn from(value: ApiTaxRegime) -> Self {
        match value {
            ApiTaxRegime::New => TaxRegime::New,
            ApiTaxRegime::Old => TaxRegime::Old,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiAssetCategory {
    Cash,
    #[serde(alias = "bankDeposits", alias = "bank_deposits", alias = "bank")]
    BankDeposits,
    Investments,
    Retirement,
    #[serde(alias = "realEstate", alias = "real_estate", alias = "property")]
    RealEstate,
    Gold,
    Vehicles,
    Other,
}

impl From<ApiAssetCategory> for AssetCategory {
    fn from(value: ApiAssetCategory) -> Self {
        match value {
            ApiAssetCategory::Cash => AssetCategory::Cash,
            ApiAssetCategory::BankDeposits => AssetCategory::BankDeposits,
            ApiAssetCategory::Investments => AssetCategory::Investments,
            ApiAssetCategory::Retirement => AssetCategory::Retirement,
            ApiAssetCategory::RealEstate => AssetCategory::RealEstate,
            ApiAssetCategory::Gold => AssetCategory::Gold,
            ApiAssetCategory::Vehicles => AssetCategory::Vehicles,
            ApiAssetCategory::Other => AssetCategory::Other,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiLiabilityCategory {
    #[serde(alias = "homeLoan", alias = "home_loan")]
    HomeLoan,
    #[serde(alias = "carLoan", alias = "car_loan")]
    CarLoan,
    #[serde(alias = "educationLoan", alias = "education_loan")]
    EducationLoan,
    #[serde(alias = "personalLoan", alias = "personal_loan")]
    PersonalLoan,
    #[serde(alias = "creditCard", alias = "credit_card")]
    CreditCard,
    Other,
}

impl From<ApiLiabilityCategory> for LiabilityCategory {
    fn from(value: ApiLiabilityCategory) -> Self {
        match value {
            ApiLiabilityCategory::HomeLoan => LiabilityCategory::HomeLoan,
            ApiLiabilityCategory::CarLoan => LiabilityCategory::CarLoan,
            ApiLiabilityCategory::EducationLoan => LiabilityCategory::EducationLoan,
            ApiLiabilityCategory::PersonalLoan => LiabilityCategory::PersonalLoan,
            ApiLiabilityCategory::CreditCard => LiabilityCategory::CreditCard,
            ApiLiabilityCategory::Other => LiabilityCategory::Other,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SipPayload {
    monthly_amount: Option<f64>,
    annual_return: Option<f64>,
    years: Option<u32>,
    step_up: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SwpPayload {
    corpus: Option<f64>,
    monthly_withdrawal: Option<f64>,
    annual_return: Option<f64>,
    years: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RdPayload {
    monthly_deposit: Option<f64>,
    annual_rate: Option<f64>,
    years: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct EmiPayload {
    principal: Option<f64>,
    annual_rate: Option<f64>,
    tenure_years: Option<u32>,
    include_schedule: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct InflationPayload {
    amount: Option<f64>,
    inflation_rate: Option<f64>,
    years: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct TaxPayload {
    gross_income: Option<f64>,
    regime: Option<ApiTaxRegime>,
    #[serde(alias = "section80C")]
    section80c: Option<f64>,
    #[serde(alias = "section80D")]
    section80d: Option<f64>,
    #[serde(alias = "nps80ccd1b")]
    nps: Option<f64>,
    home_loan_interest: Option<f64>,
    #[serde(alias = "section80tta")]
    savings_interest: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoanOfferPayload {
    id: Option<String>,
    name: Option<String>,
    principal: f64,
    annual_rate: f64,
    tenure_years: u32,
    #[serde(default)]
    processing_fee: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LoanComparePayload {
    loans: Vec<LoanOfferPayload>,
}

#[derive(Debug, Deserialize)]
struct EntryPayload<C> {
    id: Option<String>,
    #[serde(default)]
    name: String,
    value: f64,
    category: C,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NetWorthPayload {
    #[serde(default)]
    assets: Vec<EntryPayload<ApiAssetCategory>>,
    #[serde(default)]
    liabilities: Vec<EntryPayload<ApiLiabilityCategory>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GlossaryQuery {
    q: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BlogQuery {
    tag: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EmiResponse {
    #[serde(flatten)]
    result: EmiResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    schedule: Option<Vec<AmortizationRow>>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct ServiceIndex {
    service: &'static str,
    version: &'static str,
    endpoints: &'static [&'static str],
}

const ENDPOINTS: &[&str] = &[
    "/api/sip",
    "/api/swp",
    "/api/rd",
    "/api/emi",
    "/api/loans/compare",
    "/api/inflation",
    "/api/net-worth",
    "/api/tax",
    "/api/glossary",
    "/api/glossary/:slug",
    "/api/blog",
    "/health",
];

// Starting values match the calculators' initial form state.
fn default_sip_plan() -> SipPlan {
    SipPlan {
        monthly_amount: 5_000.0,
        annual_return_percent: 12.0,
        years: 10,
        annual_step_up_percent: None,
    }
}

fn default_swp_plan() -> SwpPlan {
    SwpPlan {
        initial_corpus: 1_000_000.0,
        monthly_withdrawal: 10_000.0,
        annual_return_percent: 8.0,
        years: 10,
    }
}

fn default_rd_plan() -> RdPlan {
    RdPlan {
        monthly_deposit: 5_000.0,
        annual_rate_percent: 7.0,
        years: 5,
    }
}

fn default_loan_terms() -> LoanTerms {
    LoanTerms {
        principal: 2_000_000.0,
        annual_rate_percent: 8.5,
        tenure_years: 20,
    }
}

fn default_inflation_plan() -> InflationPlan {
    InflationPlan {
        present_amount: 100_000.0,
        annual_inflation_percent: 6.0,
        years: 10,
    }
}

const DEFAULT_GROSS_INCOME: f64 = 1_200_000.0;

fn sip_plan_from_payload(payload: SipPayload) -> SipPlan {
    let mut plan = default_sip_plan();
    if let Some(v) = payload.monthly_amount {
        plan.monthly_amount = v;
    }
    if let Some(v) = payload.annual_return {
        plan.annual_return_percent = v;
    }
    if let Some(v) = payload.years {
        plan.years = v;
    }
    plan.annual_step_up_percent = payload.step_up;
    plan
}

fn swp_plan_from_payload(payload: SwpPayload) -> SwpPlan {
    let mut plan = default_swp_plan();
    if let Some(v) = payload.corpus {
        plan.initial_corpus = v;
    }
    if let Some(v) = payload.monthly_withdrawal {
        plan.monthly_withdrawal = v;
    }
    if let Some(v) = payload.annual_return {
        plan.annual_return_percent = v;
    }
    if let Some(v) = payload.years {
        plan.years = v;
    }
    plan
}

fn rd_plan_from_payload(payload: RdPayload) -> RdPlan {
    let mut plan = default_rd_plan();
    if let Some(v) = payload.monthly_deposit {
        plan.monthly_deposit = v;
    }
    if let Some(v) = payload.annual_rate {
        plan.annual_rate_percent = v;
    }
    if let Some(v) = payload.years {
        plan.years = v;
    }
    plan
}

fn loan_terms_from_payload(payload: &EmiPayload) -> LoanTerms {
    let mut terms = default_loan_terms();
    if let Some(v) = payload.principal {
        terms.principal = v;
    }
    if let Some(v) = payload.annual_rate {
        terms.annual_rate_percent = v;
    }
    if let Some(v) = payload.tenure_years {
        terms.tenure_years = v;
    }
    terms
}

fn inflation_plan_from_payload(payload: InflationPayload) -> InflationPlan {
    let mut plan = default_inflation_plan();
    if let Some(v) = payload.amount {
        plan.present_amount = v;
    }
    if let Some(v) = payload.inflation_rate {
        plan.annual_inflation_percent = v;
    }
    if let Some(v) = payload.years {
        plan.years = v;
    }
    plan
}

fn deductions_from_payload(payload: &TaxPayload) -> Deductions {
    Deductions {
        section_80c: payload.section80c.unwrap_or(0.0),
        section_80d: payload.section80d.unwrap_or(0.0),
        nps_80ccd_1b: payload.nps.unwrap_or(0.0),
        home_loan_interest: payload.home_loan_interest.unwrap_or(0.0),
        savings_interest_80tta: payload.savings_interest.unwrap_or(0.0),
    }
}

fn loan_offers_from_payload(payload: LoanComparePayload) -> Vec<LoanOffer> {
    payload
        .loans
        .into_iter()
        .enumerate()
        .map(|(idx, loan)| {
            let id = loan.id.unwrap_or_else(|| format!("loan-{}", idx + 1));
            let name = loan.name.unwrap_or_else(|| format!("Loan {}", idx + 1));
            LoanOffer {
                id,
                name,
                terms: LoanTerms {
                    principal: loan.principal,
                    annual_rate_percent: loan.annual_rate,
                    tenure_years: loan.tenure_years,
                },
                processing_fee: loan.processing_fee,
            }
        })
        .collect()
}

fn ledger_from_payload<A, C>(prefix: &str, entries: Vec<EntryPayload<A>>) -> Vec<LedgerEntry<C>>
where
    A: Into<C>,
{
    entries
        .into_iter()
        .enumerate()
        .map(|(idx, entry)| LedgerEntry {
            id: entry.id.unwrap_or_else(|| format!("{prefix}-{}", idx + 1)),
            name: entry.name,
            value: entry.value,
            category: entry.category.into(),
        })
        .collect()
}

/// Query-string extractor whose rejections use the JSON error body.
struct ApiQuery<T>(T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(ApiQuery(value)),
            Err(rejection) => Err(rejected_input_response(&rejection.body_text())),
        }
    }
}

/// JSON body extractor whose rejections use the JSON error body.
struct ApiJson<T>(T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(rejected_input_response(&rejection.body_text())),
        }
    }
}

fn rejected_input_response(msg: &str) -> Response {
    tracing::warn!(error = msg, "rejected request payload");
    error_response(StatusCode::BAD_REQUEST, msg)
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/api/sip", get(sip_get_handler).post(sip_post_handler))
        .route("/api/swp", get(swp_get_handler).post(swp_post_handler))
        .route("/api/rd", get(rd_get_handler).post(rd_post_handler))
        .route("/api/emi", get(emi_get_handler).post(emi_post_handler))
        .route("/api/loans/compare", post(loan_compare_handler))
        .route(
            "/api/inflation",
            get(inflation_get_handler).post(inflation_post_handler),
        )
        .route("/api/net-worth", post(net_worth_handler))
        .route("/api/tax", get(tax_get_handler).post(tax_post_handler))
        .route("/api/glossary", get(glossary_handler))
        .route("/api/glossary/:slug", get(glossary_term_handler))
        .route("/api/blog", get(blog_handler))
        .fallback(not_found_handler)
        .with_state(state)
}

pub async fn run_http_server(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let app = router(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("finsuite HTTP API listening on http://{addr}");

    axum::serve(listener, app).await
}

async fn index_handler() -> Response {
    json_response(
        StatusCode::OK,
        ServiceIndex {
            service: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            endpoints: ENDPOINTS,
        },
    )
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn sip_get_handler(ApiQuery(payload): ApiQuery<SipPayload>) -> Response {
    sip_handler_impl(payload)
}

async fn sip_post_handler(ApiJson(payload): ApiJson<SipPayload>) -> Response {
    sip_handler_impl(payload)
}

fn sip_handler_impl(payload: SipPayload) -> Response {
    let plan = sip_plan_from_payload(payload);
    tracing::debug!(?plan, "sip request");
    calc_response("sip", sip_future_value(&plan))
}

async fn swp_get_handler(ApiQuery(payload): ApiQuery<SwpPayload>) -> Response {
    swp_handler_impl(payload)
}

async fn swp_post_handler(ApiJson(payload): ApiJson<SwpPayload>) -> Response {
    swp_handler_impl(payload)
}

fn swp_handler_impl(payload: SwpPayload) -> Response {
    let plan = swp_plan_from_payload(payload);
    tracing::debug!(?plan, "swp request");
    calc_response("swp", simulate_swp(&plan))
}

async fn rd_get_handler(ApiQuery(payload): ApiQuery<RdPayload>) -> Response {
    rd_handler_impl(payload)
}

async fn rd_post_handler(ApiJson(payload): ApiJson<RdPayload>) -> Response {
    rd_handler_impl(payload)
}

fn rd_handler_impl(payload: RdPayload) -> Response {
    let plan = rd_plan_from_payload(payload);
    tracing::debug!(?plan, "rd request");
    calc_response("rd", rd_maturity(&plan))
}

async fn emi_get_handler(ApiQuery(payload): ApiQuery<EmiPayload>) -> Response {
    emi_handler_impl(payload)
}

async fn emi_post_handler(ApiJson(payload): ApiJson<EmiPayload>) -> Response {
    emi_handler_impl(payload)
}

fn emi_handler_impl(payload: EmiPayload) -> Response {
    let terms = loan_terms_from_payload(&payload);
    tracing::debug!(?terms, "emi request");
    let include_schedule = payload.include_schedule.unwrap_or(false);
    calc_response("emi", build_emi_response(&terms, include_schedule))
}

fn build_emi_response(terms: &LoanTerms, include_schedule: bool) -> CalcResult<EmiResponse> {
    let result = calculate_emi(terms)?;
    let schedule = if include_schedule {
        Some(amortization_schedule(terms)?)
    } else {
        None
    };
    Ok(EmiResponse { result, schedule })
}

async fn loan_compare_handler(ApiJson(payload): ApiJson<LoanComparePayload>) -> Response {
    let offers = loan_offers_from_payload(payload);
    tracing::debug!(count = offers.len(), "loan comparison request");
    calc_response("loan-compare", compare_loans(&offers))
}

async fn inflation_get_handler(ApiQuery(payload): ApiQuery<InflationPayload>) -> Response {
    inflation_handler_impl(payload)
}

async fn inflation_post_handler(ApiJson(payload): ApiJson<InflationPayload>) -> Response {
    inflation_handler_impl(payload)
}

fn inflation_handler_impl(payload: InflationPayload) -> Response {
    let plan = inflation_plan_from_payload(payload);
    tracing::debug!(?plan, "inflation request");
    calc_response("inflation", inflation_impact(&plan))
}

async fn net_worth_handler(ApiJson(payload): ApiJson<NetWorthPayload>) -> Response {
    let assets: Vec<AssetEntry> = ledger_from_payload("asset", payload.assets);
    let liabilities: Vec<LiabilityEntry> = ledger_from_payload("liability", payload.liabilities);
    tracing::debug!(
        assets = assets.len(),
        liabilities = liabilities.len(),
        "net worth request"
    );
    calc_response("net-worth", calculate_net_worth(&assets, &liabilities))
}

async fn tax_get_handler(ApiQuery(payload): ApiQuery<TaxPayload>) -> Response {
    tax_handler_impl(payload)
}

async fn tax_post_handler(ApiJson(payload): ApiJson<TaxPayload>) -> Response {
    tax_handler_impl(payload)
}

/// With a regime the response is that regime's computation; without one both
/// regimes are compared.
fn tax_handler_impl(payload: TaxPayload) -> Response {
    let gross_income = payload.gross_income.unwrap_or(DEFAULT_GROSS_INCOME);
    let deductions = deductions_from_payload(&payload);
    tracing::debug!(gross_income, regime = ?payload.regime, "tax request");
    match payload.regime {
        Some(regime) => calc_response(
            "tax",
            calculate_tax(&TaxProfile {
                gross_income,
                regime: regime.into(),
                deductions,
            }),
        ),
        None => calc_response("tax", compare_regimes(gross_income, &deductions)),
    }
}

async fn glossary_handler(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<GlossaryQuery>,
) -> Response {
    let terms = match query.q.as_deref() {
        Some(q) => state.content.search_terms(q),
        None => state.content.glossary(),
    };
    json_response(StatusCode::OK, terms)
}

async fn glossary_term_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Response {
    match state.content.find_term(&slug) {
        Some(term) => json_response(StatusCode::OK, term),
        None => error_response(
            StatusCode::NOT_FOUND,
            &format!("Unknown glossary term: {slug}"),
        ),
    }
}

async fn blog_handler(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<BlogQuery>,
) -> Response {
    json_response(StatusCode::OK, state.content.blog_posts(query.tag.as_deref()))
}

fn calc_response<T: Serialize>(calculator: &'static str, result: CalcResult<T>) -> Response {
    match result {
        Ok(body) => json_response(StatusCode::OK, body),
        Err(err) => {
            tracing::warn!(calculator, error = %err, "rejected calculator input");
            error_response(StatusCode::BAD_REQUEST, &err.to_string())
        }
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}
