use std::collections::HashSet;

use super::error::{
    CalcError, CalcResult, ensure_finite, require_non_negative, require_positive, require_years,
};
use super::types::{
    AmortizationRow, AmortizationYear, EmiResult, LoanComparison, LoanOffer, LoanQuote, LoanTerms,
};

fn validate_terms(terms: &LoanTerms) -> CalcResult<()> {
    require_positive("principal", terms.principal)?;
    require_non_negative("annualRatePercent", terms.annual_rate_percent)?;
    require_years("tenureYears", terms.tenure_years)
}

/// Equated monthly instalment for an amortizing loan.
pub fn monthly_emi(terms: &LoanTerms) -> CalcResult<f64> {
    validate_terms(terms)?;
    let i = terms.monthly_rate();
    let months = terms.total_months();
    if i == 0.0 {
        return Ok(terms.principal / months as f64);
    }
    let growth = (1.0 + i).powi(months as i32);
    ensure_finite("emi", terms.principal * i * growth / (growth - 1.0))
}

pub fn amortization_schedule(terms: &LoanTerms) -> CalcResult<Vec<AmortizationRow>> {
    let emi = monthly_emi(terms)?;
    let i = terms.monthly_rate();
    let months = terms.total_months();

    let mut remaining = terms.principal;
    let mut rows = Vec::with_capacity(months as usize);
    for month in 1..=months {
        let interest = remaining * i;
        let principal = emi - interest;
        remaining -= principal;
        // the last instalment absorbs floating-point residue
        let balance = if month == months { 0.0 } else { remaining.max(0.0) };
        rows.push(AmortizationRow {
            month,
            interest,
            principal,
            balance,
        });
    }
    Ok(rows)
}

pub fn calculate_emi(terms: &LoanTerms) -> CalcResult<EmiResult> {
    let emi = monthly_emi(terms)?;
    let rows = amortization_schedule(terms)?;

    let mut yearly: Vec<AmortizationYear> = Vec::with_capacity(terms.tenure_years as usize);
    for chunk in rows.chunks(12) {
        let year = chunk[0].month.div_ceil(12);
        let principal_paid = chunk.iter().map(|r| r.principal).sum();
        let interest_paid = chunk.iter().map(|r| r.interest).sum();
        let closing_balance = chunk.last().map(|r| r.balance).unwrap_or(0.0);
        yearly.push(AmortizationYear {
            year,
            principal_paid,
            interest_paid,
            closing_balance,
        });
    }

    let total_payable = ensure_finite("totalPayable", emi * terms.total_months() as f64)?;
    Ok(EmiResult {
        principal: terms.principal,
        emi,
        total_payable,
        total_interest: total_payable - terms.principal,
        yearly,
    })
}

/// Quotes every offer independently and picks the one with the lowest total
/// cost. Ties keep the earliest offer.
pub fn compare_loans(offers: &[LoanOffer]) -> CalcResult<LoanComparison> {
    if offers.is_empty() {
        return Err(CalcError::invalid("loans", "at least one loan is required"));
    }

    let mut seen = HashSet::with_capacity(offers.len());
    let mut loans = Vec::with_capacity(offers.len());
    for offer in offers {
        if !seen.insert(offer.id.as_str()) {
            return Err(CalcError::invalid(
                "loans",
                format!("duplicate loan id {:?}", offer.id),
            ));
        }
        require_non_negative("processingFee", offer.processing_fee)?;
        let emi = monthly_emi(&offer.terms)?;
        let total_payable =
            ensure_finite("totalPayable", emi * offer.terms.total_months() as f64)?;
        let total_cost = ensure_finite("totalCost", total_payable + offer.processing_fee)?;
        loans.push(LoanQuote {
            id: offer.id.clone(),
            name: offer.name.clone(),
            emi,
            total_interest: total_payable - offer.terms.principal,
            total_payable,
            processing_fee: offer.processing_fee,
            total_cost,
        });
    }

    let mut cheapest = &loans[0];
    for quote in &loans[1..] {
        if quote.total_cost < cheapest.total_cost {
            cheapest = quote;
        }
    }
    let cheapest_id = cheapest.id.clone();

    Ok(LoanComparison { loans, cheapest_id })
}
