use super::error::{
    CalcResult, ensure_finite, require_non_negative, require_positive, require_years,
};
use super::types::{
    GrowthYear, InflationPlan, InflationResult, InflationYear, RdPlan, RdResult, SipPlan,
    SipResult,
};

pub fn sip_future_value(plan: &SipPlan) -> CalcResult<SipResult> {
    validate_sip(plan)?;
    match plan.annual_step_up_percent {
        Some(step_up) if step_up > 0.0 => accumulate_sip(plan, step_up),
        _ => plain_sip(plan),
    }
}

fn validate_sip(plan: &SipPlan) -> CalcResult<()> {
    require_positive("monthlyAmount", plan.monthly_amount)?;
    require_non_negative("annualReturnPercent", plan.annual_return_percent)?;
    require_years("years", plan.years)?;
    if let Some(step_up) = plan.annual_step_up_percent {
        require_non_negative("annualStepUpPercent", step_up)?;
    }
    Ok(())
}

/// Value after `months` of fixed contributions paid at the start of each month.
fn annuity_due_value(monthly: f64, monthly_rate: f64, months: u32) -> f64 {
    if monthly_rate == 0.0 {
        return monthly * months as f64;
    }
    let growth = (1.0 + monthly_rate).powi(months as i32);
    monthly * (growth - 1.0) / monthly_rate * (1.0 + monthly_rate)
}

fn plain_sip(plan: &SipPlan) -> CalcResult<SipResult> {
    let i = plan.annual_return_percent / 12.0 / 100.0;
    let months = plan.years * 12;

    let future_value = ensure_finite(
        "futureValue",
        annuity_due_value(plan.monthly_amount, i, months),
    )?;
    let total_invested = plan.monthly_amount * months as f64;

    let yearly = (1..=plan.years)
        .map(|year| GrowthYear {
            year,
            invested: plan.monthly_amount * (year * 12) as f64,
            value: annuity_due_value(plan.monthly_amount, i, year * 12),
        })
        .collect();

    Ok(SipResult {
        future_value,
        total_invested,
        estimated_returns: future_value - total_invested,
        yearly,
    })
}

// Contributions step up once per year and each one compounds to the horizon
// on its own, so this walks every month rather than using a closed form.
fn accumulate_sip(plan: &SipPlan, step_up_percent: f64) -> CalcResult<SipResult> {
    let i = plan.annual_return_percent / 12.0 / 100.0;
    let step = 1.0 + step_up_percent / 100.0;

    let mut value = 0.0;
    let mut invested = 0.0;
    let mut yearly = Vec::with_capacity(plan.years as usize);
    for year in 0..plan.years {
        let contribution = plan.monthly_amount * step.powi(year as i32);
        for _ in 0..12 {
            value = (value + contribution) * (1.0 + i);
            invested += contribution;
        }
        yearly.push(GrowthYear {
            year: year + 1,
            invested,
            value,
        });
    }

    let future_value = ensure_finite("futureValue", value)?;
    Ok(SipResult {
        future_value,
        total_invested: invested,
        estimated_returns: future_value - invested,
        yearly,
    })
}

pub fn rd_maturity(plan: &RdPlan) -> CalcResult<RdResult> {
    require_positive("monthlyDeposit", plan.monthly_deposit)?;
    require_non_negative("annualRatePercent", plan.annual_rate_percent)?;
    require_years("years", plan.years)?;

    let quarterly_rate = plan.annual_rate_percent / 4.0 / 100.0;
    let months = plan.years * 12;

    let mut maturity_value = 0.0;
    for deposit_index in 0..months {
        let quarters = remaining_quarters(months, deposit_index);
        maturity_value += plan.monthly_deposit * (1.0 + quarterly_rate).powi(quarters as i32);
    }
    let maturity_value = ensure_finite("maturityValue", maturity_value)?;
    let total_deposited = plan.monthly_deposit * months as f64;

    Ok(RdResult {
        maturity_value,
        total_deposited,
        interest_earned: maturity_value - total_deposited,
        effective_annual_yield_percent: ((1.0 + quarterly_rate).powi(4) - 1.0) * 100.0,
    })
}

/// Full quarters a deposit made at `deposit_index` earns before maturity.
fn remaining_quarters(months: u32, deposit_index: u32) -> u32 {
    (months - deposit_index - 1) / 3 + 1
}

pub fn inflation_impact(plan: &InflationPlan) -> CalcResult<InflationResult> {
    require_positive("presentAmount", plan.present_amount)?;
    require_non_negative("annualInflationPercent", plan.annual_inflation_percent)?;
    require_years("years", plan.years)?;

    let factor = 1.0 + plan.annual_inflation_percent / 100.0;
    let future_value_needed = ensure_finite(
        "futureValueNeeded",
        plan.present_amount * factor.powi(plan.years as i32),
    )?;
    let future_purchasing_power = plan.present_amount * factor.powi(-(plan.years as i32));

    let yearly = (1..=plan.years)
        .map(|year| InflationYear {
            year,
            value_needed: plan.present_amount * factor.powi(year as i32),
            purchasing_power: plan.present_amount * factor.powi(-(year as i32)),
        })
        .collect();

    Ok(InflationResult {
        present_amount: plan.present_amount,
        future_value_needed,
        future_purchasing_power,
        purchasing_power_loss: plan.present_amount - future_purchasing_power,
        yearly,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, proptest};

    fn assert_approx_tol(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    fn sample_sip() -> SipPlan {
        SipPlan {
            monthly_amount: 5_000.0,
            annual_return_percent: 12.0,
            years: 10,
            annual_step_up_percent: None,
        }
    }

    #[test]
    fn sip_matches_annuity_due_formula() {
        let result = sip_future_value(&sample_sip()).expect("valid plan");
        let i: f64 = 0.01;
        let expected = 5_000.0 * ((1.0 + i).powi(120) - 1.0) / i * (1.0 + i);
        assert_approx_tol(result.future_value, expected, 1e-6);
        assert_approx_tol(result.total_invested, 600_000.0, 1e-9);
        // 5000/month at 12% for 10 years is a well-known ~11.6 lakh.
        assert_approx_tol(result.future_value, 1_161_695.0, 1.0);
        assert_eq!(result.yearly.len(), 10);
        assert_approx_tol(result.yearly[9].value, result.future_value, 1e-6);
    }

    #[test]
    fn sip_zero_return_is_sum_of_contributions() {
        let mut plan = sample_sip();
        plan.annual_return_percent = 0.0;
        let result = sip_future_value(&plan).expect("valid plan");
        assert_eq!(result.future_value, 5_000.0 * 120.0);
        assert_eq!(result.estimated_returns, 0.0);
    }

    #[test]
    fn step_up_zero_degenerates_to_plain_sip() {
        let plain = sip_future_value(&sample_sip()).expect("valid plan");
        let flat = accumulate_sip(&sample_sip(), 0.0).expect("valid plan");
        assert_approx_tol(flat.future_value, plain.future_value, 1e-4);
        assert_approx_tol(flat.total_invested, plain.total_invested, 1e-6);
    }

    #[test]
    fn step_up_raises_contribution_each_year() {
        let mut plan = sample_sip();
        plan.years = 2;
        plan.annual_return_percent = 0.0;
        plan.annual_step_up_percent = Some(10.0);
        let result = sip_future_value(&plan).expect("valid plan");
        assert_approx_tol(result.total_invested, 12.0 * 5_000.0 + 12.0 * 5_500.0, 1e-6);
        assert_approx_tol(result.future_value, result.total_invested, 1e-6);
    }

    #[test]
    fn step_up_compounds_each_contribution_to_the_horizon() {
        let plan = SipPlan {
            monthly_amount: 1_000.0,
            annual_return_percent: 12.0,
            years: 2,
            annual_step_up_percent: Some(10.0),
        };
        let result = sip_future_value(&plan).expect("valid plan");

        let i: f64 = 0.01;
        let expected: f64 = (0..24)
            .map(|month| {
                let contribution = if month < 12 { 1_000.0 } else { 1_100.0 };
                let remaining_months = 23 - month;
                contribution * (1.0 + i).powi(remaining_months + 1)
            })
            .sum();
        assert_approx_tol(result.future_value, expected, 1e-6);
        assert_approx_tol(result.future_value, 28_524.1323, 1e-3);
        assert_approx_tol(result.total_invested, 25_200.0, 1e-9);
        assert_approx_tol(result.yearly[1].value, result.future_value, 1e-9);
    }

    #[test]
    fn sip_yearly_series_tracks_each_year_end() {
        let result = sip_future_value(&sample_sip()).expect("valid plan");
        let third = &result.yearly[2];
        assert_eq!(third.year, 3);
        assert_approx_tol(third.invested, 180_000.0, 1e-9);
        assert_approx_tol(third.value, 217_538.2357, 1e-3);
    }

    #[test]
    fn step_up_beats_plain_sip() {
        let mut plan = sample_sip();
        let plain = sip_future_value(&plan).expect("valid plan");
        plan.annual_step_up_percent = Some(10.0);
        let stepped = sip_future_value(&plan).expect("valid plan");
        assert!(stepped.future_value > plain.future_value);
        assert!(stepped.total_invested > plain.total_invested);
    }

    #[test]
    fn sip_rejects_invalid_inputs() {
        let mut plan = sample_sip();
        plan.monthly_amount = 0.0;
        assert!(sip_future_value(&plan).is_err());

        let mut plan = sample_sip();
        plan.annual_return_percent = -1.0;
        assert!(sip_future_value(&plan).is_err());

        let mut plan = sample_sip();
        plan.annual_step_up_percent = Some(-5.0);
        assert!(sip_future_value(&plan).is_err());

        let mut plan = sample_sip();
        plan.years = 0;
        assert!(sip_future_value(&plan).is_err());
    }

    #[test]
    fn remaining_quarters_aligns_to_quarter_boundaries() {
        assert_eq!(remaining_quarters(12, 0), 4);
        assert_eq!(remaining_quarters(12, 2), 4);
        assert_eq!(remaining_quarters(12, 3), 3);
        assert_eq!(remaining_quarters(12, 11), 1);
    }

    #[test]
    fn rd_one_year_sums_quarterly_compounded_deposits() {
        let plan = RdPlan {
            monthly_deposit: 1_000.0,
            annual_rate_percent: 8.0,
            years: 1,
        };
        let result = rd_maturity(&plan).expect("valid plan");
        let q: f64 = 0.02;
        let expected = 3.0
            * 1_000.0
            * ((1.0 + q).powi(4) + (1.0 + q).powi(3) + (1.0 + q).powi(2) + (1.0 + q));
        assert_approx_tol(result.maturity_value, expected, 1e-6);
        assert_approx_tol(result.total_deposited, 12_000.0, 1e-9);
        assert!(result.interest_earned > 0.0);
        assert_approx_tol(result.effective_annual_yield_percent, 8.243216, 1e-6);
    }

    #[test]
    fn rd_zero_rate_returns_deposits() {
        let plan = RdPlan {
            monthly_deposit: 2_500.0,
            annual_rate_percent: 0.0,
            years: 3,
        };
        let result = rd_maturity(&plan).expect("valid plan");
        assert_eq!(result.maturity_value, 2_500.0 * 36.0);
        assert_eq!(result.interest_earned, 0.0);
    }

    #[test]
    fn inflation_value_and_purchasing_power_are_reciprocal() {
        let plan = InflationPlan {
            present_amount: 100_000.0,
            annual_inflation_percent: 6.0,
            years: 10,
        };
        let result = inflation_impact(&plan).expect("valid plan");
        assert_approx_tol(result.future_value_needed, 179_084.77, 0.01);
        assert_approx_tol(
            result.future_value_needed * result.future_purchasing_power,
            100_000.0 * 100_000.0,
            1e-3,
        );
        assert_approx_tol(
            result.purchasing_power_loss,
            100_000.0 - result.future_purchasing_power,
            1e-9,
        );
        assert_eq!(result.yearly.len(), 10);
    }

    #[test]
    fn inflation_zero_rate_keeps_value() {
        let plan = InflationPlan {
            present_amount: 50_000.0,
            annual_inflation_percent: 0.0,
            years: 5,
        };
        let result = inflation_impact(&plan).expect("valid plan");
        assert_eq!(result.future_value_needed, 50_000.0);
        assert_eq!(result.purchasing_power_loss, 0.0);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_sip_value_at_least_invested_and_idempotent(
            monthly in 100u32..200_000,
            rate_bp in 0u32..3000,
            years in 1u32..41,
            step_bp in 0u32..2500
        ) {
            let plan = SipPlan {
                monthly_amount: monthly as f64,
                annual_return_percent: rate_bp as f64 / 100.0,
                years,
                annual_step_up_percent: Some(step_bp as f64 / 100.0),
            };
            let first = sip_future_value(&plan).expect("valid plan");
            let second = sip_future_value(&plan).expect("valid plan");
            prop_assert!(first.future_value + 1e-6 >= first.total_invested);
            prop_assert!(first.future_value == second.future_value);
            prop_assert!(first.total_invested == second.total_invested);
        }

        #[test]
        fn prop_rd_interest_non_negative(
            deposit in 100u32..100_000,
            rate_bp in 0u32..1500,
            years in 1u32..21
        ) {
            let plan = RdPlan {
                monthly_deposit: deposit as f64,
                annual_rate_percent: rate_bp as f64 / 100.0,
                years,
            };
            let result = rd_maturity(&plan).expect("valid plan");
            prop_assert!(result.interest_earned >= 0.0);
        }
    }
}
