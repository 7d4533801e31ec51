use super::error::{
    CalcResult, ensure_finite, require_non_negative, require_positive, require_years,
};
use super::types::{CorpusYear, SwpPlan, SwpResult};

/// Runs a systematic withdrawal plan month by month. The corpus grows for
/// the month, then the withdrawal is taken; the plan stops at the first
/// month the corpus is exhausted.
pub fn simulate_swp(plan: &SwpPlan) -> CalcResult<SwpResult> {
    require_positive("initialCorpus", plan.initial_corpus)?;
    require_positive("monthlyWithdrawal", plan.monthly_withdrawal)?;
    require_non_negative("annualReturnPercent", plan.annual_return_percent)?;
    require_years("years", plan.years)?;

    let i = plan.annual_return_percent / 12.0 / 100.0;
    let total_months = plan.years * 12;

    let mut corpus = plan.initial_corpus;
    let mut yearly = Vec::with_capacity(plan.years as usize);
    let mut withdrawn_this_year = 0.0;

    for month in 1..=total_months {
        corpus = ensure_finite("corpus", corpus * (1.0 + i) - plan.monthly_withdrawal)?;
        withdrawn_this_year += plan.monthly_withdrawal;

        if corpus <= 0.0 {
            yearly.push(CorpusYear {
                year: month.div_ceil(12),
                withdrawn: withdrawn_this_year,
                closing_corpus: 0.0,
            });
            return Ok(SwpResult {
                initial_corpus: plan.initial_corpus,
                total_withdrawn: plan.monthly_withdrawal * month as f64,
                final_corpus: 0.0,
                corpus_depleted: true,
                months_lasted: month,
                yearly,
            });
        }

        if month % 12 == 0 {
            yearly.push(CorpusYear {
                year: month / 12,
                withdrawn: withdrawn_this_year,
                closing_corpus: corpus,
            });
            withdrawn_this_year = 0.0;
        }
    }

    Ok(SwpResult {
        initial_corpus: plan.initial_corpus,
        total_withdrawn: plan.monthly_withdrawal * total_months as f64,
        final_corpus: corpus,
        corpus_depleted: false,
        months_lasted: total_months,
        yearly,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};
    use crate::calc::CalcError;

    fn sample_plan() -> SwpPlan {
        SwpPlan {
            initial_corpus: 1_000_000.0,
            monthly_withdrawal: 10_000.0,
            annual_return_percent: 8.0,
            years: 10,
        }
    }

    #[test]
    fn sustainable_plan_runs_full_term() {
        let result = simulate_swp(&sample_plan()).expect("valid plan");
        assert!(!result.corpus_depleted);
        assert_eq!(result.months_lasted, 120);
        assert!(result.final_corpus > 0.0);
        assert_eq!(result.total_withdrawn, 1_200_000.0);
        assert_eq!(result.yearly.len(), 10);
        assert_eq!(result.yearly[9].closing_corpus, result.final_corpus);
    }

    #[test]
    fn zero_return_depletes_exactly_at_crossing_month() {
        let plan = SwpPlan {
            initial_corpus: 100_000.0,
            monthly_withdrawal: 10_000.0,
            annual_return_percent: 0.0,
            years: 5,
        };
        let result = simulate_swp(&plan).expect("valid plan");
        assert!(result.corpus_depleted);
        assert_eq!(result.months_lasted, 10);
        assert_eq!(result.total_withdrawn, 100_000.0);
        assert_eq!(result.final_corpus, 0.0);
        assert_eq!(result.yearly.len(), 1);
        assert_eq!(result.yearly[0].closing_corpus, 0.0);
    }

    #[test]
    fn depletion_in_later_year_records_partial_year() {
        let plan = SwpPlan {
            initial_corpus: 150_000.0,
            monthly_withdrawal: 10_000.0,
            annual_return_percent: 0.0,
            years: 5,
        };
        let result = simulate_swp(&plan).expect("valid plan");
        assert_eq!(result.months_lasted, 15);
        assert_eq!(result.yearly.len(), 2);
        assert_eq!(result.yearly[1].year, 2);
        assert_eq!(result.yearly[1].withdrawn, 30_000.0);
    }

    #[test]
    fn rejects_non_positive_withdrawal() {
        let mut plan = sample_plan();
        plan.monthly_withdrawal = 0.0;
        assert!(simulate_swp(&plan).is_err());
    }

    #[test]
    fn runaway_growth_is_reported_as_non_finite() {
        let plan = SwpPlan {
            annual_return_percent: 1e300,
            years: 1,
            ..sample_plan()
        };
        let err = simulate_swp(&plan).expect_err("corpus overflows");
        assert_eq!(err, CalcError::NonFiniteResult { quantity: "corpus" });
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_depletion_flag_matches_months_lasted(
            corpus in 10_000u32..5_000_000,
            withdrawal in 500u32..100_000,
            rate_bp in 0u32..1500,
            years in 1u32..31
        ) {
            let plan = SwpPlan {
                initial_corpus: corpus as f64,
                monthly_withdrawal: withdrawal as f64,
                annual_return_percent: rate_bp as f64 / 100.0,
                years,
            };
            let result = simulate_swp(&plan).expect("valid plan");
            if result.corpus_depleted {
                prop_assert!(result.months_lasted <= years * 12);
                prop_assert_eq!(result.final_corpus, 0.0);
            } else {
                prop_assert_eq!(result.months_lasted, years * 12);
                prop_assert!(result.final_corpus > 0.0);
            }
            prop_assert_eq!(
                result.total_withdrawn,
                plan.monthly_withdrawal * result.months_lasted as f64
            );
            let again = simulate_swp(&plan).expect("valid plan");
            prop_assert_eq!(again.final_corpus, result.final_corpus);
        }

        #[test]
        fn prop_withdrawals_beyond_corpus_at_zero_return_deplete_early(
            corpus in 10_000u32..1_000_000,
            years in 1u32..21
        ) {
            let months = years * 12;
            let plan = SwpPlan {
                initial_corpus: corpus as f64,
                monthly_withdrawal: corpus as f64 / months as f64 * 2.0,
                annual_return_percent: 0.0,
                years,
            };
            let result = simulate_swp(&plan).expect("valid plan");
            prop_assert!(result.corpus_depleted);
            prop_assert!(result.months_lasted < months);
        }
    }
}
