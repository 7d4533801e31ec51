use super::error::{CalcResult, require_non_negative};
use super::types::{Deductions, RegimeTax, SlabTax, TaxComparison, TaxProfile, TaxRegime, TaxSlab};

pub const STANDARD_DEDUCTION: f64 = 50_000.0;
pub const CESS_RATE_PERCENT: f64 = 4.0;

pub const CAP_80C: f64 = 150_000.0;
pub const CAP_80D: f64 = 25_000.0;
pub const CAP_NPS_80CCD_1B: f64 = 50_000.0;
pub const CAP_HOME_LOAN_INTEREST: f64 = 200_000.0;
pub const CAP_80TTA: f64 = 10_000.0;

const fn slab(lower: f64, upper: Option<f64>, rate_percent: f64) -> TaxSlab {
    TaxSlab {
        lower,
        upper,
        rate_percent,
    }
}

pub const NEW_REGIME_SLABS: [TaxSlab; 6] = [
    slab(0.0, Some(300_000.0), 0.0),
    slab(300_000.0, Some(600_000.0), 5.0),
    slab(600_000.0, Some(900_000.0), 10.0),
    slab(900_000.0, Some(1_200_000.0), 15.0),
    slab(1_200_000.0, Some(1_500_000.0), 20.0),
    slab(1_500_000.0, None, 30.0),
];

pub const OLD_REGIME_SLABS: [TaxSlab; 4] = [
    slab(0.0, Some(250_000.0), 0.0),
    slab(250_000.0, Some(500_000.0), 5.0),
    slab(500_000.0, Some(1_000_000.0), 20.0),
    slab(1_000_000.0, None, 30.0),
];

pub fn slabs_for(regime: TaxRegime) -> &'static [TaxSlab] {
    match regime {
        TaxRegime::New => &NEW_REGIME_SLABS,
        TaxRegime::Old => &OLD_REGIME_SLABS,
    }
}

/// Sum of claimed deductions after each is held to its statutory cap.
pub fn allowed_deductions(deductions: &Deductions) -> CalcResult<f64> {
    let claims = [
        ("section80c", deductions.section_80c, CAP_80C),
        ("section80d", deductions.section_80d, CAP_80D),
        ("nps80ccd1b", deductions.nps_80ccd_1b, CAP_NPS_80CCD_1B),
        (
            "homeLoanInterest",
            deductions.home_loan_interest,
            CAP_HOME_LOAN_INTEREST,
        ),
        (
            "savingsInterest80tta",
            deductions.savings_interest_80tta,
            CAP_80TTA,
        ),
    ];

    let mut total = 0.0;
    for (field, claimed, cap) in claims {
        require_non_negative(field, claimed)?;
        total += claimed.min(cap);
    }
    Ok(total)
}

/// Marginal tax over ascending, non-overlapping slabs.
pub fn slab_tax(taxable_income: f64, slabs: &[TaxSlab]) -> Vec<SlabTax> {
    slabs
        .iter()
        .filter(|s| taxable_income > s.lower)
        .map(|s| {
            let ceiling = s.upper.map_or(taxable_income, |u| taxable_income.min(u));
            let taxable_amount = ceiling - s.lower;
            SlabTax {
                slab: *s,
                taxable_amount,
                tax: taxable_amount * s.rate_percent / 100.0,
            }
        })
        .collect()
}

pub fn calculate_tax(profile: &TaxProfile) -> CalcResult<RegimeTax> {
    require_non_negative("grossIncome", profile.gross_income)?;

    // claims are validated under both regimes; only the old one applies them
    let claimed = allowed_deductions(&profile.deductions)?;
    let deductions_allowed = match profile.regime {
        TaxRegime::New => 0.0,
        TaxRegime::Old => claimed,
    };
    let taxable_income =
        (profile.gross_income - STANDARD_DEDUCTION - deductions_allowed).max(0.0);

    let slabs = slab_tax(taxable_income, slabs_for(profile.regime));
    let tax_before_cess: f64 = slabs.iter().map(|s| s.tax).sum();
    let cess = tax_before_cess * CESS_RATE_PERCENT / 100.0;
    let total_tax = tax_before_cess + cess;
    let effective_rate_percent = if profile.gross_income > 0.0 {
        total_tax / profile.gross_income * 100.0
    } else {
        0.0
    };

    Ok(RegimeTax {
        regime: profile.regime,
        gross_income: profile.gross_income,
        standard_deduction: STANDARD_DEDUCTION.min(profile.gross_income),
        deductions_allowed,
        taxable_income,
        tax_before_cess,
        cess,
        total_tax,
        effective_rate_percent,
        slabs,
    })
}

/// Computes both regimes for the same income and recommends the cheaper one,
/// preferring the new regime on a tie.
pub fn compare_regimes(gross_income: f64, deductions: &Deductions) -> CalcResult<TaxComparison> {
    let new_regime = calculate_tax(&TaxProfile {
        gross_income,
        regime: TaxRegime::New,
        deductions: *deductions,
    })?;
    let old_regime = calculate_tax(&TaxProfile {
        gross_income,
        regime: TaxRegime::Old,
        deductions: *deductions,
    })?;

    let recommended = if old_regime.total_tax < new_regime.total_tax {
        TaxRegime::Old
    } else {
        TaxRegime::New
    };
    let savings = (new_regime.total_tax - old_regime.total_tax).abs();

    Ok(TaxComparison {
        new_regime,
        old_regime,
        recommended,
        savings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn profile(gross_income: f64, regime: TaxRegime) -> TaxProfile {
        TaxProfile {
            gross_income,
            regime,
            deductions: Deductions::default(),
        }
    }

    #[test]
    fn slabs_are_ascending_and_contiguous() {
        for slabs in [&NEW_REGIME_SLABS[..], &OLD_REGIME_SLABS[..]] {
            for pair in slabs.windows(2) {
                assert_eq!(pair[0].upper, Some(pair[1].lower));
            }
            assert_eq!(slabs[0].lower, 0.0);
            assert_eq!(slabs.last().and_then(|s| s.upper), None);
        }
    }

    #[test]
    fn new_regime_applies_marginal_rates() {
        // 1,050,000 gross -> 1,000,000 taxable
        let result = calculate_tax(&profile(1_050_000.0, TaxRegime::New)).expect("valid profile");
        assert_approx(result.taxable_income, 1_000_000.0);
        // 15,000 + 30,000 + 15,000
        assert_approx(result.tax_before_cess, 60_000.0);
        assert_approx(result.cess, 2_400.0);
        assert_approx(result.total_tax, 62_400.0);
        assert_eq!(result.slabs.len(), 4);
        assert_approx(result.slabs[3].taxable_amount, 100_000.0);
    }

    #[test]
    fn old_regime_subtracts_capped_deductions() {
        let profile = TaxProfile {
            gross_income: 1_200_000.0,
            regime: TaxRegime::Old,
            deductions: Deductions {
                section_80c: 200_000.0,
                nps_80ccd_1b: 50_000.0,
                ..Deductions::default()
            },
        };
        let result = calculate_tax(&profile).expect("valid profile");
        assert_approx(result.deductions_allowed, 200_000.0);
        assert_approx(result.taxable_income, 950_000.0);
        // 12,500 + 90,000
        assert_approx(result.tax_before_cess, 102_500.0);
        assert_approx(result.total_tax, 106_600.0);
    }

    #[test]
    fn new_regime_ignores_deductions() {
        let mut with_claims = profile(1_200_000.0, TaxRegime::New);
        with_claims.deductions.section_80c = 150_000.0;
        let a = calculate_tax(&with_claims).expect("valid profile");
        let b = calculate_tax(&profile(1_200_000.0, TaxRegime::New)).expect("valid profile");
        assert_eq!(a.total_tax, b.total_tax);
        assert_eq!(a.deductions_allowed, 0.0);
    }

    #[test]
    fn income_below_standard_deduction_pays_nothing() {
        let result = calculate_tax(&profile(30_000.0, TaxRegime::Old)).expect("valid profile");
        assert_eq!(result.taxable_income, 0.0);
        assert_eq!(result.total_tax, 0.0);
        assert!(result.slabs.is_empty());
        assert_eq!(result.standard_deduction, 30_000.0);
    }

    #[test]
    fn rejects_negative_income_and_claims() {
        assert!(calculate_tax(&profile(-1.0, TaxRegime::New)).is_err());
        let mut p = profile(500_000.0, TaxRegime::Old);
        p.deductions.section_80d = -10.0;
        assert!(calculate_tax(&p).is_err());
    }

    #[test]
    fn new_regime_still_rejects_negative_claims() {
        let mut p = profile(800_000.0, TaxRegime::New);
        p.deductions.section_80c = -5.0;
        let err = calculate_tax(&p).expect_err("negative claim");
        assert_eq!(
            err.to_string(),
            "invalid section80c: must be >= 0, got -5"
        );
    }

    #[test]
    fn comparison_recommends_cheaper_regime() {
        let heavy = Deductions {
            section_80c: 150_000.0,
            section_80d: 25_000.0,
            nps_80ccd_1b: 50_000.0,
            home_loan_interest: 200_000.0,
            savings_interest_80tta: 10_000.0,
        };
        let comparison = compare_regimes(1_500_000.0, &heavy).expect("valid inputs");
        assert_eq!(comparison.recommended, TaxRegime::Old);
        assert_approx(
            comparison.savings,
            comparison.new_regime.total_tax - comparison.old_regime.total_tax,
        );

        let none = compare_regimes(1_500_000.0, &Deductions::default()).expect("valid inputs");
        assert_eq!(none.recommended, TaxRegime::New);
    }

    #[test]
    fn comparison_tie_prefers_new_regime() {
        let comparison = compare_regimes(0.0, &Deductions::default()).expect("valid inputs");
        assert_eq!(comparison.recommended, TaxRegime::New);
        assert_eq!(comparison.savings, 0.0);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(128))]

        #[test]
        fn prop_tax_is_monotone_in_income(
            income in 0u32..10_000_000,
            raise in 0u32..2_000_000,
            old in proptest::bool::ANY,
            claim_80c in 0u32..300_000
        ) {
            let regime = if old { TaxRegime::Old } else { TaxRegime::New };
            let deductions = Deductions {
                section_80c: claim_80c as f64,
                ..Deductions::default()
            };
            let lower = calculate_tax(&TaxProfile {
                gross_income: income as f64,
                regime,
                deductions,
            })
            .expect("valid profile");
            let higher = calculate_tax(&TaxProfile {
                gross_income: income as f64 + raise as f64,
                regime,
                deductions,
            })
            .expect("valid profile");
            prop_assert!(higher.total_tax + 1e-6 >= lower.total_tax);
            prop_assert!(lower.total_tax >= 0.0);
        }
    }
}
