use std::collections::HashSet;

use super::error::{CalcError, CalcResult, ensure_finite, require_non_negative};
use super::types::{AssetEntry, CategoryTotal, LedgerEntry, LiabilityEntry, NetWorthResult};

pub fn calculate_net_worth(
    assets: &[AssetEntry],
    liabilities: &[LiabilityEntry],
) -> CalcResult<NetWorthResult> {
    validate_entries("assets", assets)?;
    validate_entries("liabilities", liabilities)?;

    let total_assets = ensure_finite("totalAssets", assets.iter().map(|a| a.value).sum())?;
    let total_liabilities = ensure_finite(
        "totalLiabilities",
        liabilities.iter().map(|l| l.value).sum(),
    )?;

    let liquid_assets: f64 = assets
        .iter()
        .filter(|a| a.category.is_liquid())
        .map(|a| a.value)
        .sum();
    let unsecured_liabilities: f64 = liabilities
        .iter()
        .filter(|l| l.category.is_unsecured())
        .map(|l| l.value)
        .sum();

    Ok(NetWorthResult {
        total_assets,
        total_liabilities,
        net_worth: total_assets - total_liabilities,
        debt_to_asset_ratio: ratio("debtToAssetRatio", total_liabilities, total_assets)?,
        liquidity_ratio: ratio("liquidityRatio", liquid_assets, unsecured_liabilities)?,
        asset_breakdown: category_totals(assets),
        liability_breakdown: category_totals(liabilities),
    })
}

/// `None` when the denominator is zero; an undefined ratio is reported as
/// absent rather than as infinity.
fn ratio(quantity: &'static str, numerator: f64, denominator: f64) -> CalcResult<Option<f64>> {
    if denominator > 0.0 {
        ensure_finite(quantity, numerator / denominator).map(Some)
    } else {
        Ok(None)
    }
}

fn validate_entries<C>(field: &'static str, entries: &[LedgerEntry<C>]) -> CalcResult<()> {
    let mut ids = HashSet::with_capacity(entries.len());
    for entry in entries {
        require_non_negative(field, entry.value)?;
        if !ids.insert(entry.id.as_str()) {
            return Err(CalcError::invalid(
                field,
                format!("duplicate entry id {:?}", entry.id),
            ));
        }
    }
    Ok(())
}

// Categories keep first-seen order.
fn category_totals<C: Copy + Eq>(entries: &[LedgerEntry<C>]) -> Vec<CategoryTotal<C>> {
    let mut totals: Vec<CategoryTotal<C>> = Vec::new();
    for entry in entries {
        match totals.iter_mut().find(|t| t.category == entry.category) {
            Some(total) => total.total += entry.value,
            None => totals.push(CategoryTotal {
                category: entry.category,
                total: entry.value,
            }),
        }
    }
    totals
}
