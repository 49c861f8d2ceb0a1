//! Rebalancing calculator.
//!
//! Given target weights per asset and an amount of new capital (DCA), work
//! out how much of each asset to buy so the portfolio moves towards the
//! targets. Nothing is ever sold: overweight assets get a suggested buy of
//! zero, so the suggested total can exceed the new capital.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::Context;
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use super::aggregate::{aggregate_by_asset, AggregatedAsset};
use super::{read_input, AssetId, AssetRow};
use crate::error::{FolioError, Result};

/// Target weight for one asset, in percent of the portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RebalanceTarget {
    pub asset_id: AssetId,
    #[serde(default)]
    pub asset_name: CompactString,
    #[serde(default)]
    pub ticker: CompactString,
    pub target_percentage: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TargetFile {
    Bulk { settings: Vec<RebalanceTarget> },
    List(Vec<RebalanceTarget>),
}

/// Read targets from JSON, either a plain array or the `{"settings": [...]}`
/// bulk-update shape. A path of `-` reads stdin.
pub fn load_targets(path: &Path) -> anyhow::Result<Vec<RebalanceTarget>> {
    let text = read_input(path)?;
    let file: TargetFile = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse rebalance targets from {}", path.display()))?;
    let targets = match file {
        TargetFile::Bulk { settings } => settings,
        TargetFile::List(list) => list,
    };
    tracing::info!("Loaded {} rebalance targets from {}", targets.len(), path.display());
    Ok(targets)
}

/// Sum of all target percentages.
pub fn target_total(targets: &[RebalanceTarget]) -> f64 {
    targets.iter().map(|t| t.target_percentage).sum()
}

/// Check that targets are a usable strategy: each asset listed once, every
/// value in `[0, 100]`, and the total within `tolerance` points of 100.
pub fn validate_targets(targets: &[RebalanceTarget], tolerance: f64) -> Result<()> {
    let mut seen = HashSet::new();
    for t in targets {
        if !seen.insert(t.asset_id) {
            return Err(FolioError::DuplicateTarget(t.asset_id));
        }
        if !(0.0..=100.0).contains(&t.target_percentage) {
            return Err(FolioError::TargetOutOfRange {
                asset_id: t.asset_id,
                value: t.target_percentage,
            });
        }
    }

    let total = target_total(targets);
    if (total - 100.0).abs() > tolerance {
        return Err(FolioError::TargetSumMismatch { total, tolerance });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RebalanceLine {
    pub asset_id: AssetId,
    pub asset_name: CompactString,
    pub identifier: CompactString,
    pub current_value: f64,
    /// Share of the current portfolio, in percent
    pub current_weight_pct: f64,
    pub target_pct: f64,
    /// Value the asset should have once the new capital is invested
    pub target_value: f64,
    pub suggested_buy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RebalancePlan {
    pub current_total: f64,
    pub dca_amount: f64,
    pub future_total: f64,
    pub target_total_pct: f64,
    /// Whether the targets add up to 100 within tolerance. The plan is
    /// computed either way.
    pub targets_valid: bool,
    pub total_buy: f64,
    pub lines: Vec<RebalanceLine>,
}

/// Compute suggested buys, one line per target in target order.
///
/// The current total covers every held asset, including ones without a
/// target. Targeted assets that aren't held count as zero.
pub fn plan(
    targets: &[RebalanceTarget],
    rows: &[AssetRow],
    dca_amount: f64,
    tolerance: f64,
) -> RebalancePlan {
    let held = aggregate_by_asset(rows);
    let by_id: HashMap<AssetId, &AggregatedAsset> = held.iter().map(|a| (a.asset_id, a)).collect();

    let current_total: f64 = held.iter().map(|a| a.total_value).sum();
    let future_total = current_total + dca_amount;
    let target_total_pct = target_total(targets);

    let lines: Vec<RebalanceLine> = targets
        .iter()
        .map(|t| {
            let current = by_id.get(&t.asset_id);
            let current_value = current.map_or(0.0, |a| a.total_value);
            let current_weight_pct = if current_total > 0.0 {
                current_value / current_total * 100.0
            } else {
                0.0
            };
            let target_value = future_total * t.target_percentage / 100.0;

            let asset_name = match current {
                _ if !t.asset_name.is_empty() => t.asset_name.clone(),
                Some(a) => a.name.clone(),
                None => CompactString::default(),
            };
            let identifier = match current {
                Some(a) => a.identifier.clone(),
                None if !t.ticker.is_empty() => t.ticker.clone(),
                None => CompactString::new("N/A"),
            };

            RebalanceLine {
                asset_id: t.asset_id,
                asset_name,
                identifier,
                current_value,
                current_weight_pct,
                target_pct: t.target_percentage,
                target_value,
                suggested_buy: (target_value - current_value).max(0.0),
            }
        })
        .collect();

    let total_buy = lines.iter().map(|l| l.suggested_buy).sum();
    let targets_valid = (target_total_pct - 100.0).abs() <= tolerance;
    if !targets_valid {
        tracing::warn!(
            "Rebalance targets add up to {:.2}%, plan shown but not a valid strategy",
            target_total_pct
        );
    }

    RebalancePlan {
        current_total,
        dca_amount,
        future_total,
        target_total_pct,
        targets_valid,
        total_buy,
        lines,
    }
}
