use std::collections::{HashMap, HashSet};

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use super::{AssetId, AssetRow};

/// Group key used for theme-less assets.
pub const UNCLASSIFIED: &str = "Unclassified";

/// What an allocation breakdown groups positions by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    #[default]
    Asset,
    Theme,
    Type,
}

/// One slice of an allocation breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetAllocation {
    pub group_key: CompactString,
    pub total_value: f64,
    /// Share of the grand total in `[0, 1]`
    pub allocation: f64,
    /// Distinct assets in the group
    pub asset_count: usize,
}

/// Break the portfolio down by `group_by`, largest group first.
///
/// Rows with no remaining quantity are closed positions and don't count.
pub fn allocation(rows: &[AssetRow], group_by: GroupBy) -> Vec<AssetAllocation> {
    let mut groups: Vec<(CompactString, f64, HashSet<AssetId>)> = Vec::new();
    let mut index: HashMap<CompactString, usize> = HashMap::new();

    for row in rows.iter().filter(|r| r.quantity > 0.0) {
        let key = group_key(row, group_by);
        let i = *index.entry(key.clone()).or_insert_with(|| {
            groups.push((key, 0.0, HashSet::new()));
            groups.len() - 1
        });
        groups[i].1 += row.total_value;
        groups[i].2.insert(row.asset_id);
    }

    let grand_total: f64 = groups.iter().map(|(_, value, _)| value).sum();
    let mut out: Vec<AssetAllocation> = groups
        .into_iter()
        .map(|(group_key, total_value, assets)| AssetAllocation {
            group_key,
            total_value,
            allocation: if grand_total > 0.0 {
                total_value / grand_total
            } else {
                0.0
            },
            asset_count: assets.len(),
        })
        .collect();

    out.sort_by(|a, b| b.total_value.total_cmp(&a.total_value));
    out
}

fn group_key(row: &AssetRow, group_by: GroupBy) -> CompactString {
    match group_by {
        GroupBy::Asset => row.name.clone(),
        GroupBy::Type => row.kind.clone(),
        GroupBy::Theme if row.theme.trim().is_empty() => CompactString::new(UNCLASSIFIED),
        GroupBy::Theme => row.theme.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::fixtures::row;

    #[test]
    fn groups_by_theme_with_unclassified_fallback() {
        let mut a = row(1, 1, "vwce", 600.0);
        a.theme = "Global".into();
        let mut b = row(1, 2, "btc", 300.0);
        b.theme = "".into();
        let mut c = row(2, 3, "msft", 100.0);
        c.theme = "Global".into();

        let slices = allocation(&[a, b, c], GroupBy::Theme);
        assert_eq!(slices.len(), 2);
        assert_eq!(slices[0].group_key, "Global");
        assert_eq!(slices[0].asset_count, 2);
        assert!((slices[0].allocation - 0.7).abs() < 1e-12);
        assert_eq!(slices[1].group_key, UNCLASSIFIED);
        assert!((slices[1].allocation - 0.3).abs() < 1e-12);
    }

    #[test]
    fn counts_distinct_assets_once() {
        let rows = [row(1, 1, "vwce", 100.0), row(2, 1, "vwce", 100.0)];
        let slices = allocation(&rows, GroupBy::Type);
        assert_eq!(slices.len(), 1);
        assert_eq!(slices[0].asset_count, 1);
        assert_eq!(slices[0].total_value, 200.0);
        assert_eq!(slices[0].allocation, 1.0);
    }

    #[test]
    fn closed_positions_are_skipped() {
        let mut closed = row(1, 2, "sold", 0.0);
        closed.quantity = 0.0;
        let slices = allocation(&[row(1, 1, "kept", 50.0), closed], GroupBy::Asset);
        assert_eq!(slices.len(), 1);
        assert_eq!(slices[0].group_key, "kept");
    }

    #[test]
    fn largest_group_first() {
        let rows = [row(1, 1, "small", 10.0), row(1, 2, "large", 90.0)];
        let slices = allocation(&rows, GroupBy::Asset);
        assert_eq!(slices[0].group_key, "large");
    }
}
