use std::collections::{HashMap, HashSet};

use compact_str::CompactString;
use serde::Serialize;

use super::{identifier, AccountId, AssetId, AssetRow};
use crate::layout::Weighted;

/// One asset's holdings summed across every account that holds it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedAsset {
    pub asset_id: AssetId,
    pub name: CompactString,
    /// Ticker, else ISIN, else `"N/A"`
    pub identifier: CompactString,
    pub total_value: f64,
    pub invested_value: f64,
}

impl Weighted for AggregatedAsset {
    fn weight(&self) -> f64 {
        self.total_value
    }
}

/// Sum rows of the same asset, keeping the order in which assets first appear.
/// Name and identifier come from the first row seen for each asset.
pub fn aggregate_by_asset(rows: &[AssetRow]) -> Vec<AggregatedAsset> {
    let mut out: Vec<AggregatedAsset> = Vec::new();
    let mut index: HashMap<AssetId, usize> = HashMap::new();

    for row in rows {
        match index.get(&row.asset_id) {
            Some(&i) => {
                out[i].total_value += row.total_value;
                out[i].invested_value += row.invested_value;
            }
            None => {
                index.insert(row.asset_id, out.len());
                out.push(AggregatedAsset {
                    asset_id: row.asset_id,
                    name: row.name.clone(),
                    identifier: CompactString::new(identifier(&row.ticker, row.isin.as_deref())),
                    total_value: row.total_value,
                    invested_value: row.invested_value,
                });
            }
        }
    }

    out
}

/// Headline figures for a set of rows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PortfolioSummary {
    pub total_value: f64,
    pub invested_value: f64,
    /// `total_value - invested_value`
    pub gain: f64,
    /// Gain relative to the invested amount, in percent; 0 when nothing is invested
    pub gain_pct: f64,
    pub asset_count: usize,
    pub account_count: usize,
}

pub fn summarize(rows: &[AssetRow]) -> PortfolioSummary {
    let total_value: f64 = rows.iter().map(|r| r.total_value).sum();
    let invested_value: f64 = rows.iter().map(|r| r.invested_value).sum();
    let gain = total_value - invested_value;
    let gain_pct = if invested_value > 0.0 {
        gain / invested_value * 100.0
    } else {
        0.0
    };

    PortfolioSummary {
        total_value,
        invested_value,
        gain,
        gain_pct,
        asset_count: rows.iter().map(|r| r.asset_id).collect::<HashSet<_>>().len(),
        account_count: rows.iter().map(|r| r.account_id).collect::<HashSet<_>>().len(),
    }
}

/// Value held in one account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountSummary {
    pub account_id: AccountId,
    pub account_name: CompactString,
    pub invested_value: f64,
    pub total_value: f64,
    pub gain: f64,
    /// Percent of `invested_value`; 0 when nothing is invested
    pub gain_pct: f64,
    /// Distinct assets with value in the account
    pub asset_count: usize,
}

/// Per-account overview, richest account first. Ties keep account id order.
pub fn accounts(rows: &[AssetRow]) -> Vec<AccountSummary> {
    let mut out: Vec<AccountSummary> = Vec::new();
    let mut index: HashMap<AccountId, usize> = HashMap::new();
    let mut held: HashSet<(AccountId, AssetId)> = HashSet::new();

    for row in rows {
        let i = *index.entry(row.account_id).or_insert_with(|| {
            out.push(AccountSummary {
                account_id: row.account_id,
                account_name: row.account_name.clone(),
                invested_value: 0.0,
                total_value: 0.0,
                gain: 0.0,
                gain_pct: 0.0,
                asset_count: 0,
            });
            out.len() - 1
        });
        let account = &mut out[i];
        account.invested_value += row.invested_value;
        account.total_value += row.total_value;
        if held.insert((row.account_id, row.asset_id)) {
            account.asset_count += 1;
        }
    }

    for account in &mut out {
        account.gain = account.total_value - account.invested_value;
        if account.invested_value > 0.0 {
            account.gain_pct = account.gain / account.invested_value * 100.0;
        }
    }

    out.sort_by(|a, b| {
        b.total_value
            .total_cmp(&a.total_value)
            .then(a.account_id.cmp(&b.account_id))
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::fixtures::row;

    #[test]
    fn sums_same_asset_across_accounts() {
        let rows = vec![
            row(1, 10, "vwce", 500.0),
            row(1, 11, "btc", 200.0),
            row(2, 10, "vwce", 300.0),
        ];
        let agg = aggregate_by_asset(&rows);
        assert_eq!(agg.len(), 2);
        assert_eq!(agg[0].asset_id, AssetId(10));
        assert_eq!(agg[0].total_value, 800.0);
        assert_eq!(agg[0].identifier, "VWCE");
        assert_eq!(agg[1].asset_id, AssetId(11));
    }

    #[test]
    fn summary_handles_zero_invested() {
        let mut r = row(1, 1, "gift", 100.0);
        r.invested_value = 0.0;
        let s = summarize(&[r]);
        assert_eq!(s.gain, 100.0);
        assert_eq!(s.gain_pct, 0.0);
    }

    #[test]
    fn summary_counts_distinct_assets_and_accounts() {
        let mut a = row(1, 10, "vwce", 1100.0);
        a.invested_value = 1000.0;
        let b = row(2, 10, "vwce", 500.0);
        let s = summarize(&[a, b]);
        assert_eq!(s.asset_count, 1);
        assert_eq!(s.account_count, 2);
        assert!((s.gain - 100.0).abs() < 1e-9);
        assert!((s.gain_pct - 100.0 / 1500.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn accounts_are_ordered_by_value() {
        let mut small = row(1, 10, "vwce", 400.0);
        small.invested_value = 500.0;
        let rows = vec![
            small,
            row(2, 10, "vwce", 900.0),
            row(2, 11, "btc", 300.0),
            row(2, 11, "btc", 100.0),
        ];
        let overview = accounts(&rows);
        assert_eq!(overview.len(), 2);

        assert_eq!(overview[0].account_id, AccountId(2));
        assert_eq!(overview[0].account_name, "Account 2");
        assert_eq!(overview[0].total_value, 1300.0);
        assert_eq!(overview[0].asset_count, 2);
        assert_eq!(overview[0].gain, 0.0);

        assert_eq!(overview[1].account_id, AccountId(1));
        assert_eq!(overview[1].gain, -100.0);
        assert!((overview[1].gain_pct + 20.0).abs() < 1e-9);
    }

    #[test]
    fn no_rows_no_accounts() {
        assert!(accounts(&[]).is_empty());
    }
}
