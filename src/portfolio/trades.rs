use std::fmt;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use super::{identifier, read_input};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Buy,
    Sell,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Buy => f.pad("buy"),
            Operation::Sell => f.pad("sell"),
        }
    }
}

/// One executed trade, as listed in the trade history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRow {
    #[serde(default)]
    pub ticker: Option<CompactString>,
    #[serde(default)]
    pub isin: Option<CompactString>,
    pub asset_name: CompactString,
    #[serde(default)]
    pub currency: CompactString,
    /// As sent by the API, usually `YYYY-MM-DD`
    pub date: CompactString,
    pub quantity: f64,
    pub price: f64,
    pub operation_type: Operation,
    #[serde(default)]
    pub fees: f64,
    pub account_name: CompactString,
}

impl TradeRow {
    pub fn identifier(&self) -> &str {
        identifier(self.ticker.as_deref().unwrap_or(""), self.isin.as_deref())
    }

    /// `quantity * price`, fees excluded.
    pub fn amount(&self) -> f64 {
        self.quantity * self.price
    }
}

/// Trade history filter. Empty text filters match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeFilter {
    /// Case-insensitive substring of the asset name
    pub asset: String,
    /// Case-insensitive substring of the account name
    pub account: String,
    /// `None` keeps both buys and sells
    pub operation: Option<Operation>,
}

impl TradeFilter {
    pub fn matches(&self, trade: &TradeRow) -> bool {
        // A trade with no name to compare against is never filtered out by it.
        if !contains_ignore_case(&trade.asset_name, &self.asset) {
            return false;
        }
        if !contains_ignore_case(&trade.account_name, &self.account) {
            return false;
        }
        self.operation.map_or(true, |op| trade.operation_type == op)
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    needle.is_empty()
        || haystack.is_empty()
        || haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Trades matching `filter`, in their original order.
pub fn filter_trades<'a>(trades: &'a [TradeRow], filter: &TradeFilter) -> Vec<&'a TradeRow> {
    trades.iter().filter(|t| filter.matches(t)).collect()
}

/// Counters shown above the trade list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TradeStats {
    pub buys: usize,
    pub sells: usize,
    /// Sum of `quantity * price` over buys and sells alike
    pub total_amount: f64,
    pub total_fees: f64,
}

pub fn trade_stats<'a>(trades: impl IntoIterator<Item = &'a TradeRow>) -> TradeStats {
    let mut stats = TradeStats::default();
    for trade in trades {
        match trade.operation_type {
            Operation::Buy => stats.buys += 1,
            Operation::Sell => stats.sells += 1,
        }
        stats.total_amount += trade.amount();
        stats.total_fees += trade.fees;
    }
    stats
}

/// Read a trade history JSON array. A path of `-` reads stdin.
pub fn load_trades(path: &Path) -> Result<Vec<TradeRow>> {
    let text = read_input(path)?;
    let trades: Vec<TradeRow> = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse trades from {}", path.display()))?;

    tracing::info!("Loaded {} trades from {}", trades.len(), path.display());
    Ok(trades)
}

/// Write trades as CSV with a header row. Nothing but the header is written
/// for an empty list.
pub fn write_csv<W: io::Write>(trades: &[&TradeRow], writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record([
        "Date", "Ticker", "Asset", "Quantity", "Price", "Type", "Account", "Total",
    ])?;
    for trade in trades {
        csv.write_record([
            trade.date.to_string(),
            trade.identifier().to_string(),
            trade.asset_name.to_string(),
            trade.quantity.to_string(),
            trade.price.to_string(),
            trade.operation_type.to_string(),
            trade.account_name.to_string(),
            format!("{:.2}", trade.amount()),
        ])?;
    }
    csv.flush().context("Failed to write CSV")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trade(asset: &str, account: &str, op: Operation, quantity: f64, price: f64) -> TradeRow {
        TradeRow {
            ticker: Some(CompactString::new(asset.to_ascii_uppercase())),
            isin: None,
            asset_name: CompactString::new(asset),
            currency: CompactString::new("EUR"),
            date: CompactString::new("2024-03-01"),
            quantity,
            price,
            operation_type: op,
            fees: 1.0,
            account_name: CompactString::new(account),
        }
    }

    fn history() -> Vec<TradeRow> {
        vec![
            trade("Vanguard All-World", "MyInvestor", Operation::Buy, 10.0, 100.0),
            trade("Bitcoin", "Kraken", Operation::Buy, 0.5, 40_000.0),
            trade("Vanguard All-World", "MyInvestor", Operation::Sell, 2.0, 110.0),
            trade("Gold ETC", "Trade Republic", Operation::Buy, 3.0, 20.0),
        ]
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let trades = history();
        assert_eq!(filter_trades(&trades, &TradeFilter::default()).len(), 4);
    }

    #[test]
    fn text_filters_are_case_insensitive_substrings() {
        let trades = history();
        let filter = TradeFilter {
            asset: "vanguard".into(),
            account: "INVEST".into(),
            operation: None,
        };
        let hits = filter_trades(&trades, &filter);
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|t| t.asset_name == "Vanguard All-World"));
    }

    #[test]
    fn operation_filter() {
        let trades = history();
        let filter = TradeFilter {
            operation: Some(Operation::Sell),
            ..TradeFilter::default()
        };
        let hits = filter_trades(&trades, &filter);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].quantity, 2.0);
    }

    #[test]
    fn unnamed_trades_pass_name_filters() {
        let t = trade("", "Kraken", Operation::Buy, 1.0, 1.0);
        let filter = TradeFilter {
            asset: "gold".into(),
            ..TradeFilter::default()
        };
        assert!(filter.matches(&t));
    }

    #[test]
    fn stats_count_and_sum() {
        let trades = history();
        let stats = trade_stats(&trades);
        assert_eq!(stats.buys, 3);
        assert_eq!(stats.sells, 1);
        assert!((stats.total_amount - (1000.0 + 20_000.0 + 220.0 + 60.0)).abs() < 1e-9);
        assert_eq!(stats.total_fees, 4.0);

        let nothing = TradeFilter {
            asset: "nothing".into(),
            ..TradeFilter::default()
        };
        assert_eq!(trade_stats(filter_trades(&trades, &nothing)), TradeStats::default());
    }

    #[test]
    fn parses_api_shape() {
        let json = r#"[{
            "ticker": null, "isin": "IE00BK5BQT80", "asset_name": "Vanguard FTSE All-World",
            "currency": "EUR", "date": "2024-01-15", "quantity": 4, "price": 110.5,
            "operation_type": "buy", "fees": 0, "account_name": "MyInvestor"
        }]"#;
        let trades: Vec<TradeRow> = serde_json::from_str(json).unwrap();
        assert_eq!(trades[0].operation_type, Operation::Buy);
        assert_eq!(trades[0].identifier(), "IE00BK5BQT80");
        assert_eq!(trades[0].amount(), 442.0);
    }

    #[test]
    fn csv_has_header_and_quotes_commas() {
        let mut trades = history();
        trades[1].asset_name = CompactString::new("Bitcoin, spot");
        let refs: Vec<&TradeRow> = trades.iter().take(2).collect();

        let mut buf = Vec::new();
        write_csv(&refs, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Date,Ticker,Asset,Quantity,Price,Type,Account,Total");
        assert_eq!(
            lines[1],
            "2024-03-01,VANGUARD ALL-WORLD,Vanguard All-World,10,100,buy,MyInvestor,1000.00"
        );
        assert_eq!(
            lines[2],
            "2024-03-01,BITCOIN,\"Bitcoin, spot\",0.5,40000,buy,Kraken,20000.00"
        );
    }
}
