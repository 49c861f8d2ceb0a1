pub mod aggregate;
pub mod allocation;
pub mod rebalance;
pub mod trades;

use std::fmt;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::layout::Weighted;

/// Asset identifier as issued by the portfolio API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(pub u32);

/// Account identifier as issued by the portfolio API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub u32);

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One position: an asset held in one account, valued at the latest price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRow {
    pub account_id: AccountId,
    pub account_name: CompactString,
    pub asset_id: AssetId,
    pub name: CompactString,
    #[serde(default)]
    pub ticker: CompactString,
    #[serde(default)]
    pub isin: Option<CompactString>,
    #[serde(rename = "type")]
    pub kind: CompactString,
    #[serde(default)]
    pub theme: CompactString,
    pub quantity: f64,
    pub current_price: f64,
    pub total_value: f64,
    #[serde(default)]
    pub invested_value: f64,
    /// Return since purchase, in percent
    #[serde(default)]
    pub performance: f64,
}

impl AssetRow {
    /// Ticker, else ISIN, else `"N/A"`.
    pub fn identifier(&self) -> &str {
        identifier(&self.ticker, self.isin.as_deref())
    }
}

impl Weighted for AssetRow {
    fn weight(&self) -> f64 {
        self.total_value
    }
}

pub(crate) fn identifier<'a>(ticker: &'a str, isin: Option<&'a str>) -> &'a str {
    if !ticker.is_empty() {
        ticker
    } else {
        isin.filter(|s| !s.is_empty()).unwrap_or("N/A")
    }
}

/// Read asset rows from a JSON array. A path of `-` reads stdin.
pub fn load_assets(path: &Path) -> Result<Vec<AssetRow>> {
    let text = read_input(path)?;
    let rows: Vec<AssetRow> = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse asset rows from {}", path.display()))?;

    tracing::info!("Loaded {} asset rows from {}", rows.len(), path.display());
    Ok(rows)
}

pub(crate) fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        Ok(text)
    } else {
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn row(account: u32, asset: u32, name: &str, value: f64) -> AssetRow {
        AssetRow {
            account_id: AccountId(account),
            account_name: CompactString::new(format!("Account {account}")),
            asset_id: AssetId(asset),
            name: CompactString::new(name),
            ticker: CompactString::new(name.to_ascii_uppercase()),
            isin: None,
            kind: CompactString::new("ETF"),
            theme: CompactString::new("Global"),
            quantity: 1.0,
            current_price: value,
            total_value: value,
            invested_value: value,
            performance: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_api_shape() {
        let json = r#"[{
            "account_id": 1, "account_name": "Broker", "asset_id": 7,
            "name": "Vanguard FTSE All-World", "ticker": "VWCE", "isin": "IE00BK5BQT80",
            "type": "ETF", "theme": "Global", "quantity": 10.5,
            "current_price": 120.0, "total_value": 1260.0, "invested_value": 1000.0,
            "performance": 26.0
        }]"#;
        let rows: Vec<AssetRow> = serde_json::from_str(json).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].asset_id, AssetId(7));
        assert_eq!(rows[0].kind, "ETF");
        assert_eq!(rows[0].identifier(), "VWCE");
        assert_eq!(rows[0].weight(), 1260.0);
    }

    #[test]
    fn identifier_falls_back_to_isin_then_placeholder() {
        assert_eq!(identifier("", Some("IE00B4L5Y983")), "IE00B4L5Y983");
        assert_eq!(identifier("", Some("")), "N/A");
        assert_eq!(identifier("", None), "N/A");
    }

    #[test]
    fn load_assets_reports_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not an array").unwrap();
        let err = load_assets(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse asset rows"));
    }
}
