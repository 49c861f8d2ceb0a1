use thiserror::Error;

use crate::portfolio::AssetId;

/// Errors raised by the portfolio calculations.
///
/// Loading and parsing at the edges (asset files, config) go through
/// `anyhow` instead; these are the failures callers are expected to match on.
#[derive(Debug, Error, PartialEq)]
pub enum FolioError {
    #[error("target for asset {asset_id} is {value}%, expected a value between 0 and 100")]
    TargetOutOfRange { asset_id: AssetId, value: f64 },

    #[error("targets add up to {total:.2}%, expected 100% (±{tolerance})")]
    TargetSumMismatch { total: f64, tolerance: f64 },

    #[error("target lists asset {0} more than once")]
    DuplicateTarget(AssetId),
}

pub type Result<T> = std::result::Result<T, FolioError>;
