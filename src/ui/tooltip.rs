use serde::Serialize;

use crate::render::TileView;
use crate::ui::format::{format_eur, format_pct};

/// Information to display when hovering over a tile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TooltipInfo {
    pub name: String,
    pub identifier: String,
    pub account: String,
    pub value_display: String,
    pub weight_display: String,
    /// Arrow plus absolute return, e.g. `▲ 1.25%`
    pub performance_display: String,
}

/// Build tooltip info for a tile.
pub fn build_tooltip(tile: &TileView<'_>) -> TooltipInfo {
    let asset = tile.asset;
    let arrow = if asset.performance > 0.0 { '▲' } else { '▼' };

    TooltipInfo {
        name: asset.name.to_string(),
        identifier: asset.identifier().to_string(),
        account: asset.account_name.to_string(),
        value_display: format_eur(asset.total_value),
        weight_display: format!("Peso: {}", format_pct(tile.weight_pct, 1)),
        performance_display: format!("{} {}", arrow, format_pct(asset.performance.abs(), 2)),
    }
}
