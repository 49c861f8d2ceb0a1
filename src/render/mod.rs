pub mod colors;

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use rayon::prelude::*;
use serde::Serialize;

use crate::layout::{compute_layout, Bounds, LayoutConfig};
use crate::portfolio::{AccountId, AssetId, AssetRow};

use self::colors::{band_color, band_text_color, ColorSettings, PerformanceBand, TileColor};

/// How prominent a tile's label is, driven by its share of the portfolio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelSize {
    Large,
    Medium,
    Small,
    /// Tile too small to carry text
    Hidden,
}

impl LabelSize {
    /// Above 12 % is large, above 4 % medium, anything else small.
    pub fn for_weight(weight_pct: f64) -> Self {
        if weight_pct > 12.0 {
            LabelSize::Large
        } else if weight_pct > 4.0 {
            LabelSize::Medium
        } else {
            LabelSize::Small
        }
    }
}

/// A laid-out asset ready to draw.
#[derive(Debug, Clone, Serialize)]
pub struct TileView<'a> {
    pub asset: &'a AssetRow,
    pub bounds: Bounds,
    /// `bounds` inset by the configured padding
    pub inner: Bounds,
    /// Share of the treemap's total value, in percent
    pub weight_pct: f64,
    pub band: PerformanceBand,
    pub color: TileColor,
    /// Colour of the performance figure drawn on the tile
    pub text_color: TileColor,
    pub label: LabelSize,
}

/// The full treemap (tiles + fast lookup).
#[derive(Debug, Serialize)]
pub struct Treemap<'a> {
    pub total_value: f64,
    pub tiles: Vec<TileView<'a>>,
    /// asset → index into `tiles`
    #[serde(skip)]
    pub asset_to_tile: HashMap<AssetId, usize>,
}

impl<'a> Treemap<'a> {
    pub fn tile(&self, asset: AssetId) -> Option<&TileView<'a>> {
        self.asset_to_tile.get(&asset).map(|&i| &self.tiles[i])
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

/// Build the asset treemap for `rows`.
///
/// Rows without positive value are dropped and the rest are placed
/// largest-first; equal values keep their input order.
pub fn build_treemap<'a>(
    rows: &'a [AssetRow],
    config: &LayoutConfig,
    colors: &ColorSettings,
) -> Treemap<'a> {
    layout_assets(rows.iter().collect(), config, colors)
}

/// One treemap per account, ordered by account id. Accounts are laid out in
/// parallel; each covers the full configured bounds.
pub fn build_account_treemaps<'a>(
    rows: &'a [AssetRow],
    config: &LayoutConfig,
    colors: &ColorSettings,
) -> Vec<(AccountId, Treemap<'a>)> {
    let mut by_account: BTreeMap<AccountId, Vec<&'a AssetRow>> = BTreeMap::new();
    for row in rows {
        by_account.entry(row.account_id).or_default().push(row);
    }
    let groups: Vec<(AccountId, Vec<&'a AssetRow>)> = by_account.into_iter().collect();

    groups
        .into_par_iter()
        .map(|(account, assets)| (account, layout_assets(assets, config, colors)))
        .collect()
}

fn layout_assets<'a>(
    mut assets: Vec<&'a AssetRow>,
    config: &LayoutConfig,
    colors: &ColorSettings,
) -> Treemap<'a> {
    let before = assets.len();
    assets.retain(|r| r.total_value > 0.0);
    if assets.len() < before {
        tracing::debug!("Skipping {} rows with no positive value", before - assets.len());
    }
    // Stable sort, descending
    assets.sort_by(|a, b| {
        b.total_value
            .partial_cmp(&a.total_value)
            .unwrap_or(Ordering::Equal)
    });

    let total_value: f64 = assets.iter().map(|a| a.total_value).sum();
    let positioned = compute_layout(&assets, config);

    tracing::info!(
        "Laid out {} tiles ({:?}) totalling {:.2} in {:.0}x{:.0}",
        positioned.len(),
        config.strategy,
        total_value,
        config.bounds.w,
        config.bounds.h
    );

    let mut tiles = Vec::with_capacity(positioned.len());
    let mut asset_to_tile = HashMap::with_capacity(positioned.len());

    for tile in &positioned {
        let asset: &'a AssetRow = *tile.item;
        let bounds = tile.bounds();
        let inner = bounds.inset(config.padding);
        let weight_pct = if total_value > 0.0 {
            asset.total_value / total_value * 100.0
        } else {
            0.0
        };
        let band = PerformanceBand::classify(asset.performance);
        let label = if inner.area() < config.min_label_area {
            LabelSize::Hidden
        } else {
            LabelSize::for_weight(weight_pct)
        };

        // An asset held in several accounts keeps the first (largest) tile.
        asset_to_tile.entry(asset.asset_id).or_insert(tiles.len());
        tiles.push(TileView {
            asset,
            bounds,
            inner,
            weight_pct,
            band,
            color: band_color(band, colors),
            text_color: band_text_color(band),
            label,
        });
    }

    Treemap {
        total_value,
        tiles,
        asset_to_tile,
    }
}
