//! Proportional treemap layout.
//!
//! Both strategies take an ordered slice of weighted items and a bounding
//! region, and return one [`Tile`] per item. They never sort: callers that
//! want the largest items placed first sort before calling.

pub mod binary;
pub mod squarify;

use serde::{Deserialize, Serialize};

pub use binary::binary_layout;
pub use squarify::squarify;

/// Anything that can be laid out proportionally to a non-negative weight.
///
/// Negative weights are not checked by the layout functions; the result is
/// unspecified for them.
pub trait Weighted {
    fn weight(&self) -> f64;
}

impl<W: Weighted + ?Sized> Weighted for &W {
    fn weight(&self) -> f64 {
        (**self).weight()
    }
}

/// A plain key + weight pair for callers that don't have their own item type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedItem<K> {
    pub key: K,
    pub weight: f64,
}

impl<K> WeightedItem<K> {
    pub fn new(key: K, weight: f64) -> Self {
        Self { key, weight }
    }
}

impl<K> Weighted for WeightedItem<K> {
    fn weight(&self) -> f64 {
        self.weight
    }
}

/// An axis-aligned region, origin at the top-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Bounds {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// The 0–100 percentage space the dashboard lays tiles out in.
    pub const fn percent() -> Self {
        Self::new(0.0, 0.0, 100.0, 100.0)
    }

    pub fn area(&self) -> f64 {
        self.w * self.h
    }

    /// Half-open containment: the right and bottom edges belong to the neighbour.
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px < self.x + self.w && py >= self.y && py < self.y + self.h
    }

    /// Shrink by `pad` on every side, clamping the size at zero.
    pub fn inset(&self, pad: f64) -> Self {
        let w = (self.w - 2.0 * pad).max(0.0);
        let h = (self.h - 2.0 * pad).max(0.0);
        Self {
            x: self.x + (self.w - w) / 2.0,
            y: self.y + (self.h - h) / 2.0,
            w,
            h,
        }
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::percent()
    }
}

/// A positioned rectangle carrying the item it was laid out for.
#[derive(Debug, PartialEq)]
pub struct Tile<'a, T> {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub item: &'a T,
}

impl<T> Clone for Tile<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Tile<'_, T> {}

impl<'a, T> Tile<'a, T> {
    pub(crate) fn new(bounds: Bounds, item: &'a T) -> Self {
        Self {
            x: bounds.x,
            y: bounds.y,
            w: bounds.w,
            h: bounds.h,
            item,
        }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.x, self.y, self.w, self.h)
    }

    pub fn area(&self) -> f64 {
        self.w * self.h
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LayoutStrategy {
    /// Recursive weighted-median split, axis chosen by aspect ratio.
    #[default]
    Binary,
    /// Row-based squarified layout.
    Squarified,
}

/// Configuration for treemap layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub strategy: LayoutStrategy,
    /// Region the tiles are laid out in
    pub bounds: Bounds,
    /// Inset applied to each tile when building the visual view
    pub padding: f64,
    /// Tiles whose inner area is below this get no label
    pub min_label_area: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            strategy: LayoutStrategy::Binary,
            bounds: Bounds::percent(),
            padding: 0.5,
            min_label_area: 4.0,
        }
    }
}

/// Lay `items` out in `config.bounds` using the configured strategy.
pub fn compute_layout<'a, T: Weighted>(items: &'a [T], config: &LayoutConfig) -> Vec<Tile<'a, T>> {
    match config.strategy {
        LayoutStrategy::Binary => binary_layout(items, config.bounds),
        LayoutStrategy::Squarified => squarify(items, config.bounds),
    }
}
