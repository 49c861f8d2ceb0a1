use crate::render::TileView;

/// Hit-test: find which tile contains the given point.
///
/// Tiles never overlap, so at most one matches. Edges are half-open, so a
/// point on a shared edge belongs to the tile to its right or below.
pub fn hit_test<'t, 'a>(tiles: &'t [TileView<'a>], x: f64, y: f64) -> Option<&'t TileView<'a>> {
    tiles.iter().find(|tile| tile.bounds.contains(x, y))
}
