use super::{Bounds, Tile, Weighted};

/// Binary slice-and-dice treemap.
///
/// Splits the items at the first prefix whose accumulated weight reaches half
/// of the total, gives each half a share of the region proportional to its
/// weight, and recurses. The cut runs across the longer side of the current
/// region (vertical cut when `w >= h`), which keeps tiles closer to square
/// than alternating by depth.
///
/// One tile is returned per item, in input order. A single item always gets
/// the whole region, whatever its weight. When every weight is zero the
/// threshold is zero too, so the first item is peeled off on its own with a
/// zero-size tile at each level and the last item receives the full region.
pub fn binary_layout<'a, T: Weighted>(items: &'a [T], bounds: Bounds) -> Vec<Tile<'a, T>> {
    let mut tiles = Vec::with_capacity(items.len());
    // Pending (items, region) pairs; right is pushed before left to keep input order.
    let mut pending = vec![(items, bounds)];
    while let Some((items, b)) = pending.pop() {
        match items {
            [] => {}
            [only] => tiles.push(Tile::new(b, only)),
            _ => {
                let (left, right) = split(items, b);
                pending.push(right);
                pending.push(left);
            }
        }
    }
    tiles
}

type Half<'a, T> = (&'a [T], Bounds);

/// One split step for two or more items.
fn split<'a, T: Weighted>(items: &'a [T], b: Bounds) -> (Half<'a, T>, Half<'a, T>) {
    let total: f64 = items.iter().map(Weighted::weight).sum();
    let k = split_index(items, total);
    let (left, right) = items.split_at(k);

    // Summed in the same order as the scan, so this equals the scan's accumulator.
    let left_weight: f64 = left.iter().map(Weighted::weight).sum();
    let ratio = if total > 0.0 { left_weight / total } else { 0.0 };

    if total <= 0.0 {
        tracing::trace!("zero total weight over {} items, peeling first item", items.len());
    }

    if b.w >= b.h {
        let w1 = b.w * ratio;
        (
            (left, Bounds::new(b.x, b.y, w1, b.h)),
            (right, Bounds::new(b.x + w1, b.y, b.w - w1, b.h)),
        )
    } else {
        let h1 = b.h * ratio;
        (
            (left, Bounds::new(b.x, b.y, b.w, h1)),
            (right, Bounds::new(b.x, b.y + h1, b.w, b.h - h1)),
        )
    }
}

/// First prefix length whose accumulated weight is `>= total / 2`, clamped so
/// both halves are non-empty.
///
/// The clamp matters in two places: when only the last item tips the sum over
/// half (ascending input like `[1, 3]`), and when no prefix qualifies at all
/// (NaN weights). Either way an empty half would hand the full item list back
/// to the same region and never terminate.
fn split_index<T: Weighted>(items: &[T], total: f64) -> usize {
    let half = total / 2.0;
    let mut acc = 0.0;
    let mut k = 0;
    for (i, item) in items.iter().enumerate() {
        acc += item.weight();
        if acc >= half {
            k = i + 1;
            break;
        }
    }

    if k == 0 {
        tracing::debug!(
            "no prefix reached half of total={} over {} items, falling back to single-item split",
            total,
            items.len()
        );
        1
    } else {
        k.min(items.len() - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::WeightedItem;

    fn items(weights: &[f64]) -> Vec<WeightedItem<usize>> {
        weights
            .iter()
            .enumerate()
            .map(|(i, &w)| WeightedItem::new(i, w))
            .collect()
    }

    fn assert_rect<T>(tile: &Tile<'_, T>, x: f64, y: f64, w: f64, h: f64) {
        let eps = 1e-9;
        assert!(
            (tile.x - x).abs() < eps
                && (tile.y - y).abs() < eps
                && (tile.w - w).abs() < eps
                && (tile.h - h).abs() < eps,
            "expected ({x}, {y}, {w}, {h}), got ({}, {}, {}, {})",
            tile.x,
            tile.y,
            tile.w,
            tile.h
        );
    }

    #[test]
    fn empty_input_gives_no_tiles() {
        let none: Vec<WeightedItem<usize>> = Vec::new();
        assert!(binary_layout(&none, Bounds::percent()).is_empty());
    }

    #[test]
    fn single_item_fills_region_regardless_of_weight() {
        for weight in [0.0, 1.0, 1e9] {
            let input = items(&[weight]);
            let tiles = binary_layout(&input, Bounds::percent());
            assert_eq!(tiles.len(), 1);
            assert_eq!(tiles[0].bounds(), Bounds::new(0.0, 0.0, 100.0, 100.0));
            assert_eq!(tiles[0].item.key, 0);
        }
    }

    #[test]
    fn wide_region_splits_vertically() {
        let input = items(&[3.0, 1.0]);
        let tiles = binary_layout(&input, Bounds::percent());
        assert_eq!(tiles.len(), 2);
        assert_rect(&tiles[0], 0.0, 0.0, 75.0, 100.0);
        assert_rect(&tiles[1], 75.0, 0.0, 25.0, 100.0);
    }

    #[test]
    fn tall_region_splits_horizontally() {
        let input = items(&[1.0, 3.0]);
        let tiles = binary_layout(&input, Bounds::new(0.0, 0.0, 10.0, 100.0));
        assert_eq!(tiles.len(), 2);
        assert_rect(&tiles[0], 0.0, 0.0, 10.0, 25.0);
        assert_rect(&tiles[1], 0.0, 25.0, 10.0, 75.0);
        assert_eq!(tiles[0].item.key, 0);
        assert_eq!(tiles[1].item.key, 1);
    }

    #[test]
    fn equal_weights_give_equal_quadrants() {
        let input = items(&[1.0, 1.0, 1.0, 1.0]);
        let tiles = binary_layout(&input, Bounds::percent());
        assert_eq!(tiles.len(), 4);
        for tile in &tiles {
            assert!((tile.area() - 2500.0).abs() < 1e-9);
        }
        let total: f64 = tiles.iter().map(|t| t.area()).sum();
        assert!((total - 10_000.0).abs() < 1e-9);
    }

    #[test]
    fn all_zero_weights_peel_one_at_a_time() {
        let input = items(&[0.0, 0.0, 0.0]);
        let tiles = binary_layout(&input, Bounds::percent());
        assert_eq!(tiles.len(), 3);
        assert_rect(&tiles[0], 0.0, 0.0, 0.0, 100.0);
        assert_rect(&tiles[1], 0.0, 0.0, 0.0, 100.0);
        assert_rect(&tiles[2], 0.0, 0.0, 100.0, 100.0);
        assert!(tiles.iter().all(|t| t.x.is_finite() && t.w.is_finite()));
    }

    #[test]
    fn long_zero_weight_peel_does_not_overflow() {
        let input = items(&vec![0.0; 20_000]);
        let tiles = binary_layout(&input, Bounds::percent());
        assert_eq!(tiles.len(), 20_000);
        assert!(tiles[..19_999].iter().all(|t| t.area() == 0.0));
        assert_rect(&tiles[19_999], 0.0, 0.0, 100.0, 100.0);
        assert!(tiles.iter().enumerate().all(|(i, t)| t.item.key == i));
    }

    #[test]
    fn long_dominant_tail_does_not_overflow() {
        // The last item outweighs everything before it at every level, so
        // each split peels it off the end.
        let mut weights = vec![0.0; 10_000];
        weights[9_999] = 1.0;
        let input = items(&weights);
        let tiles = binary_layout(&input, Bounds::percent());
        assert_eq!(tiles.len(), 10_000);
        assert!((tiles[9_999].area() - 10_000.0).abs() < 1e-9);
    }

    #[test]
    fn split_order_follows_input_order() {
        let input = items(&[1.0, 5.0, 2.0, 8.0]);
        let tiles = binary_layout(&input, Bounds::percent());
        let keys: Vec<usize> = tiles.iter().map(|t| t.item.key).collect();
        assert_eq!(keys, vec![0, 1, 2, 3]);
    }

    #[test]
    fn area_is_proportional_to_weight() {
        let weights = [40.0, 25.0, 15.0, 10.0, 6.0, 4.0];
        let input = items(&weights);
        let region = Bounds::new(5.0, 5.0, 160.0, 90.0);
        let tiles = binary_layout(&input, region);
        let total: f64 = weights.iter().sum();
        for (tile, w) in tiles.iter().zip(weights) {
            let expected = w / total * region.area();
            assert!((tile.area() - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn zero_size_region_propagates() {
        let input = items(&[2.0, 1.0, 1.0]);
        let tiles = binary_layout(&input, Bounds::new(3.0, 4.0, 0.0, 0.0));
        assert_eq!(tiles.len(), 3);
        assert!(tiles.iter().all(|t| t.area() == 0.0));
    }

    #[test]
    fn nan_weights_terminate() {
        let input = items(&[f64::NAN, 1.0, 2.0]);
        let tiles = binary_layout(&input, Bounds::percent());
        assert_eq!(tiles.len(), 3);
    }

    #[test]
    fn repeated_calls_are_identical() {
        let input = items(&[7.3, 2.1, 9.9, 0.4, 3.3]);
        let a = binary_layout(&input, Bounds::new(0.0, 0.0, 123.4, 56.7));
        let b = binary_layout(&input, Bounds::new(0.0, 0.0, 123.4, 56.7));
        assert_eq!(a, b);
    }
}
