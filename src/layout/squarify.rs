use super::{binary_layout, Bounds, Tile, Weighted};

/// Squarified treemap (Bruls, Huizing & van Wijk 2000), order preserving.
///
/// Items are packed into rows laid along the shorter side of the remaining
/// region; a row keeps growing while its worst aspect ratio does not get
/// worse. Items are taken in input order, so sort descending first for the
/// classic result.
///
/// Fewer than two items, a zero-area region or a non-positive total weight
/// fall through to [`binary_layout`], which already handles those cases.
pub fn squarify<'a, T: Weighted>(items: &'a [T], bounds: Bounds) -> Vec<Tile<'a, T>> {
    let total: f64 = items.iter().map(Weighted::weight).sum();
    if items.len() < 2 || !(total > 0.0) || bounds.area() <= 0.0 {
        return binary_layout(items, bounds);
    }

    // Weights scaled to screen area
    let scale = bounds.area() / total;
    let areas: Vec<f64> = items.iter().map(|item| item.weight() * scale).collect();

    let mut result = Vec::with_capacity(items.len());
    let Bounds {
        mut x,
        mut y,
        mut w,
        mut h,
    } = bounds;
    let mut start = 0;

    while start < areas.len() {
        // A wide region gets a column on its left edge, a tall one a row on top.
        let column = w >= h;
        let side = if column { h } else { w };
        let long = if column { w } else { h };

        let mut end = start + 1;
        let mut row_sum = areas[start];
        let mut best = worst_aspect_ratio(&areas[start..end], row_sum, side);
        while end < areas.len() {
            let next_sum = row_sum + areas[end];
            let score = worst_aspect_ratio(&areas[start..=end], next_sum, side);
            if score > best {
                break;
            }
            best = score;
            row_sum = next_sum;
            end += 1;
        }

        // The last row takes whatever is left so the region is tiled exactly.
        let thickness = if end == areas.len() {
            long
        } else if side > 0.0 {
            (row_sum / side).min(long)
        } else {
            0.0
        };

        let mut offset = 0.0;
        for i in start..end {
            let length = if i + 1 == end {
                (side - offset).max(0.0)
            } else if thickness > 0.0 {
                areas[i] / thickness
            } else {
                0.0
            };

            let rect = if column {
                Bounds::new(x, y + offset, thickness, length)
            } else {
                Bounds::new(x + offset, y, length, thickness)
            };
            result.push(Tile::new(rect, &items[i]));
            offset += length;
        }

        // Shrink remaining space
        if column {
            x += thickness;
            w = (w - thickness).max(0.0);
        } else {
            y += thickness;
            h = (h - thickness).max(0.0);
        }

        start = end;
    }

    result
}

fn worst_aspect_ratio(row: &[f64], sum: f64, side: f64) -> f64 {
    if row.is_empty() || sum <= 0.0 || side <= 0.0 {
        return f64::MAX;
    }
    let side_sq = side * side;
    let sum_sq = sum * sum;
    let max_r = row.iter().copied().fold(0.0, f64::max);
    let min_r = row.iter().copied().fold(f64::INFINITY, f64::min);
    let a = (side_sq * max_r) / sum_sq;
    let b = sum_sq / (side_sq * min_r);
    a.max(b)
}
