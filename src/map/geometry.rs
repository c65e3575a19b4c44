use crate::braille::BrailleCanvas;
use crate::scale::Rgb;

/// Draw a line using Bresenham's algorithm
pub fn draw_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = x0;
    let mut y = y0;

    loop {
        canvas.set_pixel_signed(x, y);

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;

        if e2 >= dy {
            if x == x1 {
                break;
            }
            err += dy;
            x += sx;
        }

        if e2 <= dx {
            if y == y1 {
                break;
            }
            err += dx;
            y += sy;
        }
    }
}

/// Draw a filled circle (event markers)
pub fn draw_circle(canvas: &mut BrailleCanvas, cx: i32, cy: i32, radius: i32) {
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                canvas.set_pixel_signed(cx + dx, cy + dy);
            }
        }
    }
}

/// Draw a closed ring of dot coordinates
pub fn draw_ring(canvas: &mut BrailleCanvas, ring: &[(f64, f64)]) {
    for pair in ring.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        draw_line(
            canvas,
            a.0.round() as i32,
            a.1.round() as i32,
            b.0.round() as i32,
            b.1.round() as i32,
        );
    }
}

/// Tint every character cell whose center falls inside the polygon
/// (even-odd rule over all rings, so holes stay empty). Rings are in dot
/// coordinates.
pub fn fill_polygon_cells(canvas: &mut BrailleCanvas, rings: &[Vec<(f64, f64)>], color: Rgb, alpha: f64) {
    let Some((min_y, max_y)) = rings
        .iter()
        .flatten()
        .map(|p| p.1)
        .fold(None, |acc: Option<(f64, f64)>, y| match acc {
            Some((lo, hi)) => Some((lo.min(y), hi.max(y))),
            None => Some((y, y)),
        })
    else {
        return;
    };
    if !min_y.is_finite() || !max_y.is_finite() {
        return;
    }

    let first_row = ((min_y / 4.0).floor().max(0.0)) as usize;
    let last_row = ((max_y / 4.0).ceil().max(0.0) as usize).min(canvas.height());
    let mut crossings = Vec::new();

    for row in first_row..last_row {
        let y = row as f64 * 4.0 + 2.0;
        crossings.clear();
        for ring in rings {
            for pair in ring.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                if (a.1 <= y) != (b.1 <= y) {
                    crossings.push(a.0 + (y - a.1) / (b.1 - a.1) * (b.0 - a.0));
                }
            }
        }
        crossings.sort_by(|a, b| a.total_cmp(b));

        for span in crossings.chunks_exact(2) {
            if !span[0].is_finite() || !span[1].is_finite() {
                continue;
            }
            // Cells whose center x = col*2 + 1 lies within the span
            let start = ((span[0] - 1.0) / 2.0).ceil().max(0.0) as usize;
            let end = ((span[1] - 1.0) / 2.0).floor();
            if end < 0.0 {
                continue;
            }
            let end = (end as usize).min(canvas.width().saturating_sub(1));
            for col in start..=end {
                canvas.tint_cell(col, row, color, alpha);
            }
        }
    }
}

/// Even-odd point-in-polygon over lon/lat rings given as GeoJSON positions
pub fn polygon_contains(rings: &[Vec<Vec<f64>>], lon: f64, lat: f64) -> bool {
    let mut inside = false;
    for ring in rings {
        for pair in ring.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if a.len() < 2 || b.len() < 2 {
                continue;
            }
            let (ax, ay, bx, by) = (a[0], a[1], b[0], b[1]);
            if (ay > lat) != (by > lat) && lon < ax + (lat - ay) / (by - ay) * (bx - ax) {
                inside = !inside;
            }
        }
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizontal_line() {
        let mut canvas = BrailleCanvas::new(5, 1, Rgb::BLACK);
        draw_line(&mut canvas, 0, 0, 9, 0);
        assert_eq!(canvas.to_string(), "⠉⠉⠉⠉⠉");
    }

    #[test]
    fn test_vertical_line() {
        let mut canvas = BrailleCanvas::new(1, 2, Rgb::BLACK);
        draw_line(&mut canvas, 0, 0, 0, 7);
        assert_eq!(canvas.to_string(), "⡇\n⡇");
    }

    #[test]
    fn test_fill_square_tints_inner_cells() {
        let mut canvas = BrailleCanvas::new(10, 5, Rgb::BLACK);
        // Covers cells 1..=3 horizontally, rows 1..=2 vertically
        let square = vec![vec![(2.0, 4.0), (8.0, 4.0), (8.0, 12.0), (2.0, 12.0), (2.0, 4.0)]];
        fill_polygon_cells(&mut canvas, &square, Rgb::WHITE, 1.0);

        assert_eq!(canvas.cell(1, 1).unwrap().bg, Rgb::WHITE);
        assert_eq!(canvas.cell(3, 2).unwrap().bg, Rgb::WHITE);
        assert_eq!(canvas.cell(0, 1).unwrap().bg, Rgb::BLACK);
        assert_eq!(canvas.cell(4, 1).unwrap().bg, Rgb::BLACK);
        assert_eq!(canvas.cell(1, 0).unwrap().bg, Rgb::BLACK);
        assert_eq!(canvas.cell(1, 3).unwrap().bg, Rgb::BLACK);
    }

    #[test]
    fn test_fill_ignores_nan_rings() {
        let mut canvas = BrailleCanvas::new(2, 2, Rgb::BLACK);
        let ring = vec![vec![(f64::NAN, f64::NAN), (1.0, 1.0)]];
        fill_polygon_cells(&mut canvas, &ring, Rgb::WHITE, 1.0);
        assert_eq!(canvas.cell(0, 0).unwrap().bg, Rgb::BLACK);
    }

    #[test]
    fn test_polygon_contains_with_hole() {
        let outer = vec![vec![0.0, 0.0], vec![10.0, 0.0], vec![10.0, 10.0], vec![0.0, 10.0], vec![0.0, 0.0]];
        let hole = vec![vec![4.0, 4.0], vec![6.0, 4.0], vec![6.0, 6.0], vec![4.0, 6.0], vec![4.0, 4.0]];
        let rings = vec![outer, hole];
        assert!(polygon_contains(&rings, 2.0, 2.0));
        assert!(!polygon_contains(&rings, 5.0, 5.0));
        assert!(!polygon_contains(&rings, 12.0, 5.0));
    }
}
