/// Per-cell kernel density of weighted points on a character grid.
/// Points are in dot coordinates; each spreads a gaussian of the given dot
/// radius (sigma = radius / 3) over the cells whose centers it reaches.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatGrid {
    width: usize,
    height: usize,
    weights: Vec<f64>,
}

impl HeatGrid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            weights: vec![0.0; width * height],
        }
    }

    /// Accumulate one point. Non-finite positions or weights are skipped.
    pub fn add(&mut self, x: f64, y: f64, weight: f64, radius: f64) {
        if !(x.is_finite() && y.is_finite() && weight.is_finite()) || radius <= 0.0 {
            return;
        }
        let sigma2 = (radius / 3.0).powi(2) * 2.0;
        let r2 = radius * radius;

        // Cell (cx, cy) has its center at (cx*2 + 1, cy*4 + 2)
        let min_cx = ((x - radius - 1.0) / 2.0).floor().max(0.0) as usize;
        let max_cx = ((x + radius - 1.0) / 2.0).ceil();
        let min_cy = ((y - radius - 2.0) / 4.0).floor().max(0.0) as usize;
        let max_cy = ((y + radius - 2.0) / 4.0).ceil();
        if max_cx < 0.0 || max_cy < 0.0 {
            return;
        }
        let max_cx = (max_cx as usize).min(self.width.saturating_sub(1));
        let max_cy = (max_cy as usize).min(self.height.saturating_sub(1));
        if self.width == 0 || self.height == 0 {
            return;
        }

        for cy in min_cy..=max_cy {
            let dy = cy as f64 * 4.0 + 2.0 - y;
            for cx in min_cx..=max_cx {
                let dx = cx as f64 * 2.0 + 1.0 - x;
                let d2 = dx * dx + dy * dy;
                if d2 <= r2 {
                    self.weights[cy * self.width + cx] += weight * (-d2 / sigma2).exp();
                }
            }
        }
    }

    pub fn max(&self) -> f64 {
        self.weights.iter().copied().fold(0.0, f64::max)
    }

    /// Cells with their density normalized to the grid maximum, skipping
    /// empty cells
    pub fn normalized(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        let max = self.max();
        self.weights
            .iter()
            .enumerate()
            .filter(move |(_, &w)| max > 0.0 && w > 0.0)
            .map(move |(i, &w)| (i % self.width, i / self.width, w / max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peak_at_point() {
        let mut grid = HeatGrid::new(10, 5);
        // Center of cell (4, 2)
        grid.add(9.0, 10.0, 5.0, 8.0);
        let cells: Vec<_> = grid.normalized().collect();
        let peak = cells.iter().find(|(x, y, _)| (*x, *y) == (4, 2)).unwrap();
        assert_eq!(peak.2, 1.0);
        assert!(cells.iter().all(|(_, _, d)| *d <= 1.0 && *d > 0.0));
        assert!(cells.len() > 1);
    }

    #[test]
    fn test_weights_accumulate() {
        let mut one = HeatGrid::new(4, 4);
        one.add(3.0, 6.0, 1.0, 4.0);
        let mut two = HeatGrid::new(4, 4);
        two.add(3.0, 6.0, 1.0, 4.0);
        two.add(3.0, 6.0, 1.0, 4.0);
        assert!((two.max() - 2.0 * one.max()).abs() < 1e-12);
    }

    #[test]
    fn test_skips_nan_and_offscreen() {
        let mut grid = HeatGrid::new(4, 4);
        grid.add(f64::NAN, 1.0, 1.0, 4.0);
        grid.add(1.0, 1.0, f64::NAN, 4.0);
        grid.add(-500.0, -500.0, 1.0, 4.0);
        assert_eq!(grid.max(), 0.0);
        assert_eq!(grid.normalized().count(), 0);
    }
}
