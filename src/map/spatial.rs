use std::collections::HashMap;

/// Grid cells a single feature may occupy before it is kept aside as
/// oversized
const MAX_CELLS_PER_FEATURE: i64 = 4096;

/// Spatial index for polygon features using conservative approximation.
/// Each feature's bounding box is indexed into every cell it overlaps,
/// guaranteeing no false negatives while allowing false positives
/// (eliminated by the exact point-in-polygon test during picking).
/// Features whose box spans more than `MAX_CELLS_PER_FEATURE` cells are
/// candidates for every query instead.
#[derive(Debug, Default)]
pub struct FeatureGrid {
    cells: HashMap<(i32, i32), Vec<usize>>,
    oversized: Vec<usize>,
    cell_size: f64,
}

impl FeatureGrid {
    pub fn new(cell_size: f64) -> Self {
        Self {
            cells: HashMap::new(),
            oversized: Vec::new(),
            cell_size,
        }
    }

    #[inline(always)]
    fn to_cell(&self, lon: f64, lat: f64) -> (i32, i32) {
        let x = (lon / self.cell_size).floor() as i32;
        let y = (lat / self.cell_size).floor() as i32;
        (x, y)
    }

    /// Build from per-feature bounding boxes; `None` (no polygon geometry)
    /// keeps its index slot but is never returned
    pub fn build(bboxes: impl Iterator<Item = Option<(f64, f64, f64, f64)>>, cell_size: f64) -> Self {
        let mut grid = Self::new(cell_size);
        for (idx, bbox) in bboxes.enumerate() {
            let Some((min_lon, min_lat, max_lon, max_lat)) = bbox else {
                continue;
            };
            if ![min_lon, min_lat, max_lon, max_lat].iter().all(|v| v.is_finite()) {
                continue;
            }
            let min_cell = grid.to_cell(min_lon, min_lat);
            let max_cell = grid.to_cell(max_lon, max_lat);
            let span = (max_cell.0 as i64 - min_cell.0 as i64 + 1) * (max_cell.1 as i64 - min_cell.1 as i64 + 1);
            if span > MAX_CELLS_PER_FEATURE {
                tracing::debug!(feature = idx, cells = span, "feature too large for pick grid");
                grid.oversized.push(idx);
                continue;
            }
            for y in min_cell.1..=max_cell.1 {
                for x in min_cell.0..=max_cell.0 {
                    grid.cells.entry((x, y)).or_default().push(idx);
                }
            }
        }
        grid
    }

    /// Feature indices that may contain the point, in insertion order
    pub fn query_point(&self, lon: f64, lat: f64) -> Vec<usize> {
        let local = self
            .cells
            .get(&self.to_cell(lon, lat))
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        if self.oversized.is_empty() {
            return local.to_vec();
        }
        let mut candidates: Vec<usize> = local.iter().chain(&self.oversized).copied().collect();
        candidates.sort_unstable();
        candidates
    }
}
