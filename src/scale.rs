use glam::DVec3;

/// An 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub const BLACK: Rgb = Rgb([0, 0, 0]);
    pub const WHITE: Rgb = Rgb([255, 255, 255]);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }

    fn to_vec(self) -> DVec3 {
        DVec3::new(self.0[0] as f64, self.0[1] as f64, self.0[2] as f64)
    }

    fn from_vec(v: DVec3) -> Self {
        let c = v.round().clamp(DVec3::ZERO, DVec3::splat(255.0));
        Self([c.x as u8, c.y as u8, c.z as u8])
    }

    /// Alpha-composite `self` over `background`
    pub fn over(self, background: Rgb, alpha: f64) -> Rgb {
        let a = if alpha.is_nan() { 0.0 } else { alpha.clamp(0.0, 1.0) };
        Self::from_vec(background.to_vec().lerp(self.to_vec(), a))
    }

    /// Linear blend between two colors
    pub fn lerp(self, other: Rgb, t: f64) -> Rgb {
        Self::from_vec(self.to_vec().lerp(other.to_vec(), t))
    }
}

/// Population anchors of the choropleth
pub const POPULATION_ANCHORS: [f64; 5] = [2673.0, 3633.0, 4403.0, 5452.0, 11339.0];

/// Choropleth palette as declared; the scale uses it reversed
pub const POPULATION_PALETTE: [Rgb; 5] = [
    Rgb::new(105, 48, 195),
    Rgb::new(83, 144, 217),
    Rgb::new(72, 191, 227),
    Rgb::new(100, 223, 223),
    Rgb::new(128, 255, 219),
];

/// Color for inputs with no logarithm (NaN, negative)
pub const UNKNOWN_COLOR: Rgb = Rgb::BLACK;

/// Piecewise log-interpolated color scale, clamped at both ends.
///
/// Between adjacent anchors `a_i < a_{i+1}` the parameter is
/// `t = (ln v - ln a_i) / (ln a_{i+1} - ln a_i)` and each channel is
/// linear in `t`. Anchors must be positive and strictly increasing.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScale {
    log_anchors: Vec<f64>,
    colors: Vec<DVec3>,
}

impl ColorScale {
    /// Build from paired anchors and colors; both slices must have the same
    /// non-zero length.
    pub fn new(anchors: &[f64], colors: &[Rgb]) -> Self {
        assert_eq!(anchors.len(), colors.len(), "anchor/color count mismatch");
        assert!(!anchors.is_empty(), "color scale needs at least one anchor");
        assert!(
            anchors.windows(2).all(|w| w[0] < w[1]) && anchors[0] > 0.0,
            "anchors must be positive and strictly increasing"
        );
        Self {
            log_anchors: anchors.iter().map(|a| a.ln()).collect(),
            colors: colors.iter().map(|c| c.to_vec()).collect(),
        }
    }

    /// The population choropleth scale
    pub fn population() -> Self {
        let mut palette = POPULATION_PALETTE;
        palette.reverse();
        Self::new(&POPULATION_ANCHORS, &palette)
    }

    /// Color for `value`
    pub fn color(&self, value: f64) -> Rgb {
        let x = value.ln();
        if x.is_nan() {
            return UNKNOWN_COLOR;
        }

        let last = self.log_anchors.len() - 1;
        if x <= self.log_anchors[0] {
            return Rgb::from_vec(self.colors[0]);
        }
        if x >= self.log_anchors[last] {
            return Rgb::from_vec(self.colors[last]);
        }

        // First anchor strictly above x; x lies in segment [i - 1, i]
        let i = self.log_anchors.partition_point(|&a| a <= x);
        let (lo, hi) = (self.log_anchors[i - 1], self.log_anchors[i]);
        let t = (x - lo) / (hi - lo);
        Rgb::from_vec(self.colors[i - 1].lerp(self.colors[i], t))
    }

    pub fn anchor_color(&self, index: usize) -> Option<Rgb> {
        self.colors.get(index).copied().map(Rgb::from_vec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reversed() -> [Rgb; 5] {
        let mut p = POPULATION_PALETTE;
        p.reverse();
        p
    }

    #[test]
    fn test_anchors_hit_reversed_palette() {
        let scale = ColorScale::population();
        let palette = reversed();
        for (anchor, color) in POPULATION_ANCHORS.iter().zip(palette) {
            assert_eq!(scale.color(*anchor), color);
        }
        assert_eq!(scale.color(4403.0), Rgb::new(72, 191, 227));
        assert_eq!(scale.color(5452.0), Rgb::new(83, 144, 217));
    }

    #[test]
    fn test_clamps_at_both_ends() {
        let scale = ColorScale::population();
        let first = Rgb::new(128, 255, 219);
        let last = Rgb::new(105, 48, 195);
        assert_eq!(scale.color(2673.0), first);
        assert_eq!(scale.color(500.0), first);
        assert_eq!(scale.color(0.0), first);
        assert_eq!(scale.color(20000.0), last);
        assert_eq!(scale.color(f64::INFINITY), last);
    }

    #[test]
    fn test_no_logarithm_is_unknown() {
        let scale = ColorScale::population();
        assert_eq!(scale.color(f64::NAN), UNKNOWN_COLOR);
        assert_eq!(scale.color(-5.0), UNKNOWN_COLOR);
    }

    #[test]
    fn test_log_midpoint() {
        // Geometric mean of two anchors sits at t = 0.5
        let scale = ColorScale::new(&[10.0, 1000.0], &[Rgb::new(0, 0, 0), Rgb::new(200, 100, 50)]);
        assert_eq!(scale.color(100.0), Rgb::new(100, 50, 25));
    }

    #[test]
    fn test_monotonic_within_each_segment() {
        let scale = ColorScale::population();
        for w in POPULATION_ANCHORS.windows(2) {
            let samples: Vec<Rgb> = (0..=50)
                .map(|i| scale.color(w[0] + (w[1] - w[0]) * i as f64 / 50.0))
                .collect();
            for ch in 0..3 {
                let start = samples[0].0[ch];
                let end = samples[50].0[ch];
                for pair in samples.windows(2) {
                    let (a, b) = (pair[0].0[ch], pair[1].0[ch]);
                    if end >= start {
                        assert!(b >= a, "channel {ch} went backwards in {:?}", w);
                    } else {
                        assert!(b <= a, "channel {ch} went backwards in {:?}", w);
                    }
                }
            }
        }
    }

    #[test]
    fn test_over_blends_toward_background() {
        let c = Rgb::new(200, 0, 0).over(Rgb::new(0, 0, 100), 0.5);
        assert_eq!(c, Rgb::new(100, 0, 50));
        assert_eq!(Rgb::WHITE.over(Rgb::BLACK, 0.0), Rgb::BLACK);
    }
}
