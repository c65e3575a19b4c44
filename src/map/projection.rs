use std::f64::consts::PI;

/// Braille dots covered by one 256px web-map tile at zoom 0.
/// Screen-pixel sizes from layer descriptors are scaled by `DOTS_PER_PIXEL`.
pub const TILE_DOTS: f64 = 64.0;
pub const DOTS_PER_PIXEL: f64 = TILE_DOTS / 256.0;

pub const MIN_ZOOM: f64 = 0.0;
pub const MAX_ZOOM: f64 = 22.0;
pub const MAX_PITCH: f64 = 85.0;

/// Vertical field of view in degrees
const VERTICAL_FOV: f64 = 36.87;

/// Earth circumference at the equator in meters, for meters-per-pixel
const EARTH_CIRCUMFERENCE_M: f64 = 40_075_016.686;

/// Camera over a Web Mercator plane. `zoom` uses web-map levels
/// (the world is `TILE_DOTS * 2^zoom` dots wide) and `bearing` rotates the
/// map clockwise in degrees. Pitch is kept for the sky band only.
#[derive(Clone, Debug, PartialEq)]
pub struct Viewport {
    /// Center longitude (-180 to 180)
    pub center_lon: f64,
    /// Center latitude (-85 to 85)
    pub center_lat: f64,
    pub zoom: f64,
    pub bearing: f64,
    pub pitch: f64,
    /// Canvas dot width
    pub width: usize,
    /// Canvas dot height
    pub height: usize,
}

impl Viewport {
    pub fn new(center_lon: f64, center_lat: f64, zoom: f64, width: usize, height: usize) -> Self {
        Self {
            center_lon,
            center_lat,
            zoom,
            bearing: 0.0,
            pitch: 0.0,
            width,
            height,
        }
    }

    pub fn with_orientation(mut self, bearing: f64, pitch: f64) -> Self {
        self.bearing = bearing.rem_euclid(360.0);
        self.pitch = pitch.clamp(0.0, MAX_PITCH);
        self
    }

    fn world_size(&self) -> f64 {
        TILE_DOTS * 2f64.powf(self.zoom)
    }

    fn rotate(&self, x: f64, y: f64, sign: f64) -> (f64, f64) {
        let (sin, cos) = (sign * self.bearing.to_radians()).sin_cos();
        (x * cos - y * sin, x * sin + y * cos)
    }

    /// Pan the viewport by a screen delta in dots
    pub fn pan(&mut self, dx: i32, dy: i32) {
        // Screen delta back into unrotated map space
        let (mx, my) = self.rotate(dx as f64, dy as f64, 1.0);
        let scale = self.world_size();
        let (cx, cy) = mercator(self.center_lon, self.center_lat);
        let (lon, lat) = inverse_mercator(cx + mx / scale, cy + my / scale);

        self.center_lon = lon;
        // Wrap longitude
        if self.center_lon > 180.0 {
            self.center_lon -= 360.0;
        } else if self.center_lon < -180.0 {
            self.center_lon += 360.0;
        }
        self.center_lat = lat.clamp(-85.0, 85.0);
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom + 0.5).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom - 0.5).max(MIN_ZOOM);
    }

    /// Zoom in towards a specific dot location
    pub fn zoom_in_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, 0.5);
    }

    /// Zoom out from a specific dot location
    pub fn zoom_out_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, -0.5);
    }

    fn zoom_at(&mut self, px: i32, py: i32, delta: f64) {
        // Geographic point under the pointer
        let (lon, lat) = self.unproject(px, py);

        self.zoom = (self.zoom + delta).clamp(MIN_ZOOM, MAX_ZOOM);

        // Bring that point back under the pointer
        let (new_px, new_py) = self.project(lon, lat);
        self.pan(new_px - px, new_py - py);
    }

    pub fn rotate_by(&mut self, degrees: f64) {
        self.bearing = (self.bearing + degrees).rem_euclid(360.0);
    }

    /// Project a geographic coordinate (lon, lat) to dot coordinates
    /// without rounding
    pub fn project_f(&self, lon: f64, lat: f64) -> (f64, f64) {
        let (x, y) = mercator(lon, lat);
        let (cx, cy) = mercator(self.center_lon, self.center_lat);
        let scale = self.world_size();
        let (rx, ry) = self.rotate((x - cx) * scale, (y - cy) * scale, -1.0);
        (rx + self.width as f64 / 2.0, ry + self.height as f64 / 2.0)
    }

    /// Project a geographic coordinate (lon, lat) to dot coordinates
    pub fn project(&self, lon: f64, lat: f64) -> (i32, i32) {
        let (x, y) = self.project_f(lon, lat);
        (x.round() as i32, y.round() as i32)
    }

    /// Unproject dot coordinates back to geographic coordinates (lon, lat)
    pub fn unproject(&self, px: i32, py: i32) -> (f64, f64) {
        let dx = px as f64 - self.width as f64 / 2.0;
        let dy = py as f64 - self.height as f64 / 2.0;
        let (mx, my) = self.rotate(dx, dy, 1.0);
        let scale = self.world_size();
        let (cx, cy) = mercator(self.center_lon, self.center_lat);
        inverse_mercator(cx + mx / scale, cy + my / scale)
    }

    /// Ground meters covered by one screen pixel at `lat`
    pub fn meters_per_pixel(&self, lat: f64) -> f64 {
        EARTH_CIRCUMFERENCE_M * lat.to_radians().cos() / (256.0 * 2f64.powf(self.zoom))
    }

    /// Fraction of the screen height above the horizon for the current
    /// pitch, given a fixed vertical field of view
    pub fn sky_fraction(&self) -> f64 {
        ((self.pitch + VERTICAL_FOV / 2.0 - 90.0) / VERTICAL_FOV).clamp(0.0, 1.0)
    }

    /// Elevation in degrees above the horizon at the top screen edge
    pub fn top_elevation(&self) -> f64 {
        (self.pitch + VERTICAL_FOV / 2.0 - 90.0).max(0.0)
    }

    pub fn tilt_by(&mut self, degrees: f64) {
        self.pitch = (self.pitch + degrees).clamp(0.0, MAX_PITCH);
    }

    /// Check if a projected point is visible in the viewport
    pub fn is_visible(&self, px: i32, py: i32) -> bool {
        px >= -10 && px < self.width as i32 + 10 && py >= -10 && py < self.height as i32 + 10
    }

    /// Lon/lat bounds of the screen, from its four corners
    pub fn visible_bounds(&self) -> (f64, f64, f64, f64) {
        let (w, h) = (self.width as i32, self.height as i32);
        let corners = [(0, 0), (w, 0), (0, h), (w, h)].map(|(x, y)| self.unproject(x, y));
        corners.iter().fold(
            (f64::MAX, f64::MAX, f64::MIN, f64::MIN),
            |(a, b, c, d), &(lon, lat)| (a.min(lon), b.min(lat), c.max(lon), d.max(lat)),
        )
    }
}

/// Normalized Web Mercator coordinates in [0, 1]
fn mercator(lon: f64, lat: f64) -> (f64, f64) {
    let x = (lon + 180.0) / 360.0;
    let lat_rad = lat * PI / 180.0;
    let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0;
    (x, y)
}

fn inverse_mercator(x: f64, y: f64) -> (f64, f64) {
    let lon = x * 360.0 - 180.0;
    let lat = (PI * (1.0 - 2.0 * y)).sinh().atan() * 180.0 / PI;
    (lon, lat)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_center() {
        let vp = Viewport::new(-118.2, 34.0, 14.5, 100, 100).with_orientation(20.0, 60.0);
        assert_eq!(vp.project(-118.2, 34.0), (50, 50));
    }

    #[test]
    fn test_unproject_inverts_project() {
        let vp = Viewport::new(-118.2, 34.0, 10.0, 200, 120).with_orientation(20.0, 0.0);
        let (px, py) = vp.project(-118.1, 34.05);
        let (lon, lat) = vp.unproject(px, py);
        assert!((lon + 118.1).abs() < 0.01);
        assert!((lat - 34.05).abs() < 0.01);
    }

    #[test]
    fn test_pan_moves_east() {
        let mut vp = Viewport::new(0.0, 0.0, 2.0, 100, 100);
        vp.pan(10, 0);
        assert!(vp.center_lon > 0.0);
    }

    #[test]
    fn test_bearing_rotates_north_clockwise_from_up() {
        // With bearing 90 the map's north points to screen left
        let vp = Viewport::new(0.0, 0.0, 4.0, 100, 100).with_orientation(90.0, 0.0);
        let (px, py) = vp.project(0.0, 1.0);
        assert!(px < 50);
        assert!((py - 50).abs() <= 1);
    }

    #[test]
    fn test_sky_only_past_the_horizon() {
        let mut vp = Viewport::new(0.0, 0.0, 4.0, 100, 100).with_orientation(0.0, 60.0);
        assert_eq!(vp.sky_fraction(), 0.0);
        vp.tilt_by(25.0);
        assert_eq!(vp.pitch, MAX_PITCH);
        assert!(vp.sky_fraction() > 0.3);
        assert!((vp.top_elevation() - (MAX_PITCH + VERTICAL_FOV / 2.0 - 90.0)).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut vp = Viewport::new(0.0, 0.0, 21.8, 100, 100);
        vp.zoom_in();
        assert_eq!(vp.zoom, MAX_ZOOM);
        vp.zoom = 0.2;
        vp.zoom_out();
        assert_eq!(vp.zoom, MIN_ZOOM);
    }
}
