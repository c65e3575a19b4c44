use anyhow::{Context, Result};
use quake_map::config::AppConfig;
use quake_map::data::{load_datasets, load_features, Datasets};
use quake_map::engine::{RenderedMap, TerminalMap};
use quake_map::layers::base::{BUILDINGS_SOURCE, BUILDINGS_SOURCE_LAYER};
use quake_map::session::{MapSession, SessionState, UpdateError};
use quake_map::tooltip::{TerminalTooltip, TooltipSink};

/// Degrees per bearing key press
const ROTATE_STEP: f64 = 15.0;
/// Degrees per pitch key press
const TILT_STEP: f64 = 5.0;

/// Map cells inside the border and above the status bar
fn map_area(width: u16, height: u16) -> (u16, u16) {
    (width.saturating_sub(2), height.saturating_sub(3))
}

/// Terminal position to map cell, accounting for the 1-cell border
fn to_map_cell(col: u16, row: u16) -> (u16, u16) {
    (col.saturating_sub(1), row.saturating_sub(1))
}

/// Application state
pub struct App {
    pub session: MapSession<TerminalMap>,
    pub tooltip: TerminalTooltip,
    pub should_quit: bool,
    /// Last mouse position for drag tracking
    pub last_mouse: Option<(u16, u16)>,
    /// Current mouse position for cursor marker
    pub mouse_pos: Option<(u16, u16)>,
    /// Outcome of the last user action, shown in the status bar
    pub message: Option<String>,
    config: AppConfig,
}

impl App {
    pub fn new(config: AppConfig, data: Datasets, width: u16, height: u16) -> Result<Self> {
        let (map_width, map_height) = map_area(width, height);
        let mut session: MapSession<TerminalMap> = MapSession::init(config.map_options(map_width, map_height), Some(data));

        if let Some(map) = session.engine_mut() {
            map.set_device_location(config.geolocate.position);
            if let Some(path) = &config.data.buildings {
                let buildings = load_features(path).context("Failed to load building footprints")?;
                tracing::info!(buildings = buildings.len(), "building footprints loaded");
                map.add_source(BUILDINGS_SOURCE, BUILDINGS_SOURCE_LAYER, buildings);
            }
        }

        let mut app = Self {
            session,
            tooltip: TerminalTooltip::new(),
            should_quit: false,
            last_mouse: None,
            mouse_pos: None,
            message: None,
            config,
        };
        app.tick();
        Ok(app)
    }

    /// Deliver pending engine events to the session
    pub fn tick(&mut self) {
        if let Err(err) = self.session.pump() {
            tracing::error!(error = %err, "failed to mount layers");
            self.message = Some(err.to_string());
        }
    }

    fn map(&mut self) -> Option<&mut TerminalMap> {
        self.session.engine_mut()
    }

    /// Current frame, `None` once the map is removed
    pub fn render_map(&self) -> Option<RenderedMap> {
        self.session.engine().map(TerminalMap::render)
    }

    /// Update the map size when the terminal resizes
    pub fn resize(&mut self, width: u16, height: u16) {
        let (map_width, map_height) = map_area(width, height);
        if let Some(map) = self.map() {
            map.resize(map_width, map_height);
        }
    }

    /// Pan the map
    pub fn pan(&mut self, dx: i32, dy: i32) {
        if let Some(map) = self.map() {
            map.pan(dx, dy);
        }
    }

    pub fn zoom_in(&mut self) {
        if let Some(map) = self.map() {
            map.zoom_in();
        }
    }

    pub fn zoom_out(&mut self) {
        if let Some(map) = self.map() {
            map.zoom_out();
        }
    }

    /// Zoom in towards a screen position (terminal column/row)
    pub fn zoom_in_at(&mut self, col: u16, row: u16) {
        let (x, y) = to_map_cell(col, row);
        if let Some(map) = self.map() {
            map.zoom_in_at(x, y);
        }
    }

    /// Zoom out from a screen position (terminal column/row)
    pub fn zoom_out_at(&mut self, col: u16, row: u16) {
        let (x, y) = to_map_cell(col, row);
        if let Some(map) = self.map() {
            map.zoom_out_at(x, y);
        }
    }

    /// Rotate the bearing; positive turns clockwise
    pub fn rotate(&mut self, steps: f64) {
        if let Some(map) = self.map() {
            map.rotate(steps * ROTATE_STEP);
        }
    }

    pub fn tilt(&mut self, steps: f64) {
        if let Some(map) = self.map() {
            map.tilt(steps * TILT_STEP);
        }
    }

    pub fn geolocate(&mut self) {
        let located = self.map().is_some_and(TerminalMap::geolocate);
        self.message = Some(if located {
            "Located".to_string()
        } else {
            "Location unavailable".to_string()
        });
    }

    /// Re-read both datasets and swap them in. A failed load keeps what is
    /// on screen.
    pub fn reload(&mut self) {
        let result = load_datasets(&self.config.data_paths())
            .map_err(|err| err.to_string())
            .and_then(|data| {
                let events = data.events.len();
                self.apply_update(data)
                    .map(|_| format!("Reloaded {} events", events))
                    .map_err(|err| err.to_string())
            });
        self.message = Some(match result {
            Ok(message) => message,
            Err(err) => {
                tracing::error!(error = %err, "reload failed");
                format!("Reload failed: {}", err)
            }
        });
    }

    /// Mount new datasets, then re-run the hover under the pointer so the
    /// tooltip and highlight describe the new data
    fn apply_update(&mut self, data: Datasets) -> Result<(), UpdateError> {
        self.session.update(data)?;
        match self.mouse_pos {
            Some((col, row)) => self.hover(col, row),
            None => self.tooltip.hide(),
        }
        Ok(())
    }

    /// Tear down the map and request quit
    pub fn quit(&mut self) {
        self.session.remove();
        self.should_quit = true;
    }

    /// Mouse moved over the terminal
    pub fn hover(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
        let position = to_map_cell(col, row);
        if let Err(err) = self.session.pointer_moved(position, &mut self.tooltip) {
            tracing::debug!(error = %err, "hover after removal");
        }
    }

    /// Handle mouse drag
    pub fn handle_drag(&mut self, x: u16, y: u16) {
        if let Some((last_x, last_y)) = self.last_mouse {
            let dx = (last_x as i32 - x as i32) * 2;
            let dy = (last_y as i32 - y as i32) * 4;
            self.pan(dx, dy);
        }
        self.last_mouse = Some((x, y));
    }

    /// Reset drag state when mouse button released
    pub fn end_drag(&mut self) {
        self.last_mouse = None;
    }

    /// Mouse cursor as a map cell
    pub fn cursor_cell(&self) -> Option<(u16, u16)> {
        self.mouse_pos.map(|(col, row)| to_map_cell(col, row))
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    /// Zoom, bearing and pitch for the status bar
    pub fn camera_summary(&self) -> String {
        match self.session.engine() {
            Some(map) => {
                let vp = map.viewport();
                format!("z{:.1} {:.0}° pitch {:.0}°", vp.zoom, vp.bearing, vp.pitch)
            }
            None => "-".to_string(),
        }
    }

    /// Get current center coordinates as a string
    pub fn center_coords(&self) -> String {
        let Some(map) = self.session.engine() else {
            return String::new();
        };
        let vp = map.viewport();
        format!(
            "{:.4}°{}, {:.4}°{}",
            vp.center_lat.abs(),
            if vp.center_lat >= 0.0 { "N" } else { "S" },
            vp.center_lon.abs(),
            if vp.center_lon >= 0.0 { "E" } else { "W" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quake_map::data::EventPoint;

    fn app() -> App {
        let quake = EventPoint {
            desc: "Test".into(),
            magnitude: 4.5,
            coordinates: [-118.197333, 34.016833],
            kind: "earthquake".into(),
        };
        let mut config = AppConfig::default();
        config.geolocate.position = Some([-118.25, 34.05]);
        App::new(config, Datasets::new(vec![quake], Vec::new()), 82, 27).unwrap()
    }

    #[test]
    fn test_new_app_is_ready() {
        let app = app();
        assert_eq!(app.state(), SessionState::Ready);
        let frame = app.render_map().unwrap();
        assert_eq!((frame.canvas.width(), frame.canvas.height()), (80, 24));
    }

    #[test]
    fn test_hover_over_marker_shows_tooltip() {
        let mut app = app();
        // Map center, shifted by the border
        app.hover(41, 13);
        let (tip, pos) = app.tooltip.visible().unwrap();
        assert_eq!(tip.lines[1], "at Test");
        assert_eq!(pos, (40, 12));

        app.hover(1, 1);
        assert!(app.tooltip.visible().is_none());
    }

    #[test]
    fn test_geolocate_uses_configured_position() {
        let mut app = app();
        app.geolocate();
        assert_eq!(app.message.as_deref(), Some("Located"));
        assert!(app.center_coords().starts_with("34.0500°N"));
    }

    #[test]
    fn test_quit_removes_map() {
        let mut app = app();
        app.quit();
        assert!(app.should_quit);
        assert_eq!(app.state(), SessionState::Removed);
        assert!(app.render_map().is_none());
        app.hover(41, 13);
        assert!(app.tooltip.visible().is_none());
    }

    #[test]
    fn test_update_refreshes_tooltip_under_pointer() {
        let mut app = app();
        app.hover(41, 13);
        assert!(app.tooltip.visible().is_some());

        // The quake under the pointer moves away
        let moved = EventPoint {
            desc: "Elsewhere".into(),
            magnitude: 4.5,
            coordinates: [-118.0, 34.2],
            kind: "earthquake".into(),
        };
        app.apply_update(Datasets::new(vec![moved], Vec::new())).unwrap();
        assert!(app.tooltip.visible().is_none());
    }

    #[test]
    fn test_update_with_new_content_updates_tooltip() {
        let mut app = app();
        app.hover(41, 13);

        let renamed = EventPoint {
            desc: "Renamed".into(),
            magnitude: 3.0,
            coordinates: [-118.197333, 34.016833],
            kind: "earthquake".into(),
        };
        app.apply_update(Datasets::new(vec![renamed], Vec::new())).unwrap();
        let (tip, pos) = app.tooltip.visible().unwrap();
        assert_eq!(tip.lines[1], "at Renamed");
        assert_eq!(pos, (40, 12));
    }
}
