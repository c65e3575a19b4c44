use super::heat::HeatGrid;
use super::{
    Control, ControlPosition, EngineEvent, Layer, LayerStack, MapEngine, MapOptions, MapStyle, Pick,
};
use crate::braille::BrailleCanvas;
use crate::data::{feature_bbox, feature_polygons, EventPoint};
use crate::layers::base::{FillExtrusionLayer, SkyLayer, StyleLayer};
use crate::layers::{
    GeoJsonLayer, HeatmapLayer, OverlayLayer, ScatterplotLayer, HIGHLIGHT_ALPHA, HIGHLIGHT_COLOR,
};
use crate::map::geometry::{draw_circle, draw_ring, fill_polygon_cells, polygon_contains};
use crate::map::{FeatureGrid, Viewport, DOTS_PER_PIXEL};
use crate::scale::Rgb;
use geojson::Feature;
use std::collections::{HashMap, VecDeque};

/// Cell size in degrees of the polygon pick index
const PICK_GRID_DEGREES: f64 = 0.02;

/// Geolocation dot color
const USER_LOCATION_COLOR: Rgb = Rgb::new(29, 161, 242);

/// Compass arrows for bearings 0, 45, .. 315 (where north points on screen)
const COMPASS: [char; 8] = ['↑', '↖', '←', '↙', '↓', '↘', '→', '↗'];

/// Bounding boxes and pick grid of one polygon layer
struct PolygonIndex {
    bboxes: Vec<Option<(f64, f64, f64, f64)>>,
    grid: FeatureGrid,
}

impl PolygonIndex {
    fn build(layer: &GeoJsonLayer) -> Self {
        let bboxes: Vec<_> = layer.data.iter().map(|f| f.bbox()).collect();
        let grid = FeatureGrid::build(bboxes.iter().copied(), PICK_GRID_DEGREES);
        Self { bboxes, grid }
    }
}

/// One frame of the map: the composited canvas and control labels
pub struct RenderedMap {
    pub canvas: BrailleCanvas,
    pub controls: Vec<(ControlPosition, String)>,
}

/// Map engine drawing into a grid of terminal cells with Braille dots
pub struct TerminalMap {
    viewport: Viewport,
    style: MapStyle,
    antialias: bool,
    layers: LayerStack,
    controls: Vec<(Control, ControlPosition)>,
    events: VecDeque<EngineEvent>,
    /// Features keyed by (source, source layer)
    sources: HashMap<(String, String), Vec<Feature>>,
    polygon_index: HashMap<String, PolygonIndex>,
    highlight: Option<Pick>,
    /// Position reported for geolocation; terminals have no device sensor
    device_location: Option<[f64; 2]>,
    user_location: Option<[f64; 2]>,
    removed: bool,
}

impl MapEngine for TerminalMap {
    fn create(options: MapOptions) -> Self {
        let camera = options.camera;
        let viewport = Viewport::new(
            camera.center[0],
            camera.center[1],
            camera.zoom,
            options.container.width as usize * 2,
            options.container.height as usize * 4,
        )
        .with_orientation(camera.bearing, camera.pitch);

        tracing::info!(style = options.style.url(), zoom = camera.zoom, "map created");

        // The built-in style has nothing to fetch, so it is ready at once
        let mut events = VecDeque::new();
        events.push_back(EngineEvent::StyleLoaded);

        Self {
            viewport,
            style: options.style,
            antialias: options.antialias,
            layers: LayerStack::new(),
            controls: Vec::new(),
            events,
            sources: HashMap::new(),
            polygon_index: HashMap::new(),
            highlight: None,
            device_location: None,
            user_location: None,
            removed: false,
        }
    }

    fn add_control(&mut self, control: Control, position: ControlPosition) {
        self.controls.push((control, position));
    }

    fn add_layer(&mut self, layer: Layer) {
        match &layer {
            Layer::Overlay(OverlayLayer::GeoJson(l)) => {
                self.polygon_index.insert(l.id.clone(), PolygonIndex::build(l));
            }
            Layer::Style(StyleLayer::FillExtrusion(l)) => {
                let key = (l.source.clone(), l.source_layer.clone());
                if !self.sources.contains_key(&key) {
                    tracing::warn!(source = %l.source, source_layer = %l.source_layer, "no features for extrusion source");
                }
            }
            _ => {}
        }

        if self
            .highlight
            .as_ref()
            .is_some_and(|p| p.layer_id == layer.id())
        {
            self.highlight = None;
        }

        let id = layer.id().to_string();
        if self.layers.insert(layer) {
            tracing::debug!(%id, "replaced layer");
        } else {
            tracing::debug!(%id, "added layer");
        }
    }

    fn layer_ids(&self) -> Vec<String> {
        self.layers.ids()
    }

    fn overlay(&self, id: &str) -> Option<&OverlayLayer> {
        self.layers.overlay(id)
    }

    fn poll_event(&mut self) -> Option<EngineEvent> {
        self.events.pop_front()
    }

    fn pick(&self, position: (u16, u16)) -> Option<Pick> {
        if self.removed {
            return None;
        }
        // Center of the cell in dots
        let px = position.0 as f64 * 2.0 + 1.0;
        let py = position.1 as f64 * 4.0 + 2.0;

        for layer in self.layers.iter().rev() {
            let Layer::Overlay(overlay) = layer else {
                continue;
            };
            if !overlay.pickable() {
                continue;
            }
            let index = match overlay {
                OverlayLayer::Scatterplot(l) => self.pick_point(l, px, py),
                OverlayLayer::GeoJson(l) => self.pick_polygon(l, px, py),
                OverlayLayer::Heatmap(_) => None,
            };
            if let Some(index) = index {
                return Some(Pick {
                    layer_id: overlay.id().to_string(),
                    index,
                });
            }
        }
        None
    }

    fn set_highlight(&mut self, pick: Option<Pick>) {
        self.highlight = pick;
    }

    fn remove(&mut self) {
        self.layers.clear();
        self.controls.clear();
        self.events.clear();
        self.sources.clear();
        self.polygon_index.clear();
        self.highlight = None;
        self.user_location = None;
        self.removed = true;
        tracing::info!("map removed");
    }
}

impl TerminalMap {
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }

    /// Track a new container size in cells
    pub fn resize(&mut self, width: u16, height: u16) {
        self.viewport.width = width as usize * 2;
        self.viewport.height = height as usize * 4;
    }

    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.viewport.pan(dx, dy);
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    /// Zoom in towards a map cell
    pub fn zoom_in_at(&mut self, col: u16, row: u16) {
        self.viewport.zoom_in_at(col as i32 * 2, row as i32 * 4);
    }

    /// Zoom out from a map cell
    pub fn zoom_out_at(&mut self, col: u16, row: u16) {
        self.viewport.zoom_out_at(col as i32 * 2, row as i32 * 4);
    }

    pub fn rotate(&mut self, degrees: f64) {
        self.viewport.rotate_by(degrees);
    }

    pub fn tilt(&mut self, degrees: f64) {
        self.viewport.tilt_by(degrees);
    }

    /// Register features for a style source layer
    pub fn add_source(&mut self, source: &str, source_layer: &str, features: Vec<Feature>) {
        self.sources
            .insert((source.to_string(), source_layer.to_string()), features);
    }

    pub fn set_device_location(&mut self, location: Option<[f64; 2]>) {
        self.device_location = location;
    }

    pub fn user_location(&self) -> Option<[f64; 2]> {
        self.user_location
    }

    fn geolocate_control(&self) -> Option<super::GeolocateOptions> {
        self.controls.iter().find_map(|(c, _)| match c {
            Control::Geolocate(options) => Some(*options),
            _ => None,
        })
    }

    /// Trigger the geolocate control: center on the device location and
    /// keep showing it. False when there is no control or no location.
    pub fn geolocate(&mut self) -> bool {
        if self.geolocate_control().is_none() {
            return false;
        }
        let Some(location) = self.device_location else {
            tracing::warn!("geolocation unavailable");
            return false;
        };
        self.viewport.center_lon = location[0];
        self.viewport.center_lat = location[1];
        self.user_location = Some(location);
        true
    }

    /// Composite every mounted layer, bottom to top
    pub fn render(&self) -> RenderedMap {
        let background = self.style.background();
        let mut canvas = BrailleCanvas::new(self.viewport.width / 2, self.viewport.height / 4, background);

        if !self.removed {
            for layer in self.layers.iter() {
                match layer {
                    Layer::Style(StyleLayer::Sky(sky)) => self.draw_sky(&mut canvas, sky),
                    Layer::Style(StyleLayer::FillExtrusion(b)) => self.draw_buildings(&mut canvas, b),
                    Layer::Overlay(OverlayLayer::GeoJson(l)) => self.draw_polygons(&mut canvas, l),
                    Layer::Overlay(OverlayLayer::Heatmap(l)) => self.draw_heat(&mut canvas, l),
                    Layer::Overlay(OverlayLayer::Scatterplot(l)) => self.draw_points(&mut canvas, l),
                }
            }
            self.draw_user_location(&mut canvas);
        }

        RenderedMap {
            canvas,
            controls: self.control_labels(),
        }
    }

    fn is_highlighted(&self, layer_id: &str, index: usize) -> bool {
        self.highlight
            .as_ref()
            .is_some_and(|p| p.layer_id == layer_id && p.index == index)
    }

    fn project_ring(&self, ring: &[Vec<f64>]) -> Vec<(f64, f64)> {
        ring.iter()
            .filter(|p| p.len() >= 2)
            .map(|p| self.viewport.project_f(p[0], p[1]))
            .collect()
    }

    /// Rows above the horizon. Each row looks along the bearing at its own
    /// elevation; without antialiasing the whole band takes its middle row's
    /// color.
    fn draw_sky(&self, canvas: &mut BrailleCanvas, sky: &SkyLayer) {
        let band = (canvas.height() as f64 * self.viewport.sky_fraction()).round() as usize;
        let top = self.viewport.top_elevation();
        let color_of_row = |row: f64| {
            let elevation = top * (1.0 - (row + 0.5) / band as f64);
            let progress = sky.radial_progress(self.viewport.bearing, 90.0 - elevation);
            sky.color_at(progress, self.viewport.zoom)
        };
        let flat = color_of_row(band as f64 / 2.0 - 0.5);

        for row in 0..band {
            let color = if self.antialias {
                color_of_row(row as f64)
            } else {
                flat
            };
            for col in 0..canvas.width() {
                canvas.tint_cell(col, row, color.color, color.alpha);
            }
        }
    }

    fn draw_buildings(&self, canvas: &mut BrailleCanvas, layer: &FillExtrusionLayer) {
        if !layer.visible_at(self.viewport.zoom) {
            return;
        }
        let key = (layer.source.clone(), layer.source_layer.clone());
        let Some(features) = self.sources.get(&key) else {
            return;
        };

        canvas.set_pen(layer.color.over(self.style.background(), layer.opacity));
        for feature in features {
            let properties = feature.properties.as_ref();
            if !layer.filter.matches(properties)
                || layer.extrusion_at(self.viewport.zoom, properties) <= 0.0
            {
                continue;
            }
            for polygon in feature_polygons(feature) {
                for ring in polygon {
                    draw_ring(canvas, &self.project_ring(ring));
                }
            }
        }
    }

    fn draw_polygons(&self, canvas: &mut BrailleCanvas, layer: &GeoJsonLayer) {
        if !layer.filled && !layer.stroked {
            return;
        }
        let (min_lon, min_lat, max_lon, max_lat) = self.viewport.visible_bounds();
        let index = self.polygon_index.get(&layer.id);

        for (i, feature) in layer.data.iter().enumerate() {
            let bbox = match index {
                Some(index) => index.bboxes.get(i).copied().flatten(),
                None => feature_bbox(&feature.feature),
            };
            let Some((a, b, c, d)) = bbox else {
                continue;
            };
            if c < min_lon || a > max_lon || d < min_lat || b > max_lat {
                continue;
            }

            let (mut fill, mut opacity) = (layer.get_fill_color.get(feature), layer.opacity);
            if self.is_highlighted(&layer.id, i) {
                fill = HIGHLIGHT_COLOR.over(fill, HIGHLIGHT_ALPHA);
                opacity = opacity.max(HIGHLIGHT_ALPHA);
            }

            for polygon in feature.polygons() {
                let rings: Vec<_> = polygon.iter().map(|r| self.project_ring(r)).collect();
                if layer.filled {
                    fill_polygon_cells(canvas, &rings, fill, opacity);
                }
                if layer.stroked {
                    canvas.set_pen(layer.get_line_color.get(feature));
                    for ring in &rings {
                        draw_ring(canvas, ring);
                    }
                }
            }
        }
    }

    fn draw_heat(&self, canvas: &mut BrailleCanvas, layer: &HeatmapLayer) {
        let mut grid = HeatGrid::new(canvas.width(), canvas.height());
        let radius = layer.radius_pixels * DOTS_PER_PIXEL;
        for point in layer.data.iter() {
            let [lon, lat, _] = layer.get_position.get(point);
            let (x, y) = self.viewport.project_f(lon, lat);
            grid.add(x, y, layer.get_weight.get(point), radius);
        }
        for (cx, cy, density) in grid.normalized() {
            if let Some((color, alpha)) = layer.color_for(density) {
                canvas.tint_cell(cx, cy, color, alpha);
            }
        }
    }

    /// Marker radius in dots: meters to pixels, clamped to the layer's
    /// pixel range
    fn point_radius(&self, layer: &ScatterplotLayer, point: &EventPoint, lat: f64) -> i32 {
        let meters = layer.get_radius.get(point);
        let pixels = (meters / self.viewport.meters_per_pixel(lat))
            .clamp(layer.radius_min_pixels, layer.radius_max_pixels);
        (pixels * DOTS_PER_PIXEL).round().max(1.0) as i32
    }

    fn draw_points(&self, canvas: &mut BrailleCanvas, layer: &ScatterplotLayer) {
        let background = self.style.background();
        for (i, point) in layer.data.iter().enumerate() {
            let [lon, lat, _] = layer.get_position.get(point);
            if !lon.is_finite() || !lat.is_finite() {
                continue;
            }
            let (x, y) = self.viewport.project(lon, lat);
            if !self.viewport.is_visible(x, y) {
                continue;
            }
            let radius = self.point_radius(layer, point, lat);

            let mut fill = layer.get_fill_color.get(point).over(background, layer.opacity);
            if self.is_highlighted(&layer.id, i) {
                fill = HIGHLIGHT_COLOR.over(fill, HIGHLIGHT_ALPHA);
            }
            canvas.set_pen(fill);
            draw_circle(canvas, x, y, radius);

            if layer.stroked {
                canvas.set_pen(layer.get_line_color.get(point));
                draw_ring(canvas, &circle_ring(x as f64, y as f64, radius as f64));
            }
        }
    }

    fn draw_user_location(&self, canvas: &mut BrailleCanvas) {
        let (Some(location), Some(_)) = (self.user_location, self.geolocate_control()) else {
            return;
        };
        let (x, y) = self.viewport.project(location[0], location[1]);
        canvas.set_pen(USER_LOCATION_COLOR);
        draw_circle(canvas, x, y, 1);
    }

    fn pick_point(&self, layer: &ScatterplotLayer, px: f64, py: f64) -> Option<usize> {
        // Last drawn is on top
        layer.data.iter().enumerate().rev().find_map(|(i, point)| {
            let [lon, lat, _] = layer.get_position.get(point);
            if !lon.is_finite() || !lat.is_finite() {
                return None;
            }
            let (x, y) = self.viewport.project_f(lon, lat);
            // Half a cell of slack for character granularity
            let reach = self.point_radius(layer, point, lat) as f64 + 1.5;
            ((x - px).powi(2) + (y - py).powi(2) <= reach * reach).then_some(i)
        })
    }

    fn pick_polygon(&self, layer: &GeoJsonLayer, px: f64, py: f64) -> Option<usize> {
        let index = self.polygon_index.get(&layer.id)?;
        let (lon, lat) = self.viewport.unproject(px.round() as i32, py.round() as i32);
        index
            .grid
            .query_point(lon, lat)
            .into_iter()
            .rev()
            .find(|&i| {
                layer.data.get(i).is_some_and(|f| {
                    f.polygons()
                        .iter()
                        .any(|polygon| polygon_contains(polygon, lon, lat))
                })
            })
    }

    fn control_labels(&self) -> Vec<(ControlPosition, String)> {
        self.controls
            .iter()
            .map(|(control, position)| {
                let label = match control {
                    Control::Navigation => {
                        let bearing = self.viewport.bearing;
                        let arrow = COMPASS[((bearing / 45.0).round() as usize) % COMPASS.len()];
                        format!("[+][-] {arrow}N {bearing:.0}°")
                    }
                    Control::Geolocate(_) => match self.user_location {
                        Some([lon, lat]) => format!("◉ {lat:.4}, {lon:.4}"),
                        None => "◎ locate".to_string(),
                    },
                };
                (*position, label)
            })
            .collect()
    }
}

/// Closed polygon approximating a circle outline in dot coordinates
fn circle_ring(cx: f64, cy: f64, radius: f64) -> Vec<(f64, f64)> {
    const SEGMENTS: usize = 16;
    (0..=SEGMENTS)
        .map(|i| {
            let a = i as f64 / SEGMENTS as f64 * std::f64::consts::TAU;
            (cx + radius * a.cos(), cy + radius * a.sin())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Datasets, PopulationFeature};
    use crate::engine::{Camera, Container, GeolocateOptions};
    use crate::layers::base::{building_extrusion, gradient_sky};
    use crate::layers::{build_data_layers, EARTHQUAKES_ID, POPULATION_ID};
    use geojson::{Geometry, Value};

    fn options() -> MapOptions {
        MapOptions {
            container: Container {
                width: 80,
                height: 24,
            },
            style: MapStyle::Dark,
            camera: Camera {
                center: [-118.2, 34.0],
                zoom: 11.0,
                bearing: 0.0,
                pitch: 0.0,
            },
            antialias: true,
        }
    }

    fn tract(pop: f64, lon: f64, lat: f64, half: f64) -> PopulationFeature {
        let mut properties = geojson::JsonObject::new();
        properties.insert("edited_total_pop_totalPop".into(), pop.into());
        properties.insert("edited_total_pop_CITYNAME".into(), "Vernon".into());
        PopulationFeature::new(Feature {
            bbox: None,
            geometry: Some(Geometry::new(Value::Polygon(vec![vec![
                vec![lon - half, lat - half],
                vec![lon + half, lat - half],
                vec![lon + half, lat + half],
                vec![lon - half, lat + half],
                vec![lon - half, lat - half],
            ]]))),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        })
    }

    fn quake(lon: f64, lat: f64) -> EventPoint {
        EventPoint {
            desc: "Test".into(),
            magnitude: 4.5,
            coordinates: [lon, lat],
            kind: "earthquake".into(),
        }
    }

    fn mounted(data: &Datasets) -> TerminalMap {
        let mut map = TerminalMap::create(options());
        for layer in build_data_layers(data).unwrap() {
            map.add_layer(Layer::Overlay(layer));
        }
        map
    }

    /// Map cell containing a lon/lat
    fn cell_of(map: &TerminalMap, lon: f64, lat: f64) -> (u16, u16) {
        let (x, y) = map.viewport().project(lon, lat);
        ((x / 2) as u16, (y / 4) as u16)
    }

    #[test]
    fn test_style_loaded_once() {
        let mut map = TerminalMap::create(options());
        assert_eq!(map.poll_event(), Some(EngineEvent::StyleLoaded));
        assert_eq!(map.poll_event(), None);
    }

    #[test]
    fn test_pick_prefers_points_over_polygons() {
        let data = Datasets::new(vec![quake(-118.2, 34.0)], vec![tract(5452.0, -118.2, 34.0, 0.05)]);
        let map = mounted(&data);

        let center = cell_of(&map, -118.2, 34.0);
        assert_eq!(
            map.pick(center),
            Some(Pick {
                layer_id: EARTHQUAKES_ID.to_string(),
                index: 0
            })
        );

        // Inside the tract but away from the marker
        let edge = cell_of(&map, -118.16, 33.96);
        assert_eq!(
            map.pick(edge),
            Some(Pick {
                layer_id: POPULATION_ID.to_string(),
                index: 0
            })
        );

        assert_eq!(map.pick((0, 0)), None);
    }

    #[test]
    fn test_render_draws_marker_and_fill() {
        let data = Datasets::new(vec![quake(-118.2, 34.0)], vec![tract(5452.0, -118.2, 34.0, 0.05)]);
        let map = mounted(&data);
        let frame = map.render();
        let background = MapStyle::Dark.background();

        let (cx, cy) = cell_of(&map, -118.2, 34.0);
        let marker = frame.canvas.cell(cx as usize, cy as usize).unwrap();
        assert_ne!(marker.bits, 0);
        assert_eq!(marker.fg, Rgb::new(230, 57, 70).over(background, 0.8));

        // Fill and heat tint the tract; far corners stay untouched
        let (ex, ey) = cell_of(&map, -118.16, 33.96);
        assert_ne!(frame.canvas.cell(ex as usize, ey as usize).unwrap().bg, background);
        assert_eq!(frame.canvas.cell(0, 0).unwrap().bg, background);
    }

    #[test]
    fn test_nan_points_are_skipped() {
        let data = Datasets::new(vec![quake(f64::NAN, f64::NAN)], Vec::new());
        let map = mounted(&data);
        let frame = map.render();
        assert!((0..frame.canvas.height()).all(|r| frame.canvas.row(r).all(|(_, c)| c.bits == 0)));
        assert_eq!(map.pick((40, 12)), None);
    }

    #[test]
    fn test_highlight_changes_marker_color() {
        let data = Datasets::new(vec![quake(-118.2, 34.0)], Vec::new());
        let mut map = mounted(&data);
        let (cx, cy) = cell_of(&map, -118.2, 34.0);
        let plain = map.render().canvas.cell(cx as usize, cy as usize).unwrap().fg;

        map.set_highlight(Some(Pick {
            layer_id: EARTHQUAKES_ID.to_string(),
            index: 0,
        }));
        let lit = map.render().canvas.cell(cx as usize, cy as usize).unwrap().fg;
        assert_ne!(plain, lit);
    }

    #[test]
    fn test_buildings_need_source_and_zoom() {
        let mut map = TerminalMap::create(options());
        map.add_layer(Layer::Style(building_extrusion()));

        let mut props = geojson::JsonObject::new();
        props.insert("extrude".into(), "true".into());
        props.insert("height".into(), 30.0.into());
        let mut building = tract(0.0, -118.2, 34.0, 0.01).feature;
        building.properties = Some(props);
        map.add_source("composite", "building", vec![building]);

        // Zoom 11 is below the layer's minimum
        assert!(map.render().canvas.row(12).all(|(_, c)| c.bits == 0));

        map.viewport.zoom = 14.5;
        let frame = map.render();
        let drawn = (0..frame.canvas.height()).any(|r| frame.canvas.row(r).any(|(_, c)| c.bits != 0));
        assert!(drawn);
    }

    #[test]
    fn test_sky_tints_top_rows_when_tilted() {
        let mut map = TerminalMap::create(options());
        map.add_layer(Layer::Style(gradient_sky()));
        map.viewport.zoom = 20.0;
        let background = MapStyle::Dark.background();

        assert_eq!(map.render().canvas.cell(0, 0).unwrap().bg, background);
        map.tilt(85.0);
        let frame = map.render();
        assert_ne!(frame.canvas.cell(0, 0).unwrap().bg, background);
        assert_eq!(frame.canvas.cell(0, 23).unwrap().bg, background);
    }

    #[test]
    fn test_geolocate_requires_control_and_location() {
        let mut map = TerminalMap::create(options());
        map.set_device_location(Some([-118.25, 34.05]));
        assert!(!map.geolocate());

        map.add_control(
            Control::Geolocate(GeolocateOptions {
                enable_high_accuracy: true,
                track_user_location: true,
                show_user_heading: true,
            }),
            ControlPosition::TopRight,
        );
        assert!(map.geolocate());
        assert_eq!(map.user_location(), Some([-118.25, 34.05]));
        assert_eq!(map.viewport().center_lon, -118.25);

        map.set_device_location(None);
        assert!(!map.geolocate());
    }

    #[test]
    fn test_navigation_label_tracks_bearing() {
        let mut map = TerminalMap::create(options());
        map.add_control(Control::Navigation, ControlPosition::TopLeft);
        map.rotate(90.0);
        let labels = map.render().controls;
        assert_eq!(labels, vec![(ControlPosition::TopLeft, "[+][-] ←N 90°".to_string())]);
    }

    #[test]
    fn test_remove_clears_everything() {
        let data = Datasets::new(vec![quake(-118.2, 34.0)], Vec::new());
        let mut map = mounted(&data);
        map.remove();
        assert!(map.is_removed());
        assert!(map.layer_ids().is_empty());
        assert_eq!(map.pick(cell_of(&map, -118.2, 34.0)), None);
    }
}
