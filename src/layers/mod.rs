//! Typed descriptors for the three data layers and the configurator that
//! mounts them on a map engine.

pub mod base;

use crate::data::{Datasets, EventPoint, PopulationFeature};
use crate::engine::{Layer, MapEngine};
use crate::error::LayerError;
use crate::scale::{ColorScale, Rgb};
use crate::tooltip::{Tooltip, TooltipSink};
use std::sync::{Arc, OnceLock};

pub const EARTHQUAKES_ID: &str = "earthquakes";
pub const HEAT_ID: &str = "heat";
pub const POPULATION_ID: &str = "population";

/// Color blended over auto-highlighted objects, with its alpha
pub const HIGHLIGHT_COLOR: Rgb = Rgb::new(0, 0, 128);
pub const HIGHLIGHT_ALPHA: f64 = 0.5;

/// Default heat color range, light to dark
pub const HEAT_COLOR_RANGE: [Rgb; 6] = [
    Rgb::new(255, 255, 178),
    Rgb::new(254, 217, 118),
    Rgb::new(254, 178, 76),
    Rgb::new(253, 141, 60),
    Rgb::new(240, 59, 32),
    Rgb::new(189, 0, 38),
];

/// Per-object attribute: a constant or a function of the object
#[derive(Debug, Clone)]
pub enum Accessor<T, V> {
    Constant(V),
    Fn(fn(&T) -> V),
}

impl<T, V: Copy> Accessor<T, V> {
    pub fn get(&self, item: &T) -> V {
        match self {
            Accessor::Constant(v) => *v,
            Accessor::Fn(f) => f(item),
        }
    }
}

/// Builds the tooltip for a hovered object
pub type HoverFn<T> = fn(&T) -> Tooltip;

fn check_id(id: &str) -> Result<(), LayerError> {
    if id.is_empty() {
        return Err(LayerError::EmptyId);
    }
    Ok(())
}

fn check_opacity(id: &str, opacity: f64) -> Result<(), LayerError> {
    if !(0.0..=1.0).contains(&opacity) {
        return Err(LayerError::InvalidOpacity {
            id: id.to_string(),
            opacity,
        });
    }
    Ok(())
}

/// One circle per event
#[derive(Debug, Clone)]
pub struct ScatterplotLayer {
    pub id: String,
    pub data: Arc<[EventPoint]>,
    pub opacity: f64,
    /// Radius in meters before pixel clamping
    pub get_radius: Accessor<EventPoint, f64>,
    pub radius_min_pixels: f64,
    pub radius_max_pixels: f64,
    /// `[lon, lat, elevation]`
    pub get_position: Accessor<EventPoint, [f64; 3]>,
    pub get_fill_color: Accessor<EventPoint, Rgb>,
    pub get_line_color: Accessor<EventPoint, Rgb>,
    pub stroked: bool,
    pub pickable: bool,
    pub auto_highlight: bool,
    pub on_hover: Option<HoverFn<EventPoint>>,
}

impl ScatterplotLayer {
    pub fn validated(self) -> Result<Self, LayerError> {
        check_id(&self.id)?;
        check_opacity(&self.id, self.opacity)?;
        if !(self.radius_min_pixels <= self.radius_max_pixels) {
            return Err(LayerError::InvalidRadiusRange {
                id: self.id,
                min: self.radius_min_pixels,
                max: self.radius_max_pixels,
            });
        }
        Ok(self)
    }
}

/// Weighted density of events
#[derive(Debug, Clone)]
pub struct HeatmapLayer {
    pub id: String,
    pub data: Arc<[EventPoint]>,
    pub get_position: Accessor<EventPoint, [f64; 3]>,
    pub get_weight: Accessor<EventPoint, f64>,
    pub radius_pixels: f64,
    pub intensity: f64,
    /// Normalized density below which nothing is drawn
    pub threshold: f64,
    pub color_range: Vec<Rgb>,
}

impl HeatmapLayer {
    pub fn validated(self) -> Result<Self, LayerError> {
        check_id(&self.id)?;
        if !(self.radius_pixels > 0.0) {
            return Err(LayerError::InvalidHeatRadius {
                id: self.id,
                radius: self.radius_pixels,
            });
        }
        Ok(self)
    }

    /// Color and alpha for a normalized density in [0, 1], `None` below the
    /// threshold
    pub fn color_for(&self, density: f64) -> Option<(Rgb, f64)> {
        let t = (density * self.intensity).min(1.0);
        if !(t >= self.threshold) || self.color_range.is_empty() {
            return None;
        }
        let span = (1.0 - self.threshold).max(f64::EPSILON);
        let pos = ((t - self.threshold) / span).clamp(0.0, 1.0) * (self.color_range.len() - 1) as f64;
        let lo = pos.floor() as usize;
        let hi = (lo + 1).min(self.color_range.len() - 1);
        let color = self.color_range[lo].lerp(self.color_range[hi], pos - lo as f64);
        Some((color, t))
    }
}

/// One filled polygon per population tract
#[derive(Debug, Clone)]
pub struct GeoJsonLayer {
    pub id: String,
    pub data: Arc<[PopulationFeature]>,
    pub opacity: f64,
    pub stroked: bool,
    pub filled: bool,
    pub extruded: bool,
    pub wireframe: bool,
    pub pickable: bool,
    pub auto_highlight: bool,
    pub get_line_color: Accessor<PopulationFeature, Rgb>,
    pub get_fill_color: Accessor<PopulationFeature, Rgb>,
    pub on_hover: Option<HoverFn<PopulationFeature>>,
}

impl GeoJsonLayer {
    pub fn validated(self) -> Result<Self, LayerError> {
        check_id(&self.id)?;
        check_opacity(&self.id, self.opacity)?;
        Ok(self)
    }
}

/// A data layer mounted on top of the base style
#[derive(Debug, Clone)]
pub enum OverlayLayer {
    Scatterplot(ScatterplotLayer),
    Heatmap(HeatmapLayer),
    GeoJson(GeoJsonLayer),
}

impl OverlayLayer {
    pub fn id(&self) -> &str {
        match self {
            OverlayLayer::Scatterplot(l) => &l.id,
            OverlayLayer::Heatmap(l) => &l.id,
            OverlayLayer::GeoJson(l) => &l.id,
        }
    }

    pub fn pickable(&self) -> bool {
        match self {
            OverlayLayer::Scatterplot(l) => l.pickable,
            OverlayLayer::Heatmap(_) => false,
            OverlayLayer::GeoJson(l) => l.pickable,
        }
    }

    pub fn auto_highlight(&self) -> bool {
        match self {
            OverlayLayer::Scatterplot(l) => l.auto_highlight,
            OverlayLayer::Heatmap(_) => false,
            OverlayLayer::GeoJson(l) => l.auto_highlight,
        }
    }

    /// Number of visual primitives (one per input object)
    pub fn len(&self) -> usize {
        match self {
            OverlayLayer::Scatterplot(l) => l.data.len(),
            OverlayLayer::Heatmap(l) => l.data.len(),
            OverlayLayer::GeoJson(l) => l.data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run the layer's hover callback for the object at `index`
    pub fn hover(&self, index: usize) -> Option<Tooltip> {
        match self {
            OverlayLayer::Scatterplot(l) => l.on_hover.zip(l.data.get(index)).map(|(f, p)| f(p)),
            OverlayLayer::Heatmap(_) => None,
            OverlayLayer::GeoJson(l) => l.on_hover.zip(l.data.get(index)).map(|(f, p)| f(p)),
        }
    }
}

fn population_scale() -> &'static ColorScale {
    static SCALE: OnceLock<ColorScale> = OnceLock::new();
    SCALE.get_or_init(ColorScale::population)
}

fn population_fill(feature: &PopulationFeature) -> Rgb {
    population_scale().color(feature.total_population())
}

fn event_position(point: &EventPoint) -> [f64; 3] {
    [point.coordinates[0], point.coordinates[1], 20.0]
}

fn heat_position(point: &EventPoint) -> [f64; 3] {
    [point.coordinates[0], point.coordinates[1], 10.0]
}

fn heat_weight(point: &EventPoint) -> f64 {
    point.magnitude * 10.0
}

fn event_tooltip(point: &EventPoint) -> Tooltip {
    Tooltip::new([
        format!("A {} of magnitude {}", point.kind, point.magnitude),
        format!("at {}", point.desc),
    ])
}

fn population_tooltip(feature: &PopulationFeature) -> Tooltip {
    Tooltip::new([
        format!("A {}", feature.city_name()),
        format!("Population {}", feature.total_population()),
    ])
}

/// Event markers: 10-20px red circles that show type, magnitude and place
/// on hover
pub fn earthquake_layer(events: Arc<[EventPoint]>) -> Result<OverlayLayer, LayerError> {
    ScatterplotLayer {
        id: EARTHQUAKES_ID.to_string(),
        data: events,
        opacity: 0.8,
        get_radius: Accessor::Constant(1.0),
        radius_min_pixels: 10.0,
        radius_max_pixels: 20.0,
        get_position: Accessor::Fn(event_position),
        get_fill_color: Accessor::Constant(Rgb::new(230, 57, 70)),
        get_line_color: Accessor::Constant(Rgb::BLACK),
        stroked: false,
        pickable: true,
        auto_highlight: true,
        on_hover: Some(event_tooltip),
    }
    .validated()
    .map(OverlayLayer::Scatterplot)
}

/// Event density weighted by ten times the magnitude
pub fn heat_layer(events: Arc<[EventPoint]>) -> Result<OverlayLayer, LayerError> {
    HeatmapLayer {
        id: HEAT_ID.to_string(),
        data: events,
        get_position: Accessor::Fn(heat_position),
        get_weight: Accessor::Fn(heat_weight),
        radius_pixels: 100.0,
        intensity: 1.0,
        threshold: 0.05,
        color_range: HEAT_COLOR_RANGE.to_vec(),
    }
    .validated()
    .map(OverlayLayer::Heatmap)
}

/// Population choropleth: faint fills colored by tract population
pub fn population_layer(tracts: Arc<[PopulationFeature]>) -> Result<OverlayLayer, LayerError> {
    GeoJsonLayer {
        id: POPULATION_ID.to_string(),
        data: tracts,
        opacity: 0.1,
        stroked: false,
        filled: true,
        extruded: false,
        wireframe: false,
        pickable: true,
        auto_highlight: true,
        get_line_color: Accessor::Constant(Rgb::WHITE),
        get_fill_color: Accessor::Fn(population_fill),
        on_hover: Some(population_tooltip),
    }
    .validated()
    .map(OverlayLayer::GeoJson)
}

/// The three data layers in mount order: population, heat, earthquakes
pub fn build_data_layers(data: &Datasets) -> Result<[OverlayLayer; 3], LayerError> {
    Ok([
        population_layer(Arc::clone(&data.population))?,
        heat_layer(Arc::clone(&data.events))?,
        earthquake_layer(Arc::clone(&data.events))?,
    ])
}

/// Mount the data layers on `engine`. Without data this does nothing and
/// returns `Ok(false)`. Re-mounting replaces layers by id.
pub fn mount_data_layers<E>(engine: &mut E, data: Option<&Datasets>) -> Result<bool, LayerError>
where
    E: MapEngine + ?Sized,
{
    let Some(data) = data else {
        return Ok(false);
    };

    for layer in build_data_layers(data)? {
        tracing::debug!(id = layer.id(), objects = layer.len(), "mounting layer");
        engine.add_layer(Layer::Overlay(layer));
    }
    Ok(true)
}

/// Route a pointer move at a map cell to the picked layer's hover callback
/// and into `sink`; nothing picked hides the tooltip.
pub fn dispatch_hover<E>(engine: &mut E, position: (u16, u16), sink: &mut dyn TooltipSink)
where
    E: MapEngine + ?Sized,
{
    let pick = engine.pick(position);
    let picked_layer = pick.as_ref().and_then(|p| engine.overlay(&p.layer_id));
    let tooltip = pick
        .as_ref()
        .zip(picked_layer)
        .and_then(|(p, layer)| layer.hover(p.index));
    let highlight = pick.filter(|_| picked_layer.is_some_and(OverlayLayer::auto_highlight));

    engine.set_highlight(highlight);

    match tooltip {
        Some(content) => sink.show(content, position),
        None => sink.hide(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(kind: &str, magnitude: f64, desc: &str) -> EventPoint {
        EventPoint {
            desc: desc.to_string(),
            magnitude,
            coordinates: [-118.2, 34.0],
            kind: kind.to_string(),
        }
    }

    #[test]
    fn test_build_order_is_population_heat_earthquakes() {
        let data = Datasets::new(vec![point("earthquake", 1.0, "x")], Vec::new());
        let ids: Vec<String> = build_data_layers(&data)
            .unwrap()
            .iter()
            .map(|l| l.id().to_string())
            .collect();
        assert_eq!(ids, vec![POPULATION_ID, HEAT_ID, EARTHQUAKES_ID]);
    }

    #[test]
    fn test_point_and_heat_share_events() {
        let data = Datasets::new(vec![point("earthquake", 1.0, "x"); 3], Vec::new());
        let [_, heat, quakes] = build_data_layers(&data).unwrap();
        let (OverlayLayer::Heatmap(heat), OverlayLayer::Scatterplot(quakes)) = (heat, quakes) else {
            panic!("unexpected layer kinds");
        };
        assert!(Arc::ptr_eq(&heat.data, &quakes.data));
        assert_eq!(quakes.data.len(), 3);
    }

    #[test]
    fn test_fixed_visual_parameters() {
        let events: Arc<[EventPoint]> = vec![point("earthquake", 4.5, "x")].into();
        let OverlayLayer::Scatterplot(quakes) = earthquake_layer(Arc::clone(&events)).unwrap() else {
            panic!("expected scatterplot");
        };
        assert_eq!((quakes.radius_min_pixels, quakes.radius_max_pixels), (10.0, 20.0));
        assert_eq!(quakes.get_position.get(&events[0]), [-118.2, 34.0, 20.0]);

        let OverlayLayer::Heatmap(heat) = heat_layer(Arc::clone(&events)).unwrap() else {
            panic!("expected heatmap");
        };
        assert_eq!(heat.get_weight.get(&events[0]), 45.0);
        assert_eq!(heat.radius_pixels, 100.0);
    }

    #[test]
    fn test_event_tooltip_text() {
        let layer = earthquake_layer(vec![point("earthquake", 4.5, "5km N of Test")].into()).unwrap();
        let tip = layer.hover(0).unwrap();
        assert_eq!(tip.lines, vec!["A earthquake of magnitude 4.5", "at 5km N of Test"]);
        assert!(layer.hover(1).is_none());
    }

    #[test]
    fn test_heat_is_not_interactive() {
        let layer = heat_layer(vec![point("earthquake", 4.5, "x")].into()).unwrap();
        assert!(!layer.pickable());
        assert!(layer.hover(0).is_none());
    }

    #[test]
    fn test_validation_rejects_bad_descriptors() {
        let OverlayLayer::Scatterplot(mut quakes) = earthquake_layer(Vec::<EventPoint>::new().into()).unwrap() else {
            panic!("expected scatterplot");
        };
        quakes.radius_min_pixels = 30.0;
        assert!(matches!(
            quakes.clone().validated(),
            Err(LayerError::InvalidRadiusRange { .. })
        ));
        quakes.radius_min_pixels = 10.0;
        quakes.opacity = 1.5;
        assert!(matches!(quakes.clone().validated(), Err(LayerError::InvalidOpacity { .. })));
        quakes.opacity = 0.8;
        quakes.id.clear();
        assert_eq!(quakes.validated().unwrap_err(), LayerError::EmptyId);

        let OverlayLayer::Heatmap(mut heat) = heat_layer(Vec::<EventPoint>::new().into()).unwrap() else {
            panic!("expected heatmap");
        };
        heat.radius_pixels = 0.0;
        assert!(matches!(heat.validated(), Err(LayerError::InvalidHeatRadius { .. })));
    }

    #[test]
    fn test_heat_color_threshold_and_range() {
        let OverlayLayer::Heatmap(heat) = heat_layer(Vec::<EventPoint>::new().into()).unwrap() else {
            panic!("expected heatmap");
        };
        assert!(heat.color_for(0.01).is_none());
        assert!(heat.color_for(f64::NAN).is_none());
        assert_eq!(heat.color_for(0.05), Some((HEAT_COLOR_RANGE[0], 0.05)));
        assert_eq!(heat.color_for(1.0), Some((HEAT_COLOR_RANGE[5], 1.0)));
    }
}
