//! The mapping engine seam: what the session and layer configurator need
//! from a map widget, plus the terminal implementation.

pub mod heat;
mod terminal;

pub use terminal::{RenderedMap, TerminalMap};

use crate::layers::base::StyleLayer;
use crate::layers::OverlayLayer;
use crate::scale::Rgb;

/// Initial camera
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// `[lon, lat]`
    pub center: [f64; 2],
    pub zoom: f64,
    pub bearing: f64,
    pub pitch: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapStyle {
    Dark,
}

impl MapStyle {
    pub fn url(self) -> &'static str {
        match self {
            MapStyle::Dark => "mapbox://styles/mapbox/dark-v10",
        }
    }

    pub fn background(self) -> Rgb {
        match self {
            MapStyle::Dark => Rgb::new(52, 51, 50),
        }
    }
}

/// Character-cell size of the area the map is mounted into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Container {
    pub width: u16,
    pub height: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapOptions {
    pub container: Container,
    pub style: MapStyle,
    pub camera: Camera,
    pub antialias: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeolocateOptions {
    pub enable_high_accuracy: bool,
    pub track_user_location: bool,
    pub show_user_heading: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Zoom and compass
    Navigation,
    Geolocate(GeolocateOptions),
}

/// Either a declarative style layer or a data layer
#[derive(Debug, Clone)]
pub enum Layer {
    Style(StyleLayer),
    Overlay(OverlayLayer),
}

impl Layer {
    pub fn id(&self) -> &str {
        match self {
            Layer::Style(l) => l.id(),
            Layer::Overlay(l) => l.id(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent {
    /// The style finished loading; layers may now be added
    StyleLoaded,
}

/// Object under the pointer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pick {
    pub layer_id: String,
    pub index: usize,
}

/// A map widget as the session drives it
pub trait MapEngine {
    /// Construct the widget with its style and initial camera
    fn create(options: MapOptions) -> Self
    where
        Self: Sized;

    fn add_control(&mut self, control: Control, position: ControlPosition);

    /// Add a layer on top. A layer whose id is already mounted is replaced
    /// in place, never duplicated.
    fn add_layer(&mut self, layer: Layer);

    /// Mounted layer ids, bottom to top
    fn layer_ids(&self) -> Vec<String>;

    fn overlay(&self, id: &str) -> Option<&OverlayLayer>;

    /// Next pending engine event, if any
    fn poll_event(&mut self) -> Option<EngineEvent>;

    /// Top-most pickable object at a map cell
    fn pick(&self, position: (u16, u16)) -> Option<Pick>;

    /// Object to draw highlighted; engines without highlighting ignore it
    fn set_highlight(&mut self, _pick: Option<Pick>) {}

    /// Release everything the widget holds
    fn remove(&mut self);
}

/// Ordered layers with replace-by-id insertion
#[derive(Debug, Clone, Default)]
pub struct LayerStack {
    layers: Vec<Layer>,
}

impl LayerStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert on top, or replace the layer with the same id where it
    /// stands. Returns true on replace.
    pub fn insert(&mut self, layer: Layer) -> bool {
        match self.layers.iter_mut().find(|l| l.id() == layer.id()) {
            Some(existing) => {
                *existing = layer;
                true
            }
            None => {
                self.layers.push(layer);
                false
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id() == id)
    }

    pub fn overlay(&self, id: &str) -> Option<&OverlayLayer> {
        match self.get(id)? {
            Layer::Overlay(o) => Some(o),
            Layer::Style(_) => None,
        }
    }

    pub fn ids(&self) -> Vec<String> {
        self.layers.iter().map(|l| l.id().to_string()).collect()
    }

    /// Bottom to top
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Layer> + '_ {
        self.layers.iter()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn clear(&mut self) {
        self.layers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::base::{building_extrusion, gradient_sky};

    #[test]
    fn test_insert_replaces_in_place() {
        let mut stack = LayerStack::new();
        assert!(!stack.insert(Layer::Style(building_extrusion())));
        assert!(!stack.insert(Layer::Style(gradient_sky())));
        assert!(stack.insert(Layer::Style(building_extrusion())));
        assert_eq!(stack.ids(), vec!["3d-buildings", "sky"]);
        assert_eq!(stack.len(), 2);
        assert!(stack.overlay("sky").is_none());
    }
}
