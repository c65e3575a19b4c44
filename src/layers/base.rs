//! Declarative style layers installed once when the style finishes loading:
//! the 3-D building extrusion and the gradient sky.

use crate::scale::Rgb;
use geojson::JsonObject;

pub const BUILDINGS_ID: &str = "3d-buildings";
pub const SKY_ID: &str = "sky";

/// Source and source layer the building extrusion reads from
pub const BUILDINGS_SOURCE: &str = "composite";
pub const BUILDINGS_SOURCE_LAYER: &str = "building";

/// Color with alpha in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub color: Rgb,
    pub alpha: f64,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, alpha: f64) -> Self {
        Self {
            color: Rgb::new(r, g, b),
            alpha,
        }
    }
}

/// Value an interpolate stop can output
pub trait Interpolatable: Copy {
    fn interpolate(self, other: Self, t: f64) -> Self;
}

impl Interpolatable for f64 {
    fn interpolate(self, other: Self, t: f64) -> Self {
        self + (other - self) * t
    }
}

impl Interpolatable for Rgba {
    fn interpolate(self, other: Self, t: f64) -> Self {
        Rgba {
            color: self.color.lerp(other.color, t),
            alpha: self.alpha.interpolate(other.alpha, t),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Curve {
    Linear,
    /// Exponential with the given base; 1.0 behaves as linear
    Exponential(f64),
}

impl Curve {
    /// Fraction of the way from `lower` to `upper` that `input` sits
    fn factor(self, input: f64, lower: f64, upper: f64) -> f64 {
        let diff = upper - lower;
        let progress = input - lower;
        if diff == 0.0 {
            return 0.0;
        }
        match self {
            Curve::Exponential(base) if base != 1.0 => {
                (base.powf(progress) - 1.0) / (base.powf(diff) - 1.0)
            }
            _ => progress / diff,
        }
    }
}

/// A stop output: a literal or a numeric feature property
#[derive(Debug, Clone, PartialEq)]
pub enum StopValue<V> {
    Literal(V),
    Property(&'static str),
}

/// `["interpolate", curve, input, stop, value, ...]`, clamped outside the
/// first and last stop
#[derive(Debug, Clone, PartialEq)]
pub struct Interpolate<V> {
    pub curve: Curve,
    pub stops: Vec<(f64, StopValue<V>)>,
}

impl<V: Interpolatable> Interpolate<V> {
    /// Evaluate at `input`, resolving property stops through `property`.
    /// Returns `None` when a needed property is missing. A NaN input reads
    /// as the first stop.
    pub fn evaluate(&self, input: f64, property: impl Fn(&str) -> Option<V>) -> Option<V> {
        let resolve = |v: &StopValue<V>| match v {
            StopValue::Literal(v) => Some(*v),
            StopValue::Property(name) => property(name),
        };

        let (first, last) = (self.stops.first()?, self.stops.last()?);
        if input.is_nan() || input <= first.0 {
            return resolve(&first.1);
        }
        if input >= last.0 {
            return resolve(&last.1);
        }

        let upper = self.stops.partition_point(|(stop, _)| *stop <= input);
        let (lo_stop, lo_value) = &self.stops[upper - 1];
        let (hi_stop, hi_value) = &self.stops[upper];
        let t = self.curve.factor(input, *lo_stop, *hi_stop);
        Some(resolve(lo_value)?.interpolate(resolve(hi_value)?, t))
    }

    /// Evaluate an expression that has only literal stops
    pub fn evaluate_literal(&self, input: f64) -> Option<V> {
        self.evaluate(input, |_| None)
    }
}

/// `["==", property, value]` over string-valued properties
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EqFilter {
    pub property: &'static str,
    pub value: &'static str,
}

impl EqFilter {
    pub fn matches(&self, properties: Option<&JsonObject>) -> bool {
        let Some(value) = properties.and_then(|p| p.get(self.property)) else {
            return false;
        };
        match value {
            serde_json::Value::String(s) => s == self.value,
            other => other.to_string() == self.value,
        }
    }
}

/// Building footprints extruded by their `height` property
#[derive(Debug, Clone, PartialEq)]
pub struct FillExtrusionLayer {
    pub id: String,
    pub source: String,
    pub source_layer: String,
    pub filter: EqFilter,
    pub min_zoom: f64,
    pub color: Rgb,
    pub height: Interpolate<f64>,
    pub base: Interpolate<f64>,
    pub opacity: f64,
}

impl FillExtrusionLayer {
    pub fn visible_at(&self, zoom: f64) -> bool {
        zoom >= self.min_zoom
    }

    /// Extruded height minus base for one feature at `zoom`
    pub fn extrusion_at(&self, zoom: f64, properties: Option<&JsonObject>) -> f64 {
        let number = |name: &str| properties.and_then(|p| p.get(name)).and_then(|v| v.as_f64());
        let height = self.height.evaluate(zoom, number).unwrap_or(0.0);
        let base = self.base.evaluate(zoom, number).unwrap_or(0.0);
        (height - base).max(0.0)
    }
}

/// Gradient sky drawn above the horizon
#[derive(Debug, Clone, PartialEq)]
pub struct SkyLayer {
    pub id: String,
    pub gradient: Interpolate<Rgba>,
    pub gradient_center: [f64; 2],
    pub gradient_radius: f64,
    pub opacity: Interpolate<f64>,
}

impl SkyLayer {
    /// Radial progress of a view direction: its angular distance from
    /// `gradient_center` (`[azimuth, polar]` in degrees, polar 0 at the
    /// zenith) over `gradient_radius`, clamped to [0, 1]
    pub fn radial_progress(&self, azimuth: f64, polar: f64) -> f64 {
        let [center_azimuth, center_polar] = self.gradient_center.map(f64::to_radians);
        let (azimuth, polar) = (azimuth.to_radians(), polar.to_radians());
        let cos_distance = polar.cos() * center_polar.cos()
            + polar.sin() * center_polar.sin() * (azimuth - center_azimuth).cos();
        let distance = cos_distance.clamp(-1.0, 1.0).acos().to_degrees();
        if !(self.gradient_radius > 0.0) {
            return 1.0;
        }
        (distance / self.gradient_radius).clamp(0.0, 1.0)
    }

    /// Sky color at a radial progress (0 at the gradient center, 1 at its
    /// radius) with the zoom-dependent opacity folded into alpha
    pub fn color_at(&self, radial_progress: f64, zoom: f64) -> Rgba {
        let mut color = self
            .gradient
            .evaluate_literal(radial_progress)
            .unwrap_or(Rgba::new(0, 0, 0, 0.0));
        color.alpha *= self.opacity.evaluate_literal(zoom).unwrap_or(1.0);
        color
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StyleLayer {
    FillExtrusion(FillExtrusionLayer),
    Sky(SkyLayer),
}

impl StyleLayer {
    pub fn id(&self) -> &str {
        match self {
            StyleLayer::FillExtrusion(l) => &l.id,
            StyleLayer::Sky(l) => &l.id,
        }
    }
}

/// The standard 3-D building layer. Height and base ramp from 0 at zoom 10
/// to the feature's own values at zoom 13.05.
pub fn building_extrusion() -> StyleLayer {
    let ramp = |property| Interpolate {
        curve: Curve::Linear,
        stops: vec![
            (10.0, StopValue::Literal(0.0)),
            (13.05, StopValue::Property(property)),
        ],
    };
    StyleLayer::FillExtrusion(FillExtrusionLayer {
        id: BUILDINGS_ID.to_string(),
        source: BUILDINGS_SOURCE.to_string(),
        source_layer: BUILDINGS_SOURCE_LAYER.to_string(),
        filter: EqFilter {
            property: "extrude",
            value: "true",
        },
        min_zoom: 12.0,
        color: Rgb::new(0xaa, 0xaa, 0xaa),
        height: ramp("height"),
        base: ramp("min_height"),
        opacity: 0.3,
    })
}

/// Sky lightest at the center and darker radially outward, fading in with
/// zoom
pub fn gradient_sky() -> StyleLayer {
    StyleLayer::Sky(SkyLayer {
        id: SKY_ID.to_string(),
        gradient: Interpolate {
            curve: Curve::Linear,
            stops: vec![
                (0.8, StopValue::Literal(Rgba::new(135, 206, 235, 1.0))),
                (1.0, StopValue::Literal(Rgba::new(0, 0, 0, 0.1))),
            ],
        },
        gradient_center: [0.0, 0.0],
        gradient_radius: 90.0,
        opacity: Interpolate {
            curve: Curve::Exponential(0.1),
            stops: vec![(5.0, StopValue::Literal(0.0)), (22.0, StopValue::Literal(1.0))],
        },
    })
}
