use geojson::{Feature, PolygonType, Value};
use rayon::prelude::*;
use serde::{Deserialize, Deserializer};

/// Property holding the tract population
pub const TOTAL_POP_PROPERTY: &str = "edited_total_pop_totalPop";
/// Property holding the tract's city name
pub const CITY_NAME_PROPERTY: &str = "edited_total_pop_CITYNAME";

/// One row of the earthquake CSV, keyed by header name.
///
/// Numeric cells are read leniently: an empty or non-numeric cell becomes
/// `NaN` instead of failing the whole load, and a missing column reads as
/// `NaN` (numbers) or an empty string (text).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawEventRecord {
    #[serde(default)]
    pub place: String,
    #[serde(default = "nan", deserialize_with = "lenient_f64")]
    pub mag: f64,
    #[serde(default = "nan", deserialize_with = "lenient_f64")]
    pub longitude: f64,
    #[serde(default = "nan", deserialize_with = "lenient_f64")]
    pub latitude: f64,
    #[serde(rename = "type", default)]
    pub kind: String,
}

fn nan() -> f64 {
    f64::NAN
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw.trim().parse().unwrap_or(f64::NAN))
}

/// An earthquake as the point and heat layers consume it
#[derive(Debug, Clone, PartialEq)]
pub struct EventPoint {
    pub desc: String,
    pub magnitude: f64,
    /// `[longitude, latitude]`
    pub coordinates: [f64; 2],
    pub kind: String,
}

impl EventPoint {
    pub fn lon(&self) -> f64 {
        self.coordinates[0]
    }

    pub fn lat(&self) -> f64 {
        self.coordinates[1]
    }
}

impl From<RawEventRecord> for EventPoint {
    fn from(raw: RawEventRecord) -> Self {
        Self {
            desc: raw.place,
            magnitude: raw.mag,
            coordinates: [raw.longitude, raw.latitude],
            kind: raw.kind,
        }
    }
}

/// Remap every record, one point per record, in input order
pub fn remap_events(records: Vec<RawEventRecord>) -> Vec<EventPoint> {
    records.into_par_iter().map(EventPoint::from).collect()
}

/// A population tract, kept exactly as it appeared in the GeoJSON
#[derive(Debug, Clone, PartialEq)]
pub struct PopulationFeature {
    pub feature: Feature,
}

impl PopulationFeature {
    pub fn new(feature: Feature) -> Self {
        Self { feature }
    }

    /// Total population, `NaN` when the property is missing or not a number
    pub fn total_population(&self) -> f64 {
        self.feature
            .property(TOTAL_POP_PROPERTY)
            .and_then(|v| v.as_f64())
            .unwrap_or(f64::NAN)
    }

    pub fn city_name(&self) -> &str {
        self.feature
            .property(CITY_NAME_PROPERTY)
            .and_then(|v| v.as_str())
            .unwrap_or("")
    }

    /// Polygon parts of the geometry
    pub fn polygons(&self) -> Vec<&PolygonType> {
        feature_polygons(&self.feature)
    }

    /// Lon/lat bounding box of the exterior rings
    pub fn bbox(&self) -> Option<(f64, f64, f64, f64)> {
        feature_bbox(&self.feature)
    }
}

/// Polygon parts of a feature's geometry (rings of `[lon, lat, ..]`
/// positions). Non-polygonal geometries have no parts.
pub fn feature_polygons(feature: &Feature) -> Vec<&PolygonType> {
    let Some(geometry) = feature.geometry.as_ref() else {
        return Vec::new();
    };
    let mut parts = Vec::new();
    collect_polygons(&geometry.value, &mut parts);
    parts
}

/// Lon/lat bounding box of a feature's exterior rings
pub fn feature_bbox(feature: &Feature) -> Option<(f64, f64, f64, f64)> {
    let mut bounds: Option<(f64, f64, f64, f64)> = None;
    for polygon in feature_polygons(feature) {
        let Some(exterior) = polygon.first() else {
            continue;
        };
        for position in exterior.iter().filter(|p| p.len() >= 2) {
            let (lon, lat) = (position[0], position[1]);
            bounds = Some(match bounds {
                Some((min_lon, min_lat, max_lon, max_lat)) => (
                    min_lon.min(lon),
                    min_lat.min(lat),
                    max_lon.max(lon),
                    max_lat.max(lat),
                ),
                None => (lon, lat, lon, lat),
            });
        }
    }
    bounds
}

fn collect_polygons<'a>(value: &'a Value, parts: &mut Vec<&'a PolygonType>) {
    match value {
        Value::Polygon(rings) => parts.push(rings),
        Value::MultiPolygon(polygons) => parts.extend(polygons.iter()),
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                collect_polygons(&g.value, parts);
            }
        }
        _ => {}
    }
}
