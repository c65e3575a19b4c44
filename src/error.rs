use std::path::PathBuf;
use thiserror::Error;

/// Failure while reading one of the two input datasets.
/// Any of these aborts startup; nothing is partially rendered.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse delimited records in {path:?}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to parse JSON in {path:?}")]
    Json {
        path: PathBuf,
        #[source]
        source: simd_json::Error,
    },

    #[error("invalid GeoJSON in {path:?}")]
    GeoJson {
        path: PathBuf,
        #[source]
        source: Box<geojson::Error>,
    },

    #[error("{path:?} is not a GeoJSON FeatureCollection")]
    NotFeatureCollection { path: PathBuf },
}

/// Rejected layer descriptor.
#[derive(Debug, Error, PartialEq)]
pub enum LayerError {
    #[error("layer id must not be empty")]
    EmptyId,

    #[error("layer {id}: opacity {opacity} is outside [0, 1]")]
    InvalidOpacity { id: String, opacity: f64 },

    #[error("layer {id}: radius_min_pixels {min} exceeds radius_max_pixels {max}")]
    InvalidRadiusRange { id: String, min: f64, max: f64 },

    #[error("layer {id}: radius_pixels must be positive, got {radius}")]
    InvalidHeatRadius { id: String, radius: f64 },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("map session has been removed")]
    Removed,
}
