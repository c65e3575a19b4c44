mod records;

pub use records::{
    feature_bbox, feature_polygons, remap_events, EventPoint, PopulationFeature, RawEventRecord,
    CITY_NAME_PROPERTY, TOTAL_POP_PROPERTY,
};

use crate::error::LoadError;
use geojson::{Feature, GeoJson};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The two datasets, always in this order: events, then population
#[derive(Debug, Clone)]
pub struct Datasets {
    pub events: Arc<[EventPoint]>,
    pub population: Arc<[PopulationFeature]>,
}

impl Datasets {
    pub fn new(events: Vec<EventPoint>, population: Vec<PopulationFeature>) -> Self {
        Self {
            events: events.into(),
            population: population.into(),
        }
    }
}

/// Where the two inputs live
#[derive(Debug, Clone)]
pub struct DataPaths {
    pub events: PathBuf,
    pub population: PathBuf,
}

/// Read earthquake records from a CSV whose header row names the columns
pub fn load_events(path: &Path) -> Result<Vec<RawEventRecord>, LoadError> {
    let csv_error = |source| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_path(path)
        .map_err(csv_error)?;

    reader
        .deserialize::<RawEventRecord>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(csv_error)
}

/// Read every feature of a GeoJSON FeatureCollection
pub fn load_features(path: &Path) -> Result<Vec<Feature>, LoadError> {
    let mut bytes = fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let value: serde_json::Value =
        simd_json::serde::from_slice(&mut bytes).map_err(|source| LoadError::Json {
            path: path.to_path_buf(),
            source,
        })?;

    let geojson = GeoJson::from_json_value(value).map_err(|source| LoadError::GeoJson {
        path: path.to_path_buf(),
        source: Box::new(source),
    })?;

    match geojson {
        GeoJson::FeatureCollection(fc) => Ok(fc.features),
        _ => Err(LoadError::NotFeatureCollection {
            path: path.to_path_buf(),
        }),
    }
}

/// Read population tracts, passed through unmodified
pub fn load_population(path: &Path) -> Result<Vec<PopulationFeature>, LoadError> {
    Ok(load_features(path)?
        .into_iter()
        .map(PopulationFeature::new)
        .collect())
}

/// Load both inputs concurrently and remap the events.
/// Either failure fails the whole load.
pub fn load_datasets(paths: &DataPaths) -> Result<Datasets, LoadError> {
    let (events, population) = rayon::join(
        || load_events(&paths.events),
        || load_population(&paths.population),
    );
    let events = remap_events(events?);
    let population = population?;

    tracing::info!(
        events = events.len(),
        tracts = population.len(),
        "datasets loaded"
    );

    Ok(Datasets::new(events, population))
}
