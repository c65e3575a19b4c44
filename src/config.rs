use crate::data::DataPaths;
use crate::engine::{Camera, Container, MapOptions, MapStyle};
use anyhow::{ensure, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Settings read from an optional TOML file. Every section and field has a
/// default, so an empty file is a valid config.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub data: DataConfig,
    pub camera: CameraConfig,
    pub map: MapConfig,
    pub geolocate: GeolocateConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DataConfig {
    /// Earthquake records with a header row
    pub events: PathBuf,
    /// Population tracts as a GeoJSON FeatureCollection
    pub population: PathBuf,
    /// Building footprints for the extrusion layer
    pub buildings: Option<PathBuf>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            events: PathBuf::from("data/query.csv"),
            population: PathBuf::from("data/Processed_Geodata_final_2_forViz.geojson"),
            buildings: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// `[lon, lat]`
    pub center: [f64; 2],
    pub zoom: f64,
    pub bearing: f64,
    pub pitch: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            center: [-118.197333, 34.016833],
            zoom: 14.5,
            bearing: 20.0,
            pitch: 60.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct MapConfig {
    pub style: MapStyleName,
    pub antialias: bool,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            style: MapStyleName::DarkV10,
            antialias: true,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum MapStyleName {
    #[serde(rename = "dark-v10")]
    DarkV10,
}

impl From<MapStyleName> for MapStyle {
    fn from(name: MapStyleName) -> Self {
        match name {
            MapStyleName::DarkV10 => MapStyle::Dark,
        }
    }
}

/// A terminal has no location sensor; this stands in for it
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct GeolocateConfig {
    /// `[lon, lat]`
    pub position: Option<[f64; 2]>,
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML configuration in {:?}", path))?;
        config
            .validate()
            .with_context(|| format!("Invalid configuration in {:?}", path))?;
        Ok(config)
    }

    /// TOML accepts `nan` and `inf`; the camera and the stand-in location
    /// must be real numbers
    pub fn validate(&self) -> Result<()> {
        let camera = &self.camera;
        ensure!(
            camera.center.iter().all(|v| v.is_finite()),
            "camera.center must be finite, got {:?}",
            camera.center
        );
        for (name, value) in [("zoom", camera.zoom), ("bearing", camera.bearing), ("pitch", camera.pitch)] {
            ensure!(value.is_finite(), "camera.{name} must be finite, got {value}");
        }
        if let Some(position) = self.geolocate.position {
            ensure!(
                position.iter().all(|v| v.is_finite()),
                "geolocate.position must be finite, got {:?}",
                position
            );
        }
        Ok(())
    }

    /// Load `path` when given, defaults otherwise
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn data_paths(&self) -> DataPaths {
        DataPaths {
            events: self.data.events.clone(),
            population: self.data.population.clone(),
        }
    }

    /// Engine options for a container of `width` x `height` cells
    pub fn map_options(&self, width: u16, height: u16) -> MapOptions {
        MapOptions {
            container: Container { width, height },
            style: self.map.style.into(),
            camera: Camera {
                center: self.camera.center,
                zoom: self.camera.zoom,
                bearing: self.camera.bearing,
                pitch: self.camera.pitch,
            },
            antialias: self.map.antialias,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_all_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.data.events, PathBuf::from("data/query.csv"));
        assert_eq!(config.camera.center, [-118.197333, 34.016833]);
        assert_eq!((config.camera.zoom, config.camera.bearing, config.camera.pitch), (14.5, 20.0, 60.0));
        assert!(config.map.antialias);
        assert!(config.geolocate.position.is_none());
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [data]
            events = "other.csv"

            [camera]
            zoom = 10.0

            [map]
            style = "dark-v10"
            antialias = false

            [geolocate]
            position = [-118.25, 34.05]
            "#,
        )
        .unwrap();
        assert_eq!(config.data.events, PathBuf::from("other.csv"));
        assert_eq!(config.data, DataConfig { events: "other.csv".into(), ..DataConfig::default() });
        assert_eq!(config.camera.zoom, 10.0);
        assert_eq!(config.camera.pitch, 60.0);
        assert!(!config.map.antialias);
        assert_eq!(config.geolocate.position, Some([-118.25, 34.05]));
    }

    #[test]
    fn test_unknown_style_is_rejected() {
        assert!(toml::from_str::<AppConfig>("[map]\nstyle = \"light-v10\"\n").is_err());
    }

    #[test]
    fn test_map_options_use_container_size() {
        let options = AppConfig::default().map_options(100, 30);
        assert_eq!(options.container, Container { width: 100, height: 30 });
        assert_eq!(options.style, MapStyle::Dark);
        assert!(options.antialias);
    }

    #[test]
    fn test_missing_file_has_context() {
        let err = AppConfig::load(Some(Path::new("/nonexistent/quake-map.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_non_finite_camera_is_rejected() {
        let path = std::env::temp_dir().join(format!("quake-map-nan-{}.toml", std::process::id()));
        fs::write(&path, "[camera]\nzoom = nan\n").unwrap();
        let result = AppConfig::load(Some(&path));
        fs::remove_file(&path).ok();

        let err = result.unwrap_err();
        assert!(err.to_string().contains("Invalid configuration"));
        assert!(format!("{err:#}").contains("camera.zoom must be finite"));
    }

    #[test]
    fn test_validate_checks_center_and_position() {
        let mut config = AppConfig::default();
        assert!(config.validate().is_ok());

        config.camera.center = [f64::INFINITY, 34.0];
        assert!(config.validate().is_err());

        config.camera.center = [-118.2, 34.0];
        config.geolocate.position = Some([-118.25, f64::NAN]);
        assert!(config.validate().is_err());
    }
}
