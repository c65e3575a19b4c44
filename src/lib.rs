//! Earthquakes, their heat intensity and a population choropleth over Los
//! Angeles, drawn as a terminal map in Braille Unicode.

pub mod braille;
pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod layers;
pub mod map;
pub mod scale;
pub mod session;
pub mod tooltip;
