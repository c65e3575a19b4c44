pub mod geometry;
mod projection;
mod spatial;

pub use projection::{Viewport, DOTS_PER_PIXEL, MAX_ZOOM, MIN_ZOOM, TILE_DOTS};
pub use spatial::FeatureGrid;
