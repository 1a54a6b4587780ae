//! Geographic data, bounds and map rendering.
//!
//! This module covers everything between a shapefile on disk and the
//! shapes painted on the canvas: feature loading, envelope computation,
//! the projection, base map layers and the ordered draw steps.

mod basemap;
mod bounds;
mod ellipsoid;
mod layer;
mod projection;
mod renderer;

#[cfg(test)]
pub(crate) mod testdata;

pub use bounds::{
    compute_envelope, compute_envelope_with_margin, envelope_from_shapefile, raw_envelope,
    try_compute_envelope, Envelope, DEFAULT_MARGIN_FRACTION,
};
pub use ellipsoid::Ellipsoid;
pub use layer::{GeoFeature, GeoLayer, GeoLayerSet, GeoLayerType};
pub use projection::MapProjection;
pub use renderer::{DrawLayer, DrawStep, MapLabel, MapRenderer, RenderPipeline};
