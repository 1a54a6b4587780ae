//! Shapefile plotting over a Natural Earth base map.
//!
//! The library computes map extents from shapefile bounding boxes, loads
//! base layers for that extent, builds the ordered draw steps of a map and
//! shows them in a native window. It also dumps dBase attribute tables.

pub mod config;
pub mod dbf;
pub mod error;
pub mod file_ops;
pub mod geo;
pub mod ui;

pub use error::{MapError, Result};
