//! Window and color handling for the map viewer.

mod canvas;
pub mod colors;

pub use canvas::{show_map, MapViewer};
