//! Render configuration.
//!
//! Each plotting command starts from a preset, and a JSON file passed with
//! `--config` overrides it key by key. Unknown keys are rejected.

use crate::error::{MapError, Result};
use crate::geo::{DrawStep, Ellipsoid, Envelope, DEFAULT_MARGIN_FRACTION};
use crate::ui::colors::parse_color;
use eframe::egui::Color32;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Corner coordinates of the NYC LION street base map extent.
pub const NYC_LION_CORNERS: [f64; 4] = [-74.260380, 40.485808, -73.699206, 40.917691];

/// Coastline detail level, trading fidelity for draw cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionTier {
    #[serde(alias = "c")]
    Coarse,
    #[serde(alias = "l")]
    Low,
    #[serde(alias = "i")]
    Intermediate,
    #[serde(alias = "h")]
    High,
    #[serde(alias = "f")]
    Full,
}

impl ResolutionTier {
    /// Natural Earth scale of the base data for this tier.
    pub fn natural_earth_scale(&self) -> &'static str {
        match self {
            ResolutionTier::Coarse | ResolutionTier::Low => "110m",
            ResolutionTier::Intermediate => "50m",
            ResolutionTier::High | ResolutionTier::Full => "10m",
        }
    }

    /// Douglas-Peucker tolerance in pixels for projected lines; zero keeps
    /// every vertex.
    pub fn simplify_tolerance_px(&self) -> f32 {
        match self {
            ResolutionTier::Coarse => 2.0,
            ResolutionTier::Low => 1.0,
            ResolutionTier::Intermediate => 0.5,
            ResolutionTier::High => 0.25,
            ResolutionTier::Full => 0.0,
        }
    }
}

/// Flat configuration record for one map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderConfig {
    /// Lower-left lon/lat then upper-right lon/lat. `None` derives the
    /// extent from the plotted file.
    pub projection_corners: Option<[f64; 4]>,
    pub ellipsoid_model: String,
    pub resolution_tier: ResolutionTier,
    /// Closed coastline/land rings smaller than this (km²) are omitted.
    pub min_feature_area: f64,
    /// Fraction of the data span added around computed bounds.
    pub margin_fraction: f64,
    pub overlay_color: String,
    pub overlay_line_width: f32,
    pub continent_color: String,
    pub water_color: String,
    pub coastline_line_width: f32,
    pub country_line_width: f32,
    pub state_line_width: f32,
    pub river_color: String,
    pub disabled_layers: Vec<DrawStep>,
    /// Lon/lat of an optional alignment marker.
    pub sample_marker: Option<[f64; 2]>,
    /// Marker radius in degrees.
    pub marker_radius: f64,
    pub marker_color: String,
    /// Directory holding Natural Earth base-layer files.
    pub base_data_dir: Option<PathBuf>,
    pub title: Option<String>,
    /// Draw overlay labels from the attribute table next to the shapefile.
    pub show_labels: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::shapefile_plot()
    }
}

impl RenderConfig {
    /// Preset for any shapefile: bounds come from the file itself.
    pub fn shapefile_plot() -> Self {
        Self {
            projection_corners: None,
            ellipsoid_model: "WGS84".to_string(),
            resolution_tier: ResolutionTier::Full,
            min_feature_area: 0.0006,
            margin_fraction: DEFAULT_MARGIN_FRACTION,
            overlay_color: "blue".to_string(),
            overlay_line_width: 0.4,
            continent_color: "green".to_string(),
            water_color: "blue".to_string(),
            coastline_line_width: 1.0,
            country_line_width: 3.0,
            state_line_width: 1.0,
            river_color: "black".to_string(),
            disabled_layers: Vec::new(),
            sample_marker: None,
            marker_radius: 0.005,
            marker_color: "yellow".to_string(),
            base_data_dir: None,
            title: None,
            show_labels: false,
        }
    }

    /// Preset for the NYC LION street network over its published extent.
    ///
    /// A 0.6 km² threshold keeps Hart Island; 0.9 would keep only islands
    /// the size of Governors Island and up.
    pub fn nyc_lion() -> Self {
        let [ll_lon, ll_lat, ur_lon, ur_lat] = NYC_LION_CORNERS;
        Self {
            projection_corners: Some(NYC_LION_CORNERS),
            resolution_tier: ResolutionTier::High,
            min_feature_area: 0.6,
            overlay_color: "gray".to_string(),
            sample_marker: Some([(ll_lon + ur_lon) / 2.0, (ll_lat + ur_lat) / 2.0]),
            title: Some("Plotting New York City LION GeoDataBase".to_string()),
            ..Self::shapefile_plot()
        }
    }

    /// Applies the keys of a JSON object over this configuration.
    pub fn merged_with(&self, overrides: serde_json::Value) -> Result<Self> {
        let serde_json::Value::Object(overrides) = overrides else {
            return Err(MapError::InvalidConfig(
                "configuration must be a JSON object".to_string(),
            ));
        };

        let mut merged = match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map,
            Ok(other) => {
                return Err(MapError::InvalidConfig(format!(
                    "preset serialized to {}",
                    other
                )))
            }
            Err(e) => return Err(MapError::InvalidConfig(e.to_string())),
        };
        merged.extend(overrides);

        serde_json::from_value(serde_json::Value::Object(merged))
            .map_err(|e| MapError::InvalidConfig(e.to_string()))
    }

    /// Reads a JSON override file and applies it.
    pub fn with_overrides_from(&self, path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(MapError::FileNotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)?;
        let overrides: serde_json::Value = serde_json::from_str(&text)
            .map_err(|e| MapError::InvalidConfig(format!("{}: {}", path.display(), e)))?;
        let config = self.merged_with(overrides)?;
        log::info!("Loaded render configuration from {}", path.display());
        Ok(config)
    }

    pub fn corners(&self) -> Option<Envelope> {
        self.projection_corners.map(Envelope::from)
    }

    pub fn ellipsoid(&self) -> Result<Ellipsoid> {
        Ellipsoid::from_name(&self.ellipsoid_model)
    }

    pub fn marker(&self) -> Option<geo_types::Coord<f64>> {
        self.sample_marker.map(|[x, y]| geo_types::Coord { x, y })
    }

    /// Resolves color names and checks numeric ranges.
    pub fn style(&self) -> Result<MapStyle> {
        let widths = [
            ("overlay_line_width", self.overlay_line_width),
            ("coastline_line_width", self.coastline_line_width),
            ("country_line_width", self.country_line_width),
            ("state_line_width", self.state_line_width),
        ];
        if let Some((key, _)) = widths.iter().find(|(_, w)| !(w.is_finite() && *w >= 0.0)) {
            return Err(MapError::InvalidConfig(format!(
                "{} must be a non-negative number",
                key
            )));
        }
        if !(self.marker_radius.is_finite() && self.marker_radius > 0.0) {
            return Err(MapError::InvalidConfig(
                "marker_radius must be positive".to_string(),
            ));
        }
        if !(self.min_feature_area.is_finite() && self.min_feature_area >= 0.0) {
            return Err(MapError::InvalidConfig(
                "min_feature_area must be a non-negative number".to_string(),
            ));
        }

        Ok(MapStyle {
            continent_color: parse_color(&self.continent_color)?,
            water_color: parse_color(&self.water_color)?,
            overlay_color: parse_color(&self.overlay_color)?,
            overlay_line_width: self.overlay_line_width,
            coastline_line_width: self.coastline_line_width,
            country_line_width: self.country_line_width,
            state_line_width: self.state_line_width,
            river_color: parse_color(&self.river_color)?,
            marker_color: parse_color(&self.marker_color)?,
            marker_radius_deg: self.marker_radius,
        })
    }
}

/// Cosmetic parameters with colors resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct MapStyle {
    pub continent_color: Color32,
    pub water_color: Color32,
    pub overlay_color: Color32,
    pub overlay_line_width: f32,
    pub coastline_line_width: f32,
    pub country_line_width: f32,
    pub state_line_width: f32,
    pub river_color: Color32,
    pub marker_color: Color32,
    pub marker_radius_deg: f64,
}
