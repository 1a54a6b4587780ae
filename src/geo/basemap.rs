//! Base map layers loaded from Natural Earth style files.
//!
//! A base data directory holds files named `ne_{scale}_{theme}` as `.shp`
//! (with an optional `.dbf`) or `.geojson`. Missing files leave their layer
//! out; the corresponding draw step then has nothing to draw.

use super::{Ellipsoid, Envelope, GeoFeature, GeoLayer, GeoLayerSet, GeoLayerType};
use crate::config::ResolutionTier;
use crate::error::{MapError, Result};
use geo_types::Coord;
use std::path::{Path, PathBuf};

const BASE_LAYERS: [GeoLayerType; 5] = [
    GeoLayerType::Coastline,
    GeoLayerType::Land,
    GeoLayerType::Countries,
    GeoLayerType::States,
    GeoLayerType::Rivers,
];

/// Natural Earth theme name of a base layer.
fn theme(layer_type: GeoLayerType) -> Option<&'static str> {
    match layer_type {
        GeoLayerType::Coastline => Some("coastline"),
        GeoLayerType::Land => Some("land"),
        GeoLayerType::Countries => Some("admin_0_boundary_lines_land"),
        GeoLayerType::States => Some("admin_1_states_provinces_lines"),
        GeoLayerType::Rivers => Some("rivers_lake_centerlines"),
        GeoLayerType::Overlay => None,
    }
}

/// Locates the file for a layer at a tier, preferring shapefiles.
pub fn locate_layer_file(
    dir: &Path,
    layer_type: GeoLayerType,
    tier: ResolutionTier,
) -> Option<PathBuf> {
    let stem = format!("ne_{}_{}", tier.natural_earth_scale(), theme(layer_type)?);
    ["shp", "geojson"]
        .iter()
        .map(|ext| dir.join(format!("{}.{}", stem, ext)))
        .find(|path| path.is_file())
}

/// Loads, culls and thresholds every base layer available for the view.
pub fn load_base_layers(
    dir: Option<&Path>,
    tier: ResolutionTier,
    view: &Envelope,
    ellipsoid: Ellipsoid,
    min_area_km2: f64,
) -> Result<GeoLayerSet> {
    let mut layers = GeoLayerSet::new();

    let Some(dir) = dir else {
        log::info!("No base data directory configured; drawing without base layers");
        return Ok(layers);
    };
    if !dir.is_dir() {
        log::warn!("Base data directory {} does not exist", dir.display());
        return Ok(layers);
    }

    for layer_type in BASE_LAYERS {
        let Some(path) = locate_layer_file(dir, layer_type, tier) else {
            log::debug!(
                "No {:?} data at {} scale in {}",
                layer_type,
                tier.natural_earth_scale(),
                dir.display()
            );
            continue;
        };

        let mut layer = load_layer_file(&path, layer_type)?;
        let loaded = layer.features.len();
        cull_to_view(&mut layer, view);
        if layer_type.honours_area_threshold() {
            apply_area_threshold(&mut layer, ellipsoid, min_area_km2);
        }
        log::info!(
            "{:?}: {} of {} features in view from {}",
            layer_type,
            layer.features.len(),
            loaded,
            path.display()
        );
        layers.set_layer(layer);
    }

    Ok(layers)
}

fn load_layer_file(path: &Path, layer_type: GeoLayerType) -> Result<GeoLayer> {
    let mut layer = GeoLayer::new(layer_type);
    let is_geojson = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("geojson"));

    if is_geojson {
        let text = std::fs::read_to_string(path)?;
        layer.load_from_geojson(&text).map_err(|e| match e {
            MapError::FileFormat { reason, .. } => MapError::file_format(path, reason),
            other => other,
        })?;
    } else {
        layer.load_from_shapefile_path(path, None)?;
    }
    Ok(layer)
}

/// Drops features whose bounds do not touch the view.
pub fn cull_to_view(layer: &mut GeoLayer, view: &Envelope) {
    layer
        .features
        .retain(|f| f.bbox().is_some_and(|bbox| view.intersects(&bbox)));
}

fn is_closed(ring: &[Coord<f64>]) -> bool {
    ring.len() >= 4 && ring.first() == ring.last()
}

/// Removes closed rings (islands, lakes) smaller than `min_area_km2`.
///
/// Open lines and points are never removed.
pub fn apply_area_threshold(layer: &mut GeoLayer, ellipsoid: Ellipsoid, min_area_km2: f64) {
    if min_area_km2 <= 0.0 {
        return;
    }
    let large_enough = |ring: &[Coord<f64>]| ellipsoid.ring_area_km2(ring) >= min_area_km2;
    let line_kept = |line: &[Coord<f64>]| !is_closed(line) || large_enough(line);

    layer.features.retain_mut(|feature| match feature {
        GeoFeature::Polygon { exterior, .. } => large_enough(exterior),
        GeoFeature::MultiPolygon { polygons, .. } => {
            polygons.retain(|(exterior, _)| large_enough(exterior));
            !polygons.is_empty()
        }
        GeoFeature::LineString(line) => line_kept(line),
        GeoFeature::MultiLineString(lines) => {
            lines.retain(|line| line_kept(line));
            !lines.is_empty()
        }
        GeoFeature::Point(..) | GeoFeature::MultiPoint(_) => true,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::testdata::polygon_shp;

    fn square(lon: f64, lat: f64, size: f64) -> Vec<(f64, f64)> {
        // Clockwise, closed
        vec![
            (lon, lat),
            (lon, lat + size),
            (lon + size, lat + size),
            (lon + size, lat),
            (lon, lat),
        ]
    }

    fn nyc_view() -> Envelope {
        Envelope::new(-74.3, 40.4, -73.6, 41.0)
    }

    #[test]
    fn test_missing_directory_yields_no_layers() {
        let layers = load_base_layers(
            Some(Path::new("/no/such/base/data")),
            ResolutionTier::High,
            &nyc_view(),
            Ellipsoid::Wgs84,
            0.6,
        )
        .unwrap();
        assert_eq!(layers.iter().count(), 0);
    }

    #[test]
    fn test_land_is_culled_and_thresholded() {
        let dir = tempfile::tempdir().unwrap();
        let shp = polygon_shp(&[
            // Large island in view (~70 km²)
            vec![square(-74.1, 40.6, 0.1)],
            // Tiny island in view (~0.1 km²)
            vec![square(-73.8, 40.8, 0.003)],
            // Out of view
            vec![square(2.0, 48.0, 1.0)],
        ]);
        std::fs::write(dir.path().join("ne_10m_land.shp"), shp).unwrap();

        let layers = load_base_layers(
            Some(dir.path()),
            ResolutionTier::High,
            &nyc_view(),
            Ellipsoid::Wgs84,
            0.6,
        )
        .unwrap();

        let land = layers.get(GeoLayerType::Land).unwrap();
        assert_eq!(land.features.len(), 1);
        assert!(layers.get(GeoLayerType::Coastline).is_none());
    }

    #[test]
    fn test_tier_selects_scale() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("ne_110m_coastline.geojson"),
            r#"{"type":"LineString","coordinates":[[-74.0,40.5],[-73.9,40.6]]}"#,
        )
        .unwrap();

        assert!(locate_layer_file(dir.path(), GeoLayerType::Coastline, ResolutionTier::Low).is_some());
        assert!(locate_layer_file(dir.path(), GeoLayerType::Coastline, ResolutionTier::Full).is_none());
        assert!(locate_layer_file(dir.path(), GeoLayerType::Overlay, ResolutionTier::Low).is_none());

        let layers = load_base_layers(
            Some(dir.path()),
            ResolutionTier::Coarse,
            &nyc_view(),
            Ellipsoid::Wgs84,
            0.6,
        )
        .unwrap();
        assert_eq!(layers.get(GeoLayerType::Coastline).unwrap().features.len(), 1);
    }

    #[test]
    fn test_malformed_base_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("ne_50m_rivers_lake_centerlines.geojson"), "{ nope").unwrap();

        let result = load_base_layers(
            Some(dir.path()),
            ResolutionTier::Intermediate,
            &nyc_view(),
            Ellipsoid::Wgs84,
            0.0,
        );
        assert!(matches!(result, Err(MapError::FileFormat { .. })));
    }

    #[test]
    fn test_threshold_keeps_open_lines() {
        let tiny_loop: Vec<Coord<f64>> = square(-74.0, 40.7, 0.001)
            .into_iter()
            .map(|(x, y)| Coord { x, y })
            .collect();
        let open_line = vec![Coord { x: -74.0, y: 40.7 }, Coord { x: -74.0001, y: 40.7 }];

        let mut layer = GeoLayer::new(GeoLayerType::Coastline);
        layer.features.push(GeoFeature::LineString(tiny_loop));
        layer.features.push(GeoFeature::LineString(open_line));

        apply_area_threshold(&mut layer, Ellipsoid::Wgs84, 0.6);
        assert_eq!(layer.features.len(), 1);
        assert!(matches!(&layer.features[0], GeoFeature::LineString(l) if l.len() == 2));
    }
}
