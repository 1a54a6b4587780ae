//! Geographic layer data structures.

use super::bounds::{compute_envelope_with_margin, Envelope};
use crate::error::{MapError, Result};
use eframe::egui::Color32;
use geo_types::Coord;
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, Value};
use shapefile::dbase::FieldValue;
use shapefile::{PolygonRing, Shape};
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

/// Type of geographic layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeoLayerType {
    Coastline,
    Land,
    Countries,
    States,
    Rivers,
    /// The user's own features drawn on top of the base map.
    Overlay,
}

impl GeoLayerType {
    /// Returns the default color for this layer type.
    pub fn default_color(&self) -> Color32 {
        match self {
            GeoLayerType::Coastline => Color32::BLACK,
            GeoLayerType::Land => Color32::from_rgb(0, 128, 0),
            GeoLayerType::Countries => Color32::BLACK,
            GeoLayerType::States => Color32::BLACK,
            GeoLayerType::Rivers => Color32::from_rgb(0, 0, 255),
            GeoLayerType::Overlay => Color32::from_rgb(128, 128, 128),
        }
    }

    /// Returns the default line width for this layer type.
    pub fn default_line_width(&self) -> f32 {
        match self {
            GeoLayerType::Coastline => 1.0,
            GeoLayerType::Land => 0.0, // Filled, not stroked
            GeoLayerType::Countries => 3.0,
            GeoLayerType::States => 1.0,
            GeoLayerType::Rivers => 0.5,
            GeoLayerType::Overlay => 0.4,
        }
    }

    /// Whether small closed rings are dropped by the minimum-area threshold.
    pub fn honours_area_threshold(&self) -> bool {
        matches!(self, GeoLayerType::Coastline | GeoLayerType::Land)
    }
}

/// A geographic feature that can be rendered.
#[derive(Debug, Clone, PartialEq)]
pub enum GeoFeature {
    /// A single point with optional label
    Point(Coord<f64>, Option<String>),
    /// A set of unconnected points
    MultiPoint(Vec<Coord<f64>>),
    /// A series of connected line segments (streets, rivers, boundaries)
    LineString(Vec<Coord<f64>>),
    /// Multiple line strings (for complex boundaries)
    MultiLineString(Vec<Vec<Coord<f64>>>),
    /// A closed polygon with optional label
    Polygon {
        exterior: Vec<Coord<f64>>,
        holes: Vec<Vec<Coord<f64>>>,
        label: Option<String>,
    },
    /// Multiple polygons with optional label
    MultiPolygon {
        polygons: Vec<(Vec<Coord<f64>>, Vec<Vec<Coord<f64>>>)>,
        label: Option<String>,
    },
}

impl GeoFeature {
    /// Axis-aligned bounds of every vertex, `None` for empty geometry.
    pub fn bbox(&self) -> Option<Envelope> {
        match self {
            GeoFeature::Point(coord, _) => Some(Envelope::point(*coord)),
            GeoFeature::MultiPoint(coords) | GeoFeature::LineString(coords) => {
                Envelope::of_coords(coords)
            }
            GeoFeature::MultiLineString(lines) => Envelope::of_coords(lines.iter().flatten()),
            // Holes lie inside the exterior
            GeoFeature::Polygon { exterior, .. } => Envelope::of_coords(exterior),
            GeoFeature::MultiPolygon { polygons, .. } => {
                Envelope::of_coords(polygons.iter().flat_map(|(exterior, _)| exterior))
            }
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            GeoFeature::Point(_, label)
            | GeoFeature::Polygon { label, .. }
            | GeoFeature::MultiPolygon { label, .. } => label.as_deref(),
            _ => None,
        }
    }
}

/// Shapefile points carrying planar coordinates (M and Z are dropped).
trait PlanarPoint {
    fn coord(&self) -> Coord<f64>;
}

impl PlanarPoint for shapefile::Point {
    fn coord(&self) -> Coord<f64> {
        Coord {
            x: self.x,
            y: self.y,
        }
    }
}

impl PlanarPoint for shapefile::PointM {
    fn coord(&self) -> Coord<f64> {
        Coord {
            x: self.x,
            y: self.y,
        }
    }
}

impl PlanarPoint for shapefile::PointZ {
    fn coord(&self) -> Coord<f64> {
        Coord {
            x: self.x,
            y: self.y,
        }
    }
}

fn to_coords<P: PlanarPoint>(points: &[P]) -> Vec<Coord<f64>> {
    points.iter().map(PlanarPoint::coord).collect()
}

fn multipoint_feature<P: PlanarPoint>(points: &[P]) -> Option<GeoFeature> {
    if points.is_empty() {
        return None;
    }
    Some(GeoFeature::MultiPoint(to_coords(points)))
}

fn polyline_feature<P: PlanarPoint>(parts: &[Vec<P>]) -> Option<GeoFeature> {
    match parts {
        [] => None,
        [single] => Some(GeoFeature::LineString(to_coords(single))),
        _ => Some(GeoFeature::MultiLineString(
            parts.iter().map(|part| to_coords(part)).collect(),
        )),
    }
}

fn polygon_feature<P: PlanarPoint>(
    rings: &[PolygonRing<P>],
    label: Option<String>,
) -> Option<GeoFeature> {
    // Shapefile polygons list each outer ring followed by its holes.
    let mut polygons: Vec<(Vec<Coord<f64>>, Vec<Vec<Coord<f64>>>)> = Vec::new();

    for ring in rings {
        let coords = to_coords(ring.points());
        match ring {
            PolygonRing::Outer(_) => polygons.push((coords, Vec::new())),
            PolygonRing::Inner(_) => match polygons.last_mut() {
                Some((_, holes)) => holes.push(coords),
                None => log::debug!("Skipping hole ring with no preceding outer ring"),
            },
        }
    }

    match polygons.len() {
        0 => None,
        1 => {
            let (exterior, holes) = polygons.remove(0);
            Some(GeoFeature::Polygon {
                exterior,
                holes,
                label,
            })
        }
        _ => Some(GeoFeature::MultiPolygon { polygons, label }),
    }
}

/// Converts a shapefile shape into a planar feature.
///
/// Null shapes and multipatches have no planar rendering and yield `None`.
pub fn shape_to_feature(shape: &Shape, label: Option<String>) -> Option<GeoFeature> {
    match shape {
        Shape::Point(p) => Some(GeoFeature::Point(p.coord(), label)),
        Shape::PointM(p) => Some(GeoFeature::Point(p.coord(), label)),
        Shape::PointZ(p) => Some(GeoFeature::Point(p.coord(), label)),
        Shape::Multipoint(mp) => multipoint_feature(mp.points()),
        Shape::MultipointM(mp) => multipoint_feature(mp.points()),
        Shape::MultipointZ(mp) => multipoint_feature(mp.points()),
        Shape::Polyline(pl) => polyline_feature(pl.parts()),
        Shape::PolylineM(pl) => polyline_feature(pl.parts()),
        Shape::PolylineZ(pl) => polyline_feature(pl.parts()),
        Shape::Polygon(poly) => polygon_feature(poly.rings(), label),
        Shape::PolygonM(poly) => polygon_feature(poly.rings(), label),
        Shape::PolygonZ(poly) => polygon_feature(poly.rings(), label),
        _ => None,
    }
}

/// Bounds stored in a shape record, `None` for null shapes, multipatches
/// and records without points.
pub(crate) fn shape_bbox(shape: &Shape) -> Option<Envelope> {
    fn between<P: PlanarPoint>(min: &P, max: &P) -> Envelope {
        let (min, max) = (min.coord(), max.coord());
        Envelope::new(min.x, min.y, max.x, max.y)
    }

    match shape {
        Shape::Point(p) => Some(Envelope::point(p.coord())),
        Shape::PointM(p) => Some(Envelope::point(p.coord())),
        Shape::PointZ(p) => Some(Envelope::point(p.coord())),
        Shape::Multipoint(s) if !s.points().is_empty() => {
            Some(between(&s.bbox().min, &s.bbox().max))
        }
        Shape::MultipointM(s) if !s.points().is_empty() => {
            Some(between(&s.bbox().min, &s.bbox().max))
        }
        Shape::MultipointZ(s) if !s.points().is_empty() => {
            Some(between(&s.bbox().min, &s.bbox().max))
        }
        Shape::Polyline(s) if !s.parts().is_empty() => {
            Some(between(&s.bbox().min, &s.bbox().max))
        }
        Shape::PolylineM(s) if !s.parts().is_empty() => {
            Some(between(&s.bbox().min, &s.bbox().max))
        }
        Shape::PolylineZ(s) if !s.parts().is_empty() => {
            Some(between(&s.bbox().min, &s.bbox().max))
        }
        Shape::Polygon(s) if !s.rings().is_empty() => {
            Some(between(&s.bbox().min, &s.bbox().max))
        }
        Shape::PolygonM(s) if !s.rings().is_empty() => {
            Some(between(&s.bbox().min, &s.bbox().max))
        }
        Shape::PolygonZ(s) if !s.rings().is_empty() => {
            Some(between(&s.bbox().min, &s.bbox().max))
        }
        _ => None,
    }
}

/// Opens a `.shp` file, mapping a missing file and a bad header to their
/// own error kinds.
pub fn open_shape_reader(shp_path: &Path) -> Result<shapefile::ShapeReader<BufReader<File>>> {
    if !shp_path.exists() {
        return Err(MapError::FileNotFound(shp_path.to_path_buf()));
    }
    shapefile::ShapeReader::from_path(shp_path).map_err(|e| MapError::file_format(shp_path, e))
}

/// A geographic layer containing multiple features.
#[derive(Debug, Clone)]
pub struct GeoLayer {
    /// Type of this layer
    pub layer_type: GeoLayerType,
    /// Features in this layer
    pub features: Vec<GeoFeature>,
    /// Override color (None = use default)
    pub color: Option<Color32>,
    /// Override line width (None = use default)
    pub line_width: Option<f32>,
}

impl GeoLayer {
    /// Creates a new empty layer of the specified type.
    pub fn new(layer_type: GeoLayerType) -> Self {
        Self {
            layer_type,
            features: Vec::new(),
            color: None,
            line_width: None,
        }
    }

    /// Returns the effective color for this layer.
    pub fn effective_color(&self) -> Color32 {
        self.color
            .unwrap_or_else(|| self.layer_type.default_color())
    }

    /// Returns the effective line width for this layer.
    pub fn effective_line_width(&self) -> f32 {
        self.line_width
            .unwrap_or_else(|| self.layer_type.default_line_width())
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Bounds of all features, `None` for an empty layer.
    pub fn bbox(&self) -> Option<Envelope> {
        self.features
            .iter()
            .filter_map(GeoFeature::bbox)
            .reduce(|a, b| a.union(&b))
    }

    /// Loads features from a `.shp` file.
    ///
    /// Labels are read from `dbf_path` when one is given; without it the
    /// attribute table is never opened.
    pub fn load_from_shapefile_path(
        &mut self,
        shp_path: &Path,
        dbf_path: Option<&Path>,
    ) -> Result<()> {
        let mut reader = open_shape_reader(shp_path)?;

        let dbf_records = match dbf_path {
            Some(dbf_path) => {
                let mut dbf = shapefile::dbase::Reader::from_path(dbf_path)
                    .map_err(|e| MapError::file_format(dbf_path, e))?;
                match dbf.read() {
                    Ok(records) => Some(records),
                    Err(e) => {
                        log::warn!("Ignoring attributes of {}: {}", dbf_path.display(), e);
                        None
                    }
                }
            }
            None => None,
        };

        self.load_shapes(&mut reader, dbf_records.as_deref(), shp_path)?;
        log::debug!(
            "Loaded {} features from {}",
            self.features.len(),
            shp_path.display()
        );
        Ok(())
    }

    /// Expanded envelope of the loaded features.
    pub fn envelope(&self, margin_fraction: f64) -> Result<Envelope> {
        compute_envelope_with_margin(
            self.features.iter().filter_map(GeoFeature::bbox),
            margin_fraction,
        )
    }

    /// Loads features from a shapefile (.shp and .dbf bytes).
    ///
    /// The shp_bytes should be the contents of the .shp file.
    /// The dbf_bytes should be the contents of the .dbf file (for attribute data like names).
    pub fn load_from_shapefile(
        &mut self,
        shp_bytes: &[u8],
        dbf_bytes: Option<&[u8]>,
    ) -> Result<()> {
        let source = Path::new("<memory>");
        let mut shape_reader = shapefile::ShapeReader::new(Cursor::new(shp_bytes))
            .map_err(|e| MapError::file_format(source, e))?;

        let dbf_records: Option<Vec<shapefile::dbase::Record>> = dbf_bytes.and_then(|bytes| {
            shapefile::dbase::Reader::new(Cursor::new(bytes))
                .ok()
                .and_then(|mut r: shapefile::dbase::Reader<Cursor<&[u8]>>| r.read().ok())
        });

        self.load_shapes(&mut shape_reader, dbf_records.as_deref(), source)
    }

    fn load_shapes<T: Read + Seek>(
        &mut self,
        reader: &mut shapefile::ShapeReader<T>,
        dbf_records: Option<&[shapefile::dbase::Record]>,
        source: &Path,
    ) -> Result<()> {
        for (idx, result) in reader.iter_shapes().enumerate() {
            let shape = result.map_err(|e| MapError::file_format(source, e))?;
            let label = dbf_records
                .and_then(|records| records.get(idx))
                .and_then(record_label);

            if let Some(feature) = shape_to_feature(&shape, label) {
                self.features.push(feature);
            }
        }
        Ok(())
    }

    /// Loads features from GeoJSON data.
    pub fn load_from_geojson(&mut self, geojson_str: &str) -> Result<()> {
        let geojson: GeoJson = geojson_str
            .parse()
            .map_err(|e| MapError::file_format("<geojson>", e))?;

        match geojson {
            GeoJson::FeatureCollection(fc) => {
                self.load_feature_collection(fc);
            }
            GeoJson::Feature(f) => {
                if let Some(feature) = convert_feature(&f) {
                    self.features.push(feature);
                }
            }
            GeoJson::Geometry(g) => {
                if let Some(feature) = convert_geometry(&g, None) {
                    self.features.push(feature);
                }
            }
        }

        Ok(())
    }

    fn load_feature_collection(&mut self, fc: FeatureCollection) {
        self.features
            .extend(fc.features.iter().filter_map(convert_feature));
    }
}

/// Picks a display name from common attribute columns.
fn record_label(record: &shapefile::dbase::Record) -> Option<String> {
    ["NAME", "name", "Name", "STREET", "FULLNAME"]
        .iter()
        .find_map(|field_name| match record.get(*field_name) {
            Some(FieldValue::Character(Some(s))) if !s.trim().is_empty() => {
                Some(s.trim().to_string())
            }
            _ => None,
        })
}

fn convert_feature(feature: &Feature) -> Option<GeoFeature> {
    let label = feature
        .properties
        .as_ref()
        .and_then(|p| p.get("name").or_else(|| p.get("NAME")))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());

    feature
        .geometry
        .as_ref()
        .and_then(|g| convert_geometry(g, label))
}

fn position(c: &[f64]) -> Option<Coord<f64>> {
    match c {
        [x, y, ..] => Some(Coord { x: *x, y: *y }),
        _ => None,
    }
}

fn line(coords: &[Vec<f64>]) -> Vec<Coord<f64>> {
    coords.iter().filter_map(|c| position(c)).collect()
}

fn rings(rings: &[Vec<Vec<f64>>]) -> Option<(Vec<Coord<f64>>, Vec<Vec<Coord<f64>>>)> {
    let (exterior, holes) = rings.split_first()?;
    Some((line(exterior), holes.iter().map(|r| line(r)).collect()))
}

fn convert_geometry(geometry: &Geometry, label: Option<String>) -> Option<GeoFeature> {
    match &geometry.value {
        Value::Point(coords) => position(coords).map(|c| GeoFeature::Point(c, label)),
        Value::MultiPoint(points) => {
            let coords = line(points);
            (!coords.is_empty()).then_some(GeoFeature::MultiPoint(coords))
        }
        Value::LineString(coords) => Some(GeoFeature::LineString(line(coords))),
        Value::MultiLineString(lines) => Some(GeoFeature::MultiLineString(
            lines.iter().map(|l| line(l)).collect(),
        )),
        Value::Polygon(polygon) => {
            let (exterior, holes) = rings(polygon)?;
            Some(GeoFeature::Polygon {
                exterior,
                holes,
                label,
            })
        }
        Value::MultiPolygon(polygons) => {
            let polygons: Vec<_> = polygons.iter().filter_map(|p| rings(p)).collect();
            Some(GeoFeature::MultiPolygon { polygons, label })
        }
        Value::GeometryCollection(geometries) => {
            // For geometry collections, just take the first convertible geometry
            geometries
                .iter()
                .find_map(|g| convert_geometry(g, label.clone()))
        }
    }
}

/// Base map layers in layering order.
#[derive(Debug, Clone, Default)]
pub struct GeoLayerSet {
    pub coastline: Option<GeoLayer>,
    pub land: Option<GeoLayer>,
    pub countries: Option<GeoLayer>,
    pub states: Option<GeoLayer>,
    pub rivers: Option<GeoLayer>,
}

impl GeoLayerSet {
    /// Creates a new empty layer set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns an iterator over all loaded layers.
    pub fn iter(&self) -> impl Iterator<Item = &GeoLayer> {
        [
            self.coastline.as_ref(),
            self.land.as_ref(),
            self.countries.as_ref(),
            self.states.as_ref(),
            self.rivers.as_ref(),
        ]
        .into_iter()
        .flatten()
    }

    pub fn get(&self, layer_type: GeoLayerType) -> Option<&GeoLayer> {
        match layer_type {
            GeoLayerType::Coastline => self.coastline.as_ref(),
            GeoLayerType::Land => self.land.as_ref(),
            GeoLayerType::Countries => self.countries.as_ref(),
            GeoLayerType::States => self.states.as_ref(),
            GeoLayerType::Rivers => self.rivers.as_ref(),
            GeoLayerType::Overlay => None,
        }
    }

    pub fn set_layer(&mut self, layer: GeoLayer) {
        let slot = match layer.layer_type {
            GeoLayerType::Coastline => &mut self.coastline,
            GeoLayerType::Land => &mut self.land,
            GeoLayerType::Countries => &mut self.countries,
            GeoLayerType::States => &mut self.states,
            GeoLayerType::Rivers => &mut self.rivers,
            GeoLayerType::Overlay => {
                log::warn!("Overlay layers are not part of the base map");
                return;
            }
        };
        *slot = Some(layer);
    }
}
