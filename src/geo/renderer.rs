//! Map scene construction.
//!
//! A map is drawn as an ordered list of named draw steps. Each step turns
//! one layer of data into egui shapes for a given canvas, independently of
//! any window, so the scene can be inspected before it is painted.

use super::basemap::load_base_layers;
use super::projection::check_projection;
use super::{Ellipsoid, Envelope, GeoFeature, GeoLayer, GeoLayerSet, GeoLayerType, MapProjection};
use crate::config::{MapStyle, RenderConfig, ResolutionTier};
use crate::error::Result;
use crate::ui::colors::chrome;
use eframe::egui::epaint::{Mesh, StrokeKind};
use eframe::egui::{Color32, Pos2, Rect, Shape, Stroke};
use geo::{LineString, Polygon, Simplify, TriangulateEarcut};
use geo_types::Coord;
use serde::{Deserialize, Serialize};

/// A named stage of map drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawStep {
    Coastlines,
    FillContinents,
    Countries,
    States,
    Rivers,
    MapBoundary,
    Overlay,
    Marker,
}

impl DrawStep {
    /// All steps in declared layering order.
    pub const ALL: [DrawStep; 8] = [
        DrawStep::Coastlines,
        DrawStep::FillContinents,
        DrawStep::Countries,
        DrawStep::States,
        DrawStep::Rivers,
        DrawStep::MapBoundary,
        DrawStep::Overlay,
        DrawStep::Marker,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DrawStep::Coastlines => "coastlines",
            DrawStep::FillContinents => "fill_continents",
            DrawStep::Countries => "countries",
            DrawStep::States => "states",
            DrawStep::Rivers => "rivers",
            DrawStep::MapBoundary => "map_boundary",
            DrawStep::Overlay => "overlay",
            DrawStep::Marker => "marker",
        }
    }

    /// Painting depth; lower depths are painted first.
    ///
    /// The map background sits behind the land fill, which sits behind
    /// every line layer.
    pub fn depth(&self) -> u8 {
        match self {
            DrawStep::MapBoundary => 0,
            DrawStep::FillContinents => 1,
            DrawStep::Coastlines | DrawStep::Countries | DrawStep::States | DrawStep::Rivers => 2,
            DrawStep::Overlay => 3,
            DrawStep::Marker => 4,
        }
    }
}

/// Ordered draw steps, each of which can be switched off.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPipeline {
    steps: Vec<(DrawStep, bool)>,
}

impl Default for RenderPipeline {
    fn default() -> Self {
        Self {
            steps: DrawStep::ALL.iter().map(|step| (*step, true)).collect(),
        }
    }
}

impl RenderPipeline {
    pub fn with_disabled(disabled: &[DrawStep]) -> Self {
        let mut pipeline = Self::default();
        for step in disabled {
            pipeline.set_enabled(*step, false);
        }
        pipeline
    }

    pub fn set_enabled(&mut self, step: DrawStep, enabled: bool) {
        if let Some(entry) = self.steps.iter_mut().find(|(s, _)| *s == step) {
            entry.1 = enabled;
        }
    }

    pub fn is_enabled(&self, step: DrawStep) -> bool {
        self.steps.iter().any(|(s, enabled)| *s == step && *enabled)
    }

    /// Enabled steps in declared order.
    pub fn enabled_steps(&self) -> impl Iterator<Item = DrawStep> + '_ {
        self.steps
            .iter()
            .filter(|(_, enabled)| *enabled)
            .map(|(step, _)| *step)
    }

    /// Enabled steps in the order they are painted.
    pub fn paint_order(&self) -> Vec<DrawStep> {
        let mut order: Vec<DrawStep> = self.enabled_steps().collect();
        order.sort_by_key(DrawStep::depth);
        order
    }
}

/// Text placed next to an overlay feature.
#[derive(Debug, Clone, PartialEq)]
pub struct MapLabel {
    pub pos: Pos2,
    pub text: String,
    pub color: Color32,
}

/// Shapes and labels produced by one draw step.
#[derive(Debug, Clone)]
pub struct DrawLayer {
    pub step: DrawStep,
    pub shapes: Vec<Shape>,
    pub labels: Vec<MapLabel>,
}

/// Everything needed to draw one map.
#[derive(Debug, Clone)]
pub struct MapRenderer {
    envelope: Envelope,
    ellipsoid: Ellipsoid,
    tier: ResolutionTier,
    style: MapStyle,
    pipeline: RenderPipeline,
    base: GeoLayerSet,
    overlay: GeoLayer,
    marker: Option<Coord<f64>>,
    show_labels: bool,
}

impl MapRenderer {
    /// Validates the envelope and configuration, then loads the base layers
    /// in view. The envelope is clamped to the globe first.
    pub fn new(envelope: Envelope, overlay: GeoLayer, config: &RenderConfig) -> Result<Self> {
        let envelope = envelope.clamped_to_globe();
        let ellipsoid = config.ellipsoid()?;
        check_projection(&envelope, ellipsoid, config.resolution_tier)?;

        let base = load_base_layers(
            config.base_data_dir.as_deref(),
            config.resolution_tier,
            &envelope,
            ellipsoid,
            config.min_feature_area,
        )?;
        Self::from_parts(envelope, overlay, base, config)
    }

    /// Like [`MapRenderer::new`] with already loaded base layers.
    pub fn from_parts(
        envelope: Envelope,
        mut overlay: GeoLayer,
        mut base: GeoLayerSet,
        config: &RenderConfig,
    ) -> Result<Self> {
        let envelope = envelope.clamped_to_globe();
        let ellipsoid = config.ellipsoid()?;
        check_projection(&envelope, ellipsoid, config.resolution_tier)?;
        let style = config.style()?;

        overlay.color = Some(style.overlay_color);
        overlay.line_width = Some(style.overlay_line_width);
        apply_style(&mut base, &style);

        Ok(Self {
            envelope,
            ellipsoid,
            tier: config.resolution_tier,
            style,
            pipeline: RenderPipeline::with_disabled(&config.disabled_layers),
            base,
            overlay,
            marker: config.marker(),
            show_labels: config.show_labels,
        })
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    pub fn pipeline(&self) -> &RenderPipeline {
        &self.pipeline
    }

    pub fn projection(&self, canvas: Rect) -> MapProjection {
        MapProjection::new(self.envelope, self.ellipsoid, canvas)
    }

    /// Builds the shapes of every enabled step, in paint order.
    pub fn build(&self, canvas: Rect) -> Vec<DrawLayer> {
        let projection = self.projection(canvas);
        self.pipeline
            .paint_order()
            .into_iter()
            .map(|step| DrawLayer {
                step,
                shapes: self.build_step(step, &projection),
                labels: if step == DrawStep::Overlay && self.show_labels {
                    overlay_labels(&self.overlay, &projection)
                } else {
                    Vec::new()
                },
            })
            .collect()
    }

    fn build_step(&self, step: DrawStep, projection: &MapProjection) -> Vec<Shape> {
        let tolerance = self.tier.simplify_tolerance_px();
        let stroked = |layer: &GeoLayer| {
            let stroke = Stroke::new(layer.effective_line_width(), layer.effective_color());
            stroke_layer(layer, projection, stroke, tolerance)
        };
        let base_stroked = |layer_type: GeoLayerType| {
            self.base.get(layer_type).map(|layer| stroked(layer)).unwrap_or_default()
        };

        match step {
            DrawStep::MapBoundary => {
                let rect = projection.map_rect();
                vec![
                    Shape::rect_filled(rect, 0.0, self.style.water_color),
                    Shape::rect_stroke(
                        rect,
                        0.0,
                        Stroke::new(1.0, chrome::BOUNDARY),
                        StrokeKind::Outside,
                    ),
                ]
            }
            DrawStep::FillContinents => self
                .base
                .get(GeoLayerType::Land)
                .and_then(|land| fill_layer(land, projection, land.effective_color()))
                .into_iter()
                .collect(),
            DrawStep::Coastlines => base_stroked(GeoLayerType::Coastline),
            DrawStep::Countries => base_stroked(GeoLayerType::Countries),
            DrawStep::States => base_stroked(GeoLayerType::States),
            DrawStep::Rivers => base_stroked(GeoLayerType::Rivers),
            DrawStep::Overlay => stroked(&self.overlay),
            DrawStep::Marker => self
                .marker
                .map(|coord| {
                    Shape::circle_filled(
                        projection.geo_to_screen(coord),
                        projection.degrees_to_pixels(self.style.marker_radius_deg),
                        self.style.marker_color,
                    )
                })
                .into_iter()
                .collect(),
        }
    }
}

/// Copies configured colors and widths onto the base layers.
fn apply_style(base: &mut GeoLayerSet, style: &MapStyle) {
    if let Some(layer) = base.coastline.as_mut() {
        layer.line_width = Some(style.coastline_line_width);
    }
    if let Some(layer) = base.land.as_mut() {
        layer.color = Some(style.continent_color);
    }
    if let Some(layer) = base.countries.as_mut() {
        layer.line_width = Some(style.country_line_width);
    }
    if let Some(layer) = base.states.as_mut() {
        layer.line_width = Some(style.state_line_width);
    }
    if let Some(layer) = base.rivers.as_mut() {
        layer.color = Some(style.river_color);
    }
}

/// Strokes every line and ring of a layer; points become small dots.
fn stroke_layer(
    layer: &GeoLayer,
    projection: &MapProjection,
    stroke: Stroke,
    tolerance: f32,
) -> Vec<Shape> {
    let mut shapes = Vec::new();
    let mut line = |coords: &[Coord<f64>]| {
        if let Some(shape) = line_shape(coords, projection, stroke, tolerance) {
            shapes.push(shape);
        }
    };

    let mut points: Vec<Coord<f64>> = Vec::new();
    for feature in &layer.features {
        match feature {
            GeoFeature::Point(coord, _) => points.push(*coord),
            GeoFeature::MultiPoint(coords) => points.extend_from_slice(coords),
            GeoFeature::LineString(coords) => line(coords),
            GeoFeature::MultiLineString(lines) => lines.iter().for_each(|l| line(l)),
            GeoFeature::Polygon {
                exterior, holes, ..
            } => {
                line(exterior);
                holes.iter().for_each(|h| line(h));
            }
            GeoFeature::MultiPolygon { polygons, .. } => {
                for (exterior, holes) in polygons {
                    line(exterior);
                    holes.iter().for_each(|h| line(h));
                }
            }
        }
    }

    let radius = (stroke.width * 2.0).max(1.5);
    shapes.extend(
        points
            .into_iter()
            .filter(|c| projection.envelope.intersects(&Envelope::point(*c)))
            .map(|c| Shape::circle_filled(projection.geo_to_screen(c), radius, stroke.color)),
    );
    shapes
}

/// Labels of the overlay features in view, placed up and right of the
/// point, or of the bbox centre for other geometry.
fn overlay_labels(layer: &GeoLayer, projection: &MapProjection) -> Vec<MapLabel> {
    let color = layer.effective_color();
    layer
        .features
        .iter()
        .filter_map(|feature| {
            let text = feature.label()?;
            let anchor = match feature {
                GeoFeature::Point(coord, _) => *coord,
                other => other.bbox()?.center(),
            };
            if !projection.envelope.intersects(&Envelope::point(anchor)) {
                return None;
            }
            let pos = projection.geo_to_screen(anchor);
            Some(MapLabel {
                pos: Pos2::new(pos.x + 5.0, pos.y - 5.0),
                text: text.to_string(),
                color,
            })
        })
        .collect()
}

/// Projects coordinates into a screen-space line string.
fn screen_line(coords: &[Coord<f64>], projection: &MapProjection) -> LineString<f64> {
    coords
        .iter()
        .map(|c| {
            let pos = projection.geo_to_screen(*c);
            Coord {
                x: pos.x as f64,
                y: pos.y as f64,
            }
        })
        .collect()
}

/// Projects a line and simplifies it in screen space with Douglas-Peucker.
/// A zero tolerance keeps every vertex.
fn line_shape(
    coords: &[Coord<f64>],
    projection: &MapProjection,
    stroke: Stroke,
    tolerance: f32,
) -> Option<Shape> {
    if coords.len() < 2 {
        return None;
    }
    let bbox = Envelope::of_coords(coords)?;
    if !projection.bbox_visible(&bbox) {
        return None;
    }

    let mut line = screen_line(coords, projection);
    if tolerance > 0.0 {
        line = line.simplify(&(tolerance as f64));
    }
    let points: Vec<Pos2> = line
        .coords()
        .map(|c| Pos2::new(c.x as f32, c.y as f32))
        .collect();

    (points.len() >= 2).then(|| Shape::line(points, stroke))
}

/// Triangulates every polygon of a layer in view into a single mesh. The
/// mesh is not clipped; the viewer clips it to the map rectangle.
fn fill_layer(layer: &GeoLayer, projection: &MapProjection, color: Color32) -> Option<Shape> {
    let mut mesh = Mesh::default();

    let mut fill = |exterior: &[Coord<f64>], holes: &[Vec<Coord<f64>>]| {
        let visible =
            Envelope::of_coords(exterior).is_some_and(|bbox| projection.bbox_visible(&bbox));
        if exterior.len() < 3 || !visible {
            return;
        }
        let polygon = Polygon::new(
            screen_line(exterior, projection),
            holes.iter().map(|hole| screen_line(hole, projection)).collect(),
        );
        add_polygon(&polygon, color, &mut mesh);
    };

    for feature in &layer.features {
        match feature {
            GeoFeature::Polygon {
                exterior, holes, ..
            } => fill(exterior, holes),
            GeoFeature::MultiPolygon { polygons, .. } => {
                for (exterior, holes) in polygons {
                    fill(exterior, holes);
                }
            }
            // Land data may also come as closed lines
            GeoFeature::LineString(ring) if ring.len() >= 4 && ring.first() == ring.last() => {
                fill(ring, &[])
            }
            _ => {}
        }
    }

    (!mesh.indices.is_empty()).then(|| Shape::mesh(mesh))
}

/// Appends the earcut triangulation of a screen-space polygon to `mesh`.
fn add_polygon(polygon: &Polygon<f64>, color: Color32, mesh: &mut Mesh) {
    let triangulation = polygon.earcut_triangles_raw();
    let base = mesh.vertices.len() as u32;
    for xy in triangulation.vertices.chunks_exact(2) {
        mesh.colored_vertex(Pos2::new(xy[0] as f32, xy[1] as f32), color);
    }
    mesh.indices.extend(
        triangulation
            .triangle_indices
            .iter()
            .map(|&i| base + i as u32),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MapError;
    use eframe::egui::Vec2;

    fn canvas() -> Rect {
        Rect::from_min_size(Pos2::ZERO, Vec2::new(800.0, 600.0))
    }

    fn view() -> Envelope {
        Envelope::new(-74.3, 40.4, -73.6, 41.0)
    }

    fn overlay() -> GeoLayer {
        let mut layer = GeoLayer::new(GeoLayerType::Overlay);
        layer.features.push(GeoFeature::LineString(vec![
            Coord { x: -74.0, y: 40.7 },
            Coord { x: -73.9, y: 40.8 },
        ]));
        layer.features.push(GeoFeature::MultiLineString(vec![
            vec![Coord { x: -74.1, y: 40.6 }, Coord { x: -74.0, y: 40.6 }],
            // Entirely outside the view
            vec![Coord { x: 2.0, y: 48.0 }, Coord { x: 2.1, y: 48.1 }],
        ]));
        layer
    }

    fn land() -> GeoLayerSet {
        let mut land = GeoLayer::new(GeoLayerType::Land);
        land.features.push(GeoFeature::Polygon {
            exterior: vec![
                Coord { x: -74.2, y: 40.5 },
                Coord { x: -74.2, y: 40.9 },
                Coord { x: -73.8, y: 40.9 },
                Coord { x: -73.8, y: 40.5 },
                Coord { x: -74.2, y: 40.5 },
            ],
            holes: vec![],
            label: None,
        });
        let mut set = GeoLayerSet::new();
        set.set_layer(land);
        set
    }

    #[test]
    fn test_inverted_envelope_is_rejected() {
        let inverted = Envelope::new(-73.6, 40.4, -74.3, 41.0);
        let result = MapRenderer::new(inverted, overlay(), &RenderConfig::nyc_lion());
        assert!(matches!(result, Err(MapError::InvalidEnvelope { .. })));
    }

    #[test]
    fn test_unknown_ellipsoid_is_rejected() {
        let mut config = RenderConfig::nyc_lion();
        config.ellipsoid_model = "mars2000".to_string();
        let result = MapRenderer::new(view(), overlay(), &config);
        assert!(matches!(result, Err(MapError::UnsupportedProjection(_))));
    }

    #[test]
    fn test_paint_order_puts_background_first() {
        let renderer = MapRenderer::from_parts(
            view(),
            overlay(),
            GeoLayerSet::new(),
            &RenderConfig::nyc_lion(),
        )
        .unwrap();

        let steps: Vec<DrawStep> = renderer.build(canvas()).iter().map(|l| l.step).collect();
        assert_eq!(
            steps,
            vec![
                DrawStep::MapBoundary,
                DrawStep::FillContinents,
                DrawStep::Coastlines,
                DrawStep::Countries,
                DrawStep::States,
                DrawStep::Rivers,
                DrawStep::Overlay,
                DrawStep::Marker,
            ]
        );
    }

    #[test]
    fn test_disabled_steps_are_absent() {
        let mut config = RenderConfig::nyc_lion();
        config.disabled_layers = vec![DrawStep::Marker, DrawStep::Rivers];
        let renderer =
            MapRenderer::from_parts(view(), overlay(), GeoLayerSet::new(), &config).unwrap();

        assert!(!renderer.pipeline().is_enabled(DrawStep::Marker));
        let layers = renderer.build(canvas());
        assert!(layers.iter().all(|l| l.step != DrawStep::Marker));
        assert!(layers.iter().all(|l| l.step != DrawStep::Rivers));
    }

    #[test]
    fn test_missing_base_data_steps_are_empty() {
        let renderer = MapRenderer::from_parts(
            view(),
            overlay(),
            GeoLayerSet::new(),
            &RenderConfig::nyc_lion(),
        )
        .unwrap();

        for layer in renderer.build(canvas()) {
            match layer.step {
                DrawStep::Coastlines
                | DrawStep::FillContinents
                | DrawStep::Countries
                | DrawStep::States
                | DrawStep::Rivers => assert!(layer.shapes.is_empty(), "{:?}", layer.step),
                DrawStep::MapBoundary => assert_eq!(layer.shapes.len(), 2),
                // The out-of-view part is culled
                DrawStep::Overlay => assert_eq!(layer.shapes.len(), 2),
                DrawStep::Marker => assert_eq!(layer.shapes.len(), 1),
            }
        }
    }

    #[test]
    fn test_land_is_filled_inside_the_map() {
        let renderer =
            MapRenderer::from_parts(view(), overlay(), land(), &RenderConfig::nyc_lion()).unwrap();
        let map_rect = renderer.projection(canvas()).map_rect();

        let layers = renderer.build(canvas());
        let fill = layers
            .iter()
            .find(|l| l.step == DrawStep::FillContinents)
            .unwrap();
        assert_eq!(fill.shapes.len(), 1);

        match &fill.shapes[0] {
            Shape::Mesh(mesh) => {
                assert!(!mesh.vertices.is_empty());
                assert!(mesh
                    .vertices
                    .iter()
                    .all(|v| map_rect.expand(1.0).contains(v.pos)));
            }
            other => panic!("expected a mesh, got {:?}", other),
        }
    }

    fn square(min: f64, max: f64) -> LineString<f64> {
        LineString::from(vec![(min, min), (max, min), (max, max), (min, max), (min, min)])
    }

    fn triangle_areas(mesh: &Mesh) -> Vec<f32> {
        mesh.indices
            .chunks_exact(3)
            .map(|t| {
                let [a, b, c] = [0, 1, 2].map(|k| mesh.vertices[t[k] as usize].pos);
                ((b - a).x * (c - a).y - (b - a).y * (c - a).x).abs() / 2.0
            })
            .collect()
    }

    #[test]
    fn test_earcut_fill_of_a_square() {
        let mut mesh = Mesh::default();
        add_polygon(&Polygon::new(square(10.0, 50.0), vec![]), Color32::RED, &mut mesh);

        assert_eq!(mesh.indices.len(), 6);
        let area: f32 = triangle_areas(&mesh).iter().sum();
        assert!((area - 1600.0).abs() < 1e-3);
        assert!(mesh.vertices.iter().all(|v| v.color == Color32::RED));
    }

    #[test]
    fn test_earcut_fill_leaves_holes_open() {
        let mut mesh = Mesh::default();
        add_polygon(
            &Polygon::new(square(0.0, 30.0), vec![square(10.0, 20.0)]),
            Color32::RED,
            &mut mesh,
        );

        let area: f32 = triangle_areas(&mesh).iter().sum();
        assert!((area - 800.0).abs() < 1e-3);
        // No triangle covers the middle of the hole
        assert!(!mesh.indices.chunks_exact(3).any(|t| {
            let centroid = t
                .iter()
                .map(|&i| mesh.vertices[i as usize].pos.to_vec2())
                .fold(Vec2::ZERO, |acc, v| acc + v)
                / 3.0;
            centroid.x > 10.5 && centroid.x < 19.5 && centroid.y > 10.5 && centroid.y < 19.5
        }));
    }

    #[test]
    fn test_second_polygon_indices_are_offset() {
        let mut mesh = Mesh::default();
        add_polygon(&Polygon::new(square(0.0, 10.0), vec![]), Color32::RED, &mut mesh);
        let first = mesh.vertices.len() as u32;
        add_polygon(&Polygon::new(square(20.0, 30.0), vec![]), Color32::RED, &mut mesh);

        assert_eq!(mesh.indices.len(), 12);
        assert!(mesh.indices[6..].iter().all(|&i| i >= first));
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
    }

    #[test]
    fn test_world_extent_with_margin_renders() {
        let world = crate::geo::compute_envelope(vec![Envelope::new(-180.0, -60.0, 180.0, 80.0)])
            .unwrap();
        let renderer = MapRenderer::from_parts(
            world,
            overlay(),
            GeoLayerSet::new(),
            &RenderConfig::shapefile_plot(),
        )
        .unwrap();

        assert_eq!(renderer.envelope().min_x, -180.0);
        assert_eq!(renderer.envelope().max_x, 180.0);
        assert!(!renderer.build(canvas()).is_empty());
    }

    fn labelled_overlay() -> GeoLayer {
        let mut layer = GeoLayer::new(GeoLayerType::Overlay);
        layer.features.push(GeoFeature::Point(
            Coord { x: -74.0, y: 40.7 },
            Some("City Hall".to_string()),
        ));
        // Outside the view
        layer.features.push(GeoFeature::Point(
            Coord { x: 2.35, y: 48.85 },
            Some("Paris".to_string()),
        ));
        layer.features.push(GeoFeature::Polygon {
            exterior: vec![
                Coord { x: -74.1, y: 40.6 },
                Coord { x: -74.1, y: 40.8 },
                Coord { x: -73.9, y: 40.8 },
                Coord { x: -74.1, y: 40.6 },
            ],
            holes: vec![],
            label: Some("Park".to_string()),
        });
        layer.features.push(GeoFeature::Point(Coord { x: -73.95, y: 40.75 }, None));
        layer
    }

    fn overlay_labels_of(config: &RenderConfig) -> Vec<MapLabel> {
        let renderer =
            MapRenderer::from_parts(view(), labelled_overlay(), GeoLayerSet::new(), config)
                .unwrap();
        renderer
            .build(canvas())
            .into_iter()
            .flat_map(|layer| layer.labels)
            .collect()
    }

    #[test]
    fn test_labels_are_drawn_when_enabled() {
        let mut config = RenderConfig::nyc_lion();
        assert!(overlay_labels_of(&config).is_empty());

        config.show_labels = true;
        let labels = overlay_labels_of(&config);
        let texts: Vec<&str> = labels.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["City Hall", "Park"]);

        let projection = MapProjection::new(view(), Ellipsoid::Wgs84, canvas());
        let anchor = projection.geo_to_screen(Coord { x: -74.0, y: 40.7 });
        assert_eq!(labels[0].pos, Pos2::new(anchor.x + 5.0, anchor.y - 5.0));
        assert_eq!(labels[0].color, config.style().unwrap().overlay_color);
    }

    #[test]
    fn test_full_tier_keeps_every_vertex() {
        let projection = MapProjection::new(view(), Ellipsoid::Wgs84, canvas());
        let coords: Vec<Coord<f64>> = (0..10)
            .map(|i| Coord {
                x: -74.0 + i as f64 * 1e-6,
                y: 40.7,
            })
            .collect();

        let full = line_shape(&coords, &projection, Stroke::new(1.0, Color32::RED), 0.0);
        let coarse = line_shape(&coords, &projection, Stroke::new(1.0, Color32::RED), 2.0);

        match (full, coarse) {
            (Some(Shape::Path(full)), Some(Shape::Path(coarse))) => {
                assert_eq!(full.points.len(), 10);
                assert_eq!(coarse.points.len(), 2);
            }
            other => panic!("expected two paths, got {:?}", other),
        }
    }

    #[test]
    fn test_simplify_keeps_corners() {
        let projection = MapProjection::new(view(), Ellipsoid::Wgs84, canvas());
        let corner = vec![
            Coord { x: -74.2, y: 40.5 },
            Coord { x: -74.0, y: 40.9 },
            Coord { x: -73.8, y: 40.5 },
        ];

        match line_shape(&corner, &projection, Stroke::new(1.0, Color32::RED), 2.0) {
            Some(Shape::Path(path)) => assert_eq!(path.points.len(), 3),
            other => panic!("expected a path, got {:?}", other),
        }
    }
}
