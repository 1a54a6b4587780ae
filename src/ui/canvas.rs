//! Interactive map window.
//!
//! The scene is built by [`MapRenderer`] and only rebuilt when the canvas
//! size changes; each frame just repaints the cached shapes and labels,
//! clipped to the map rectangle.

use super::colors::chrome;
use crate::error::{MapError, Result};
use crate::geo::{DrawLayer, DrawStep, MapRenderer};
use eframe::egui::{self, Align2, FontId, Rect, Sense, Vec2};

const TITLE_BAND: f32 = 36.0;

/// Full-screen viewer for one rendered map.
pub struct MapViewer {
    renderer: MapRenderer,
    title: String,
    cached: Option<(Rect, Vec<DrawLayer>)>,
}

impl MapViewer {
    pub fn new(renderer: MapRenderer, title: String) -> Self {
        Self {
            renderer,
            title,
            cached: None,
        }
    }

    /// Returns the scene for `canvas`, rebuilding it if the size changed.
    fn scene(&mut self, canvas: Rect) -> &[DrawLayer] {
        let stale = !matches!(&self.cached, Some((rect, _)) if *rect == canvas);
        if stale {
            let layers = self.renderer.build(canvas);
            for layer in &layers {
                log::debug!("{}: {} shapes", layer.step.name(), layer.shapes.len());
            }
            self.cached = Some((canvas, layers));
        }
        self.cached.as_ref().map(|(_, layers)| layers.as_slice()).unwrap_or(&[])
    }
}

impl eframe::App for MapViewer {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let (response, painter) =
                    ui.allocate_painter(ui.available_size(), Sense::hover());
                let rect = response.rect;
                painter.rect_filled(rect, 0.0, chrome::CANVAS);

                let map_area = Rect::from_min_max(rect.min + Vec2::new(0.0, TITLE_BAND), rect.max)
                    .shrink(8.0);
                let map_painter =
                    painter.with_clip_rect(self.renderer.projection(map_area).map_rect());
                for layer in self.scene(map_area) {
                    // The boundary stroke lies just outside the map
                    let target = if layer.step == DrawStep::MapBoundary {
                        &painter
                    } else {
                        &map_painter
                    };
                    target.extend(layer.shapes.iter().cloned());
                    for label in &layer.labels {
                        target.text(
                            label.pos,
                            Align2::LEFT_BOTTOM,
                            &label.text,
                            FontId::proportional(10.0),
                            label.color,
                        );
                    }
                }

                painter.text(
                    rect.center_top() + Vec2::new(0.0, 8.0),
                    Align2::CENTER_TOP,
                    &self.title,
                    FontId::proportional(18.0),
                    chrome::TITLE,
                );

                if let Some(pos) = response.hover_pos() {
                    let projection = self.renderer.projection(map_area);
                    if projection.map_rect().contains(pos) {
                        let coord = projection.screen_to_geo(pos);
                        painter.text(
                            rect.left_bottom() + Vec2::new(8.0, -8.0),
                            Align2::LEFT_BOTTOM,
                            format!("lon {:.5}  lat {:.5}", coord.x, coord.y),
                            FontId::monospace(12.0),
                            chrome::TITLE,
                        );
                    }
                }
            });
    }
}

/// Opens a full-screen window showing the map and blocks until it closes.
pub fn show_map(renderer: MapRenderer, title: &str) -> Result<()> {
    log::info!("Opening map window: {}", title);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(title)
            .with_fullscreen(true),
        ..Default::default()
    };

    let viewer = MapViewer::new(renderer, title.to_string());
    eframe::run_native(
        title,
        native_options,
        Box::new(|_cc| Ok(Box::new(viewer))),
    )
    .map_err(|e| MapError::Display(e.to_string()))
}
