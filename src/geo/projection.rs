//! Map projection and coordinate transformation.
//!
//! Handles converting between geographic coordinates (lon/lat) and
//! screen coordinates for rendering on the canvas.

use super::{Ellipsoid, Envelope};
use crate::config::ResolutionTier;
use crate::error::{MapError, Result};
use eframe::egui::{Pos2, Rect, Vec2};
use geo_types::Coord;

/// Equirectangular projection of an envelope onto a screen rectangle.
///
/// The standard parallel is the centre latitude of the envelope, and the
/// ratio of horizontal to vertical scale follows the ellipsoid's radii of
/// curvature there, so shapes keep their proportions near the centre.
#[derive(Debug, Clone)]
pub struct MapProjection {
    /// Geographic extent being drawn
    pub envelope: Envelope,
    /// Reference model for the scale ratio
    pub ellipsoid: Ellipsoid,
    /// Screen rectangle covered by the envelope
    map_rect: Rect,
    /// Pixels per degree of longitude
    scale_x: f64,
    /// Pixels per degree of latitude
    scale_y: f64,
}

impl MapProjection {
    /// Fits the envelope into `canvas`, centred and aspect-preserving.
    pub fn new(envelope: Envelope, ellipsoid: Ellipsoid, canvas: Rect) -> Self {
        let lat0 = envelope.center().y;
        let metres_per_deg_x = (ellipsoid.prime_vertical_radius(lat0)
            * lat0.to_radians().cos()
            * std::f64::consts::PI
            / 180.0)
            .max(f64::EPSILON);
        let metres_per_deg_y = ellipsoid.meridional_radius(lat0) * std::f64::consts::PI / 180.0;

        let span_x = envelope.width() * metres_per_deg_x;
        let span_y = envelope.height() * metres_per_deg_y;
        let px_per_metre = (canvas.width() as f64 / span_x).min(canvas.height() as f64 / span_y);

        let size = Vec2::new((span_x * px_per_metre) as f32, (span_y * px_per_metre) as f32);
        let map_rect = Rect::from_center_size(canvas.center(), size);

        Self {
            envelope,
            ellipsoid,
            map_rect,
            scale_x: metres_per_deg_x * px_per_metre,
            scale_y: metres_per_deg_y * px_per_metre,
        }
    }

    /// Screen rectangle covered by the map.
    pub fn map_rect(&self) -> Rect {
        self.map_rect
    }

    /// Converts geographic coordinates (lon, lat) to screen position.
    pub fn geo_to_screen(&self, coord: Coord<f64>) -> Pos2 {
        let x = self.map_rect.left() as f64 + (coord.x - self.envelope.min_x) * self.scale_x;
        // Flip Y since screen Y increases downward
        let y = self.map_rect.bottom() as f64 - (coord.y - self.envelope.min_y) * self.scale_y;
        Pos2::new(x as f32, y as f32)
    }

    /// Converts screen position to geographic coordinates (lon, lat).
    pub fn screen_to_geo(&self, pos: Pos2) -> Coord<f64> {
        Coord {
            x: self.envelope.min_x + (pos.x - self.map_rect.left()) as f64 / self.scale_x,
            y: self.envelope.min_y + (self.map_rect.bottom() - pos.y) as f64 / self.scale_y,
        }
    }

    /// Converts a north-south distance in degrees to pixels.
    pub fn degrees_to_pixels(&self, degrees: f64) -> f32 {
        (degrees * self.scale_y) as f32
    }

    /// Checks if a bounding box intersects with the visible bounds.
    pub fn bbox_visible(&self, bbox: &Envelope) -> bool {
        self.envelope.intersects(bbox)
    }
}

/// Rejects envelopes and model combinations the projection cannot draw.
pub fn check_projection(
    envelope: &Envelope,
    ellipsoid: Ellipsoid,
    tier: ResolutionTier,
) -> Result<()> {
    envelope.validate()?;

    if !ellipsoid.supports(tier) {
        return Err(MapError::UnsupportedProjection(format!(
            "resolution tier {:?} is not available on the {} model",
            tier,
            ellipsoid.name()
        )));
    }

    Ok(())
}
