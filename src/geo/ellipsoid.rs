//! Reference ellipsoids and ellipsoidal measurements.

use crate::config::ResolutionTier;
use crate::error::{MapError, Result};
use geo::{GeodesicArea, LineString, Polygon};
use geo_types::Coord;

/// Geodetic reference model used by the map projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ellipsoid {
    Wgs84,
    Grs80,
    Clarke1866,
    International1924,
    /// The authalic sphere of radius 6370997 m.
    Sphere,
}

impl Ellipsoid {
    /// Parses the PROJ-style name (`WGS84`, `GRS80`, `clrk66`, `intl`, `sphere`).
    pub fn from_name(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "wgs84" => Ok(Ellipsoid::Wgs84),
            "grs80" => Ok(Ellipsoid::Grs80),
            "clrk66" => Ok(Ellipsoid::Clarke1866),
            "intl" => Ok(Ellipsoid::International1924),
            "sphere" => Ok(Ellipsoid::Sphere),
            _ => Err(MapError::UnsupportedProjection(format!(
                "unknown ellipsoid model '{}'",
                name
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Ellipsoid::Wgs84 => "WGS84",
            Ellipsoid::Grs80 => "GRS80",
            Ellipsoid::Clarke1866 => "clrk66",
            Ellipsoid::International1924 => "intl",
            Ellipsoid::Sphere => "sphere",
        }
    }

    /// Semi-major axis in metres.
    pub fn semi_major(&self) -> f64 {
        match self {
            Ellipsoid::Wgs84 | Ellipsoid::Grs80 => 6_378_137.0,
            Ellipsoid::Clarke1866 => 6_378_206.4,
            Ellipsoid::International1924 => 6_378_388.0,
            Ellipsoid::Sphere => 6_370_997.0,
        }
    }

    pub fn flattening(&self) -> f64 {
        match self {
            Ellipsoid::Wgs84 => 1.0 / 298.257_223_563,
            Ellipsoid::Grs80 => 1.0 / 298.257_222_101,
            Ellipsoid::Clarke1866 => 1.0 / 294.978_698_2,
            Ellipsoid::International1924 => 1.0 / 297.0,
            Ellipsoid::Sphere => 0.0,
        }
    }

    /// First eccentricity squared.
    pub fn eccentricity_sq(&self) -> f64 {
        let f = self.flattening();
        f * (2.0 - f)
    }

    /// Radius of curvature in the prime vertical at `lat_deg`.
    pub fn prime_vertical_radius(&self, lat_deg: f64) -> f64 {
        let sin = lat_deg.to_radians().sin();
        self.semi_major() / (1.0 - self.eccentricity_sq() * sin * sin).sqrt()
    }

    /// Radius of curvature in the meridian at `lat_deg`.
    pub fn meridional_radius(&self, lat_deg: f64) -> f64 {
        let e2 = self.eccentricity_sq();
        let sin = lat_deg.to_radians().sin();
        self.semi_major() * (1.0 - e2) / (1.0 - e2 * sin * sin).powf(1.5)
    }

    /// Whether coastlines at `tier` can be drawn against this model.
    ///
    /// High-detail coastline data is digitised on geodetic datums; on the
    /// sphere it is misplaced by more than its own resolution.
    pub fn supports(&self, tier: ResolutionTier) -> bool {
        !matches!(
            (self, tier),
            (Ellipsoid::Sphere, ResolutionTier::High | ResolutionTier::Full)
        )
    }

    /// Area enclosed by a lon/lat ring in square kilometres.
    ///
    /// The ring may be open or closed. The geodesic area on WGS84 is scaled
    /// by the squared ratio of semi-major axes for the other models.
    pub fn ring_area_km2(&self, ring: &[Coord<f64>]) -> f64 {
        if ring.len() < 3 {
            return 0.0;
        }
        let polygon = Polygon::new(LineString::from(ring.to_vec()), vec![]);
        let scale = self.semi_major() / Ellipsoid::Wgs84.semi_major();
        polygon.geodesic_area_unsigned() * scale * scale / 1.0e6
    }
}
