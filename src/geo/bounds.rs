//! Bounding envelope computation over feature streams.
//!
//! The envelope of a file is a fold of each feature's axis-aligned box,
//! followed by a small outward margin so edge features are not clipped when
//! the envelope becomes the visible extent of a map.

use super::layer::{open_shape_reader, shape_bbox};
use crate::error::{MapError, Result};
use geo::{BoundingRect, MultiPoint, Point};
use geo_types::Coord;
use std::io::{Read, Seek};
use std::path::Path;

/// Fraction of the envelope span added on each side (1%).
pub const DEFAULT_MARGIN_FRACTION: f64 = 0.01;

/// Axis-aligned bounds in lon/lat degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Envelope {
    /// Fold identity: every real box widens it.
    pub const EMPTY: Envelope = Envelope {
        min_x: f64::INFINITY,
        min_y: f64::INFINITY,
        max_x: f64::NEG_INFINITY,
        max_y: f64::NEG_INFINITY,
    };

    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// A zero-area box at a single coordinate.
    pub fn point(coord: Coord<f64>) -> Self {
        Self::new(coord.x, coord.y, coord.x, coord.y)
    }

    /// Bounds of a coordinate sequence, `None` when it is empty.
    pub fn of_coords<'a>(coords: impl IntoIterator<Item = &'a Coord<f64>>) -> Option<Self> {
        let points: MultiPoint<f64> = coords.into_iter().map(|c| Point::from(*c)).collect();
        points.bounding_rect().map(Envelope::from)
    }

    /// True while no box has been folded in.
    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    /// Element-wise min/max of two envelopes.
    ///
    /// Partial envelopes of disjoint parts of a stream combine into the
    /// envelope of the whole stream.
    pub fn union(&self, other: &Envelope) -> Envelope {
        Envelope {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    pub fn width(&self) -> f64 {
        (self.max_x - self.min_x).abs()
    }

    pub fn height(&self) -> f64 {
        (self.max_y - self.min_y).abs()
    }

    pub fn center(&self) -> Coord<f64> {
        Coord {
            x: (self.min_x + self.max_x) / 2.0,
            y: (self.min_y + self.max_y) / 2.0,
        }
    }

    /// True if `other` lies entirely within this envelope (edges included).
    pub fn contains(&self, other: &Envelope) -> bool {
        other.min_x >= self.min_x
            && other.max_x <= self.max_x
            && other.min_y >= self.min_y
            && other.max_y <= self.max_y
    }

    /// True if the two envelopes overlap or touch.
    pub fn intersects(&self, other: &Envelope) -> bool {
        !(other.max_x < self.min_x
            || other.min_x > self.max_x
            || other.max_y < self.min_y
            || other.min_y > self.max_y)
    }

    /// Grows the envelope outward by `fraction` of its span on each axis.
    pub fn expanded(&self, fraction: f64) -> Envelope {
        let margin_x = self.width() * fraction;
        let margin_y = self.height() * fraction;
        Envelope {
            min_x: self.min_x - margin_x,
            min_y: self.min_y - margin_y,
            max_x: self.max_x + margin_x,
            max_y: self.max_y + margin_y,
        }
    }

    /// Limits the envelope to longitude ±180° and latitude ±90°.
    pub fn clamped_to_globe(&self) -> Envelope {
        Envelope {
            min_x: self.min_x.clamp(-180.0, 180.0),
            min_y: self.min_y.clamp(-90.0, 90.0),
            max_x: self.max_x.clamp(-180.0, 180.0),
            max_y: self.max_y.clamp(-90.0, 90.0),
        }
    }

    /// Checks the envelope can serve as a drawing extent.
    pub fn validate(&self) -> Result<()> {
        let finite = [self.min_x, self.min_y, self.max_x, self.max_y]
            .iter()
            .all(|v| v.is_finite());
        if finite && self.min_x < self.max_x && self.min_y < self.max_y {
            Ok(())
        } else {
            Err(MapError::InvalidEnvelope {
                min_x: self.min_x,
                min_y: self.min_y,
                max_x: self.max_x,
                max_y: self.max_y,
            })
        }
    }
}

impl From<geo::Rect<f64>> for Envelope {
    fn from(rect: geo::Rect<f64>) -> Self {
        Envelope::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y)
    }
}

impl From<[f64; 4]> for Envelope {
    fn from(corners: [f64; 4]) -> Self {
        Envelope::new(corners[0], corners[1], corners[2], corners[3])
    }
}

/// Folds feature boxes into their raw (unexpanded) envelope.
pub fn raw_envelope<I>(boxes: I) -> Result<Envelope>
where
    I: IntoIterator<Item = Envelope>,
{
    try_raw_envelope(boxes.into_iter().map(Ok))
}

/// Like [`raw_envelope`], but stops at the first read error in the stream.
pub fn try_raw_envelope<I>(boxes: I) -> Result<Envelope>
where
    I: IntoIterator<Item = Result<Envelope>>,
{
    let (count, envelope) = boxes
        .into_iter()
        .try_fold((0usize, Envelope::EMPTY), |(count, acc), item| {
            item.map(|b| (count + 1, acc.union(&b)))
        })?;

    if count == 0 {
        return Err(MapError::EmptyInput);
    }
    Ok(envelope)
}

/// Envelope of the boxes expanded by the default 1% margin.
pub fn compute_envelope<I>(boxes: I) -> Result<Envelope>
where
    I: IntoIterator<Item = Envelope>,
{
    compute_envelope_with_margin(boxes, DEFAULT_MARGIN_FRACTION)
}

pub fn compute_envelope_with_margin<I>(boxes: I, margin_fraction: f64) -> Result<Envelope>
where
    I: IntoIterator<Item = Envelope>,
{
    raw_envelope(boxes).map(|e| e.expanded(margin_fraction))
}

pub fn try_compute_envelope<I>(boxes: I, margin_fraction: f64) -> Result<Envelope>
where
    I: IntoIterator<Item = Result<Envelope>>,
{
    try_raw_envelope(boxes).map(|e| e.expanded(margin_fraction))
}

/// Streams the shapes of a `.shp` file and returns their expanded envelope.
///
/// Each record's stored bounding box is folded in. Null shapes and
/// multipatches do not contribute.
pub fn envelope_from_shapefile(shp_path: &Path, margin_fraction: f64) -> Result<Envelope> {
    let mut reader = open_shape_reader(shp_path)?;
    let envelope = envelope_from_shape_reader(&mut reader, shp_path, margin_fraction)?;
    log::info!(
        "Expanded enveloping bounds of {}: {:?}",
        shp_path.display(),
        envelope
    );
    Ok(envelope)
}

pub(crate) fn envelope_from_shape_reader<T: Read + Seek>(
    reader: &mut shapefile::ShapeReader<T>,
    source: &Path,
    margin_fraction: f64,
) -> Result<Envelope> {
    let boxes = reader.iter_shapes().filter_map(|result| match result {
        Ok(shape) => shape_bbox(&shape).map(Ok),
        Err(e) => Some(Err(MapError::file_format(source, e))),
    });
    try_compute_envelope(boxes, margin_fraction)
}
