//! Planar cross-sections: the contours a slicing plane leaves behind.

use crate::float_types::{Real, tolerance};
use geo::{BoundingRect, Coord, LineString, Rect};

/// One connected polyline of a cross-section.
///
/// `index` is the contour's position within its [`Section`] and is the only
/// thing the rasterizer uses to pick a colour.
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    pub index: usize,
    pub line: LineString<Real>,
}

impl Contour {
    pub const fn new(index: usize, line: LineString<Real>) -> Self {
        Contour { index, line }
    }

    /// A closed contour repeats its first point at the end.
    pub fn is_closed(&self) -> bool {
        self.line.0.len() > 2 && self.line.is_closed()
    }

    pub fn len(&self) -> usize {
        self.line.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.line.0.is_empty()
    }

    /// Iterate over the points as `[x, y]`
    pub fn points(&self) -> impl Iterator<Item = [Real; 2]> + '_ {
        self.line.0.iter().map(|c| [c.x, c.y])
    }
}

/// The set of contours in one slicing plane, expressed in the plane's 2D frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Section {
    pub contours: Vec<Contour>,
}

impl Section {
    /// Build a section from raw polylines.
    ///
    /// Polylines with fewer than two distinct points are dropped; the
    /// survivors are numbered in order.
    pub fn from_polylines<I>(polylines: I) -> Self
    where
        I: IntoIterator<Item = Vec<[Real; 2]>>,
    {
        let eps = tolerance();
        let contours = polylines
            .into_iter()
            .filter(|pl| {
                pl.first().is_some_and(|first| {
                    pl.iter()
                        .any(|p| (p[0] - first[0]).abs() > eps || (p[1] - first[1]).abs() > eps)
                })
            })
            .enumerate()
            .map(|(index, pl)| {
                let coords: Vec<Coord<Real>> =
                    pl.into_iter().map(|[x, y]| Coord { x, y }).collect();
                Contour::new(index, LineString::new(coords))
            })
            .collect();

        Section { contours }
    }

    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }

    pub fn len(&self) -> usize {
        self.contours.len()
    }

    /// Total number of points over all contours.
    pub fn point_count(&self) -> usize {
        self.contours.iter().map(Contour::len).sum()
    }

    /// Axis-aligned bounds of the union of all contour points, `None` if empty.
    pub fn bounding_rect(&self) -> Option<Rect<Real>> {
        self.contours
            .iter()
            .filter_map(|c| c.line.bounding_rect())
            .reduce(|a, b| {
                Rect::new(
                    Coord {
                        x: a.min().x.min(b.min().x),
                        y: a.min().y.min(b.min().y),
                    },
                    Coord {
                        x: a.max().x.max(b.max().x),
                        y: a.max().y.max(b.max().y),
                    },
                )
            })
    }
}
