//! Mapping a cross-section into a square pixel canvas.

use crate::float_types::Real;
use crate::section::{Contour, Section};
use geo::{Coord, LineString};

/// Half the usable canvas width: the radius of the circle a cross-section's
/// bounding-box diagonal is scaled to.
#[inline]
pub fn base_radius(canvas_size: u32, margin: u32) -> Real {
    (canvas_size as Real - 2.0 * margin as Real) / 2.0
}

/// Uniform scale + translation from a section's plane frame into canvas units.
///
/// Canvas coordinates have their origin at the bottom-left corner and Y up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasTransform {
    pub center: [Real; 2],
    pub scale: Real,
    pub canvas_size: u32,
}

impl CanvasTransform {
    /// `(p - center) * scale + (C/2, C/2)`
    #[inline]
    pub fn apply(&self, p: [Real; 2]) -> [Real; 2] {
        let half = self.canvas_size as Real / 2.0;
        [
            (p[0] - self.center[0]) * self.scale + half,
            (p[1] - self.center[1]) * self.scale + half,
        ]
    }
}

/// A section moved into canvas coordinates, plus what the rasterizer needs
/// to draw the reference circle.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSection {
    /// Same contours (and indices) as the input, in canvas units
    pub contours: Vec<Contour>,
    pub base_radius: Real,
    pub transform: CanvasTransform,
}

/// Fit `section` into a `canvas_size`² canvas with a `margin` on every side.
///
/// The section is centred on its bounding box and scaled so that half of the
/// bounding-box diagonal equals [`base_radius`]. A section with zero extent
/// (a single point) is kept at unit scale. Every call computes a fresh
/// transform; nothing is carried over between sections.
///
/// Returns `None` for an empty section.
pub fn normalize(section: &Section, canvas_size: u32, margin: u32) -> Option<NormalizedSection> {
    let rect = section.bounding_rect()?;
    let (min, max) = (rect.min(), rect.max());

    let center = [(min.x + max.x) / 2.0, (min.y + max.y) / 2.0];
    let span = (max.x - min.x).hypot(max.y - min.y) / 2.0;
    let base_radius = base_radius(canvas_size, margin);
    let scale = if span > 0.0 { base_radius / span } else { 1.0 };

    let transform = CanvasTransform {
        center,
        scale,
        canvas_size,
    };

    let contours = section
        .contours
        .iter()
        .map(|contour| {
            let coords: Vec<Coord<Real>> = contour
                .points()
                .map(|p| {
                    let [x, y] = transform.apply(p);
                    Coord { x, y }
                })
                .collect();
            Contour::new(contour.index, LineString::new(coords))
        })
        .collect();

    Some(NormalizedSection {
        contours,
        base_radius,
        transform,
    })
}
