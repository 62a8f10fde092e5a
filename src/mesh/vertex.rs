//! Struct and functions for working with `Vertex`s from which `Polygon`s are composed.

use crate::float_types::Real;
use nalgebra::{Point3, Vector3};

/// A vertex of a polygon, holding position and normal.
#[derive(Debug, Clone, PartialEq, Copy)]
pub struct Vertex {
    pub pos: Point3<Real>,
    pub normal: Vector3<Real>,
}

impl Vertex {
    /// Create a new [`Vertex`].
    ///
    /// * `pos`    – the position in model space
    /// * `normal` – the (not necessarily unit) normal
    ///
    /// Non-finite normal components are replaced by zero. Positions are kept
    /// as given so that [`Mesh::validate`](crate::mesh::Mesh::validate) can
    /// reject them.
    #[inline]
    pub fn new(pos: Point3<Real>, mut normal: Vector3<Real>) -> Self {
        for c in normal.iter_mut() {
            if !c.is_finite() {
                *c = 0.0;
            }
        }

        Vertex { pos, normal }
    }

    /// Linear interpolation between `self` (t = 0) and `other` (t = 1).
    ///
    /// The normal is interpolated the same way and renormalised when possible.
    pub fn interpolate(&self, other: &Vertex, t: Real) -> Vertex {
        let pos = self.pos + (other.pos - self.pos) * t;
        let n = self.normal + (other.normal - self.normal) * t;
        let normal = n.try_normalize(Real::EPSILON).unwrap_or(n);
        Vertex { pos, normal }
    }

    /// `true` when every coordinate of the position is finite.
    pub fn is_finite(&self) -> bool {
        self.pos.coords.iter().all(|c| c.is_finite())
    }
}
