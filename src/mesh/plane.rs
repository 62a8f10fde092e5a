//! Planes used to cut meshes, plus point classification and the 2D frame a
//! plane induces.

use crate::float_types::{Real, tolerance};
use nalgebra::{Point3, Vector3};

// Plane classification constants
pub const COPLANAR: i8 = 0;
pub const FRONT: i8 = 1;
pub const BACK: i8 = 2;
pub const SPANNING: i8 = 3;

/// An oriented plane `n·p = w` with unit normal `n`.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    /// Unit normal vector of the plane
    pub normal: Vector3<Real>,
    /// Distance from origin along normal (plane equation: n·p = w)
    pub w: Real,
}

impl Plane {
    /// Create a new plane from normal vector and distance.
    /// The normal is normalized; `w` is taken as the offset along the unit normal.
    pub fn from_normal(normal: Vector3<Real>, w: Real) -> Self {
        Plane {
            normal: normal.normalize(),
            w,
        }
    }

    /// Create the plane through `origin` with the given normal.
    pub fn from_origin_normal(origin: Point3<Real>, normal: Vector3<Real>) -> Self {
        let normal = normal.normalize();
        Plane {
            w: normal.dot(&origin.coords),
            normal,
        }
    }

    /// Horizontal plane at height `z` facing +Z.
    pub fn horizontal(z: Real) -> Self {
        Plane {
            normal: Vector3::z(),
            w: z,
        }
    }

    /// Signed distance of `point` to the plane (positive on the normal side).
    #[inline]
    pub fn signed_distance(&self, point: &Point3<Real>) -> Real {
        self.normal.dot(&point.coords) - self.w
    }

    /// Classify a point as [`FRONT`], [`BACK`] or [`COPLANAR`] using the crate tolerance.
    pub fn orient_point(&self, point: &Point3<Real>) -> i8 {
        let d = self.signed_distance(point);
        let eps = tolerance();
        if d > eps {
            FRONT
        } else if d < -eps {
            BACK
        } else {
            COPLANAR
        }
    }

    /// Orthonormal basis `{u, v}` spanning the plane, with `u × v = n`.
    ///
    /// `u` is the X axis made orthogonal to the normal (the Y axis when the
    /// normal is close to ±X), so a horizontal plane maps points to plain `(x, y)`.
    pub fn basis(&self) -> (Vector3<Real>, Vector3<Real>) {
        let reference = if self.normal.x.abs() < 0.9 {
            Vector3::x()
        } else {
            Vector3::y()
        };
        let u = (reference - self.normal * self.normal.dot(&reference)).normalize();
        let v = self.normal.cross(&u);
        (u, v)
    }

    /// Project a 3D point into the plane's local 2D frame.
    #[inline]
    pub fn to_2d(&self, point: &Point3<Real>, basis: &(Vector3<Real>, Vector3<Real>)) -> [Real; 2] {
        [point.coords.dot(&basis.0), point.coords.dot(&basis.1)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_points() {
        let plane = Plane::horizontal(1.0);
        assert_eq!(plane.orient_point(&Point3::new(0.0, 0.0, 2.0)), FRONT);
        assert_eq!(plane.orient_point(&Point3::new(5.0, -3.0, 0.0)), BACK);
        assert_eq!(plane.orient_point(&Point3::new(7.0, 7.0, 1.0)), COPLANAR);
        assert_eq!(FRONT | BACK, SPANNING);
    }

    #[test]
    fn horizontal_basis_is_xy() {
        let plane = Plane::from_origin_normal(Point3::new(3.0, 4.0, 0.25), Vector3::z());
        assert_eq!(plane.w, 0.25);
        let basis = plane.basis();
        assert_eq!(basis.0, Vector3::x());
        assert_eq!(basis.1, Vector3::y());
        assert_eq!(plane.to_2d(&Point3::new(1.5, -2.0, 0.25), &basis), [1.5, -2.0]);
    }

    #[test]
    fn basis_is_orthonormal_for_x_normal() {
        let plane = Plane::from_normal(Vector3::new(2.0, 0.0, 0.0), 1.0);
        let (u, v) = plane.basis();
        assert!(u.dot(&plane.normal).abs() < 1e-12);
        assert!(v.dot(&plane.normal).abs() < 1e-12);
        assert!((u.norm() - 1.0).abs() < 1e-12);
        assert!((u.cross(&v) - plane.normal).norm() < 1e-12);
    }
}
