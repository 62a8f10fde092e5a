//! 3D primitive shapes for `Mesh`

use crate::errors::SliceError;
use crate::float_types::{Real, TAU, tolerance};
use crate::mesh::{Mesh, polygon::Polygon, vertex::Vertex};
use nalgebra::{Point3, Vector3};
use std::fmt::Debug;

impl<S: Clone + Debug + Send + Sync> Mesh<S> {
    /// Create a right prism (a box) that spans from (0, 0, 0)
    /// to (width, length, height). All dimensions must be >= 0.
    pub fn cuboid(width: Real, length: Real, height: Real, metadata: Option<S>) -> Mesh<S> {
        let p = |x: Real, y: Real, z: Real| Point3::new(x, y, z);
        let (w, l, h) = (width, length, height);

        // (corner positions in CCW order seen from outside, outward normal)
        let faces: [([Point3<Real>; 4], Vector3<Real>); 6] = [
            (
                [p(0.0, 0.0, 0.0), p(0.0, l, 0.0), p(w, l, 0.0), p(w, 0.0, 0.0)],
                -Vector3::z(),
            ),
            ([p(0.0, 0.0, h), p(w, 0.0, h), p(w, l, h), p(0.0, l, h)], Vector3::z()),
            (
                [p(0.0, 0.0, 0.0), p(w, 0.0, 0.0), p(w, 0.0, h), p(0.0, 0.0, h)],
                -Vector3::y(),
            ),
            ([p(0.0, l, 0.0), p(0.0, l, h), p(w, l, h), p(w, l, 0.0)], Vector3::y()),
            (
                [p(0.0, 0.0, 0.0), p(0.0, 0.0, h), p(0.0, l, h), p(0.0, l, 0.0)],
                -Vector3::x(),
            ),
            ([p(w, 0.0, 0.0), p(w, l, 0.0), p(w, l, h), p(w, 0.0, h)], Vector3::x()),
        ];

        let polygons: Vec<Polygon<S>> = faces
            .iter()
            .map(|(corners, normal)| {
                Polygon::new(
                    corners.iter().map(|c| Vertex::new(*c, *normal)).collect(),
                    metadata.clone(),
                )
            })
            .collect();

        Mesh::from_polygons(&polygons, metadata)
    }

    /// Axis-aligned cube spanning (0, 0, 0) to (width, width, width).
    pub fn cube(width: Real, metadata: Option<S>) -> Mesh<S> {
        Self::cuboid(width, width, width, metadata)
    }

    /// A closed frustum whose axis runs from `start` to `end`, with radius
    /// `radius1` at `start` and `radius2` at `end`, tessellated into `segments`
    /// side faces.
    ///
    /// ## Errors
    /// [`SliceError::InvalidGuideGeometry`] when `segments < 3`, a radius is
    /// negative or non-finite, both radii are zero, or `start` and `end` coincide.
    pub fn frustum_ptp(
        start: Point3<Real>,
        end: Point3<Real>,
        radius1: Real,
        radius2: Real,
        segments: usize,
        metadata: Option<S>,
    ) -> Result<Mesh<S>, SliceError> {
        if segments < 3 {
            return Err(SliceError::InvalidGuideGeometry(format!(
                "a frustum needs at least 3 segments, got {segments}"
            )));
        }
        for r in [radius1, radius2] {
            if !r.is_finite() || r < 0.0 {
                return Err(SliceError::InvalidGuideGeometry(format!(
                    "radius {r} is not a finite non-negative number"
                )));
            }
        }
        if radius1 <= tolerance() && radius2 <= tolerance() {
            return Err(SliceError::InvalidGuideGeometry(
                "both frustum radii are zero".into(),
            ));
        }

        let s = end - start;
        let length = s.norm();
        if !length.is_finite() || length <= tolerance() {
            return Err(SliceError::InvalidGuideGeometry(
                "frustum end points coincide".into(),
            ));
        }
        let axis_z = s / length;

        // Orthonormal frame around the axis
        let axis_x = if axis_z.x.abs() < 0.9 {
            Vector3::x()
        } else {
            Vector3::y()
        };
        let axis_x = (axis_x - axis_z * axis_z.dot(&axis_x)).normalize();
        let axis_y = axis_z.cross(&axis_x);

        let ring = |center: Point3<Real>, radius: Real| -> Vec<Point3<Real>> {
            (0..segments)
                .map(|i| {
                    let angle = (i as Real / segments as Real) * TAU;
                    center + (axis_x * angle.cos() + axis_y * angle.sin()) * radius
                })
                .collect()
        };
        let bottom = ring(start, radius1);
        let top = ring(end, radius2);

        let radial = |p: Point3<Real>, c: Point3<Real>| {
            let r = p - c;
            r.try_normalize(Real::EPSILON).unwrap_or(r)
        };

        let mut polygons = Vec::with_capacity(segments * 3);
        for i in 0..segments {
            let j = (i + 1) % segments;

            // Bottom cap (counter-clockwise when viewed from below)
            if radius1 > tolerance() {
                polygons.push(Polygon::new(
                    vec![
                        Vertex::new(start, -axis_z),
                        Vertex::new(bottom[j], -axis_z),
                        Vertex::new(bottom[i], -axis_z),
                    ],
                    metadata.clone(),
                ));
            }

            // Top cap (counter-clockwise when viewed from above)
            if radius2 > tolerance() {
                polygons.push(Polygon::new(
                    vec![
                        Vertex::new(end, axis_z),
                        Vertex::new(top[i], axis_z),
                        Vertex::new(top[j], axis_z),
                    ],
                    metadata.clone(),
                ));
            }

            // Side face; a zero radius end collapses it into a triangle
            let mut side = vec![
                Vertex::new(bottom[i], radial(bottom[i], start)),
                Vertex::new(bottom[j], radial(bottom[j], start)),
            ];
            if radius2 > tolerance() {
                side.push(Vertex::new(top[j], radial(top[j], end)));
                side.push(Vertex::new(top[i], radial(top[i], end)));
            } else {
                side.push(Vertex::new(end, axis_z));
            }
            if radius1 <= tolerance() {
                side.remove(1);
            }
            polygons.push(Polygon::new(side, metadata.clone()));
        }

        Ok(Mesh::from_polygons(&polygons, metadata))
    }

    /// A closed cylinder between two points; see [`Mesh::frustum_ptp`].
    pub fn cylinder_ptp(
        start: Point3<Real>,
        end: Point3<Real>,
        radius: Real,
        segments: usize,
        metadata: Option<S>,
    ) -> Result<Mesh<S>, SliceError> {
        Self::frustum_ptp(start, end, radius, radius, segments, metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::CSG;

    #[test]
    fn cube_bounds() {
        let cube: Mesh<()> = Mesh::cuboid(1.0, 2.0, 3.0, None);
        let bb = cube.bounding_box();
        assert_eq!(bb.mins, Point3::origin());
        assert_eq!(bb.maxs, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(cube.polygons.len(), 6);
    }

    #[test]
    fn cylinder_spans_end_points() {
        let start = Point3::new(2.0, 3.0, -1.0);
        let end = Point3::new(2.0, 3.0, 4.0);
        let cyl: Mesh<()> = Mesh::cylinder_ptp(start, end, 0.5, 12, None).unwrap();
        // 12 bottom triangles, 12 top triangles, 12 side quads
        assert_eq!(cyl.polygons.len(), 36);
        let bb = cyl.bounding_box();
        assert!((bb.mins.z + 1.0).abs() < 1e-12);
        assert!((bb.maxs.z - 4.0).abs() < 1e-12);
        assert!((bb.maxs.x - 2.5).abs() < 1e-12);
        for v in cyl.vertices() {
            let r = ((v.pos.x - 2.0).powi(2) + (v.pos.y - 3.0).powi(2)).sqrt();
            assert!(r < 0.5 + 1e-12);
        }
    }

    #[test]
    fn cone_has_no_top_cap() {
        let cone: Mesh<()> =
            Mesh::frustum_ptp(Point3::origin(), Point3::new(0.0, 0.0, 1.0), 1.0, 0.0, 8, None)
                .unwrap();
        assert_eq!(cone.polygons.len(), 16);
        assert!(cone.polygons.iter().all(|p| p.vertices.len() == 3));
    }

    #[test]
    fn degenerate_cylinders_are_rejected() {
        let a = Point3::origin();
        let b = Point3::new(0.0, 0.0, 1.0);
        for result in [
            Mesh::<()>::cylinder_ptp(a, b, 0.0, 12, None),
            Mesh::<()>::cylinder_ptp(a, b, -1.0, 12, None),
            Mesh::<()>::cylinder_ptp(a, b, Real::NAN, 12, None),
            Mesh::<()>::cylinder_ptp(a, b, 0.1, 2, None),
            Mesh::<()>::cylinder_ptp(a, a, 0.1, 12, None),
        ] {
            assert!(matches!(result, Err(SliceError::InvalidGuideGeometry(_))));
        }
    }
}
