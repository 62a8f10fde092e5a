//! `Mesh` struct and implementations of the `CSG` trait for `Mesh`

use crate::errors::SliceError;
use crate::float_types::{Real, parry3d::bounding_volume::Aabb};
use crate::mesh::{polygon::Polygon, vertex::Vertex};
use crate::traits::CSG;
use nalgebra::{Matrix4, Point3, Vector3, partial_max, partial_min};
use std::{fmt::Debug, sync::OnceLock};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

pub mod plane;
pub mod polygon;
pub mod shapes;
pub mod slice;
pub mod vertex;

/// A boundary representation of a solid as a soup of convex polygons.
///
/// Meshes are treated as immutable values by the slicing pipeline: merging
/// guide geometry or transforming produces a new `Mesh`.
#[derive(Clone, Debug)]
pub struct Mesh<S: Clone + Send + Sync + Debug> {
    /// 3D polygons for volumetric shapes
    pub polygons: Vec<Polygon<S>>,

    /// Lazily calculated AABB that spans `polygons`.
    pub bounding_box: OnceLock<Aabb>,

    /// Metadata
    pub metadata: Option<S>,
}

impl<S: Clone + Send + Sync + Debug> Mesh<S> {
    /// Build a Mesh from an existing polygon list
    pub fn from_polygons(polygons: &[Polygon<S>], metadata: Option<S>) -> Self {
        let mut mesh = Mesh::new();
        mesh.polygons = polygons.to_vec();
        mesh.metadata = metadata;
        mesh
    }

    /// Build a Mesh from a raw triangle buffer, as produced by a mesh file decoder.
    ///
    /// Each triangle gets its geometric face normal (zero for degenerate triangles).
    pub fn from_triangles(triangles: &[[Point3<Real>; 3]], metadata: Option<S>) -> Self {
        let polygons = triangles
            .iter()
            .map(|[a, b, c]| {
                let normal = (b - a)
                    .cross(&(c - a))
                    .try_normalize(Real::EPSILON)
                    .unwrap_or_else(Vector3::zeros);
                Polygon::new(
                    vec![
                        Vertex::new(*a, normal),
                        Vertex::new(*b, normal),
                        Vertex::new(*c, normal),
                    ],
                    metadata.clone(),
                )
            })
            .collect();

        Mesh {
            polygons,
            bounding_box: OnceLock::new(),
            metadata,
        }
    }

    /// Helper to collect all vertices from the mesh.
    #[cfg(not(feature = "parallel"))]
    pub fn vertices(&self) -> Vec<Vertex> {
        self.polygons
            .iter()
            .flat_map(|p| p.vertices.clone())
            .collect()
    }

    /// Parallel helper to collect all vertices from the mesh.
    #[cfg(feature = "parallel")]
    pub fn vertices(&self) -> Vec<Vertex> {
        self.polygons
            .par_iter()
            .flat_map(|p| p.vertices.clone())
            .collect()
    }

    /// Number of triangles this mesh fans into.
    pub fn triangle_count(&self) -> usize {
        self.polygons
            .iter()
            .map(|p| p.vertices.len().saturating_sub(2))
            .sum()
    }

    /// Check that the mesh can be sliced.
    ///
    /// ## Errors
    /// [`SliceError::InvalidMesh`] when the mesh has no polygons, a polygon
    /// has fewer than 3 vertices, a coordinate is NaN or infinite, or the
    /// bounding box has zero extent on every axis.
    pub fn validate(&self) -> Result<(), SliceError> {
        if self.polygons.is_empty() {
            return Err(SliceError::InvalidMesh("mesh has no triangles".into()));
        }

        if let Some(i) = self.polygons.iter().position(|p| p.vertices.len() < 3) {
            return Err(SliceError::InvalidMesh(format!(
                "polygon {i} has fewer than 3 vertices"
            )));
        }

        if let Some(v) = self
            .polygons
            .iter()
            .flat_map(|p| p.vertices.iter())
            .find(|v| !v.is_finite())
        {
            return Err(SliceError::InvalidMesh(format!(
                "vertex ({}, {}, {}) has a non-finite coordinate",
                v.pos.x, v.pos.y, v.pos.z
            )));
        }

        let extents = self.bounding_box().extents();
        if extents.iter().all(|e| *e <= 0.0) {
            return Err(SliceError::InvalidMesh(
                "bounding box has zero extent on all axes".into(),
            ));
        }

        Ok(())
    }
}

impl<S: Clone + Send + Sync + Debug> CSG for Mesh<S> {
    /// Returns a new empty Mesh
    fn new() -> Self {
        Mesh {
            polygons: Vec::new(),
            bounding_box: OnceLock::new(),
            metadata: None,
        }
    }

    /// Return a new Mesh holding the polygons of both meshes.
    ///
    /// Overlapping volumes are kept as-is: both surfaces survive, so a slice
    /// through the overlap shows both outlines.
    fn merge(&self, other: &Mesh<S>) -> Mesh<S> {
        let mut polygons = Vec::with_capacity(self.polygons.len() + other.polygons.len());
        polygons.extend_from_slice(&self.polygons);
        polygons.extend_from_slice(&other.polygons);

        Mesh {
            polygons,
            bounding_box: OnceLock::new(),
            metadata: self.metadata.clone(),
        }
    }

    /// Apply an arbitrary 3D transform (as a 4x4 matrix) to the mesh.
    ///
    /// Normals are carried by the inverse transpose; for a singular matrix
    /// they are left untouched.
    fn transform(&self, mat: &Matrix4<Real>) -> Mesh<S> {
        let mat_inv_transpose = mat.try_inverse().map(|inv| inv.transpose());
        let mut mesh = self.clone();

        for poly in &mut mesh.polygons {
            for vert in &mut poly.vertices {
                let homog_pos = mat * vert.pos.to_homogeneous();
                if let Some(pos) = Point3::from_homogeneous(homog_pos) {
                    vert.pos = pos;
                }

                if let Some(m) = &mat_inv_transpose {
                    let n = m.transform_vector(&vert.normal);
                    vert.normal = n.try_normalize(Real::EPSILON).unwrap_or(n);
                }
            }
        }

        // invalidate the old cached bounding box
        mesh.bounding_box = OnceLock::new();

        mesh
    }

    /// Returns a [`parry3d::bounding_volume::Aabb`] indicating the 3D bounds of all `polygons`.
    fn bounding_box(&self) -> Aabb {
        *self.bounding_box.get_or_init(|| {
            // Track overall min/max in x, y, z among all 3D polygons
            let mut min_x = Real::MAX;
            let mut min_y = Real::MAX;
            let mut min_z = Real::MAX;
            let mut max_x = -Real::MAX;
            let mut max_y = -Real::MAX;
            let mut max_z = -Real::MAX;

            for poly in &self.polygons {
                for v in &poly.vertices {
                    min_x = *partial_min(&min_x, &v.pos.x).unwrap_or(&min_x);
                    min_y = *partial_min(&min_y, &v.pos.y).unwrap_or(&min_y);
                    min_z = *partial_min(&min_z, &v.pos.z).unwrap_or(&min_z);

                    max_x = *partial_max(&max_x, &v.pos.x).unwrap_or(&max_x);
                    max_y = *partial_max(&max_y, &v.pos.y).unwrap_or(&max_y);
                    max_z = *partial_max(&max_z, &v.pos.z).unwrap_or(&max_z);
                }
            }

            // If still uninitialized (e.g., no polygons), return a trivial AABB at origin
            if min_x > max_x {
                return Aabb::new(Point3::origin(), Point3::origin());
            }

            let mins = Point3::new(min_x, min_y, min_z);
            let maxs = Point3::new(max_x, max_y, max_z);
            Aabb::new(mins, maxs)
        })
    }

    /// Invalidates object's cached bounding box.
    fn invalidate_bounding_box(&mut self) {
        self.bounding_box = OnceLock::new();
    }
}
