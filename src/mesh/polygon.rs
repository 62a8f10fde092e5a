//! Convex polygons making up a [`Mesh`](crate::mesh::Mesh).

use crate::mesh::vertex::Vertex;

/// A convex, planar polygon with per-polygon metadata.
///
/// Meshes built from STL files or triangle buffers only hold triangles;
/// generated primitives may hold quads, which are fanned when needed.
#[derive(Debug, Clone)]
pub struct Polygon<S: Clone> {
    pub vertices: Vec<Vertex>,
    pub metadata: Option<S>,
}

impl<S: Clone + Send + Sync> Polygon<S> {
    /// Create a polygon from vertices
    pub const fn new(vertices: Vec<Vertex>, metadata: Option<S>) -> Self {
        Polygon { vertices, metadata }
    }

    /// Fan triangulation around the first vertex. Polygons with fewer than
    /// three vertices yield nothing.
    pub fn triangulate(&self) -> Vec<[Vertex; 3]> {
        if self.vertices.len() < 3 {
            return Vec::new();
        }
        let v0 = self.vertices[0];
        self.vertices
            .windows(2)
            .skip(1)
            .map(|pair| [v0, pair[0], pair[1]])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Point3, Vector3};

    fn quad() -> Polygon<()> {
        let pts = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        Polygon::new(
            pts.iter()
                .map(|&[x, y]| Vertex::new(Point3::new(x, y, 0.0), Vector3::z()))
                .collect(),
            None,
        )
    }

    #[test]
    fn quad_fans_into_two_triangles() {
        let tris = quad().triangulate();
        assert_eq!(tris.len(), 2);
        assert_eq!(tris[0][0].pos, Point3::origin());
        assert_eq!(tris[1][2].pos, Point3::new(0.0, 1.0, 0.0));
    }
}
