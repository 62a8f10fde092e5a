//! Plane-mesh intersection: cut every triangle with a plane, then chain the
//! resulting segments into contours.

use crate::float_types::Real;
use crate::mesh::{
    Mesh,
    plane::{COPLANAR, FRONT, Plane, SPANNING},
    vertex::Vertex,
};
use crate::section::Section;
use hashbrown::HashMap;
use nalgebra::Point3;
use std::cmp::Ordering;
use std::fmt::Debug;
use tracing::warn;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Exact identity of an intersection point.
///
/// Crossing points are computed from canonically ordered edge end points, so
/// the two triangles sharing an edge produce bit-identical points.
type PointKey = [u64; 3];

fn point_key(p: &Point3<Real>) -> PointKey {
    // `+ 0.0` folds -0.0 into +0.0
    [
        u64::from((p.x + 0.0).to_bits()),
        u64::from((p.y + 0.0).to_bits()),
        u64::from((p.z + 0.0).to_bits()),
    ]
}

fn lexicographic(a: &Point3<Real>, b: &Point3<Real>) -> Ordering {
    a.x.total_cmp(&b.x)
        .then(a.y.total_cmp(&b.y))
        .then(a.z.total_cmp(&b.z))
}

impl<S: Clone + Debug + Send + Sync> Mesh<S> {
    /// **Plane-Mesh Intersection**
    ///
    /// Slice the mesh by a plane, returning the cross-section as contours in
    /// the plane's 2D frame (see [`Plane::basis`]).
    ///
    /// ## **Algorithm**
    /// 1. **Segment extraction**: every (fanned) triangle crossing the plane
    ///    contributes one segment, see [`Mesh::plane_segments`]
    /// 2. **Chaining**: segments sharing end points are linked into polylines,
    ///    open chains first, then closed loops
    /// 3. **Projection**: 3D points are mapped to `(p·u, p·v)`
    ///
    /// A plane that misses the mesh yields an empty [`Section`].
    ///
    /// # Example
    /// ```
    /// use layerstack::mesh::{Mesh, plane::Plane};
    ///
    /// let cube = Mesh::<()>::cube(2.0, None);
    /// let section = cube.slice(&Plane::horizontal(1.0));
    /// assert_eq!(section.len(), 1);
    /// assert!(section.contours[0].is_closed());
    /// ```
    pub fn slice(&self, plane: &Plane) -> Section {
        let segments = self.plane_segments(plane);
        let chains = chain_segments(&segments);
        let chain_count = chains.len();
        let basis = plane.basis();

        let section = Section::from_polylines(
            chains
                .into_iter()
                .map(|chain| chain.iter().map(|p| plane.to_2d(p, &basis)).collect()),
        );

        if section.len() < chain_count {
            warn!(
                dropped = chain_count - section.len(),
                "discarded contours with fewer than two distinct points"
            );
        }
        section
    }

    /// Cross-section by the horizontal plane at height `z`.
    pub fn section_at(&self, z: Real) -> Section {
        self.slice(&Plane::horizontal(z))
    }

    /// Intersection segments of the mesh surface with `plane`, in polygon order.
    ///
    /// Per triangle:
    /// - entirely on one side, or touching at a single vertex: nothing
    /// - lying in the plane: nothing
    /// - one edge in the plane: that edge, only if the third vertex is in FRONT,
    ///   so a closed solid emits its bottom outline but never its top one
    /// - otherwise the two points where the boundary crosses the plane
    #[cfg(not(feature = "parallel"))]
    pub fn plane_segments(&self, plane: &Plane) -> Vec<[Point3<Real>; 2]> {
        self.polygons
            .iter()
            .flat_map(|poly| poly.triangulate())
            .filter_map(|tri| triangle_segment(&tri, plane))
            .collect()
    }

    #[cfg(feature = "parallel")]
    pub fn plane_segments(&self, plane: &Plane) -> Vec<[Point3<Real>; 2]> {
        self.polygons
            .par_iter()
            .flat_map_iter(|poly| poly.triangulate())
            .filter_map(|tri| triangle_segment(&tri, plane))
            .collect()
    }
}

/// Point where the edge `a`-`b` crosses the plane. End points are put in a
/// canonical order first so both triangles sharing the edge agree bit for bit.
fn edge_crossing(a: &Vertex, b: &Vertex, plane: &Plane) -> Point3<Real> {
    let (a, b) = if lexicographic(&a.pos, &b.pos) == Ordering::Greater {
        (b, a)
    } else {
        (a, b)
    };
    let da = plane.signed_distance(&a.pos);
    let db = plane.signed_distance(&b.pos);
    let t = da / (da - db);
    a.interpolate(b, t).pos
}

fn triangle_segment(tri: &[Vertex; 3], plane: &Plane) -> Option<[Point3<Real>; 2]> {
    let types = tri.map(|v| plane.orient_point(&v.pos));
    let on_plane = types.iter().filter(|t| **t == COPLANAR).count();

    match on_plane {
        3 => None,
        2 => {
            let apex = types.iter().position(|t| *t != COPLANAR)?;
            if types[apex] != FRONT {
                return None;
            }
            let a = tri[(apex + 1) % 3].pos;
            let b = tri[(apex + 2) % 3].pos;
            (point_key(&a) != point_key(&b)).then_some([a, b])
        },
        _ => {
            let polygon_type = types.iter().fold(0, |acc, t| acc | t);
            if polygon_type != SPANNING {
                return None;
            }

            let mut points = Vec::with_capacity(2);
            for i in 0..3 {
                let j = (i + 1) % 3;
                if types[i] == COPLANAR {
                    points.push(tri[i].pos);
                } else if (types[i] | types[j]) == SPANNING {
                    points.push(edge_crossing(&tri[i], &tri[j], plane));
                }
            }

            match points.as_slice() {
                [a, b] if point_key(a) != point_key(b) => Some([*a, *b]),
                _ => None,
            }
        },
    }
}

/// Link segments sharing end points into polylines.
///
/// Chains starting at an end point used by a single segment (open contours)
/// are walked first; whatever remains forms closed loops, which end with
/// their first point repeated.
fn chain_segments(segments: &[[Point3<Real>; 2]]) -> Vec<Vec<Point3<Real>>> {
    let mut incident: HashMap<PointKey, Vec<usize>> = HashMap::new();
    for (i, seg) in segments.iter().enumerate() {
        for end in seg {
            incident.entry(point_key(end)).or_default().push(i);
        }
    }

    let mut used = vec![false; segments.len()];
    let mut chains = Vec::new();

    let walk = |start: usize, from_end: usize, used: &mut [bool]| -> Vec<Point3<Real>> {
        used[start] = true;
        let first = segments[start][from_end];
        let mut cur = segments[start][1 - from_end];
        let mut chain = vec![first, cur];
        let start_key = point_key(&first);

        loop {
            let cur_key = point_key(&cur);
            if cur_key == start_key {
                break;
            }
            let Some(next) = incident
                .get(&cur_key)
                .and_then(|segs| segs.iter().copied().find(|s| !used[*s]))
            else {
                break;
            };
            used[next] = true;
            let [a, b] = segments[next];
            cur = if point_key(&a) == cur_key { b } else { a };
            chain.push(cur);
        }

        chain
    };

    for i in 0..segments.len() {
        for end in 0..2 {
            if used[i] {
                break;
            }
            let dangling = incident
                .get(&point_key(&segments[i][end]))
                .is_some_and(|segs| segs.len() == 1);
            if dangling {
                chains.push(walk(i, end, &mut used));
            }
        }
    }

    for i in 0..segments.len() {
        if !used[i] {
            chains.push(walk(i, 0, &mut used));
        }
    }

    chains
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    fn vtx(x: Real, y: Real, z: Real) -> Vertex {
        Vertex::new(Point3::new(x, y, z), Vector3::z())
    }

    #[test]
    fn crossing_triangle_gives_one_segment() {
        let tri = [vtx(0.0, 0.0, 0.0), vtx(2.0, 0.0, 0.0), vtx(0.0, 0.0, 2.0)];
        let [a, b] = triangle_segment(&tri, &Plane::horizontal(1.0)).unwrap();
        let mut xs = [a.x, b.x];
        xs.sort_by(Real::total_cmp);
        assert_eq!(xs, [0.0, 1.0]);
        assert_eq!(a.z, 1.0);
        assert_eq!(b.z, 1.0);
    }

    #[test]
    fn vertex_touch_is_ignored() {
        let tri = [vtx(0.0, 0.0, 1.0), vtx(2.0, 0.0, 2.0), vtx(0.0, 2.0, 2.0)];
        assert!(triangle_segment(&tri, &Plane::horizontal(1.0)).is_none());
    }

    #[test]
    fn edge_on_plane_only_counts_from_above() {
        let above = [vtx(0.0, 0.0, 0.0), vtx(1.0, 0.0, 0.0), vtx(0.0, 0.0, 1.0)];
        let below = [vtx(0.0, 0.0, 0.0), vtx(1.0, 0.0, 0.0), vtx(0.0, 0.0, -1.0)];
        let plane = Plane::horizontal(0.0);
        assert!(triangle_segment(&above, &plane).is_some());
        assert!(triangle_segment(&below, &plane).is_none());
    }

    #[test]
    fn shared_edge_crossings_are_identical() {
        let a = vtx(0.1, 0.3, -0.7);
        let b = vtx(0.9, 0.2, 1.3);
        let plane = Plane::horizontal(0.123);
        assert_eq!(
            point_key(&edge_crossing(&a, &b, &plane)),
            point_key(&edge_crossing(&b, &a, &plane))
        );
    }

    #[test]
    fn chains_open_and_closed() {
        let p = |x: Real, y: Real| Point3::new(x, y, 0.0);
        let segments = vec![
            // closed triangle loop, out of order
            [p(0.0, 0.0), p(1.0, 0.0)],
            [p(0.0, 1.0), p(0.0, 0.0)],
            [p(1.0, 0.0), p(0.0, 1.0)],
            // open two-segment chain, starting in the middle
            [p(6.0, 0.0), p(7.0, 0.0)],
            [p(5.0, 0.0), p(6.0, 0.0)],
        ];
        let chains = chain_segments(&segments);
        assert_eq!(chains.len(), 2);

        let open = &chains[0];
        assert_eq!(open.len(), 3);
        assert_eq!(open.first().unwrap().x, 7.0);
        assert_eq!(open.last().unwrap().x, 5.0);

        let closed = &chains[1];
        assert_eq!(closed.len(), 4);
        assert_eq!(closed.first(), closed.last());
    }
}
