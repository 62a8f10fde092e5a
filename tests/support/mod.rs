//! Test support library
//! Provides various helper functions & utilities for tests.
#![allow(dead_code)]

use image::{Rgb, RgbImage};
use layerstack::{float_types::Real, mesh::Mesh};
use nalgebra::Point3;

/// The 8 corners of the unit cube, indexed by `x | y << 1 | z << 2`.
fn corner(i: usize) -> Point3<Real> {
    Point3::new(
        (i & 1) as Real,
        ((i >> 1) & 1) as Real,
        ((i >> 2) & 1) as Real,
    )
}

/// Outward wound triangles of the unit cube `[0,0,0]`-`[1,1,1]`.
pub fn unit_cube_triangles() -> Vec<[Point3<Real>; 3]> {
    const FACES: [[usize; 3]; 12] = [
        // bottom
        [0, 2, 3],
        [0, 3, 1],
        // top
        [4, 5, 7],
        [4, 7, 6],
        // y = 0
        [0, 1, 5],
        [0, 5, 4],
        // y = 1
        [2, 6, 7],
        [2, 7, 3],
        // x = 0
        [0, 4, 6],
        [0, 6, 2],
        // x = 1
        [1, 3, 7],
        [1, 7, 5],
    ];
    FACES
        .iter()
        .map(|f| [corner(f[0]), corner(f[1]), corner(f[2])])
        .collect()
}

/// Unit cube as a 12 triangle mesh.
pub fn unit_cube() -> Mesh<()> {
    Mesh::from_triangles(&unit_cube_triangles(), None)
}

/// Quick helper to compare floating-point results with an acceptable tolerance.
pub fn approx_eq(a: Real, b: Real, eps: Real) -> bool {
    (a - b).abs() < eps
}

/// Pixel bounds `[x0, y0, x1, y1]` (inclusive) of every pixel not in `ignore`.
pub fn content_bounds(image: &RgbImage, ignore: &[Rgb<u8>]) -> Option<[u32; 4]> {
    image
        .enumerate_pixels()
        .filter(|(_, _, p)| !ignore.contains(p))
        .fold(None, |acc, (x, y, _)| {
            Some(match acc {
                None => [x, y, x, y],
                Some([x0, y0, x1, y1]) => [x0.min(x), y0.min(y), x1.max(x), y1.max(y)],
            })
        })
}

pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
pub const GUIDE_GRAY: Rgb<u8> = Rgb([211, 211, 211]);
