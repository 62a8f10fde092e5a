//! Slice triangle meshes into stacks of **layer preview images**.
//!
//! A mesh is cut by evenly spaced horizontal planes. Each cross-section is
//! centred and scaled into a square canvas, drawn with a dashed reference
//! circle, and written as `layer_XXXX.png`. Four thin guide rods are added at
//! the corners of the mesh's bounding box first, so every layer carries the
//! same registration marks.
//!
//! ```no_run
//! use layerstack::{Mesh, SliceParams, slice_to_layers};
//!
//! let mesh = Mesh::<()>::from_stl_file("part.stl", None)?;
//! let report = slice_to_layers(&mesh, "layers", &SliceParams::default())?;
//! println!("{} layers written", report.written.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Features
//! #### Default
//! - **f64**: use f64 as Real
//! - [**stl-io**](https://en.wikipedia.org/wiki/STL_(file_format)): `.stl` import and the `layerstack` binary
//!
//! #### Optional
//! - **f32**: use f32 as Real, this conflicts with f64
//! - **parallel**: use rayon to slice triangles and process layers concurrently

#![forbid(unsafe_code)]
#![warn(clippy::missing_const_for_fn, clippy::approx_constant, clippy::all)]

pub mod errors;
pub mod float_types;
pub mod guides;
pub mod layers;
pub mod mesh;
pub mod raster;
pub mod section;
pub mod traits;

#[cfg(feature = "stl-io")]
pub mod io;

#[cfg(any(all(feature = "f64", feature = "f32"), not(any(feature = "f64", feature = "f32"))))]
compile_error!("Either 'f64' or 'f32' feature must be specified, but not both");

pub use errors::SliceError;
pub use guides::GuideParams;
pub use layers::{LayerReport, SliceParams, WrittenLayer, slice_to_layers, slice_to_layers_with_cancel};
pub use mesh::Mesh;
pub use section::{Contour, Section};
pub use traits::CSG;
