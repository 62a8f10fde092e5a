//! Layer orchestration: slice a mesh at evenly spaced heights and write one
//! image per non-empty cross-section.
//!
//! ```no_run
//! use layerstack::{layers::{SliceParams, slice_to_layers}, mesh::Mesh};
//!
//! let cube = Mesh::<()>::cube(1.0, None);
//! let report = slice_to_layers(&cube, "out", &SliceParams::default().with_layer_height(0.5))?;
//! assert_eq!(report.written.len(), 2);
//! # Ok::<(), layerstack::errors::SliceError>(())
//! ```

use crate::errors::SliceError;
use crate::float_types::Real;
use crate::guides::GuideParams;
use crate::mesh::Mesh;
use crate::raster::{CropMode, Rasterizer, normalize};
use crate::traits::CSG;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Parameters of a slicing run.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceParams {
    /// Vertical distance between consecutive slicing planes
    pub layer_height: Real,
    /// Width and height of every layer image, in pixels
    pub canvas_size: u32,
    /// Free border around the reference circle, in pixels
    pub margin: u32,
    /// Guide rods to add before slicing; `None` slices the bare mesh
    pub guides: Option<GuideParams>,
    /// Contour stroke width, in pixels
    pub stroke_width: Real,
    pub crop: CropMode,
}

impl Default for SliceParams {
    fn default() -> Self {
        SliceParams {
            layer_height: 0.05,
            canvas_size: 1024,
            margin: 50,
            guides: Some(GuideParams::default()),
            stroke_width: 2.0,
            crop: CropMode::FullCanvas,
        }
    }
}

impl SliceParams {
    pub fn with_layer_height(mut self, layer_height: Real) -> Self {
        self.layer_height = layer_height;
        self
    }

    pub fn with_canvas_size(mut self, canvas_size: u32) -> Self {
        self.canvas_size = canvas_size;
        self
    }

    pub fn with_margin(mut self, margin: u32) -> Self {
        self.margin = margin;
        self
    }

    pub fn with_guides(mut self, guides: GuideParams) -> Self {
        self.guides = Some(guides);
        self
    }

    pub fn without_guides(mut self) -> Self {
        self.guides = None;
        self
    }

    pub fn with_stroke_width(mut self, stroke_width: Real) -> Self {
        self.stroke_width = stroke_width;
        self
    }

    pub fn with_crop(mut self, crop: CropMode) -> Self {
        self.crop = crop;
        self
    }

    /// Check the numeric parameters.
    ///
    /// ## Errors
    /// [`SliceError::InvalidParameters`] for a non-positive or non-finite
    /// layer height or stroke width, a zero canvas size, or a margin of at
    /// least half the canvas (which would leave no room to draw).
    pub fn validate(&self) -> Result<(), SliceError> {
        if !self.layer_height.is_finite() || self.layer_height <= 0.0 {
            return Err(SliceError::InvalidParameters(format!(
                "layer height must be a positive number, got {}",
                self.layer_height
            )));
        }
        if self.canvas_size == 0 {
            return Err(SliceError::InvalidParameters(
                "canvas size must be positive".into(),
            ));
        }
        if u64::from(self.margin) * 2 >= u64::from(self.canvas_size) {
            return Err(SliceError::InvalidParameters(format!(
                "margin {} must be less than half the canvas size {}",
                self.margin, self.canvas_size
            )));
        }
        if !self.stroke_width.is_finite() || self.stroke_width <= 0.0 {
            return Err(SliceError::InvalidParameters(format!(
                "stroke width must be a positive number, got {}",
                self.stroke_width
            )));
        }
        Ok(())
    }

    fn rasterizer(&self) -> Rasterizer {
        Rasterizer::new(self.canvas_size)
            .with_stroke_width(self.stroke_width)
            .with_crop(self.crop)
    }
}

/// File name of the image for layer `index`.
pub fn layer_file_name(index: usize) -> String {
    format!("layer_{index:04}.png")
}

/// Largest number of slicing planes a single run accepts.
pub const MAX_LAYERS: usize = 1_000_000;

/// Number of slicing planes for a Z extent of `height`.
///
/// ## Errors
/// [`SliceError::InvalidParameters`] when `height / layer_height` is not
/// finite or needs more than [`MAX_LAYERS`] planes.
pub fn layer_count(height: Real, layer_height: Real) -> Result<usize, SliceError> {
    if height <= 0.0 {
        return Ok(0);
    }
    let count = (height / layer_height).ceil();
    if !count.is_finite() || count > MAX_LAYERS as Real {
        return Err(SliceError::InvalidParameters(format!(
            "layer height {layer_height} over a height of {height} needs {count} layers, \
             more than {MAX_LAYERS}"
        )));
    }
    Ok(count as usize)
}

/// One image that was written to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct WrittenLayer {
    pub index: usize,
    pub z: Real,
    pub path: PathBuf,
    pub contour_count: usize,
}

/// Outcome of a slicing run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerReport {
    /// Number of planes sampled, written or not
    pub candidate_layers: usize,
    /// Z extent of the (augmented) mesh
    pub z_min: Real,
    pub z_max: Real,
    /// Written images in ascending index order
    pub written: Vec<WrittenLayer>,
    /// Indices whose plane missed the mesh
    pub skipped: Vec<usize>,
    /// Set when the run stopped early on request
    pub cancelled: bool,
}

impl LayerReport {
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.written.iter().map(|layer| layer.path.as_path())
    }
}

enum LayerOutcome {
    Written(WrittenLayer),
    Skipped(usize),
    Cancelled,
}

/// Slice `mesh` into `layer_XXXX.png` images inside `out_dir`.
///
/// Runs until every layer is processed; see
/// [`slice_to_layers_with_cancel`] for a cancellable variant.
pub fn slice_to_layers<S: Clone + Debug + Send + Sync>(
    mesh: &Mesh<S>,
    out_dir: impl AsRef<Path>,
    params: &SliceParams,
) -> Result<LayerReport, SliceError> {
    slice_to_layers_with_cancel(mesh, out_dir, params, &AtomicBool::new(false))
}

/// Slice `mesh` into `layer_XXXX.png` images inside `out_dir`, checking
/// `cancel` before every layer.
///
/// Parameters, mesh, guides and the resulting layer count are checked before
/// the output directory is created, and nothing is written until all of them
/// pass. Layer `i` is cut at `z_min + i * layer_height`; planes that miss the
/// mesh produce no file.
/// A cancelled run leaves the images written so far in place.
///
/// ## Errors
/// Any validation error, [`SliceError::OutputDirectory`], or the first
/// [`SliceError::WriteFailure`], which aborts the run.
pub fn slice_to_layers_with_cancel<S: Clone + Debug + Send + Sync>(
    mesh: &Mesh<S>,
    out_dir: impl AsRef<Path>,
    params: &SliceParams,
    cancel: &AtomicBool,
) -> Result<LayerReport, SliceError> {
    let out_dir = out_dir.as_ref();

    params.validate()?;
    mesh.validate()?;

    let augmented = match &params.guides {
        Some(guides) => mesh.with_alignment_guides(guides)?,
        None => mesh.clone(),
    };

    let bb = augmented.bounding_box();
    let (z_min, z_max) = (bb.mins.z, bb.maxs.z);
    let candidate_layers = layer_count(z_max - z_min, params.layer_height)?;

    std::fs::create_dir_all(out_dir).map_err(|source| SliceError::OutputDirectory {
        path: out_dir.to_path_buf(),
        source,
    })?;

    info!(
        triangles = augmented.triangle_count(),
        z_min,
        z_max,
        layers = candidate_layers,
        out_dir = %out_dir.display(),
        "slicing mesh"
    );

    let rasterizer = params.rasterizer();
    let job = LayerJob {
        mesh: &augmented,
        out_dir,
        params,
        rasterizer: &rasterizer,
        z_min,
        cancel,
    };

    let outcomes = run_layers(&job, candidate_layers)?;

    let mut report = LayerReport {
        candidate_layers,
        z_min,
        z_max,
        ..Default::default()
    };
    for outcome in outcomes {
        match outcome {
            LayerOutcome::Written(layer) => report.written.push(layer),
            LayerOutcome::Skipped(index) => report.skipped.push(index),
            LayerOutcome::Cancelled => report.cancelled = true,
        }
    }

    info!(
        written = report.written.len(),
        skipped = report.skipped.len(),
        cancelled = report.cancelled,
        "slicing finished"
    );
    Ok(report)
}

struct LayerJob<'a, S: Clone + Debug + Send + Sync> {
    mesh: &'a Mesh<S>,
    out_dir: &'a Path,
    params: &'a SliceParams,
    rasterizer: &'a Rasterizer,
    z_min: Real,
    cancel: &'a AtomicBool,
}

#[cfg(not(feature = "parallel"))]
fn run_layers<S: Clone + Debug + Send + Sync>(
    job: &LayerJob<'_, S>,
    count: usize,
) -> Result<Vec<LayerOutcome>, SliceError> {
    let mut outcomes = Vec::new();
    for index in 0..count {
        let outcome = job.process(index)?;
        let stop = matches!(outcome, LayerOutcome::Cancelled);
        outcomes.push(outcome);
        if stop {
            break;
        }
    }
    Ok(outcomes)
}

#[cfg(feature = "parallel")]
fn run_layers<S: Clone + Debug + Send + Sync>(
    job: &LayerJob<'_, S>,
    count: usize,
) -> Result<Vec<LayerOutcome>, SliceError> {
    (0..count)
        .into_par_iter()
        .map(|index| job.process(index))
        .collect()
}

impl<S: Clone + Debug + Send + Sync> LayerJob<'_, S> {
    fn process(&self, index: usize) -> Result<LayerOutcome, SliceError> {
        if self.cancel.load(Ordering::Relaxed) {
            debug!(layer = index, "cancelled before slicing");
            return Ok(LayerOutcome::Cancelled);
        }

        let z = self.z_min + index as Real * self.params.layer_height;
        let section = self.mesh.section_at(z);

        let Some(normalized) = normalize(&section, self.params.canvas_size, self.params.margin)
        else {
            debug!(layer = index, z, "empty section, skipped");
            return Ok(LayerOutcome::Skipped(index));
        };

        let image = self.rasterizer.render(&normalized);
        let path = self.out_dir.join(layer_file_name(index));
        self.rasterizer
            .save_png(&image, &path)
            .map_err(|source| SliceError::WriteFailure {
                layer: index,
                path: path.clone(),
                source,
            })?;

        debug!(
            layer = index,
            z,
            contours = section.len(),
            path = %path.display(),
            "layer written"
        );
        Ok(LayerOutcome::Written(WrittenLayer {
            index,
            z,
            path,
            contour_count: section.len(),
        }))
    }
}
