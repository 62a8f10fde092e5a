//! Errors raised while turning a mesh into layer images

use std::path::PathBuf;

/// Everything that can stop a slicing run.
///
/// `InvalidMesh`, `InvalidGuideGeometry`, `InvalidParameters` and
/// `OutputDirectory` are raised before any layer is processed. `WriteFailure`
/// carries the index of the layer whose image could not be persisted so the
/// caller can retry just that layer.
#[derive(Debug, thiserror::Error)]
pub enum SliceError {
    /// The input mesh is empty, degenerate or contains non-finite coordinates
    #[error("(InvalidMesh) {0}")]
    InvalidMesh(String),

    /// A guide rod could not be built from the given radius/segment count
    #[error("(InvalidGuideGeometry) {0}")]
    InvalidGuideGeometry(String),

    /// Layer height, canvas size or margin are out of range
    #[error("(InvalidParameters) {0}")]
    InvalidParameters(String),

    /// The output directory could not be created
    #[error("(OutputDirectory) could not create {}: {source}", .path.display())]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A layer image could not be written
    #[error("(WriteFailure) layer {layer} could not be written to {}: {source}", .path.display())]
    WriteFailure {
        layer: usize,
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

impl SliceError {
    /// Index of the offending layer, for per-layer failures.
    pub const fn layer(&self) -> Option<usize> {
        match self {
            SliceError::WriteFailure { layer, .. } => Some(*layer),
            _ => None,
        }
    }
}
