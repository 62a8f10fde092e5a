//! Alignment guides: four thin vertical rods at the padded corners of a
//! mesh's bounding box.
//!
//! Every horizontal slice between the mesh's lowest and highest point cuts
//! the rods, leaving four small dots near the corners of each layer image.
//! They give a fixed reference for registering layers against each other
//! when the object's own outline changes from layer to layer.

use crate::errors::SliceError;
use crate::float_types::{Real, parry3d::bounding_volume::Aabb};
use crate::mesh::Mesh;
use crate::traits::CSG;
use nalgebra::Point3;
use std::fmt::Debug;

/// Shape and placement of the guide rods.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuideParams {
    /// Outward offset of the rod axes from the bounding box, in X and Y
    pub padding: Real,
    /// Rod radius
    pub radius: Real,
    /// Side faces per rod
    pub segments: usize,
}

impl Default for GuideParams {
    fn default() -> Self {
        GuideParams {
            padding: 0.01,
            radius: 0.1,
            segments: 12,
        }
    }
}

impl GuideParams {
    /// The four rod axes in XY, counter-clockwise from the (min, min) corner.
    pub fn corners(&self, bb: &Aabb) -> [[Real; 2]; 4] {
        let p = self.padding;
        [
            [bb.mins.x - p, bb.mins.y - p],
            [bb.maxs.x + p, bb.mins.y - p],
            [bb.maxs.x + p, bb.maxs.y + p],
            [bb.mins.x - p, bb.maxs.y + p],
        ]
    }
}

impl<S: Clone + Debug + Send + Sync> Mesh<S> {
    /// The four guide rods for this mesh, merged into one mesh.
    ///
    /// Rods run from the mesh's minimum to its maximum Z.
    ///
    /// ## Errors
    /// [`SliceError::InvalidGuideGeometry`] for a negative or non-finite
    /// padding, a radius/segment count the rods cannot be built with, or a
    /// mesh without height.
    pub fn alignment_guides(&self, params: &GuideParams) -> Result<Mesh<S>, SliceError> {
        if !params.padding.is_finite() || params.padding < 0.0 {
            return Err(SliceError::InvalidGuideGeometry(format!(
                "guide padding {} is not a finite non-negative number",
                params.padding
            )));
        }

        let bb = self.bounding_box();
        let rods = params
            .corners(&bb)
            .iter()
            .map(|&[x, y]| {
                Mesh::cylinder_ptp(
                    Point3::new(x, y, bb.mins.z),
                    Point3::new(x, y, bb.maxs.z),
                    params.radius,
                    params.segments,
                    self.metadata.clone(),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Mesh::new().merge_all(&rods))
    }

    /// This mesh plus its guide rods, as a new mesh.
    pub fn with_alignment_guides(&self, params: &GuideParams) -> Result<Mesh<S>, SliceError> {
        let guides = self.alignment_guides(params)?;
        Ok(self.merge(&guides))
    }
}
