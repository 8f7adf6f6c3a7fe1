use crate::color_table::ColorTable;
use crate::error::{ResliceError, Result};
use crate::geometry::BoundingBox;
use crate::linalg::{Mat4, Vec3};
use crate::orientation::OrientationCosines;
use crate::reslicer::ResliceResult;

use ndarray::Array3;

/// A scalar volume with its voxel-to-world geometry.
///
/// Built through [`crate::volume_builder::VolumeBuilder`]. Derived slice
/// stacks are not part of the volume itself; a [`ResliceResult`] can be
/// attached once computed.
#[derive(Debug, Clone)]
pub struct Volume {
    /// Samples laid out as `(k, j, i)`, i.e. (depth, height, width).
    pub(crate) data: Array3<f32>,
    pub(crate) spacing: [f64; 3],
    pub(crate) range: [f64; 2],
    pub(crate) ijk_to_ras: Mat4,
    pub(crate) ras_to_ijk: Mat4,
    pub(crate) ras_origin: Vec3,
    pub(crate) ras_spacing: Vec3,
    pub(crate) ras_extent: Vec3,
    pub(crate) orientation: OrientationCosines,
    pub(crate) label_map: Option<Box<Volume>>,
    pub(crate) color_table: Option<ColorTable>,
    pub(crate) is_label_map: bool,
    pub(crate) slices: Option<ResliceResult>,
}

impl Volume {
    /// Get the dimensions of the volume as `[nx, ny, nz]`
    pub fn dimensions(&self) -> [usize; 3] {
        let (nz, ny, nx) = self.data.dim();
        [nx, ny, nz]
    }

    /// Get a reference to the underlying data
    pub fn data(&self) -> &Array3<f32> {
        &self.data
    }

    pub fn spacing(&self) -> [f64; 3] {
        self.spacing
    }

    /// Scalar range as `[min, max]`.
    pub fn range(&self) -> [f64; 2] {
        self.range
    }

    pub fn ijk_to_ras(&self) -> &Mat4 {
        &self.ijk_to_ras
    }

    pub fn ras_to_ijk(&self) -> &Mat4 {
        &self.ras_to_ijk
    }

    pub fn ras_origin(&self) -> Vec3 {
        self.ras_origin
    }

    pub fn ras_spacing(&self) -> Vec3 {
        self.ras_spacing
    }

    pub fn ras_extent(&self) -> Vec3 {
        self.ras_extent
    }

    pub fn ras_center(&self) -> Vec3 {
        self.ras_origin + self.ras_extent * 0.5
    }

    /// World-space box spanned by the voxel centers.
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_corners(self.ras_origin, self.ras_origin + self.ras_extent)
    }

    pub fn orientation(&self) -> &OrientationCosines {
        &self.orientation
    }

    pub fn label_map(&self) -> Option<&Volume> {
        self.label_map.as_deref()
    }

    pub fn label_map_mut(&mut self) -> Option<&mut Volume> {
        self.label_map.as_deref_mut()
    }

    pub fn color_table(&self) -> Option<&ColorTable> {
        self.color_table.as_ref()
    }

    /// True when this volume is a label map attached to a parent volume.
    pub fn is_label_map(&self) -> bool {
        self.is_label_map
    }

    /// Sample at voxel index `[i, j, k]`.
    #[inline]
    pub fn voxel(&self, index: [usize; 3]) -> f32 {
        self.data[[index[2], index[1], index[0]]]
    }

    /// Sample the voxel containing a continuous IJK coordinate, or `None`
    /// when it lies outside `[0, dimension)` on any axis.
    #[inline]
    pub fn voxel_at(&self, ijk: &Vec3) -> Option<f32> {
        let [nx, ny, nz] = self.dimensions();
        let in_range = |value: f64, dim: usize| value >= 0.0 && value < dim as f64;
        if in_range(ijk.x, nx) && in_range(ijk.y, ny) && in_range(ijk.z, nz) {
            Some(self.voxel([ijk.x as usize, ijk.y as usize, ijk.z as usize]))
        } else {
            None
        }
    }

    /// Store the slice stacks computed for this volume, replacing older ones.
    pub fn attach(&mut self, result: ResliceResult) {
        self.slices = Some(result);
    }

    pub fn slices(&self) -> Option<&ResliceResult> {
        self.slices.as_ref()
    }

    pub fn take_slices(&mut self) -> Option<ResliceResult> {
        self.slices.take()
    }

    /// Check the invariants resampling relies on.
    ///
    /// # Errors
    ///
    /// Returns the first violated precondition: an empty dimension, a
    /// non-positive spacing or a label map of a different shape.
    pub fn validate(&self) -> Result<()> {
        let dimensions = self.dimensions();
        if let Some(axis) = dimensions.iter().position(|&d| d == 0) {
            return Err(ResliceError::EmptyDimension { axis });
        }
        if let Some(axis) = self.spacing.iter().position(|s| !(*s > 0.0 && s.is_finite())) {
            return Err(ResliceError::NonPositiveSpacing {
                axis,
                value: self.spacing[axis],
            });
        }
        if let Some(label) = self.label_map() {
            if label.dimensions() != dimensions {
                return Err(ResliceError::LabelMapMismatch {
                    volume: dimensions,
                    label: label.dimensions(),
                });
            }
        }
        Ok(())
    }
}
