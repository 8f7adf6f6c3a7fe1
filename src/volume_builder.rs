use crate::color_table::ColorTable;
use crate::enums::AnatomicalDirection;
use crate::error::{ResliceError, Result};
use crate::linalg::{Mat4, Vec3};
use crate::orientation::{self, OrientationCosines};
use crate::volume::Volume;

use log::debug;
use ndarray::Array3;

/// Assembles a [`Volume`] from what an upstream parser produced.
pub struct VolumeBuilder {
    dimensions: [usize; 3],
    spacing: [f64; 3],
    data: Vec<f32>,
    ijk_to_ras: Option<Mat4>,
    space: Option<[AnatomicalDirection; 3]>,
    range: Option<[f64; 2]>,
    label_map: Option<Volume>,
    color_table: Option<ColorTable>,
}

impl VolumeBuilder {
    /// Start a volume from its dimensions `[nx, ny, nz]`, voxel spacing and
    /// samples in i-fastest order.
    pub fn new(dimensions: [usize; 3], spacing: [f64; 3], data: Vec<f32>) -> Self {
        Self {
            dimensions,
            spacing,
            data,
            ijk_to_ras: None,
            space: None,
            range: None,
            label_map: None,
            color_table: None,
        }
    }

    /// Voxel-to-world transform. Defaults to a diagonal spacing matrix.
    pub fn ijk_to_ras(mut self, ijk_to_ras: Mat4) -> Self {
        self.ijk_to_ras = Some(ijk_to_ras);
        self
    }

    /// Positive direction of each world axis in the source space. Axes that
    /// do not point right, anterior or superior are flipped into RAS.
    pub fn space(mut self, space: [AnatomicalDirection; 3]) -> Self {
        self.space = Some(space);
        self
    }

    /// Scalar range used for grayscale mapping. Computed from the samples
    /// when not given.
    pub fn scalar_range(mut self, min: f64, max: f64) -> Self {
        self.range = Some([min, max]);
        self
    }

    /// Attach a label map of the same dimensions.
    pub fn label_map(mut self, label_map: Volume) -> Self {
        self.label_map = Some(label_map);
        self
    }

    pub fn color_table(mut self, color_table: ColorTable) -> Self {
        self.color_table = Some(color_table);
        self
    }

    /// Validate the inputs and derive the world-space geometry.
    ///
    /// # Errors
    ///
    /// Returns error if a dimension is zero, a spacing is not positive, the
    /// buffer length does not match, the transform is singular or the label
    /// map has different dimensions.
    pub fn build(self) -> Result<Volume> {
        Self::validate_dimensions(self.dimensions, self.spacing, self.data.len())?;

        let [nx, ny, nz] = self.dimensions;
        let [sx, sy, sz] = self.spacing;
        let mut ijk_to_ras = self
            .ijk_to_ras
            .unwrap_or_else(|| Mat4::scale_translate(Vec3::new(sx, sy, sz), Vec3::ZERO));
        if let Some(space) = &self.space {
            ijk_to_ras = Self::get_ras_transform(&ijk_to_ras, space);
        }
        let ras_to_ijk = ijk_to_ras
            .inverse()
            .ok_or(ResliceError::SingularTransform)?;

        let orientation = Self::get_orientation(&ijk_to_ras)?;
        let (ras_origin, ras_extent) = Self::get_ras_bounds(&ijk_to_ras, self.dimensions);
        let ras_spacing = Self::get_ras_spacing(&orientation, self.spacing);
        let range = self
            .range
            .unwrap_or_else(|| Self::get_scalar_range(&self.data));

        debug!(
            "built volume {:?}, RAS origin {:?}, extent {:?}, range {:?}",
            self.dimensions, ras_origin, ras_extent, range
        );

        let label_map = match self.label_map {
            Some(mut label) => {
                if label.dimensions() != self.dimensions {
                    return Err(ResliceError::LabelMapMismatch {
                        volume: self.dimensions,
                        label: label.dimensions(),
                    });
                }
                label.is_label_map = true;
                if let Some(result) = label.slices.as_mut() {
                    result.clear_borders();
                }
                Some(Box::new(label))
            }
            None => None,
        };

        Ok(Volume {
            data: Array3::from_shape_vec((nz, ny, nx), self.data)?,
            spacing: self.spacing,
            range,
            ijk_to_ras,
            ras_to_ijk,
            ras_origin,
            ras_spacing,
            ras_extent,
            orientation,
            label_map,
            color_table: self.color_table,
            is_label_map: false,
            slices: None,
        })
    }

    fn validate_dimensions(dimensions: [usize; 3], spacing: [f64; 3], len: usize) -> Result<()> {
        if let Some(axis) = dimensions.iter().position(|&d| d == 0) {
            return Err(ResliceError::EmptyDimension { axis });
        }
        if let Some(axis) = spacing.iter().position(|s| !(*s > 0.0 && s.is_finite())) {
            return Err(ResliceError::NonPositiveSpacing {
                axis,
                value: spacing[axis],
            });
        }
        let expected: usize = dimensions.iter().product();
        if len != expected {
            return Err(ResliceError::BufferLengthMismatch {
                expected,
                actual: len,
            });
        }
        Ok(())
    }

    /// Voxel axes and origin of `ijk_to_ras` re-expressed in RAS.
    fn get_ras_transform(ijk_to_ras: &Mat4, space: &[AnatomicalDirection; 3]) -> Mat4 {
        let mut columns = [0.0; 9];
        for axis in 0..3 {
            columns[axis * 3..axis * 3 + 3].copy_from_slice(&ijk_to_ras.column(axis).to_array());
        }
        let ras = orientation::to_ras(space, &columns);
        let column = |axis: usize| Vec3::new(ras[axis * 3], ras[axis * 3 + 1], ras[axis * 3 + 2]);

        let [fx, fy, fz] = orientation::ras_flip(space);
        let origin = ijk_to_ras.translation();
        Mat4::from_basis(
            column(0),
            column(1),
            column(2),
            Vec3::new(origin.x * fx, origin.y * fy, origin.z * fz),
        )
    }

    /// Direction cosines are the normalized columns of the 3×3 block; row `a`
    /// of the cosine matrix is the world direction of voxel axis `a`.
    fn get_orientation(ijk_to_ras: &Mat4) -> Result<OrientationCosines> {
        let mut cosines = [0.0; 9];
        for axis in 0..3 {
            let direction = ijk_to_ras
                .column(axis)
                .normalize()
                .ok_or(ResliceError::SingularTransform)?;
            cosines[axis * 3..axis * 3 + 3].copy_from_slice(&direction.to_array());
        }

        let normalized = orientation::normalize(&cosines);
        if !normalized.is_permutation() {
            return Err(ResliceError::DegenerateOrientation);
        }
        Ok(normalized)
    }

    /// World box of the voxel centers at indices `0` and `dim - 1`.
    fn get_ras_bounds(ijk_to_ras: &Mat4, dimensions: [usize; 3]) -> (Vec3, Vec3) {
        let last = dimensions.map(|d| (d - 1) as f64);
        let mut min = Vec3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY);
        let mut max = -min;
        for corner in 0..8 {
            let ijk = Vec3::new(
                if corner & 1 == 0 { 0.0 } else { last[0] },
                if corner & 2 == 0 { 0.0 } else { last[1] },
                if corner & 4 == 0 { 0.0 } else { last[2] },
            );
            let ras = ijk_to_ras.transform_point(&ijk);
            min = Vec3::new(min.x.min(ras.x), min.y.min(ras.y), min.z.min(ras.z));
            max = Vec3::new(max.x.max(ras.x), max.y.max(ras.y), max.z.max(ras.z));
        }
        (min, max - min)
    }

    /// Voxel spacing reordered onto the world axes.
    fn get_ras_spacing(orientation: &OrientationCosines, spacing: [f64; 3]) -> Vec3 {
        let mut ras = [0.0; 3];
        for (voxel_axis, &world_axis) in orientation.axes.iter().enumerate() {
            ras[world_axis] = spacing[voxel_axis];
        }
        Vec3::from(ras)
    }

    fn get_scalar_range(data: &[f32]) -> [f64; 2] {
        data.iter().fold([f64::INFINITY, f64::NEG_INFINITY], |[min, max], &v| {
            [min.min(v as f64), max.max(v as f64)]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use crate::enums::AnatomicalDirection::*;

    fn ramp(dimensions: [usize; 3]) -> Vec<f32> {
        (0..dimensions.iter().product::<usize>()).map(|v| v as f32).collect()
    }

    #[test]
    fn rejects_empty_dimension() {
        let err = VolumeBuilder::new([4, 0, 4], [1.0; 3], vec![]).build().unwrap_err();
        assert!(matches!(err, ResliceError::EmptyDimension { axis: 1 }));
    }

    #[test]
    fn rejects_non_positive_spacing() {
        let err = VolumeBuilder::new([2, 2, 2], [1.0, -1.0, 1.0], ramp([2, 2, 2]))
            .build()
            .unwrap_err();
        assert!(matches!(err, ResliceError::NonPositiveSpacing { axis: 1, .. }));
    }

    #[test]
    fn rejects_buffer_length_mismatch() {
        let err = VolumeBuilder::new([2, 2, 2], [1.0; 3], vec![0.0; 7]).build().unwrap_err();
        assert!(matches!(
            err,
            ResliceError::BufferLengthMismatch { expected: 8, actual: 7 }
        ));
    }

    #[test]
    fn rejects_singular_transform() {
        let flat = Mat4::scale_translate(Vec3::new(1.0, 1.0, 0.0), Vec3::ZERO);
        let err = VolumeBuilder::new([2, 2, 2], [1.0; 3], ramp([2, 2, 2]))
            .ijk_to_ras(flat)
            .build()
            .unwrap_err();
        assert!(matches!(err, ResliceError::SingularTransform));
    }

    #[test]
    fn rejects_mismatched_label_map() {
        let label = VolumeBuilder::new([2, 2, 1], [1.0; 3], vec![0.0; 4]).build().unwrap();
        let err = VolumeBuilder::new([2, 2, 2], [1.0; 3], ramp([2, 2, 2]))
            .label_map(label)
            .build()
            .unwrap_err();
        assert!(matches!(err, ResliceError::LabelMapMismatch { .. }));
    }

    #[test]
    fn derives_range_and_ras_geometry() {
        let volume = VolumeBuilder::new([4, 3, 2], [0.5, 1.0, 2.0], ramp([4, 3, 2]))
            .build()
            .unwrap();
        assert_eq!(volume.range(), [0.0, 23.0]);
        assert_eq!(volume.ras_origin(), Vec3::ZERO);
        assert_eq!(volume.ras_extent(), Vec3::new(1.5, 2.0, 2.0));
        assert_eq!(volume.ras_spacing(), Vec3::new(0.5, 1.0, 2.0));
        assert_eq!(volume.voxel([3, 2, 1]), 23.0);
        assert!(!volume.is_label_map());
    }

    #[test]
    fn lps_space_is_flipped_to_ras() {
        let volume = VolumeBuilder::new([2, 2, 2], [1.0; 3], ramp([2, 2, 2]))
            .space([Left, Posterior, Superior])
            .build()
            .unwrap();
        assert_eq!(volume.orientation().signs, [-1.0, -1.0, 1.0]);
        assert_abs_diff_eq!(volume.ras_origin().x, -1.0);
        assert_abs_diff_eq!(volume.ras_origin().y, -1.0);
        assert_abs_diff_eq!(volume.ras_origin().z, 0.0);
    }

    #[test]
    fn space_flip_applies_to_axes_and_origin() {
        let scanner = Mat4::from_basis(
            Vec3::new(0.0, 2.0, 0.0),
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 3.0),
            Vec3::new(10.0, 20.0, 30.0),
        );
        let volume = VolumeBuilder::new([2, 2, 2], [2.0, 1.0, 3.0], ramp([2, 2, 2]))
            .ijk_to_ras(scanner)
            .space([Left, Posterior, Superior])
            .build()
            .unwrap();

        let ijk_to_ras = volume.ijk_to_ras();
        assert_eq!(ijk_to_ras.column(0), Vec3::new(0.0, -2.0, 0.0));
        assert_eq!(ijk_to_ras.column(1), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(ijk_to_ras.column(2), Vec3::new(0.0, 0.0, 3.0));
        assert_eq!(ijk_to_ras.translation(), Vec3::new(-10.0, -20.0, 30.0));
        assert_eq!(volume.orientation().axes, [1, 0, 2]);
        assert_eq!(volume.orientation().signs, [-1.0, 1.0, 1.0]);
    }

    #[test]
    fn label_map_is_flagged() {
        let label = VolumeBuilder::new([2, 2, 2], [1.0; 3], vec![1.0; 8]).build().unwrap();
        let volume = VolumeBuilder::new([2, 2, 2], [1.0; 3], ramp([2, 2, 2]))
            .label_map(label)
            .build()
            .unwrap();
        assert!(volume.label_map().is_some_and(Volume::is_label_map));
    }
}
