use std::sync::Arc;

use crate::enums::{Axis, Orientation, ResliceMode};
use crate::error::{ResliceError, Result};
use crate::linalg::Vec3;
use crate::slice::Slice;
use crate::texture::Texture;
use crate::volume::Volume;

use log::{debug, info};
use rayon::prelude::*;

#[derive(Debug, Clone, Default)]
pub struct ResliceOptions {
    pub mode: ResliceMode,
}

/// Slices of one axis, ordered from the negative to the positive world end.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceStack {
    axis: Axis,
    slices: Vec<Slice>,
    half_dimension: f64,
    ascending: bool,
}

impl SliceStack {
    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn slices(&self) -> &[Slice] {
        &self.slices
    }

    pub fn len(&self) -> usize {
        self.slices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    /// `(n - 1) / 2`, the slice shown by default.
    pub fn half_dimension(&self) -> f64 {
        self.half_dimension
    }

    /// Storage position of the default slice.
    pub fn middle_index(&self) -> usize {
        self.half_dimension.floor() as usize
    }

    pub fn middle(&self) -> Option<&Slice> {
        self.slices.get(self.middle_index())
    }

    /// Whether voxel layers are stored in increasing order.
    pub fn is_ascending(&self) -> bool {
        self.ascending
    }

    /// Slice cut at voxel layer `k`, independent of the storage order.
    pub fn by_voxel_index(&self, k: usize) -> Option<&Slice> {
        let len = self.slices.len();
        if k >= len {
            return None;
        }
        let position = if self.ascending { k } else { len - 1 - k };
        self.slices.get(position)
    }
}

/// The stacks produced by one reslice pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ResliceResult {
    stacks: Vec<SliceStack>,
}

impl ResliceResult {
    pub fn stacks(&self) -> &[SliceStack] {
        &self.stacks
    }

    pub fn stack(&self, axis: Axis) -> Option<&SliceStack> {
        self.stacks.iter().find(|stack| stack.axis == axis)
    }

    /// Drop slice borders, as for a label map drawn over its parent.
    pub(crate) fn clear_borders(&mut self) {
        for slice in self.stacks.iter_mut().flat_map(|stack| stack.slices.iter_mut()) {
            slice.borders = false;
        }
    }
}

/// Grayscale byte for `value` scaled against the volume maximum; a zero or
/// otherwise unusable maximum maps to black.
#[inline]
pub(crate) fn normalize_to_u8(value: f32, max: f64) -> u8 {
    let level = 255.0 * (value as f64 / max);
    if level.is_finite() {
        level.clamp(0.0, 255.0) as u8
    } else {
        0
    }
}

pub struct Reslicer;

impl Reslicer {
    /// Cut `volume` into axis-aligned slice stacks.
    ///
    /// When the volume carries a label map, the label map must already have
    /// its own result attached; its textures become the second layer of the
    /// matching slices.
    ///
    /// # Errors
    ///
    /// Returns error if the volume breaks an invariant or its label map has
    /// not been resliced for every requested axis.
    pub fn reslice(volume: &Volume, options: &ResliceOptions) -> Result<ResliceResult> {
        volume.validate()?;
        let label_result = match volume.label_map() {
            Some(label) => Some(label.slices().ok_or(ResliceError::MissingLabelMapResult)?),
            None => None,
        };

        let ras_center = volume.ras_center();
        debug!("reslicing around RAS center {:?}", ras_center);

        let axis_count = match options.mode {
            ResliceMode::Full => 3,
            ResliceMode::SingleAxis => 1,
        };

        let stacks = Axis::ALL[..axis_count]
            .iter()
            .map(|&axis| -> Result<SliceStack> {
                let label_stack = match label_result {
                    Some(result) => Some(
                        result
                            .stack(axis)
                            .ok_or(ResliceError::MissingLabelMapResult)?,
                    ),
                    None => None,
                };
                Self::reslice_axis(volume, axis, ras_center, label_stack)
            })
            .collect::<Result<Vec<_>>>()?;

        info!(
            "resliced volume {:?} into {} stacks",
            volume.dimensions(),
            stacks.len()
        );
        Ok(ResliceResult { stacks })
    }

    /// Reslice the label map (if it has no result yet), then the volume, and
    /// attach both results.
    pub fn reslice_all(volume: &mut Volume, options: &ResliceOptions) -> Result<()> {
        if let Some(label) = volume.label_map_mut() {
            if label.slices().is_none() {
                let label_result = Self::reslice(label, options)?;
                label.attach(label_result);
            }
        }
        let result = Self::reslice(volume, options)?;
        volume.attach(result);
        Ok(())
    }

    fn reslice_axis(
        volume: &Volume,
        axis: Axis,
        ras_center: Vec3,
        label_stack: Option<&SliceStack>,
    ) -> Result<SliceStack> {
        let (a, b, c) = axis.permutation();
        let dim = volume.dimensions();
        let spacing = volume.spacing();
        let orientation = volume.orientation();

        let kmax = dim[c];
        let half_dimension = (kmax as f64 - 1.0) / 2.0;

        let mut width = dim[a] as f64 * spacing[a];
        let mut height = dim[b] as f64 * spacing[b];
        if orientation.is_coronal_acquisition() {
            std::mem::swap(&mut width, &mut height);
        }

        let right = orientation.cosines[a];
        let up = orientation.cosines[b];
        let front = orientation.cosines[c];
        let color = Orientation::from_front(&front).color();
        let borders = !volume.is_label_map();

        let mut slices = (0..kmax)
            .into_par_iter()
            .map(|k| -> Result<Slice> {
                let position = (k as f64 - half_dimension) * spacing[c];
                let label_map = match label_stack {
                    Some(stack) => Some(Arc::clone(
                        &stack
                            .by_voxel_index(k)
                            .ok_or(ResliceError::MissingLabelMapResult)?
                            .texture,
                    )),
                    None => None,
                };
                Ok(Slice {
                    center: ras_center + front * position,
                    front,
                    up,
                    right,
                    width,
                    height,
                    borders,
                    visible: false,
                    color,
                    axis,
                    voxel_index: k,
                    texture: Arc::new(Self::fill_texture(volume, axis, k)?),
                    label_map,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let ascending = orientation.signs[c] > 0.0;
        if !ascending {
            slices.reverse();
        }

        debug!(
            "axis {:?}: {} slices of {}x{}, middle {}",
            axis,
            slices.len(),
            width,
            height,
            half_dimension
        );

        Ok(SliceStack {
            axis,
            slices,
            half_dimension,
            ascending,
        })
    }

    /// RGBA texture of voxel layer `k`: `i` runs along axis `a`, `j` along
    /// axis `b`.
    fn fill_texture(volume: &Volume, axis: Axis, k: usize) -> Result<Texture> {
        let (a, b, c) = axis.permutation();
        let dim = volume.dimensions();
        let (imax, jmax) = (dim[a], dim[b]);
        let max = volume.range()[1];
        let color_table = volume.color_table();

        let mut rgba = Vec::with_capacity(imax * jmax * 4);
        let mut index = [0usize; 3];
        index[c] = k;
        for j in 0..jmax {
            index[b] = j;
            for i in 0..imax {
                index[a] = i;
                let value = volume.voxel(index);
                let pixel = match color_table {
                    Some(table) => table.color_for_value(value),
                    None => {
                        let grey = normalize_to_u8(value, max);
                        [grey, grey, grey, 255]
                    }
                };
                rgba.extend_from_slice(&pixel);
            }
        }

        Texture::from_rgba(imax as u32, jmax as u32, rgba)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color_table::ColorTable;
    use crate::linalg::Mat4;
    use crate::volume_builder::VolumeBuilder;
    use approx::assert_abs_diff_eq;

    fn ramp(dimensions: [usize; 3]) -> Volume {
        let data = (0..dimensions.iter().product::<usize>())
            .map(|v| v as f32)
            .collect();
        VolumeBuilder::new(dimensions, [1.0, 2.0, 3.0], data)
            .build()
            .unwrap()
    }

    #[test]
    fn stack_sizes_follow_through_plane_dimension() {
        let volume = ramp([3, 4, 5]);
        let result = Reslicer::reslice(&volume, &ResliceOptions::default()).unwrap();
        assert_eq!(result.stacks().len(), 3);

        for stack in result.stacks() {
            let (a, b, c) = stack.axis().permutation();
            let dim = volume.dimensions();
            assert_eq!(stack.len(), dim[c]);
            assert_eq!(stack.half_dimension(), (dim[c] as f64 - 1.0) / 2.0);
            for slice in stack.slices() {
                assert_eq!(slice.texture.width() as usize, dim[a]);
                assert_eq!(slice.texture.height() as usize, dim[b]);
                assert_eq!(slice.texture.as_raw().len(), dim[a] * dim[b] * 4);
            }
        }
    }

    #[test]
    fn slices_carry_geometry_of_their_axis() {
        let volume = ramp([3, 4, 5]);
        let result = Reslicer::reslice(&volume, &ResliceOptions::default()).unwrap();
        let stack = result.stack(Axis::Y).unwrap();
        let slice = stack.by_voxel_index(0).unwrap();

        assert_eq!(slice.right, Vec3::Y);
        assert_eq!(slice.up, Vec3::Z);
        assert_eq!(slice.front, Vec3::X);
        assert_eq!(slice.width, 4.0 * 2.0);
        assert_eq!(slice.height, 5.0 * 3.0);
        assert_eq!(slice.orientation(), Orientation::Sagittal);
        assert_eq!(slice.color, [1.0, 1.0, 0.0]);
        assert!(slice.borders);
        assert!(!slice.visible);

        let center = volume.ras_center();
        assert_abs_diff_eq!(slice.center.x, center.x - 1.0);
        assert_abs_diff_eq!(slice.center.y, center.y);
        assert_abs_diff_eq!(slice.center.z, center.z);
    }

    #[test]
    fn texture_samples_permuted_voxels() {
        let volume = ramp([3, 4, 5]);
        let result = Reslicer::reslice(&volume, &ResliceOptions::default()).unwrap();
        let max = volume.range()[1];
        for stack in result.stacks() {
            let (a, b, c) = stack.axis().permutation();
            for slice in stack.slices() {
                let texture = &slice.texture;
                for j in 0..texture.height() {
                    for i in 0..texture.width() {
                        let mut index = [0; 3];
                        index[a] = i as usize;
                        index[b] = j as usize;
                        index[c] = slice.voxel_index;
                        let grey = normalize_to_u8(volume.voxel(index), max);
                        assert_eq!(texture.pixel(i, j), Some([grey, grey, grey, 255]));
                    }
                }
            }
        }
    }

    #[test]
    fn negative_axis_is_stored_in_reverse() {
        let flipped_z = Mat4::scale_translate(Vec3::new(1.0, 1.0, -2.0), Vec3::ZERO);
        let volume = VolumeBuilder::new([2, 2, 4], [1.0, 1.0, 2.0], vec![0.0; 16])
            .ijk_to_ras(flipped_z)
            .build()
            .unwrap();
        let result = Reslicer::reslice(&volume, &ResliceOptions::default()).unwrap();
        let stack = result.stack(Axis::X).unwrap();

        assert!(!stack.is_ascending());
        let voxel_order: Vec<_> = stack.slices().iter().map(|s| s.voxel_index).collect();
        assert_eq!(voxel_order, vec![3, 2, 1, 0]);
        let heights: Vec<_> = stack.slices().iter().map(|s| s.center.z).collect();
        assert!(heights.windows(2).all(|w| w[0] < w[1]), "{heights:?}");
        assert_eq!(stack.by_voxel_index(3).map(|s| s.voxel_index), Some(3));
        for slice in stack.slices() {
            let voxel_z = volume
                .ijk_to_ras()
                .transform_point(&Vec3::new(0.0, 0.0, slice.voxel_index as f64))
                .z;
            assert_abs_diff_eq!(slice.center.z, voxel_z, epsilon = 1e-9);
        }
    }

    #[test]
    fn coronal_acquisition_swaps_slice_extent() {
        let dimensions = [3, 4, 5];
        let spacing = [1.0, 2.0, 3.0];
        let coronal = Mat4::from_basis(
            Vec3::X * spacing[0],
            Vec3::Z * spacing[1],
            Vec3::Y * spacing[2],
            Vec3::ZERO,
        );
        let volume = VolumeBuilder::new(dimensions, spacing, vec![0.0; 60])
            .ijk_to_ras(coronal)
            .build()
            .unwrap();
        assert!(volume.orientation().is_coronal_acquisition());

        let result = Reslicer::reslice(&volume, &ResliceOptions::default()).unwrap();
        for stack in result.stacks() {
            let (a, b, _) = stack.axis().permutation();
            for slice in stack.slices() {
                assert_eq!(slice.width, dimensions[b] as f64 * spacing[b]);
                assert_eq!(slice.height, dimensions[a] as f64 * spacing[a]);
                assert_eq!(slice.texture.width() as usize, dimensions[a]);
                assert_eq!(slice.texture.height() as usize, dimensions[b]);
            }
        }
    }

    #[test]
    fn single_axis_mode_stops_after_first_stack() {
        let options = ResliceOptions {
            mode: ResliceMode::SingleAxis,
        };
        let result = Reslicer::reslice(&ramp([2, 3, 4]), &options).unwrap();
        assert_eq!(result.stacks().len(), 1);
        assert_eq!(result.stacks()[0].axis(), Axis::X);
        assert!(result.stack(Axis::Z).is_none());
    }

    #[test]
    fn color_table_colors_label_volume() {
        let mut table = ColorTable::new();
        table.insert(1, 1.0, 0.0, 0.0, 1.0);
        let volume = VolumeBuilder::new([2, 1, 1], [1.0; 3], vec![1.5, 7.0])
            .color_table(table)
            .build()
            .unwrap();
        let result = Reslicer::reslice(&volume, &ResliceOptions::default()).unwrap();
        let texture = &result.stack(Axis::X).unwrap().slices()[0].texture;
        assert_eq!(texture.pixel(0, 0), Some([255, 0, 0, 255]));
        assert_eq!(texture.pixel(1, 0), Some([255, 25, 51, 255]));
    }

    #[test]
    fn label_map_textures_are_attached() {
        let label = VolumeBuilder::new([2, 2, 2], [1.0; 3], vec![1.0; 8])
            .build()
            .unwrap();
        let mut volume = VolumeBuilder::new([2, 2, 2], [1.0; 3], vec![0.0; 8])
            .label_map(label)
            .build()
            .unwrap();

        let err = Reslicer::reslice(&volume, &ResliceOptions::default()).unwrap_err();
        assert!(matches!(err, ResliceError::MissingLabelMapResult));

        Reslicer::reslice_all(&mut volume, &ResliceOptions::default()).unwrap();
        let label_result = volume.label_map().and_then(Volume::slices).unwrap();
        let result = volume.slices().unwrap();
        for axis in Axis::ALL {
            let label_stack = label_result.stack(axis).unwrap();
            for slice in result.stack(axis).unwrap().slices() {
                let expected = &label_stack.by_voxel_index(slice.voxel_index).unwrap().texture;
                assert!(Arc::ptr_eq(slice.label_map.as_ref().unwrap(), expected));
                assert!(slice.borders);
            }
            assert!(label_stack.slices().iter().all(|s| !s.borders));
        }
    }

    #[test]
    fn label_map_resliced_on_fewer_axes_is_rejected() {
        let mut label = VolumeBuilder::new([2, 2, 2], [1.0; 3], vec![1.0; 8])
            .build()
            .unwrap();
        let single = ResliceOptions {
            mode: ResliceMode::SingleAxis,
        };
        let label_result = Reslicer::reslice(&label, &single).unwrap();
        assert!(label_result.stacks()[0].slices().iter().all(|s| s.borders));
        label.attach(label_result);
        let volume = VolumeBuilder::new([2, 2, 2], [1.0; 3], vec![0.0; 8])
            .label_map(label)
            .build()
            .unwrap();

        let attached = volume.label_map().and_then(Volume::slices).unwrap();
        assert!(attached.stacks()[0].slices().iter().all(|s| !s.borders));
        assert!(Reslicer::reslice(&volume, &single).is_ok());
        assert!(matches!(
            Reslicer::reslice(&volume, &ResliceOptions::default()),
            Err(ResliceError::MissingLabelMapResult)
        ));
    }

    #[test]
    fn zero_maximum_maps_to_black() {
        assert_eq!(normalize_to_u8(0.0, 0.0), 0);
        assert_eq!(normalize_to_u8(5.0, 0.0), 0);
        assert_eq!(normalize_to_u8(10.0, 20.0), 127);
        assert_eq!(normalize_to_u8(-3.0, 20.0), 0);
    }
}
