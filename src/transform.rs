//! Composition of the screen → slice → world → voxel transforms.

use crate::linalg::{Mat4, Vec3};
use crate::slice::Slice;
use crate::volume::Volume;

/// Field of view and pixel grid of the on-screen XY plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportConfig {
    /// Physical size covered by the viewport.
    pub field_of_view: Vec3,
    /// Pixel counts along x, y (and z, usually 1).
    pub dimensions: [usize; 3],
    /// Offset of the viewport center in slice space.
    pub xyz_origin: Vec3,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            field_of_view: Vec3::new(250.0, 250.0, 1.0),
            dimensions: [256, 256, 1],
            xyz_origin: Vec3::ZERO,
        }
    }
}

impl ViewportConfig {
    /// XY → slice embedding: pixel pitch on the diagonal, the viewport
    /// centered on `xyz_origin` in-plane and no offset along z.
    pub fn xy_to_slice(&self) -> Mat4 {
        let mut scale = [1.0; 3];
        let mut translation = [0.0; 3];
        for axis in 0..3 {
            if self.dimensions[axis] > 0 {
                scale[axis] = self.field_of_view[axis] / self.dimensions[axis] as f64;
            }
            translation[axis] = -self.field_of_view[axis] / 2.0 + self.xyz_origin[axis];
        }
        translation[2] = 0.0;
        Mat4::scale_translate(Vec3::from(scale), Vec3::from(translation))
    }
}

/// Transforms between voxel, world, slice and screen space.
///
/// The composed XY → IJK matrix is rebuilt on every query so it always
/// reflects the current contributing transforms.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformStack {
    ijk_to_ras: Mat4,
    ras_to_ijk: Mat4,
    slice_to_ras: Mat4,
    xy_to_slice: Mat4,
}

impl TransformStack {
    pub fn new(volume: &Volume) -> Self {
        Self {
            ijk_to_ras: *volume.ijk_to_ras(),
            ras_to_ijk: *volume.ras_to_ijk(),
            slice_to_ras: Mat4::identity(),
            xy_to_slice: ViewportConfig::default().xy_to_slice(),
        }
    }

    /// Stack looking at `slice` through `viewport`.
    pub fn for_slice(volume: &Volume, slice: &Slice, viewport: &ViewportConfig) -> Self {
        let mut stack = Self::new(volume);
        stack.set_slice_orientation(slice.right, slice.up, slice.front);
        stack.set_viewport(viewport);
        stack
    }

    /// Slice → RAS from the slice's right/up/front triple with no translation.
    pub fn set_slice_orientation(&mut self, right: Vec3, up: Vec3, front: Vec3) {
        self.slice_to_ras = Mat4::from_basis(right, up, front, Vec3::ZERO);
    }

    pub fn set_slice_to_ras(&mut self, slice_to_ras: Mat4) {
        self.slice_to_ras = slice_to_ras;
    }

    pub fn set_viewport(&mut self, viewport: &ViewportConfig) {
        self.xy_to_slice = viewport.xy_to_slice();
    }

    pub fn ijk_to_ras(&self) -> &Mat4 {
        &self.ijk_to_ras
    }

    pub fn ras_to_ijk(&self) -> &Mat4 {
        &self.ras_to_ijk
    }

    pub fn slice_to_ras(&self) -> &Mat4 {
        &self.slice_to_ras
    }

    /// Inverse of the slice frame, which is always rigid.
    pub fn ras_to_slice(&self) -> Mat4 {
        self.slice_to_ras.invert_rigid()
    }

    pub fn xy_to_slice(&self) -> &Mat4 {
        &self.xy_to_slice
    }

    pub fn xy_to_ras(&self) -> Mat4 {
        self.slice_to_ras * self.xy_to_slice
    }

    /// `RAS→IJK · Slice→RAS · XY→Slice`
    pub fn xy_to_ijk(&self) -> Mat4 {
        self.ras_to_ijk * self.slice_to_ras * self.xy_to_slice
    }

    /// Voxel coordinate under screen pixel `(x, y)`.
    pub fn pixel_to_ijk(&self, x: f64, y: f64) -> Vec3 {
        self.xy_to_ijk().transform_point(&Vec3::new(x, y, 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volume_builder::VolumeBuilder;
    use approx::assert_abs_diff_eq;

    fn volume(ijk_to_ras: Mat4) -> Volume {
        VolumeBuilder::new([4, 4, 4], [1.0; 3], vec![0.0; 64])
            .ijk_to_ras(ijk_to_ras)
            .build()
            .unwrap()
    }

    #[test]
    fn ijk_ras_round_trip() {
        let axis = Vec3::new(0.3, -0.2, 0.9).normalize().unwrap();
        let rotation = Mat4::from_axis_angle(&axis, 0.4);
        let scaled = rotation * Mat4::scale_translate(Vec3::new(0.8, 1.1, 2.5), Vec3::ZERO);
        let mut ijk_to_ras = scaled;
        ijk_to_ras.m[3] = -12.0;
        ijk_to_ras.m[7] = 30.5;
        ijk_to_ras.m[11] = 7.25;
        let stack = TransformStack::new(&volume(ijk_to_ras));

        for point in [Vec3::ZERO, Vec3::new(1.5, 2.0, 3.0), Vec3::new(3.0, 3.0, 0.0)] {
            let ras = stack.ijk_to_ras().transform_point(&point);
            let back = stack.ras_to_ijk().transform_point(&ras);
            assert_abs_diff_eq!(back.x, point.x, epsilon = 1e-9);
            assert_abs_diff_eq!(back.y, point.y, epsilon = 1e-9);
            assert_abs_diff_eq!(back.z, point.z, epsilon = 1e-9);
        }
    }

    #[test]
    fn default_viewport_centers_field_of_view() {
        let xy_to_slice = ViewportConfig::default().xy_to_slice();
        assert_abs_diff_eq!(xy_to_slice.get(0, 0), 250.0 / 256.0);
        assert_eq!(xy_to_slice.translation(), Vec3::new(-125.0, -125.0, 0.0));
    }

    #[test]
    fn pixel_maps_to_voxel_through_composed_stack() {
        let mut stack = TransformStack::new(&volume(Mat4::identity()));
        stack.set_slice_orientation(Vec3::X, Vec3::Y, Vec3::Z);
        stack.set_viewport(&ViewportConfig {
            field_of_view: Vec3::new(4.0, 4.0, 1.0),
            dimensions: [4, 4, 1],
            xyz_origin: Vec3::new(2.0, 2.0, 0.0),
        });
        assert_eq!(stack.pixel_to_ijk(3.0, 1.0), Vec3::new(3.0, 1.0, 0.0));

        stack.set_slice_orientation(Vec3::Y, Vec3::Z, Vec3::X);
        assert_eq!(stack.pixel_to_ijk(3.0, 1.0), Vec3::new(0.0, 3.0, 1.0));
    }

    #[test]
    fn slice_frame_inverts_rigidly() {
        let mut stack = TransformStack::new(&volume(Mat4::identity()));
        stack.set_slice_orientation(-Vec3::X, Vec3::Y, -Vec3::Z);
        let product = *stack.slice_to_ras() * stack.ras_to_slice();
        assert_eq!(product, Mat4::identity());
    }
}
