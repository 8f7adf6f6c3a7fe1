use std::sync::Arc;

use crate::enums::{Axis, Orientation};
use crate::linalg::{Mat4, Vec3};
use crate::texture::Texture;

/// One 2D cut through a volume, placed in world space.
#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub center: Vec3,
    pub front: Vec3,
    pub up: Vec3,
    pub right: Vec3,
    /// Physical width along `right`.
    pub width: f64,
    /// Physical height along `up`.
    pub height: f64,
    pub borders: bool,
    pub visible: bool,
    pub color: [f64; 3],
    /// Stack this slice belongs to in its volume.
    pub axis: Axis,
    /// Voxel layer along the stack's through-plane axis.
    pub voxel_index: usize,
    pub texture: Arc<Texture>,
    /// Label-map layer composited over `texture` at render time.
    pub label_map: Option<Arc<Texture>>,
}

impl Slice {
    pub fn orientation(&self) -> Orientation {
        Orientation::from_front(&self.front)
    }

    /// Rotation taking slice-local axes to world axes, identity translation.
    pub fn slice_to_ras(&self) -> Mat4 {
        Mat4::from_basis(self.right, self.up, self.front, Vec3::ZERO)
    }
}
