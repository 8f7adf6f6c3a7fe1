//! Resampling of a volume onto an arbitrary cutting plane.

use crate::error::{ResliceError, Result};
use crate::geometry::{BoundingBox, Plane};
use crate::linalg::{Mat4, Vec3};
use crate::reslicer::normalize_to_u8;
use crate::texture::Texture;
use crate::volume::Volume;

use log::{debug, warn};
use rayon::prelude::*;

#[derive(Debug, Clone)]
pub struct ObliqueOptions {
    /// Physical size of one output pixel along both plane axes.
    pub pixel_size: f64,
}

impl Default for ObliqueOptions {
    fn default() -> Self {
        Self { pixel_size: 1.0 }
    }
}

/// An oblique cut and where to place it in the world.
#[derive(Debug, Clone)]
pub struct ObliqueSlice {
    pub texture: Texture,
    /// World direction of the texture's x axis.
    pub right: Vec3,
    /// World direction of the texture's y axis.
    pub up: Vec3,
    /// World position of the center of the covered rectangle.
    pub center: Vec3,
    /// Box of the rotated polygon in plane space.
    pub plane_bounds: BoundingBox,
    /// World-space points where the plane crosses the volume's box.
    pub polygon: Vec<Vec3>,
    /// World → plane space rotation.
    pub rotation: Mat4,
}

/// Minimal rotation mapping `normal` onto +Z. Identity when the normal is
/// already parallel to Z, where the rotation axis is undefined.
pub fn rotation_to_z(normal: &Vec3) -> Mat4 {
    match normal.cross(&Vec3::Z).normalize() {
        Some(axis) => {
            let angle = normal.dot(&Vec3::Z).clamp(-1.0, 1.0).acos();
            Mat4::from_axis_angle(&axis, angle)
        }
        None => Mat4::identity(),
    }
}

pub struct ObliqueResampler;

impl ObliqueResampler {
    /// Resample `volume` onto `plane` on a regular grid.
    ///
    /// Returns `Ok(None)` when the plane misses the volume or only grazes it.
    /// Pixels whose voxel lies outside the volume get a red coverage color
    /// instead of a sample.
    ///
    /// # Errors
    ///
    /// Returns error if the volume breaks an invariant, or the pixel size is
    /// not positive or so small the grid exceeds `u32::MAX` pixels per side.
    pub fn resample(
        volume: &Volume,
        plane: &Plane,
        options: &ObliqueOptions,
    ) -> Result<Option<ObliqueSlice>> {
        volume.validate()?;
        let pixel_size = options.pixel_size;
        if !(pixel_size > 0.0 && pixel_size.is_finite()) {
            return Err(ResliceError::InvalidPixelSize(pixel_size));
        }

        let bbox = volume.bounding_box();
        let polygon = bbox.intersect_plane(plane);
        if polygon.len() < 3 {
            warn!(
                "plane through {:?} meets the volume box in {} points, nothing to resample",
                plane.origin(),
                polygon.len()
            );
            return Ok(None);
        }

        let rotation = rotation_to_z(&plane.normal());
        let inverse = rotation.invert_rigid();
        let rotated: Vec<Vec3> = polygon.iter().map(|p| rotation.transform_point(p)).collect();
        let Some(plane_bounds) = BoundingBox::from_points(&rotated) else {
            return Ok(None);
        };

        let [xmin, xmax, ymin, ymax, zmin, _] = plane_bounds.bounds;
        let (w_min, w_max) = (xmin.floor(), xmax.ceil());
        let (h_min, h_max) = (ymin.floor(), ymax.ceil());
        let columns = ((w_max - w_min) / pixel_size).ceil();
        let rows = ((h_max - h_min) / pixel_size).ceil();
        if columns > u32::MAX as f64 || rows > u32::MAX as f64 {
            return Err(ResliceError::InvalidPixelSize(pixel_size));
        }
        let (width, height) = (columns as usize, rows as usize);
        debug!(
            "oblique grid {}x{} over [{}, {}] x [{}, {}] at z {}",
            width, height, w_min, w_max, h_min, h_max, zmin
        );
        if width == 0 || height == 0 {
            warn!("oblique cut collapses to a line, nothing to resample");
            return Ok(None);
        }

        let plane_to_ijk = *volume.ras_to_ijk() * inverse;
        let max = volume.range()[1];
        let pixel_count = width
            .checked_mul(height)
            .filter(|count| count.checked_mul(4).is_some())
            .ok_or(ResliceError::InvalidPixelSize(pixel_size))?;

        let pixel_data: Vec<u8> = (0..height)
            .into_par_iter()
            .flat_map(|v| {
                (0..width)
                    .flat_map(|u| {
                        let point = Vec3::new(
                            w_min + u as f64 * pixel_size,
                            h_min + v as f64 * pixel_size,
                            zmin,
                        );
                        let ijk = plane_to_ijk.transform_point(&point);
                        match volume.voxel_at(&ijk) {
                            Some(value) => {
                                let grey = normalize_to_u8(value, max);
                                [grey, grey, grey, 255]
                            }
                            None => {
                                let coverage = 255 * (v * width + u) as u128 / pixel_count as u128;
                                [coverage as u8, 255, 0, 0]
                            }
                        }
                    })
                    .collect::<Vec<u8>>()
            })
            .collect();

        let texture = Texture::from_rgba(width as u32, height as u32, pixel_data)?;
        Ok(Some(ObliqueSlice {
            texture,
            right: inverse.transform_vector(&Vec3::X),
            up: inverse.transform_vector(&Vec3::Y),
            center: inverse.transform_point(&plane_bounds.center()),
            plane_bounds,
            polygon,
            rotation,
        }))
    }
}
