//! # volume-reslice library
//!
//! This crate turns a scalar volume (e.g. a CT or MR scan) and its
//! voxel-to-world geometry into 2D slice textures ready for display.
//!
//! A [`Volume`] is assembled with a [`VolumeBuilder`] from what an upstream
//! parser produced: dimensions, spacing, the sample buffer and the IJK to RAS
//! transform. From there two resampling paths are available:
//!  - [`Reslicer`] cuts the volume into three axis-aligned slice stacks,
//!    optionally coloring label maps through a [`ColorTable`] and attaching
//!    a label map's textures to the slices of its parent volume
//!  - [`ObliqueResampler`] intersects an arbitrary [`Plane`] with the
//!    volume's bounding box and resamples the voxels onto that plane
//!
//!  Axis-aligned slices always fall on voxel layers, so no interpolation
//!  is done; the oblique path samples the voxel containing each pixel.
//!  Per-slice work runs in parallel using rayon.
//!
//! # Examples
//!
//! ## Reslicing a volume into slice stacks
//!
//! ```no_run
//! # use volume_reslice::{Axis, ResliceOptions, Reslicer, VolumeBuilder};
//! let data: Vec<f32> = (0..64).map(|v| v as f32).collect();
//! let volume = VolumeBuilder::new([4, 4, 4], [1.0, 1.0, 1.0], data)
//!     .build()
//!     .expect("should have built a valid volume");
//! let result = Reslicer::reslice(&volume, &ResliceOptions::default())
//!     .expect("should have resliced the volume");
//! // `Axis::X` walks voxel layer `k`, axial for an identity-oriented volume
//! let axial = result.stack(Axis::X).expect("should have an axial stack");
//! axial
//!     .middle()
//!     .expect("should have a middle slice")
//!     .texture
//!     .save("result.png")
//!     .expect("should have written the image");
//! ```

pub mod color_table;
pub mod enums;
pub mod error;
pub mod geometry;
pub mod linalg;
pub mod oblique;
pub mod orientation;
pub mod reslicer;
pub mod slice;
pub mod texture;
pub mod transform;
pub mod volume;
pub mod volume_builder;

pub use color_table::{ColorEntry, ColorTable};
pub use enums::{AnatomicalDirection, Axis, Orientation, ResliceMode};
pub use error::{ResliceError, Result};
pub use geometry::{BoundingBox, Plane};
pub use linalg::{Mat4, Vec3};
pub use oblique::{ObliqueOptions, ObliqueResampler, ObliqueSlice};
pub use reslicer::{ResliceOptions, ResliceResult, Reslicer, SliceStack};
pub use slice::Slice;
pub use texture::Texture;
pub use transform::{TransformStack, ViewportConfig};
pub use volume::Volume;
pub use volume_builder::VolumeBuilder;
