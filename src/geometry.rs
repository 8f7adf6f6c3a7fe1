//! World-space planes and boxes used by the oblique resampler.

use crate::error::{ResliceError, Result};
use crate::linalg::{EPSILON, Vec3};

/// Cutting plane through `origin` with unit `normal`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    origin: Vec3,
    normal: Vec3,
}

impl Plane {
    /// # Errors
    ///
    /// Returns [`ResliceError::DegenerateNormal`] if `normal` has no length.
    pub fn new(origin: Vec3, normal: Vec3) -> Result<Self> {
        let normal = normal.normalize().ok_or(ResliceError::DegenerateNormal)?;
        Ok(Self { origin, normal })
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    /// Signed distance of `point` from the plane.
    pub fn distance(&self, point: &Vec3) -> f64 {
        self.normal.dot(&(*point - self.origin))
    }
}

/// Axis-aligned box stored as `[xmin, xmax, ymin, ymax, zmin, zmax]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub bounds: [f64; 6],
}

impl BoundingBox {
    /// Box spanned by two opposite corners, in any order.
    pub fn from_corners(a: Vec3, b: Vec3) -> Self {
        let mut bounds = [0.0; 6];
        for axis in 0..3 {
            bounds[2 * axis] = a[axis].min(b[axis]);
            bounds[2 * axis + 1] = a[axis].max(b[axis]);
        }
        Self { bounds }
    }

    /// Smallest box holding every point, `None` for an empty set.
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut bbox = Self::from_corners(*first, *first);
        for point in rest {
            for axis in 0..3 {
                bbox.bounds[2 * axis] = bbox.bounds[2 * axis].min(point[axis]);
                bbox.bounds[2 * axis + 1] = bbox.bounds[2 * axis + 1].max(point[axis]);
            }
        }
        Some(bbox)
    }

    pub fn min(&self) -> Vec3 {
        Vec3::new(self.bounds[0], self.bounds[2], self.bounds[4])
    }

    pub fn max(&self) -> Vec3 {
        Vec3::new(self.bounds[1], self.bounds[3], self.bounds[5])
    }

    pub fn center(&self) -> Vec3 {
        (self.min() + self.max()) * 0.5
    }

    pub fn contains(&self, point: &Vec3) -> bool {
        (0..3).all(|axis| {
            point[axis] >= self.bounds[2 * axis] - EPSILON
                && point[axis] <= self.bounds[2 * axis + 1] + EPSILON
        })
    }

    /// Points where `plane` crosses the 12 edges of the box.
    ///
    /// Every edge is fixed on two axes and free on the third; the plane
    /// equation is solved for the free coordinate and kept when it falls on
    /// the edge. Edges parallel to the plane never yield a point. Corners
    /// touched by the plane may show up once per adjacent edge.
    pub fn intersect_plane(&self, plane: &Plane) -> Vec<Vec3> {
        let bb = &self.bounds;
        let normal = plane.normal();
        let origin = plane.origin();
        let mut points = Vec::new();

        for face in 0..6 {
            let p = face / 2;
            let q = (p + 1) % 3;
            let r = (p + 2) % 3;
            if normal[r].abs() < EPSILON {
                continue;
            }
            for j in 0..2 {
                let other = bb[(2 + j + 2 * p) % 6];
                let solution = -(normal[p] * (bb[face] - origin[p])
                    + normal[q] * (other - origin[q]))
                    / normal[r]
                    + origin[r];

                if solution >= bb[2 * r] - EPSILON && solution <= bb[2 * r + 1] + EPSILON {
                    let mut point = [0.0; 3];
                    point[p] = bb[face];
                    point[q] = other;
                    point[r] = solution.clamp(bb[2 * r], bb[2 * r + 1]);
                    points.push(Vec3::from(point));
                }
            }
        }

        points
    }
}
