//! Reduction of direction cosines to axis-aligned orientations.

use crate::enums::AnatomicalDirection;
use crate::linalg::Vec3;

/// Direction cosines snapped to the nearest signed world axis.
///
/// Row `a` describes voxel axis `a`: `cosines[a]` has a single ±1 entry at
/// `axes[a]` and `signs[a]` holds that entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientationCosines {
    pub cosines: [Vec3; 3],
    pub axes: [usize; 3],
    pub signs: [f64; 3],
}

impl Default for OrientationCosines {
    fn default() -> Self {
        Self {
            cosines: [Vec3::X, Vec3::Y, Vec3::Z],
            axes: [0, 1, 2],
            signs: [1.0, 1.0, 1.0],
        }
    }
}

impl OrientationCosines {
    pub fn right(&self) -> Vec3 {
        self.cosines[0]
    }

    pub fn up(&self) -> Vec3 {
        self.cosines[1]
    }

    pub fn front(&self) -> Vec3 {
        self.cosines[2]
    }

    /// True when the third voxel axis runs along the anterior-posterior axis.
    pub fn is_coronal_acquisition(&self) -> bool {
        self.cosines[2].y != 0.0
    }

    /// True when the three rows map onto three different world axes.
    pub fn is_permutation(&self) -> bool {
        let [a, b, c] = self.axes;
        a != b && b != c && a != c
    }
}

/// Snap every row of a 3×3 direction-cosine matrix (packed row by row) to
/// its dominant axis. Ties go to the first axis reaching the maximum.
pub fn normalize(cosines: &[f64; 9]) -> OrientationCosines {
    let mut out = OrientationCosines::default();
    for (row, values) in cosines.chunks_exact(3).enumerate() {
        let axis = dominant_axis(values);
        let sign = if values[axis] < 0.0 { -1.0 } else { 1.0 };
        let mut unit = [0.0; 3];
        unit[axis] = sign;
        out.cosines[row] = Vec3::from(unit);
        out.axes[row] = axis;
        out.signs[row] = sign;
    }
    out
}

#[inline]
fn dominant_axis(row: &[f64]) -> usize {
    let mut best = 0;
    for axis in 1..row.len() {
        if row[axis].abs() > row[best].abs() {
            best = axis;
        }
    }
    best
}

/// Per world axis, `-1.0` when the labeled positive direction is not the
/// RAS one (right, anterior, superior), else `1.0`.
pub fn ras_flip(space: &[AnatomicalDirection; 3]) -> [f64; 3] {
    let expected = [
        AnatomicalDirection::Right,
        AnatomicalDirection::Anterior,
        AnatomicalDirection::Superior,
    ];
    let mut flip = [1.0; 3];
    for axis in 0..3 {
        if space[axis] != expected[axis] {
            flip[axis] = -1.0;
        }
    }
    flip
}

/// Express an orientation given in `space` in RAS by negating the
/// coefficients of every non-RAS axis.
pub fn to_ras(space: &[AnatomicalDirection; 3], orientation: &[f64; 9]) -> [f64; 9] {
    let flip = ras_flip(space);
    let mut ras = *orientation;
    for (index, value) in ras.iter_mut().enumerate() {
        *value *= flip[index % 3];
    }
    ras
}
