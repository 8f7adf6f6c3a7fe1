//! Minimal 3-vector and 4×4 affine matrix helpers.
//!
//! Matrices are stored row-major and act on column vectors, so
//! `(a * b).transform_point(p)` applies `b` first.

use std::ops::{Add, Index, Mul, Neg, Sub};

/// Tolerance used for degenerate-geometry checks.
pub const EPSILON: f64 = 1e-9;

const SINGULAR_PIVOT: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);
    pub const X: Vec3 = Vec3::new(1.0, 0.0, 0.0);
    pub const Y: Vec3 = Vec3::new(0.0, 1.0, 0.0);
    pub const Z: Vec3 = Vec3::new(0.0, 0.0, 1.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    pub fn dot(&self, other: &Vec3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: &Vec3) -> Vec3 {
        Vec3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn length(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit vector in the same direction, or `None` for a (near) zero vector.
    pub fn normalize(&self) -> Option<Vec3> {
        let length = self.length();
        if length < EPSILON || !length.is_finite() {
            return None;
        }
        Some(*self * (1.0 / length))
    }
}

impl From<[f64; 3]> for Vec3 {
    fn from(v: [f64; 3]) -> Self {
        Vec3::new(v[0], v[1], v[2])
    }
}

impl Index<usize> for Vec3 {
    type Output = f64;

    fn index(&self, axis: usize) -> &f64 {
        match axis {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("Vec3 index out of range: {axis}"),
        }
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    #[inline]
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    #[inline]
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;

    #[inline]
    fn mul(self, rhs: f64) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;

    #[inline]
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

/// Row-major 4×4 affine matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4 {
    pub m: [f64; 16],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<[f64; 16]> for Mat4 {
    fn from(m: [f64; 16]) -> Self {
        Self { m }
    }
}

impl Mat4 {
    pub fn identity() -> Self {
        Self {
            #[rustfmt::skip]
            m: [
                1.0, 0.0, 0.0, 0.0,
                0.0, 1.0, 0.0, 0.0,
                0.0, 0.0, 1.0, 0.0,
                0.0, 0.0, 0.0, 1.0,
            ],
        }
    }

    /// Diagonal scale followed by a translation.
    pub fn scale_translate(scale: Vec3, translation: Vec3) -> Self {
        Self {
            #[rustfmt::skip]
            m: [
                scale.x, 0.0,     0.0,     translation.x,
                0.0,     scale.y, 0.0,     translation.y,
                0.0,     0.0,     scale.z, translation.z,
                0.0,     0.0,     0.0,     1.0,
            ],
        }
    }

    /// Matrix whose 3×3 block has `x`, `y` and `z` as columns.
    pub fn from_basis(x: Vec3, y: Vec3, z: Vec3, translation: Vec3) -> Self {
        Self {
            #[rustfmt::skip]
            m: [
                x.x, y.x, z.x, translation.x,
                x.y, y.y, z.y, translation.y,
                x.z, y.z, z.z, translation.z,
                0.0, 0.0, 0.0, 1.0,
            ],
        }
    }

    /// Rotation of `angle` radians around the unit vector `axis`, built from
    /// the equivalent unit quaternion.
    pub fn from_axis_angle(axis: &Vec3, angle: f64) -> Self {
        let half = angle / 2.0;
        let a = half.cos();
        let b = half.sin() * axis.x;
        let c = half.sin() * axis.y;
        let d = half.sin() * axis.z;
        Self {
            #[rustfmt::skip]
            m: [
                a * a + b * b - c * c - d * d, 2.0 * (b * c - a * d),         2.0 * (b * d + a * c),         0.0,
                2.0 * (b * c + a * d),         a * a + c * c - b * b - d * d, 2.0 * (c * d - a * b),         0.0,
                2.0 * (b * d - a * c),         2.0 * (c * d + a * b),         a * a + d * d - c * c - b * b, 0.0,
                0.0,                           0.0,                           0.0,                           1.0,
            ],
        }
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.m[row * 4 + col]
    }

    /// Column `col` of the 3×3 block.
    pub fn column(&self, col: usize) -> Vec3 {
        Vec3::new(self.get(0, col), self.get(1, col), self.get(2, col))
    }

    pub fn translation(&self) -> Vec3 {
        self.column(3)
    }

    pub fn transpose(&self) -> Self {
        let mut t = [0.0; 16];
        for i in 0..4 {
            for j in 0..4 {
                t[i * 4 + j] = self.m[j * 4 + i];
            }
        }
        Self { m: t }
    }

    pub fn transform_point(&self, p: &Vec3) -> Vec3 {
        let m = &self.m;
        Vec3::new(
            m[0] * p.x + m[1] * p.y + m[2] * p.z + m[3],
            m[4] * p.x + m[5] * p.y + m[6] * p.z + m[7],
            m[8] * p.x + m[9] * p.y + m[10] * p.z + m[11],
        )
    }

    pub fn transform_vector(&self, v: &Vec3) -> Vec3 {
        let m = &self.m;
        Vec3::new(
            m[0] * v.x + m[1] * v.y + m[2] * v.z,
            m[4] * v.x + m[5] * v.y + m[6] * v.z,
            m[8] * v.x + m[9] * v.y + m[10] * v.z,
        )
    }

    /// Inverse of a rotation + translation matrix: transposed rotation block
    /// and negated, rotated translation. Only valid when the 3×3 block is
    /// orthonormal.
    pub fn invert_rigid(&self) -> Self {
        let row = |r: usize| Vec3::new(self.get(r, 0), self.get(r, 1), self.get(r, 2));
        let rotation = Self::from_basis(row(0), row(1), row(2), Vec3::ZERO);
        let translation = -rotation.transform_vector(&self.translation());
        Self::from_basis(row(0), row(1), row(2), translation)
    }

    /// General inverse by Gauss-Jordan elimination with partial pivoting.
    /// Returns `None` for a singular matrix.
    pub fn inverse(&self) -> Option<Self> {
        let mut a = self.m;
        let mut inv = Self::identity().m;

        for col in 0..4 {
            let pivot = (col..4).max_by(|&r1, &r2| {
                a[r1 * 4 + col].abs().total_cmp(&a[r2 * 4 + col].abs())
            })?;
            if a[pivot * 4 + col].abs() < SINGULAR_PIVOT {
                return None;
            }
            if pivot != col {
                for k in 0..4 {
                    a.swap(pivot * 4 + k, col * 4 + k);
                    inv.swap(pivot * 4 + k, col * 4 + k);
                }
            }

            let scale = 1.0 / a[col * 4 + col];
            for k in 0..4 {
                a[col * 4 + k] *= scale;
                inv[col * 4 + k] *= scale;
            }

            for row in 0..4 {
                if row == col {
                    continue;
                }
                let factor = a[row * 4 + col];
                if factor != 0.0 {
                    for k in 0..4 {
                        a[row * 4 + k] -= factor * a[col * 4 + k];
                        inv[row * 4 + k] -= factor * inv[col * 4 + k];
                    }
                }
            }
        }

        Some(Self { m: inv })
    }
}

impl Mul for Mat4 {
    type Output = Mat4;

    fn mul(self, rhs: Mat4) -> Mat4 {
        let mut out = [0.0; 16];
        for i in 0..4 {
            for j in 0..4 {
                out[i * 4 + j] = (0..4).map(|k| self.m[i * 4 + k] * rhs.m[k * 4 + j]).sum();
            }
        }
        Mat4 { m: out }
    }
}
