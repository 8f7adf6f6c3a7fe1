use crate::linalg::Vec3;

/// Anatomical plane a slice lies in, classified by its through-plane normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Axial,
    Coronal,
    Sagittal,
}

impl Orientation {
    /// Classify a slice by the dominant component of its front vector.
    ///
    /// Normalized cosines have a single nonzero component, so a nonzero `z`
    /// is axial, a nonzero `y` is coronal and anything else is sagittal.
    pub fn from_front(front: &Vec3) -> Self {
        if front.z != 0.0 {
            Orientation::Axial
        } else if front.y != 0.0 {
            Orientation::Coronal
        } else {
            Orientation::Sagittal
        }
    }

    /// Border color used by viewers to tell the three stacks apart.
    pub fn color(&self) -> [f64; 3] {
        match self {
            Orientation::Axial => [1.0, 0.0, 0.0],
            Orientation::Coronal => [0.0, 1.0, 0.0],
            Orientation::Sagittal => [1.0, 1.0, 0.0],
        }
    }
}

/// Selects a slice stack by its in-plane voxel axis `a`.
///
/// Textures run along `a` and `b = (a + 1) % 3`; the stack is walked along
/// `c = (a + 2) % 3`, so [`Axis::X`] steps through the `k` layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// In-plane `(a, b)` and through-plane `c` voxel axes of this stack.
    pub fn permutation(self) -> (usize, usize, usize) {
        let a = self.index();
        (a, (a + 1) % 3, (a + 2) % 3)
    }
}

/// Positive end of an axis in the acquisition's space labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnatomicalDirection {
    Right,
    Left,
    Anterior,
    Posterior,
    Superior,
    Inferior,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResliceMode {
    /// Build stacks for all three axes.
    #[default]
    Full,
    /// Stop after the first axis, for lightweight previews.
    SingleAxis,
}
