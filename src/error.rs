use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResliceError {
    #[error("Volume dimension {axis} is zero")]
    EmptyDimension { axis: usize },

    #[error("Spacing on axis {axis} must be positive, got {value}")]
    NonPositiveSpacing { axis: usize, value: f64 },

    #[error("Scalar buffer holds {actual} samples, expected {expected}")]
    BufferLengthMismatch { expected: usize, actual: usize },

    #[error("Plane normal has zero length")]
    DegenerateNormal,

    #[error("IJK to RAS transform is not invertible")]
    SingularTransform,

    #[error("Direction cosines do not span three distinct axes")]
    DegenerateOrientation,

    #[error("Label map dimensions {label:?} do not match volume dimensions {volume:?}")]
    LabelMapMismatch { volume: [usize; 3], label: [usize; 3] },

    #[error("Label map has not been resliced for the requested axes")]
    MissingLabelMapResult,

    #[error("Pixel size must be positive and finite, got {0}")]
    InvalidPixelSize(f64),

    #[error("Shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

pub type Result<T> = std::result::Result<T, ResliceError>;
