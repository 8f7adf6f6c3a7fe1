use std::path::Path;

use image::{ImageResult, RgbaImage};

use crate::error::{ResliceError, Result};

/// RGBA8 pixel buffer handed to the rendering layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    image: RgbaImage,
}

impl Texture {
    /// Wrap a raw `width * height * 4` byte buffer.
    ///
    /// # Errors
    ///
    /// Returns [`ResliceError::BufferLengthMismatch`] if the buffer length
    /// does not match the dimensions.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        let actual = data.len();
        if actual != expected {
            return Err(ResliceError::BufferLengthMismatch { expected, actual });
        }
        RgbaImage::from_raw(width, height, data)
            .map(|image| Self { image })
            .ok_or(ResliceError::BufferLengthMismatch { expected, actual })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.image.get_pixel_checked(x, y).map(|pixel| pixel.0)
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Write the texture as an image file, format chosen from the extension.
    pub fn save(&self, path: impl AsRef<Path>) -> ImageResult<()> {
        self.image.save(path)
    }
}
