// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::math::Extent2D;
use crate::renderer::TextureFormat;
use std::fmt;

/// A decoded image, ready to be uploaded to a texture.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceImage {
    /// The raw texel data, row after row.
    pub bytes: Vec<u8>,
    /// The width of the image in pixels.
    pub width: u32,
    /// The height of the image in pixels.
    pub height: u32,
    /// The texel format of `bytes`.
    pub format: TextureFormat,
    /// `true` if rows follow each other without padding. When `false`, every
    /// row starts on a 4-byte boundary.
    pub tightly_packed: bool,
}

impl SourceImage {
    /// Creates a tightly packed image.
    pub fn new(bytes: Vec<u8>, width: u32, height: u32, format: TextureFormat) -> Self {
        Self {
            bytes,
            width,
            height,
            format,
            tightly_packed: true,
        }
    }

    /// The number of bytes used by a single pixel.
    pub fn bytes_per_pixel(&self) -> u32 {
        self.format.bytes_per_pixel()
    }

    /// The size of the image.
    pub fn size(&self) -> Extent2D {
        Extent2D::new(self.width, self.height)
    }
}

/// An error raised when an image cannot be provided by an [`ImageSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSourceError {
    /// No image is known under this name.
    NotFound {
        /// The requested name.
        name: String,
    },
    /// The image exists but could not be decoded.
    Decode {
        /// The requested name.
        name: String,
        /// Details reported by the decoder.
        details: String,
    },
    /// The image could not be read.
    Io {
        /// The requested name.
        name: String,
        /// Details reported by the I/O layer.
        details: String,
    },
}

impl ImageSourceError {
    /// The name of the image the error refers to.
    pub fn name(&self) -> &str {
        match self {
            ImageSourceError::NotFound { name }
            | ImageSourceError::Decode { name, .. }
            | ImageSourceError::Io { name, .. } => name,
        }
    }
}

impl fmt::Display for ImageSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSourceError::NotFound { name } => write!(f, "Image '{name}' not found"),
            ImageSourceError::Decode { name, details } => {
                write!(f, "Failed to decode image '{name}': {details}")
            }
            ImageSourceError::Io { name, details } => {
                write!(f, "Failed to read image '{name}': {details}")
            }
        }
    }
}

impl std::error::Error for ImageSourceError {}

/// Provides decoded images by name.
pub trait ImageSource {
    /// Fetches and decodes the image registered under `name`.
    fn fetch(&self, name: &str) -> Result<SourceImage, ImageSourceError>;
}

impl<S: ImageSource + ?Sized> ImageSource for Box<S> {
    fn fetch(&self, name: &str) -> Result<SourceImage, ImageSourceError> {
        (**self).fetch(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_image_reports_pixel_size() {
        let image = SourceImage::new(vec![0; 2 * 3 * 4], 2, 3, TextureFormat::Rgba8Unorm);
        assert_eq!(image.bytes_per_pixel(), 4);
        assert_eq!(image.size(), Extent2D::new(2, 3));
        assert!(image.tightly_packed);
    }

    #[test]
    fn test_image_source_error_display_names_the_image() {
        let err = ImageSourceError::Decode {
            name: "felt.png".to_string(),
            details: "bad header".to_string(),
        };
        assert_eq!(err.name(), "felt.png");
        assert_eq!(
            err.to_string(),
            "Failed to decode image 'felt.png': bad header"
        );
    }
}
