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

//! Enumerations shared between the texture cache and its backends.

use serde::{Deserialize, Serialize};

/// The texel formats an image source may hand to the texture cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureFormat {
    // 8-bit formats
    /// One 8-bit unsigned normalized component.
    R8Unorm,
    /// Two 8-bit unsigned normalized components.
    Rg8Unorm,
    /// Four 8-bit unsigned normalized components (RGBA).
    Rgba8Unorm,
    /// Four 8-bit unsigned normalized components (RGBA) in the sRGB color space.
    Rgba8UnormSrgb,
    /// Four 8-bit unsigned normalized components (BGRA) in the sRGB color space.
    Bgra8UnormSrgb,
    // 16-bit float formats
    /// One 16-bit float component.
    R16Float,
    /// Two 16-bit float components.
    Rg16Float,
    /// Four 16-bit float components.
    Rgba16Float,
    // 32-bit float formats
    /// One 32-bit float component.
    R32Float,
    /// Two 32-bit float components.
    Rg32Float,
    /// Four 32-bit float components.
    Rgba32Float,
}

impl TextureFormat {
    /// Returns the size in bytes of a single pixel for this format.
    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            TextureFormat::R8Unorm => 1,
            TextureFormat::Rg8Unorm => 2,
            TextureFormat::Rgba8Unorm => 4,
            TextureFormat::Rgba8UnormSrgb => 4,
            TextureFormat::Bgra8UnormSrgb => 4,
            TextureFormat::R16Float => 2,
            TextureFormat::Rg16Float => 4,
            TextureFormat::Rgba16Float => 8,
            TextureFormat::R32Float => 4,
            TextureFormat::Rg32Float => 8,
            TextureFormat::Rgba32Float => 16,
        }
    }

    /// Returns the number of color channels stored per pixel.
    pub fn channel_count(&self) -> u32 {
        match self {
            TextureFormat::R8Unorm | TextureFormat::R16Float | TextureFormat::R32Float => 1,
            TextureFormat::Rg8Unorm | TextureFormat::Rg16Float | TextureFormat::Rg32Float => 2,
            TextureFormat::Rgba8Unorm
            | TextureFormat::Rgba8UnormSrgb
            | TextureFormat::Bgra8UnormSrgb
            | TextureFormat::Rgba16Float
            | TextureFormat::Rgba32Float => 4,
        }
    }
}

/// Row alignment of pixel data handed to the device, in bytes.
///
/// Rows of a `Four`-aligned buffer are padded up to a multiple of four bytes;
/// `One` means rows follow each other with no padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UnpackAlignment {
    /// Rows are tightly packed.
    One,
    /// Rows are padded to a multiple of four bytes. This is the device default.
    #[default]
    Four,
}

impl UnpackAlignment {
    /// The alignment in bytes.
    pub fn bytes(&self) -> usize {
        match self {
            UnpackAlignment::One => 1,
            UnpackAlignment::Four => 4,
        }
    }

    /// Returns the source pitch of a row holding `row_bytes` meaningful bytes.
    pub fn row_pitch(&self, row_bytes: usize) -> usize {
        let align = self.bytes();
        row_bytes.div_ceil(align) * align
    }

    /// Returns the minimum buffer length for `rows` rows of `row_bytes` bytes.
    /// The last row does not need its padding.
    pub fn required_len(&self, row_bytes: usize, rows: usize) -> usize {
        if rows == 0 {
            return 0;
        }
        self.row_pitch(row_bytes) * (rows - 1) + row_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_pitch_pads_only_with_four_byte_alignment() {
        // An RGB-like row of 3 pixels * 1 byte = 3 bytes.
        assert_eq!(UnpackAlignment::One.row_pitch(3), 3);
        assert_eq!(UnpackAlignment::Four.row_pitch(3), 4);
        assert_eq!(UnpackAlignment::Four.row_pitch(8), 8);
    }

    #[test]
    fn test_required_len_skips_padding_of_last_row() {
        assert_eq!(UnpackAlignment::Four.required_len(3, 2), 7);
        assert_eq!(UnpackAlignment::One.required_len(3, 2), 6);
        assert_eq!(UnpackAlignment::Four.required_len(3, 0), 0);
    }

    #[test]
    fn test_bytes_per_pixel_matches_channel_layout() {
        assert_eq!(TextureFormat::Rgba8UnormSrgb.bytes_per_pixel(), 4);
        assert_eq!(TextureFormat::Rgba32Float.bytes_per_pixel(), 16);
        assert_eq!(TextureFormat::Rg16Float.channel_count(), 2);
    }
}
