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

//! Texture decoding.

use crate::asset_lane::AssetLoaderLane;
use anyhow::{Context, Result};
use baize_core::{asset::SourceImage, renderer::TextureFormat};
use image::DynamicImage;

/// A lane dedicated to decoding texture files on the CPU.
///
/// Grayscale images stay single-channel and float images stay float; every
/// other layout is expanded to sRGB RGBA8. The decoded rows are always
/// tightly packed.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextureLoaderLane;

impl TextureLoaderLane {
    /// Decodes an encoded image file (PNG, JPEG, ...) held in memory.
    pub fn decode(&self, bytes: &[u8]) -> Result<SourceImage> {
        let img = image::load_from_memory(bytes).context("Failed to decode image from memory")?;
        Ok(Self::convert(img))
    }

    fn convert(img: DynamicImage) -> SourceImage {
        let (width, height) = (img.width(), img.height());
        let (bytes, format) = match img {
            DynamicImage::ImageLuma8(gray) => (gray.into_raw(), TextureFormat::R8Unorm),
            DynamicImage::ImageLumaA8(gray_alpha) => {
                (gray_alpha.into_raw(), TextureFormat::Rg8Unorm)
            }
            DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_) => {
                let texels = img.into_rgba32f().into_raw();
                (
                    bytemuck::cast_slice::<f32, u8>(&texels).to_vec(),
                    TextureFormat::Rgba32Float,
                )
            }
            // Convert to RGBA8 (keep in sRGB space)
            other => (other.into_rgba8().into_raw(), TextureFormat::Rgba8UnormSrgb),
        };
        SourceImage::new(bytes, width, height, format)
    }
}

impl AssetLoaderLane<SourceImage> for TextureLoaderLane {
    fn load(
        &self,
        bytes: &[u8],
    ) -> Result<SourceImage, Box<dyn std::error::Error + Send + Sync + 'static>> {
        // Keep the whole context chain in the message.
        self.decode(bytes).map_err(|e| format!("{e:#}").into())
    }
}
