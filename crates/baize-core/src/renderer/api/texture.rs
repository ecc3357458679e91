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

//! Defines data structures related to cached GPU textures and their sampling state.

use crate::math::{Extent2D, Extent3D};
use crate::renderer::TextureFormat;
use serde::{Deserialize, Serialize};

/// The kind of texture target an image is uploaded to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureKind {
    /// A single-row texture.
    D1,
    /// A regular two-dimensional texture.
    D2,
    /// A two-dimensional texture addressed in texels. Rectangle textures have
    /// no mipmaps, no anisotropy and only clamping wrap modes.
    Rectangle,
    /// Six square faces sampled as a cube.
    CubeMap,
}

impl TextureKind {
    /// Returns `true` if textures of this kind may carry a mip chain.
    pub fn supports_mipmaps(&self) -> bool {
        !matches!(self, TextureKind::Rectangle)
    }

    /// The number of faces (array layers) a texture of this kind stores.
    pub fn face_count(&self) -> u32 {
        match self {
            TextureKind::CubeMap => 6,
            _ => 1,
        }
    }

    /// Returns `true` if this kind can be sampled with the given wrap mode.
    pub fn allows_wrap(&self, mode: AddressMode) -> bool {
        match self {
            TextureKind::Rectangle => {
                !matches!(mode, AddressMode::Repeat | AddressMode::MirrorRepeat)
            }
            _ => true,
        }
    }

    /// Caps a requested filter mode to the best this kind can use.
    pub fn clamp_filter(&self, requested: TextureFilter) -> TextureFilter {
        match self {
            TextureKind::Rectangle => TextureFilter::Basic,
            _ => requested,
        }
    }
}

/// Defines how texture coordinates are handled when sampling outside the `[0, 1]` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AddressMode {
    /// Coordinates wrap around. `1.1` becomes `0.1`.
    Repeat,
    /// Coordinates are clamped to the edge. `1.1` becomes `1.0`.
    #[default]
    ClampToEdge,
    /// Coordinates wrap around, mirroring at each integer boundary.
    MirrorRepeat,
    /// Coordinates outside the range are given a fixed border color.
    ClampToBorder,
}

/// Defines the filtering mode for texture sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterMode {
    /// Point sampling. Returns the value of the nearest texel.
    Nearest,
    /// Linear interpolation. Returns a weighted average of the four nearest texels.
    Linear,
}

/// Defines the filtering mode between mipmap levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MipmapFilterMode {
    /// Use the nearest mipmap level.
    Nearest,
    /// Linearly interpolate between the two nearest mipmap levels.
    Linear,
}

/// The process-wide texture quality levels, ordered from cheapest to best.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum TextureFilter {
    /// Nearest texel, no mipmaps.
    Basic,
    /// Nearest texel from the nearest mip level.
    BasicMipMap,
    /// Linear filtering within the nearest mip level.
    #[default]
    Bilinear,
    /// Linear filtering blended across mip levels.
    Trilinear,
    /// Trilinear filtering with anisotropy.
    Anisotropic,
}

impl TextureFilter {
    /// Returns `true` if textures loaded under this mode get a mip chain.
    pub fn generates_mipmaps(&self) -> bool {
        *self >= TextureFilter::Bilinear
    }
}

/// The concrete sampling parameters applied to one texture on the device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerState {
    /// The filter used when the texture is minified.
    pub min_filter: FilterMode,
    /// The filter used when the texture is magnified.
    pub mag_filter: FilterMode,
    /// The filter between mip levels, `None` when mip levels are not sampled.
    pub mipmap_filter: Option<MipmapFilterMode>,
    /// The anisotropy level, `0.0` when anisotropic filtering is off.
    pub anisotropy: f32,
}

/// An opaque identifier understood by the graphics device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(pub u32);

/// The public identifier of a texture resident in the cache.
///
/// Handles are never reused: once a texture is unloaded or evicted its
/// handle stays dead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(pub u64);

impl std::fmt::Display for TextureHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Describes the storage to reserve behind a device id before uploading.
#[derive(Debug, Clone)]
pub struct TextureStorageDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<&'a str>,
    /// The texture target.
    pub kind: TextureKind,
    /// The size of the base level of one face.
    pub size: Extent2D,
    /// The texel format.
    pub format: TextureFormat,
    /// The number of mip levels to reserve.
    pub mip_level_count: u32,
}

impl TextureStorageDescriptor<'_> {
    /// Returns the full extent, with the face count as array layers.
    pub fn extent(&self) -> Extent3D {
        Extent3D {
            width: self.size.width,
            height: self.size.height,
            depth_or_array_layers: self.kind.face_count(),
        }
    }
}

/// One image (a face at a mip level) to copy into device storage.
#[derive(Debug, Clone)]
pub struct ImageUpload<'a> {
    /// The cube face or array layer, `0` for single-face kinds.
    pub face: u32,
    /// The mip level written.
    pub mip_level: u32,
    /// The size of the image.
    pub size: Extent2D,
    /// The texel format of `bytes`.
    pub format: TextureFormat,
    /// The pixel rows, laid out according to the device's current unpack alignment.
    pub bytes: &'a [u8],
}
