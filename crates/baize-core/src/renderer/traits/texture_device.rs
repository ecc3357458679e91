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

//! The graphics-device boundary of the texture cache.

use crate::renderer::api::texture::{
    AddressMode, DeviceId, ImageUpload, SamplerState, TextureKind, TextureStorageDescriptor,
};
use crate::renderer::error::ResourceError;
use crate::renderer::UnpackAlignment;
use std::fmt::Debug;

/// A device property queried through [`TextureDevice::query_capability`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceCapability {
    /// `1` if the device supports anisotropic filtering, `0` otherwise.
    AnisotropicFiltering,
    /// The highest anisotropy level the device accepts.
    MaxAnisotropy,
    /// The number of texture layers (units) that can be bound at once.
    MaxTextureUnits,
    /// The largest width or height a texture may have.
    MaxTextureSize,
}

/// The graphics-device operations the texture cache depends on.
///
/// Device ids are opaque to the cache. An id handed out by
/// [`allocate_ids`](TextureDevice::allocate_ids) stays valid until it is passed
/// to [`release_ids`](TextureDevice::release_ids); allocating storage for an id
/// that already has storage replaces it.
///
/// The trait is used from the single thread that owns the device context,
/// which is why every mutating call takes `&mut self`.
pub trait TextureDevice: Debug {
    /// Creates `count` new device ids in one batch.
    /// ## Errors
    /// * `ResourceError` - If the device cannot create more resources.
    fn allocate_ids(&mut self, count: usize) -> Result<Vec<DeviceId>, ResourceError>;

    /// Destroys the given device ids and any storage behind them.
    /// Unknown ids are ignored.
    fn release_ids(&mut self, ids: &[DeviceId]);

    /// Reserves (or replaces) the storage behind `id`.
    /// ## Arguments
    /// * `id` - The device id that receives the storage.
    /// * `descriptor` - The kind, size, format and mip level count of the storage.
    /// ## Errors
    /// * `ResourceError` - If the id is unknown or the format is unsupported.
    fn allocate_storage(
        &mut self,
        id: DeviceId,
        descriptor: &TextureStorageDescriptor,
    ) -> Result<(), ResourceError>;

    /// Copies one image into the storage behind `id`, interpreting rows with
    /// the current unpack alignment.
    /// ## Errors
    /// * `ResourceError` - If the id has no storage or the upload is out of bounds.
    fn upload_image(&mut self, id: DeviceId, upload: &ImageUpload) -> Result<(), ResourceError>;

    /// Sets the row alignment used by subsequent uploads.
    fn set_unpack_alignment(&mut self, alignment: UnpackAlignment);

    /// Fills every mip level below the base level from the base level.
    /// ## Errors
    /// * `ResourceError` - If the id has no storage.
    fn generate_mipmaps(&mut self, id: DeviceId) -> Result<(), ResourceError>;

    /// Applies filtering state to the texture behind `id`.
    fn set_filter(&mut self, id: DeviceId, sampler: &SamplerState) -> Result<(), ResourceError>;

    /// Applies a wrap mode to every coordinate of the texture behind `id`.
    fn set_wrap(&mut self, id: DeviceId, mode: AddressMode) -> Result<(), ResourceError>;

    /// Binds the texture behind `id` to a texture layer (unit).
    /// ## Errors
    /// * `ResourceError` - If the id is unknown or the layer is out of range.
    fn bind_to_layer(
        &mut self,
        layer: u32,
        kind: TextureKind,
        id: DeviceId,
    ) -> Result<(), ResourceError>;

    /// Queries a device capability.
    fn query_capability(&self, capability: DeviceCapability) -> Result<u32, ResourceError>;

    /// Returns and clears the oldest error the device recorded since the last call.
    fn take_error(&mut self) -> Option<ResourceError>;
}
