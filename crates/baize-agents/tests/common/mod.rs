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

//! A recording texture device and helpers shared by the texture cache tests.

#![allow(dead_code)]

use baize_core::asset::SourceImage;
use baize_core::math::Extent2D;
use baize_core::renderer::{
    AddressMode, DeviceCapability, DeviceId, ImageUpload, ResourceError, SamplerState,
    TextureCacheSettings, TextureDevice, TextureFilter, TextureFormat, TextureKind,
    TextureStorageDescriptor, UnpackAlignment,
};
use baize_lanes::asset_lane::MemoryImageSource;
use std::collections::{HashMap, HashSet, VecDeque};

/// One call received by the [`RecordingDevice`].
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    AllocateIds(usize),
    ReleaseIds(Vec<DeviceId>),
    AllocateStorage {
        id: DeviceId,
        kind: TextureKind,
        size: Extent2D,
        mip_levels: u32,
    },
    Upload {
        id: DeviceId,
        face: u32,
        alignment: UnpackAlignment,
    },
    SetAlignment(UnpackAlignment),
    GenerateMipmaps(DeviceId),
    SetFilter(DeviceId, SamplerState),
    SetWrap(DeviceId, AddressMode),
    Bind {
        layer: u32,
        kind: TextureKind,
        id: DeviceId,
    },
}

/// A texture device that validates and records every call.
#[derive(Debug)]
pub struct RecordingDevice {
    pub calls: Vec<DeviceCall>,
    pub anisotropy: bool,
    pub max_units: u32,
    pub max_size: u32,
    /// `allocate_ids` fails once this many ids exist.
    pub id_limit: usize,
    /// `upload_image` fails for this id.
    pub fail_upload_for: Option<DeviceId>,
    /// `set_filter` fails for this id.
    pub fail_filter_for: Option<DeviceId>,
    pub pending_errors: VecDeque<ResourceError>,
    pub(crate) alignment: UnpackAlignment,
    pub(crate) next_id: u32,
    pub(crate) alive: HashSet<DeviceId>,
    pub(crate) storage: HashMap<DeviceId, (Extent2D, u32)>,
}

impl Default for RecordingDevice {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            anisotropy: true,
            max_units: 8,
            max_size: 4096,
            id_limit: usize::MAX,
            fail_upload_for: None,
            fail_filter_for: None,
            pending_errors: VecDeque::new(),
            alignment: UnpackAlignment::Four,
            next_id: 1,
            alive: HashSet::new(),
            storage: HashMap::new(),
        }
    }
}

impl RecordingDevice {
    pub fn alignment(&self) -> UnpackAlignment {
        self.alignment
    }

    pub fn alive_ids(&self) -> usize {
        self.alive.len()
    }

    pub fn count(&self, matches: impl Fn(&DeviceCall) -> bool) -> usize {
        self.calls.iter().filter(|call| matches(call)).count()
    }

    pub fn storage_allocations(&self) -> usize {
        self.count(|call| matches!(call, DeviceCall::AllocateStorage { .. }))
    }

    pub fn filter_updates_for(&self, id: DeviceId) -> Vec<SamplerState> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DeviceCall::SetFilter(target, sampler) if *target == id => Some(*sampler),
                _ => None,
            })
            .collect()
    }
}

impl TextureDevice for RecordingDevice {
    fn allocate_ids(&mut self, count: usize) -> Result<Vec<DeviceId>, ResourceError> {
        self.calls.push(DeviceCall::AllocateIds(count));
        if self.alive.len() + count > self.id_limit {
            return Err(ResourceError::Exhausted);
        }
        let ids: Vec<DeviceId> = (0..count as u32).map(|i| DeviceId(self.next_id + i)).collect();
        self.next_id += count as u32;
        self.alive.extend(ids.iter().copied());
        Ok(ids)
    }

    fn release_ids(&mut self, ids: &[DeviceId]) {
        self.calls.push(DeviceCall::ReleaseIds(ids.to_vec()));
        for id in ids {
            self.alive.remove(id);
            self.storage.remove(id);
        }
    }

    fn allocate_storage(
        &mut self,
        id: DeviceId,
        descriptor: &TextureStorageDescriptor,
    ) -> Result<(), ResourceError> {
        if !self.alive.contains(&id) {
            return Err(ResourceError::InvalidId(id));
        }
        self.calls.push(DeviceCall::AllocateStorage {
            id,
            kind: descriptor.kind,
            size: descriptor.size,
            mip_levels: descriptor.mip_level_count,
        });
        self.storage
            .insert(id, (descriptor.size, descriptor.kind.face_count()));
        Ok(())
    }

    fn upload_image(&mut self, id: DeviceId, upload: &ImageUpload) -> Result<(), ResourceError> {
        self.calls.push(DeviceCall::Upload {
            id,
            face: upload.face,
            alignment: self.alignment,
        });
        if self.fail_upload_for == Some(id) {
            return Err(ResourceError::BackendError("upload rejected".to_string()));
        }
        let (size, faces) = self.storage.get(&id).ok_or(ResourceError::NoStorage(id))?;
        if upload.face >= *faces || upload.size != *size {
            return Err(ResourceError::OutOfBounds);
        }
        let row_bytes = (upload.size.width * upload.format.bytes_per_pixel()) as usize;
        let required = self
            .alignment
            .required_len(row_bytes, upload.size.height as usize);
        if upload.bytes.len() < required {
            return Err(ResourceError::OutOfBounds);
        }
        Ok(())
    }

    fn set_unpack_alignment(&mut self, alignment: UnpackAlignment) {
        self.calls.push(DeviceCall::SetAlignment(alignment));
        self.alignment = alignment;
    }

    fn generate_mipmaps(&mut self, id: DeviceId) -> Result<(), ResourceError> {
        self.calls.push(DeviceCall::GenerateMipmaps(id));
        Ok(())
    }

    fn set_filter(&mut self, id: DeviceId, sampler: &SamplerState) -> Result<(), ResourceError> {
        self.calls.push(DeviceCall::SetFilter(id, *sampler));
        if self.fail_filter_for == Some(id) {
            return Err(ResourceError::BackendError("sampler rejected".to_string()));
        }
        Ok(())
    }

    fn set_wrap(&mut self, id: DeviceId, mode: AddressMode) -> Result<(), ResourceError> {
        self.calls.push(DeviceCall::SetWrap(id, mode));
        Ok(())
    }

    fn bind_to_layer(
        &mut self,
        layer: u32,
        kind: TextureKind,
        id: DeviceId,
    ) -> Result<(), ResourceError> {
        if !self.storage.contains_key(&id) {
            return Err(ResourceError::NoStorage(id));
        }
        self.calls.push(DeviceCall::Bind { layer, kind, id });
        Ok(())
    }

    fn query_capability(&self, capability: DeviceCapability) -> Result<u32, ResourceError> {
        Ok(match capability {
            DeviceCapability::AnisotropicFiltering => self.anisotropy as u32,
            DeviceCapability::MaxAnisotropy => 16,
            DeviceCapability::MaxTextureUnits => self.max_units,
            DeviceCapability::MaxTextureSize => self.max_size,
        })
    }

    fn take_error(&mut self) -> Option<ResourceError> {
        self.pending_errors.pop_front()
    }
}

/// Routes cache logs to the test output.
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A tightly packed RGBA8 image filled with one value.
pub fn rgba_image(width: u32, height: u32) -> SourceImage {
    SourceImage::new(
        vec![200; (width * height * 4) as usize],
        width,
        height,
        TextureFormat::Rgba8Unorm,
    )
}

/// An image source holding 4x4 RGBA8 images (64 bytes each) under `names`.
pub fn source_with(names: &[&str]) -> MemoryImageSource {
    let mut source = MemoryImageSource::new();
    for name in names {
        source.insert(*name, rgba_image(4, 4));
    }
    source
}

/// Settings without mipmaps, so that a 4x4 RGBA8 texture is exactly 64 bytes.
pub fn basic_settings(max_budget_bytes: u64) -> TextureCacheSettings {
    TextureCacheSettings {
        max_budget_bytes,
        filter_mode: TextureFilter::Basic,
        ..TextureCacheSettings::default()
    }
}
