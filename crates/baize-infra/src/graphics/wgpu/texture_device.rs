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

//! The wgpu implementation of the texture cache's device boundary.

use super::context::WgpuHeadlessContext;
use super::conversions::IntoWgpu;
use super::mipmap;
use baize_core::math::Extent2D;
use baize_core::renderer::{
    AddressMode, DeviceCapability, DeviceId, FilterMode, ImageUpload, MipmapFilterMode,
    ResourceError, SamplerState, TextureDevice, TextureFormat, TextureKind,
    TextureStorageDescriptor, UnpackAlignment,
};
use std::collections::HashMap;

/// The highest anisotropy clamp wgpu accepts.
const MAX_ANISOTROPY: u32 = 16;

/// Upper bound on the bindable layers tracked, whatever the adapter reports.
const MAX_TEXTURE_LAYERS: u32 = 32;

/// What is currently bound to one texture layer.
#[derive(Debug, Clone)]
pub struct BoundTexture {
    /// The device id bound to the layer.
    pub id: DeviceId,
    /// The kind the texture was bound as.
    pub kind: TextureKind,
    /// A view covering every face and mip level of the texture.
    pub view: wgpu::TextureView,
    /// The sampler built from the texture's current filter and wrap state.
    pub sampler: wgpu::Sampler,
}

#[derive(Debug)]
struct WgpuTextureEntry {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
    kind: TextureKind,
    size: Extent2D,
    format: TextureFormat,
    mip_level_count: u32,
    sampler_state: SamplerState,
    wrap: AddressMode,
    // Tightly packed base level of each face, kept for CPU mip generation.
    base_levels: Vec<Option<Vec<u8>>>,
}

/// A [`TextureDevice`] that owns real GPU textures through wgpu.
///
/// Each device id maps to at most one `wgpu::Texture`. All kinds are stored
/// as 2D textures: a 1D texture is one row high and a cube map has six array
/// layers viewed as a cube. Samplers are rebuilt whenever the filter or wrap
/// state of a texture changes.
#[derive(Debug)]
pub struct WgpuTextureDevice {
    context: WgpuHeadlessContext,
    slots: HashMap<DeviceId, Option<WgpuTextureEntry>>,
    next_id: u32,
    alignment: UnpackAlignment,
    bound: Vec<Option<BoundTexture>>,
}

impl WgpuTextureDevice {
    /// Wraps an initialized context.
    pub fn new(context: WgpuHeadlessContext) -> Self {
        let units = Self::layer_count(&context.device_limits) as usize;
        log::info!(
            "WgpuTextureDevice created on \"{}\" ({} texture layers, max size {})",
            context.adapter_name,
            units,
            context.device_limits.max_texture_dimension_2d
        );
        Self {
            context,
            slots: HashMap::new(),
            next_id: 1,
            alignment: UnpackAlignment::default(),
            bound: vec![None; units],
        }
    }

    /// Creates a device on the default adapter.
    pub fn headless() -> anyhow::Result<Self> {
        Ok(Self::new(WgpuHeadlessContext::new()?))
    }

    pub fn context(&self) -> &WgpuHeadlessContext {
        &self.context
    }

    /// Returns what is bound to `layer`, if anything.
    pub fn bound_texture(&self, layer: u32) -> Option<&BoundTexture> {
        self.bound.get(layer as usize).and_then(Option::as_ref)
    }

    /// Returns the GPU texture behind `id`, if it has storage.
    pub fn texture(&self, id: DeviceId) -> Option<&wgpu::Texture> {
        self.entry(id).ok().map(|entry| &entry.texture)
    }

    /// The number of ids currently allocated.
    pub fn live_id_count(&self) -> usize {
        self.slots.len()
    }

    /// Clears every layer `id` is bound to.
    fn unbind(&mut self, id: DeviceId) {
        for slot in self.bound.iter_mut() {
            if slot.as_ref().is_some_and(|bound| bound.id == id) {
                *slot = None;
            }
        }
    }

    fn layer_count(limits: &wgpu::Limits) -> u32 {
        limits.max_sampled_textures_per_shader_stage.min(MAX_TEXTURE_LAYERS)
    }

    fn entry(&self, id: DeviceId) -> Result<&WgpuTextureEntry, ResourceError> {
        self.slots
            .get(&id)
            .ok_or(ResourceError::InvalidId(id))?
            .as_ref()
            .ok_or(ResourceError::NoStorage(id))
    }

    fn entry_mut(&mut self, id: DeviceId) -> Result<&mut WgpuTextureEntry, ResourceError> {
        self.slots
            .get_mut(&id)
            .ok_or(ResourceError::InvalidId(id))?
            .as_mut()
            .ok_or(ResourceError::NoStorage(id))
    }

    fn create_sampler(
        device: &wgpu::Device,
        state: &SamplerState,
        wrap: AddressMode,
        border_clamp: bool,
    ) -> wgpu::Sampler {
        let wrap = if wrap == AddressMode::ClampToBorder && !border_clamp {
            log::warn!("WgpuTextureDevice: ClampToBorder not supported, using ClampToEdge");
            AddressMode::ClampToEdge
        } else {
            wrap
        };
        let address_mode = wrap.into_wgpu();

        let all_linear = state.min_filter == FilterMode::Linear
            && state.mag_filter == FilterMode::Linear
            && state.mipmap_filter == Some(MipmapFilterMode::Linear);
        let anisotropy_clamp = if all_linear && state.anisotropy > 1.0 {
            (state.anisotropy as u32).clamp(1, MAX_ANISOTROPY) as u16
        } else {
            1
        };

        // Without a mipmap filter only the base level is sampled.
        let (mipmap_filter, lod_max_clamp) = match state.mipmap_filter {
            Some(filter) => (filter.into_wgpu(), 32.0),
            None => (wgpu::MipmapFilterMode::Nearest, 0.0),
        };

        device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Baize Texture Sampler"),
            address_mode_u: address_mode,
            address_mode_v: address_mode,
            address_mode_w: address_mode,
            mag_filter: state.mag_filter.into_wgpu(),
            min_filter: state.min_filter.into_wgpu(),
            mipmap_filter,
            lod_min_clamp: 0.0,
            lod_max_clamp,
            anisotropy_clamp,
            border_color: (wrap == AddressMode::ClampToBorder)
                .then_some(wgpu::SamplerBorderColor::TransparentBlack),
            ..Default::default()
        })
    }

    fn rebuild_sampler(&mut self, id: DeviceId) -> Result<(), ResourceError> {
        let border_clamp = self.context.supports_border_clamp();
        let device = self.context.device.clone();
        let entry = self.entry_mut(id)?;
        entry.sampler =
            Self::create_sampler(&device, &entry.sampler_state, entry.wrap, border_clamp);
        let sampler = entry.sampler.clone();
        for bound in self.bound.iter_mut().flatten() {
            if bound.id == id {
                bound.sampler = sampler.clone();
            }
        }
        Ok(())
    }

    fn write_level(
        &self,
        entry: &WgpuTextureEntry,
        face: u32,
        mip_level: u32,
        size: Extent2D,
        bytes: &[u8],
        bytes_per_row: u32,
    ) {
        self.context.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &entry.texture,
                mip_level,
                origin: wgpu::Origin3d {
                    x: 0,
                    y: 0,
                    z: face,
                },
                aspect: wgpu::TextureAspect::All,
            },
            bytes,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(size.height),
            },
            wgpu::Extent3d {
                width: size.width,
                height: size.height,
                depth_or_array_layers: 1,
            },
        );
    }
}

impl TextureDevice for WgpuTextureDevice {
    fn allocate_ids(&mut self, count: usize) -> Result<Vec<DeviceId>, ResourceError> {
        let mut ids = Vec::with_capacity(count);
        for _ in 0..count {
            let id = DeviceId(self.next_id);
            self.next_id = self.next_id.checked_add(1).ok_or(ResourceError::Exhausted)?;
            self.slots.insert(id, None);
            ids.push(id);
        }
        log::debug!("WgpuTextureDevice: Allocated {count} texture ids");
        Ok(ids)
    }

    fn release_ids(&mut self, ids: &[DeviceId]) {
        for id in ids {
            if let Some(Some(entry)) = self.slots.remove(id) {
                entry.texture.destroy();
                log::debug!("WgpuTextureDevice: Destroyed texture with ID: {id:?}");
            }
            self.unbind(*id);
        }
    }

    fn allocate_storage(
        &mut self,
        id: DeviceId,
        descriptor: &TextureStorageDescriptor,
    ) -> Result<(), ResourceError> {
        if !self.slots.contains_key(&id) {
            return Err(ResourceError::InvalidId(id));
        }
        let max_size = self.context.device_limits.max_texture_dimension_2d;
        if descriptor.size.is_empty() || descriptor.size.max_side() > max_size {
            return Err(ResourceError::OutOfBounds);
        }
        if descriptor.mip_level_count == 0
            || descriptor.mip_level_count > descriptor.size.mip_level_count()
        {
            return Err(ResourceError::OutOfBounds);
        }

        let texture = self.context.device.create_texture(&wgpu::TextureDescriptor {
            label: descriptor.label,
            size: descriptor.extent().into_wgpu(),
            mip_level_count: descriptor.mip_level_count,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: descriptor.format.into_wgpu(),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: descriptor.label,
            dimension: Some(descriptor.kind.into_wgpu()),
            ..Default::default()
        });

        let sampler_state = SamplerState {
            min_filter: FilterMode::Nearest,
            mag_filter: FilterMode::Nearest,
            mipmap_filter: None,
            anisotropy: 0.0,
        };
        let wrap = AddressMode::default();
        let sampler = Self::create_sampler(
            &self.context.device,
            &sampler_state,
            wrap,
            self.context.supports_border_clamp(),
        );

        let entry = WgpuTextureEntry {
            texture,
            view,
            sampler,
            kind: descriptor.kind,
            size: descriptor.size,
            format: descriptor.format,
            mip_level_count: descriptor.mip_level_count,
            sampler_state,
            wrap,
            base_levels: vec![None; descriptor.kind.face_count() as usize],
        };
        if let Some(Some(previous)) = self.slots.insert(id, Some(entry)) {
            previous.texture.destroy();
            // Layers still hold views of the destroyed texture.
            self.unbind(id);
        }

        log::info!(
            "WgpuTextureDevice: Created {:?} texture '{}' with ID: {:?}, {}x{} {:?}, {} mip levels",
            descriptor.kind,
            descriptor.label.unwrap_or_default(),
            id,
            descriptor.size.width,
            descriptor.size.height,
            descriptor.format,
            descriptor.mip_level_count
        );
        Ok(())
    }

    fn upload_image(&mut self, id: DeviceId, upload: &ImageUpload) -> Result<(), ResourceError> {
        let alignment = self.alignment;
        let entry = self.entry(id)?;
        if upload.format != entry.format {
            return Err(ResourceError::UnsupportedFormat(upload.format));
        }
        if upload.face >= entry.kind.face_count() || upload.mip_level >= entry.mip_level_count {
            return Err(ResourceError::OutOfBounds);
        }
        let mut expected = entry.size;
        for _ in 0..upload.mip_level {
            expected = expected.next_mip();
        }
        if upload.size != expected {
            return Err(ResourceError::OutOfBounds);
        }

        let bpp = upload.format.bytes_per_pixel();
        let row_bytes = (upload.size.width * bpp) as usize;
        let pitch = alignment.row_pitch(row_bytes);
        if upload.bytes.len() < alignment.required_len(row_bytes, upload.size.height as usize) {
            return Err(ResourceError::OutOfBounds);
        }

        self.write_level(
            entry,
            upload.face,
            upload.mip_level,
            upload.size,
            upload.bytes,
            pitch as u32,
        );

        // The base level is only kept until the mip chain is built.
        if upload.mip_level == 0 && entry.mip_level_count > 1 {
            let tight = mipmap::tighten_rows(upload.bytes, upload.size, bpp, pitch);
            let entry = self.entry_mut(id)?;
            entry.base_levels[upload.face as usize] = Some(tight);
        }
        log::debug!(
            "WgpuTextureDevice: Wrote {} bytes to texture ID: {:?} (face {}, level {})",
            upload.bytes.len(),
            id,
            upload.face,
            upload.mip_level
        );
        Ok(())
    }

    fn set_unpack_alignment(&mut self, alignment: UnpackAlignment) {
        self.alignment = alignment;
    }

    fn generate_mipmaps(&mut self, id: DeviceId) -> Result<(), ResourceError> {
        let entry = self.entry(id)?;
        if entry.mip_level_count <= 1 {
            return Ok(());
        }
        let bpp = entry.format.bytes_per_pixel();
        for (face, base) in entry.base_levels.iter().enumerate() {
            let Some(base) = base else {
                log::warn!("WgpuTextureDevice: Face {face} of {id:?} has no base level to mip");
                continue;
            };
            let chain = mipmap::build_chain(base, entry.size, entry.format, entry.mip_level_count);
            for (level, (bytes, size)) in chain.iter().enumerate() {
                self.write_level(
                    entry,
                    face as u32,
                    level as u32 + 1,
                    *size,
                    bytes,
                    size.width * bpp,
                );
            }
        }
        log::debug!(
            "WgpuTextureDevice: Generated {} mip levels for texture ID: {:?}",
            entry.mip_level_count - 1,
            id
        );
        self.entry_mut(id)?.base_levels.fill(None);
        Ok(())
    }

    fn set_filter(&mut self, id: DeviceId, sampler: &SamplerState) -> Result<(), ResourceError> {
        let entry = self.entry_mut(id)?;
        if entry.sampler_state == *sampler {
            return Ok(());
        }
        entry.sampler_state = *sampler;
        self.rebuild_sampler(id)
    }

    fn set_wrap(&mut self, id: DeviceId, mode: AddressMode) -> Result<(), ResourceError> {
        let entry = self.entry_mut(id)?;
        if entry.wrap == mode {
            return Ok(());
        }
        entry.wrap = mode;
        self.rebuild_sampler(id)
    }

    fn bind_to_layer(
        &mut self,
        layer: u32,
        kind: TextureKind,
        id: DeviceId,
    ) -> Result<(), ResourceError> {
        if layer as usize >= self.bound.len() {
            return Err(ResourceError::OutOfBounds);
        }
        let entry = self.entry(id)?;
        if entry.kind != kind {
            return Err(ResourceError::BackendError(format!(
                "texture {id:?} is a {:?} texture, bound as {kind:?}",
                entry.kind
            )));
        }
        let bound = BoundTexture {
            id,
            kind,
            view: entry.view.clone(),
            sampler: entry.sampler.clone(),
        };
        self.bound[layer as usize] = Some(bound);
        Ok(())
    }

    fn query_capability(&self, capability: DeviceCapability) -> Result<u32, ResourceError> {
        let limits = &self.context.device_limits;
        Ok(match capability {
            DeviceCapability::AnisotropicFiltering => self.context.anisotropy_supported as u32,
            DeviceCapability::MaxAnisotropy => {
                if !self.context.anisotropy_supported {
                    return Err(ResourceError::UnsupportedCapability(capability));
                }
                MAX_ANISOTROPY
            }
            DeviceCapability::MaxTextureUnits => Self::layer_count(limits),
            DeviceCapability::MaxTextureSize => limits.max_texture_dimension_2d,
        })
    }

    fn take_error(&mut self) -> Option<ResourceError> {
        self.context.errors.lock().ok()?.pop_front()
    }
}

impl Drop for WgpuTextureDevice {
    fn drop(&mut self) {
        let live = self.slots.values().flatten().count();
        if live > 0 {
            log::debug!("WgpuTextureDevice: Destroying {live} remaining textures on shutdown");
        }
        for entry in self.slots.values().flatten() {
            entry.texture.destroy();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_device() -> Option<WgpuTextureDevice> {
        let _ = env_logger::builder().is_test(true).try_init();
        WgpuTextureDevice::headless().ok()
    }

    fn descriptor(kind: TextureKind, size: u32, mips: u32) -> TextureStorageDescriptor<'static> {
        TextureStorageDescriptor {
            label: Some("test"),
            kind,
            size: Extent2D::new(size, if kind == TextureKind::D1 { 1 } else { size }),
            format: TextureFormat::Rgba8Unorm,
            mip_level_count: mips,
        }
    }

    #[test]
    fn wgpu_texture_device_uploads_and_binds_or_skips() {
        let Some(mut device) = create_test_device() else {
            println!("Skipping texture device test: could not create test device.");
            return;
        };

        let ids = device.allocate_ids(2).expect("ids");
        assert_eq!(ids, vec![DeviceId(1), DeviceId(2)]);
        device
            .allocate_storage(ids[0], &descriptor(TextureKind::D2, 8, 4))
            .expect("storage");

        let pixels = vec![128u8; 8 * 8 * 4];
        device
            .upload_image(
                ids[0],
                &ImageUpload {
                    face: 0,
                    mip_level: 0,
                    size: Extent2D::new(8, 8),
                    format: TextureFormat::Rgba8Unorm,
                    bytes: &pixels,
                },
            )
            .expect("upload");
        device.generate_mipmaps(ids[0]).expect("mipmaps");
        device.set_wrap(ids[0], AddressMode::Repeat).expect("wrap");

        device.bind_to_layer(0, TextureKind::D2, ids[0]).expect("bind");
        assert_eq!(device.bound_texture(0).map(|b| b.id), Some(ids[0]));

        device.release_ids(&ids);
        assert!(device.bound_texture(0).is_none());
        assert_eq!(device.live_id_count(), 0);
        assert!(device.take_error().is_none());
    }

    #[test]
    fn wgpu_texture_device_unbinds_replaced_storage_or_skips() {
        let Some(mut device) = create_test_device() else {
            println!("Skipping texture device test: could not create test device.");
            return;
        };

        let ids = device.allocate_ids(1).expect("ids");
        let id = ids[0];
        device
            .allocate_storage(id, &descriptor(TextureKind::D2, 4, 1))
            .expect("storage");
        device.bind_to_layer(0, TextureKind::D2, id).expect("bind");
        assert!(device.bound_texture(0).is_some());

        // A recycled id gets new storage without being released first.
        device
            .allocate_storage(id, &descriptor(TextureKind::D2, 8, 1))
            .expect("replacement storage");

        assert!(
            device.bound_texture(0).is_none(),
            "The layer must not keep a view of the destroyed texture"
        );
        device.bind_to_layer(0, TextureKind::D2, id).expect("rebind");
        assert_eq!(device.bound_texture(0).map(|b| b.id), Some(id));
    }

    #[test]
    fn wgpu_texture_device_drops_base_levels_once_mipped_or_skips() {
        let Some(mut device) = create_test_device() else {
            println!("Skipping texture device test: could not create test device.");
            return;
        };

        let ids = device.allocate_ids(2).expect("ids");
        let (single, mipped) = (ids[0], ids[1]);
        device
            .allocate_storage(single, &descriptor(TextureKind::D2, 4, 1))
            .expect("storage");
        device
            .allocate_storage(mipped, &descriptor(TextureKind::D2, 4, 3))
            .expect("storage");

        let pixels = vec![64u8; 4 * 4 * 4];
        for id in [single, mipped] {
            device
                .upload_image(
                    id,
                    &ImageUpload {
                        face: 0,
                        mip_level: 0,
                        size: Extent2D::new(4, 4),
                        format: TextureFormat::Rgba8Unorm,
                        bytes: &pixels,
                    },
                )
                .expect("upload");
        }
        let kept = |device: &WgpuTextureDevice, id| {
            device.entry(id).expect("entry").base_levels.iter().flatten().count()
        };

        assert_eq!(kept(&device, single), 0, "A single-level texture needs no copy");
        assert_eq!(kept(&device, mipped), 1);

        device.generate_mipmaps(mipped).expect("mipmaps");
        assert_eq!(kept(&device, mipped), 0, "The copy is dropped once the chain is built");
    }

    #[test]
    fn wgpu_texture_device_rejects_bad_uploads_or_skips() {
        let Some(mut device) = create_test_device() else {
            println!("Skipping texture device test: could not create test device.");
            return;
        };

        let ids = device.allocate_ids(1).expect("ids");
        let id = ids[0];
        let upload = ImageUpload {
            face: 0,
            mip_level: 0,
            size: Extent2D::new(4, 4),
            format: TextureFormat::Rgba8Unorm,
            bytes: &[0u8; 64],
        };
        assert_eq!(device.upload_image(id, &upload), Err(ResourceError::NoStorage(id)));

        device
            .allocate_storage(id, &descriptor(TextureKind::CubeMap, 4, 1))
            .expect("storage");
        let wrong_face = ImageUpload { face: 6, ..upload.clone() };
        assert_eq!(device.upload_image(id, &wrong_face), Err(ResourceError::OutOfBounds));
        let short = ImageUpload { bytes: &[0u8; 10], ..upload.clone() };
        assert_eq!(device.upload_image(id, &short), Err(ResourceError::OutOfBounds));
        assert!(device.bind_to_layer(0, TextureKind::D2, id).is_err());
        assert_eq!(
            device.bind_to_layer(u32::MAX, TextureKind::CubeMap, id),
            Err(ResourceError::OutOfBounds)
        );
        assert_eq!(
            device.upload_image(DeviceId(99), &upload),
            Err(ResourceError::InvalidId(DeviceId(99)))
        );
    }

    #[test]
    fn wgpu_texture_device_reports_capabilities_or_skips() {
        let Some(device) = create_test_device() else {
            println!("Skipping texture device test: could not create test device.");
            return;
        };
        let size = device
            .query_capability(DeviceCapability::MaxTextureSize)
            .expect("size");
        assert!(size >= 2048);
        assert!(device.query_capability(DeviceCapability::MaxTextureUnits).expect("units") > 0);
        if device.context().anisotropy_supported {
            assert_eq!(
                device.query_capability(DeviceCapability::MaxAnisotropy),
                Ok(MAX_ANISOTROPY)
            );
        }
    }
}
