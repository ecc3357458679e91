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

//! The texture cache itself: construction, lookups, binding, unloading and
//! the filter broadcast. Loading lives in `loaders`, eviction in `eviction`.

use super::error::TextureError;
use baize_core::asset::ImageSource;
use baize_core::renderer::{
    DeviceCapability, DeviceId, TextureCacheSettings, TextureDevice, TextureFilter, TextureHandle,
    TextureKind,
};
use baize_data::textures::{DeviceResourcePool, TextureElement, TextureTable};
use baize_lanes::texture_lane::FilterPolicy;

/// A snapshot of the cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextureCacheStats {
    /// Number of resident textures.
    pub resident_textures: usize,
    /// Bytes used by resident textures.
    pub used_bytes: u64,
    /// The configured budget, `0` when unlimited.
    pub max_budget_bytes: u64,
    /// Textures uploaded since the cache was created.
    pub loads: u64,
    /// Loads answered by an already resident texture.
    pub dedup_hits: u64,
    /// Textures evicted to respect the budget, including explicit LRU unloads.
    pub evictions: u64,
    /// Device ids waiting in the pool.
    pub pool_free: usize,
    /// Device ids backing resident textures.
    pub pool_in_use: usize,
}

/// The GPU texture cache.
///
/// Textures are identified by a [`TextureHandle`] that is never reused. Named
/// loads are deduplicated: loading a name that is already resident returns the
/// existing handle without touching the device, the budget or the recency of
/// the texture. Recency is only updated by [`bind`](Self::bind).
///
/// When `max_budget_bytes` is non-zero, the sum of resident footprints never
/// exceeds it after a call returns.
#[derive(Debug)]
pub struct TextureManager<D: TextureDevice, S: ImageSource> {
    pub(super) device: D,
    pub(super) source: S,
    pub(super) table: TextureTable,
    pub(super) pool: DeviceResourcePool,
    pub(super) policy: FilterPolicy,
    pub(super) max_budget_bytes: u64,
    pub(super) used_bytes: u64,
    pub(super) verbose_diagnostics: bool,
    max_texture_units: u32,
    pub(super) max_texture_size: u32,
    pub(super) loads: u64,
    pub(super) dedup_hits: u64,
    pub(super) evictions: u64,
}

impl<D: TextureDevice, S: ImageSource> TextureManager<D, S> {
    /// Creates the cache, probing the device capabilities and reserving the
    /// first batch of device ids.
    ///
    /// A requested anisotropic mode falls back to trilinear filtering on
    /// devices without anisotropy.
    ///
    /// ## Errors
    /// * `TextureError::Device` - If a capability query or the first pool
    ///   allocation fails.
    pub fn new(
        mut device: D,
        source: S,
        settings: TextureCacheSettings,
    ) -> Result<Self, TextureError> {
        let anisotropy_supported =
            device.query_capability(DeviceCapability::AnisotropicFiltering)? != 0;
        let max_anisotropy = if anisotropy_supported {
            device.query_capability(DeviceCapability::MaxAnisotropy)?
        } else {
            0
        };
        let max_texture_units = device.query_capability(DeviceCapability::MaxTextureUnits)?;
        let max_texture_size = device.query_capability(DeviceCapability::MaxTextureSize)?;

        let mut policy = FilterPolicy::new(anisotropy_supported, max_anisotropy as f32);
        if policy.set_mode(settings.filter_mode).is_err() {
            log::warn!(
                "TextureManager: {:?} filtering unavailable, using Trilinear",
                settings.filter_mode
            );
            policy.set_mode(TextureFilter::Trilinear).ok();
        }
        policy.set_anisotropic_level(settings.anisotropic_level);

        let mut pool = DeviceResourcePool::new(settings.pool_extend_size);
        pool.reserve(&mut device)?;

        log::info!(
            "TextureManager: Created (budget: {} bytes, units: {}, max size: {}, anisotropy: {})",
            settings.max_budget_bytes,
            max_texture_units,
            max_texture_size,
            if anisotropy_supported {
                format!("x{max_anisotropy}")
            } else {
                "unsupported".to_string()
            }
        );

        Ok(Self {
            device,
            source,
            table: TextureTable::new(),
            pool,
            policy,
            max_budget_bytes: settings.max_budget_bytes,
            used_bytes: 0,
            verbose_diagnostics: settings.verbose_diagnostics,
            max_texture_units,
            max_texture_size,
            loads: 0,
            dedup_hits: 0,
            evictions: 0,
        })
    }

    /// Binds a texture to a texture layer, marking it as recently used.
    ///
    /// Returns `false` when the handle is unknown, the layer is beyond
    /// [`max_texture_units`](Self::max_texture_units), `target` is not the kind
    /// the texture was loaded as, or the device rejects the bind. A known
    /// handle is marked as used even when the bind is then rejected.
    pub fn bind(&mut self, handle: TextureHandle, target: TextureKind, layer: u32) -> bool {
        self.table.tick();
        let Some(element) = self.table.find_by_handle(handle, true) else {
            log::warn!("TextureManager: Cannot bind unknown texture {handle}");
            return false;
        };
        let (kind, device_id) = (element.kind, element.device_id);

        if layer >= self.max_texture_units {
            log::warn!(
                "TextureManager: Layer {layer} out of range (max {}) for texture {handle}",
                self.max_texture_units
            );
            return false;
        }
        if kind != target {
            log::warn!("TextureManager: Texture {handle} is {kind:?}, cannot bind as {target:?}");
            return false;
        }

        if let Err(e) = self.device.bind_to_layer(layer, kind, device_id) {
            log::error!("TextureManager: Failed to bind texture {handle}: {e}");
            return false;
        }
        if self.check_device().is_err() {
            return false;
        }
        log::debug!("TextureManager: Bound texture {handle} to layer {layer}");
        true
    }

    /// Returns `true` if `handle` names a resident texture.
    pub fn contains(&self, handle: TextureHandle) -> bool {
        self.table.contains(handle)
    }

    /// Returns `true` if a texture is resident under `name`.
    pub fn contains_name(&self, name: &str) -> bool {
        self.table.find_by_name(name).is_some()
    }

    /// The handle of the texture resident under `name`.
    pub fn handle_by_name(&self, name: &str) -> Option<TextureHandle> {
        self.table.find_by_name(name)
    }

    /// The device resource backing `handle`.
    pub fn device_id(&self, handle: TextureHandle) -> Option<DeviceId> {
        self.table.get(handle).map(|element| element.device_id)
    }

    /// The record of a resident texture. Does not mark it as used.
    pub fn element(&self, handle: TextureHandle) -> Option<&TextureElement> {
        self.table.get(handle)
    }

    /// Unloads a texture and returns the bytes it occupied.
    ///
    /// ## Errors
    /// * `TextureError::NotFound` - If the handle is not resident.
    pub fn unload_texture(&mut self, handle: TextureHandle) -> Result<u64, TextureError> {
        self.table.tick();
        let element = self
            .table
            .remove(handle)
            .ok_or_else(|| TextureError::NotFound(format!("texture {handle}")))?;
        let freed = self.release_element(&element);
        log::info!(
            "TextureManager: Unloaded texture {handle} '{}' ({freed} bytes)",
            element.source_name()
        );
        Ok(freed)
    }

    /// Unloads every texture and destroys every device resource of the cache.
    ///
    /// Calling it on an empty cache does nothing. The cache stays usable.
    pub fn free_all(&mut self) {
        let removed = self.table.clear();
        self.pool.release_all(&mut self.device);
        self.used_bytes = 0;
        if !removed.is_empty() {
            log::info!("TextureManager: Freed all {} textures", removed.len());
        }
    }

    /// Changes the filtering quality of every resident texture and of future
    /// loads. The mip chains of resident textures are not rebuilt.
    ///
    /// ## Errors
    /// * `TextureError::InvalidArgument` - If `mode` is anisotropic and the
    ///   device lacks support.
    /// * `TextureError::Device` - If the device rejects a sampler update. Every
    ///   other texture is still updated.
    pub fn set_filter_mode(&mut self, mode: TextureFilter) -> Result<(), TextureError> {
        self.policy
            .set_mode(mode)
            .map_err(|e| TextureError::InvalidArgument(e.to_string()))?;
        log::info!("TextureManager: Filter mode set to {mode:?}");
        self.broadcast_filter()
    }

    /// Changes the anisotropy level, clamped to `[0, 1]`. Resident textures are
    /// only updated under the anisotropic mode.
    ///
    /// ## Errors
    /// * `TextureError::Device` - If the device rejects a sampler update.
    pub fn set_anisotropic_level(&mut self, level: f32) -> Result<(), TextureError> {
        if self.policy.set_anisotropic_level(level) {
            log::info!(
                "TextureManager: Anisotropic level set to {}",
                self.policy.anisotropic_level()
            );
            self.broadcast_filter()
        } else {
            Ok(())
        }
    }

    /// Recomputes and applies the sampler state of every resident texture.
    fn broadcast_filter(&mut self) -> Result<(), TextureError> {
        let mut first_error = None;
        for element in self.table.iter_mut() {
            let filter = self.policy.effective_mode(element.kind);
            let sampler = self.policy.sampler_for(element.kind);
            element.apply_filter(filter, &sampler);
            if let Err(e) = self.device.set_filter(element.device_id, &sampler) {
                log::error!(
                    "TextureManager: Failed to update filter of texture {}: {e}",
                    element.handle()
                );
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e.into()),
            None => self.check_device(),
        }
    }

    /// Reports the oldest pending device error when diagnostics are enabled.
    pub(super) fn check_device(&mut self) -> Result<(), TextureError> {
        if !self.verbose_diagnostics {
            return Ok(());
        }
        match self.device.take_error() {
            Some(e) => {
                log::error!("TextureManager: Device error: {e}");
                Err(e.into())
            }
            None => Ok(()),
        }
    }

    /// Returns the device id of a removed element to the pool and updates the budget.
    pub(super) fn release_element(&mut self, element: &TextureElement) -> u64 {
        self.pool.release(element.device_id);
        let freed = element.byte_footprint();
        self.used_bytes = self.used_bytes.saturating_sub(freed);
        freed
    }

    /// A snapshot of the cache counters.
    pub fn stats(&self) -> TextureCacheStats {
        TextureCacheStats {
            resident_textures: self.table.len(),
            used_bytes: self.used_bytes,
            max_budget_bytes: self.max_budget_bytes,
            loads: self.loads,
            dedup_hits: self.dedup_hits,
            evictions: self.evictions,
            pool_free: self.pool.free_count(),
            pool_in_use: self.pool.in_use_count(),
        }
    }

    /// Bytes used by resident textures.
    pub fn used_bytes(&self) -> u64 {
        self.used_bytes
    }

    /// The byte budget, `0` when unlimited.
    pub fn max_budget_bytes(&self) -> u64 {
        self.max_budget_bytes
    }

    /// Number of texture layers that can be bound at once.
    pub fn max_texture_units(&self) -> u32 {
        self.max_texture_units
    }

    /// Largest accepted width or height.
    pub fn max_texture_size(&self) -> u32 {
        self.max_texture_size
    }

    /// The active filter mode.
    pub fn filter_mode(&self) -> TextureFilter {
        self.policy.mode()
    }

    /// The anisotropy level in `[0, 1]`.
    pub fn anisotropic_level(&self) -> f32 {
        self.policy.anisotropic_level()
    }

    /// Whether the device supports anisotropic filtering.
    pub fn anisotropy_supported(&self) -> bool {
        self.policy.anisotropy_supported()
    }

    /// The graphics device.
    pub fn device(&self) -> &D {
        &self.device
    }

    /// The graphics device, mutably, for operations the cache does not wrap.
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// The image source named loads are fetched from.
    pub fn image_source(&self) -> &S {
        &self.source
    }

    /// The image source, mutably, to register new images.
    pub fn image_source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

impl<D: TextureDevice, S: ImageSource> Drop for TextureManager<D, S> {
    fn drop(&mut self) {
        self.free_all();
    }
}
