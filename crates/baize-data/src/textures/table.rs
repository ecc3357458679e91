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

//! The table of resident textures, its name index and the logical clock
//! that orders texture accesses.

use baize_core::math::Extent2D;
use baize_core::renderer::{
    AddressMode, DeviceId, FilterMode, MipmapFilterMode, SamplerState, TextureFilter,
    TextureFormat, TextureHandle, TextureKind,
};
use std::collections::{BTreeMap, HashMap};

/// Returns the number of bytes a texture occupies on the device, summed over
/// every face and every level of its mip chain.
pub fn footprint_bytes(
    size: Extent2D,
    format: TextureFormat,
    faces: u32,
    mip_levels: u32,
) -> u64 {
    let bpp = format.bytes_per_pixel() as u64;
    let mut level = size;
    let mut total = 0u64;
    for _ in 0..mip_levels.max(1) {
        total += level.width as u64 * level.height as u64 * bpp;
        level = level.next_mip();
    }
    total * faces as u64
}

/// The record kept for every resident texture.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureElement {
    handle: TextureHandle,
    source_name: String,
    last_access: u64,
    byte_footprint: u64,
    /// The device resource holding the texels.
    pub device_id: DeviceId,
    /// The kind of texture, fixed at load time.
    pub kind: TextureKind,
    /// The size of the base level.
    pub size: Extent2D,
    /// The texel format.
    pub format: TextureFormat,
    /// The number of levels in the mip chain, `1` without mipmaps.
    pub mip_levels: u32,
    /// The wrap mode applied on every coordinate.
    pub wrap_mode: AddressMode,
    /// The quality level the sampler state was computed from.
    pub filter: TextureFilter,
    /// Minification filter.
    pub min_filter: FilterMode,
    /// Magnification filter.
    pub mag_filter: FilterMode,
    /// Filter between mip levels, `None` when mipmaps are not sampled.
    pub mipmap_filter: Option<MipmapFilterMode>,
    /// Anisotropy applied by the sampler, `0.0` when disabled.
    pub anisotropy: f32,
}

impl TextureElement {
    /// Creates a record for a texture stored in `device_id`.
    ///
    /// The byte footprint is derived from the size, format, kind and mip chain
    /// and cannot change afterwards. The record starts with nearest filtering
    /// and clamped wrapping; the handle and name are assigned on insertion.
    pub fn new(
        device_id: DeviceId,
        kind: TextureKind,
        size: Extent2D,
        format: TextureFormat,
        mip_levels: u32,
    ) -> Self {
        let mip_levels = mip_levels.max(1);
        Self {
            handle: TextureHandle(0),
            source_name: String::new(),
            last_access: 0,
            byte_footprint: footprint_bytes(size, format, kind.face_count(), mip_levels),
            device_id,
            kind,
            size,
            format,
            mip_levels,
            wrap_mode: AddressMode::ClampToEdge,
            filter: TextureFilter::Basic,
            min_filter: FilterMode::Nearest,
            mag_filter: FilterMode::Nearest,
            mipmap_filter: None,
            anisotropy: 0.0,
        }
    }

    /// The public handle of the texture.
    pub fn handle(&self) -> TextureHandle {
        self.handle
    }

    /// The name the texture was loaded under, empty for anonymous textures.
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// The logical tick of the last load or bind of this texture.
    pub fn last_access(&self) -> u64 {
        self.last_access
    }

    /// Bytes occupied on the device.
    pub fn byte_footprint(&self) -> u64 {
        self.byte_footprint
    }

    /// The sampler state currently applied to the texture.
    pub fn sampler_state(&self) -> SamplerState {
        SamplerState {
            min_filter: self.min_filter,
            mag_filter: self.mag_filter,
            mipmap_filter: self.mipmap_filter,
            anisotropy: self.anisotropy,
        }
    }

    /// Records a new quality level and the sampler state derived from it.
    pub fn apply_filter(&mut self, filter: TextureFilter, sampler: &SamplerState) {
        self.filter = filter;
        self.min_filter = sampler.min_filter;
        self.mag_filter = sampler.mag_filter;
        self.mipmap_filter = sampler.mipmap_filter;
        self.anisotropy = sampler.anisotropy;
    }
}

/// Resident textures keyed by handle, with a name index for deduplication.
///
/// Handles come from a counter that starts at 1 and never goes back, so a
/// handle that was removed never names another texture. Every named entry
/// has exactly one name in the index; anonymous entries (empty name) have none.
#[derive(Debug)]
pub struct TextureTable {
    entries: BTreeMap<TextureHandle, TextureElement>,
    names: HashMap<String, TextureHandle>,
    next_handle: u64,
    clock: u64,
}

impl TextureTable {
    /// Creates an empty table with the clock at zero.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            names: HashMap::new(),
            next_handle: 1,
            clock: 0,
        }
    }

    /// Advances the logical clock and returns the new tick.
    pub fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// The current logical tick.
    pub fn now(&self) -> u64 {
        self.clock
    }

    /// Inserts `element` under a fresh handle, stamped with the current tick.
    ///
    /// An empty `name` inserts an anonymous texture that the name index never
    /// returns. Inserting a name that is already indexed re-points the name to
    /// the new handle.
    pub fn insert(&mut self, name: &str, mut element: TextureElement) -> TextureHandle {
        let handle = TextureHandle(self.next_handle);
        self.next_handle += 1;

        element.handle = handle;
        element.source_name = name.to_owned();
        element.last_access = self.clock;

        if !name.is_empty() {
            if let Some(previous) = self.names.insert(name.to_owned(), handle) {
                // The old entry stays resident but loses its name.
                if let Some(old) = self.entries.get_mut(&previous) {
                    old.source_name.clear();
                }
            }
        }
        self.entries.insert(handle, element);
        handle
    }

    /// Removes a texture from both indices and returns its record.
    pub fn remove(&mut self, handle: TextureHandle) -> Option<TextureElement> {
        let element = self.entries.remove(&handle)?;
        if !element.source_name.is_empty() {
            self.names.remove(&element.source_name);
        }
        Some(element)
    }

    /// Looks up the handle registered under `name`.
    pub fn find_by_name(&self, name: &str) -> Option<TextureHandle> {
        if name.is_empty() {
            return None;
        }
        self.names.get(name).copied()
    }

    /// Looks up a texture, optionally marking it as used at the current tick.
    ///
    /// This is the only way the recency of a texture changes after its load.
    pub fn find_by_handle(
        &mut self,
        handle: TextureHandle,
        touch: bool,
    ) -> Option<&TextureElement> {
        let now = self.clock;
        let element = self.entries.get_mut(&handle)?;
        if touch {
            element.last_access = now;
        }
        Some(element)
    }

    /// Looks up a texture without changing its recency.
    pub fn get(&self, handle: TextureHandle) -> Option<&TextureElement> {
        self.entries.get(&handle)
    }

    /// Returns `true` if `handle` names a resident texture.
    pub fn contains(&self, handle: TextureHandle) -> bool {
        self.entries.contains_key(&handle)
    }

    /// The least recently used texture: smallest last access, then smallest handle.
    pub fn lru_candidate(&self) -> Option<TextureHandle> {
        self.entries
            .values()
            .min_by_key(|element| (element.last_access, element.handle))
            .map(|element| element.handle)
    }

    /// Iterates over every resident texture in handle order.
    pub fn iter(&self) -> impl Iterator<Item = &TextureElement> {
        self.entries.values()
    }

    /// Iterates mutably over every resident texture in handle order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut TextureElement> {
        self.entries.values_mut()
    }

    /// The number of resident textures.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no texture is resident.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Empties both indices and returns the removed records.
    ///
    /// The handle counter and the clock keep running.
    pub fn clear(&mut self) -> Vec<TextureElement> {
        self.names.clear();
        std::mem::take(&mut self.entries).into_values().collect()
    }
}

impl Default for TextureTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(id: u32) -> TextureElement {
        TextureElement::new(
            DeviceId(id),
            TextureKind::D2,
            Extent2D::new(4, 4),
            TextureFormat::Rgba8Unorm,
            1,
        )
    }

    #[test]
    fn test_footprint_sums_the_mip_chain_and_faces() {
        let size = Extent2D::new(4, 2);
        // 4x2 + 2x1 + 1x1 texels at 4 bytes each.
        assert_eq!(footprint_bytes(size, TextureFormat::Rgba8Unorm, 1, 3), (8 + 2 + 1) * 4);
        assert_eq!(footprint_bytes(size, TextureFormat::R8Unorm, 6, 1), 8 * 6);
        assert_eq!(footprint_bytes(size, TextureFormat::R8Unorm, 1, 0), 8);
    }

    #[test]
    fn test_insert_assigns_increasing_handles_and_indexes_names() {
        let mut table = TextureTable::new();
        let a = table.insert("felt.png", element(0));
        let b = table.insert("", element(1));

        assert_eq!(a, TextureHandle(1));
        assert_eq!(b, TextureHandle(2));
        assert_eq!(table.find_by_name("felt.png"), Some(a));
        assert_eq!(table.find_by_name(""), None, "Anonymous textures are never indexed");
        assert_eq!(table.get(a).map(|e| e.source_name()), Some("felt.png"));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_removed_handles_are_never_reused() {
        let mut table = TextureTable::new();
        let a = table.insert("a", element(0));
        let removed = table.remove(a).expect("Texture should be resident");
        assert_eq!(removed.device_id, DeviceId(0));
        assert_eq!(table.find_by_name("a"), None);
        assert!(table.remove(a).is_none(), "Second removal should be a no-op");

        let b = table.insert("a", element(0));
        assert_ne!(a, b, "A dead handle must not come back");
        assert!(!table.contains(a));
    }

    #[test]
    fn test_touch_is_the_only_recency_update() {
        let mut table = TextureTable::new();
        table.tick();
        let a = table.insert("a", element(0));
        table.tick();
        let b = table.insert("b", element(1));
        assert_eq!(table.lru_candidate(), Some(a));

        table.tick();
        table.find_by_handle(a, false);
        assert_eq!(table.lru_candidate(), Some(a), "Lookup without touch keeps recency");

        table.find_by_handle(a, true);
        assert_eq!(table.get(a).map(|e| e.last_access()), Some(3));
        assert_eq!(table.lru_candidate(), Some(b));
    }

    #[test]
    fn test_lru_ties_break_on_smallest_handle() {
        let mut table = TextureTable::new();
        table.tick();
        let a = table.insert("a", element(0));
        let _b = table.insert("b", element(1));
        assert_eq!(table.lru_candidate(), Some(a));
    }

    #[test]
    fn test_clear_empties_both_indices() {
        let mut table = TextureTable::new();
        table.insert("a", element(0));
        table.insert("b", element(1));

        let removed = table.clear();
        assert_eq!(removed.len(), 2);
        assert!(table.is_empty());
        assert_eq!(table.find_by_name("a"), None);
        assert_eq!(table.lru_candidate(), None);
        assert_eq!(table.insert("c", element(2)), TextureHandle(3));
    }

    #[test]
    fn test_reinserting_a_name_drops_the_old_index_entry() {
        let mut table = TextureTable::new();
        let old = table.insert("a", element(0));
        let new = table.insert("a", element(1));
        assert_eq!(table.find_by_name("a"), Some(new));

        table.remove(old);
        assert_eq!(table.find_by_name("a"), Some(new), "Removing the old entry keeps the new name");
    }
}
