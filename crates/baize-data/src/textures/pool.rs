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

//! A pool of pre-allocated device texture ids.

use baize_core::renderer::{DeviceId, ResourceError, TextureDevice};
use std::collections::HashSet;

/// The default number of ids requested from the device per batch.
pub const DEFAULT_EXTEND_SIZE: usize = 10;

/// Hands out device texture ids, growing in batches when it runs dry.
///
/// Ids are partitioned into a free list and an in-use set. Releasing an id
/// puts it back on the free list without destroying it, so the next load can
/// reuse it without a round trip to the device.
#[derive(Debug)]
pub struct DeviceResourcePool {
    /// Ids ready to be handed out. The last one is handed out first.
    free: Vec<DeviceId>,
    in_use: HashSet<DeviceId>,
    extend_size: usize,
}

impl DeviceResourcePool {
    /// Creates an empty pool. `extend_size` is clamped to at least one.
    pub fn new(extend_size: usize) -> Self {
        Self {
            free: Vec::new(),
            in_use: HashSet::new(),
            extend_size: extend_size.max(1),
        }
    }

    /// The number of ids requested from the device per batch.
    pub fn extend_size(&self) -> usize {
        self.extend_size
    }

    /// The number of ids waiting on the free list.
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// The number of ids currently handed out.
    pub fn in_use_count(&self) -> usize {
        self.in_use.len()
    }

    /// Returns `true` if `id` is currently handed out by this pool.
    pub fn is_in_use(&self, id: DeviceId) -> bool {
        self.in_use.contains(&id)
    }

    /// Allocates one batch of ids from the device onto the free list.
    ///
    /// ## Errors
    /// * `ResourceError` - If the device refuses the allocation or returns no ids.
    pub fn reserve(&mut self, device: &mut dyn TextureDevice) -> Result<(), ResourceError> {
        let ids = device.allocate_ids(self.extend_size)?;
        if ids.is_empty() {
            return Err(ResourceError::Exhausted);
        }
        log::debug!(
            "DeviceResourcePool: Reserved {} device ids ({} free)",
            ids.len(),
            self.free.len() + ids.len()
        );
        // Keep the lowest ids at the end so they are handed out first.
        self.free.extend(ids.into_iter().rev());
        Ok(())
    }

    /// Takes a free id, growing the pool by one batch if none is left.
    ///
    /// ## Errors
    /// * `ResourceError` - If the pool is empty and the device cannot grow it.
    pub fn acquire(&mut self, device: &mut dyn TextureDevice) -> Result<DeviceId, ResourceError> {
        if self.free.is_empty() {
            self.reserve(device)?;
        }
        let id = self.free.pop().ok_or(ResourceError::Exhausted)?;
        self.in_use.insert(id);
        Ok(id)
    }

    /// Puts an id back on the free list. Ids this pool did not hand out are ignored.
    pub fn release(&mut self, id: DeviceId) {
        if self.in_use.remove(&id) {
            self.free.push(id);
        } else {
            log::warn!("DeviceResourcePool: Ignoring release of foreign id {id:?}");
        }
    }

    /// Destroys every id of the pool on the device and empties both lists.
    pub fn release_all(&mut self, device: &mut dyn TextureDevice) {
        let mut ids: Vec<DeviceId> = self.free.drain(..).collect();
        ids.extend(self.in_use.drain());
        if ids.is_empty() {
            return;
        }
        ids.sort_unstable();
        device.release_ids(&ids);
        log::debug!("DeviceResourcePool: Destroyed {} device ids", ids.len());
    }
}

impl Default for DeviceResourcePool {
    fn default() -> Self {
        Self::new(DEFAULT_EXTEND_SIZE)
    }
}
