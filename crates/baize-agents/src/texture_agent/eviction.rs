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

//! Least-recently-used eviction under the byte budget.

use super::error::{TextureError, UnloadOutcome};
use super::manager::TextureManager;
use baize_core::asset::ImageSource;
use baize_core::renderer::TextureDevice;

impl<D: TextureDevice, S: ImageSource> TextureManager<D, S> {
    /// Evicts the least recently used texture.
    ///
    /// The victim is the texture with the oldest load or bind; ties go to the
    /// oldest handle.
    pub fn unload_lru_texture(&mut self) -> UnloadOutcome {
        self.table.tick();
        match self.evict_one() {
            Some(freed) => UnloadOutcome::Freed(freed),
            None => UnloadOutcome::NothingToEvict,
        }
    }

    /// Fails when a texture of `incoming` bytes could never fit, even in an
    /// empty cache.
    pub(super) fn check_fits_budget(&self, incoming: u64) -> Result<(), TextureError> {
        let budget = self.max_budget_bytes;
        if budget != 0 && incoming > budget {
            return Err(TextureError::AllocationExhausted {
                requested: incoming,
                budget,
            });
        }
        Ok(())
    }

    /// Evicts textures until `incoming` more bytes fit in the budget.
    ///
    /// Nothing is evicted when the texture is larger than the whole budget.
    pub(super) fn make_room(&mut self, incoming: u64) -> Result<(), TextureError> {
        self.check_fits_budget(incoming)?;
        let budget = self.max_budget_bytes;
        if budget == 0 {
            return Ok(());
        }
        while self.used_bytes + incoming > budget {
            if self.evict_one().is_none() {
                return Err(TextureError::AllocationExhausted {
                    requested: incoming,
                    budget,
                });
            }
        }
        Ok(())
    }

    fn evict_one(&mut self) -> Option<u64> {
        let handle = self.table.lru_candidate()?;
        let element = self.table.remove(handle)?;
        let freed = self.release_element(&element);
        self.evictions += 1;
        log::info!(
            "TextureManager: Evicted texture {handle} '{}' ({freed} bytes, last used at tick {})",
            element.source_name(),
            element.last_access()
        );
        Some(freed)
    }
}
