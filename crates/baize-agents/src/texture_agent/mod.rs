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

//! Acts as the **[A]gent** for GPU textures.
//!
//! The [`TextureManager`] turns named images into device-resident textures,
//! deduplicates them by name, keeps their total size under a byte budget by
//! evicting the least recently used texture, and applies the process-wide
//! filtering quality to every resident texture.
//!
//! The manager is single-threaded: it is driven from the thread that owns the
//! graphics device. Hosts that need to share it wrap it in one external mutex.

mod error;
mod eviction;
mod loaders;
mod manager;

pub use error::{TextureError, UnloadOutcome};
pub use manager::{TextureCacheStats, TextureManager};
