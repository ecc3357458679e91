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

//! An image source holding already-decoded images in memory.

use baize_core::asset::{ImageSource, ImageSourceError, SourceImage};
use std::collections::HashMap;

/// A map from names to decoded images.
///
/// Useful for procedurally generated textures and for tests. Fetching clones
/// the stored image.
#[derive(Debug, Clone, Default)]
pub struct MemoryImageSource {
    images: HashMap<String, SourceImage>,
}

impl MemoryImageSource {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `image` under `name`, returning the image it replaces.
    pub fn insert(&mut self, name: impl Into<String>, image: SourceImage) -> Option<SourceImage> {
        self.images.insert(name.into(), image)
    }

    /// Removes the image registered under `name`.
    pub fn remove(&mut self, name: &str) -> Option<SourceImage> {
        self.images.remove(name)
    }

    /// Returns `true` if an image is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.images.contains_key(name)
    }
}

impl ImageSource for MemoryImageSource {
    fn fetch(&self, name: &str) -> Result<SourceImage, ImageSourceError> {
        self.images
            .get(name)
            .cloned()
            .ok_or_else(|| ImageSourceError::NotFound {
                name: name.to_owned(),
            })
    }
}
