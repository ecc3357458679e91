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

//! Errors and results reported by the texture cache.

use baize_core::asset::ImageSourceError;
use baize_core::renderer::ResourceError;
use thiserror::Error;

/// An error returned by a [`TextureManager`](super::TextureManager) operation.
///
/// A failed load always leaves the cache as it was before the call, except for
/// the textures evicted to make room before a device failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TextureError {
    /// An argument was rejected before touching the device.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The handle or image name is unknown.
    #[error("not found: {0}")]
    NotFound(String),
    /// The texture cannot fit in the byte budget.
    #[error("texture of {requested} bytes does not fit in the budget of {budget} bytes")]
    AllocationExhausted {
        /// Bytes the texture would occupy.
        requested: u64,
        /// The configured budget.
        budget: u64,
    },
    /// The graphics device reported an error.
    #[error("device error: {0}")]
    Device(#[from] ResourceError),
}

impl From<ImageSourceError> for TextureError {
    fn from(err: ImageSourceError) -> Self {
        match err {
            ImageSourceError::NotFound { name } => TextureError::NotFound(name),
            other => TextureError::InvalidArgument(other.to_string()),
        }
    }
}

/// The result of asking the cache to evict its least recently used texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnloadOutcome {
    /// A texture was evicted, freeing this many bytes.
    Freed(u64),
    /// The cache was empty.
    NothingToEvict,
}
