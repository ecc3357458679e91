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

//! Defines the errors reported by a graphics device at the texture boundary.

use crate::renderer::api::texture::DeviceId;
use crate::renderer::traits::DeviceCapability;
use crate::renderer::TextureFormat;
use std::fmt;

/// An error related to the creation or use of a device texture resource.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceError {
    /// A generic resource could not be found.
    NotFound,
    /// The device id does not name a resource allocated by this device.
    InvalidId(DeviceId),
    /// The device id names a resource that has no storage yet.
    NoStorage(DeviceId),
    /// The device cannot store or process texels of this format.
    UnsupportedFormat(TextureFormat),
    /// The device cannot report the requested capability.
    UnsupportedCapability(DeviceCapability),
    /// The device could not provide any more resources.
    Exhausted,
    /// An attempt was made to access a resource out of its bounds
    /// (a face, a mip level or a binding layer).
    OutOfBounds,
    /// An error originating from the specific graphics backend implementation.
    BackendError(String),
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::NotFound => write!(f, "Resource not found."),
            ResourceError::InvalidId(id) => write!(f, "Invalid device texture id: {id:?}"),
            ResourceError::NoStorage(id) => {
                write!(f, "Device texture {id:?} has no storage allocated")
            }
            ResourceError::UnsupportedFormat(format) => {
                write!(f, "Texture format not supported by the device: {format:?}")
            }
            ResourceError::UnsupportedCapability(capability) => {
                write!(f, "Device capability not available: {capability:?}")
            }
            ResourceError::Exhausted => write!(f, "Device resources exhausted."),
            ResourceError::OutOfBounds => write!(f, "Resource access out of bounds."),
            ResourceError::BackendError(msg) => {
                write!(f, "Backend-specific resource error: {msg}")
            }
        }
    }
}

impl std::error::Error for ResourceError {}
