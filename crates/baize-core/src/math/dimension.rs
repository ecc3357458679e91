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

//! Extents used to describe texture sizes.

/// A two-dimensional size in texels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Extent2D {
    /// The width component of the extent.
    pub width: u32,
    /// The height component of the extent.
    pub height: u32,
}

impl Extent2D {
    /// Creates a new extent.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns `true` if either component is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns the larger of the two components.
    pub fn max_side(&self) -> u32 {
        self.width.max(self.height)
    }

    /// Returns the extent of the next mip level (each side halved, never below 1).
    pub fn next_mip(&self) -> Self {
        Self {
            width: (self.width / 2).max(1),
            height: (self.height / 2).max(1),
        }
    }

    /// Returns the number of levels in a full mip chain down to 1x1.
    pub fn mip_level_count(&self) -> u32 {
        32 - self.max_side().max(1).leading_zeros()
    }
}

/// A three-dimensional size, where the third component is either a depth or
/// a number of array layers (six for a cube map).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Extent3D {
    /// The width component of the extent.
    pub width: u32,
    /// The height component of the extent.
    pub height: u32,
    /// The depth or number of array layers.
    pub depth_or_array_layers: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mip_level_count_for_power_of_two_and_odd_sizes() {
        assert_eq!(Extent2D::new(1, 1).mip_level_count(), 1);
        assert_eq!(Extent2D::new(256, 256).mip_level_count(), 9);
        assert_eq!(Extent2D::new(256, 16).mip_level_count(), 9);
        assert_eq!(Extent2D::new(300, 7).mip_level_count(), 9);
    }

    #[test]
    fn test_next_mip_never_reaches_zero() {
        let level = Extent2D::new(4, 1).next_mip();
        assert_eq!(level, Extent2D::new(2, 1));
        assert_eq!(level.next_mip().next_mip(), Extent2D::new(1, 1));
    }
}
