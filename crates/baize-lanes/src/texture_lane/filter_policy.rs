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

//! The process-wide texture quality policy.

use baize_core::renderer::{
    FilterMode, MipmapFilterMode, SamplerState, TextureFilter, TextureKind,
};
use thiserror::Error;

/// An error raised when the policy refuses a quality change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FilterPolicyError {
    /// Anisotropic filtering was requested on a device that lacks it.
    #[error("anisotropic filtering is not supported by the device")]
    AnisotropyUnsupported,
}

/// Computes the sampler state of a texture of `kind` under the quality `mode`.
///
/// The kind's ceiling is applied first, so rectangle textures always sample
/// with [`TextureFilter::Basic`]. `level` is clamped to `[0, 1]` and scales
/// `max_anisotropy` when the mode is anisotropic.
pub fn sampler_state(
    kind: TextureKind,
    mode: TextureFilter,
    level: f32,
    max_anisotropy: f32,
) -> SamplerState {
    let (filter, mipmap_filter) = match kind.clamp_filter(mode) {
        TextureFilter::Basic => (FilterMode::Nearest, None),
        TextureFilter::BasicMipMap => (FilterMode::Nearest, Some(MipmapFilterMode::Nearest)),
        TextureFilter::Bilinear => (FilterMode::Linear, Some(MipmapFilterMode::Nearest)),
        TextureFilter::Trilinear | TextureFilter::Anisotropic => {
            (FilterMode::Linear, Some(MipmapFilterMode::Linear))
        }
    };
    let anisotropy = if kind.clamp_filter(mode) == TextureFilter::Anisotropic {
        clamp_level(level) * max_anisotropy.max(0.0)
    } else {
        0.0
    };
    SamplerState {
        min_filter: filter,
        mag_filter: filter,
        mipmap_filter: if kind.supports_mipmaps() { mipmap_filter } else { None },
        anisotropy,
    }
}

fn clamp_level(level: f32) -> f32 {
    if level.is_nan() {
        0.0
    } else {
        level.clamp(0.0, 1.0)
    }
}

/// The active quality level and anisotropy of the texture cache.
///
/// The policy only holds state. Applying it to resident textures is left to
/// the owner, which re-broadcasts whenever a setter reports a change.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterPolicy {
    mode: TextureFilter,
    anisotropic_level: f32,
    anisotropy_supported: bool,
    max_anisotropy: f32,
}

impl FilterPolicy {
    /// Creates a policy at [`TextureFilter::Bilinear`] with full anisotropy.
    ///
    /// `max_anisotropy` is ignored when `anisotropy_supported` is false.
    pub fn new(anisotropy_supported: bool, max_anisotropy: f32) -> Self {
        Self {
            mode: TextureFilter::default(),
            anisotropic_level: 1.0,
            anisotropy_supported,
            max_anisotropy: if anisotropy_supported {
                max_anisotropy.max(1.0)
            } else {
                0.0
            },
        }
    }

    /// The active quality level.
    pub fn mode(&self) -> TextureFilter {
        self.mode
    }

    /// The anisotropy level in `[0, 1]`.
    pub fn anisotropic_level(&self) -> f32 {
        self.anisotropic_level
    }

    /// Whether the device supports anisotropic filtering.
    pub fn anisotropy_supported(&self) -> bool {
        self.anisotropy_supported
    }

    /// The highest anisotropy the device accepts, `0.0` without support.
    pub fn max_anisotropy(&self) -> f32 {
        self.max_anisotropy
    }

    /// Records a new quality level.
    ///
    /// ## Errors
    /// * `FilterPolicyError::AnisotropyUnsupported` - If `mode` is anisotropic
    ///   and the device lacks support. The policy is left unchanged.
    pub fn set_mode(&mut self, mode: TextureFilter) -> Result<(), FilterPolicyError> {
        if mode == TextureFilter::Anisotropic && !self.anisotropy_supported {
            return Err(FilterPolicyError::AnisotropyUnsupported);
        }
        self.mode = mode;
        Ok(())
    }

    /// Records a new anisotropy level, clamped to `[0, 1]`.
    ///
    /// Returns `true` when resident textures must be updated, which is only
    /// the case under the anisotropic mode.
    pub fn set_anisotropic_level(&mut self, level: f32) -> bool {
        self.anisotropic_level = clamp_level(level);
        self.mode == TextureFilter::Anisotropic
    }

    /// The quality level a texture of `kind` actually gets under this policy.
    pub fn effective_mode(&self, kind: TextureKind) -> TextureFilter {
        kind.clamp_filter(self.mode)
    }

    /// The sampler state of a texture of `kind` under this policy.
    pub fn sampler_for(&self, kind: TextureKind) -> SamplerState {
        sampler_state(kind, self.mode, self.anisotropic_level, self.max_anisotropy)
    }

    /// Returns `true` if a texture of `kind` loaded now should get a mip chain.
    pub fn wants_mipmaps(&self, kind: TextureKind) -> bool {
        kind.supports_mipmaps() && self.effective_mode(kind).generates_mipmaps()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sampler_state_follows_the_quality_ladder() {
        let basic = sampler_state(TextureKind::D2, TextureFilter::Basic, 1.0, 16.0);
        assert_eq!(basic.min_filter, FilterMode::Nearest);
        assert_eq!(basic.mipmap_filter, None);

        let basic_mip = sampler_state(TextureKind::D2, TextureFilter::BasicMipMap, 1.0, 16.0);
        assert_eq!(basic_mip.mag_filter, FilterMode::Nearest);
        assert_eq!(basic_mip.mipmap_filter, Some(MipmapFilterMode::Nearest));

        let bilinear = sampler_state(TextureKind::D2, TextureFilter::Bilinear, 1.0, 16.0);
        assert_eq!(bilinear.min_filter, FilterMode::Linear);
        assert_eq!(bilinear.mipmap_filter, Some(MipmapFilterMode::Nearest));

        let trilinear = sampler_state(TextureKind::CubeMap, TextureFilter::Trilinear, 1.0, 16.0);
        assert_eq!(trilinear.mag_filter, FilterMode::Linear);
        assert_eq!(trilinear.mipmap_filter, Some(MipmapFilterMode::Linear));
        assert_relative_eq!(trilinear.anisotropy, 0.0);
    }

    #[test]
    fn test_anisotropy_interpolates_up_to_the_device_maximum() {
        let half = sampler_state(TextureKind::D2, TextureFilter::Anisotropic, 0.5, 16.0);
        assert_relative_eq!(half.anisotropy, 8.0);
        assert_eq!(half.mipmap_filter, Some(MipmapFilterMode::Linear));

        let over = sampler_state(TextureKind::D2, TextureFilter::Anisotropic, 3.0, 16.0);
        assert_relative_eq!(over.anisotropy, 16.0);

        let nan = sampler_state(TextureKind::D2, TextureFilter::Anisotropic, f32::NAN, 16.0);
        assert_relative_eq!(nan.anisotropy, 0.0);
    }

    #[test]
    fn test_rectangle_is_pinned_to_basic() {
        let state = sampler_state(TextureKind::Rectangle, TextureFilter::Anisotropic, 1.0, 16.0);
        assert_eq!(
            state,
            sampler_state(TextureKind::D2, TextureFilter::Basic, 1.0, 16.0)
        );
    }

    #[test]
    fn test_anisotropic_mode_requires_support() {
        let mut policy = FilterPolicy::new(false, 16.0);
        assert_eq!(
            policy.set_mode(TextureFilter::Anisotropic),
            Err(FilterPolicyError::AnisotropyUnsupported)
        );
        assert_eq!(policy.mode(), TextureFilter::Bilinear, "Mode should be unchanged");
        assert_relative_eq!(policy.max_anisotropy(), 0.0);

        let mut supported = FilterPolicy::new(true, 16.0);
        assert!(supported.set_mode(TextureFilter::Anisotropic).is_ok());
        assert_relative_eq!(supported.sampler_for(TextureKind::D2).anisotropy, 16.0);
    }

    #[test]
    fn test_level_change_only_rebroadcasts_under_anisotropic_mode() {
        let mut policy = FilterPolicy::new(true, 8.0);
        policy.set_mode(TextureFilter::Trilinear).unwrap();
        assert!(!policy.set_anisotropic_level(0.25));
        assert_relative_eq!(policy.anisotropic_level(), 0.25);

        policy.set_mode(TextureFilter::Anisotropic).unwrap();
        assert!(policy.set_anisotropic_level(-1.0));
        assert_relative_eq!(policy.anisotropic_level(), 0.0);
    }

    #[test]
    fn test_mipmaps_start_at_bilinear() {
        let mut policy = FilterPolicy::new(false, 0.0);
        policy.set_mode(TextureFilter::BasicMipMap).unwrap();
        assert!(!policy.wants_mipmaps(TextureKind::D2));

        policy.set_mode(TextureFilter::Bilinear).unwrap();
        assert!(policy.wants_mipmaps(TextureKind::D2));
        assert!(policy.wants_mipmaps(TextureKind::CubeMap));
        assert!(!policy.wants_mipmaps(TextureKind::Rectangle));
    }
}
