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

//! Engine-level configuration of the texture cache.

use crate::renderer::api::texture::TextureFilter;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration of the texture cache, fixed when the cache is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureCacheSettings {
    /// The GPU memory budget in bytes. `0` disables the budget.
    pub max_budget_bytes: u64,
    /// How many device ids the resource pool allocates per batch.
    pub pool_extend_size: usize,
    /// Checks the device for errors after every upload and bind. Slow.
    pub verbose_diagnostics: bool,
    /// The quality level active when the cache starts.
    pub filter_mode: TextureFilter,
    /// The anisotropy level in `[0, 1]`, used when `filter_mode` is anisotropic.
    pub anisotropic_level: f32,
}

impl Default for TextureCacheSettings {
    fn default() -> Self {
        Self {
            max_budget_bytes: 0,
            pool_extend_size: 10,
            verbose_diagnostics: false,
            filter_mode: TextureFilter::Bilinear,
            anisotropic_level: 1.0,
        }
    }
}

impl TextureCacheSettings {
    /// Creates settings with the given budget and every other field at its default.
    pub fn with_budget(max_budget_bytes: u64) -> Self {
        Self {
            max_budget_bytes,
            ..Self::default()
        }
    }

    /// Load settings from a JSON string. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load settings from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&content)?)
    }

    /// Save settings to a JSON file.
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = TextureCacheSettings::from_json(r#"{ "max_budget_bytes": 4096 }"#)
            .expect("partial settings should parse");
        assert_eq!(settings.max_budget_bytes, 4096);
        assert_eq!(settings.pool_extend_size, 10);
        assert_eq!(settings.filter_mode, TextureFilter::Bilinear);
        assert_relative_eq!(settings.anisotropic_level, 1.0);
    }

    #[test]
    fn test_filter_mode_parses_by_name() {
        let settings = TextureCacheSettings::from_json(
            r#"{ "filter_mode": "Trilinear", "verbose_diagnostics": true }"#,
        )
        .expect("settings should parse");
        assert_eq!(settings.filter_mode, TextureFilter::Trilinear);
        assert!(settings.verbose_diagnostics);
    }

    #[test]
    fn test_settings_round_trip_through_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("textures.json");
        let settings = TextureCacheSettings {
            anisotropic_level: 0.5,
            ..TextureCacheSettings::with_budget(1 << 20)
        };
        settings.to_file(&path).expect("settings should be written");

        let loaded = TextureCacheSettings::from_file(&path).expect("settings should load");
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_unknown_filter_mode_is_rejected() {
        assert!(TextureCacheSettings::from_json(r#"{ "filter_mode": "Ultra" }"#).is_err());
    }
}
