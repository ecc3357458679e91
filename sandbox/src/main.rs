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

// Baize Sandbox
// Loads a billiard table's textures into a headless texture cache and reports
// what stayed resident.

use std::path::PathBuf;

use anyhow::Result;
use baize_agents::texture_agent::{TextureError, TextureManager, UnloadOutcome};
use baize_core::asset::SourceImage;
use baize_core::renderer::{
    AddressMode, TextureCacheSettings, TextureFilter, TextureFormat, TextureKind,
};
use baize_infra::graphics::wgpu::WgpuTextureDevice;
use baize_lanes::asset_lane::DirectoryImageSource;
use clap::Parser;

const FELT_SIZE: u32 = 64;
const BALL_COUNT: u32 = 15;

#[derive(Debug, Parser)]
#[command(version, about = "Headless texture cache demo for a billiard table")]
struct Args {
    /// Directory the table and ball images are read from.
    #[arg(default_value = "assets")]
    assets: PathBuf,
    /// JSON file with the texture cache settings.
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Overrides the byte budget of the settings.
    #[arg(long)]
    budget: Option<u64>,
}

/// A felt pattern with a faint weave, so the table has a texture even without assets.
fn procedural_felt() -> SourceImage {
    let mut bytes = Vec::with_capacity((FELT_SIZE * FELT_SIZE * 4) as usize);
    for y in 0..FELT_SIZE {
        for x in 0..FELT_SIZE {
            let weave = if (x + y) % 2 == 0 { 6 } else { 0 };
            bytes.extend_from_slice(&[10 + weave, 90 + weave, 40 + weave, 255]);
        }
    }
    SourceImage::new(bytes, FELT_SIZE, FELT_SIZE, TextureFormat::Rgba8UnormSrgb)
}

/// Warm-to-cold falloff of the lamp hanging over the table.
fn lamp_gradient() -> Vec<u8> {
    (0..=255u8).flat_map(|i| [255 - i / 4, 240 - i / 3, 200, 255]).collect()
}

fn load_settings(args: &Args) -> Result<TextureCacheSettings> {
    let mut settings = match &args.settings {
        Some(path) => TextureCacheSettings::from_file(path)
            .map_err(|e| anyhow::anyhow!("Failed to read settings {}: {e}", path.display()))?,
        None => TextureCacheSettings::default(),
    };
    if let Some(budget) = args.budget {
        settings.max_budget_bytes = budget;
    }
    Ok(settings)
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info"))
        .filter_module("wgpu_hal", log::LevelFilter::Error)
        .init();

    let args = Args::parse();
    let settings = load_settings(&args)?;
    log::info!("Sandbox: Texture cache settings {settings:?}");

    let device = WgpuTextureDevice::headless()?;
    let source = DirectoryImageSource::new(&args.assets);
    let mut textures = TextureManager::new(device, source, settings)?;

    let felt = textures.load_2d_from_image("felt", &procedural_felt(), AddressMode::Repeat)?;
    textures.load_1d(
        "lamp",
        &lamp_gradient(),
        256,
        TextureFormat::Rgba8Unorm,
        AddressMode::ClampToEdge,
    )?;

    for ball in 1..=BALL_COUNT {
        let name = format!("ball_{ball}.png");
        match textures.load_2d(&name, AddressMode::ClampToEdge) {
            Ok(handle) => log::info!("Sandbox: '{name}' resident as {handle}"),
            Err(TextureError::NotFound(_)) => log::warn!("Sandbox: '{name}' not found, skipped"),
            Err(e) => log::error!("Sandbox: Failed to load '{name}': {e}"),
        }
    }

    let faces = [
        "sky_px.png",
        "sky_nx.png",
        "sky_py.png",
        "sky_ny.png",
        "sky_pz.png",
        "sky_nz.png",
    ];
    if let Err(e) = textures.load_cube_map(&faces, AddressMode::ClampToEdge) {
        log::warn!("Sandbox: No room environment: {e}");
    }

    if !textures.bind(felt, TextureKind::D2, 0) {
        log::warn!("Sandbox: The felt was evicted before it could be bound");
    }
    textures.set_filter_mode(TextureFilter::Trilinear)?;
    log::info!("Sandbox: {:?}", textures.stats());

    // Give back everything but the most recently bound textures.
    while textures.stats().resident_textures > 2 {
        match textures.unload_lru_texture() {
            UnloadOutcome::Freed(bytes) => log::info!("Sandbox: Evicted {bytes} bytes"),
            UnloadOutcome::NothingToEvict => break,
        }
    }
    log::info!("Sandbox: {:?}", textures.stats());
    Ok(())
}
