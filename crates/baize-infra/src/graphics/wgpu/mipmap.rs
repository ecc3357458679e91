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

//! CPU-side mip chain generation.
//!
//! `wgpu` has no equivalent of a driver-side "generate mipmaps" call, so the
//! levels are computed on the CPU from a tightly packed copy of the base level
//! and uploaded like any other image.

use baize_core::math::Extent2D;
use baize_core::renderer::TextureFormat;

/// How a format is reduced from one level to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Downsample {
    /// 2x2 box filter over 8-bit unorm channels.
    BoxUnorm8,
    /// 2x2 box filter over 32-bit float channels.
    BoxFloat32,
    /// Keeps the top-left texel of every 2x2 block.
    Nearest,
}

impl Downsample {
    /// The reduction used for `format`.
    pub fn for_format(format: TextureFormat) -> Self {
        match format {
            TextureFormat::R8Unorm
            | TextureFormat::Rg8Unorm
            | TextureFormat::Rgba8Unorm
            | TextureFormat::Rgba8UnormSrgb
            | TextureFormat::Bgra8UnormSrgb => Downsample::BoxUnorm8,
            TextureFormat::R32Float | TextureFormat::Rg32Float | TextureFormat::Rgba32Float => {
                Downsample::BoxFloat32
            }
            TextureFormat::R16Float | TextureFormat::Rg16Float | TextureFormat::Rgba16Float => {
                Downsample::Nearest
            }
        }
    }
}

/// Removes the row padding of an image whose rows start every `pitch` bytes.
pub fn tighten_rows(bytes: &[u8], size: Extent2D, bytes_per_pixel: u32, pitch: usize) -> Vec<u8> {
    let row_bytes = (size.width * bytes_per_pixel) as usize;
    if pitch == row_bytes {
        return bytes[..row_bytes * size.height as usize].to_vec();
    }
    let mut tight = Vec::with_capacity(row_bytes * size.height as usize);
    for row in 0..size.height as usize {
        let start = row * pitch;
        tight.extend_from_slice(&bytes[start..start + row_bytes]);
    }
    tight
}

/// Computes the next level of a tightly packed image.
pub fn downsample(src: &[u8], size: Extent2D, format: TextureFormat) -> (Vec<u8>, Extent2D) {
    let next = size.next_mip();
    let bpp = format.bytes_per_pixel() as usize;
    let texel = |x: u32, y: u32| {
        let x = x.min(size.width - 1) as usize;
        let y = y.min(size.height - 1) as usize;
        let offset = (y * size.width as usize + x) * bpp;
        &src[offset..offset + bpp]
    };

    let mut dst = Vec::with_capacity(next.width as usize * next.height as usize * bpp);
    for y in 0..next.height {
        for x in 0..next.width {
            let block = [
                texel(2 * x, 2 * y),
                texel(2 * x + 1, 2 * y),
                texel(2 * x, 2 * y + 1),
                texel(2 * x + 1, 2 * y + 1),
            ];
            match Downsample::for_format(format) {
                Downsample::BoxUnorm8 => {
                    for channel in 0..bpp {
                        let sum: u32 = block.iter().map(|t| t[channel] as u32).sum();
                        dst.push(((sum + 2) / 4) as u8);
                    }
                }
                Downsample::BoxFloat32 => {
                    for channel in 0..bpp / 4 {
                        let range = channel * 4..channel * 4 + 4;
                        let sum: f32 = block
                            .iter()
                            .map(|t| bytemuck::pod_read_unaligned::<f32>(&t[range.clone()]))
                            .sum();
                        dst.extend_from_slice(bytemuck::bytes_of(&(sum / 4.0)));
                    }
                }
                Downsample::Nearest => dst.extend_from_slice(block[0]),
            }
        }
    }
    (dst, next)
}

/// Builds levels `1..level_count` from a tightly packed base level.
pub fn build_chain(
    base: &[u8],
    size: Extent2D,
    format: TextureFormat,
    level_count: u32,
) -> Vec<(Vec<u8>, Extent2D)> {
    let mut levels: Vec<(Vec<u8>, Extent2D)> = Vec::new();
    let mut current = (base.to_vec(), size);
    for _ in 1..level_count {
        let next = downsample(&current.0, current.1, format);
        levels.push(next.clone());
        current = next;
    }
    levels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_filter_averages_unorm_channels() {
        // 2x2 RG8: red 0/100/200/100, green constant 40.
        let src = [0, 40, 100, 40, 200, 40, 100, 40];
        let (dst, size) = downsample(&src, Extent2D::new(2, 2), TextureFormat::Rg8Unorm);
        assert_eq!(size, Extent2D::new(1, 1));
        assert_eq!(dst, vec![100, 40]);
    }

    #[test]
    fn test_box_filter_averages_float_channels() {
        let texels: [f32; 4] = [1.0, 2.0, 3.0, 6.0];
        let src = bytemuck::cast_slice::<f32, u8>(&texels);
        let (dst, _) = downsample(src, Extent2D::new(2, 2), TextureFormat::R32Float);
        let value = bytemuck::pod_read_unaligned::<f32>(&dst);
        assert!((value - 3.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_odd_sizes_clamp_at_the_edge() {
        // 3x1 R8: the last output texel only sees column 2.
        let src = [10, 30, 90];
        let (dst, size) = downsample(&src, Extent2D::new(3, 1), TextureFormat::R8Unorm);
        assert_eq!(size, Extent2D::new(1, 1));
        assert_eq!(dst, vec![20]);
    }

    #[test]
    fn test_half_float_keeps_the_top_left_texel() {
        let src = [1, 2, 3, 4, 5, 6, 7, 8];
        let (dst, _) = downsample(&src, Extent2D::new(2, 2), TextureFormat::R16Float);
        assert_eq!(dst, vec![1, 2]);
    }

    #[test]
    fn test_chain_reaches_one_by_one() {
        let base = vec![255u8; 8 * 4 * 4];
        let chain = build_chain(&base, Extent2D::new(8, 4), TextureFormat::Rgba8Unorm, 4);
        let sizes: Vec<_> = chain.iter().map(|(_, size)| *size).collect();
        assert_eq!(
            sizes,
            vec![Extent2D::new(4, 2), Extent2D::new(2, 1), Extent2D::new(1, 1)]
        );
        assert!(chain.iter().all(|(bytes, _)| bytes.iter().all(|&b| b == 255)));
    }

    #[test]
    fn test_tighten_rows_drops_padding() {
        let padded = [1, 2, 3, 0, 4, 5, 6];
        let tight = tighten_rows(&padded, Extent2D::new(3, 2), 1, 4);
        assert_eq!(tight, vec![1, 2, 3, 4, 5, 6]);
    }
}
