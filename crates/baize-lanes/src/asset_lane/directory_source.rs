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

//! An image source backed by a directory on disk.

use super::{AssetLoaderLane, TextureLoaderLane};
use baize_core::asset::{ImageSource, ImageSourceError, SourceImage};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Resolves image names as paths relative to a root directory and decodes
/// the files with an [`AssetLoaderLane`], a [`TextureLoaderLane`] by default.
#[derive(Debug, Clone)]
pub struct DirectoryImageSource<L = TextureLoaderLane> {
    root: PathBuf,
    decoder: L,
}

impl DirectoryImageSource {
    /// Creates a source rooted at `root` that decodes common image files.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_decoder(root, TextureLoaderLane)
    }
}

impl<L: AssetLoaderLane<SourceImage>> DirectoryImageSource<L> {
    /// Creates a source rooted at `root` that decodes files with `decoder`.
    pub fn with_decoder(root: impl Into<PathBuf>, decoder: L) -> Self {
        Self {
            root: root.into(),
            decoder,
        }
    }

    /// The directory names are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl<L: AssetLoaderLane<SourceImage>> ImageSource for DirectoryImageSource<L> {
    fn fetch(&self, name: &str) -> Result<SourceImage, ImageSourceError> {
        let path = self.root.join(name);
        let bytes = std::fs::read(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ImageSourceError::NotFound {
                name: name.to_owned(),
            },
            _ => ImageSourceError::Io {
                name: name.to_owned(),
                details: e.to_string(),
            },
        })?;

        let image = self
            .decoder
            .load(&bytes)
            .map_err(|e| ImageSourceError::Decode {
                name: name.to_owned(),
                details: e.to_string(),
            })?;
        log::debug!(
            "DirectoryImageSource: Decoded '{}' ({}x{}, {:?})",
            path.display(),
            image.width,
            image.height,
            image.format
        );
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use baize_core::renderer::TextureFormat;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_fetch_decodes_files_under_the_root() {
        let dir = tempfile::tempdir().unwrap();
        RgbaImage::from_pixel(4, 2, Rgba([0, 96, 48, 255]))
            .save(dir.path().join("felt.png"))
            .unwrap();

        let source = DirectoryImageSource::new(dir.path());
        let image = source.fetch("felt.png").expect("Image should be found and decoded");

        assert_eq!((image.width, image.height), (4, 2));
        assert_eq!(image.format, TextureFormat::Rgba8UnormSrgb);
        assert_eq!(&image.bytes[..4], &[0, 96, 48, 255]);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirectoryImageSource::new(dir.path());
        assert_eq!(
            source.fetch("missing.png"),
            Err(ImageSourceError::NotFound {
                name: "missing.png".to_string()
            })
        );
    }

    /// Reads files as raw single-row R8 texels.
    struct RawRowLane;

    impl AssetLoaderLane<SourceImage> for RawRowLane {
        fn load(
            &self,
            bytes: &[u8],
        ) -> Result<SourceImage, Box<dyn std::error::Error + Send + Sync + 'static>> {
            if bytes.is_empty() {
                return Err("empty row".into());
            }
            Ok(SourceImage::new(
                bytes.to_vec(),
                bytes.len() as u32,
                1,
                TextureFormat::R8Unorm,
            ))
        }
    }

    #[test]
    fn test_files_are_decoded_by_the_given_lane() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("cushion.raw"), [1u8, 2, 3]).unwrap();
        std::fs::write(dir.path().join("empty.raw"), b"").unwrap();

        let source = DirectoryImageSource::with_decoder(dir.path(), RawRowLane);
        let image = source.fetch("cushion.raw").expect("Raw row should decode");

        assert_eq!((image.width, image.height), (3, 1));
        assert_eq!(image.format, TextureFormat::R8Unorm);
        assert_eq!(
            source.fetch("empty.raw"),
            Err(ImageSourceError::Decode {
                name: "empty.raw".to_string(),
                details: "empty row".to_string()
            })
        );
    }

    #[test]
    fn test_undecodable_file_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.png"), b"not a png").unwrap();

        let source = DirectoryImageSource::new(dir.path());
        let err = source.fetch("broken.png").unwrap_err();
        assert!(
            matches!(err, ImageSourceError::Decode { ref name, .. } if name == "broken.png"),
            "Unexpected error: {err}"
        );
    }
}
