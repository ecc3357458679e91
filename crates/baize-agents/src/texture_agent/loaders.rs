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

//! The per-kind loaders and the upload path they share.

use super::error::TextureError;
use super::manager::TextureManager;
use baize_core::asset::{ImageSource, SourceImage};
use baize_core::math::Extent2D;
use baize_core::renderer::{
    AddressMode, DeviceId, ImageUpload, SamplerState, TextureDevice, TextureFormat,
    TextureHandle, TextureKind, TextureStorageDescriptor, UnpackAlignment,
};
use baize_data::textures::{footprint_bytes, TextureElement};

/// Separates the six face names in the dedup key of a cube map. No loader
/// accepts a name containing it, so cube keys never collide with other names.
const CUBE_KEY_SEPARATOR: &str = "|";

/// Everything the shared upload path needs to know about a texture.
struct TextureUpload<'a> {
    name: &'a str,
    kind: TextureKind,
    size: Extent2D,
    format: TextureFormat,
    faces: &'a [&'a [u8]],
    tightly_packed: bool,
    wrap: AddressMode,
}

impl<D: TextureDevice, S: ImageSource> TextureManager<D, S> {
    /// Loads a one-row texture from raw texels.
    ///
    /// `pixels` holds `width` texels of `format`, without padding.
    pub fn load_1d(
        &mut self,
        name: &str,
        pixels: &[u8],
        width: u32,
        format: TextureFormat,
        wrap: AddressMode,
    ) -> Result<TextureHandle, TextureError> {
        self.table.tick();
        reject_separator(name)?;
        if let Some(handle) = self.resident(name) {
            return Ok(handle);
        }
        self.load_common(TextureUpload {
            name,
            kind: TextureKind::D1,
            size: Extent2D::new(width, 1),
            format,
            faces: &[pixels],
            tightly_packed: true,
            wrap,
        })
    }

    /// Loads a 2D texture from the image registered under `name`.
    pub fn load_2d(
        &mut self,
        name: &str,
        wrap: AddressMode,
    ) -> Result<TextureHandle, TextureError> {
        self.table.tick();
        require_name(name)?;
        if let Some(handle) = self.resident(name) {
            return Ok(handle);
        }
        let image = self.source.fetch(name)?;
        self.load_image(name, TextureKind::D2, &image, wrap)
    }

    /// Loads a 2D texture from an image supplied by the caller, such as a
    /// procedurally generated one.
    ///
    /// An empty `name` registers an anonymous texture that is never
    /// deduplicated.
    pub fn load_2d_from_image(
        &mut self,
        name: &str,
        image: &SourceImage,
        wrap: AddressMode,
    ) -> Result<TextureHandle, TextureError> {
        self.table.tick();
        reject_separator(name)?;
        if let Some(handle) = self.resident(name) {
            return Ok(handle);
        }
        self.load_image(name, TextureKind::D2, image, wrap)
    }

    /// Loads a rectangle texture from the image registered under `name` and
    /// returns its handle and size.
    ///
    /// Rectangle textures never have mipmaps, always sample with basic
    /// filtering and cannot repeat.
    ///
    /// ## Errors
    /// * `TextureError::InvalidArgument` - If `wrap` is a repeating mode.
    pub fn load_rectangle(
        &mut self,
        name: &str,
        wrap: AddressMode,
    ) -> Result<(TextureHandle, u32, u32), TextureError> {
        self.table.tick();
        if !TextureKind::Rectangle.allows_wrap(wrap) {
            return Err(TextureError::InvalidArgument(format!(
                "rectangle texture '{name}' cannot use {wrap:?} wrapping"
            )));
        }
        require_name(name)?;
        if let Some(handle) = self.resident(name) {
            let size = self.table.get(handle).map(|element| element.size);
            let size = size.unwrap_or_default();
            return Ok((handle, size.width, size.height));
        }
        let image = self.source.fetch(name)?;
        let handle = self.load_image(name, TextureKind::Rectangle, &image, wrap)?;
        Ok((handle, image.width, image.height))
    }

    /// Loads a cube map from six images, in the order +X, -X, +Y, -Y, +Z, -Z.
    ///
    /// Every face is fetched before anything is allocated: if one face is
    /// missing or does not match the others, the call fails and the cache is
    /// left untouched. The cube is deduplicated on its six names together.
    ///
    /// ## Errors
    /// * `TextureError::InvalidArgument` - If there are not exactly six names,
    ///   or the faces are not square images of the same size and format.
    /// * `TextureError::NotFound` - If a face image is unknown.
    pub fn load_cube_map(
        &mut self,
        names: &[&str],
        wrap: AddressMode,
    ) -> Result<TextureHandle, TextureError> {
        self.table.tick();
        let face_count = TextureKind::CubeMap.face_count() as usize;
        if names.len() != face_count {
            return Err(TextureError::InvalidArgument(format!(
                "cube map needs {face_count} faces, got {}",
                names.len()
            )));
        }
        for name in names {
            require_name(name)?;
        }
        let key = names.join(CUBE_KEY_SEPARATOR);
        if let Some(handle) = self.resident(&key) {
            return Ok(handle);
        }

        let images = names
            .iter()
            .map(|name| self.source.fetch(name))
            .collect::<Result<Vec<_>, _>>()?;
        let first = &images[0];
        if first.width != first.height {
            return Err(TextureError::InvalidArgument(format!(
                "cube face '{}' is not square ({}x{})",
                names[0], first.width, first.height
            )));
        }
        for (name, image) in names.iter().zip(&images).skip(1) {
            if image.size() != first.size()
                || image.format != first.format
                || image.tightly_packed != first.tightly_packed
            {
                return Err(TextureError::InvalidArgument(format!(
                    "cube face '{name}' does not match face '{}'",
                    names[0]
                )));
            }
        }

        let faces: Vec<&[u8]> = images.iter().map(|image| image.bytes.as_slice()).collect();
        self.load_common(TextureUpload {
            name: &key,
            kind: TextureKind::CubeMap,
            size: first.size(),
            format: first.format,
            faces: &faces,
            tightly_packed: first.tightly_packed,
            wrap,
        })
    }

    /// Returns the handle already resident under `name`, counting the hit.
    fn resident(&mut self, name: &str) -> Option<TextureHandle> {
        let handle = self.table.find_by_name(name)?;
        self.dedup_hits += 1;
        log::debug!("TextureManager: '{name}' already resident as {handle}");
        Some(handle)
    }

    fn load_image(
        &mut self,
        name: &str,
        kind: TextureKind,
        image: &SourceImage,
        wrap: AddressMode,
    ) -> Result<TextureHandle, TextureError> {
        self.load_common(TextureUpload {
            name,
            kind,
            size: image.size(),
            format: image.format,
            faces: &[image.bytes.as_slice()],
            tightly_packed: image.tightly_packed,
            wrap,
        })
    }

    /// Validates, uploads, makes room and records one texture.
    fn load_common(&mut self, upload: TextureUpload<'_>) -> Result<TextureHandle, TextureError> {
        self.validate(&upload)?;

        let filter = self.policy.effective_mode(upload.kind);
        let mip_levels = if self.policy.wants_mipmaps(upload.kind) {
            upload.size.mip_level_count()
        } else {
            1
        };
        let footprint = footprint_bytes(
            upload.size,
            upload.format,
            upload.kind.face_count(),
            mip_levels,
        );
        self.check_fits_budget(footprint)?;

        // Upload before evicting, so a device failure leaves every resident
        // texture in place.
        let device_id = self.pool.acquire(&mut self.device)?;
        let sampler = self.policy.sampler_for(upload.kind);
        let stored = self
            .upload_to_device(device_id, &upload, mip_levels, &sampler)
            .and_then(|()| self.make_room(footprint));
        if let Err(e) = stored {
            log::error!("TextureManager: Failed to upload '{}': {e}", upload.name);
            self.pool.release(device_id);
            return Err(e);
        }

        let mut element = TextureElement::new(
            device_id,
            upload.kind,
            upload.size,
            upload.format,
            mip_levels,
        );
        element.wrap_mode = upload.wrap;
        element.apply_filter(filter, &sampler);
        let handle = self.table.insert(upload.name, element);
        self.used_bytes += footprint;
        self.loads += 1;

        log::info!(
            "TextureManager: Loaded {:?} {handle} '{}' {}x{} {:?}, {mip_levels} mips, {footprint}B",
            upload.kind,
            upload.name,
            upload.size.width,
            upload.size.height,
            upload.format
        );
        Ok(handle)
    }

    fn validate(&self, upload: &TextureUpload<'_>) -> Result<(), TextureError> {
        let invalid = |msg: String| Err(TextureError::InvalidArgument(msg));
        let size = upload.size;

        if size.is_empty() {
            return invalid(format!(
                "'{}' has zero dimensions ({}x{})",
                upload.name, size.width, size.height
            ));
        }
        if upload.kind == TextureKind::D1 && size.height != 1 {
            return invalid(format!("1D texture '{}' must be one texel high", upload.name));
        }
        if size.max_side() > self.max_texture_size {
            return invalid(format!(
                "'{}' is {}x{}, the device allows at most {}",
                upload.name, size.width, size.height, self.max_texture_size
            ));
        }
        if !upload.kind.allows_wrap(upload.wrap) {
            return invalid(format!(
                "{:?} texture '{}' cannot use {:?} wrapping",
                upload.kind, upload.name, upload.wrap
            ));
        }
        if upload.faces.len() != upload.kind.face_count() as usize {
            return invalid(format!(
                "'{}' has {} faces, {:?} textures need {}",
                upload.name,
                upload.faces.len(),
                upload.kind,
                upload.kind.face_count()
            ));
        }

        let row_bytes = size.width as usize * upload.format.bytes_per_pixel() as usize;
        let required = alignment_for(upload).required_len(row_bytes, size.height as usize);
        for bytes in upload.faces {
            if bytes.is_empty() {
                return invalid(format!("'{}' has no pixel data", upload.name));
            }
            if bytes.len() < required {
                return invalid(format!(
                    "'{}' has {} bytes of pixel data, {} required",
                    upload.name,
                    bytes.len(),
                    required
                ));
            }
        }
        Ok(())
    }

    fn upload_to_device(
        &mut self,
        id: DeviceId,
        upload: &TextureUpload<'_>,
        mip_levels: u32,
        sampler: &SamplerState,
    ) -> Result<(), TextureError> {
        self.device.allocate_storage(
            id,
            &TextureStorageDescriptor {
                label: (!upload.name.is_empty()).then_some(upload.name),
                kind: upload.kind,
                size: upload.size,
                format: upload.format,
                mip_level_count: mip_levels,
            },
        )?;

        let alignment = alignment_for(upload);
        if alignment != UnpackAlignment::default() {
            self.device.set_unpack_alignment(alignment);
        }
        let uploaded = self.upload_faces(id, upload);
        if alignment != UnpackAlignment::default() {
            self.device.set_unpack_alignment(UnpackAlignment::default());
        }
        uploaded?;

        if mip_levels > 1 {
            self.device.generate_mipmaps(id)?;
        }
        self.device.set_wrap(id, upload.wrap)?;
        self.device.set_filter(id, sampler)?;
        self.check_device()
    }

    fn upload_faces(
        &mut self,
        id: DeviceId,
        upload: &TextureUpload<'_>,
    ) -> Result<(), TextureError> {
        for (face, bytes) in upload.faces.iter().copied().enumerate() {
            self.device.upload_image(
                id,
                &ImageUpload {
                    face: face as u32,
                    mip_level: 0,
                    size: upload.size,
                    format: upload.format,
                    bytes,
                },
            )?;
            log::debug!(
                "TextureManager: Uploaded face {face} of '{}' ({} bytes)",
                upload.name,
                bytes.len()
            );
        }
        Ok(())
    }
}

fn alignment_for(upload: &TextureUpload<'_>) -> UnpackAlignment {
    if upload.tightly_packed {
        UnpackAlignment::One
    } else {
        UnpackAlignment::Four
    }
}

fn require_name(name: &str) -> Result<(), TextureError> {
    if name.is_empty() {
        return Err(TextureError::InvalidArgument("empty image name".to_string()));
    }
    reject_separator(name)
}

fn reject_separator(name: &str) -> Result<(), TextureError> {
    if name.contains(CUBE_KEY_SEPARATOR) {
        return Err(TextureError::InvalidArgument(format!(
            "image name '{name}' contains the reserved '{CUBE_KEY_SEPARATOR}'"
        )));
    }
    Ok(())
}
