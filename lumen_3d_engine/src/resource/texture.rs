//! 2D texture owning a fully uploaded, mipmap-complete GPU texture.

use std::path::Path;

use crate::error::{Error, Result};
use crate::{engine_bail, engine_debug, engine_err};
use crate::graphics_device::{Gpu, TextureDesc, TextureFormat, TextureHandle, TextureParams};
use crate::resource::{DecodedImage, ImageDecoder};

const SOURCE: &str = "lumen3d::Texture";

/// GPU texture with its dimensions and sampling parameters
pub struct Texture {
    gpu: Gpu,
    handle: TextureHandle,
    width: u32,
    height: u32,
    channels: u32,
    params: TextureParams,
}

impl Texture {
    /// Decode `path` and upload it
    ///
    /// A decode failure leaves nothing allocated on the GPU.
    pub fn from_file(
        gpu: &Gpu,
        path: impl AsRef<Path>,
        params: TextureParams,
        decoder: &dyn ImageDecoder,
    ) -> Result<Self> {
        let path = path.as_ref();
        let image = decoder.decode(path).map_err(|e| engine_err!(SOURCE, e))?;
        let texture = Self::from_image(gpu, &image, params)?;
        engine_debug!(SOURCE, "Loaded texture '{}' ({}x{}, {} channels)",
            path.display(), texture.width, texture.height, texture.channels);
        Ok(texture)
    }

    /// Upload already decoded pixels and build the mipmap chain
    pub fn from_image(gpu: &Gpu, image: &DecodedImage, params: TextureParams) -> Result<Self> {
        let Some(format) = TextureFormat::from_channels(image.channels) else {
            engine_bail!(SOURCE, Error::InvalidResource(format!(
                "Unsupported channel count {}", image.channels
            )));
        };

        let desc = TextureDesc {
            width: image.width,
            height: image.height,
            format,
            params,
        };

        let handle = {
            let mut device = gpu.device_mut();
            let handle = device.create_texture(&desc, &image.pixels)?;
            if let Err(err) = device.generate_mipmaps(handle) {
                device.destroy_texture(handle);
                return Err(err);
            }
            handle
        };

        Ok(Self {
            gpu: gpu.clone(),
            handle,
            width: image.width,
            height: image.height,
            channels: image.channels,
            params,
        })
    }

    /// Bind to a numbered texture unit until the returned binding is dropped
    pub fn bind_to_unit(&self, unit: u32) -> Result<TextureBinding<'_>> {
        self.gpu.acquire_texture_unit(unit, self.handle)?;
        Ok(TextureBinding { texture: self, unit })
    }

    pub fn handle(&self) -> TextureHandle {
        self.handle
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u32 {
        self.channels
    }

    pub fn params(&self) -> TextureParams {
        self.params
    }

    /// Mip levels allocated on the device
    pub fn mip_levels(&self) -> u32 {
        self.gpu.device().texture_info(self.handle).map_or(0, |info| info.mip_levels)
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        self.gpu.device_mut().destroy_texture(self.handle);
    }
}

impl std::fmt::Debug for Texture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Texture")
            .field("handle", &self.handle)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("channels", &self.channels)
            .finish()
    }
}

/// Texture bound to a unit; the unit is cleared on drop
pub struct TextureBinding<'a> {
    texture: &'a Texture,
    unit: u32,
}

impl TextureBinding<'_> {
    pub fn unit(&self) -> u32 {
        self.unit
    }
}

impl Drop for TextureBinding<'_> {
    fn drop(&mut self) {
        self.texture.gpu.release_texture_unit(self.unit, self.texture.handle);
    }
}

#[cfg(test)]
#[path = "texture_tests.rs"]
mod tests;
