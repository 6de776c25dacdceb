/// Texture handles, formats, and sampling parameters

use crate::error::{Error, Result};

/// Opaque GPU texture handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// Pixel layout of uploaded texture data (8 bits per channel)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum TextureFormat {
    R8,
    RG8,
    RGB8,
    RGBA8,
}

impl TextureFormat {
    /// Format matching a decoded image channel count
    pub fn from_channels(channels: u32) -> Option<Self> {
        match channels {
            1 => Some(TextureFormat::R8),
            2 => Some(TextureFormat::RG8),
            3 => Some(TextureFormat::RGB8),
            4 => Some(TextureFormat::RGBA8),
            _ => None,
        }
    }

    /// Number of channels
    pub fn channels(&self) -> u32 {
        match self {
            TextureFormat::R8 => 1,
            TextureFormat::RG8 => 2,
            TextureFormat::RGB8 => 3,
            TextureFormat::RGBA8 => 4,
        }
    }
}

/// Texture coordinate wrapping mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureWrap {
    Repeat,
    MirroredRepeat,
    ClampToEdge,
    ClampToBorder,
}

/// Texture sampling filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFilter {
    Nearest,
    Linear,
    NearestMipmapNearest,
    LinearMipmapNearest,
    NearestMipmapLinear,
    LinearMipmapLinear,
}

impl TextureFilter {
    /// True for filters sampling from the mipmap chain
    pub fn uses_mipmaps(&self) -> bool {
        !matches!(self, TextureFilter::Nearest | TextureFilter::Linear)
    }
}

/// Sampling parameters applied to a texture at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureParams {
    /// Wrap mode along S (u)
    pub wrap_s: TextureWrap,
    /// Wrap mode along T (v)
    pub wrap_t: TextureWrap,
    /// Minification filter
    pub min_filter: TextureFilter,
    /// Magnification filter (mipmap filters are invalid here)
    pub mag_filter: TextureFilter,
}

impl Default for TextureParams {
    fn default() -> Self {
        Self {
            wrap_s: TextureWrap::Repeat,
            wrap_t: TextureWrap::Repeat,
            min_filter: TextureFilter::LinearMipmapLinear,
            mag_filter: TextureFilter::Linear,
        }
    }
}

/// Descriptor for creating a 2D texture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureDesc {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel format of the uploaded data
    pub format: TextureFormat,
    /// Sampling parameters
    pub params: TextureParams,
}

impl TextureDesc {
    /// Expected byte length of the level-0 pixel data
    pub fn data_size(&self) -> usize {
        self.width as usize * self.height as usize * self.format.channels() as usize
    }

    /// Levels of a full mipmap chain down to 1x1
    pub fn full_mip_levels(&self) -> u32 {
        32 - self.width.max(self.height).leading_zeros()
    }

    /// Check the size, the pixel data and the filters before upload
    pub fn validate(&self, pixels: &[u8]) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidResource(format!(
                "Texture size {}x{} is empty", self.width, self.height
            )));
        }
        if pixels.len() != self.data_size() {
            return Err(Error::InvalidResource(format!(
                "Texture data is {} bytes, expected {} for {}x{} {:?}",
                pixels.len(), self.data_size(), self.width, self.height, self.format
            )));
        }
        if self.params.mag_filter.uses_mipmaps() {
            return Err(Error::InvalidResource(format!(
                "{:?} is not a valid magnification filter", self.params.mag_filter
            )));
        }
        Ok(())
    }
}

/// Texture description read back from the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureInfo {
    /// Creation descriptor
    pub desc: TextureDesc,
    /// Number of mip levels currently allocated
    pub mip_levels: u32,
}
