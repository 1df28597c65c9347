//! Serialized surface contents, ready for download

use base64::{engine::general_purpose, Engine as _};

use crate::error::Result;
use crate::image::{compress_to_png, PngCompression};
use crate::surface::Surface;

pub const PNG_MIME: &str = "image/png";
/// Forces a save-as disposition instead of inline display
pub const DOWNLOAD_MIME: &str = "application/octet-stream";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    mime: &'static str,
    data: Vec<u8>,
}

impl Artifact {
    /// Encode the surface as it is right now
    pub fn from_surface(surface: &Surface, compression: PngCompression) -> Result<Self> {
        let (width, height) = surface.dimensions();
        let mut data = Vec::with_capacity((width * height) as usize);
        compress_to_png(surface.pixels(), &mut data, compression)?;

        Ok(Self {
            mime: PNG_MIME,
            data,
        })
    }

    /// Relabel the payload as a generic binary stream
    pub fn into_download(self) -> Self {
        Self {
            mime: DOWNLOAD_MIME,
            ..self
        }
    }

    pub fn mime(&self) -> &str {
        self.mime
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data_url(&self) -> String {
        let payload = general_purpose::STANDARD.encode(&self.data);
        format!("data:{};base64,{payload}", self.mime)
    }
}
