use std::path::PathBuf;

use imageproc::image::ImageError;

use crate::image::DecodeStatus;

pub type Result<T, E = ConvertError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("no drawing surface with id `{0}`")]
    SurfaceNotFound(String),

    #[error("decoder backend is not initialized")]
    DecoderUnavailable,

    #[error("decoder rejected the input (status {status})")]
    DecodeFailed { status: DecodeStatus },

    #[error("unsupported file: {}", .0.display())]
    UnsupportedFile(PathBuf),

    #[error("fetching `{url}` returned status {status}")]
    Transport { url: String, status: u16 },

    #[error("fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("failed to encode surface: {0}")]
    Encode(#[from] ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
