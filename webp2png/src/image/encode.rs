//! Image encoding: PNG

use imageproc::image::codecs::png::{CompressionType, FilterType, PngEncoder};
use imageproc::image::{ExtendedColorType, ImageEncoder, ImageResult, RgbaImage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PngCompression {
    Fast,
    #[default]
    Default,
    Best,
}

impl From<PngCompression> for CompressionType {
    fn from(compression: PngCompression) -> Self {
        match compression {
            PngCompression::Fast => CompressionType::Fast,
            PngCompression::Default => CompressionType::Default,
            PngCompression::Best => CompressionType::Best,
        }
    }
}

/// Compress an RGBA buffer to PNG with the specified compression level
pub fn compress_to_png<W>(img: &RgbaImage, writer: W, compression: PngCompression) -> ImageResult<()>
where
    W: std::io::Write,
{
    let encoder = PngEncoder::new_with_quality(writer, compression.into(), FilterType::Adaptive);

    encoder.write_image(
        img.as_raw(),
        img.width(),
        img.height(),
        ExtendedColorType::Rgba8,
    )
}
