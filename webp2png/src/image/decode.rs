//! Image decoding

use std::fmt;

use crate::surface::Surface;

/// Numeric result reported by a decoder.
///
/// Only success or failure is meaningful to callers; any other value a
/// decoder reports is carried through for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeStatus(pub i32);

impl DecodeStatus {
    pub const OK: DecodeStatus = DecodeStatus(1);
    pub const FAILED: DecodeStatus = DecodeStatus(0);

    pub fn is_success(self) -> bool {
        self == Self::OK
    }

    pub fn code(self) -> i32 {
        self.0
    }
}

impl fmt::Display for DecodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A decoding capability that paints decoded pixels onto a surface.
///
/// The decoder owns the paint: on success the surface must hold the decoded
/// image, on failure it should be left as it was handed in.
pub trait Decoder {
    fn decode(&self, data: &[u8], surface: &mut Surface) -> DecodeStatus;

    fn name(&self) -> &str;
}

/// libwebp-backed decoder
#[derive(Debug, Default, Clone, Copy)]
pub struct WebpDecoder;

impl Decoder for WebpDecoder {
    fn decode(&self, data: &[u8], surface: &mut Surface) -> DecodeStatus {
        if data.is_empty() {
            return DecodeStatus::FAILED;
        }

        match webp::Decoder::new(data).decode() {
            Some(image) => {
                surface.paint(&image.to_image());
                DecodeStatus::OK
            }
            None => DecodeStatus::FAILED,
        }
    }

    fn name(&self) -> &str {
        "libwebp"
    }
}
