//! Image codecs: WEBP decoding onto a surface, PNG encoding off it

mod decode;
mod encode;

pub use decode::{DecodeStatus, Decoder, WebpDecoder};
pub use encode::{compress_to_png, PngCompression};
