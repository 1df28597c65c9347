pub mod adapter;
pub mod artifact;
pub mod backend;
pub mod config;
pub mod download;
pub mod error;
pub mod fetch;
pub mod image;
pub mod source;
pub mod surface;

// Re-export commonly used types
pub use adapter::{Conversion, Converter};
pub use artifact::Artifact;
pub use backend::Backend;
pub use config::{ConvertConfig, FailurePolicy};
pub use download::{DataUrlSink, DirectorySink, DownloadSink, MemorySink};
pub use error::ConvertError;
pub use fetch::{Fetcher, HttpFetcher};
pub use image::{DecodeStatus, Decoder, PngCompression, WebpDecoder};
pub use source::SourceFile;
pub use surface::{Surface, SurfaceRegistry};
