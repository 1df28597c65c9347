//! The conversion pipeline: bytes -> surface -> png -> download

use std::time::{Duration, Instant};

use crate::artifact::Artifact;
use crate::backend::Backend;
use crate::config::{ConvertConfig, FailurePolicy};
use crate::download::DownloadSink;
use crate::error::{ConvertError, Result};
use crate::fetch::Fetcher;
use crate::image::{DecodeStatus, Decoder};
use crate::source::SourceFile;
use crate::surface::SurfaceRegistry;

/// Outcome of a single conversion that reached the download step
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub file_name: String,
    pub status: DecodeStatus,
    pub decode_time: Duration,
    pub dimensions: (u32, u32),
    pub bytes: usize,
}

/// Runs conversions one at a time against a set of surfaces.
///
/// Every operation takes `&mut self`, so two conversions can never race on
/// the same surface.
#[derive(Debug)]
pub struct Converter<S> {
    backend: Backend,
    surfaces: SurfaceRegistry,
    sink: S,
    config: ConvertConfig,
}

impl<S: DownloadSink> Converter<S> {
    /// A converter whose registry holds the configured surface
    pub fn new(config: ConvertConfig, backend: Backend, sink: S) -> Self {
        let surfaces = SurfaceRegistry::with_surface(config.surface_id.clone());
        Self::with_surfaces(config, backend, surfaces, sink)
    }

    pub fn with_surfaces(
        config: ConvertConfig,
        backend: Backend,
        surfaces: SurfaceRegistry,
        sink: S,
    ) -> Self {
        Self {
            backend,
            surfaces,
            sink,
            config,
        }
    }

    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    pub fn backend_mut(&mut self) -> &mut Backend {
        &mut self.backend
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Decode `data` onto the surface `surface_id` and download the result
    /// as `output_name` (or the configured default name).
    #[tracing::instrument(level = "debug", skip(self, data), fields(len = data.len()))]
    pub fn decode(
        &mut self,
        data: &[u8],
        surface_id: &str,
        output_name: Option<&str>,
    ) -> Result<Conversion> {
        let surface = self
            .surfaces
            .get_mut(surface_id)
            .ok_or_else(|| ConvertError::SurfaceNotFound(surface_id.to_string()))?;
        let decoder: &dyn Decoder = self.backend.decoder()?;

        // clear previous picture (if any)
        surface.clear();

        let start = Instant::now();
        let status = decoder.decode(data, surface);
        let decode_time = start.elapsed();

        if status.is_success() {
            log::debug!(
                "{} decoded {} bytes in {:?} (status {status})",
                decoder.name(),
                data.len(),
                decode_time
            );
        } else {
            log::warn!(
                "{} failed to decode {} bytes in {:?} (status {status})",
                decoder.name(),
                data.len(),
                decode_time
            );
            if self.config.failure_policy == FailurePolicy::Abort {
                return Err(ConvertError::DecodeFailed { status });
            }
        }

        let dimensions = surface.dimensions();
        let artifact = Artifact::from_surface(surface, self.config.png_compression)?.into_download();

        let file_name = output_name.unwrap_or(&self.config.default_output_name);
        self.sink.save(file_name, &artifact)?;

        Ok(Conversion {
            file_name: file_name.to_string(),
            status,
            decode_time,
            dimensions,
            bytes: artifact.len(),
        })
    }

    /// Convert a picked file on the default surface, downloading it as
    /// `<file name>.png`
    pub fn convert_file(&mut self, source: &SourceFile) -> Result<Conversion> {
        log::info!("Converting {} ({} bytes)", source.name, source.len());
        let surface_id = self.config.surface_id.clone();
        self.decode(&source.data, &surface_id, Some(&source.output_name()))
    }

    /// Fetch `url` and, on a success status only, decode the body with the
    /// default output name
    #[tracing::instrument(level = "debug", skip(self, fetcher))]
    pub fn load_from_url<F>(&mut self, fetcher: &F, url: &str, surface_id: &str) -> Result<Conversion>
    where
        F: Fetcher + ?Sized,
    {
        let response = fetcher.fetch(url)?;
        if !response.is_success() {
            log::warn!("GET {url} returned {}", response.status);
            return Err(ConvertError::Transport {
                url: url.to_string(),
                status: response.status,
            });
        }

        self.decode(&response.body, surface_id, None)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use imageproc::image::{load_from_memory, DynamicImage, Rgba, RgbaImage};

    use super::*;
    use crate::artifact::DOWNLOAD_MIME;
    use crate::download::MemorySink;
    use crate::fetch::FetchResponse;
    use crate::image::WebpDecoder;
    use crate::surface::Surface;

    const CANVAS: &str = "output_canvas";

    fn encode_webp(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba(rgba));
        webp::Encoder::from_rgba(img.as_raw(), width, height)
            .encode_lossless()
            .to_vec()
    }

    fn converter(policy: FailurePolicy) -> Converter<MemorySink> {
        let config = ConvertConfig {
            failure_policy: policy,
            ..Default::default()
        };
        Converter::new(config, Backend::ready(WebpDecoder), MemorySink::new())
    }

    fn downloaded(converter: &Converter<MemorySink>, index: usize) -> RgbaImage {
        let (_, artifact) = &converter.sink().downloads[index];
        load_from_memory(artifact.data()).unwrap().to_rgba8()
    }

    /// Counts calls and paints a fixed 1x1 pixel
    struct CountingDecoder(Rc<Cell<usize>>);

    impl Decoder for CountingDecoder {
        fn decode(&self, _data: &[u8], surface: &mut Surface) -> DecodeStatus {
            self.0.set(self.0.get() + 1);
            surface.paint(&DynamicImage::ImageRgba8(RgbaImage::from_pixel(
                1,
                1,
                Rgba([0, 0, 0, 255]),
            )));
            DecodeStatus::OK
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    struct StubFetcher(u16, Vec<u8>);

    impl Fetcher for StubFetcher {
        fn fetch(&self, _url: &str) -> Result<FetchResponse> {
            Ok(FetchResponse {
                status: self.0,
                body: self.1.clone(),
            })
        }
    }

    struct BrokenFetcher;

    impl Fetcher for BrokenFetcher {
        fn fetch(&self, _url: &str) -> Result<FetchResponse> {
            Err(std::io::Error::from(std::io::ErrorKind::ConnectionRefused).into())
        }
    }

    #[test]
    fn valid_webp_downloads_binary_png() {
        let mut converter = converter(FailurePolicy::DownloadAnyway);
        let source = SourceFile::new("cat.webp", encode_webp(16, 16, [200, 100, 50, 255]));

        let conversion = converter.convert_file(&source).unwrap();

        assert!(conversion.status.is_success());
        assert_eq!(conversion.file_name, "cat.webp.png");
        assert_eq!(conversion.dimensions, (16, 16));
        assert!(conversion.bytes > 0);

        let (name, artifact) = &converter.sink().downloads[0];
        assert_eq!(name, "cat.webp.png");
        assert_eq!(artifact.mime(), DOWNLOAD_MIME);
        assert!(!artifact.is_empty());
        assert_eq!(downloaded(&converter, 0).get_pixel(3, 3).0, [200, 100, 50, 255]);
    }

    #[test]
    fn default_output_name_when_absent() {
        let mut converter = converter(FailurePolicy::DownloadAnyway);
        let conversion = converter
            .decode(&encode_webp(2, 2, [1, 1, 1, 255]), CANVAS, None)
            .unwrap();
        assert_eq!(conversion.file_name, "download.png");
    }

    #[test]
    fn missing_surface_is_an_error_without_output() {
        let mut converter = converter(FailurePolicy::DownloadAnyway);

        let err = converter
            .decode(&encode_webp(2, 2, [1, 1, 1, 255]), "nope", Some("x.png"))
            .unwrap_err();

        assert!(matches!(err, ConvertError::SurfaceNotFound(id) if id == "nope"));
        assert!(converter.sink().downloads.is_empty());
    }

    #[test]
    fn unavailable_backend_is_an_error() {
        let mut converter =
            Converter::new(ConvertConfig::default(), Backend::Unavailable, MemorySink::new());

        let err = converter.decode(b"data", CANVAS, None).unwrap_err();

        assert!(matches!(err, ConvertError::DecoderUnavailable));
        assert!(converter.sink().downloads.is_empty());
    }

    #[test]
    fn second_decode_replaces_first() {
        let mut converter = converter(FailurePolicy::DownloadAnyway);

        converter
            .decode(&encode_webp(8, 8, [255, 0, 0, 255]), CANVAS, Some("a.png"))
            .unwrap();
        converter
            .decode(&encode_webp(4, 2, [0, 0, 255, 255]), CANVAS, Some("b.png"))
            .unwrap();

        let second = downloaded(&converter, 1);
        assert_eq!(second.dimensions(), (4, 2));
        assert!(second.pixels().all(|p| p.0 == [0, 0, 255, 255]));
    }

    #[test]
    fn empty_buffer_still_downloads_by_default() {
        let mut converter = converter(FailurePolicy::DownloadAnyway);

        let conversion = converter.decode(&[], CANVAS, Some("empty.png")).unwrap();

        assert_eq!(conversion.status, DecodeStatus::FAILED);
        assert_eq!(conversion.dimensions, Surface::DEFAULT_DIMENSIONS);
        assert_eq!(converter.sink().downloads.len(), 1);
        assert!(downloaded(&converter, 0).pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn failed_decode_after_success_downloads_cleared_surface() {
        let mut converter = converter(FailurePolicy::DownloadAnyway);
        converter
            .decode(&encode_webp(3, 3, [9, 9, 9, 255]), CANVAS, None)
            .unwrap();

        converter.decode(b"not a webp", CANVAS, None).unwrap();

        let second = downloaded(&converter, 1);
        assert_eq!(second.dimensions(), (3, 3));
        assert!(second.pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn abort_policy_skips_download() {
        let mut converter = converter(FailurePolicy::Abort);

        let err = converter.decode(&[], CANVAS, None).unwrap_err();

        assert!(matches!(
            err,
            ConvertError::DecodeFailed {
                status: DecodeStatus::FAILED
            }
        ));
        assert!(converter.sink().downloads.is_empty());
    }

    #[test]
    fn load_from_url_decodes_once_on_success() {
        let calls = Rc::new(Cell::new(0));
        let mut converter = Converter::new(
            ConvertConfig::default(),
            Backend::ready(CountingDecoder(calls.clone())),
            MemorySink::new(),
        );
        let fetcher = StubFetcher(200, encode_webp(2, 2, [5, 5, 5, 255]));

        let conversion = converter
            .load_from_url(&fetcher, "https://example.com/a.webp", CANVAS)
            .unwrap();

        assert_eq!(calls.get(), 1);
        assert_eq!(conversion.file_name, "download.png");
        assert_eq!(converter.sink().downloads.len(), 1);
    }

    #[test]
    fn torn_down_backend_is_unavailable() {
        let mut converter = converter(FailurePolicy::DownloadAnyway);
        let data = encode_webp(2, 2, [3, 3, 3, 255]);
        converter.decode(&data, CANVAS, None).unwrap();

        assert!(converter.backend_mut().teardown().is_some());
        let err = converter.decode(&data, CANVAS, None).unwrap_err();

        assert!(matches!(err, ConvertError::DecoderUnavailable));
        assert_eq!(converter.sink().downloads.len(), 1);
    }

    #[test]
    fn load_from_url_never_decodes_when_fetch_fails() {
        let calls = Rc::new(Cell::new(0));
        let mut converter = Converter::new(
            ConvertConfig::default(),
            Backend::ready(CountingDecoder(calls.clone())),
            MemorySink::new(),
        );

        let err = converter
            .load_from_url(&BrokenFetcher, "https://example.com/a.webp", CANVAS)
            .unwrap_err();

        assert!(matches!(err, ConvertError::Io(_)));
        assert_eq!(calls.get(), 0);
        assert!(converter.sink().downloads.is_empty());
    }

    #[test]
    fn load_from_url_never_decodes_on_other_statuses() {
        for status in [201, 204, 301, 404, 500] {
            let calls = Rc::new(Cell::new(0));
            let mut converter = Converter::new(
                ConvertConfig::default(),
                Backend::ready(CountingDecoder(calls.clone())),
                MemorySink::new(),
            );

            let result = converter.load_from_url(&StubFetcher(status, Vec::new()), "u", CANVAS);

            assert!(result.is_err());
            assert_eq!(calls.get(), 0, "status {status}");
        }
    }

    #[test]
    fn load_from_url_skips_decode_on_failure_status() {
        let mut converter = converter(FailurePolicy::DownloadAnyway);
        let fetcher = StubFetcher(404, b"not found".to_vec());

        let err = converter
            .load_from_url(&fetcher, "https://example.com/missing.webp", CANVAS)
            .unwrap_err();

        assert!(matches!(err, ConvertError::Transport { status: 404, .. }));
        assert!(converter.sink().downloads.is_empty());
    }
}
