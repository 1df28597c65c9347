//! Lifecycle holder for the decoder capability

use crate::error::{ConvertError, Result};
use crate::image::Decoder;

/// Either no decoder is installed yet, or one is ready to use.
#[derive(Default)]
pub enum Backend {
    #[default]
    Unavailable,
    Ready(Box<dyn Decoder>),
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Unavailable => f.write_str("Unavailable"),
            Backend::Ready(decoder) => f.debug_tuple("Ready").field(&decoder.name()).finish(),
        }
    }
}

impl Backend {
    pub fn ready(decoder: impl Decoder + 'static) -> Self {
        Backend::Ready(Box::new(decoder))
    }

    /// Install `decoder`, returning whichever one it replaced
    pub fn init(&mut self, decoder: impl Decoder + 'static) -> Option<Box<dyn Decoder>> {
        log::debug!("Decoder backend initialized: {}", decoder.name());
        match std::mem::replace(self, Backend::ready(decoder)) {
            Backend::Ready(previous) => Some(previous),
            Backend::Unavailable => None,
        }
    }

    pub fn teardown(&mut self) -> Option<Box<dyn Decoder>> {
        match std::mem::take(self) {
            Backend::Ready(decoder) => {
                log::debug!("Decoder backend torn down: {}", decoder.name());
                Some(decoder)
            }
            Backend::Unavailable => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Backend::Ready(_))
    }

    pub fn decoder(&self) -> Result<&dyn Decoder> {
        match self {
            Backend::Ready(decoder) => Ok(decoder.as_ref()),
            Backend::Unavailable => Err(ConvertError::DecoderUnavailable),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::WebpDecoder;

    #[test]
    fn unavailable_until_initialized() {
        let mut backend = Backend::default();
        assert!(matches!(
            backend.decoder(),
            Err(ConvertError::DecoderUnavailable)
        ));

        assert!(backend.init(WebpDecoder).is_none());
        assert_eq!(backend.decoder().unwrap().name(), "libwebp");
    }

    #[test]
    fn teardown_returns_decoder() {
        let mut backend = Backend::ready(WebpDecoder);
        assert!(backend.teardown().is_some());
        assert!(!backend.is_ready());
        assert!(backend.teardown().is_none());
    }
}
