//! Remote resource loading

use crate::error::Result;

/// Status the fetch must report before its body is used
pub const SUCCESS_STATUS: u16 = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        self.status == SUCCESS_STATUS
    }
}

pub trait Fetcher {
    fn fetch(&self, url: &str) -> Result<FetchResponse>;
}

/// Blocking HTTP(S) fetcher
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::ClientBuilder::new()
            .user_agent(concat!("webp2png/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<FetchResponse> {
        log::debug!("GET {url}");
        let response = self.client.get(url).send()?;
        let status = response.status().as_u16();
        let body = response.bytes()?.to_vec();

        Ok(FetchResponse { status, body })
    }
}
