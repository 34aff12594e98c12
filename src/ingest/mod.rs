/// Upstream data retrieval for the stream gage service.
///
/// Submodules:
/// - `usgs` — URL construction and response parsing for the USGS water
///   services API (Instantaneous Values and Site services).
///
/// The `Transport` trait is the single seam between the client logic and
/// the network. Production code uses `HttpTransport`; tests substitute a
/// scripted transport to count calls and replay fixture bodies.

use crate::model::UsgsError;
use std::time::Duration;

pub mod usgs;

/// Blocking HTTP GET returning the response body as text.
///
/// A single transport failure is surfaced immediately — no retries — to
/// keep request latency bounded. Timeout policy lives in the
/// implementation.
pub trait Transport {
    fn get(&self, url: &str) -> Result<String, UsgsError>;
}

impl<T: Transport + ?Sized> Transport for std::rc::Rc<T> {
    fn get(&self, url: &str) -> Result<String, UsgsError> {
        (**self).get(url)
    }
}

/// Transport backed by a blocking reqwest client with a 30 second timeout.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new() -> Result<HttpTransport, UsgsError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| UsgsError::Transport(e.to_string()))?;
        Ok(HttpTransport { client })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<String, UsgsError> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .map_err(|e| UsgsError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UsgsError::HttpStatus(status.as_u16()));
        }

        response
            .text()
            .map_err(|e| UsgsError::Transport(e.to_string()))
    }
}
