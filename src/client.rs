//! Probe transport abstraction and its HTTP implementation

pub mod prober;

#[cfg(test)]
pub(crate) mod testing;

#[cfg(test)]
mod integration_tests;

pub use prober::Prober;

use crate::{
    error::{AppError, Result},
    types::ProbeMethod,
};
use async_trait::async_trait;
use reqwest::{Client, Method, Url};
use std::time::{Duration, Instant};
use tokio::time::timeout;

const USER_AGENT: &str = concat!("network-quality-tester/", env!("CARGO_PKG_VERSION"));

/// Sends one request to an endpoint and reports how long the reply took
///
/// Implementations resolve with the elapsed time between sending and
/// receiving, or reject with an error when the endpoint did not answer.
#[async_trait]
pub trait ProbeTransport: Send + Sync {
    async fn send(&self, endpoint: &str, timeout: Duration) -> Result<Duration>;
}

/// HTTP probe transport backed by reqwest
///
/// Any HTTP response, whatever its status, counts as a reply. Connection
/// failures and timeouts are errors.
pub struct HttpTransport {
    client: Client,
    method: ProbeMethod,
}

impl HttpTransport {
    /// Create a transport that probes with HEAD requests
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| AppError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            method: ProbeMethod::Head,
        })
    }

    /// Use a different HTTP method for probes
    pub fn with_method(mut self, method: ProbeMethod) -> Self {
        self.method = method;
        self
    }

    pub fn method(&self) -> ProbeMethod {
        self.method
    }

    fn http_method(&self) -> Method {
        match self.method {
            ProbeMethod::Head => Method::HEAD,
            ProbeMethod::Get => Method::GET,
        }
    }
}

#[async_trait]
impl ProbeTransport for HttpTransport {
    async fn send(&self, endpoint: &str, request_timeout: Duration) -> Result<Duration> {
        let url = Url::parse(endpoint)?;
        let request = self.client
            .request(self.http_method(), url)
            .timeout(request_timeout);

        let start = Instant::now();
        let response = timeout(request_timeout, request.send())
            .await
            .map_err(|_| AppError::timeout(format!(
                "No response from {} within {}ms",
                endpoint,
                request_timeout.as_millis()
            )))??;
        let elapsed = start.elapsed();

        drop(response);
        Ok(elapsed)
    }
}

/// URL helpers shared by configuration and validation
pub struct HttpUtils;

impl HttpUtils {
    /// Validate that a URL is an absolute http(s) URL with a host
    pub fn validate_url(url: &str) -> Result<()> {
        let parsed = Url::parse(url)
            .map_err(|e| AppError::invalid_argument(format!("Invalid URL format: {}", e)))?;

        match parsed.scheme() {
            "http" | "https" => {},
            scheme => return Err(AppError::invalid_argument(format!("Unsupported URL scheme: {}", scheme))),
        }

        if parsed.host().is_none() {
            return Err(AppError::invalid_argument("URL must have a host"));
        }

        Ok(())
    }

    /// Check if URL uses HTTPS
    pub fn is_https(url: &str) -> bool {
        url.starts_with("https://")
    }
}
