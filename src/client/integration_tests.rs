//! HTTP transport integration tests against a mock server

use super::*;
use crate::error::AppError;
use std::sync::Arc;
use std::time::Duration;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

/// Mock HTTP server for controlled probe scenarios
pub struct MockHttpServer {
    server: MockServer,
}

impl MockHttpServer {
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        Self { server }
    }

    pub fn url(&self, request_path: &str) -> String {
        format!("{}{}", self.server.uri(), request_path)
    }

    /// Respond to HEAD and GET on `request_path` with `status`
    pub async fn mock_status(&self, request_path: &str, status: u16, delay_ms: Option<u64>) {
        let mut template = ResponseTemplate::new(status);
        if let Some(delay) = delay_ms {
            template = template.set_delay(Duration::from_millis(delay));
        }

        for verb in ["HEAD", "GET"] {
            Mock::given(method(verb))
                .and(path(request_path))
                .respond_with(template.clone())
                .mount(&self.server)
                .await;
        }
    }

    pub async fn mock_success(&self, request_path: &str, delay_ms: Option<u64>) {
        self.mock_status(request_path, 200, delay_ms).await;
    }

    /// Respond far later than any test timeout
    pub async fn mock_timeout(&self, request_path: &str) {
        self.mock_status(request_path, 200, Some(30_000)).await;
    }

    pub async fn mock_redirect(&self, from_path: &str, to_path: &str) {
        let template = ResponseTemplate::new(301)
            .insert_header("Location", self.url(to_path));

        for verb in ["HEAD", "GET"] {
            Mock::given(method(verb))
                .and(path(from_path))
                .respond_with(template.clone())
                .mount(&self.server)
                .await;
        }

        self.mock_success(to_path, None).await;
    }
}

mod transport_tests {
    use super::*;

    #[tokio::test]
    async fn test_successful_probe_measures_delay() {
        let server = MockHttpServer::new().await;
        server.mock_success("/ok", Some(50)).await;

        let transport = HttpTransport::new().unwrap();
        let elapsed = transport.send(&server.url("/ok"), Duration::from_secs(5)).await.unwrap();

        assert!(elapsed >= Duration::from_millis(50));
        assert!(elapsed < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_error_status_still_counts_as_reply() {
        let server = MockHttpServer::new().await;
        server.mock_status("/missing", 404, None).await;
        server.mock_status("/broken", 503, None).await;

        let transport = HttpTransport::new().unwrap();
        assert!(transport.send(&server.url("/missing"), Duration::from_secs(5)).await.is_ok());
        assert!(transport.send(&server.url("/broken"), Duration::from_secs(5)).await.is_ok());
    }

    #[tokio::test]
    async fn test_slow_endpoint_times_out() {
        let server = MockHttpServer::new().await;
        server.mock_timeout("/slow").await;

        let transport = HttpTransport::new().unwrap();
        let result = transport.send(&server.url("/slow"), Duration::from_millis(100)).await;

        assert!(matches!(result, Err(AppError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_redirect_is_followed() {
        let server = MockHttpServer::new().await;
        server.mock_redirect("/old", "/new").await;

        let transport = HttpTransport::new().unwrap().with_method(ProbeMethod::Get);
        assert!(transport.send(&server.url("/old"), Duration::from_secs(5)).await.is_ok());
    }

    #[tokio::test]
    async fn test_connection_refused_is_an_error() {
        // Port 9 (discard) on loopback is expected to be closed
        let transport = HttpTransport::new().unwrap();
        let result = transport.send("http://127.0.0.1:9/", Duration::from_secs(2)).await;

        assert!(result.is_err());
    }
}

mod prober_tests {
    use super::*;

    #[tokio::test]
    async fn test_prober_against_mock_server() {
        let server = MockHttpServer::new().await;
        server.mock_success("/ping", Some(10)).await;

        let prober = Prober::new(Arc::new(HttpTransport::new().unwrap()), 1);
        let sample = prober.measure(&server.url("/ping"), Duration::from_secs(5)).await;

        assert!(sample.is_success());
        assert_eq!(sample.attempts(), 1);
        assert!(sample.latency_ms().unwrap() >= 10.0);
    }

    #[tokio::test]
    async fn test_prober_records_timeout_after_retries() {
        let server = MockHttpServer::new().await;
        server.mock_timeout("/hang").await;

        let prober = Prober::new(Arc::new(HttpTransport::new().unwrap()), 1);
        let sample = prober.measure(&server.url("/hang"), Duration::from_millis(100)).await;

        assert!(!sample.is_success());
        assert_eq!(sample.attempts(), 2);
        assert!(sample.latency_ms().is_none());
    }
}
