//! Single timed probe with retries

use super::ProbeTransport;
use crate::error::{AppError, Result};
use crate::logging::ProbeLogger;
use crate::models::metrics::Sample;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

/// Issues one probe against an endpoint, retrying failed attempts
///
/// Only the final outcome of a probe becomes a [`Sample`]. A probe that
/// succeeds on a retry reports the latency of that attempt alone.
#[derive(Clone)]
pub struct Prober {
    transport: Arc<dyn ProbeTransport>,
    retries: u32,
    logger: ProbeLogger,
}

impl Prober {
    pub fn new(transport: Arc<dyn ProbeTransport>, retries: u32) -> Self {
        Self {
            transport,
            retries,
            logger: ProbeLogger::default(),
        }
    }

    pub fn with_logger(mut self, logger: ProbeLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Total attempts a probe may use
    pub fn max_attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }

    /// Measure `endpoint` once, bounding each attempt by `timeout`
    ///
    /// Never fails: transport errors and timeouts end up in a failed sample
    /// carrying the last error message.
    pub async fn measure(&self, endpoint: &str, timeout: Duration) -> Sample {
        self.measure_with_id(endpoint, timeout, None).await
    }

    /// Same as [`measure`](Self::measure), tagging attempt logs with the
    /// batch's correlation ID
    pub async fn measure_in_batch(&self, endpoint: &str, timeout: Duration, correlation_id: &str) -> Sample {
        self.measure_with_id(endpoint, timeout, Some(correlation_id)).await
    }

    async fn measure_with_id(&self, endpoint: &str, timeout: Duration, correlation_id: Option<&str>) -> Sample {
        let max_attempts = self.max_attempts();
        let mut last_error = AppError::internal("probe made no attempts");

        for attempt in 1..=max_attempts {
            match self.attempt(endpoint, timeout).await {
                Ok(elapsed) => return Sample::success(elapsed, attempt),
                Err(error) => {
                    self.logger
                        .log_attempt_failed(endpoint, attempt, max_attempts, &error, correlation_id)
                        .await;
                    last_error = error;
                }
            }
        }

        Sample::failed(last_error.to_string(), max_attempts)
    }

    async fn attempt(&self, endpoint: &str, limit: Duration) -> Result<Duration> {
        match timeout(limit, self.transport.send(endpoint, limit)).await {
            Ok(result) => result,
            Err(_) => Err(AppError::timeout(format!(
                "No response from {} within {}ms",
                endpoint,
                limit.as_millis()
            ))),
        }
    }
}
