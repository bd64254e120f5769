//! Batch execution: repeated probes per endpoint, across many endpoints
//!
//! A batch runs its probes strictly one after another with a fixed interval
//! between them, so jitter reflects real temporal spacing. Cancellation is
//! observed between probes, never in the middle of one.

pub mod cancel;

pub use cancel::CancelToken;

use crate::{
    client::{ProbeTransport, Prober},
    error::{AppError, Result},
    logging::ProbeLogger,
    models::{
        config::ProbeConfig,
        metrics::{MultiEndpointResult, TestResult},
    },
};
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// Drives the prober over one or more endpoints
pub struct BatchRunner {
    prober: Prober,
    config: ProbeConfig,
    cancel: CancelToken,
    logger: ProbeLogger,
}

impl BatchRunner {
    pub fn new(transport: Arc<dyn ProbeTransport>, config: ProbeConfig) -> Self {
        Self {
            prober: Prober::new(transport, config.retries),
            config,
            cancel: CancelToken::new(),
            logger: ProbeLogger::default(),
        }
    }

    pub fn with_logger(mut self, logger: ProbeLogger) -> Self {
        self.prober = self.prober.with_logger(logger.clone());
        self.logger = logger;
        self
    }

    /// Share an externally controlled cancellation token
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that cancels runs started by this runner
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Probe `endpoint` exactly `count` times, `interval` apart
    ///
    /// Fails with `InvalidArgument` before any network activity when `count`
    /// is zero or the endpoint is empty. Individual probe failures are
    /// recorded as failed samples and never abort the batch.
    pub async fn run(&self, endpoint: &str, count: u32, interval: Duration) -> Result<TestResult> {
        validate_count(count)?;
        validate_endpoint(endpoint)?;

        Ok(self.execute_batch(endpoint, count, interval).await)
    }

    /// Run one batch per endpoint, in the order given
    ///
    /// Every endpoint is validated first; empty or duplicate endpoints are
    /// rejected before anything is probed. Endpoints not yet started when
    /// cancellation is observed are left out of the result.
    pub async fn run_many(&self, endpoints: &[String], tests_per_endpoint: u32) -> Result<MultiEndpointResult> {
        validate_count(tests_per_endpoint)?;
        validate_endpoints(endpoints)?;

        let mut results = MultiEndpointResult::new();
        for endpoint in endpoints {
            if self.cancel.is_cancelled() {
                break;
            }

            let result = self.execute_batch(endpoint, tests_per_endpoint, self.config.interval).await;
            results.insert(result)?;
        }

        Ok(results)
    }

    /// Like [`run_many`](Self::run_many) but with every batch in flight at once
    ///
    /// Each batch keeps its own strictly ordered samples; results are
    /// assembled in input order once all batches finish.
    pub async fn run_many_concurrent(&self, endpoints: &[String], tests_per_endpoint: u32) -> Result<MultiEndpointResult> {
        validate_count(tests_per_endpoint)?;
        validate_endpoints(endpoints)?;

        let batches = endpoints
            .iter()
            .map(|endpoint| self.execute_batch(endpoint, tests_per_endpoint, self.config.interval));

        let mut results = MultiEndpointResult::new();
        for result in join_all(batches).await {
            // Cancelled before its first probe: never started
            if result.partial && result.samples.is_empty() {
                continue;
            }
            results.insert(result)?;
        }

        Ok(results)
    }

    async fn execute_batch(&self, endpoint: &str, count: u32, interval: Duration) -> TestResult {
        let correlation_id = self.logger.log_batch_start(endpoint, count).await;
        let mut result = TestResult::new(endpoint.to_string(), count);
        let mut cancelled = false;

        for sequence in 0..count {
            if sequence > 0 && !interval.is_zero() {
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => {}
                    _ = tokio::time::sleep(interval) => {}
                }
            }

            if self.cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            let sample = self.prober.measure_in_batch(endpoint, self.config.timeout, &correlation_id).await;
            self.logger.log_probe(endpoint, sequence as usize + 1, &sample, &correlation_id).await;
            result.add_sample(sample);
        }

        if cancelled {
            self.logger.log_cancelled(endpoint, result.samples.len(), count, &correlation_id).await;
        }

        result.finalize(cancelled);
        self.logger.log_batch_complete(&result, &correlation_id).await;
        result
    }
}

fn validate_count(count: u32) -> Result<()> {
    if count == 0 {
        return Err(AppError::invalid_argument("Probe count must be a positive integer"));
    }
    Ok(())
}

fn validate_endpoint(endpoint: &str) -> Result<()> {
    if endpoint.trim().is_empty() {
        return Err(AppError::invalid_argument("Endpoint cannot be empty"));
    }
    Ok(())
}

fn validate_endpoints(endpoints: &[String]) -> Result<()> {
    let mut seen = HashSet::new();
    for endpoint in endpoints {
        validate_endpoint(endpoint)?;
        if !seen.insert(endpoint.as_str()) {
            return Err(AppError::invalid_argument(format!("Endpoint listed twice: {}", endpoint)));
        }
    }
    Ok(())
}
