//! Probe samples, batch results and aggregate statistics

use crate::error::{AppError, Result};
use crate::stats::StatisticsAggregator;
use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::time::Duration;

/// Outcome of one probe (after retries) against an endpoint
///
/// A sample carries a latency only when it succeeded; the constructors are the
/// only way to build one so the two can never disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    latency_ms: Option<f64>,
    success: bool,
    timestamp: DateTime<Utc>,
    attempts: u32,
    error: Option<String>,
}

impl Sample {
    /// Successful probe with the elapsed time of the attempt that succeeded
    pub fn success(latency: Duration, attempts: u32) -> Self {
        Self::success_ms(latency.as_secs_f64() * 1000.0, attempts)
    }

    /// Successful probe with a latency already expressed in milliseconds
    ///
    /// `latency_ms` must be finite and non-negative.
    pub fn success_ms(latency_ms: f64, attempts: u32) -> Self {
        debug_assert!(
            latency_ms.is_finite() && latency_ms >= 0.0,
            "latency must be finite and non-negative, got {}",
            latency_ms
        );
        Self {
            latency_ms: Some(latency_ms),
            success: true,
            timestamp: Utc::now(),
            attempts,
            error: None,
        }
    }

    /// Failed probe; `error` describes the last failed attempt
    pub fn failed<S: Into<String>>(error: S, attempts: u32) -> Self {
        Self {
            latency_ms: None,
            success: false,
            timestamp: Utc::now(),
            attempts,
            error: Some(error.into()),
        }
    }

    pub fn latency_ms(&self) -> Option<f64> {
        self.latency_ms
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Number of transport attempts spent on this probe
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Aggregate statistics over one batch of samples
///
/// Latency fields are `None` when no sample succeeded. `packet_loss` is `None`
/// only for an empty sample set, which is the no-data state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    /// Mean latency of successful samples (milliseconds)
    pub avg_ms: Option<f64>,

    /// Minimum successful latency (milliseconds)
    pub min_ms: Option<f64>,

    /// Maximum successful latency (milliseconds)
    pub max_ms: Option<f64>,

    /// Mean absolute difference between consecutive successful latencies
    pub jitter_ms: Option<f64>,

    /// Percentage of samples that failed (0.0-100.0)
    pub packet_loss: Option<f64>,

    /// Population standard deviation of successful latencies
    pub std_dev_ms: Option<f64>,

    /// Median successful latency
    pub median_ms: Option<f64>,

    /// 95th percentile successful latency
    pub p95_ms: Option<f64>,

    /// Number of samples aggregated
    pub total_count: usize,

    /// Number of successful samples aggregated
    pub success_count: usize,
}

impl Statistics {
    /// Statistics for an empty sample set
    pub fn no_data() -> Self {
        Self {
            avg_ms: None,
            min_ms: None,
            max_ms: None,
            jitter_ms: None,
            packet_loss: None,
            std_dev_ms: None,
            median_ms: None,
            p95_ms: None,
            total_count: 0,
            success_count: 0,
        }
    }

    /// True when nothing was aggregated at all
    pub fn is_no_data(&self) -> bool {
        self.total_count == 0
    }

    /// True when at least one sample succeeded
    pub fn has_successes(&self) -> bool {
        self.success_count > 0
    }

    /// Number of failed samples
    pub fn failed_count(&self) -> usize {
        self.total_count - self.success_count
    }

    /// Format average latency for display
    pub fn format_avg(&self) -> String {
        format_ms(self.avg_ms)
    }
}

impl Default for Statistics {
    fn default() -> Self {
        Self::no_data()
    }
}

/// Format an optional millisecond value with two decimals, or "N/A"
pub fn format_ms(value: Option<f64>) -> String {
    match value {
        Some(ms) => format!("{:.2}ms", ms),
        None => "N/A".to_string(),
    }
}

/// All samples collected for one endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    /// Endpoint that was probed
    pub endpoint: String,

    /// Samples in probe order
    pub samples: Vec<Sample>,

    /// Statistics computed when the batch finished
    pub summary: Statistics,

    /// Number of probes the batch was asked to run
    pub requested_count: u32,

    /// Batch stopped early because it was cancelled
    pub partial: bool,

    /// When the batch started
    pub started_at: DateTime<Utc>,

    /// When the batch completed
    pub completed_at: Option<DateTime<Utc>>,
}

impl TestResult {
    /// Create a new, empty result for a batch about to start
    pub fn new(endpoint: String, requested_count: u32) -> Self {
        Self {
            endpoint,
            samples: Vec::with_capacity(requested_count as usize),
            summary: Statistics::no_data(),
            requested_count,
            partial: false,
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Append a sample in probe order
    pub fn add_sample(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    /// Compute the summary and close the batch
    pub fn finalize(&mut self, partial: bool) {
        self.summary = StatisticsAggregator::aggregate(&self.samples);
        self.partial = partial;
        self.completed_at = Some(Utc::now());
    }

    /// Whether the summary has been computed
    pub fn is_finalized(&self) -> bool {
        self.completed_at.is_some()
    }

    pub fn success_count(&self) -> usize {
        self.samples.iter().filter(|s| s.is_success()).count()
    }

    pub fn total_count(&self) -> usize {
        self.samples.len()
    }
}

/// Results for several endpoints, keyed by endpoint in test order
#[derive(Debug, Clone, Default)]
pub struct MultiEndpointResult {
    results: Vec<TestResult>,
}

impl MultiEndpointResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a finished batch; endpoints must be unique
    pub fn insert(&mut self, result: TestResult) -> Result<()> {
        if self.get(&result.endpoint).is_some() {
            return Err(AppError::invalid_argument(format!(
                "Duplicate endpoint in results: {}",
                result.endpoint
            )));
        }
        self.results.push(result);
        Ok(())
    }

    pub fn get(&self, endpoint: &str) -> Option<&TestResult> {
        self.results.iter().find(|r| r.endpoint == endpoint)
    }

    /// Results in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &TestResult> {
        self.results.iter()
    }

    pub fn endpoints(&self) -> Vec<&str> {
        self.results.iter().map(|r| r.endpoint.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// True if any batch was cut short by cancellation
    pub fn is_partial(&self) -> bool {
        self.results.iter().any(|r| r.partial)
    }
}

impl Serialize for MultiEndpointResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.results.len()))?;
        for result in &self.results {
            map.serialize_entry(&result.endpoint, result)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_success() {
        let sample = Sample::success(Duration::from_millis(42), 1);

        assert!(sample.is_success());
        assert_eq!(sample.latency_ms(), Some(42.0));
        assert_eq!(sample.attempts(), 1);
        assert!(sample.error().is_none());
    }

    #[test]
    fn test_sample_failed_has_no_latency() {
        let sample = Sample::failed("connection refused", 4);

        assert!(!sample.is_success());
        assert_eq!(sample.latency_ms(), None);
        assert_eq!(sample.attempts(), 4);
        assert_eq!(sample.error(), Some("connection refused"));
    }

    #[test]
    fn test_test_result_finalize() {
        let mut result = TestResult::new("https://example.com".to_string(), 3);
        result.add_sample(Sample::success_ms(10.0, 1));
        result.add_sample(Sample::failed("timeout", 4));
        result.add_sample(Sample::success_ms(20.0, 2));

        assert!(!result.is_finalized());
        result.finalize(false);

        assert!(result.is_finalized());
        assert!(!result.partial);
        assert_eq!(result.total_count(), 3);
        assert_eq!(result.success_count(), 2);
        assert_eq!(result.summary.avg_ms, Some(15.0));
        assert!((result.summary.packet_loss.unwrap() - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "latency must be finite")]
    fn test_nan_latency_rejected() {
        let _ = Sample::success_ms(f64::NAN, 1);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "latency must be finite")]
    fn test_negative_latency_rejected() {
        let _ = Sample::success_ms(-1.0, 1);
    }

    #[test]
    fn test_statistics_no_data() {
        let stats = Statistics::no_data();
        assert!(stats.is_no_data());
        assert!(!stats.has_successes());
        assert_eq!(stats.format_avg(), "N/A");
    }

    #[test]
    fn test_format_ms_rounds_for_display() {
        assert_eq!(format_ms(Some(12.3456)), "12.35ms");
        assert_eq!(format_ms(None), "N/A");
    }

    #[test]
    fn test_multi_endpoint_result_rejects_duplicates() {
        let mut multi = MultiEndpointResult::new();
        multi.insert(TestResult::new("a".to_string(), 1)).unwrap();

        let duplicate = multi.insert(TestResult::new("a".to_string(), 1));
        assert!(matches!(duplicate, Err(AppError::InvalidArgument(_))));
        assert_eq!(multi.len(), 1);
    }

    #[test]
    fn test_multi_endpoint_result_preserves_order() {
        let mut multi = MultiEndpointResult::new();
        for endpoint in ["zeta", "alpha", "mid"] {
            multi.insert(TestResult::new(endpoint.to_string(), 1)).unwrap();
        }

        assert_eq!(multi.endpoints(), vec!["zeta", "alpha", "mid"]);

        let json = serde_json::to_string(&multi).unwrap();
        let zeta = json.find("\"zeta\"").unwrap();
        let alpha = json.find("\"alpha\"").unwrap();
        let mid = json.find("\"mid\"").unwrap();
        assert!(zeta < alpha && alpha < mid);
    }
}
