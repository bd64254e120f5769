//! Statistics aggregation for probe samples


use crate::models::metrics::{Sample, Statistics};

/// Reduces a batch of samples into summary statistics
///
/// Aggregation is a pure function of the ordered sample sequence: the same
/// input always yields the same [`Statistics`], and nothing is cached between
/// calls.
pub struct StatisticsAggregator;

impl StatisticsAggregator {
    /// Aggregate samples in probe order
    ///
    /// An empty slice yields [`Statistics::no_data`]. When every sample failed
    /// the latency fields are `None` and packet loss is 100.
    pub fn aggregate(samples: &[Sample]) -> Statistics {
        if samples.is_empty() {
            return Statistics::no_data();
        }

        let total = samples.len();
        let latencies: Vec<f64> = samples.iter().filter_map(Sample::latency_ms).collect();
        let failed = total - latencies.len();
        let packet_loss = failed as f64 / total as f64 * 100.0;

        if latencies.is_empty() {
            return Statistics {
                packet_loss: Some(packet_loss),
                total_count: total,
                ..Statistics::no_data()
            };
        }

        let avg = mean(&latencies);
        let min = latencies.iter().copied().fold(f64::INFINITY, f64::min);
        let max = latencies.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let mut sorted = latencies.clone();
        sorted.sort_by(|a, b| crate::utils::comparison::safe_float_cmp(*a, *b));

        Statistics {
            avg_ms: Some(avg),
            min_ms: Some(min),
            max_ms: Some(max),
            jitter_ms: Some(Self::jitter(&latencies)),
            packet_loss: Some(packet_loss),
            std_dev_ms: Some(Self::std_dev(&latencies, avg)),
            median_ms: Some(Self::percentile(&sorted, 50.0)),
            p95_ms: Some(Self::percentile(&sorted, 95.0)),
            total_count: total,
            success_count: latencies.len(),
        }
    }

    /// Mean absolute difference between consecutive values, in the order given
    pub fn jitter(latencies: &[f64]) -> f64 {
        if latencies.len() < 2 {
            return 0.0;
        }

        let total: f64 = latencies
            .windows(2)
            .map(|pair| (pair[1] - pair[0]).abs())
            .sum();

        total / (latencies.len() - 1) as f64
    }

    /// Linear-interpolated percentile over an ascending slice
    pub fn percentile(sorted_values: &[f64], percentile: f64) -> f64 {
        if sorted_values.is_empty() {
            return 0.0;
        }

        let index = (percentile / 100.0) * (sorted_values.len() as f64 - 1.0);
        let lower_index = index.floor() as usize;
        let upper_index = index.ceil() as usize;

        if lower_index == upper_index {
            sorted_values[lower_index]
        } else {
            let lower_value = sorted_values[lower_index];
            let upper_value = sorted_values[upper_index];
            let weight = index - lower_index as f64;
            lower_value + weight * (upper_value - lower_value)
        }
    }

    /// Population standard deviation
    fn std_dev(values: &[f64], mean: f64) -> f64 {
        if values.len() <= 1 {
            return 0.0;
        }

        let variance = values.iter()
            .map(|x| (x - mean).powi(2))
            .sum::<f64>() / values.len() as f64;

        variance.sqrt()
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}
