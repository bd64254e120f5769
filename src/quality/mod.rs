//! Quality grading and endpoint comparison
//!
//! Tiers are evaluated as ordered rules, best first. The first rule whose
//! three limits all hold decides the tier, and anything that matches none of
//! them is `Poor`. Statistics without a successful sample grade as `Unknown`.

use crate::models::metrics::{MultiEndpointResult, Statistics};
use crate::types::QualityTier;
use crate::utils::comparison::safe_float_cmp;
use serde::{Deserialize, Serialize};

/// Upper bounds (exclusive) a batch must stay under to earn a tier
#[derive(Debug, Clone, Copy)]
struct TierRule {
    tier: QualityTier,
    avg_below_ms: f64,
    /// `None` means no loss at all is tolerated
    loss_below: Option<f64>,
    jitter_below_ms: f64,
}

impl TierRule {
    fn matches(&self, avg_ms: f64, packet_loss: f64, jitter_ms: f64) -> bool {
        let loss_ok = match self.loss_below {
            Some(limit) => packet_loss < limit,
            None => packet_loss == 0.0,
        };
        avg_ms < self.avg_below_ms && loss_ok && jitter_ms < self.jitter_below_ms
    }
}

const TIER_RULES: [TierRule; 3] = [
    TierRule { tier: QualityTier::Excellent, avg_below_ms: 50.0, loss_below: None, jitter_below_ms: 5.0 },
    TierRule { tier: QualityTier::Good, avg_below_ms: 100.0, loss_below: Some(1.0), jitter_below_ms: 20.0 },
    TierRule { tier: QualityTier::Fair, avg_below_ms: 200.0, loss_below: Some(5.0), jitter_below_ms: 40.0 },
];

/// Quality grade for one batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub tier: QualityTier,
    pub recommendation: String,
    /// Graded from an empty sample set
    pub no_data: bool,
}

impl QualityReport {
    pub fn is_no_data(&self) -> bool {
        self.no_data
    }
}

/// One endpoint's place in a comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEndpoint {
    /// 1-based position, 1 is best
    pub rank: usize,
    pub endpoint: String,
    pub avg_ms: f64,
    pub packet_loss: f64,
    pub jitter_ms: f64,
    pub tier: QualityTier,
}

/// Ranking of several endpoints by average latency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// Endpoints with at least one success, best first
    pub ranking: Vec<RankedEndpoint>,
    pub best_endpoint: Option<String>,
    /// Endpoints with no successful sample, in input order
    pub unranked: Vec<String>,
}

impl ComparisonReport {
    /// True when no endpoint produced a single success
    pub fn is_no_data(&self) -> bool {
        self.ranking.is_empty()
    }
}

/// Maps statistics to quality tiers
pub struct QualityAnalyzer;

impl QualityAnalyzer {
    /// Grade one set of statistics
    pub fn classify(statistics: &Statistics) -> QualityReport {
        let tier = Self::tier(statistics);
        QualityReport {
            tier,
            recommendation: Self::recommendation(tier, statistics).to_string(),
            no_data: statistics.is_no_data(),
        }
    }

    /// Tier for a set of statistics; `Unknown` without a successful sample
    pub fn tier(statistics: &Statistics) -> QualityTier {
        let Some(avg_ms) = statistics.avg_ms else {
            return QualityTier::Unknown;
        };
        let packet_loss = statistics.packet_loss.unwrap_or(f64::INFINITY);
        let jitter_ms = statistics.jitter_ms.unwrap_or(f64::INFINITY);

        TIER_RULES
            .iter()
            .find(|rule| rule.matches(avg_ms, packet_loss, jitter_ms))
            .map(|rule| rule.tier)
            .unwrap_or(QualityTier::Poor)
    }

    /// Rank endpoints by average latency, then packet loss, then input order
    pub fn compare(results: &MultiEndpointResult) -> ComparisonReport {
        let mut candidates = Vec::new();
        let mut unranked = Vec::new();

        for result in results.iter() {
            let stats = &result.summary;
            match stats.avg_ms {
                Some(avg_ms) => candidates.push((result.endpoint.as_str(), avg_ms, stats)),
                None => unranked.push(result.endpoint.clone()),
            }
        }

        // Stable sort keeps input order for full ties
        candidates.sort_by(|a, b| {
            safe_float_cmp(a.1, b.1).then_with(|| {
                safe_float_cmp(a.2.packet_loss.unwrap_or(0.0), b.2.packet_loss.unwrap_or(0.0))
            })
        });

        let ranking: Vec<RankedEndpoint> = candidates
            .into_iter()
            .enumerate()
            .map(|(index, (endpoint, avg_ms, stats))| RankedEndpoint {
                rank: index + 1,
                endpoint: endpoint.to_string(),
                avg_ms,
                packet_loss: stats.packet_loss.unwrap_or(0.0),
                jitter_ms: stats.jitter_ms.unwrap_or(0.0),
                tier: Self::tier(stats),
            })
            .collect();

        ComparisonReport {
            best_endpoint: ranking.first().map(|r| r.endpoint.clone()),
            ranking,
            unranked,
        }
    }

    fn recommendation(tier: QualityTier, statistics: &Statistics) -> &'static str {
        match tier {
            QualityTier::Excellent => {
                "Excellent connection, suitable for gaming, video calls and other real-time use."
            }
            QualityTier::Good => {
                "Good connection for most uses; real-time applications may notice occasional delays."
            }
            QualityTier::Fair => {
                "Fair connection, fine for browsing and streaming but expect lag in real-time applications."
            }
            QualityTier::Poor => {
                "Poor connection; check the local network or try a closer endpoint."
            }
            QualityTier::Unknown if statistics.is_no_data() => {
                "Insufficient data: no probes were completed, run the test again."
            }
            QualityTier::Unknown => {
                "Every probe failed; the endpoint may be unreachable or blocking requests."
            }
        }
    }
}
