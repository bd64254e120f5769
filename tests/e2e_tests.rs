//! End-to-end tests through the library API
//!
//! Real HTTP probes against a local mock server, from batch execution through
//! statistics, quality grading, ranking and JSON export.

use network_quality_tester::{
    export_results, AppError, BatchRunner, CancelToken, ExportFormat, HttpTransport, ProbeConfig, ProbeTransport,
    QualityAnalyzer, QualityTier,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

async fn server_with(routes: &[(&str, u16, u64)]) -> MockServer {
    let server = MockServer::start().await;
    for &(route, status, delay_ms) in routes {
        Mock::given(method("HEAD"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).set_delay(Duration::from_millis(delay_ms)))
            .mount(&server)
            .await;
    }
    server
}

fn runner(options: Value) -> BatchRunner {
    let transport: Arc<dyn ProbeTransport> = Arc::new(HttpTransport::new().unwrap());
    BatchRunner::new(transport, ProbeConfig::from_options(&options).unwrap())
}

#[tokio::test]
async fn test_single_batch_against_mock_server() {
    let server = server_with(&[("/fast", 200, 0)]).await;
    let runner = runner(json!({ "timeoutMs": 2000, "retries": 0, "intervalMs": 0 }));

    let result = runner
        .run(&format!("{}/fast", server.uri()), 5, Duration::ZERO)
        .await
        .unwrap();

    assert_eq!(result.total_count(), 5);
    assert_eq!(result.success_count(), 5);
    assert!(!result.partial);
    assert_eq!(result.summary.packet_loss, Some(0.0));
    assert!(result.summary.avg_ms.unwrap() >= 0.0);
    assert!(result.summary.min_ms <= result.summary.max_ms);
}

#[tokio::test]
async fn test_error_status_still_counts_as_reply() {
    let server = server_with(&[("/missing", 404, 0)]).await;
    let runner = runner(json!({ "retries": 0, "intervalMs": 0 }));

    let result = runner.run(&format!("{}/missing", server.uri()), 2, Duration::ZERO).await.unwrap();
    assert_eq!(result.success_count(), 2);
}

#[tokio::test]
async fn test_interval_spaces_probes() {
    let server = server_with(&[("/ok", 200, 0)]).await;
    let runner = runner(json!({ "retries": 0 }));

    let started = Instant::now();
    runner
        .run(&format!("{}/ok", server.uri()), 3, Duration::from_millis(100))
        .await
        .unwrap();

    // Two gaps between three probes, none before the first or after the last
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(200));
    assert!(elapsed < Duration::from_millis(1500));
}

#[tokio::test]
async fn test_slow_endpoint_times_out() {
    let server = server_with(&[("/slow", 200, 2000)]).await;
    let runner = runner(json!({ "timeoutMs": 100, "retries": 1, "intervalMs": 0 }));

    let started = Instant::now();
    let result = runner.run(&format!("{}/slow", server.uri()), 2, Duration::ZERO).await.unwrap();

    assert_eq!(result.success_count(), 0);
    assert_eq!(result.summary.packet_loss, Some(100.0));
    assert!(result.samples.iter().all(|s| s.attempts() == 2));
    assert!(started.elapsed() < Duration::from_millis(1500));
    assert_eq!(QualityAnalyzer::tier(&result.summary), QualityTier::Unknown);
}

#[tokio::test]
async fn test_run_many_ranks_endpoints_and_exports() {
    let server = server_with(&[("/quick", 200, 0), ("/sluggish", 200, 60)]).await;
    let quick = format!("{}/quick", server.uri());
    let sluggish = format!("{}/sluggish", server.uri());
    let refused = "http://127.0.0.1:9/".to_string();

    let runner = runner(json!({ "timeoutMs": 1000, "retries": 0, "intervalMs": 0 }));
    let results = runner
        .run_many(&[refused.clone(), sluggish.clone(), quick.clone()], 3)
        .await
        .unwrap();

    assert_eq!(results.endpoints(), vec![refused.as_str(), sluggish.as_str(), quick.as_str()]);

    let comparison = QualityAnalyzer::compare(&results);
    assert_eq!(comparison.best_endpoint.as_deref(), Some(quick.as_str()));
    assert_eq!(comparison.ranking.len(), 2);
    assert_eq!(comparison.ranking[1].endpoint, sluggish);
    assert_eq!(comparison.unranked, vec![refused.clone()]);

    let exported: Value = serde_json::from_str(&export_results(&results, ExportFormat::Json).unwrap()).unwrap();
    assert_eq!(exported["results"][refused.as_str()]["summary"]["packet_loss"], 100.0);
    assert_eq!(exported["comparison"]["best_endpoint"], quick.as_str());
    assert_eq!(exported["quality"][0]["tier"], "Unknown");
}

#[tokio::test]
async fn test_concurrent_run_matches_sequential_shape() {
    let server = server_with(&[("/a", 200, 20), ("/b", 200, 0)]).await;
    let endpoints = vec![format!("{}/a", server.uri()), format!("{}/b", server.uri())];

    let runner = runner(json!({ "retries": 0, "intervalMs": 10 }));
    let results = runner.run_many_concurrent(&endpoints, 4).await.unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results.endpoints(), vec![endpoints[0].as_str(), endpoints[1].as_str()]);
    for result in results.iter() {
        assert_eq!(result.total_count(), 4);
        assert_eq!(result.success_count(), 4);
    }
}

#[tokio::test]
async fn test_cancellation_yields_partial_result() {
    let server = server_with(&[("/ok", 200, 0)]).await;
    let token = CancelToken::new();
    let runner = runner(json!({ "retries": 0, "intervalMs": 100 })).with_cancel_token(token.clone());

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(250)).await;
        token.cancel();
    });

    let result = runner
        .run(&format!("{}/ok", server.uri()), 50, Duration::from_millis(100))
        .await
        .unwrap();
    canceller.await.unwrap();

    assert!(result.partial);
    assert!(result.total_count() >= 1 && result.total_count() < 50);
    assert_eq!(result.summary.total_count, result.total_count());
}

#[tokio::test]
async fn test_invalid_arguments_fail_before_probing() {
    let server = server_with(&[]).await;
    let runner = runner(json!({}));
    let endpoint = format!("{}/never", server.uri());

    assert!(matches!(runner.run(&endpoint, 0, Duration::ZERO).await, Err(AppError::InvalidArgument(_))));
    assert!(matches!(runner.run("", 3, Duration::ZERO).await, Err(AppError::InvalidArgument(_))));
    assert!(matches!(
        runner.run_many(&[endpoint.clone(), endpoint.clone()], 1).await,
        Err(AppError::InvalidArgument(_))
    ));

    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[test]
fn test_probe_config_options() {
    let config = ProbeConfig::from_options(&json!({ "timeoutMs": 250, "unknown": true })).unwrap();
    assert_eq!(config.timeout, Duration::from_millis(250));
    assert_eq!(config.retries, 3);
    assert_eq!(config.interval, Duration::from_millis(1000));

    assert!(ProbeConfig::from_options(&json!({ "timeoutMs": -1 })).is_err());
    assert!(ProbeConfig::from_options(&json!({ "intervalMs": -5 })).is_err());
    assert!(ProbeConfig::from_options(&json!({ "retries": 1.5 })).is_err());
}
