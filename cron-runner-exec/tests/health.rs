use std::time::Duration;

use cron_runner_exec::{HealthState, TriggerError, TriggerResult, TriggerState};

#[tokio::test]
async fn starts_ready_and_readiness_is_one_way() {
    let health = HealthState::new();
    assert!(health.is_ready().await);
    assert_eq!(health.readiness_report().await.status, "ready");

    health.set_ready(false).await;
    assert!(!health.is_ready().await);

    health.set_ready(true).await;
    assert!(!health.is_ready().await);
    let report = health.readiness_report().await;
    assert_eq!(report.status, "not_ready");
    assert!(!report.ready);
}

#[tokio::test]
async fn health_report_omits_checks_before_first_run() {
    let health = HealthState::new();
    let value = serde_json::to_value(health.health_report().await).unwrap();
    assert_eq!(value["status"], "healthy");
    assert_eq!(value["service"], "cron-runner");
    assert!(value.get("timestamp").is_some());
    assert!(value.get("checks").is_none());
}

#[tokio::test]
async fn last_recorded_run_wins() {
    let health = HealthState::new();
    health
        .record_pipeline_run(false, Duration::from_secs(3), 4, Some("boom".to_string()))
        .await;
    health
        .record_pipeline_run(true, Duration::from_millis(62_500), 1, None)
        .await;

    let last = health.last_pipeline_run().await.expect("recorded");
    assert!(last.success);
    assert_eq!(last.attempts, 1);

    let value = serde_json::to_value(health.health_report().await).unwrap();
    let run = &value["checks"]["last_pipeline_run"];
    assert_eq!(run["success"], true);
    assert_eq!(run["duration"], "1m2.5s");
    assert_eq!(run["attempts"], 1);
    assert!(run.get("error").is_none());
}

#[tokio::test]
async fn record_trigger_keeps_error_message() {
    let health = HealthState::new();
    let result = TriggerResult {
        success: false,
        job_id: None,
        state: TriggerState::StartFailed,
        attempts: 4,
        duration: Duration::from_millis(1500),
        status_code: Some(503),
        error: Some(TriggerError::TransientStatus {
            status: 503,
            body: "unavailable".to_string(),
        }),
        job_details: None,
    };

    health.record_trigger(&result).await;

    let snapshot = health.snapshot().await;
    assert!(snapshot.ready);
    let run = snapshot.last_pipeline_run.expect("recorded");
    assert!(!run.success);
    assert_eq!(run.duration, "1.5s");
    assert_eq!(run.attempts, 4);
    assert!(run.error.unwrap().contains("503"));
}
