//! FILENAME: tests/test_export.rs
//! Integration tests for `POST /api/export`.

mod common;

use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use common::*;
use engine::{timestamp, Period};
use exporter_lib::ErrorBody;

// ============================================================================
// VALIDATION TESTS
// ============================================================================

#[tokio::test]
async fn test_invalid_request_never_reaches_recorder() {
    let harness = TestHarness::with_sample_series();
    let bodies = [
        r#"{"entities":[],"start":"2024-01-01T00:00:00Z","end":"2024-01-02T00:00:00Z","period":"hour"}"#,
        r#"{"entities":["sensor.a"],"start":"2024-01-02T00:00:00Z","end":"2024-01-01T00:00:00Z","period":"hour"}"#,
        r#"{"entities":["sensor.a"],"start":"soon","end":"2024-01-01T00:00:00Z","period":"hour"}"#,
        r#"{"entities":["sensor.a"],"start":"2024-01-01T00:00:00Z","end":"2024-01-02T00:00:00Z","period":"fortnight"}"#,
        r#"{"entities":["sensor.a"],"start":"2024-01-01T00:00:00Z","end":"2024-01-02T00:00:00Z","period":"hour","format":"ods"}"#,
        "[1, 2",
    ];

    for body in bodies {
        let response = harness.post_export(body).await;
        assert_status(&response, StatusCode::BAD_REQUEST);
        let error: ErrorBody = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(error.code, 400);
        assert!(!error.message.is_empty());
    }

    assert!(harness.recorder.calls().is_empty());
}

// ============================================================================
// PIPELINE TESTS
// ============================================================================

#[tokio::test]
async fn test_recorder_receives_skewed_range() {
    let harness = TestHarness::with_sample_series();
    let response = harness.post_export(&export_body("csv")).await;
    assert_status(&response, StatusCode::OK);

    let calls = harness.recorder.calls();
    assert_eq!(calls.len(), 1);
    let call = &calls[0];
    assert_eq!(call.entities, vec!["sensor.a", "sensor.b"]);
    assert_eq!(call.period, Period::Hour);
    assert_eq!(call.start.to_rfc3339(), "2023-12-31T23:59:00+00:00");
    assert_eq!(call.end.to_rfc3339(), "2024-01-01T23:59:00+00:00");

    // Offset-encoded as the recorder receives it.
    let encoded = timestamp::encode_local(&call.start);
    assert!(!encoded.ends_with('Z'));
    assert_eq!(encoded.len(), "2023-12-31T23:59:00+00:00".len());
}

#[tokio::test]
async fn test_csv_export_body_and_headers() {
    let harness = TestHarness::with_sample_series();
    let response = harness.post_export(&export_body("csv")).await;
    assert_status(&response, StatusCode::OK);

    let headers = response.headers();
    assert_eq!(headers[CONTENT_TYPE], "text/plain; charset=utf-8");
    assert_eq!(headers[CONTENT_DISPOSITION], "attachment; filename=\"statistics.csv\"");

    let body = String::from_utf8(body_bytes(response).await).unwrap();
    assert_eq!(
        body,
        "\"timestamp\";\"sensor.a\";\"sensor.b\"\n\"1970-01-01T00:01:00.000Z\";21.5;true"
    );
}

#[tokio::test]
async fn test_delimited_alias_is_csv() {
    let harness = TestHarness::with_sample_series();
    let response = harness.post_export(&export_body("delimited")).await;
    assert_status(&response, StatusCode::OK);
    assert_eq!(
        response.headers()[CONTENT_DISPOSITION],
        "attachment; filename=\"statistics.csv\""
    );
}

#[tokio::test]
async fn test_csv_keeps_positions_for_disjoint_entities() {
    let harness = TestHarness::new(FakeRecorder::new(disjoint_series()));
    let response = harness.post_export(&export_body("csv")).await;
    assert_status(&response, StatusCode::OK);

    let body = String::from_utf8(body_bytes(response).await).unwrap();
    let lines: Vec<&str> = body.split('\n').collect();
    assert_eq!(
        lines,
        vec![
            "\"timestamp\";\"sensor.a\";\"sensor.b\"",
            "\"1970-01-01T00:01:00.000Z\";1;undefined",
            "\"1970-01-01T00:02:00.000Z\";undefined;\"on\"",
        ]
    );
}

#[tokio::test]
async fn test_xlsx_is_the_default_format() {
    let harness = TestHarness::with_sample_series();
    let body = r#"{"entities":["sensor.a","sensor.b"],"start":"2024-01-01T00:00:00Z","end":"2024-01-02T00:00:00Z","period":"day"}"#;
    let response = harness.post_export(body).await;
    assert_status(&response, StatusCode::OK);

    let headers = response.headers();
    assert_eq!(
        headers[CONTENT_TYPE],
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
    assert_eq!(headers[CONTENT_DISPOSITION], "attachment; filename=\"statistics.xlsx\"");

    let bytes = body_bytes(response).await;
    assert!(bytes.starts_with(b"PK\x03\x04"), "not a zip package");
}

// ============================================================================
// FAILURE TESTS
// ============================================================================

#[tokio::test]
async fn test_empty_result_is_not_found() {
    let harness = TestHarness::new(FakeRecorder::empty());
    let response = harness.post_export(&export_body("csv")).await;
    assert_status(&response, StatusCode::NOT_FOUND);

    let error: ErrorBody = serde_json::from_value(body_json(response).await).unwrap();
    assert_eq!(error.code, 404);
    assert_eq!(harness.recorder.calls().len(), 1);
}

#[tokio::test]
async fn test_upstream_failure_is_bad_gateway() {
    let harness = TestHarness::new(FakeRecorder::failing("invalid_format", "Invalid period"));
    let response = harness.post_export(&export_body("xlsx")).await;
    assert_status(&response, StatusCode::BAD_GATEWAY);

    let error: ErrorBody = serde_json::from_value(body_json(response).await).unwrap();
    assert_eq!(error.code, 502);
    assert!(error.message.contains("Invalid period"));
}

#[tokio::test]
async fn test_serialization_failure_before_any_byte_is_internal_error() {
    let mut series = engine::SeriesMap::new();
    for i in 0..16_384 {
        series.insert(
            format!("sensor.s{}", i),
            vec![engine::IntervalRecord::new(at(0), at(60_000), 1.0)],
        );
    }
    let harness = TestHarness::new(FakeRecorder::new(series));
    let response = harness.post_export(&export_body("xlsx")).await;
    assert_status(&response, StatusCode::INTERNAL_SERVER_ERROR);

    let error: ErrorBody = serde_json::from_value(body_json(response).await).unwrap();
    assert_eq!(error.code, 500);
    assert!(error.message.contains("worksheet limits"));
}
