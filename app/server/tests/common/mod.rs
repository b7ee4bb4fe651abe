//! FILENAME: tests/common/mod.rs
//! Test harness and fixtures for exporter HTTP integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use chrono::{DateTime, Utc};
use engine::{IntervalRecord, Period, SeriesMap, StatValue};
use exporter_lib::{create_app, AppState};
use http_body_util::BodyExt;
use recorder::{RecorderApi, RecorderError};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// One `statistics_during_period` call as seen by the fake.
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticsCall {
    pub entities: Vec<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub period: Period,
}

/// Canned recorder answers plus a log of every statistics call.
pub struct FakeRecorder {
    series: SeriesMap,
    entity_ids: Vec<String>,
    fail_with: Option<(String, String)>,
    calls: Mutex<Vec<StatisticsCall>>,
}

impl FakeRecorder {
    pub fn new(series: SeriesMap) -> Self {
        FakeRecorder {
            series,
            entity_ids: Vec::new(),
            fail_with: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn empty() -> Self {
        Self::new(SeriesMap::new())
    }

    pub fn with_entities(mut self, ids: &[&str]) -> Self {
        self.entity_ids = ids.iter().map(|id| id.to_string()).collect();
        self
    }

    pub fn failing(code: &str, message: &str) -> Self {
        let mut fake = Self::empty();
        fake.fail_with = Some((code.to_string(), message.to_string()));
        fake
    }

    pub fn calls(&self) -> Vec<StatisticsCall> {
        self.calls.lock().unwrap().clone()
    }

    fn failure(&self) -> Option<RecorderError> {
        self.fail_with.as_ref().map(|(code, message)| RecorderError::Remote {
            code: code.clone(),
            message: message.clone(),
        })
    }
}

#[async_trait]
impl RecorderApi for FakeRecorder {
    async fn statistics_during_period(
        &self,
        entities: &[String],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        period: Period,
    ) -> Result<SeriesMap, RecorderError> {
        self.calls.lock().unwrap().push(StatisticsCall {
            entities: entities.to_vec(),
            start,
            end,
            period,
        });
        if let Some(err) = self.failure() {
            return Err(err);
        }
        Ok(self.series.clone())
    }

    async fn entity_ids(&self) -> Result<Vec<String>, RecorderError> {
        if let Some(err) = self.failure() {
            return Err(err);
        }
        Ok(self.entity_ids.clone())
    }
}

/// Test harness owning the router and the fake behind it.
pub struct TestHarness {
    pub recorder: Arc<FakeRecorder>,
    pub app: Router,
}

impl TestHarness {
    pub fn new(recorder: FakeRecorder) -> Self {
        let recorder = Arc::new(recorder);
        let app = create_app(AppState::new(recorder.clone()));
        TestHarness { recorder, app }
    }

    /// Harness whose recorder returns the two-entity reference series.
    pub fn with_sample_series() -> Self {
        Self::new(FakeRecorder::new(sample_series()))
    }

    pub async fn post_export(&self, body: &str) -> Response {
        let request = Request::post("/api/export")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.app.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response {
        let request = Request::get(uri).body(Body::empty()).unwrap();
        self.app.clone().oneshot(request).await.unwrap()
    }
}

pub fn at(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap()
}

/// `sensor.a` = 21.5 and `sensor.b` = true, both for the interval ending at
/// one minute past the epoch.
pub fn sample_series() -> SeriesMap {
    let mut series = SeriesMap::new();
    series.insert(
        "sensor.a".to_string(),
        vec![IntervalRecord::new(at(0), at(60_000), 21.5)],
    );
    series.insert(
        "sensor.b".to_string(),
        vec![IntervalRecord::new(at(0), at(60_000), true)],
    );
    series
}

/// Two entities that never report at the same timestamp.
pub fn disjoint_series() -> SeriesMap {
    let mut series = SeriesMap::new();
    series.insert(
        "sensor.a".to_string(),
        vec![IntervalRecord::new(at(0), at(60_000), 1.0)],
    );
    series.insert(
        "sensor.b".to_string(),
        vec![IntervalRecord::new(at(60_000), at(120_000), StatValue::from("on"))],
    );
    series
}

pub fn export_body(format: &str) -> String {
    format!(
        r#"{{"entities":["sensor.a","sensor.b"],"start":"2024-01-01T00:00:00Z","end":"2024-01-02T00:00:00Z","period":"hour","format":"{}"}}"#,
        format
    )
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub fn assert_status(response: &Response, status: StatusCode) {
    assert_eq!(response.status(), status, "unexpected status");
}
