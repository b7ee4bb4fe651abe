//! FILENAME: core/recorder/src/statistics.rs
//! PURPOSE: The two recorder queries the exporter relies on.
//! CONTEXT: Range boundaries go out encoded in local time with their UTC
//! offset so the recorder cuts periods on the caller's calendar days.

use crate::messages::{Command, EntityState};
use crate::{RecorderClient, RecorderError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use engine::{timestamp, Period, SeriesMap, StatisticKind};

/// Entity domains that never carry exportable statistics.
pub const DISALLOWED_DOMAINS: [&str; 5] = ["update", "automation", "conversation", "scene", "event"];

#[async_trait]
pub trait RecorderApi: Send + Sync {
    /// Fetches the `state` statistics of `entities` between `start` and `end`,
    /// aggregated per `period`.
    async fn statistics_during_period(
        &self,
        entities: &[String],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        period: Period,
    ) -> Result<SeriesMap, RecorderError>;

    /// Ids of every current entity outside `DISALLOWED_DOMAINS`.
    async fn entity_ids(&self) -> Result<Vec<String>, RecorderError>;
}

#[async_trait]
impl RecorderApi for RecorderClient {
    async fn statistics_during_period(
        &self,
        entities: &[String],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        period: Period,
    ) -> Result<SeriesMap, RecorderError> {
        let command = Command::StatisticsDuringPeriod {
            start_time: timestamp::encode_local(&start),
            end_time: timestamp::encode_local(&end),
            period,
            statistic_ids: entities.to_vec(),
            types: vec![StatisticKind::State],
        };
        let result = self.call(&command).await?;
        let series: SeriesMap = serde_json::from_value(result)?;

        log::info!(
            target: "RECORDER",
            "statistics entities={} returned={} period={}",
            entities.len(),
            series.len(),
            period
        );
        Ok(series)
    }

    async fn entity_ids(&self) -> Result<Vec<String>, RecorderError> {
        let result = self.call(&Command::GetStates).await?;
        let states: Vec<EntityState> = serde_json::from_value(result)?;
        Ok(exportable_entity_ids(states))
    }
}

/// Keeps the ids of states whose domain is not disallowed, in input order.
pub fn exportable_entity_ids(states: Vec<EntityState>) -> Vec<String> {
    states
        .into_iter()
        .map(|state| state.entity_id)
        .filter(|id| {
            let domain = id.split('.').next().unwrap_or_default();
            !DISALLOWED_DOMAINS.contains(&domain)
        })
        .collect()
}
