use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, warn};

use super::point::DataPoint;
use crate::config::InfluxSettings;

/// Timestamp unit of the `/write` endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Precision {
    #[serde(rename = "ns")]
    Nanoseconds,
    #[serde(rename = "u")]
    Microseconds,
    #[serde(rename = "ms")]
    Milliseconds,
    #[default]
    #[serde(rename = "s")]
    Seconds,
    #[serde(rename = "m")]
    Minutes,
    #[serde(rename = "h")]
    Hours,
}

impl Precision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Precision::Nanoseconds => "ns",
            Precision::Microseconds => "u",
            Precision::Milliseconds => "ms",
            Precision::Seconds => "s",
            Precision::Minutes => "m",
            Precision::Hours => "h",
        }
    }

    /// `at` as an epoch timestamp in this unit
    pub fn timestamp(&self, at: DateTime<Utc>) -> i64 {
        match self {
            Precision::Nanoseconds => at
                .timestamp_nanos_opt()
                .unwrap_or_else(|| at.timestamp_micros().saturating_mul(1_000)),
            Precision::Microseconds => at.timestamp_micros(),
            Precision::Milliseconds => at.timestamp_millis(),
            Precision::Seconds => at.timestamp(),
            Precision::Minutes => at.timestamp() / 60,
            Precision::Hours => at.timestamp() / 3_600,
        }
    }
}

/// What happened to a published point. Publication never fails the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    Published,
    Skipped(SkipReason),
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Host, port, database or field name missing
    Incomplete,
    /// Zero is treated as "no measurement"
    ZeroValue,
}

/// Best-effort writer for the InfluxDB 1.x `/write` endpoint
pub struct InfluxPublisher {
    client: Client,
    host: Option<String>,
    port: Option<u16>,
    database: Option<String>,
    user: Option<String>,
    password: Option<String>,
    precision: Precision,
    tags: Vec<(String, String)>,
}

impl InfluxPublisher {
    pub fn new(settings: InfluxSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create InfluxDB HTTP client")?;

        let tags = settings
            .tags
            .iter()
            .map(|(k, v)| (k.clone(), v.to_string()))
            .collect();

        Ok(Self {
            client,
            host: settings.host.filter(|h| !h.is_empty()),
            port: settings.port,
            database: settings.database.filter(|d| !d.is_empty()),
            user: settings.user.filter(|u| !u.is_empty()),
            password: settings.password,
            precision: settings.precision,
            tags,
        })
    }

    /// `None` when the endpoint configuration is incomplete
    pub fn write_url(&self) -> Option<String> {
        let host = self.host.as_deref()?;
        let port = self.port?;
        let database = self.database.as_deref()?;
        Some(format!(
            "http://{}:{}/write?db={}&precision={}",
            host,
            port,
            database,
            self.precision.as_str()
        ))
    }

    /// Send one point. Skips incomplete configuration and zero values,
    /// logs non-success responses; nothing is retried.
    pub async fn publish(&self, point: &DataPoint) -> PublishOutcome {
        let write_url = match self.write_url() {
            Some(url) if !point.field.is_empty() => url,
            _ => {
                warn!("Cannot publish results to InfluxDB - configuration not complete");
                return PublishOutcome::Skipped(SkipReason::Incomplete);
            }
        };

        if point.value == 0.0 {
            warn!(
                "Cannot publish {}.{} to InfluxDB - value = 0",
                point.measurement, point.field
            );
            return PublishOutcome::Skipped(SkipReason::ZeroValue);
        }

        let timestamp = point
            .timestamp
            .unwrap_or_else(|| self.precision.timestamp(Utc::now()));
        let payload = point.to_line(&self.tags, timestamp);

        debug!(
            "Publishing value {} into InfluxDB as '{}.{}'",
            point.value, point.measurement, point.field
        );
        debug!("InfluxDB payload: '{}'", payload);

        let mut request = self.client.post(&write_url).body(payload);
        if let Some(user) = &self.user {
            request = request.basic_auth(user, self.password.as_ref());
        }

        match request.send().await {
            Ok(response) if response.status().is_success() => {
                debug!(
                    "InfluxDB publication succeeded for {}.{}={}",
                    point.measurement, point.field, point.value
                );
                PublishOutcome::Published
            }
            Ok(response) => {
                error!(
                    "InfluxDB publication failed for {}.{}={}: {}",
                    point.measurement,
                    point.field,
                    point.value,
                    response.status()
                );
                PublishOutcome::Failed
            }
            Err(e) => {
                error!(
                    "InfluxDB publication failed for {}.{}={}: {}",
                    point.measurement, point.field, point.value, e
                );
                PublishOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> InfluxSettings {
        InfluxSettings {
            host: Some("influx".to_string()),
            database: Some("morizon".to_string()),
            ..InfluxSettings::default()
        }
    }

    #[test]
    fn write_url_uses_defaults() {
        let publisher = InfluxPublisher::new(settings()).unwrap();
        assert_eq!(
            publisher.write_url().as_deref(),
            Some("http://influx:8086/write?db=morizon&precision=s")
        );
    }

    #[test]
    fn write_url_requires_host_port_and_database() {
        let mut s = settings();
        s.database = Some(String::new());
        assert!(InfluxPublisher::new(s).unwrap().write_url().is_none());

        let mut s = settings();
        s.port = None;
        assert!(InfluxPublisher::new(s).unwrap().write_url().is_none());

        let mut s = settings();
        s.host = None;
        assert!(InfluxPublisher::new(s).unwrap().write_url().is_none());
    }

    #[test]
    fn precision_scales_timestamps() {
        let at = DateTime::from_timestamp(1_700_000_000, 123_456_789).unwrap();
        assert_eq!(Precision::Nanoseconds.timestamp(at), 1_700_000_000_123_456_789);
        assert_eq!(Precision::Microseconds.timestamp(at), 1_700_000_000_123_456);
        assert_eq!(Precision::Milliseconds.timestamp(at), 1_700_000_000_123);
        assert_eq!(Precision::Seconds.timestamp(at), 1_700_000_000);
        assert_eq!(Precision::Minutes.timestamp(at), 28_333_333);
        assert_eq!(Precision::Hours.timestamp(at), 472_222);
    }

    #[test]
    fn write_url_carries_precision() {
        let mut s = settings();
        s.precision = Precision::Milliseconds;
        assert_eq!(
            InfluxPublisher::new(s).unwrap().write_url().as_deref(),
            Some("http://influx:8086/write?db=morizon&precision=ms")
        );
    }

    #[tokio::test]
    async fn empty_field_name_is_skipped() {
        let publisher = InfluxPublisher::new(settings()).unwrap();
        let outcome = publisher.publish(&DataPoint::new("m", "", 1.0)).await;
        assert_eq!(outcome, PublishOutcome::Skipped(SkipReason::Incomplete));
    }
}
