//! Core data models for latency probing

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A named endpoint to probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Logical name, unique within a session
    pub name: String,
    /// Hostname or literal address
    pub host: String,
    pub port: u16,
}

impl Target {
    pub fn new(name: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}:{})", self.name, self.host, self.port)
    }
}

/// Outcome of a single connection attempt
///
/// Every failure cause (timeout, refusal, resolution, unreachable network)
/// collapses into `Failed`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleOutcome {
    Success { latency_ms: f64 },
    Failed,
}

impl SampleOutcome {
    pub fn latency_ms(&self) -> Option<f64> {
        match self {
            SampleOutcome::Success { latency_ms } => Some(*latency_ms),
            SampleOutcome::Failed => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SampleOutcome::Success { .. })
    }
}

/// One measurement attempt against a target
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub target_name: String,
    pub host: String,
    pub port: u16,
    /// 1-based position within the target's sampling run
    pub index: u32,
    pub outcome: SampleOutcome,
}

impl Sample {
    pub fn latency_ms(&self) -> Option<f64> {
        self.outcome.latency_ms()
    }
}

/// Persisted form of a sample, with the wall-clock time it was recorded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    #[serde(with = "timestamp_format")]
    pub timestamp: NaiveDateTime,
    pub target_name: String,
    pub host: String,
    pub port: u16,
    pub sample_index: u32,
    #[serde(rename = "rtt_ms", with = "latency_format")]
    pub latency_ms: Option<f64>,
}

impl SessionRecord {
    pub fn from_sample(sample: &Sample, timestamp: NaiveDateTime) -> Self {
        Self {
            timestamp,
            target_name: sample.target_name.clone(),
            host: sample.host.clone(),
            port: sample.port,
            sample_index: sample.index,
            latency_ms: sample.latency_ms(),
        }
    }
}

/// Decimal places kept for latencies in memory and in results files
pub const LATENCY_DECIMALS: i32 = 3;

/// Round a latency to the precision results files store
///
/// Applied when a sample is taken, so classification of a live session and
/// of its re-read results file see identical values.
pub fn round_latency_ms(ms: f64) -> f64 {
    let scale = 10f64.powi(LATENCY_DECIMALS);
    (ms * scale).round() / scale
}

/// Local time truncated to whole seconds
pub fn now_local() -> NaiveDateTime {
    let now = chrono::Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

/// ISO-8601 timestamps with second precision and no offset
pub mod timestamp_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        // Accept fractional seconds written by other tools
        NaiveDateTime::parse_from_str(raw.trim(), FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(raw.trim(), "%Y-%m-%dT%H:%M:%S%.f"))
            .map_err(serde::de::Error::custom)
    }
}

/// Latency column: three decimals, empty for a failed attempt
pub mod latency_format {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(ms) => serializer.serialize_str(&format!("{:.*}", super::LATENCY_DECIMALS as usize, ms)),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        let ms = raw.parse::<f64>().map_err(serde::de::Error::custom)?;
        if !ms.is_finite() {
            return Err(serde::de::Error::custom(format!(
                "latency must be a finite number, got {}",
                raw
            )));
        }
        Ok(Some(ms))
    }
}
