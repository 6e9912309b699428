//! Core types for the Wellness Insight engine
//!
//! This module defines the records handed to the engine by the dashboard
//! (behavioral samples, screener results, open recommendations) and the derived
//! values it hands back (aggregated points, risk levels, drafts, trend estimates).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Behavioral metric kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Sleep,
    Mood,
    Stress,
    Activity,
    HeartRate,
}

impl Metric {
    /// All metrics, in charting order
    pub const ALL: [Metric; 5] = [
        Metric::Sleep,
        Metric::Mood,
        Metric::Stress,
        Metric::Activity,
        Metric::HeartRate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Sleep => "sleep",
            Metric::Mood => "mood",
            Metric::Stress => "stress",
            Metric::Activity => "activity",
            Metric::HeartRate => "heart_rate",
        }
    }

    /// Inclusive valid value range for the metric
    pub fn valid_range(&self) -> (f64, f64) {
        match self {
            Metric::Sleep => (0.0, 24.0),
            Metric::HeartRate => (0.0, 300.0),
            Metric::Mood | Metric::Stress | Metric::Activity => (0.0, 10.0),
        }
    }

    /// Display unit used by the dashboard when a sample carries none
    pub fn default_unit(&self) -> &'static str {
        match self {
            Metric::Sleep => "hrs",
            Metric::HeartRate => "bpm",
            Metric::Mood | Metric::Stress | Metric::Activity => "/10",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sleep" => Ok(Metric::Sleep),
            "mood" => Ok(Metric::Mood),
            "stress" => Ok(Metric::Stress),
            "activity" => Ok(Metric::Activity),
            "heart_rate" | "heart-rate" | "heartrate" => Ok(Metric::HeartRate),
            other => Err(format!("unknown metric: {other}")),
        }
    }
}

/// Where a behavioral sample came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleSource {
    Manual,
    Wearable,
    Survey,
}

/// A single logged behavioral measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehavioralSample {
    /// Sample identifier
    pub id: String,
    /// User who logged the sample
    pub owner_id: String,
    /// Metric kind
    pub metric: Metric,
    /// Measured value (hours for sleep, bpm for heart rate, 0-10 otherwise)
    pub value: f64,
    /// Optional unit label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// When the measurement was taken
    pub recorded_at: DateTime<Utc>,
    /// Origin of the sample
    pub source: SampleSource,
}

/// Standardized screener instrument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenerKind {
    Phq9,
    Gad7,
    StressScale,
    WellnessCheck,
}

impl ScreenerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScreenerKind::Phq9 => "phq9",
            ScreenerKind::Gad7 => "gad7",
            ScreenerKind::StressScale => "stress_scale",
            ScreenerKind::WellnessCheck => "wellness_check",
        }
    }
}

impl std::str::FromStr for ScreenerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "phq9" | "phq_9" => Ok(ScreenerKind::Phq9),
            "gad7" | "gad_7" => Ok(ScreenerKind::Gad7),
            "stress_scale" => Ok(ScreenerKind::StressScale),
            "wellness_check" => Ok(ScreenerKind::WellnessCheck),
            other => Err(format!("unknown screener kind: {other}")),
        }
    }
}

/// Three-level risk classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A completed screener
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenerResult {
    /// Result identifier
    pub id: String,
    /// User who completed the screener
    pub owner_id: String,
    /// Instrument
    pub kind: ScreenerKind,
    /// Sum of all responses
    pub score: u32,
    /// Question index to answer (0-3)
    #[serde(default)]
    pub responses: BTreeMap<u32, u8>,
    /// Risk level recorded with the result
    pub risk_level: RiskLevel,
    /// Completion time
    pub created_at: DateTime<Utc>,
}

/// Recommendation category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationCategory {
    Therapy,
    Mindfulness,
    Activity,
    Community,
    Lifestyle,
}

/// Recommendation payload before persistence assigns identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationDraft {
    pub category: RecommendationCategory,
    pub title: String,
    pub description: String,
    /// 1 is most urgent
    pub priority: u8,
}

/// A persisted recommendation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: String,
    pub owner_id: String,
    pub category: RecommendationCategory,
    pub title: String,
    pub description: String,
    pub priority: u8,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

/// One calendar day's mean for a metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedPoint {
    /// Local calendar date of the bucket
    pub day: NaiveDate,
    /// Metric aggregated
    pub metric: Metric,
    /// Mean value, or `None` if no samples fell on this day
    pub average_value: Option<f64>,
    /// Number of samples in the bucket
    pub sample_count: usize,
}

/// Summary statistics over the non-empty points of a series.
///
/// When every point is empty all fields are `0`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SeriesSummary {
    pub average: f64,
    pub max: f64,
    pub min: f64,
    /// Number of days with data
    pub count: usize,
}

/// Direction of a mood trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Improving,
    Stable,
    Declining,
}

/// Mood trend classification with confidence (0-1)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendEstimate {
    pub direction: TrendDirection,
    pub confidence: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_serialization() {
        let json = serde_json::to_string(&Metric::HeartRate).unwrap();
        assert_eq!(json, "\"heart_rate\"");

        let parsed: Metric = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Metric::HeartRate);
    }

    #[test]
    fn test_metric_ranges() {
        assert_eq!(Metric::Sleep.valid_range(), (0.0, 24.0));
        assert_eq!(Metric::HeartRate.valid_range(), (0.0, 300.0));
        assert_eq!(Metric::Mood.valid_range(), (0.0, 10.0));
    }

    #[test]
    fn test_metric_from_str() {
        assert_eq!("Heart-Rate".parse::<Metric>(), Ok(Metric::HeartRate));
        assert!("steps".parse::<Metric>().is_err());
    }

    #[test]
    fn test_sample_deserialization() {
        let json = r#"{
            "id": "s-1",
            "owner_id": "user-1",
            "metric": "sleep",
            "value": 7.5,
            "unit": "hours",
            "recorded_at": "2024-01-15T07:00:00Z",
            "source": "wearable"
        }"#;

        let sample: BehavioralSample = serde_json::from_str(json).unwrap();
        assert_eq!(sample.metric, Metric::Sleep);
        assert_eq!(sample.source, SampleSource::Wearable);
        assert_eq!(sample.unit.as_deref(), Some("hours"));
    }

    #[test]
    fn test_screener_responses_keyed_by_index() {
        let json = r#"{
            "id": "a-1",
            "owner_id": "user-1",
            "kind": "gad7",
            "score": 4,
            "responses": {"0": 1, "1": 3},
            "risk_level": "low",
            "created_at": "2024-01-15T09:00:00Z"
        }"#;

        let result: ScreenerResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.kind, ScreenerKind::Gad7);
        assert_eq!(result.responses.get(&1), Some(&3));
    }

    #[test]
    fn test_risk_level_ordering() {
        assert!(RiskLevel::High > RiskLevel::Moderate);
        assert!(RiskLevel::Moderate > RiskLevel::Low);
        assert_eq!(serde_json::to_string(&RiskLevel::Moderate).unwrap(), "\"moderate\"");
    }
}
