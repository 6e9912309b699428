//! Report pipeline orchestration
//!
//! This module provides the public API for turning one user's already-fetched
//! data into a [`WellnessReport`]: risk with its point breakdown, the advice
//! that applies, the drafts worth persisting, the mood trend, chart series for
//! every metric, and progress statistics.

use crate::aggregator::{summary, TimeSeriesAggregator};
use crate::config::EngineConfig;
use crate::error::ComputeError;
use crate::progress::ProgressStats;
use crate::recommend::{plan_top_up, RecommendationGenerator};
use crate::risk::{RiskBreakdown, RiskScorer};
use crate::trend::TrendPredictor;
use crate::types::{
    AggregatedPoint, BehavioralSample, Metric, Recommendation, RecommendationDraft,
    ScreenerResult, SeriesSummary, TrendEstimate,
};
use crate::validation::is_usable;
use crate::ENGINE_VERSION;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything the engine needs to know about one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSnapshot {
    pub owner_id: String,
    /// "Now" for windowing
    pub reference_time: DateTime<Utc>,
    #[serde(default)]
    pub samples: Vec<BehavioralSample>,
    #[serde(default)]
    pub screeners: Vec<ScreenerResult>,
    /// Recommendations already stored for the user (open or completed)
    #[serde(default)]
    pub open_recommendations: Vec<Recommendation>,
}

/// Aggregated chart series for one metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSeries {
    pub metric: Metric,
    pub unit: String,
    pub points: Vec<AggregatedPoint>,
    pub summary: SeriesSummary,
}

/// Input quality counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DataQuality {
    pub total_samples: usize,
    /// Samples skipped for being non-finite or out of range
    pub rejected_samples: usize,
}

/// Full analytics output for one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellnessReport {
    pub owner_id: String,
    pub reference_time: DateTime<Utc>,
    pub risk: RiskBreakdown,
    /// Every draft that applies, in generator order
    pub recommendations: Vec<RecommendationDraft>,
    /// Drafts the caller should persist to keep enough advice open
    pub recommendations_to_add: Vec<RecommendationDraft>,
    pub mood_trend: TrendEstimate,
    pub series: Vec<MetricSeries>,
    pub progress: ProgressStats,
    pub data_quality: DataQuality,
    pub engine_version: String,
}

impl WellnessReport {
    /// Chart series for a metric
    pub fn series_for(&self, metric: Metric) -> Option<&MetricSeries> {
        self.series.iter().find(|s| s.metric == metric)
    }
}

/// Convert a user snapshot JSON to report JSON (stateless, one-shot).
///
/// Uses the default configuration (UTC days, 30 day behavioral window).
///
/// # Example
/// ```ignore
/// let report_json = snapshot_to_report(snapshot_json)?;
/// ```
pub fn snapshot_to_report(snapshot_json: String) -> Result<String, ComputeError> {
    InsightProcessor::new().analyze_json(&snapshot_json)
}

/// Processor holding a validated configuration.
///
/// Use this when the caller's UTC offset or windows differ from the defaults,
/// or to analyze many users with the same settings.
#[derive(Debug, Clone)]
pub struct InsightProcessor {
    config: EngineConfig,
    aggregator: TimeSeriesAggregator,
}

impl Default for InsightProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl InsightProcessor {
    /// Create a processor with the default configuration
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            aggregator: TimeSeriesAggregator::utc(),
        }
    }

    /// Create a processor from a configuration, validating it first
    pub fn with_config(config: EngineConfig) -> Result<Self, ComputeError> {
        config.validate()?;
        let aggregator = TimeSeriesAggregator::new(config.offset()?);
        Ok(Self { config, aggregator })
    }

    /// Create a processor from configuration JSON
    pub fn from_config_json(json: &str) -> Result<Self, ComputeError> {
        Self::with_config(EngineConfig::from_json(json)?)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Analyze one user
    pub fn analyze(&self, snapshot: &UserSnapshot) -> WellnessReport {
        let reference_time = snapshot.reference_time;

        // Stage 1: Data quality
        let rejected_samples = snapshot.samples.iter().filter(|s| !is_usable(s)).count();
        let data_quality = DataQuality {
            total_samples: snapshot.samples.len(),
            rejected_samples,
        };

        // Stage 2: Pre-window behavioral data and screeners
        let recent_samples = within_window(
            &snapshot.samples,
            reference_time,
            self.config.risk_window_days,
            |s| s.recorded_at,
        );
        let recent_screeners = within_window(
            &snapshot.screeners,
            reference_time,
            self.config.screener_window_days,
            |s| s.created_at,
        );

        // Stage 3: Risk
        let risk = RiskScorer::assess_detailed(&recent_samples, &recent_screeners);

        // Stage 4: Recommendations and top-up plan
        let recommendations = RecommendationGenerator::generate(risk.level, &recent_samples);
        let recommendations_to_add = plan_top_up(
            &snapshot.open_recommendations,
            &recommendations,
            self.config.min_open_recommendations,
        );

        // Stage 5: Mood trend over everything supplied
        let mood_trend = TrendPredictor::predict(&snapshot.samples);

        // Stage 6: Chart series
        let series = self
            .aggregator
            .aggregate_all(&snapshot.samples, self.config.chart_window_days, reference_time)
            .into_iter()
            .map(|(metric, points)| MetricSeries {
                metric,
                unit: metric.default_unit().to_string(),
                summary: summary(&points),
                points,
            })
            .collect();

        // Stage 7: Progress
        let progress = ProgressStats::compute(&snapshot.samples, &self.aggregator);

        log::info!(
            "analyzed {}: risk={} trend={:?} drafts={} to_add={} rejected={}/{}",
            snapshot.owner_id,
            risk.level,
            mood_trend.direction,
            recommendations.len(),
            recommendations_to_add.len(),
            data_quality.rejected_samples,
            data_quality.total_samples
        );

        WellnessReport {
            owner_id: snapshot.owner_id.clone(),
            reference_time,
            risk,
            recommendations,
            recommendations_to_add,
            mood_trend,
            series,
            progress,
            data_quality,
            engine_version: ENGINE_VERSION.to_string(),
        }
    }

    /// Analyze a snapshot given as JSON and return report JSON
    pub fn analyze_json(&self, snapshot_json: &str) -> Result<String, ComputeError> {
        let snapshot: UserSnapshot = serde_json::from_str(snapshot_json)?;
        let report = self.analyze(&snapshot);
        serde_json::to_string(&report).map_err(|e| ComputeError::EncodingError(e.to_string()))
    }

    /// Analyze many users, keyed by owner.
    ///
    /// A repeated owner keeps the report of its last snapshot.
    pub fn analyze_batch(&self, snapshots: &[UserSnapshot]) -> BTreeMap<String, WellnessReport> {
        let mut reports = BTreeMap::new();
        for snapshot in snapshots {
            if reports.contains_key(&snapshot.owner_id) {
                log::warn!("duplicate snapshot for {}, keeping the last", snapshot.owner_id);
            }
            reports.insert(snapshot.owner_id.clone(), self.analyze(snapshot));
        }
        reports
    }
}

/// Records stamped within `days` before `reference_time` (inclusive)
fn within_window<T: Clone>(
    records: &[T],
    reference_time: DateTime<Utc>,
    days: u32,
    stamp: impl Fn(&T) -> DateTime<Utc>,
) -> Vec<T> {
    let start = reference_time
        .checked_sub_signed(Duration::days(i64::from(days)))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    records
        .iter()
        .filter(|r| {
            let at = stamp(r);
            at >= start && at <= reference_time
        })
        .cloned()
        .collect()
}
