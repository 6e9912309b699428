//! Risk scoring
//!
//! Additive point rule over behavioral means and the latest screener:
//!
//! ```text
//! sleep  mean < 6  -> 2    6 <= mean < 7   -> 1
//! stress mean > 7  -> 2    5 <  mean <= 7  -> 1
//! mood   mean < 4  -> 2    4 <= mean < 6   -> 1
//! screener > 15 -> 3   10 < s <= 15 -> 2   5 < s <= 10 -> 1
//!
//! total >= 6 -> high, total >= 3 -> moderate, else low
//! ```
//!
//! A metric without usable samples contributes 0 points, as does a missing
//! screener. The scorer applies no time filtering; callers pre-window.

use crate::types::{BehavioralSample, Metric, RiskLevel, ScreenerResult};
use crate::validation::mean;
use serde::{Deserialize, Serialize};

/// Total at or above which risk is high
pub const HIGH_RISK_POINTS: u32 = 6;

/// Total at or above which risk is moderate
pub const MODERATE_RISK_POINTS: u32 = 3;

/// Per-signal contributions to a risk classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskBreakdown {
    /// Mean sleep hours, if any sleep was logged
    pub sleep_mean: Option<f64>,
    pub sleep_points: u32,
    pub stress_mean: Option<f64>,
    pub stress_points: u32,
    pub mood_mean: Option<f64>,
    pub mood_points: u32,
    /// Id of the screener that was scored
    pub screener_id: Option<String>,
    pub screener_points: u32,
    pub total_points: u32,
    pub level: RiskLevel,
}

/// Risk scorer
pub struct RiskScorer;

impl RiskScorer {
    /// Classify overall risk from behavioral samples and screener results
    pub fn assess(samples: &[BehavioralSample], screeners: &[ScreenerResult]) -> RiskLevel {
        Self::assess_detailed(samples, screeners).level
    }

    /// Classify risk and report how each signal contributed
    pub fn assess_detailed(
        samples: &[BehavioralSample],
        screeners: &[ScreenerResult],
    ) -> RiskBreakdown {
        let sleep_mean = metric_mean(samples, Metric::Sleep);
        let stress_mean = metric_mean(samples, Metric::Stress);
        let mood_mean = metric_mean(samples, Metric::Mood);
        let latest = latest_screener(screeners);

        let sleep_points = sleep_mean.map_or(0, sleep_points);
        let stress_points = stress_mean.map_or(0, stress_points);
        let mood_points = mood_mean.map_or(0, mood_points);
        let screener_points = latest.map_or(0, |s| screener_points(s.score));

        let total_points = sleep_points + stress_points + mood_points + screener_points;
        let level = classify(total_points);

        log::trace!(
            "risk points sleep={} stress={} mood={} screener={} -> {}",
            sleep_points,
            stress_points,
            mood_points,
            screener_points,
            level
        );

        RiskBreakdown {
            sleep_mean,
            sleep_points,
            stress_mean,
            stress_points,
            mood_mean,
            mood_points,
            screener_id: latest.map(|s| s.id.clone()),
            screener_points,
            total_points,
            level,
        }
    }
}

/// Map a point total to a risk level
pub fn classify(total_points: u32) -> RiskLevel {
    if total_points >= HIGH_RISK_POINTS {
        RiskLevel::High
    } else if total_points >= MODERATE_RISK_POINTS {
        RiskLevel::Moderate
    } else {
        RiskLevel::Low
    }
}

/// Most recent screener; equal timestamps resolve to the greatest id
pub fn latest_screener(screeners: &[ScreenerResult]) -> Option<&ScreenerResult> {
    screeners
        .iter()
        .max_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)))
}

pub(crate) fn metric_mean(samples: &[BehavioralSample], metric: Metric) -> Option<f64> {
    mean(samples.iter().filter(|s| s.metric == metric))
}

fn sleep_points(mean_hours: f64) -> u32 {
    if mean_hours < 6.0 {
        2
    } else if mean_hours < 7.0 {
        1
    } else {
        0
    }
}

fn stress_points(mean: f64) -> u32 {
    if mean > 7.0 {
        2
    } else if mean > 5.0 {
        1
    } else {
        0
    }
}

fn mood_points(mean: f64) -> u32 {
    if mean < 4.0 {
        2
    } else if mean < 6.0 {
        1
    } else {
        0
    }
}

fn screener_points(score: u32) -> u32 {
    match score {
        s if s > 15 => 3,
        s if s > 10 => 2,
        s if s > 5 => 1,
        _ => 0,
    }
}
