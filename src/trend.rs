//! Mood trend prediction
//!
//! Compares the mean of the most recent mood samples against the window just
//! before it. A difference above half a point in either direction is a trend;
//! anything smaller is reported as stable with at least moderate confidence.

use crate::types::{BehavioralSample, Metric, TrendDirection, TrendEstimate};
use crate::validation::is_usable;

/// Samples in each comparison window
pub const TREND_WINDOW: usize = 7;

/// Fewer usable mood samples than this yields the low-confidence default
pub const MIN_TREND_SAMPLES: usize = 3;

/// Confidence reported when there is too little data
pub const INSUFFICIENT_DATA_CONFIDENCE: f64 = 0.3;

/// Floor on confidence for stable classifications
pub const STABLE_CONFIDENCE_FLOOR: f64 = 0.6;

/// Ceiling on confidence for any classification
pub const MAX_CONFIDENCE: f64 = 0.9;

/// Mean difference beyond which a trend is reported
const TREND_THRESHOLD: f64 = 0.5;

/// Mood trend predictor
pub struct TrendPredictor;

impl TrendPredictor {
    /// Classify the mood trend.
    ///
    /// Non-mood and unusable samples are ignored; the rest are ordered by
    /// `recorded_at` (ties by id), so callers need not pre-sort.
    pub fn predict(samples: &[BehavioralSample]) -> TrendEstimate {
        let mut mood: Vec<&BehavioralSample> = samples
            .iter()
            .filter(|s| s.metric == Metric::Mood && is_usable(s))
            .collect();

        if mood.len() < MIN_TREND_SAMPLES {
            return insufficient();
        }

        mood.sort_by(|a, b| a.recorded_at.cmp(&b.recorded_at).then_with(|| a.id.cmp(&b.id)));

        let (earlier, recent) = split_windows(&mood);
        if earlier.is_empty() {
            log::trace!("mood trend: {} samples, nothing to compare against", recent.len());
            return no_baseline();
        }

        let difference = window_mean(recent) - window_mean(earlier);
        let estimate = classify(difference);

        log::trace!(
            "mood trend over {}+{} samples: diff={:.2} -> {:?}",
            earlier.len(),
            recent.len(),
            difference,
            estimate.direction
        );

        estimate
    }
}

/// Classify a recent-minus-earlier mean difference
pub fn classify(difference: f64) -> TrendEstimate {
    let confidence = (difference.abs() / 2.0).min(MAX_CONFIDENCE);

    if difference > TREND_THRESHOLD {
        TrendEstimate {
            direction: TrendDirection::Improving,
            confidence,
        }
    } else if difference < -TREND_THRESHOLD {
        TrendEstimate {
            direction: TrendDirection::Declining,
            confidence,
        }
    } else {
        TrendEstimate {
            direction: TrendDirection::Stable,
            confidence: confidence.max(STABLE_CONFIDENCE_FLOOR),
        }
    }
}

/// Stable at the floor confidence when every sample sits in the recent window
fn no_baseline() -> TrendEstimate {
    TrendEstimate {
        direction: TrendDirection::Stable,
        confidence: STABLE_CONFIDENCE_FLOOR,
    }
}

fn insufficient() -> TrendEstimate {
    TrendEstimate {
        direction: TrendDirection::Stable,
        confidence: INSUFFICIENT_DATA_CONFIDENCE,
    }
}

/// Split sorted samples into (earlier, recent) non-overlapping windows.
///
/// Recent is the last `TREND_WINDOW` samples and earlier the up to
/// `TREND_WINDOW` immediately before it, so earlier is empty until there are
/// more than `TREND_WINDOW` samples.
fn split_windows<'a>(
    sorted: &'a [&'a BehavioralSample],
) -> (&'a [&'a BehavioralSample], &'a [&'a BehavioralSample]) {
    let split = sorted.len().saturating_sub(TREND_WINDOW);
    let earlier_start = split.saturating_sub(TREND_WINDOW);
    (&sorted[earlier_start..split], &sorted[split..])
}

fn window_mean(window: &[&BehavioralSample]) -> f64 {
    window.iter().map(|s| s.value).sum::<f64>() / window.len() as f64
}
