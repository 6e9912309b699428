//! Progress statistics
//!
//! Headline numbers for the progress and dashboard pages: mood stability,
//! logging streak, and per-metric means.

use crate::aggregator::TimeSeriesAggregator;
use crate::risk::metric_mean;
use crate::types::{BehavioralSample, Metric};
use crate::validation::is_usable;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Lower bound of the target mood band (inclusive)
pub const MOOD_TARGET_MIN: f64 = 5.0;

/// Upper bound of the target mood band (inclusive)
pub const MOOD_TARGET_MAX: f64 = 8.0;

/// Progress statistics over a sample set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressStats {
    /// Rounded percentage of mood entries inside the target band
    pub mood_stability_pct: u32,
    /// Distinct local days with at least one entry
    pub logging_days: usize,
    pub average_sleep: Option<f64>,
    pub average_mood: Option<f64>,
    pub average_stress: Option<f64>,
    /// Usable entries per metric
    pub entries: BTreeMap<Metric, usize>,
}

impl ProgressStats {
    /// Compute progress statistics, bucketing days with `aggregator`'s zone
    pub fn compute(samples: &[BehavioralSample], aggregator: &TimeSeriesAggregator) -> Self {
        let usable: Vec<&BehavioralSample> = samples.iter().filter(|s| is_usable(s)).collect();

        let logging_days = usable
            .iter()
            .map(|s| aggregator.local_day(s.recorded_at))
            .collect::<BTreeSet<_>>()
            .len();

        let mut entries: BTreeMap<Metric, usize> = Metric::ALL.iter().map(|m| (*m, 0)).collect();
        for sample in &usable {
            *entries.entry(sample.metric).or_insert(0) += 1;
        }

        Self {
            mood_stability_pct: mood_stability_pct(&usable),
            logging_days,
            average_sleep: metric_mean(samples, Metric::Sleep),
            average_mood: metric_mean(samples, Metric::Mood),
            average_stress: metric_mean(samples, Metric::Stress),
            entries,
        }
    }
}

fn mood_stability_pct(usable: &[&BehavioralSample]) -> u32 {
    let mood: Vec<f64> = usable
        .iter()
        .filter(|s| s.metric == Metric::Mood)
        .map(|s| s.value)
        .collect();
    if mood.is_empty() {
        return 0;
    }

    let in_band = mood
        .iter()
        .filter(|v| (MOOD_TARGET_MIN..=MOOD_TARGET_MAX).contains(*v))
        .count();
    ((in_band as f64 / mood.len() as f64) * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::test_support::{at, daily, sample};
    use chrono::FixedOffset;

    #[test]
    fn test_empty_progress() {
        let stats = ProgressStats::compute(&[], &TimeSeriesAggregator::utc());
        assert_eq!(stats.mood_stability_pct, 0);
        assert_eq!(stats.logging_days, 0);
        assert_eq!(stats.average_mood, None);
        assert!(stats.entries.values().all(|c| *c == 0));
    }

    #[test]
    fn test_mood_stability_band_inclusive() {
        let samples = daily(Metric::Mood, &[5.0, 8.0, 9.0]);
        let stats = ProgressStats::compute(&samples, &TimeSeriesAggregator::utc());
        // 2 of 3 in band
        assert_eq!(stats.mood_stability_pct, 67);
    }

    #[test]
    fn test_logging_days_distinct_local_dates() {
        let samples = vec![
            sample("a", Metric::Mood, 6.0, at(2024, 1, 1, 9, 0)),
            sample("b", Metric::Sleep, 7.0, at(2024, 1, 1, 22, 30)),
            sample("c", Metric::Stress, 3.0, at(2024, 1, 3, 9, 0)),
        ];

        let utc = ProgressStats::compute(&samples, &TimeSeriesAggregator::utc());
        assert_eq!(utc.logging_days, 2);

        // At +02:00 the 22:30 entry moves to Jan 2
        let plus_two = TimeSeriesAggregator::new(FixedOffset::east_opt(7200).unwrap());
        let local = ProgressStats::compute(&samples, &plus_two);
        assert_eq!(local.logging_days, 3);
    }

    #[test]
    fn test_averages_and_entries() {
        let mut samples = daily(Metric::Sleep, &[6.0, 8.0]);
        samples.extend(daily(Metric::Stress, &[4.0]));
        samples.push(sample("bad", Metric::Stress, f64::NAN, at(2024, 1, 5, 9, 0)));

        let stats = ProgressStats::compute(&samples, &TimeSeriesAggregator::utc());
        assert_eq!(stats.average_sleep, Some(7.0));
        assert_eq!(stats.average_stress, Some(4.0));
        assert_eq!(stats.entries[&Metric::Sleep], 2);
        assert_eq!(stats.entries[&Metric::Stress], 1);
        assert_eq!(stats.entries[&Metric::HeartRate], 0);
    }
}
