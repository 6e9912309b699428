//! Day-bucketed time series
//!
//! Buckets behavioral samples by local calendar date for charting. The day
//! sequence always spans the full requested window; days without samples keep
//! an empty average rather than being interpolated or zero-filled.

use crate::config::MAX_WINDOW_DAYS;
use crate::types::{AggregatedPoint, BehavioralSample, Metric, SeriesSummary};
use crate::validation::is_usable;
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Offset, Utc};
use std::collections::BTreeMap;

/// Aggregator bucketing samples by calendar day in a fixed local zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSeriesAggregator {
    offset: FixedOffset,
}

impl Default for TimeSeriesAggregator {
    fn default() -> Self {
        Self::utc()
    }
}

impl TimeSeriesAggregator {
    /// Aggregator whose calendar days are local to `offset`
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Aggregator bucketing by UTC calendar day
    pub fn utc() -> Self {
        Self { offset: Utc.fix() }
    }

    /// Local zone used for bucketing
    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Local calendar date of an instant
    pub fn local_day(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.offset).date_naive()
    }

    /// Aggregate `metric` over the `window_days` days ending at `reference_time`.
    ///
    /// Returns exactly `window_days + 1` points in ascending day order. Samples
    /// recorded before `reference_time - window_days` are ignored, as are samples
    /// that fail range checks. Windows longer than [`MAX_WINDOW_DAYS`] are clamped
    /// to it.
    pub fn aggregate(
        &self,
        samples: &[BehavioralSample],
        metric: Metric,
        window_days: u32,
        reference_time: DateTime<Utc>,
    ) -> Vec<AggregatedPoint> {
        if window_days > MAX_WINDOW_DAYS {
            log::warn!("window of {window_days} days clamped to {MAX_WINDOW_DAYS}");
        }
        let window_days = window_days.min(MAX_WINDOW_DAYS);
        let window_start = reference_time
            .checked_sub_signed(Duration::days(i64::from(window_days)))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let first_day = self.local_day(window_start);

        let mut buckets: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
        for sample in samples
            .iter()
            .filter(|s| s.metric == metric && s.recorded_at >= window_start)
            .filter(|s| is_usable(s))
        {
            let bucket = buckets.entry(self.local_day(sample.recorded_at)).or_insert((0.0, 0));
            bucket.0 += sample.value;
            bucket.1 += 1;
        }

        let points: Vec<AggregatedPoint> = first_day
            .iter_days()
            .take(window_days as usize + 1)
            .map(|day| {
                let (sum, count) = buckets.get(&day).copied().unwrap_or((0.0, 0));
                AggregatedPoint {
                    day,
                    metric,
                    average_value: if count > 0 { Some(sum / count as f64) } else { None },
                    sample_count: count,
                }
            })
            .collect();

        log::trace!(
            "aggregated {} over {} days: {} days with data",
            metric,
            window_days,
            points.iter().filter(|p| p.average_value.is_some()).count()
        );

        points
    }

    /// Aggregate every metric over the same window
    pub fn aggregate_all(
        &self,
        samples: &[BehavioralSample],
        window_days: u32,
        reference_time: DateTime<Utc>,
    ) -> Vec<(Metric, Vec<AggregatedPoint>)> {
        Metric::ALL
            .iter()
            .map(|&metric| (metric, self.aggregate(samples, metric, window_days, reference_time)))
            .collect()
    }
}

/// Average, max, min, and count over the days that have data.
///
/// An all-empty series yields [`SeriesSummary::default`] (all zero).
pub fn summary(points: &[AggregatedPoint]) -> SeriesSummary {
    let values: Vec<f64> = points.iter().filter_map(|p| p.average_value).collect();
    if values.is_empty() {
        return SeriesSummary::default();
    }

    let sum: f64 = values.iter().sum();
    SeriesSummary {
        average: sum / values.len() as f64,
        max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        min: values.iter().copied().fold(f64::INFINITY, f64::min),
        count: values.len(),
    }
}
