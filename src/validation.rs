//! Defensive sample checks
//!
//! Entry-point validation is the caller's job, but historical data can still carry
//! non-finite or out-of-range values. Every engine component filters through
//! [`is_usable`] so that a single bad row never poisons an average.

use crate::types::BehavioralSample;
use serde::Serialize;
use thiserror::Error;

/// Why a sample was rejected
#[derive(Debug, Clone, Copy, PartialEq, Error, Serialize)]
#[serde(rename_all = "snake_case", tag = "issue")]
pub enum SampleIssue {
    #[error("value is not a finite number")]
    NonFinite,

    #[error("value outside valid range [{min}, {max}]")]
    OutOfRange { min: f64, max: f64 },
}

/// Check a sample's value against its metric's valid range
pub fn check_sample(sample: &BehavioralSample) -> Result<(), SampleIssue> {
    if !sample.value.is_finite() {
        return Err(SampleIssue::NonFinite);
    }
    let (min, max) = sample.metric.valid_range();
    if sample.value < min || sample.value > max {
        return Err(SampleIssue::OutOfRange { min, max });
    }
    Ok(())
}

/// Whether the engine should use this sample
pub fn is_usable(sample: &BehavioralSample) -> bool {
    match check_sample(sample) {
        Ok(()) => true,
        Err(issue) => {
            log::debug!(
                "skipping sample {} ({} = {}): {}",
                sample.id,
                sample.metric,
                sample.value,
                issue
            );
            false
        }
    }
}

/// A rejected sample and its position in the input
#[derive(Debug, Clone, Serialize)]
pub struct SampleValidation {
    pub index: usize,
    pub sample_id: String,
    pub issue: SampleIssue,
}

/// List every rejected sample in a batch
pub fn validate_samples(samples: &[BehavioralSample]) -> Vec<SampleValidation> {
    samples
        .iter()
        .enumerate()
        .filter_map(|(index, sample)| {
            check_sample(sample).err().map(|issue| SampleValidation {
                index,
                sample_id: sample.id.clone(),
                issue,
            })
        })
        .collect()
}

/// Arithmetic mean of the usable values; `None` when nothing is usable
pub(crate) fn mean<'a, I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a BehavioralSample>,
{
    let (sum, count) = values
        .into_iter()
        .filter(|s| is_usable(s))
        .fold((0.0, 0usize), |(sum, count), s| (sum + s.value, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::types::{BehavioralSample, Metric, SampleSource};
    use chrono::{DateTime, TimeZone, Utc};

    pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    pub fn sample(id: &str, metric: Metric, value: f64, recorded_at: DateTime<Utc>) -> BehavioralSample {
        BehavioralSample {
            id: id.to_string(),
            owner_id: "user-1".to_string(),
            metric,
            value,
            unit: None,
            recorded_at,
            source: SampleSource::Manual,
        }
    }

    /// `values` logged one per day at noon, starting 2024-01-01
    pub fn daily(metric: Metric, values: &[f64]) -> Vec<BehavioralSample> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                sample(
                    &format!("{}-{i}", metric.as_str()),
                    metric,
                    *v,
                    at(2024, 1, 1, 12, 0) + chrono::Duration::days(i as i64),
                )
            })
            .collect()
    }
}
