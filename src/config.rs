//! Engine configuration
//!
//! Windows, thresholds, and the caller's local zone. Every engine component reads
//! its parameters from here so that the dashboard, the CLI, and FFI callers share
//! one serialized shape.

use crate::error::ComputeError;
use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

/// Behavioral window (days) used for risk scoring and recommendations
pub const DEFAULT_RISK_WINDOW_DAYS: u32 = 30;

/// Screener window (days) used for risk scoring
pub const DEFAULT_SCREENER_WINDOW_DAYS: u32 = 90;

/// Window (days) for the chart series in a report
pub const DEFAULT_CHART_WINDOW_DAYS: u32 = 30;

/// Open recommendations below which new drafts are proposed
pub const DEFAULT_MIN_OPEN_RECOMMENDATIONS: usize = 3;

/// Longest accepted window (days), roughly a century
pub const MAX_WINDOW_DAYS: u32 = 36_600;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Caller's local zone as a fixed UTC offset ("UTC", "+05:30", "-0800")
    pub utc_offset: String,
    /// Behavioral pre-window for risk and recommendations
    pub risk_window_days: u32,
    /// Screener pre-window for risk
    pub screener_window_days: u32,
    /// Chart series window
    pub chart_window_days: u32,
    /// Top-up threshold for open recommendations
    pub min_open_recommendations: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            utc_offset: "UTC".to_string(),
            risk_window_days: DEFAULT_RISK_WINDOW_DAYS,
            screener_window_days: DEFAULT_SCREENER_WINDOW_DAYS,
            chart_window_days: DEFAULT_CHART_WINDOW_DAYS,
            min_open_recommendations: DEFAULT_MIN_OPEN_RECOMMENDATIONS,
        }
    }
}

impl EngineConfig {
    /// Default configuration bucketing days at the given UTC offset
    pub fn with_utc_offset(offset: &str) -> Result<Self, ComputeError> {
        let config = Self {
            utc_offset: offset.to_string(),
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Parsed local offset
    pub fn offset(&self) -> Result<FixedOffset, ComputeError> {
        parse_utc_offset(&self.utc_offset)
    }

    /// Check that windows are positive and bounded, and that the offset parses
    pub fn validate(&self) -> Result<(), ComputeError> {
        self.offset()?;
        for (name, days) in [
            ("risk_window_days", self.risk_window_days),
            ("screener_window_days", self.screener_window_days),
            ("chart_window_days", self.chart_window_days),
        ] {
            if days == 0 {
                return Err(ComputeError::InvalidConfig(format!("{name} must be positive")));
            }
            if days > MAX_WINDOW_DAYS {
                return Err(ComputeError::InvalidConfig(format!(
                    "{name} must be at most {MAX_WINDOW_DAYS}"
                )));
            }
        }
        Ok(())
    }

    /// Load and validate a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to JSON
    pub fn to_json(&self) -> Result<String, ComputeError> {
        serde_json::to_string_pretty(self).map_err(|e| ComputeError::EncodingError(e.to_string()))
    }
}

/// Parse a fixed UTC offset.
///
/// Accepts `UTC`, `Z`, `+HH`, `+HH:MM` and `+HHMM` (with either sign).
pub fn parse_utc_offset(raw: &str) -> Result<FixedOffset, ComputeError> {
    let s = raw.trim();
    if s.eq_ignore_ascii_case("utc") || s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("gmt")
    {
        return Ok(Utc.fix());
    }

    let invalid = || ComputeError::InvalidTimezone(raw.to_string());

    let (sign, rest) = match s.as_bytes().first() {
        Some(b'+') => (1, &s[1..]),
        Some(b'-') => (-1, &s[1..]),
        _ => return Err(invalid()),
    };

    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let (hours, minutes) = match digits.len() {
        2 => (digits.parse::<i32>().map_err(|_| invalid())?, 0),
        4 => (
            digits[..2].parse::<i32>().map_err(|_| invalid())?,
            digits[2..].parse::<i32>().map_err(|_| invalid())?,
        ),
        _ => return Err(invalid()),
    };
    if hours > 14 || minutes > 59 {
        return Err(invalid());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_utc_offset_forms() {
        assert_eq!(parse_utc_offset("UTC").unwrap().local_minus_utc(), 0);
        assert_eq!(parse_utc_offset("Z").unwrap().local_minus_utc(), 0);
        assert_eq!(parse_utc_offset("+05:30").unwrap().local_minus_utc(), 19_800);
        assert_eq!(parse_utc_offset("-0800").unwrap().local_minus_utc(), -28_800);
        assert_eq!(parse_utc_offset("+02").unwrap().local_minus_utc(), 7_200);
    }

    #[test]
    fn test_parse_utc_offset_rejects_garbage() {
        assert!(parse_utc_offset("America/New_York").is_err());
        assert!(parse_utc_offset("+5").is_err());
        assert!(parse_utc_offset("+15:00").is_err());
        assert!(parse_utc_offset("+01:75").is_err());
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.risk_window_days, 30);
        assert_eq!(config.min_open_recommendations, 3);
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = EngineConfig::from_json(r#"{"utc_offset": "+01:00"}"#).unwrap();
        assert_eq!(config.chart_window_days, DEFAULT_CHART_WINDOW_DAYS);
        assert_eq!(config.offset().unwrap().local_minus_utc(), 3_600);
    }

    #[test]
    fn test_zero_window_rejected() {
        let result = EngineConfig::from_json(r#"{"risk_window_days": 0}"#);
        assert!(matches!(result, Err(ComputeError::InvalidConfig(_))));
    }

    #[test]
    fn test_oversized_window_rejected() {
        let result = EngineConfig::from_json(r#"{"chart_window_days": 4000000000}"#);
        assert!(matches!(
            result,
            Err(ComputeError::InvalidConfig(ref m)) if m.contains("chart_window_days")
        ));

        let at_limit = format!(r#"{{"screener_window_days": {MAX_WINDOW_DAYS}}}"#);
        assert!(EngineConfig::from_json(&at_limit).is_ok());

        let past_limit = format!(r#"{{"risk_window_days": {}}}"#, MAX_WINDOW_DAYS + 1);
        assert!(EngineConfig::from_json(&past_limit).is_err());
    }

    #[test]
    fn test_round_trip() {
        let config = EngineConfig::with_utc_offset("-03:00").unwrap();
        let loaded = EngineConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(config, loaded);
    }
}
