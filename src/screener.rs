//! Screener scoring
//!
//! Scores PHQ-9 and GAD-7 questionnaires (and the free-form stress and wellness
//! checks) from their raw 0-3 responses.

use crate::error::ComputeError;
use crate::types::{RiskLevel, ScreenerKind, ScreenerResult};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Highest answer on the frequency scale ("nearly every day")
pub const MAX_RESPONSE: u8 = 3;

/// Score at or above which a screener is high risk
pub const HIGH_SCREENER_SCORE: u32 = 15;

/// Score at or above which a screener is moderate risk
pub const MODERATE_SCREENER_SCORE: u32 = 10;

pub const PHQ9_QUESTIONS: [&str; 9] = [
    "Little interest or pleasure in doing things",
    "Feeling down, depressed, or hopeless",
    "Trouble falling or staying asleep, or sleeping too much",
    "Feeling tired or having little energy",
    "Poor appetite or overeating",
    "Feeling bad about yourself or that you are a failure",
    "Trouble concentrating on things",
    "Moving or speaking slowly, or being fidgety or restless",
    "Thoughts that you would be better off dead",
];

pub const GAD7_QUESTIONS: [&str; 7] = [
    "Feeling nervous, anxious, or on edge",
    "Not being able to stop or control worrying",
    "Worrying too much about different things",
    "Trouble relaxing",
    "Being so restless that it is hard to sit still",
    "Becoming easily annoyed or irritable",
    "Feeling afraid, as if something awful might happen",
];

impl ScreenerKind {
    /// Fixed question set of the instrument, if it has one
    pub fn questions(&self) -> Option<&'static [&'static str]> {
        match self {
            ScreenerKind::Phq9 => Some(&PHQ9_QUESTIONS),
            ScreenerKind::Gad7 => Some(&GAD7_QUESTIONS),
            ScreenerKind::StressScale | ScreenerKind::WellnessCheck => None,
        }
    }
}

/// Risk level recorded alongside a screener score
pub fn screener_risk_level(score: u32) -> RiskLevel {
    if score >= HIGH_SCREENER_SCORE {
        RiskLevel::High
    } else if score >= MODERATE_SCREENER_SCORE {
        RiskLevel::Moderate
    } else {
        RiskLevel::Low
    }
}

/// Check responses against the instrument and return their sum.
///
/// Instruments with a fixed question set must be answered in full; others
/// need at least one answer. Every answer must be 0-3.
pub fn score_responses(
    kind: ScreenerKind,
    responses: &BTreeMap<u32, u8>,
) -> Result<u32, ComputeError> {
    if responses.is_empty() {
        return Err(ComputeError::InvalidScreenerResponse(format!(
            "{} has no responses",
            kind.as_str()
        )));
    }

    if let Some((question, answer)) = responses.iter().find(|(_, a)| **a > MAX_RESPONSE) {
        return Err(ComputeError::InvalidScreenerResponse(format!(
            "question {question} answered {answer}, expected 0-{MAX_RESPONSE}"
        )));
    }

    if let Some(questions) = kind.questions() {
        let count = questions.len() as u32;
        if let Some(question) = responses.keys().find(|q| **q >= count) {
            return Err(ComputeError::InvalidScreenerResponse(format!(
                "{} has {count} questions, got index {question}",
                kind.as_str()
            )));
        }
        if responses.len() as u32 != count {
            return Err(ComputeError::InvalidScreenerResponse(format!(
                "{} answered {} of {count} questions",
                kind.as_str(),
                responses.len()
            )));
        }
    }

    Ok(responses.values().map(|a| u32::from(*a)).sum())
}

impl ScreenerResult {
    /// Score a completed questionnaire into a new result record
    pub fn from_responses(
        owner_id: &str,
        kind: ScreenerKind,
        responses: BTreeMap<u32, u8>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ComputeError> {
        let score = score_responses(kind, &responses)?;
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            kind,
            score,
            responses,
            risk_level: screener_risk_level(score),
            created_at,
        })
    }
}

/// Build a response map from answers listed in question order
pub fn responses_in_order(answers: &[u8]) -> BTreeMap<u32, u8> {
    answers
        .iter()
        .enumerate()
        .map(|(i, a)| (i as u32, *a))
        .collect()
}

/// Parse responses given as a JSON array in question order, or as an object
/// keyed by question index
pub fn parse_responses_json(json: &str) -> Result<BTreeMap<u32, u8>, ComputeError> {
    if json.trim_start().starts_with('[') {
        let answers: Vec<u8> = serde_json::from_str(json)?;
        Ok(responses_in_order(&answers))
    } else {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 1, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_phq9_scoring() {
        let responses = responses_in_order(&[3, 3, 2, 2, 1, 1, 1, 2, 0]);
        let result = ScreenerResult::from_responses("u", ScreenerKind::Phq9, responses, now()).unwrap();

        assert_eq!(result.score, 15);
        assert_eq!(result.risk_level, RiskLevel::High);
        assert_eq!(result.responses.len(), 9);
        assert!(Uuid::parse_str(&result.id).is_ok());
    }

    #[test]
    fn test_gad7_moderate() {
        let responses = responses_in_order(&[2, 2, 2, 1, 1, 1, 1]);
        let result = ScreenerResult::from_responses("u", ScreenerKind::Gad7, responses, now()).unwrap();
        assert_eq!(result.score, 10);
        assert_eq!(result.risk_level, RiskLevel::Moderate);
    }

    #[test]
    fn test_risk_level_thresholds() {
        assert_eq!(screener_risk_level(0), RiskLevel::Low);
        assert_eq!(screener_risk_level(9), RiskLevel::Low);
        assert_eq!(screener_risk_level(10), RiskLevel::Moderate);
        assert_eq!(screener_risk_level(14), RiskLevel::Moderate);
        assert_eq!(screener_risk_level(15), RiskLevel::High);
    }

    #[test]
    fn test_incomplete_phq9_rejected() {
        let responses = responses_in_order(&[1, 1, 1]);
        let result = score_responses(ScreenerKind::Phq9, &responses);
        assert!(matches!(result, Err(ComputeError::InvalidScreenerResponse(_))));
    }

    #[test]
    fn test_out_of_scale_answer_rejected() {
        let responses = responses_in_order(&[0, 4, 0, 0, 0, 0, 0]);
        assert!(score_responses(ScreenerKind::Gad7, &responses).is_err());
    }

    #[test]
    fn test_question_index_out_of_range() {
        let mut responses = responses_in_order(&[0, 0, 0, 0, 0, 0]);
        responses.insert(7, 1);
        assert!(score_responses(ScreenerKind::Gad7, &responses).is_err());
    }

    #[test]
    fn test_free_form_instruments() {
        let responses = responses_in_order(&[3, 2]);
        assert_eq!(score_responses(ScreenerKind::StressScale, &responses).unwrap(), 5);
        assert!(score_responses(ScreenerKind::WellnessCheck, &BTreeMap::new()).is_err());
    }

    #[test]
    fn test_parse_responses_json_shapes() {
        let ordered = parse_responses_json("[1, 0, 2]").unwrap();
        let keyed = parse_responses_json(r#"{"0": 1, "1": 0, "2": 2}"#).unwrap();
        assert_eq!(ordered, keyed);
        assert!(parse_responses_json("[5, -1]").is_err());
    }
}
