//! Recommendation generation
//!
//! Rules are evaluated independently and every matching one is emitted, in
//! this order:
//!
//! 1. mean sleep < 7h        -> lifestyle  "Improve Sleep Hygiene" (1 if high risk, else 2)
//! 2. mean stress > 6        -> mindfulness "Daily Stress Management" (1)
//! 3. risk high              -> therapy "Professional Support" (1)
//! 4. risk moderate          -> activity "Physical Activity" (2)
//! 5. always                 -> community "Connect with Others" (3)
//!
//! Rules 1 and 2 do not fire when the metric has no usable samples.

use crate::risk::metric_mean;
use crate::types::{
    BehavioralSample, Metric, Recommendation, RecommendationCategory, RecommendationDraft,
    RiskLevel,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Recommendation generator
pub struct RecommendationGenerator;

impl RecommendationGenerator {
    /// Produce the drafts that apply to this risk level and behavior
    pub fn generate(risk: RiskLevel, samples: &[BehavioralSample]) -> Vec<RecommendationDraft> {
        let mut drafts = Vec::new();

        if metric_mean(samples, Metric::Sleep).is_some_and(|hours| hours < 7.0) {
            drafts.push(draft(
                RecommendationCategory::Lifestyle,
                "Improve Sleep Hygiene",
                "Create a consistent bedtime routine and aim for 7-8 hours of sleep nightly.",
                if risk == RiskLevel::High { 1 } else { 2 },
            ));
        }

        if metric_mean(samples, Metric::Stress).is_some_and(|stress| stress > 6.0) {
            drafts.push(draft(
                RecommendationCategory::Mindfulness,
                "Daily Stress Management",
                "Practice deep breathing exercises and progressive muscle relaxation.",
                1,
            ));
        }

        match risk {
            RiskLevel::High => drafts.push(draft(
                RecommendationCategory::Therapy,
                "Professional Support",
                "Consider scheduling a session with a mental health professional.",
                1,
            )),
            RiskLevel::Moderate => drafts.push(draft(
                RecommendationCategory::Activity,
                "Physical Activity",
                "Engage in 30 minutes of moderate exercise daily.",
                2,
            )),
            RiskLevel::Low => {}
        }

        drafts.push(draft(
            RecommendationCategory::Community,
            "Connect with Others",
            "Join our community forums to share experiences and get support.",
            3,
        ));

        drafts
    }
}

fn draft(
    category: RecommendationCategory,
    title: &str,
    description: &str,
    priority: u8,
) -> RecommendationDraft {
    RecommendationDraft {
        category,
        title: title.to_string(),
        description: description.to_string(),
        priority,
    }
}

impl RecommendationDraft {
    /// Assign identity and ownership to a draft
    pub fn into_recommendation(self, owner_id: &str, created_at: DateTime<Utc>) -> Recommendation {
        Recommendation {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            category: self.category,
            title: self.title,
            description: self.description,
            priority: self.priority,
            completed: false,
            created_at,
        }
    }

    /// Whether an existing recommendation carries the same advice
    pub fn matches(&self, existing: &Recommendation) -> bool {
        self.category == existing.category && self.title == existing.title
    }
}

/// Drafts the dashboard should persist to keep enough advice open.
///
/// Nothing is proposed while at least `min_open` recommendations are still
/// incomplete. Otherwise drafts already present as open recommendations are
/// dropped and the rest are returned in generator order.
pub fn plan_top_up(
    existing: &[Recommendation],
    drafts: &[RecommendationDraft],
    min_open: usize,
) -> Vec<RecommendationDraft> {
    let open: Vec<&Recommendation> = existing.iter().filter(|r| !r.completed).collect();
    if open.len() >= min_open {
        return Vec::new();
    }

    drafts
        .iter()
        .filter(|d| !open.iter().any(|r| d.matches(r)))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::test_support::{at, daily};
    use pretty_assertions::assert_eq;

    fn titles(drafts: &[RecommendationDraft]) -> Vec<&str> {
        drafts.iter().map(|d| d.title.as_str()).collect()
    }

    #[test]
    fn test_low_risk_without_data_only_community() {
        let drafts = RecommendationGenerator::generate(RiskLevel::Low, &[]);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].category, RecommendationCategory::Community);
        assert_eq!(drafts[0].title, "Connect with Others");
        assert_eq!(drafts[0].priority, 3);
    }

    #[test]
    fn test_high_risk_full_order() {
        let mut samples = daily(Metric::Sleep, &[5.0, 6.0]);
        samples.extend(daily(Metric::Stress, &[8.0]));

        let drafts = RecommendationGenerator::generate(RiskLevel::High, &samples);

        assert_eq!(
            titles(&drafts),
            vec![
                "Improve Sleep Hygiene",
                "Daily Stress Management",
                "Professional Support",
                "Connect with Others",
            ]
        );
        assert_eq!(drafts[0].priority, 1);
    }

    #[test]
    fn test_moderate_risk_sleep_priority_two() {
        let samples = daily(Metric::Sleep, &[6.5]);
        let drafts = RecommendationGenerator::generate(RiskLevel::Moderate, &samples);

        assert_eq!(
            titles(&drafts),
            vec!["Improve Sleep Hygiene", "Physical Activity", "Connect with Others"]
        );
        assert_eq!(drafts[0].priority, 2);
        assert_eq!(drafts[1].category, RecommendationCategory::Activity);
    }

    #[test]
    fn test_thresholds_are_strict() {
        let mut samples = daily(Metric::Sleep, &[7.0]);
        samples.extend(daily(Metric::Stress, &[6.0]));

        let drafts = RecommendationGenerator::generate(RiskLevel::Low, &samples);
        assert_eq!(titles(&drafts), vec!["Connect with Others"]);
    }

    #[test]
    fn test_generate_is_repeatable() {
        let samples = daily(Metric::Stress, &[9.0, 7.0]);
        let first = RecommendationGenerator::generate(RiskLevel::Moderate, &samples);
        let second = RecommendationGenerator::generate(RiskLevel::Moderate, &samples);
        assert_eq!(first, second);
    }

    #[test]
    fn test_into_recommendation() {
        let draft = RecommendationGenerator::generate(RiskLevel::Low, &[]).remove(0);
        let created_at = at(2024, 2, 1, 8, 0);
        let rec = draft.clone().into_recommendation("user-9", created_at);

        assert!(Uuid::parse_str(&rec.id).is_ok());
        assert_eq!(rec.owner_id, "user-9");
        assert!(!rec.completed);
        assert!(draft.matches(&rec));
    }

    #[test]
    fn test_top_up_skips_when_enough_open() {
        let drafts = RecommendationGenerator::generate(RiskLevel::High, &[]);
        let existing: Vec<Recommendation> = drafts
            .iter()
            .cloned()
            .map(|d| d.into_recommendation("u", at(2024, 2, 1, 8, 0)))
            .collect();
        assert_eq!(existing.len(), 2);

        let extra = existing[0].clone();
        let mut three = existing.clone();
        three.push(Recommendation { id: "x".into(), ..extra });

        assert!(plan_top_up(&three, &drafts, 3).is_empty());
    }

    #[test]
    fn test_top_up_deduplicates_open_advice() {
        let drafts = RecommendationGenerator::generate(RiskLevel::Moderate, &[]);
        let open = drafts[1].clone().into_recommendation("u", at(2024, 2, 1, 8, 0));
        let mut done = drafts[0].clone().into_recommendation("u", at(2024, 1, 1, 8, 0));
        done.completed = true;

        let plan = plan_top_up(&[open, done], &drafts, 3);

        // Completed advice may be proposed again; open advice is not repeated
        assert_eq!(titles(&plan), vec!["Physical Activity"]);
    }
}
