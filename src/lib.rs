//! Wellness Insight - Behavioral analytics and recommendation engine
//!
//! Insight turns a user's self-reported and wearable-derived wellness samples,
//! plus their questionnaire results, into dashboard analytics through a
//! deterministic pipeline: validation → pre-windowing → risk scoring →
//! recommendation generation → trend prediction → chart aggregation.
//!
//! ## Components
//!
//! - **TimeSeriesAggregator**: daily buckets over a trailing window for charts
//! - **RiskScorer**: additive point rule over behavioral means and screeners
//! - **RecommendationGenerator**: rule-based advice drafts
//! - **TrendPredictor**: recent-versus-earlier mood comparison
//!
//! Every component is a pure function of its inputs. Fetching and persisting
//! records is left to the caller.

pub mod aggregator;
pub mod config;
pub mod error;
pub mod input;
pub mod pipeline;
pub mod progress;
pub mod recommend;
pub mod risk;
pub mod screener;
pub mod trend;
pub mod types;
pub mod validation;

// FFI bindings for C interop, on by default for cdylib/staticlib builds
#[cfg(feature = "ffi")]
pub mod ffi;

pub use aggregator::{summary, TimeSeriesAggregator};
pub use config::EngineConfig;
pub use error::ComputeError;
pub use pipeline::{snapshot_to_report, InsightProcessor, UserSnapshot, WellnessReport};
pub use progress::ProgressStats;
pub use recommend::{plan_top_up, RecommendationGenerator};
pub use risk::{RiskBreakdown, RiskScorer};
pub use trend::TrendPredictor;
pub use types::{
    AggregatedPoint, BehavioralSample, Metric, Recommendation, RecommendationCategory,
    RecommendationDraft, RiskLevel, ScreenerKind, ScreenerResult, SeriesSummary,
    TrendDirection, TrendEstimate,
};

/// Engine version embedded in every report
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name reported by the CLI and FFI
pub const PRODUCER_NAME: &str = "wellness-insight";
