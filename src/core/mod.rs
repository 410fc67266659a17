// Core algorithm exports
pub mod assembler;
pub mod config;
pub mod dimensions;
pub mod filters;
pub mod matcher;
pub mod scoring;
pub mod tiers;

pub use assembler::{assemble, enforce_org_diversity, recommended_cap, TieredResults};
pub use config::{Bonuses, ConfigError, DimensionSpec, MatchingConfig, ResultCaps, TierThresholds};
pub use dimensions::{evaluate, evaluate_business, evaluate_personal, DimensionScore};
pub use filters::{is_knocked_out, is_knocked_out_business, is_knocked_out_personal, is_track_compatible};
pub use matcher::{FlatScore, MatchResult, Matcher, Outcome, ScoredCandidate};
pub use scoring::{aggregate, coverage_factor, score_range, AggregateScore, ScoreBonus};
pub use tiers::{classify, Tier};
