use std::collections::BTreeMap;
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::{
    assembler::assemble,
    config::{ConfigError, MatchingConfig, TierThresholds},
    dimensions::{evaluate, DimensionScore},
    filters::{is_knocked_out, is_track_compatible},
    scoring::{aggregate, ScoreBonus},
    tiers::{classify, Tier},
};
use crate::models::{Candidate, UserProfile};

/// A candidate that survived scoring, with its explanation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredCandidate {
    pub candidate: Candidate,
    /// Final score in [0, 1]
    pub score: f64,
    pub tier: Tier,
    pub match_score: f64,
    pub coverage_factor: f64,
    /// Weighted-average extraction confidence of the active dimensions
    pub confidence: f64,
    pub breakdown: Vec<DimensionScore>,
}

impl ScoredCandidate {
    /// True when the specific-match rule moved this entry below the tier its score earns
    pub fn is_demoted(&self, thresholds: &TierThresholds) -> bool {
        self.tier != classify(self.score, true, thresholds)
    }
}

/// Result of the matching process
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub tailored: Vec<ScoredCandidate>,
    pub recommended: Vec<ScoredCandidate>,
    pub exploratory: Vec<ScoredCandidate>,
    pub all: Vec<ScoredCandidate>,
    pub total_count: usize,
    pub total_analyzed: usize,
    pub knocked_out: usize,
    pub filtered_by_track: usize,
    /// Too few usable dimensions to judge
    pub dropped_insufficient_data: usize,
    /// Scored below the lowest tier threshold
    pub below_threshold: usize,
    pub strategy_version: String,
}

/// Compact, persistable form of one scored entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatScore {
    pub support_id: String,
    pub score: f64,
    pub tier: Tier,
    /// Raw score per dimension; inactive dimensions report 0
    pub breakdown: BTreeMap<String, f64>,
    pub confidence: f64,
    pub weighted: f64,
    pub coverage: f64,
}

impl MatchResult {
    /// Flatten `all` into rounded scores suitable for storage
    pub fn flatten(&self) -> Vec<FlatScore> {
        self.all
            .iter()
            .map(|entry| FlatScore {
                support_id: entry.candidate.id.clone(),
                score: round_to(entry.score, 2),
                tier: entry.tier,
                breakdown: entry
                    .breakdown
                    .iter()
                    .map(|d| {
                        let raw = if d.has_data { round_to(d.raw_score, 3) } else { 0.0 };
                        (d.key.as_str().to_string(), raw)
                    })
                    .collect(),
                confidence: round_to(entry.confidence, 3),
                weighted: round_to(entry.match_score, 3),
                coverage: round_to(entry.coverage_factor, 3),
            })
            .collect()
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// What happened to one candidate in the per-candidate stages
#[derive(Debug)]
pub enum Outcome {
    FilteredByTrack,
    KnockedOut,
    InsufficientData,
    BelowThreshold,
    Scored(Box<ScoredCandidate>),
}

/// Main matching orchestrator - implements the tiered ranking pipeline
///
/// # Pipeline Stages
/// 1. Track selection
/// 2. Knockout filtering
/// 3. Dimension evaluation
/// 4. Coverage-weighted scoring
/// 5. Tier classification
/// 6. Diversity capping and result assembly
#[derive(Debug, Clone)]
pub struct Matcher {
    config: Arc<MatchingConfig>,
}

impl Matcher {
    /// Build a matcher, rejecting malformed configuration up front
    pub fn new(config: MatchingConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
        })
    }

    pub fn with_default_config() -> Self {
        Self {
            config: Arc::new(MatchingConfig::default()),
        }
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    /// Run stages 1-5 for a single candidate
    pub fn evaluate_candidate(&self, candidate: &Candidate, profile: &UserProfile) -> Outcome {
        let config = self.config.as_ref();
        let track = profile.track();

        if !is_track_compatible(candidate.service_type, track) {
            return Outcome::FilteredByTrack;
        }
        if is_knocked_out(candidate, profile, config) {
            return Outcome::KnockedOut;
        }

        let breakdown = evaluate(candidate, profile, config);
        let bonus = ScoreBonus {
            interest_overlap: has_interest_overlap(candidate, profile),
            district_match: has_district_match(candidate, profile),
        };

        let Some(scored) = aggregate(&breakdown, config.total_weight(track), config, bonus) else {
            return Outcome::InsufficientData;
        };

        let tier = classify(scored.final_score, scored.has_specific_match, &config.tiers);
        if tier == Tier::Excluded {
            return Outcome::BelowThreshold;
        }

        Outcome::Scored(Box::new(ScoredCandidate {
            candidate: candidate.clone(),
            score: scored.final_score,
            tier,
            match_score: scored.match_score,
            coverage_factor: scored.coverage_factor,
            confidence: scored.confidence,
            breakdown,
        }))
    }

    /// Rank the candidate set for one profile
    ///
    /// Per-candidate evaluation fans out across threads for large inputs; the
    /// sort and cap pass that follows is sequential.
    ///
    /// # Arguments
    /// * `profile` - The validated user profile
    /// * `candidates` - Active, unexpired catalog entries
    ///
    /// # Returns
    /// MatchResult containing tiered, capped matches and diagnostic counters
    pub fn find_matches(&self, profile: &UserProfile, candidates: &[Candidate]) -> MatchResult {
        let outcomes: Vec<Outcome> = if candidates.len() >= self.config.parallel_threshold {
            candidates
                .par_iter()
                .map(|candidate| self.evaluate_candidate(candidate, profile))
                .collect()
        } else {
            candidates
                .iter()
                .map(|candidate| self.evaluate_candidate(candidate, profile))
                .collect()
        };

        let mut result = MatchResult {
            total_analyzed: candidates.len(),
            strategy_version: self.config.version.clone(),
            ..MatchResult::default()
        };

        let mut scored = Vec::new();
        for outcome in outcomes {
            match outcome {
                Outcome::FilteredByTrack => result.filtered_by_track += 1,
                Outcome::KnockedOut => result.knocked_out += 1,
                Outcome::InsufficientData => result.dropped_insufficient_data += 1,
                Outcome::BelowThreshold => result.below_threshold += 1,
                Outcome::Scored(entry) => scored.push(*entry),
            }
        }

        let tiers = assemble(scored, &self.config.caps);
        result.total_count = tiers.all.len();
        result.tailored = tiers.tailored;
        result.recommended = tiers.recommended;
        result.exploratory = tiers.exploratory;
        result.all = tiers.all;

        tracing::debug!(
            track = ?profile.track(),
            analyzed = result.total_analyzed,
            filtered_by_track = result.filtered_by_track,
            knocked_out = result.knocked_out,
            insufficient = result.dropped_insufficient_data,
            below_threshold = result.below_threshold,
            returned = result.total_count,
            "Matching pipeline finished"
        );

        result
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_config()
    }
}

fn has_interest_overlap(candidate: &Candidate, profile: &UserProfile) -> bool {
    let UserProfile::Personal(personal) = profile else {
        return false;
    };
    let Some(categories) = candidate.benefit_categories.as_deref() else {
        return false;
    };
    personal
        .interest_categories
        .iter()
        .any(|interest| categories.iter().any(|c| c == interest.as_str()))
}

fn has_district_match(candidate: &Candidate, profile: &UserProfile) -> bool {
    match (profile.sub_region(), candidate.target_sub_regions.as_deref()) {
        (Some(district), Some(targets)) => targets.iter().any(|t| t == district),
        _ => false,
    }
}
