use crate::core::config::MatchingConfig;
use crate::core::dimensions::DimensionScore;
use crate::models::{BusinessAge, IncomeLevel, RangeConstraint};

/// Score for a user income at or below the highest targeted bracket but not listed
const INCOME_BELOW_CEILING_SCORE: f64 = 0.8;

/// Deducted per income bracket above the highest targeted bracket
const INCOME_STEP_PENALTY: f64 = 0.3;

/// Score a numeric value against a target range (0-1)
///
/// Inside the range scores 1.0. Outside, the score decays linearly with the
/// distance past the nearest bound, divided by the range width. When the
/// width is zero, or only one bound exists, the denominator falls back to
/// `fallback_denom` (one-sided ranges use the larger of the bound and the
/// fallback, so near-zero bounds cannot blow the decay up).
///
/// # Arguments
/// * `range` - Target range; an unbounded range accepts everything
/// * `value` - The user's value
/// * `fallback_denom` - Minimum decay denominator for the dimension
pub fn score_range(range: &RangeConstraint, value: f64, fallback_denom: f64) -> f64 {
    let score = match (range.min, range.max) {
        (Some(min), Some(max)) => {
            if value >= min && value <= max {
                return 1.0;
            }
            let distance = if value < min { min - value } else { value - max };
            let width = max - min;
            let denom = if width > 0.0 { width } else { fallback_denom };
            1.0 - distance / denom
        }
        (None, Some(max)) => {
            if value <= max {
                return 1.0;
            }
            1.0 - (value - max) / max.max(fallback_denom)
        }
        (Some(min), None) => {
            if value >= min {
                return 1.0;
            }
            1.0 - (min - value) / min.max(fallback_denom)
        }
        (None, None) => 1.0,
    };

    score.max(0.0)
}

/// Set membership score: an empty target set accepts everyone
#[inline]
pub fn score_set(targets: &[String], accepted: &[&str]) -> f64 {
    if targets.is_empty() || targets.iter().any(|t| accepted.contains(&t.as_str())) {
        1.0
    } else {
        0.0
    }
}

/// Ordinal income score
///
/// Exact membership scores 1.0 and any bracket below the ceiling 0.8. Every
/// bracket above the ceiling costs a fixed penalty. Targets outside the known
/// scale cannot be ranked and only count through exact membership.
pub fn score_income_level(targets: &[String], user: IncomeLevel) -> f64 {
    if targets.is_empty() || targets.iter().any(|t| t == user.as_str()) {
        return 1.0;
    }

    let ceiling = targets
        .iter()
        .filter_map(|t| IncomeLevel::parse(t))
        .map(|level| level.rank())
        .max();

    match ceiling {
        Some(ceiling) if user.rank() <= ceiling => INCOME_BELOW_CEILING_SCORE,
        Some(ceiling) => {
            let steps = (user.rank() - ceiling) as f64;
            (1.0 - steps * INCOME_STEP_PENALTY).max(0.0)
        }
        None => 0.0,
    }
}

/// Business age score; a business that has not started yet satisfies any
/// range that admits the startup stage and fails a strictly positive minimum
pub fn score_business_age(range: &RangeConstraint, age: BusinessAge, fallback_denom: f64) -> f64 {
    match age {
        BusinessAge::PreStartup => match range.min {
            Some(min) if min > 0.0 => 0.0,
            _ => 1.0,
        },
        BusinessAge::Months(months) => score_range(range, months as f64, fallback_denom),
    }
}

/// Coverage penalty multiplier, in [floor, 1.0]
///
/// Grows linearly with the share of the total dimension weight that carried
/// usable data.
#[inline]
pub fn coverage_factor(active_weight: f64, total_weight: f64, floor: f64) -> f64 {
    let share = if total_weight > 0.0 {
        (active_weight / total_weight).clamp(0.0, 1.0)
    } else {
        0.0
    };
    floor + (1.0 - floor) * share
}

/// Adjustments applied after the weighted aggregate
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreBonus {
    pub interest_overlap: bool,
    pub district_match: bool,
}

/// Aggregated score of one candidate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateScore {
    pub final_score: f64,
    /// Weight-normalized mean over active dimensions
    pub match_score: f64,
    pub coverage_factor: f64,
    /// Weighted-average confidence over active dimensions, display only
    pub confidence: f64,
    /// An identity-specific dimension matched with a high raw score
    pub has_specific_match: bool,
}

/// Aggregate per-dimension scores into one scalar
///
/// Returns `None` when no judgment is possible: nothing is active, or no
/// identity-specific dimension is active and fewer than two dimensions are.
/// Inactive dimensions never pull the mean toward any value; they only lower
/// the coverage factor.
pub fn aggregate(
    dimensions: &[DimensionScore],
    total_weight: f64,
    config: &MatchingConfig,
    bonus: ScoreBonus,
) -> Option<AggregateScore> {
    let active: Vec<&DimensionScore> = dimensions.iter().filter(|d| d.has_data).collect();
    if active.is_empty() {
        return None;
    }

    let specific_active = active.iter().any(|d| d.identity_specific);
    if !specific_active && active.len() < 2 {
        return None;
    }

    let active_weight: f64 = active.iter().map(|d| d.weight).sum();
    let (match_score, confidence) = if active_weight > 0.0 {
        (
            active.iter().map(|d| d.raw_score * d.weight).sum::<f64>() / active_weight,
            active.iter().map(|d| d.confidence * d.weight).sum::<f64>() / active_weight,
        )
    } else {
        (0.0, 0.0)
    };

    let coverage = coverage_factor(active_weight, total_weight, config.coverage_floor);
    let mut final_score = (match_score * coverage).clamp(0.0, 1.0);

    if bonus.interest_overlap {
        final_score = (final_score * config.bonuses.interest_factor).min(1.0);
    }
    if bonus.district_match {
        final_score = (final_score + config.bonuses.district).min(1.0);
    }

    let has_specific_match = active
        .iter()
        .any(|d| d.identity_specific && d.raw_score >= config.specific_match_score);

    Some(AggregateScore {
        final_score,
        match_score,
        coverage_factor: coverage,
        confidence,
        has_specific_match,
    })
}
