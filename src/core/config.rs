use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use thiserror::Error;

use crate::models::{DimensionKey, Track};

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Errors raised when a matching configuration is malformed
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{track:?} track is missing dimension {key:?}")]
    MissingDimension { track: Track, key: DimensionKey },

    #[error("{track:?} track declares dimension {key:?} more than once")]
    DuplicateDimension { track: Track, key: DimensionKey },

    #[error("{track:?} track declares dimension {key:?}, which does not belong to it")]
    ForeignDimension { track: Track, key: DimensionKey },

    #[error("{track:?} track weights sum to {sum}, expected 1.0")]
    WeightSum { track: Track, sum: f64 },

    #[error("{field} must lie in [0, 1], got {value}")]
    OutOfUnitRange { field: String, value: f64 },

    #[error("{track:?} track dimension {key:?} has knockout threshold {knockout} below usability threshold {usability}")]
    KnockoutBelowUsability { track: Track, key: DimensionKey, knockout: f64, usability: f64 },

    #[error("tier thresholds must be strictly descending (tailored > recommended > exploratory)")]
    TierOrder,

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Per-dimension weight and confidence gates
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct DimensionSpec {
    pub key: DimensionKey,
    pub weight: f64,
    /// Minimum confidence for the dimension to count towards the score
    #[serde(default = "default_usability_threshold")]
    pub usability_threshold: f64,
    /// Minimum confidence for a mismatch to disqualify outright
    pub knockout_threshold: f64,
    /// Whether a match on this dimension directly personalizes relevance
    #[serde(default)]
    pub identity_specific: bool,
}

impl DimensionSpec {
    pub const fn new(key: DimensionKey, weight: f64, knockout_threshold: f64, identity_specific: bool) -> Self {
        Self {
            key,
            weight,
            usability_threshold: 0.3,
            knockout_threshold,
            identity_specific,
        }
    }
}

fn default_usability_threshold() -> f64 { 0.3 }

/// Inclusive lower score bounds for each tier
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct TierThresholds {
    pub tailored: f64,
    pub recommended: f64,
    pub exploratory: f64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            tailored: 0.65,
            recommended: 0.40,
            exploratory: 0.20,
        }
    }
}

/// Result-set size limits
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ResultCaps {
    pub tailored: usize,
    pub recommended: usize,
    pub exploratory: usize,
    pub total: usize,
    /// Maximum results per issuing organization within one tier
    pub per_organization: usize,
    /// Tailored tiers smaller than this donate unused capacity to recommended
    pub sparse_tailored: usize,
}

impl Default for ResultCaps {
    fn default() -> Self {
        Self {
            tailored: 20,
            recommended: 30,
            exploratory: 50,
            total: 100,
            per_organization: 3,
            sparse_tailored: 3,
        }
    }
}

/// Score adjustments that sit outside the weighted dimensions
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Bonuses {
    /// Multiplier when personal interest categories overlap the benefit categories
    pub interest_factor: f64,
    /// Additive bonus when the user's district is explicitly targeted
    pub district: f64,
}

impl Default for Bonuses {
    fn default() -> Self {
        Self {
            interest_factor: 1.12,
            district: 0.15,
        }
    }
}

/// Complete configuration of one matching strategy
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    pub version: String,
    pub personal: Vec<DimensionSpec>,
    pub business: Vec<DimensionSpec>,
    /// Minimum coverage factor, reached when almost nothing is observable
    pub coverage_floor: f64,
    /// Raw score an identity-specific dimension needs to count as a specific match
    pub specific_match_score: f64,
    /// Confidence assigned to the region dimension of nationwide programs
    pub national_region_confidence: f64,
    pub tiers: TierThresholds,
    pub caps: ResultCaps,
    pub bonuses: Bonuses,
    /// Candidate count from which evaluation fans out across threads
    pub parallel_threshold: usize,
    /// Coarse industry groupings: group label -> member business types
    pub business_type_aliases: HashMap<String, Vec<String>>,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        use DimensionKey::*;

        Self {
            version: "v4".to_string(),
            personal: vec![
                DimensionSpec::new(Region, 0.20, 0.7, true),
                DimensionSpec::new(Age, 0.25, 0.5, false),
                DimensionSpec::new(HouseholdType, 0.20, 0.7, false),
                DimensionSpec::new(IncomeLevel, 0.20, 0.7, false),
                DimensionSpec::new(EmploymentStatus, 0.15, 0.7, false),
            ],
            business: vec![
                DimensionSpec::new(Region, 0.22, 0.7, true),
                DimensionSpec::new(BusinessType, 0.18, 0.7, true),
                DimensionSpec::new(Employee, 0.15, 0.5, false),
                DimensionSpec::new(Revenue, 0.10, 0.5, false),
                DimensionSpec::new(BusinessAge, 0.20, 0.5, false),
                DimensionSpec::new(FounderAge, 0.15, 0.5, false),
            ],
            coverage_floor: 0.1,
            specific_match_score: 0.8,
            national_region_confidence: 0.9,
            tiers: TierThresholds::default(),
            caps: ResultCaps::default(),
            bonuses: Bonuses::default(),
            parallel_threshold: 512,
            business_type_aliases: default_business_type_aliases(),
        }
    }
}

fn default_business_type_aliases() -> HashMap<String, Vec<String>> {
    [
        ("도매 및 소매업", &["도매업", "소매업"][..]),
        ("숙박 및 음식점업", &["숙박업", "음식점업"][..]),
        ("운수 및 창고업", &["운수업"][..]),
        ("전문, 과학 및 기술 서비스업", &["전문서비스업"][..]),
        ("교육 서비스업", &["교육서비스업"][..]),
        ("보건업 및 사회복지 서비스업", &["보건업"][..]),
        ("기타", &["기타서비스업", "예술/스포츠"][..]),
    ]
    .into_iter()
    .map(|(group, members)| {
        (group.to_string(), members.iter().map(|m| m.to_string()).collect())
    })
    .collect()
}

impl MatchingConfig {
    pub fn dimensions(&self, track: Track) -> &[DimensionSpec] {
        match track {
            Track::Personal => &self.personal,
            Track::Business => &self.business,
        }
    }

    pub fn spec(&self, track: Track, key: DimensionKey) -> Option<&DimensionSpec> {
        self.dimensions(track).iter().find(|spec| spec.key == key)
    }

    /// Sum of all dimension weights for a track
    pub fn total_weight(&self, track: Track) -> f64 {
        self.dimensions(track).iter().map(|spec| spec.weight).sum()
    }

    /// Every label a business type can be matched under: itself, any grouping that
    /// contains it, and the members of a grouping when the type is a grouping label
    pub fn expand_business_type<'a>(&'a self, business_type: &'a str) -> Vec<&'a str> {
        let mut expanded = vec![business_type];
        for (group, members) in &self.business_type_aliases {
            if group == business_type {
                expanded.extend(members.iter().map(String::as_str));
            } else if members.iter().any(|m| m == business_type) {
                expanded.push(group.as_str());
            }
        }
        expanded
    }

    /// Check every structural invariant; run once at construction time
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_track(Track::Personal, &DimensionKey::PERSONAL)?;
        self.validate_track(Track::Business, &DimensionKey::BUSINESS)?;

        unit("coverage_floor", self.coverage_floor)?;
        unit("specific_match_score", self.specific_match_score)?;
        unit("national_region_confidence", self.national_region_confidence)?;
        unit("bonuses.district", self.bonuses.district)?;
        if self.bonuses.interest_factor < 1.0 {
            return Err(ConfigError::OutOfUnitRange {
                field: "bonuses.interest_factor (must be >= 1)".to_string(),
                value: self.bonuses.interest_factor,
            });
        }

        let tiers = &self.tiers;
        unit("tiers.tailored", tiers.tailored)?;
        unit("tiers.recommended", tiers.recommended)?;
        unit("tiers.exploratory", tiers.exploratory)?;
        if !(tiers.tailored > tiers.recommended && tiers.recommended > tiers.exploratory) {
            return Err(ConfigError::TierOrder);
        }

        let caps = &self.caps;
        for (name, value) in [
            ("caps.tailored", caps.tailored),
            ("caps.recommended", caps.recommended),
            ("caps.exploratory", caps.exploratory),
            ("caps.total", caps.total),
            ("caps.per_organization", caps.per_organization),
        ] {
            if value == 0 {
                return Err(ConfigError::Zero(name));
            }
        }

        Ok(())
    }

    fn validate_track(&self, track: Track, expected: &[DimensionKey]) -> Result<(), ConfigError> {
        let specs = self.dimensions(track);
        let mut seen = HashSet::new();

        for spec in specs {
            if !expected.contains(&spec.key) {
                return Err(ConfigError::ForeignDimension { track, key: spec.key });
            }
            if !seen.insert(spec.key) {
                return Err(ConfigError::DuplicateDimension { track, key: spec.key });
            }
            unit(&format!("{:?}.{}.weight", track, spec.key.as_str()), spec.weight)?;
            unit(&format!("{:?}.{}.usability_threshold", track, spec.key.as_str()), spec.usability_threshold)?;
            unit(&format!("{:?}.{}.knockout_threshold", track, spec.key.as_str()), spec.knockout_threshold)?;
            if spec.knockout_threshold < spec.usability_threshold {
                return Err(ConfigError::KnockoutBelowUsability {
                    track,
                    key: spec.key,
                    knockout: spec.knockout_threshold,
                    usability: spec.usability_threshold,
                });
            }
        }

        if let Some(&key) = expected.iter().find(|key| !seen.contains(*key)) {
            return Err(ConfigError::MissingDimension { track, key });
        }

        let sum = self.total_weight(track);
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::WeightSum { track, sum });
        }

        Ok(())
    }
}

fn unit(field: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfUnitRange { field: field.to_string(), value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = MatchingConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert!((config.total_weight(Track::Personal) - 1.0).abs() < 1e-9);
        assert!((config.total_weight(Track::Business) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_weight_sum_rejected() {
        let mut config = MatchingConfig::default();
        config.business[0].weight = 0.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::WeightSum { track: Track::Business, .. })
        ));
    }

    #[test]
    fn test_missing_and_foreign_dimensions_rejected() {
        let mut config = MatchingConfig::default();
        config.personal.pop();
        assert_eq!(
            config.validate(),
            Err(ConfigError::MissingDimension {
                track: Track::Personal,
                key: DimensionKey::EmploymentStatus
            })
        );

        let mut config = MatchingConfig::default();
        config.personal[1].key = DimensionKey::Revenue;
        assert_eq!(
            config.validate(),
            Err(ConfigError::ForeignDimension {
                track: Track::Personal,
                key: DimensionKey::Revenue
            })
        );
    }

    #[test]
    fn test_knockout_must_be_stricter_than_usability() {
        let mut config = MatchingConfig::default();
        config.business[1].knockout_threshold = 0.2;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::KnockoutBelowUsability { key: DimensionKey::BusinessType, .. })
        ));
    }

    #[test]
    fn test_tier_order_rejected() {
        let mut config = MatchingConfig::default();
        config.tiers.recommended = 0.7;
        assert_eq!(config.validate(), Err(ConfigError::TierOrder));
    }

    #[test]
    fn test_expand_business_type() {
        let config = MatchingConfig::default();

        let expanded = config.expand_business_type("도매업");
        assert!(expanded.contains(&"도매업"));
        assert!(expanded.contains(&"도매 및 소매업"));
        assert!(!expanded.contains(&"소매업"));

        let expanded = config.expand_business_type("기타");
        assert!(expanded.contains(&"기타서비스업"));
        assert!(expanded.contains(&"예술/스포츠"));

        assert_eq!(config.expand_business_type("제조업"), vec!["제조업"]);
    }
}
