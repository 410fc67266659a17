use serde::{Deserialize, Serialize};

use crate::core::config::{DimensionSpec, MatchingConfig};
use crate::core::scoring::{score_business_age, score_income_level, score_range, score_set};
use crate::models::{
    BusinessProfile, Candidate, DimensionKey, PersonalProfile, RangeConstraint, RegionScope,
    Track, UserProfile,
};

// Minimum decay denominators per range dimension
const AGE_FALLBACK_DENOM: f64 = 10.0;
const EMPLOYEE_FALLBACK_DENOM: f64 = 10.0;
const REVENUE_FALLBACK_DENOM: f64 = 100_000_000.0;
const BUSINESS_AGE_FALLBACK_DENOM: f64 = 12.0;
const FOUNDER_AGE_FALLBACK_DENOM: f64 = 10.0;

/// Evaluation of one candidate on one dimension
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionScore {
    pub key: DimensionKey,
    pub weight: f64,
    /// Constraint present and confident enough to count towards the score
    pub has_data: bool,
    pub confidence: f64,
    pub raw_score: f64,
    pub identity_specific: bool,
}

impl DimensionScore {
    fn inactive(spec: &DimensionSpec, confidence: f64) -> Self {
        Self::scored(spec, false, confidence, 0.0)
    }

    /// Inactive dimensions always report a raw score of 0
    fn scored(spec: &DimensionSpec, has_data: bool, confidence: f64, raw_score: f64) -> Self {
        Self {
            key: spec.key,
            weight: spec.weight,
            has_data,
            confidence,
            raw_score: if has_data { raw_score } else { 0.0 },
            identity_specific: spec.identity_specific,
        }
    }
}

/// Evaluate every dimension of the profile's track
pub fn evaluate(candidate: &Candidate, profile: &UserProfile, config: &MatchingConfig) -> Vec<DimensionScore> {
    match profile {
        UserProfile::Personal(personal) => evaluate_personal(candidate, personal, config),
        UserProfile::Business(business) => evaluate_business(candidate, business, config),
    }
}

pub fn evaluate_personal(
    candidate: &Candidate,
    profile: &PersonalProfile,
    config: &MatchingConfig,
) -> Vec<DimensionScore> {
    config
        .dimensions(Track::Personal)
        .iter()
        .map(|spec| {
            let confidence = candidate.extraction_confidence.for_dimension(spec.key);
            match spec.key {
                DimensionKey::Region => region_dimension(spec, candidate, profile.region.as_str(), config),
                DimensionKey::Age => range_dimension(spec, &candidate.target_age, confidence, |range| {
                    score_range(range, profile.age_group.representative_age(), AGE_FALLBACK_DENOM)
                }),
                DimensionKey::HouseholdType => set_dimension(
                    spec,
                    candidate.target_household_types.as_deref(),
                    confidence,
                    |targets| score_set(targets, &[profile.household_type.as_str()]),
                ),
                DimensionKey::IncomeLevel => set_dimension(
                    spec,
                    candidate.target_income_levels.as_deref(),
                    confidence,
                    |targets| score_income_level(targets, profile.income_level),
                ),
                DimensionKey::EmploymentStatus => set_dimension(
                    spec,
                    candidate.target_employment_status.as_deref(),
                    confidence,
                    |targets| score_set(targets, &[profile.employment_status.as_str()]),
                ),
                // validated configs never declare business dimensions on this track
                _ => DimensionScore::inactive(spec, confidence),
            }
        })
        .collect()
}

pub fn evaluate_business(
    candidate: &Candidate,
    profile: &BusinessProfile,
    config: &MatchingConfig,
) -> Vec<DimensionScore> {
    config
        .dimensions(Track::Business)
        .iter()
        .map(|spec| {
            let confidence = candidate.extraction_confidence.for_dimension(spec.key);
            match spec.key {
                DimensionKey::Region => region_dimension(spec, candidate, profile.region.as_str(), config),
                DimensionKey::BusinessType => {
                    let accepted = config.expand_business_type(profile.business_type.as_str());
                    set_dimension(spec, candidate.target_business_types.as_deref(), confidence, |targets| {
                        score_set(targets, &accepted)
                    })
                }
                DimensionKey::Employee => range_dimension(spec, &candidate.target_employee, confidence, |range| {
                    score_range(range, profile.employee_count as f64, EMPLOYEE_FALLBACK_DENOM)
                }),
                DimensionKey::Revenue => range_dimension(spec, &candidate.target_revenue, confidence, |range| {
                    score_range(range, profile.annual_revenue as f64, REVENUE_FALLBACK_DENOM)
                }),
                DimensionKey::BusinessAge => {
                    range_dimension(spec, &candidate.target_business_age, confidence, |range| {
                        score_business_age(range, profile.business_age, BUSINESS_AGE_FALLBACK_DENOM)
                    })
                }
                DimensionKey::FounderAge => {
                    range_dimension(spec, &candidate.target_founder_age, confidence, |range| {
                        score_range(range, profile.founder_age as f64, FOUNDER_AGE_FALLBACK_DENOM)
                    })
                }
                _ => DimensionScore::inactive(spec, confidence),
            }
        })
        .collect()
}

/// Nationwide programs apply everywhere; otherwise region is an ordinary set dimension
fn region_dimension(
    spec: &DimensionSpec,
    candidate: &Candidate,
    user_region: &str,
    config: &MatchingConfig,
) -> DimensionScore {
    if candidate.region_scope == RegionScope::National {
        return DimensionScore::scored(spec, true, config.national_region_confidence, 1.0);
    }

    set_dimension(
        spec,
        candidate.target_regions.as_deref(),
        candidate.extraction_confidence.regions,
        |targets| score_set(targets, &[user_region]),
    )
}

fn set_dimension(
    spec: &DimensionSpec,
    targets: Option<&[String]>,
    confidence: f64,
    score: impl FnOnce(&[String]) -> f64,
) -> DimensionScore {
    let usable = confidence >= spec.usability_threshold;
    match targets {
        // absent or empty sets only mean "everyone" when the extraction is trustworthy
        None | Some([]) if !usable => DimensionScore::inactive(spec, confidence),
        None | Some([]) => DimensionScore::scored(spec, true, confidence, 1.0),
        Some(targets) => DimensionScore::scored(spec, usable, confidence, score(targets)),
    }
}

fn range_dimension(
    spec: &DimensionSpec,
    range: &RangeConstraint,
    confidence: f64,
    score: impl FnOnce(&RangeConstraint) -> f64,
) -> DimensionScore {
    if range.is_unbounded() {
        return DimensionScore::inactive(spec, confidence);
    }
    let usable = confidence >= spec.usability_threshold;
    DimensionScore::scored(spec, usable, confidence, score(range))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AgeGroup, BusinessAge, BusinessType, EmploymentStatus, Gender, HouseholdType, IncomeLevel,
        Region,
    };

    fn business_profile() -> BusinessProfile {
        BusinessProfile {
            business_type: BusinessType::Retail,
            region: Region::Seoul,
            sub_region: None,
            employee_count: 7,
            annual_revenue: 300_000_000,
            business_age: BusinessAge::Months(24),
            founder_age: 35,
        }
    }

    fn personal_profile() -> PersonalProfile {
        PersonalProfile {
            age_group: AgeGroup::Twenties,
            gender: Gender::Female,
            region: Region::Busan,
            sub_region: None,
            household_type: HouseholdType::SinglePerson,
            income_level: IncomeLevel::MedianUnder50,
            employment_status: EmploymentStatus::JobSeeker,
            interest_categories: vec![],
        }
    }

    fn find(dims: &[DimensionScore], key: DimensionKey) -> DimensionScore {
        *dims.iter().find(|d| d.key == key).unwrap()
    }

    #[test]
    fn test_business_track_has_six_dimensions() {
        let config = MatchingConfig::default();
        let candidate = Candidate::new("s1", "t", "org");
        let dims = evaluate_business(&candidate, &business_profile(), &config);
        assert_eq!(dims.len(), 6);
        assert!(dims.iter().all(|d| !d.has_data && d.raw_score == 0.0));
    }

    #[test]
    fn test_personal_track_has_five_dimensions() {
        let config = MatchingConfig::default();
        let candidate = Candidate::new("s1", "t", "org");
        let dims = evaluate_personal(&candidate, &personal_profile(), &config);
        assert_eq!(dims.len(), 5);
    }

    #[test]
    fn test_region_match_with_confidence() {
        let config = MatchingConfig::default();
        let mut candidate = Candidate::new("s1", "t", "org");
        candidate.target_regions = Some(vec!["서울".to_string()]);
        candidate.extraction_confidence.regions = 0.9;

        let region = find(&evaluate_business(&candidate, &business_profile(), &config), DimensionKey::Region);
        assert!(region.has_data);
        assert_eq!(region.raw_score, 1.0);
        assert!(region.identity_specific);
    }

    #[test]
    fn test_low_confidence_set_is_inactive() {
        let config = MatchingConfig::default();
        let mut candidate = Candidate::new("s1", "t", "org");
        candidate.target_regions = Some(vec!["서울".to_string()]);
        candidate.extraction_confidence.regions = 0.2;

        let region = find(&evaluate_business(&candidate, &business_profile(), &config), DimensionKey::Region);
        assert!(!region.has_data);
    }

    #[test]
    fn test_confident_empty_set_matches_everyone() {
        let config = MatchingConfig::default();
        let mut candidate = Candidate::new("s1", "t", "org");
        candidate.target_household_types = Some(vec![]);
        candidate.extraction_confidence.household_types = 0.8;

        let dims = evaluate_personal(&candidate, &personal_profile(), &config);
        let household = find(&dims, DimensionKey::HouseholdType);
        assert!(household.has_data);
        assert_eq!(household.raw_score, 1.0);

        candidate.extraction_confidence.household_types = 0.1;
        let dims = evaluate_personal(&candidate, &personal_profile(), &config);
        let household = find(&dims, DimensionKey::HouseholdType);
        assert!(!household.has_data);
        assert_eq!(household.raw_score, 0.0);
    }

    #[test]
    fn test_national_scope_region_is_active() {
        let config = MatchingConfig::default();
        let mut candidate = Candidate::new("s1", "t", "중소벤처기업부");
        candidate.region_scope = RegionScope::National;

        let region = find(&evaluate_business(&candidate, &business_profile(), &config), DimensionKey::Region);
        assert!(region.has_data);
        assert_eq!(region.raw_score, 1.0);
        assert_eq!(region.confidence, 0.9);
    }

    #[test]
    fn test_business_type_alias_group() {
        let config = MatchingConfig::default();
        let mut candidate = Candidate::new("s1", "t", "org");
        candidate.target_business_types = Some(vec!["도매 및 소매업".to_string()]);
        candidate.extraction_confidence.business_types = 0.8;

        let dims = evaluate_business(&candidate, &business_profile(), &config);
        assert_eq!(find(&dims, DimensionKey::BusinessType).raw_score, 1.0);
    }

    #[test]
    fn test_range_dimensions() {
        let config = MatchingConfig::default();
        let mut candidate = Candidate::new("s1", "t", "org");
        candidate.target_employee = RangeConstraint::new(None, Some(4.0));
        candidate.target_founder_age = RangeConstraint::new(Some(19.0), Some(39.0));
        candidate.extraction_confidence.employee = 0.6;
        candidate.extraction_confidence.founder_age = 0.2;

        let dims = evaluate_business(&candidate, &business_profile(), &config);
        let employee = find(&dims, DimensionKey::Employee);
        assert!(employee.has_data);
        // 7 employees against max 4: 1 - 3/10
        assert!((employee.raw_score - 0.7).abs() < 1e-9);

        let founder = find(&dims, DimensionKey::FounderAge);
        assert!(!founder.has_data);
        assert_eq!(founder.raw_score, 0.0);
    }

    #[test]
    fn test_confident_absent_set_matches_everyone() {
        let config = MatchingConfig::default();
        let mut candidate = Candidate::new("s1", "t", "org");
        candidate.target_business_types = None;
        candidate.extraction_confidence.business_types = 0.9;

        let dims = evaluate_business(&candidate, &business_profile(), &config);
        let business_type = find(&dims, DimensionKey::BusinessType);
        assert!(business_type.has_data);
        assert_eq!(business_type.raw_score, 1.0);
        assert!(business_type.identity_specific);

        candidate.extraction_confidence.business_types = 0.2;
        let dims = evaluate_business(&candidate, &business_profile(), &config);
        let business_type = find(&dims, DimensionKey::BusinessType);
        assert!(!business_type.has_data);
        assert_eq!(business_type.raw_score, 0.0);
    }

    #[test]
    fn test_unusable_constraints_report_zero_raw_score() {
        let config = MatchingConfig::default();
        let mut candidate = Candidate::new("s1", "t", "org");
        candidate.target_regions = Some(vec!["서울".to_string()]);
        candidate.extraction_confidence.regions = 0.1;
        candidate.target_employee = RangeConstraint::new(Some(1.0), Some(10.0));
        candidate.extraction_confidence.employee = 0.1;

        let dims = evaluate_business(&candidate, &business_profile(), &config);
        for key in [DimensionKey::Region, DimensionKey::Employee] {
            let dim = find(&dims, key);
            assert!(!dim.has_data);
            assert_eq!(dim.raw_score, 0.0);
        }
    }

    #[test]
    fn test_personal_age_uses_representative_value() {
        let config = MatchingConfig::default();
        let mut candidate = Candidate::new("s1", "t", "org");
        candidate.target_age = RangeConstraint::new(Some(19.0), Some(34.0));
        candidate.extraction_confidence.age = 0.9;

        let dims = evaluate_personal(&candidate, &personal_profile(), &config);
        let age = find(&dims, DimensionKey::Age);
        assert!(age.has_data);
        assert_eq!(age.raw_score, 1.0);
    }
}
