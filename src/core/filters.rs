use crate::core::config::MatchingConfig;
use crate::models::{
    BusinessAge, BusinessProfile, Candidate, DimensionKey, IncomeLevel, PersonalProfile,
    RegionScope, ServiceType, Track, UserProfile,
};

// Numeric knockout bounds
const EMPLOYEE_OVER_MAX_FACTOR: f64 = 1.5;
const EMPLOYEE_UNDER_MIN_FACTOR: f64 = 0.5;
const REVENUE_OVER_MAX_FACTOR: f64 = 2.0;
const BUSINESS_AGE_OVER_MAX_FACTOR: f64 = 1.5;
const FOUNDER_AGE_MARGIN: f64 = 10.0;
const PERSONAL_AGE_MARGIN: f64 = 5.0;
/// Income brackets above the targeted ceiling that are still tolerated
const INCOME_TOLERATED_STEPS: usize = 1;

/// Check whether a candidate's declared service type admits the user's track
///
/// This is Stage 1 of the pipeline. Untagged (`unknown`) entries are kept.
#[inline]
pub fn is_track_compatible(service_type: ServiceType, track: Track) -> bool {
    match service_type {
        ServiceType::Both | ServiceType::Unknown => true,
        ServiceType::Personal => track == Track::Personal,
        ServiceType::Business => track == Track::Business,
    }
}

/// Check whether a candidate is disqualified outright for this profile
///
/// This is the knockout stage. A constraint only disqualifies when its
/// extraction confidence reaches the dimension's knockout threshold.
pub fn is_knocked_out(candidate: &Candidate, profile: &UserProfile, config: &MatchingConfig) -> bool {
    match profile {
        UserProfile::Personal(personal) => is_knocked_out_personal(candidate, personal, config),
        UserProfile::Business(business) => is_knocked_out_business(candidate, business, config),
    }
}

pub fn is_knocked_out_business(
    candidate: &Candidate,
    profile: &BusinessProfile,
    config: &MatchingConfig,
) -> bool {
    let confident = |key| is_confident(candidate, config, Track::Business, key);

    if confident(DimensionKey::Region) && region_mismatch(candidate, profile.region.as_str()) {
        return true;
    }

    if confident(DimensionKey::BusinessType) {
        if let Some(types) = non_empty(&candidate.target_business_types) {
            let accepted = config.expand_business_type(profile.business_type.as_str());
            if !types.iter().any(|t| accepted.contains(&t.as_str())) {
                return true;
            }
        }
    }

    if confident(DimensionKey::Employee) {
        let employees = profile.employee_count as f64;
        let range = &candidate.target_employee;
        if range.max.is_some_and(|max| employees > max * EMPLOYEE_OVER_MAX_FACTOR)
            || range.min.is_some_and(|min| employees < min * EMPLOYEE_UNDER_MIN_FACTOR)
        {
            return true;
        }
    }

    if confident(DimensionKey::Revenue)
        && candidate
            .target_revenue
            .max
            .is_some_and(|max| profile.annual_revenue as f64 > max * REVENUE_OVER_MAX_FACTOR)
    {
        return true;
    }

    if confident(DimensionKey::BusinessAge) {
        if let BusinessAge::Months(months) = profile.business_age {
            if candidate
                .target_business_age
                .max
                .is_some_and(|max| max > 0.0 && months as f64 > max * BUSINESS_AGE_OVER_MAX_FACTOR)
            {
                return true;
            }
        }
    }

    if confident(DimensionKey::FounderAge) {
        let age = profile.founder_age as f64;
        let range = &candidate.target_founder_age;
        if range.max.is_some_and(|max| age > max + FOUNDER_AGE_MARGIN)
            || range.min.is_some_and(|min| age < min - FOUNDER_AGE_MARGIN)
        {
            return true;
        }
    }

    false
}

pub fn is_knocked_out_personal(
    candidate: &Candidate,
    profile: &PersonalProfile,
    config: &MatchingConfig,
) -> bool {
    let confident = |key| is_confident(candidate, config, Track::Personal, key);

    if confident(DimensionKey::Region) && region_mismatch(candidate, profile.region.as_str()) {
        return true;
    }

    if confident(DimensionKey::Age) {
        let age = profile.age_group.representative_age();
        let range = &candidate.target_age;
        if range.max.is_some_and(|max| age > max + PERSONAL_AGE_MARGIN)
            || range.min.is_some_and(|min| age < min - PERSONAL_AGE_MARGIN)
        {
            return true;
        }
    }

    if confident(DimensionKey::HouseholdType) {
        if let Some(types) = non_empty(&candidate.target_household_types) {
            if !types.iter().any(|t| t == profile.household_type.as_str()) {
                return true;
            }
        }
    }

    if confident(DimensionKey::IncomeLevel) {
        if let Some(levels) = non_empty(&candidate.target_income_levels) {
            let ceiling = levels.iter().filter_map(|l| IncomeLevel::parse(l)).map(|l| l.rank()).max();
            if ceiling.is_some_and(|ceiling| profile.income_level.rank() > ceiling + INCOME_TOLERATED_STEPS) {
                return true;
            }
        }
    }

    if confident(DimensionKey::EmploymentStatus) {
        if let Some(statuses) = non_empty(&candidate.target_employment_status) {
            if !statuses.iter().any(|s| s == profile.employment_status.as_str()) {
                return true;
            }
        }
    }

    false
}

fn is_confident(candidate: &Candidate, config: &MatchingConfig, track: Track, key: DimensionKey) -> bool {
    config
        .spec(track, key)
        .is_some_and(|spec| candidate.extraction_confidence.for_dimension(key) >= spec.knockout_threshold)
}

/// Nationwide programs never knock out on region
fn region_mismatch(candidate: &Candidate, user_region: &str) -> bool {
    if candidate.region_scope == RegionScope::National {
        return false;
    }
    non_empty(&candidate.target_regions).is_some_and(|regions| !regions.iter().any(|r| r == user_region))
}

fn non_empty(values: &Option<Vec<String>>) -> Option<&[String]> {
    values.as_deref().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AgeGroup, BusinessType, EmploymentStatus, Gender, HouseholdType, RangeConstraint, Region,
    };

    fn create_business_profile() -> BusinessProfile {
        BusinessProfile {
            business_type: BusinessType::Manufacturing,
            region: Region::Busan,
            sub_region: None,
            employee_count: 30,
            annual_revenue: 750_000_000,
            business_age: BusinessAge::Months(48),
            founder_age: 45,
        }
    }

    fn create_personal_profile() -> PersonalProfile {
        PersonalProfile {
            age_group: AgeGroup::Thirties,
            gender: Gender::Male,
            region: Region::Seoul,
            sub_region: None,
            household_type: HouseholdType::Newlywed,
            income_level: IncomeLevel::MedianUnder100,
            employment_status: EmploymentStatus::Employed,
            interest_categories: vec![],
        }
    }

    #[test]
    fn test_track_compatibility() {
        assert!(is_track_compatible(ServiceType::Both, Track::Business));
        assert!(is_track_compatible(ServiceType::Unknown, Track::Personal));
        assert!(is_track_compatible(ServiceType::Business, Track::Business));
        assert!(!is_track_compatible(ServiceType::Personal, Track::Business));
        assert!(!is_track_compatible(ServiceType::Business, Track::Personal));
    }

    #[test]
    fn test_region_knockout_needs_confidence() {
        let config = MatchingConfig::default();
        let mut candidate = Candidate::new("s1", "t", "서울특별시");
        candidate.target_regions = Some(vec!["서울".to_string()]);

        candidate.extraction_confidence.regions = 0.9;
        assert!(is_knocked_out_business(&candidate, &create_business_profile(), &config));

        candidate.extraction_confidence.regions = 0.5;
        assert!(!is_knocked_out_business(&candidate, &create_business_profile(), &config));
    }

    #[test]
    fn test_national_scope_never_knocks_out_on_region() {
        let config = MatchingConfig::default();
        let mut candidate = Candidate::new("s1", "t", "중소벤처기업부");
        candidate.region_scope = RegionScope::National;
        candidate.target_regions = Some(vec!["서울".to_string()]);
        candidate.extraction_confidence.regions = 1.0;

        assert!(!is_knocked_out_business(&candidate, &create_business_profile(), &config));
    }

    #[test]
    fn test_business_type_knockout_uses_aliases() {
        let config = MatchingConfig::default();
        let mut candidate = Candidate::new("s1", "t", "org");
        candidate.target_business_types = Some(vec!["도매 및 소매업".to_string()]);
        candidate.extraction_confidence.business_types = 0.8;

        assert!(is_knocked_out_business(&candidate, &create_business_profile(), &config));

        let mut retailer = create_business_profile();
        retailer.business_type = BusinessType::Retail;
        assert!(!is_knocked_out_business(&candidate, &retailer, &config));
    }

    #[test]
    fn test_employee_multiplicative_bounds() {
        let config = MatchingConfig::default();
        let mut candidate = Candidate::new("s1", "t", "org");
        candidate.extraction_confidence.employee = 0.6;

        // 30 employees: 1.5 x 19 = 28.5 -> knocked out, 1.5 x 20 = 30 -> kept
        candidate.target_employee = RangeConstraint::new(None, Some(19.0));
        assert!(is_knocked_out_business(&candidate, &create_business_profile(), &config));
        candidate.target_employee = RangeConstraint::new(None, Some(20.0));
        assert!(!is_knocked_out_business(&candidate, &create_business_profile(), &config));

        // 0.5 x 100 = 50 > 30 -> knocked out
        candidate.target_employee = RangeConstraint::new(Some(100.0), None);
        assert!(is_knocked_out_business(&candidate, &create_business_profile(), &config));
    }

    #[test]
    fn test_numeric_knockout_ignores_low_confidence() {
        let config = MatchingConfig::default();
        let mut candidate = Candidate::new("s1", "t", "org");
        candidate.target_revenue = RangeConstraint::new(None, Some(100_000_000.0));
        candidate.extraction_confidence.revenue = 0.4;
        assert!(!is_knocked_out_business(&candidate, &create_business_profile(), &config));

        candidate.extraction_confidence.revenue = 0.5;
        assert!(is_knocked_out_business(&candidate, &create_business_profile(), &config));
    }

    #[test]
    fn test_pre_startup_skips_business_age_knockout() {
        let config = MatchingConfig::default();
        let mut candidate = Candidate::new("s1", "t", "org");
        candidate.target_business_age = RangeConstraint::new(None, Some(12.0));
        candidate.extraction_confidence.business_age = 0.9;

        assert!(is_knocked_out_business(&candidate, &create_business_profile(), &config));

        let mut founder = create_business_profile();
        founder.business_age = BusinessAge::PreStartup;
        assert!(!is_knocked_out_business(&candidate, &founder, &config));
    }

    #[test]
    fn test_personal_income_tolerates_one_step() {
        let config = MatchingConfig::default();
        let mut candidate = Candidate::new("s1", "t", "org");
        candidate.target_income_levels = Some(vec!["중위50이하".to_string()]);
        candidate.extraction_confidence.income_levels = 0.8;

        // user at 중위100이하 is one step above the ceiling
        assert!(!is_knocked_out_personal(&candidate, &create_personal_profile(), &config));

        let mut wealthier = create_personal_profile();
        wealthier.income_level = IncomeLevel::MedianOver100;
        assert!(is_knocked_out_personal(&candidate, &wealthier, &config));
    }

    #[test]
    fn test_personal_age_margin() {
        let config = MatchingConfig::default();
        let mut candidate = Candidate::new("s1", "t", "org");
        candidate.target_age = RangeConstraint::new(Some(19.0), Some(29.0));
        candidate.extraction_confidence.age = 0.9;

        // representative age 35 > 29 + 5
        assert!(is_knocked_out_personal(&candidate, &create_personal_profile(), &config));

        candidate.target_age = RangeConstraint::new(Some(19.0), Some(30.0));
        assert!(!is_knocked_out_personal(&candidate, &create_personal_profile(), &config));
    }

    #[test]
    fn test_personal_household_and_employment() {
        let config = MatchingConfig::default();
        let mut candidate = Candidate::new("s1", "t", "org");
        candidate.target_household_types = Some(vec!["한부모".to_string()]);
        candidate.extraction_confidence.household_types = 0.69;
        assert!(!is_knocked_out_personal(&candidate, &create_personal_profile(), &config));

        candidate.extraction_confidence.household_types = 0.7;
        assert!(is_knocked_out_personal(&candidate, &create_personal_profile(), &config));

        let mut candidate = Candidate::new("s2", "t", "org");
        candidate.target_employment_status = Some(vec!["재직자".to_string()]);
        candidate.extraction_confidence.employment_status = 0.9;
        assert!(!is_knocked_out_personal(&candidate, &create_personal_profile(), &config));
    }
}
