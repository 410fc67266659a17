use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Declares a closed vocabulary whose wire form is the Korean label used by the catalog.
macro_rules! labeled_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $label)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            pub fn parse(value: &str) -> Option<Self> {
                Self::ALL.iter().copied().find(|v| v.as_str() == value)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

labeled_enum! {
    /// Top-level administrative regions
    Region {
        Seoul => "서울",
        Busan => "부산",
        Daegu => "대구",
        Incheon => "인천",
        Gwangju => "광주",
        Daejeon => "대전",
        Ulsan => "울산",
        Sejong => "세종",
        Gyeonggi => "경기",
        Gangwon => "강원",
        Chungbuk => "충북",
        Chungnam => "충남",
        Jeonbuk => "전북",
        Jeonnam => "전남",
        Gyeongbuk => "경북",
        Gyeongnam => "경남",
        Jeju => "제주",
    }
}

labeled_enum! {
    BusinessType {
        Restaurant => "음식점업",
        Retail => "소매업",
        Wholesale => "도매업",
        Manufacturing => "제조업",
        Construction => "건설업",
        Transportation => "운수업",
        Accommodation => "숙박업",
        InformationCommunication => "정보통신업",
        ProfessionalServices => "전문서비스업",
        EducationServices => "교육서비스업",
        Health => "보건업",
        ArtsSports => "예술/스포츠",
        OtherServices => "기타서비스업",
    }
}

labeled_enum! {
    AgeGroup {
        Teens => "10대",
        Twenties => "20대",
        Thirties => "30대",
        Forties => "40대",
        Fifties => "50대",
        SixtiesPlus => "60대이상",
    }
}

labeled_enum! {
    Gender {
        Male => "남성",
        Female => "여성",
    }
}

labeled_enum! {
    HouseholdType {
        SinglePerson => "1인",
        Newlywed => "신혼부부",
        Infant => "영유아",
        MultiChild => "다자녀",
        SingleParent => "한부모",
        General => "일반",
    }
}

labeled_enum! {
    /// Income brackets, declared from lowest to highest
    IncomeLevel {
        BasicLivelihood => "기초생활",
        NearPoverty => "차상위",
        MedianUnder50 => "중위50이하",
        MedianUnder100 => "중위100이하",
        MedianOver100 => "중위100초과",
    }
}

labeled_enum! {
    EmploymentStatus {
        Employed => "재직자",
        JobSeeker => "구직자",
        Student => "학생",
        SelfEmployed => "자영업",
        Unemployed => "무직",
        Retired => "은퇴",
    }
}

labeled_enum! {
    InterestCategory {
        Housing => "주거",
        Childcare => "육아",
        Education => "교육",
        Employment => "취업",
        Health => "건강",
        Living => "생활",
        Culture => "문화",
    }
}

impl AgeGroup {
    /// Representative age used when scoring against numeric age ranges
    pub fn representative_age(&self) -> f64 {
        match self {
            AgeGroup::Teens => 17.0,
            AgeGroup::Twenties => 25.0,
            AgeGroup::Thirties => 35.0,
            AgeGroup::Forties => 45.0,
            AgeGroup::Fifties => 55.0,
            AgeGroup::SixtiesPlus => 70.0,
        }
    }
}

impl IncomeLevel {
    /// Position on the ordinal income scale (0 = lowest)
    pub fn rank(&self) -> usize {
        Self::ALL.iter().position(|level| level == self).unwrap_or(0)
    }
}

/// Applicant track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Track {
    Personal,
    Business,
}

/// Track tag declared on a catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    Personal,
    Business,
    Both,
    #[default]
    Unknown,
}

impl ServiceType {
    pub fn parse(value: &str) -> Self {
        match value {
            "personal" => ServiceType::Personal,
            "business" => ServiceType::Business,
            "both" => ServiceType::Both,
            _ => ServiceType::Unknown,
        }
    }
}

/// How far a catalog entry's geographic reach is known
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionScope {
    National,
    Regional,
    #[default]
    Unknown,
}

impl RegionScope {
    pub fn parse(value: &str) -> Self {
        match value {
            "national" => RegionScope::National,
            "regional" => RegionScope::Regional,
            _ => RegionScope::Unknown,
        }
    }
}

/// Scoring dimension identifiers shared by both tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DimensionKey {
    Region,
    Age,
    HouseholdType,
    IncomeLevel,
    EmploymentStatus,
    BusinessType,
    Employee,
    Revenue,
    BusinessAge,
    FounderAge,
}

impl DimensionKey {
    pub const PERSONAL: [DimensionKey; 5] = [
        DimensionKey::Region,
        DimensionKey::Age,
        DimensionKey::HouseholdType,
        DimensionKey::IncomeLevel,
        DimensionKey::EmploymentStatus,
    ];

    pub const BUSINESS: [DimensionKey; 6] = [
        DimensionKey::Region,
        DimensionKey::BusinessType,
        DimensionKey::Employee,
        DimensionKey::Revenue,
        DimensionKey::BusinessAge,
        DimensionKey::FounderAge,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DimensionKey::Region => "region",
            DimensionKey::Age => "age",
            DimensionKey::HouseholdType => "householdType",
            DimensionKey::IncomeLevel => "incomeLevel",
            DimensionKey::EmploymentStatus => "employmentStatus",
            DimensionKey::BusinessType => "businessType",
            DimensionKey::Employee => "employee",
            DimensionKey::Revenue => "revenue",
            DimensionKey::BusinessAge => "businessAge",
            DimensionKey::FounderAge => "founderAge",
        }
    }
}

/// Numeric target range; both bounds absent means no restriction
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RangeConstraint {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

impl RangeConstraint {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

/// Reliability of each extracted constraint, in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractionConfidence {
    pub regions: f64,
    pub business_types: f64,
    pub employee: f64,
    pub revenue: f64,
    pub business_age: f64,
    pub founder_age: f64,
    pub age: f64,
    pub household_types: f64,
    pub income_levels: f64,
    pub employment_status: f64,
    pub benefit_categories: f64,
}

impl ExtractionConfidence {
    pub fn for_dimension(&self, key: DimensionKey) -> f64 {
        match key {
            DimensionKey::Region => self.regions,
            DimensionKey::Age => self.age,
            DimensionKey::HouseholdType => self.household_types,
            DimensionKey::IncomeLevel => self.income_levels,
            DimensionKey::EmploymentStatus => self.employment_status,
            DimensionKey::BusinessType => self.business_types,
            DimensionKey::Employee => self.employee,
            DimensionKey::Revenue => self.revenue,
            DimensionKey::BusinessAge => self.business_age,
            DimensionKey::FounderAge => self.founder_age,
        }
    }
}

/// A support program from the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: String,
    pub title: String,
    pub organization: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub service_type: ServiceType,
    #[serde(default)]
    pub region_scope: RegionScope,
    #[serde(default)]
    pub target_regions: Option<Vec<String>>,
    #[serde(default)]
    pub target_sub_regions: Option<Vec<String>>,
    #[serde(default)]
    pub target_business_types: Option<Vec<String>>,
    #[serde(default)]
    pub target_household_types: Option<Vec<String>>,
    #[serde(default)]
    pub target_income_levels: Option<Vec<String>>,
    #[serde(default)]
    pub target_employment_status: Option<Vec<String>>,
    #[serde(default)]
    pub benefit_categories: Option<Vec<String>>,
    #[serde(default)]
    pub target_employee: RangeConstraint,
    #[serde(default)]
    pub target_revenue: RangeConstraint,
    #[serde(default)]
    pub target_business_age: RangeConstraint,
    #[serde(default)]
    pub target_founder_age: RangeConstraint,
    #[serde(default)]
    pub target_age: RangeConstraint,
    #[serde(default)]
    pub extraction_confidence: ExtractionConfidence,
}

fn default_true() -> bool { true }

impl Candidate {
    /// Minimal catalog entry with no constraints, tagged `unknown`
    pub fn new(id: impl Into<String>, title: impl Into<String>, organization: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            organization: organization.into(),
            category: String::new(),
            start_date: None,
            end_date: None,
            is_active: true,
            service_type: ServiceType::Unknown,
            region_scope: RegionScope::Unknown,
            target_regions: None,
            target_sub_regions: None,
            target_business_types: None,
            target_household_types: None,
            target_income_levels: None,
            target_employment_status: None,
            benefit_categories: None,
            target_employee: RangeConstraint::default(),
            target_revenue: RangeConstraint::default(),
            target_business_age: RangeConstraint::default(),
            target_founder_age: RangeConstraint::default(),
            target_age: RangeConstraint::default(),
            extraction_confidence: ExtractionConfidence::default(),
        }
    }

    /// Whether the entry is open for applications on `today`
    pub fn is_open_on(&self, today: NaiveDate) -> bool {
        self.is_active && self.end_date.map_or(true, |end| end >= today)
    }
}

/// Age of a business in months, or not yet founded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum BusinessAge {
    PreStartup,
    Months(u32),
}

impl From<i32> for BusinessAge {
    fn from(value: i32) -> Self {
        if value < 0 {
            BusinessAge::PreStartup
        } else {
            BusinessAge::Months(value as u32)
        }
    }
}

impl From<BusinessAge> for i32 {
    fn from(value: BusinessAge) -> Self {
        match value {
            BusinessAge::PreStartup => -1,
            BusinessAge::Months(months) => months as i32,
        }
    }
}

/// Declared profile of an individual applicant
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalProfile {
    pub age_group: AgeGroup,
    pub gender: Gender,
    pub region: Region,
    #[serde(default)]
    pub sub_region: Option<String>,
    pub household_type: HouseholdType,
    pub income_level: IncomeLevel,
    pub employment_status: EmploymentStatus,
    #[serde(default)]
    pub interest_categories: Vec<InterestCategory>,
}

/// Declared profile of a small-business applicant
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessProfile {
    pub business_type: BusinessType,
    pub region: Region,
    #[serde(default)]
    pub sub_region: Option<String>,
    pub employee_count: u32,
    pub annual_revenue: u64,
    pub business_age: BusinessAge,
    pub founder_age: u32,
}

/// Applicant profile, tagged by track
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "userType", rename_all = "lowercase")]
pub enum UserProfile {
    Personal(PersonalProfile),
    Business(BusinessProfile),
}

impl UserProfile {
    pub fn track(&self) -> Track {
        match self {
            UserProfile::Personal(_) => Track::Personal,
            UserProfile::Business(_) => Track::Business,
        }
    }

    pub fn sub_region(&self) -> Option<&str> {
        match self {
            UserProfile::Personal(p) => p.sub_region.as_deref(),
            UserProfile::Business(b) => b.sub_region.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_round_trip_through_serde() {
        let region: Region = serde_json::from_str("\"서울\"").unwrap();
        assert_eq!(region, Region::Seoul);
        assert_eq!(serde_json::to_string(&IncomeLevel::NearPoverty).unwrap(), "\"차상위\"");
        assert!(serde_json::from_str::<Region>("\"도쿄\"").is_err());
    }

    #[test]
    fn test_income_rank_is_ordinal() {
        assert_eq!(IncomeLevel::BasicLivelihood.rank(), 0);
        assert_eq!(IncomeLevel::MedianOver100.rank(), 4);
        assert_eq!(IncomeLevel::parse("중위50이하"), Some(IncomeLevel::MedianUnder50));
        assert_eq!(IncomeLevel::parse("모름"), None);
    }

    #[test]
    fn test_business_age_sentinel() {
        let age: BusinessAge = serde_json::from_str("-1").unwrap();
        assert_eq!(age, BusinessAge::PreStartup);
        let age: BusinessAge = serde_json::from_str("24").unwrap();
        assert_eq!(age, BusinessAge::Months(24));
        assert_eq!(serde_json::to_string(&BusinessAge::PreStartup).unwrap(), "-1");
    }

    #[test]
    fn test_profile_is_tagged_by_user_type() {
        let json = r#"{
            "userType": "business",
            "businessType": "제조업",
            "region": "부산",
            "employeeCount": 7,
            "annualRevenue": 300000000,
            "businessAge": 24,
            "founderAge": 35
        }"#;
        let profile: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.track(), Track::Business);
        assert!(profile.sub_region().is_none());
    }

    #[test]
    fn test_candidate_defaults() {
        let json = r#"{"id": "s1", "title": "청년 월세 지원", "organization": "국토교통부"}"#;
        let candidate: Candidate = serde_json::from_str(json).unwrap();
        assert_eq!(candidate.service_type, ServiceType::Unknown);
        assert_eq!(candidate.region_scope, RegionScope::Unknown);
        assert!(candidate.target_regions.is_none());
        assert!(candidate.target_employee.is_unbounded());
        assert_eq!(candidate.extraction_confidence.regions, 0.0);
    }

    #[test]
    fn test_candidate_open_window() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let mut candidate = Candidate::new("s1", "t", "org");
        assert!(candidate.is_open_on(today));
        candidate.end_date = NaiveDate::from_ymd_opt(2026, 2, 28);
        assert!(!candidate.is_open_on(today));
    }
}
