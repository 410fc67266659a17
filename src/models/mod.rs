// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    AgeGroup, BusinessAge, BusinessProfile, BusinessType, Candidate, DimensionKey, EmploymentStatus,
    ExtractionConfidence, Gender, HouseholdType, IncomeLevel, InterestCategory, PersonalProfile,
    RangeConstraint, Region, RegionScope, ServiceType, Track, UserProfile,
};
pub use requests::{DiagnoseRequest, MatchRequest};
pub use responses::{DiagnoseResponse, ErrorResponse, HealthResponse, StoredDiagnosis};
