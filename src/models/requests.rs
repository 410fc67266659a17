use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::domain::{BusinessAge, Candidate, UserProfile};

/// Accepted employee-count bucket values
pub const EMPLOYEE_BUCKETS: [u32; 5] = [2, 7, 30, 75, 150];
/// Accepted annual-revenue bucket values (KRW)
pub const REVENUE_BUCKETS: [u64; 5] = [50_000_000, 300_000_000, 750_000_000, 3_000_000_000, 10_000_000_000];
/// Accepted business-age bucket values in months, besides pre-startup
pub const BUSINESS_AGE_BUCKETS: [u32; 5] = [6, 24, 48, 84, 180];
/// Accepted founder-age bucket values
pub const FOUNDER_AGE_BUCKETS: [u32; 5] = [25, 35, 45, 55, 65];

/// Request to diagnose a profile against the stored catalog
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DiagnoseRequest {
    #[validate(custom(function = "validate_profile"))]
    pub profile: UserProfile,
    #[validate(email)]
    #[serde(default)]
    pub email: Option<String>,
}

/// Request to match a profile against caller-supplied candidates
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MatchRequest {
    #[validate(custom(function = "validate_profile"))]
    pub profile: UserProfile,
    /// At most 10,000 inline candidates
    #[validate(length(max = 10000))]
    pub candidates: Vec<Candidate>,
}

/// Check that numeric business buckets take one of their enumerated values
///
/// Enumerated labels are already enforced by deserialization.
pub fn validate_profile(profile: &UserProfile) -> Result<(), ValidationError> {
    let UserProfile::Business(business) = profile else {
        return Ok(());
    };

    if !EMPLOYEE_BUCKETS.contains(&business.employee_count) {
        return Err(bucket_error("employee_count", "employeeCount is not a known bucket"));
    }
    if !REVENUE_BUCKETS.contains(&business.annual_revenue) {
        return Err(bucket_error("annual_revenue", "annualRevenue is not a known bucket"));
    }
    if let BusinessAge::Months(months) = business.business_age {
        if !BUSINESS_AGE_BUCKETS.contains(&months) {
            return Err(bucket_error("business_age", "businessAge is not a known bucket"));
        }
    }
    if !FOUNDER_AGE_BUCKETS.contains(&business.founder_age) {
        return Err(bucket_error("founder_age", "founderAge is not a known bucket"));
    }

    Ok(())
}

fn bucket_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}
