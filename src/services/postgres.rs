use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use crate::core::MatchResult;
use crate::models::{
    Candidate, ExtractionConfidence, RangeConstraint, RegionScope, ServiceType, StoredDiagnosis,
    Track, UserProfile,
};

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// PostgreSQL client for the support catalog and stored diagnoses
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client and run pending migrations
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, PostgresError> {
        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    /// Load every active catalog entry whose application window is still open
    pub async fn get_active_candidates(&self) -> Result<Vec<Candidate>, PostgresError> {
        let query = r#"
            SELECT id, title, organization, category, start_date, end_date, is_active,
                   service_type, region_scope,
                   target_regions, target_sub_regions, target_business_types,
                   target_household_types, target_income_levels, target_employment_status,
                   benefit_categories,
                   target_employee_min, target_employee_max,
                   target_revenue_min, target_revenue_max,
                   target_business_age_min, target_business_age_max,
                   target_founder_age_min, target_founder_age_max,
                   target_age_min, target_age_max,
                   extraction_confidence
            FROM supports
            WHERE is_active
            ORDER BY id
        "#;

        let today = chrono::Local::now().date_naive();
        let rows = sqlx::query(query).fetch_all(&self.pool).await?;
        let mut candidates = rows
            .iter()
            .map(candidate_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        let loaded = candidates.len();
        candidates.retain(|candidate| candidate.is_open_on(today));

        tracing::debug!(
            "Loaded {} active supports ({} past their end date)",
            candidates.len(),
            loaded - candidates.len()
        );
        Ok(candidates)
    }

    /// Persist a diagnosis run and return its id
    pub async fn save_diagnosis(
        &self,
        profile: &UserProfile,
        email: Option<&str>,
        result: &MatchResult,
    ) -> Result<StoredDiagnosis, PostgresError> {
        let id = Uuid::new_v4();
        let scores = result.flatten();
        let matched_support_ids: Vec<String> =
            scores.iter().map(|s| s.support_id.clone()).collect();
        let matched_count = i32::try_from(scores.len())
            .map_err(|_| PostgresError::InvalidInput("too many matched supports".to_string()))?;
        let profile_json = serde_json::to_value(profile)?;
        let user_type = track_label(profile.track());

        let query = r#"
            INSERT INTO diagnoses
                (id, user_type, email, profile, matched_support_ids, scores, matched_count, strategy_version)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING created_at
        "#;

        let row = sqlx::query(query)
            .bind(id)
            .bind(user_type)
            .bind(email)
            .bind(Json(&profile_json))
            .bind(&matched_support_ids)
            .bind(Json(&scores))
            .bind(matched_count)
            .bind(&result.strategy_version)
            .fetch_one(&self.pool)
            .await?;

        tracing::info!(
            "Saved diagnosis {} ({} matched, {})",
            id,
            matched_count,
            user_type
        );

        Ok(StoredDiagnosis {
            id: id.to_string(),
            user_type: profile.track(),
            profile: profile_json,
            matched_support_ids,
            scores,
            matched_count,
            created_at: row.try_get("created_at")?,
        })
    }

    /// Fetch a stored diagnosis by id
    pub async fn get_diagnosis(&self, id: &str) -> Result<StoredDiagnosis, PostgresError> {
        let uuid = Uuid::parse_str(id)
            .map_err(|_| PostgresError::InvalidInput(format!("invalid diagnosis id: {}", id)))?;

        let query = r#"
            SELECT id, user_type, profile, matched_support_ids, scores, matched_count, created_at
            FROM diagnoses
            WHERE id = $1
        "#;

        let row = sqlx::query(query)
            .bind(uuid)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| PostgresError::NotFound(format!("diagnosis {}", id)))?;

        let user_type: String = row.try_get("user_type")?;
        let user_type = parse_track(&user_type)
            .ok_or_else(|| PostgresError::InvalidInput(format!("unknown user type: {}", user_type)))?;
        let Json(profile) = row.try_get("profile")?;
        let Json(scores) = row.try_get("scores")?;
        let stored_id: Uuid = row.try_get("id")?;

        Ok(StoredDiagnosis {
            id: stored_id.to_string(),
            user_type,
            profile,
            matched_support_ids: row.try_get("matched_support_ids")?,
            scores,
            matched_count: row.try_get("matched_count")?,
            created_at: row.try_get("created_at")?,
        })
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, PostgresError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

fn candidate_from_row(row: &PgRow) -> Result<Candidate, sqlx::Error> {
    let range = |prefix: &str| -> Result<RangeConstraint, sqlx::Error> {
        Ok(RangeConstraint::new(
            row.try_get(format!("{}_min", prefix).as_str())?,
            row.try_get(format!("{}_max", prefix).as_str())?,
        ))
    };
    let service_type: String = row.try_get("service_type")?;
    let region_scope: String = row.try_get("region_scope")?;
    let Json(extraction_confidence): Json<ExtractionConfidence> =
        row.try_get("extraction_confidence")?;

    Ok(Candidate {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        organization: row.try_get("organization")?,
        category: row.try_get("category")?,
        start_date: row.try_get("start_date")?,
        end_date: row.try_get("end_date")?,
        is_active: row.try_get("is_active")?,
        service_type: ServiceType::parse(&service_type),
        region_scope: RegionScope::parse(&region_scope),
        target_regions: row.try_get("target_regions")?,
        target_sub_regions: row.try_get("target_sub_regions")?,
        target_business_types: row.try_get("target_business_types")?,
        target_household_types: row.try_get("target_household_types")?,
        target_income_levels: row.try_get("target_income_levels")?,
        target_employment_status: row.try_get("target_employment_status")?,
        benefit_categories: row.try_get("benefit_categories")?,
        target_employee: range("target_employee")?,
        target_revenue: range("target_revenue")?,
        target_business_age: range("target_business_age")?,
        target_founder_age: range("target_founder_age")?,
        target_age: range("target_age")?,
        extraction_confidence,
    })
}

fn track_label(track: Track) -> &'static str {
    match track {
        Track::Personal => "personal",
        Track::Business => "business",
    }
}

fn parse_track(value: &str) -> Option<Track> {
    match value {
        "personal" => Some(Track::Personal),
        "business" => Some(Track::Business),
        _ => None,
    }
}
