use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "approval_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Facility {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub address: String,
    pub city: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub sports: Vec<String>,
    pub amenities: Vec<String>,
    pub photos: Vec<String>,
    pub approval_status: ApprovalStatus,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateFacilityData {
    pub owner_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub address: String,
    pub city: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub sports: Vec<String>,
    pub amenities: Vec<String>,
    pub photos: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateFacilityData {
    pub name: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub sports: Option<Vec<String>>,
    pub amenities: Option<Vec<String>>,
    pub photos: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct FacilityFilter {
    pub sport: Option<String>,
    pub city: Option<String>,
    pub q: Option<String>,
}

/// Approved facility joined with the aggregates the listing and
/// recommendation endpoints need in a single round-trip.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FacilityCard {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub facility: Facility,
    pub min_price: Option<Decimal>,
    pub rating_avg: Option<f64>,
    pub rating_count: i64,
}

impl Facility {
    /// Registers a new facility; starts out pending admin approval
    pub async fn create(pool: &PgPool, data: CreateFacilityData) -> Result<Self, sqlx::Error> {
        let facility = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO facilities
                (owner_id, name, description, address, city, latitude, longitude, sports, amenities, photos)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(data.owner_id)
        .bind(&data.name)
        .bind(&data.description)
        .bind(&data.address)
        .bind(&data.city)
        .bind(data.latitude)
        .bind(data.longitude)
        .bind(&data.sports)
        .bind(&data.amenities)
        .bind(&data.photos)
        .fetch_one(pool)
        .await?;

        Ok(facility)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let facility = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM facilities WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(facility)
    }

    /// Public browse listing: approved facilities with price/rating
    /// aggregates, optionally filtered by sport, city, and name search
    pub async fn list_approved(
        pool: &PgPool,
        filter: &FacilityFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<FacilityCard>, sqlx::Error> {
        let cards = sqlx::query_as::<_, FacilityCard>(
            r#"
            SELECT f.*,
                (SELECT MIN(c.price_per_hour) FROM courts c
                  WHERE c.facility_id = f.id AND c.is_active) AS min_price,
                (SELECT AVG(r.rating)::FLOAT8 FROM reviews r
                  WHERE r.facility_id = f.id) AS rating_avg,
                (SELECT COUNT(*) FROM reviews r
                  WHERE r.facility_id = f.id) AS rating_count
            FROM facilities f
            WHERE f.approval_status = 'approved'
              AND ($1::TEXT IS NULL OR $1 = ANY(f.sports))
              AND ($2::TEXT IS NULL OR f.city ILIKE $2)
              AND ($3::TEXT IS NULL OR f.name ILIKE '%' || $3 || '%')
            ORDER BY f.created_at DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(&filter.sport)
        .bind(&filter.city)
        .bind(&filter.q)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(cards)
    }

    pub async fn list_by_owner(pool: &PgPool, owner_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let facilities = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM facilities
            WHERE owner_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(pool)
        .await?;

        Ok(facilities)
    }

    /// Facilities awaiting admin review, oldest first
    pub async fn list_pending(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let facilities = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM facilities
            WHERE approval_status = 'pending'
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(facilities)
    }

    /// Updates provided fields; editing a rejected facility resubmits it
    /// to the review queue
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateFacilityData,
    ) -> Result<Self, sqlx::Error> {
        let facility = sqlx::query_as::<_, Self>(
            r#"
            UPDATE facilities
            SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                address = COALESCE($4, address),
                city = COALESCE($5, city),
                latitude = COALESCE($6, latitude),
                longitude = COALESCE($7, longitude),
                sports = COALESCE($8, sports),
                amenities = COALESCE($9, amenities),
                photos = COALESCE($10, photos),
                approval_status = CASE
                    WHEN approval_status = 'rejected' THEN 'pending'::approval_status
                    ELSE approval_status
                END,
                rejection_reason = CASE
                    WHEN approval_status = 'rejected' THEN NULL
                    ELSE rejection_reason
                END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(data.name)
        .bind(data.description)
        .bind(data.address)
        .bind(data.city)
        .bind(data.latitude)
        .bind(data.longitude)
        .bind(data.sports)
        .bind(data.amenities)
        .bind(data.photos)
        .fetch_optional(pool)
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;

        Ok(facility)
    }

    /// Admin decision; a rejection records the reason shown to the owner
    pub async fn set_approval(
        pool: &PgPool,
        id: Uuid,
        status: ApprovalStatus,
        rejection_reason: Option<String>,
    ) -> Result<Self, sqlx::Error> {
        let facility = sqlx::query_as::<_, Self>(
            r#"
            UPDATE facilities
            SET approval_status = $2, rejection_reason = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(rejection_reason)
        .fetch_optional(pool)
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;

        Ok(facility)
    }

    pub async fn count_by_status(
        pool: &PgPool,
        status: ApprovalStatus,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM facilities WHERE approval_status = $1")
                .bind(status)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }
}
