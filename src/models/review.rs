use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Review {
    pub id: Uuid,
    pub user_id: Uuid,
    pub facility_id: Uuid,
    pub booking_id: Option<Uuid>,
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateReviewData {
    pub user_id: Uuid,
    pub facility_id: Uuid,
    pub booking_id: Option<Uuid>,
    pub rating: i16,
    pub comment: Option<String>,
}

/// Rating aggregate feeding the facility quality score
#[derive(Debug, Clone, Copy, Serialize, FromRow)]
pub struct RatingSummary {
    pub rating_avg: Option<f64>,
    pub rating_count: i64,
}

impl Review {
    /// Creates or replaces the user's review of a facility (one review
    /// per user and facility)
    pub async fn upsert(pool: &PgPool, data: CreateReviewData) -> Result<Self, sqlx::Error> {
        let review = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO reviews (user_id, facility_id, booking_id, rating, comment)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, facility_id)
            DO UPDATE SET rating = $4, comment = $5, booking_id = $3, created_at = NOW()
            RETURNING *
            "#,
        )
        .bind(data.user_id)
        .bind(data.facility_id)
        .bind(data.booking_id)
        .bind(data.rating)
        .bind(&data.comment)
        .fetch_one(pool)
        .await?;

        Ok(review)
    }

    pub async fn list_by_facility(
        pool: &PgPool,
        facility_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let reviews = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM reviews
            WHERE facility_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(facility_id)
        .fetch_all(pool)
        .await?;

        Ok(reviews)
    }

    pub async fn summary(pool: &PgPool, facility_id: Uuid) -> Result<RatingSummary, sqlx::Error> {
        let summary = sqlx::query_as::<_, RatingSummary>(
            r#"
            SELECT AVG(rating)::FLOAT8 AS rating_avg, COUNT(*) AS rating_count
            FROM reviews
            WHERE facility_id = $1
            "#,
        )
        .bind(facility_id)
        .fetch_one(pool)
        .await?;

        Ok(summary)
    }
}
