use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// An owner-blocked maintenance window on a court. Blocked windows make
/// their hours unavailable exactly like confirmed bookings do.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BlockedSlot {
    pub id: Uuid,
    pub court_id: Uuid,
    pub slot_date: NaiveDate,
    pub start_hour: i16,
    pub end_hour: i16,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateBlockData {
    pub court_id: Uuid,
    pub slot_date: NaiveDate,
    pub start_hour: i16,
    pub end_hour: i16,
    pub reason: Option<String>,
}

impl BlockedSlot {
    pub async fn create(pool: &PgPool, data: CreateBlockData) -> Result<Self, sqlx::Error> {
        let block = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO blocked_slots (court_id, slot_date, start_hour, end_hour, reason)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(data.court_id)
        .bind(data.slot_date)
        .bind(data.start_hour)
        .bind(data.end_hour)
        .bind(&data.reason)
        .fetch_one(pool)
        .await?;

        Ok(block)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let block = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM blocked_slots WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(block)
    }

    pub async fn list_by_court_date(
        pool: &PgPool,
        court_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let blocks = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM blocked_slots
            WHERE court_id = $1 AND slot_date = $2
            ORDER BY start_hour ASC
            "#,
        )
        .bind(court_id)
        .bind(date)
        .fetch_all(pool)
        .await?;

        Ok(blocks)
    }

    /// Blocked hour ranges for the availability grid
    pub async fn blocked_ranges(
        pool: &PgPool,
        court_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<(i16, i16)>, sqlx::Error> {
        let rows: Vec<(i16, i16)> = sqlx::query_as(
            r#"
            SELECT start_hour, end_hour FROM blocked_slots
            WHERE court_id = $1 AND slot_date = $2
            ORDER BY start_hour ASC
            "#,
        )
        .bind(court_id)
        .bind(date)
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    /// Unblocking deletes the window
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM blocked_slots WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
