use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Court {
    pub id: Uuid,
    pub facility_id: Uuid,
    pub name: String,
    pub sport: String,
    pub price_per_hour: Decimal,
    pub open_hour: i16,
    pub close_hour: i16,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateCourtData {
    pub facility_id: Uuid,
    pub name: String,
    pub sport: String,
    pub price_per_hour: Decimal,
    pub open_hour: i16,
    pub close_hour: i16,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateCourtData {
    pub name: Option<String>,
    pub sport: Option<String>,
    pub price_per_hour: Option<Decimal>,
    pub open_hour: Option<i16>,
    pub close_hour: Option<i16>,
}

impl Court {
    pub async fn create(pool: &PgPool, data: CreateCourtData) -> Result<Self, sqlx::Error> {
        let court = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO courts (facility_id, name, sport, price_per_hour, open_hour, close_hour)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(data.facility_id)
        .bind(&data.name)
        .bind(&data.sport)
        .bind(data.price_per_hour)
        .bind(data.open_hour)
        .bind(data.close_hour)
        .fetch_one(pool)
        .await?;

        Ok(court)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let court = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM courts WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(court)
    }

    /// Active courts of a facility
    pub async fn list_by_facility(
        pool: &PgPool,
        facility_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let courts = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM courts
            WHERE facility_id = $1 AND is_active = TRUE
            ORDER BY name ASC
            "#,
        )
        .bind(facility_id)
        .fetch_all(pool)
        .await?;

        Ok(courts)
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateCourtData,
    ) -> Result<Self, sqlx::Error> {
        let court = sqlx::query_as::<_, Self>(
            r#"
            UPDATE courts
            SET
                name = COALESCE($2, name),
                sport = COALESCE($3, sport),
                price_per_hour = COALESCE($4, price_per_hour),
                open_hour = COALESCE($5, open_hour),
                close_hour = COALESCE($6, close_hour),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(data.name)
        .bind(data.sport)
        .bind(data.price_per_hour)
        .bind(data.open_hour)
        .bind(data.close_hour)
        .fetch_optional(pool)
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;

        Ok(court)
    }

    /// Soft delete; historical bookings keep referencing the row
    pub async fn deactivate(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE courts
            SET is_active = FALSE, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Hourly prices across an owner's active courts (dashboard quartiles)
    pub async fn prices_by_owner(
        pool: &PgPool,
        owner_id: Uuid,
    ) -> Result<Vec<Decimal>, sqlx::Error> {
        let rows: Vec<(Decimal,)> = sqlx::query_as(
            r#"
            SELECT c.price_per_hour
            FROM courts c
            JOIN facilities f ON f.id = c.facility_id
            WHERE f.owner_id = $1 AND c.is_active = TRUE
            "#,
        )
        .bind(owner_id)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(|(p,)| p).collect())
    }

    /// Market price range across all approved facilities, for the
    /// price-advantage recommendation signal
    pub async fn market_price_range(
        pool: &PgPool,
    ) -> Result<Option<(Decimal, Decimal)>, sqlx::Error> {
        let row: Option<(Option<Decimal>, Option<Decimal>)> = sqlx::query_as(
            r#"
            SELECT MIN(c.price_per_hour), MAX(c.price_per_hour)
            FROM courts c
            JOIN facilities f ON f.id = c.facility_id
            WHERE c.is_active = TRUE AND f.approval_status = 'approved'
            "#,
        )
        .fetch_optional(pool)
        .await?;

        Ok(match row {
            Some((Some(min), Some(max))) => Some((min, max)),
            _ => None,
        })
    }
}
