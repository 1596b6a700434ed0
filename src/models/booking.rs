use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "booking_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub court_id: Uuid,
    pub facility_id: Uuid,
    pub booking_date: NaiveDate,
    pub start_hour: i16,
    pub end_hour: i16,
    pub total_price: Decimal,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateBookingData {
    pub user_id: Uuid,
    pub court_id: Uuid,
    pub facility_id: Uuid,
    pub booking_date: NaiveDate,
    pub start_hour: i16,
    pub end_hour: i16,
    pub total_price: Decimal,
}

impl Booking {
    /// Books a slot. Returns `None` when the slot is already taken by a
    /// confirmed booking or an owner block.
    ///
    /// The court row is locked for the duration of the transaction, so two
    /// racing requests for the same court serialize and the loser sees the
    /// winner's booking in the overlap check.
    pub async fn create_checked(
        pool: &PgPool,
        data: CreateBookingData,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let booking = Self::create_in_tx(&mut tx, data).await?;

        match booking {
            Some(booking) => {
                tx.commit().await?;
                Ok(Some(booking))
            }
            None => {
                tx.rollback().await?;
                Ok(None)
            }
        }
    }

    /// Same as [`create_checked`] but runs inside an existing transaction
    /// (offer acceptance books the negotiated slot this way).
    pub async fn create_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        data: CreateBookingData,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Serialize per-court booking attempts
        sqlx::query("SELECT id FROM courts WHERE id = $1 FOR UPDATE")
            .bind(data.court_id)
            .execute(&mut **tx)
            .await?;

        let (conflicts,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM bookings
            WHERE court_id = $1
              AND booking_date = $2
              AND status = 'confirmed'
              AND start_hour < $4
              AND end_hour > $3
            "#,
        )
        .bind(data.court_id)
        .bind(data.booking_date)
        .bind(data.start_hour)
        .bind(data.end_hour)
        .fetch_one(&mut **tx)
        .await?;

        let (blocked,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM blocked_slots
            WHERE court_id = $1
              AND slot_date = $2
              AND start_hour < $4
              AND end_hour > $3
            "#,
        )
        .bind(data.court_id)
        .bind(data.booking_date)
        .bind(data.start_hour)
        .bind(data.end_hour)
        .fetch_one(&mut **tx)
        .await?;

        if conflicts > 0 || blocked > 0 {
            return Ok(None);
        }

        let booking = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO bookings
                (user_id, court_id, facility_id, booking_date, start_hour, end_hour, total_price)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(data.user_id)
        .bind(data.court_id)
        .bind(data.facility_id)
        .bind(data.booking_date)
        .bind(data.start_hour)
        .bind(data.end_hour)
        .bind(data.total_price)
        .fetch_one(&mut **tx)
        .await?;

        Ok(Some(booking))
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let booking = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM bookings WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(booking)
    }

    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let bookings = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM bookings
            WHERE user_id = $1
            ORDER BY booking_date DESC, start_hour DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(bookings)
    }

    pub async fn list_by_facility(
        pool: &PgPool,
        facility_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let bookings = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM bookings
            WHERE facility_id = $1
            ORDER BY booking_date DESC, start_hour DESC
            "#,
        )
        .bind(facility_id)
        .fetch_all(pool)
        .await?;

        Ok(bookings)
    }

    /// Cancels a confirmed booking. Returns `None` when the booking was
    /// already cancelled or completed (guarded transition).
    pub async fn cancel(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let booking = sqlx::query_as::<_, Self>(
            r#"
            UPDATE bookings
            SET status = 'cancelled', updated_at = NOW()
            WHERE id = $1 AND status = 'confirmed'
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(booking)
    }

    /// Confirmed bookings occupying a court on a date, as hour ranges
    pub async fn booked_ranges(
        pool: &PgPool,
        court_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<(i16, i16)>, sqlx::Error> {
        let rows: Vec<(i16, i16)> = sqlx::query_as(
            r#"
            SELECT start_hour, end_hour FROM bookings
            WHERE court_id = $1 AND booking_date = $2 AND status = 'confirmed'
            ORDER BY start_hour ASC
            "#,
        )
        .bind(court_id)
        .bind(date)
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    /// Marks confirmed bookings whose date has passed as completed;
    /// returns how many rows were touched (sweep job)
    pub async fn complete_past(pool: &PgPool, today: NaiveDate) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE bookings
            SET status = 'completed', updated_at = NOW()
            WHERE status = 'confirmed' AND booking_date < $1
            "#,
        )
        .bind(today)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Whether the user has a completed booking at the facility (review gate)
    pub async fn has_completed_at_facility(
        pool: &PgPool,
        user_id: Uuid,
        facility_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM bookings
            WHERE user_id = $1 AND facility_id = $2 AND status = 'completed'
            "#,
        )
        .bind(user_id)
        .bind(facility_id)
        .fetch_one(pool)
        .await?;

        Ok(count > 0)
    }

    pub async fn count_all(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM bookings")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Owner dashboard aggregates over non-cancelled bookings
    pub async fn owner_totals(
        pool: &PgPool,
        owner_id: Uuid,
        today: NaiveDate,
    ) -> Result<OwnerBookingTotals, sqlx::Error> {
        let totals = sqlx::query_as::<_, OwnerBookingTotals>(
            r#"
            SELECT
                COUNT(*) AS total_bookings,
                COUNT(*) FILTER (WHERE b.status = 'confirmed' AND b.booking_date >= $2)
                    AS upcoming_bookings,
                COALESCE(SUM(b.total_price) FILTER (WHERE b.status <> 'cancelled'), 0)
                    AS earnings
            FROM bookings b
            JOIN facilities f ON f.id = b.facility_id
            WHERE f.owner_id = $1
            "#,
        )
        .bind(owner_id)
        .bind(today)
        .fetch_one(pool)
        .await?;

        Ok(totals)
    }

    /// Booking totals across the platform, for the admin quartile summary
    pub async fn all_values(pool: &PgPool) -> Result<Vec<Decimal>, sqlx::Error> {
        let rows: Vec<(Decimal,)> = sqlx::query_as(
            r#"
            SELECT total_price FROM bookings WHERE status <> 'cancelled'
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(|(v,)| v).collect())
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OwnerBookingTotals {
    pub total_bookings: i64,
    pub upcoming_bookings: i64,
    pub earnings: Decimal,
}
