use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::models::booking::{Booking, CreateBookingData};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "offer_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OfferStatus {
    Pending,
    Accepted,
    Rejected,
    Countered,
    Expired,
}

/// A price negotiation between a player and a facility for one slot.
///
/// Transitions: pending -> accepted/rejected/countered (owner side),
/// countered -> accepted/rejected (player side), pending/countered ->
/// expired (sweep). Every transition is a conditional UPDATE on the
/// current status, so a lost race comes back as no row instead of
/// double-applying.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Offer {
    pub id: Uuid,
    pub user_id: Uuid,
    pub court_id: Uuid,
    pub facility_id: Uuid,
    pub slot_date: NaiveDate,
    pub start_hour: i16,
    pub end_hour: i16,
    pub offered_total: Decimal,
    pub counter_total: Option<Decimal>,
    pub status: OfferStatus,
    pub booking_id: Option<Uuid>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateOfferData {
    pub user_id: Uuid,
    pub court_id: Uuid,
    pub facility_id: Uuid,
    pub slot_date: NaiveDate,
    pub start_hour: i16,
    pub end_hour: i16,
    pub offered_total: Decimal,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug)]
pub enum OfferAcceptance {
    Accepted { offer: Offer, booking: Booking },
    /// The offer was no longer in the expected state (or had expired)
    WrongState,
    /// The negotiated slot has been taken in the meantime
    SlotTaken,
}

impl Offer {
    pub async fn create(pool: &PgPool, data: CreateOfferData) -> Result<Self, sqlx::Error> {
        let offer = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO offers
                (user_id, court_id, facility_id, slot_date, start_hour, end_hour, offered_total, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(data.user_id)
        .bind(data.court_id)
        .bind(data.facility_id)
        .bind(data.slot_date)
        .bind(data.start_hour)
        .bind(data.end_hour)
        .bind(data.offered_total)
        .bind(data.expires_at)
        .fetch_one(pool)
        .await?;

        Ok(offer)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let offer = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM offers WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(offer)
    }

    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let offers = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM offers
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(offers)
    }

    pub async fn list_by_facility(
        pool: &PgPool,
        facility_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let offers = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM offers
            WHERE facility_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(facility_id)
        .fetch_all(pool)
        .await?;

        Ok(offers)
    }

    /// Accepts an offer that is still in `from` state and books the slot
    /// in the same transaction. The booking is priced at the counter total
    /// when accepting a counter, otherwise at the original offer.
    pub async fn accept(
        pool: &PgPool,
        id: Uuid,
        from: OfferStatus,
    ) -> Result<OfferAcceptance, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let offer = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM offers
            WHERE id = $1 AND status = $2 AND expires_at > NOW()
            FOR UPDATE
            "#,
        )
        .bind(id)
        .bind(from)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(offer) = offer else {
            tx.rollback().await?;
            return Ok(OfferAcceptance::WrongState);
        };

        let total_price = match from {
            OfferStatus::Countered => offer.counter_total.unwrap_or(offer.offered_total),
            _ => offer.offered_total,
        };

        let booking = Booking::create_in_tx(
            &mut tx,
            CreateBookingData {
                user_id: offer.user_id,
                court_id: offer.court_id,
                facility_id: offer.facility_id,
                booking_date: offer.slot_date,
                start_hour: offer.start_hour,
                end_hour: offer.end_hour,
                total_price,
            },
        )
        .await?;

        let Some(booking) = booking else {
            tx.rollback().await?;
            return Ok(OfferAcceptance::SlotTaken);
        };

        let offer = sqlx::query_as::<_, Self>(
            r#"
            UPDATE offers
            SET status = 'accepted', booking_id = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(booking.id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(OfferAcceptance::Accepted { offer, booking })
    }

    /// Rejects an offer that is still open. Returns `None` on a lost race.
    pub async fn reject(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let offer = sqlx::query_as::<_, Self>(
            r#"
            UPDATE offers
            SET status = 'rejected', updated_at = NOW()
            WHERE id = $1 AND status IN ('pending', 'countered')
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(offer)
    }

    /// Counters a pending offer with the owner's price.
    pub async fn counter(
        pool: &PgPool,
        id: Uuid,
        counter_total: Decimal,
    ) -> Result<Option<Self>, sqlx::Error> {
        let offer = sqlx::query_as::<_, Self>(
            r#"
            UPDATE offers
            SET status = 'countered', counter_total = $2, updated_at = NOW()
            WHERE id = $1 AND status = 'pending' AND expires_at > NOW()
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(counter_total)
        .fetch_optional(pool)
        .await?;

        Ok(offer)
    }

    /// Expires open offers whose deadline has passed (sweep job)
    pub async fn expire_stale(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE offers
            SET status = 'expired', updated_at = NOW()
            WHERE status IN ('pending', 'countered') AND expires_at < NOW()
            "#,
        )
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }
}
