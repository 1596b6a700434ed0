use chrono::Utc;
use sqlx::PgPool;

use crate::models::booking::Booking;
use crate::models::offer::Offer;

#[derive(Debug)]
pub struct SweepStats {
    pub bookings_completed: u64,
    pub offers_expired: u64,
}

/// Background sweep over time-driven state.
///
/// 1. Confirmed bookings whose date has passed become completed.
/// 2. Open offers past their deadline become expired.
///
/// Both updates are status-guarded, so a sweep racing a user action
/// (a late cancellation, a last-second accept) never clobbers it.
pub async fn run_sweeps(pool: &PgPool) -> Result<SweepStats, sqlx::Error> {
    let today = Utc::now().date_naive();

    let bookings_completed = Booking::complete_past(pool, today).await?;
    let offers_expired = Offer::expire_stale(pool).await?;

    let stats = SweepStats {
        bookings_completed,
        offers_expired,
    };

    tracing::info!(?stats, "Sweep job completed");

    Ok(stats)
}
