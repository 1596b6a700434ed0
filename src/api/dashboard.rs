use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use tower_sessions::Session;

use crate::api::middleware::auth::current_user_with_role;
use crate::api::middleware::session::AppState;
use crate::error::AppError;
use crate::models::booking::{Booking, OwnerBookingTotals};
use crate::models::court::Court;
use crate::models::facility::Facility;
use crate::models::user::UserRole;
use crate::services::stats::{self, QuartileSummary};

#[derive(Debug, Serialize)]
pub struct OwnerDashboard {
    pub facility_count: usize,
    pub bookings: OwnerBookingTotals,
    /// Spread of hourly prices across the owner's active courts
    pub court_price_quartiles: QuartileSummary,
}

/// One-call summary backing the owner's landing page
async fn owner_dashboard(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<OwnerDashboard>, AppError> {
    let owner = current_user_with_role(&state.pool, &session, UserRole::FacilityOwner).await?;

    let facilities = Facility::list_by_owner(&state.pool, owner.id).await?;
    let bookings = Booking::owner_totals(&state.pool, owner.id, Utc::now().date_naive()).await?;

    let prices: Vec<f64> = Court::prices_by_owner(&state.pool, owner.id)
        .await?
        .iter()
        .filter_map(|p| p.to_f64())
        .collect();

    Ok(Json(OwnerDashboard {
        facility_count: facilities.len(),
        bookings,
        court_price_quartiles: stats::quartiles(&prices),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/owner/dashboard", get(owner_dashboard))
}
