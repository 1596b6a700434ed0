use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use uuid::Uuid;

use crate::api::middleware::auth::{self, current_user, current_user_with_role};
use crate::api::middleware::session::AppState;
use crate::models::booking::{Booking, CreateBookingData};
use crate::models::court::Court;
use crate::models::facility::{ApprovalStatus, Facility};
use crate::models::payment::Payment;
use crate::models::user::UserRole;
use crate::services::availability;

#[derive(Debug)]
pub enum BookingError {
    DatabaseError(sqlx::Error),
    NotFound,
    ValidationError(String),
    Forbidden(&'static str),
    SlotTaken,
    AlreadyClosed,
    Auth(auth::AuthError),
}

impl From<auth::AuthError> for BookingError {
    fn from(err: auth::AuthError) -> Self {
        BookingError::Auth(err)
    }
}

impl IntoResponse for BookingError {
    fn into_response(self) -> Response {
        match self {
            BookingError::DatabaseError(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", e),
            )
                .into_response(),
            BookingError::NotFound => (StatusCode::NOT_FOUND, "Booking not found").into_response(),
            BookingError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            BookingError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg).into_response(),
            BookingError::SlotTaken => {
                (StatusCode::CONFLICT, "The requested slot is no longer available").into_response()
            }
            BookingError::AlreadyClosed => (
                StatusCode::CONFLICT,
                "Booking is already cancelled or completed",
            )
                .into_response(),
            BookingError::Auth(err) => err.into_response(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub court_id: Uuid,
    pub booking_date: NaiveDate,
    pub start_hour: i16,
    pub end_hour: i16,
}

/// Bookings are for today or a future date
fn validate_booking_date(date: NaiveDate, today: NaiveDate) -> Result<(), BookingError> {
    if date < today {
        return Err(BookingError::ValidationError(
            "Booking date must not be in the past".to_string(),
        ));
    }

    Ok(())
}

// Handlers

/// Books a court slot at the listed hourly price
async fn create_booking(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>), BookingError> {
    let player = current_user_with_role(&state.pool, &session, UserRole::Player).await?;

    let court = Court::find_by_id(&state.pool, req.court_id)
        .await
        .map_err(BookingError::DatabaseError)?
        .filter(|c| c.is_active)
        .ok_or(BookingError::NotFound)?;

    let facility = Facility::find_by_id(&state.pool, court.facility_id)
        .await
        .map_err(BookingError::DatabaseError)?
        .ok_or(BookingError::NotFound)?;
    if facility.approval_status != ApprovalStatus::Approved {
        return Err(BookingError::NotFound);
    }

    validate_booking_date(req.booking_date, Utc::now().date_naive())?;
    if !availability::range_within_hours(
        court.open_hour,
        court.close_hour,
        req.start_hour,
        req.end_hour,
    ) {
        return Err(BookingError::ValidationError(
            "Requested hours are outside the court's operating hours".to_string(),
        ));
    }

    let hours = Decimal::from(req.end_hour - req.start_hour);
    let total_price = court.price_per_hour * hours;

    let booking = Booking::create_checked(
        &state.pool,
        CreateBookingData {
            user_id: player.id,
            court_id: court.id,
            facility_id: facility.id,
            booking_date: req.booking_date,
            start_hour: req.start_hour,
            end_hour: req.end_hour,
            total_price,
        },
    )
    .await
    .map_err(BookingError::DatabaseError)?
    .ok_or(BookingError::SlotTaken)?;

    tracing::info!(
        booking_id = %booking.id,
        court_id = %court.id,
        date = %booking.booking_date,
        "Booking created"
    );

    Ok((StatusCode::CREATED, Json(booking)))
}

async fn my_bookings(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<Booking>>, BookingError> {
    let user = current_user(&state.pool, &session).await?;

    let bookings = Booking::list_by_user(&state.pool, user.id)
        .await
        .map_err(BookingError::DatabaseError)?;

    Ok(Json(bookings))
}

/// Visible to the booking player, the facility owner, and admins
async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    session: Session,
) -> Result<Json<Booking>, BookingError> {
    let user = current_user(&state.pool, &session).await?;

    let booking = Booking::find_by_id(&state.pool, id)
        .await
        .map_err(BookingError::DatabaseError)?
        .ok_or(BookingError::NotFound)?;

    if booking.user_id != user.id && user.role != UserRole::Admin {
        let facility = Facility::find_by_id(&state.pool, booking.facility_id)
            .await
            .map_err(BookingError::DatabaseError)?
            .ok_or(BookingError::NotFound)?;
        if facility.owner_id != user.id {
            return Err(BookingError::NotFound);
        }
    }

    Ok(Json(booking))
}

/// Cancels a future confirmed booking; a paid order is refunded
async fn cancel_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    session: Session,
) -> Result<Json<Booking>, BookingError> {
    let user = current_user(&state.pool, &session).await?;

    let booking = Booking::find_by_id(&state.pool, id)
        .await
        .map_err(BookingError::DatabaseError)?
        .ok_or(BookingError::NotFound)?;

    if booking.user_id != user.id && user.role != UserRole::Admin {
        return Err(BookingError::Forbidden("Not your booking"));
    }

    if booking.booking_date < Utc::now().date_naive() {
        return Err(BookingError::ValidationError(
            "Past bookings cannot be cancelled".to_string(),
        ));
    }

    let booking = Booking::cancel(&state.pool, id)
        .await
        .map_err(BookingError::DatabaseError)?
        .ok_or(BookingError::AlreadyClosed)?;

    if let Some(payment) = Payment::refund_for_booking(&state.pool, booking.id)
        .await
        .map_err(BookingError::DatabaseError)?
    {
        tracing::info!(payment_id = %payment.id, booking_id = %booking.id, "Payment refunded");
    }

    tracing::info!(booking_id = %booking.id, "Booking cancelled");

    Ok(Json(booking))
}

/// Owner view of a facility's booking calendar
async fn facility_bookings(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    session: Session,
) -> Result<Json<Vec<Booking>>, BookingError> {
    let owner = current_user_with_role(&state.pool, &session, UserRole::FacilityOwner).await?;

    let facility = Facility::find_by_id(&state.pool, id)
        .await
        .map_err(BookingError::DatabaseError)?
        .ok_or(BookingError::NotFound)?;
    if facility.owner_id != owner.id {
        return Err(BookingError::Forbidden("Not your facility"));
    }

    let bookings = Booking::list_by_facility(&state.pool, id)
        .await
        .map_err(BookingError::DatabaseError)?;

    Ok(Json(bookings))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/bookings", post(create_booking))
        .route("/api/bookings/mine", get(my_bookings))
        .route("/api/bookings/:id", get(get_booking))
        .route("/api/bookings/:id/cancel", post(cancel_booking))
        .route("/api/facilities/:id/bookings", get(facility_bookings))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_date_rule() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();

        assert!(validate_booking_date(today, today).is_ok());
        assert!(validate_booking_date(today.succ_opt().unwrap(), today).is_ok());
        assert!(validate_booking_date(today.pred_opt().unwrap(), today).is_err());
    }
}
