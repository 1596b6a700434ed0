use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tower_sessions::Session;
use uuid::Uuid;

use crate::api::middleware::auth::{self, current_user};
use crate::api::middleware::session::AppState;
use crate::models::booking::{Booking, BookingStatus};
use crate::models::payment::Payment;
use crate::models::user::UserRole;

#[derive(Debug)]
pub enum PaymentError {
    DatabaseError(sqlx::Error),
    NotFound,
    ValidationError(String),
    Forbidden(&'static str),
    AlreadySettled,
    Auth(auth::AuthError),
}

impl From<auth::AuthError> for PaymentError {
    fn from(err: auth::AuthError) -> Self {
        PaymentError::Auth(err)
    }
}

impl IntoResponse for PaymentError {
    fn into_response(self) -> Response {
        match self {
            PaymentError::DatabaseError(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", e),
            )
                .into_response(),
            PaymentError::NotFound => {
                (StatusCode::NOT_FOUND, "Payment not found").into_response()
            }
            PaymentError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            PaymentError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg).into_response(),
            PaymentError::AlreadySettled => {
                (StatusCode::CONFLICT, "Payment is already settled").into_response()
            }
            PaymentError::Auth(err) => err.into_response(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub booking_id: Uuid,
}

// Handlers

/// Creates (or returns) the payment order for a confirmed booking.
/// Idempotent per booking.
async fn create_order(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Payment>), PaymentError> {
    let user = current_user(&state.pool, &session).await?;

    let booking = Booking::find_by_id(&state.pool, req.booking_id)
        .await
        .map_err(PaymentError::DatabaseError)?
        .ok_or_else(|| PaymentError::ValidationError("Unknown booking".to_string()))?;

    if booking.user_id != user.id {
        return Err(PaymentError::Forbidden("Not your booking"));
    }
    if booking.status != BookingStatus::Confirmed {
        return Err(PaymentError::ValidationError(
            "Only confirmed bookings can be paid".to_string(),
        ));
    }

    let payment = Payment::create_order(&state.pool, booking.id, user.id, booking.total_price)
        .await
        .map_err(PaymentError::DatabaseError)?;

    tracing::info!(
        payment_id = %payment.id,
        booking_id = %booking.id,
        amount = %payment.amount,
        "Payment order created"
    );

    Ok((StatusCode::CREATED, Json(payment)))
}

/// Settles an open order
async fn confirm_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    session: Session,
) -> Result<Json<Payment>, PaymentError> {
    let user = current_user(&state.pool, &session).await?;

    let payment = Payment::find_by_id(&state.pool, id)
        .await
        .map_err(PaymentError::DatabaseError)?
        .ok_or(PaymentError::NotFound)?;

    if payment.user_id != user.id {
        return Err(PaymentError::Forbidden("Not your payment"));
    }

    let payment = Payment::confirm(&state.pool, id)
        .await
        .map_err(PaymentError::DatabaseError)?
        .ok_or(PaymentError::AlreadySettled)?;

    tracing::info!(payment_id = %payment.id, "Payment confirmed");

    Ok(Json(payment))
}

async fn get_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    session: Session,
) -> Result<Json<Payment>, PaymentError> {
    let user = current_user(&state.pool, &session).await?;

    let payment = Payment::find_by_id(&state.pool, id)
        .await
        .map_err(PaymentError::DatabaseError)?
        .ok_or(PaymentError::NotFound)?;

    if payment.user_id != user.id && user.role != UserRole::Admin {
        return Err(PaymentError::NotFound);
    }

    Ok(Json(payment))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/payments/create-order", post(create_order))
        .route("/api/payments/:id", get(get_payment))
        .route("/api/payments/:id/confirm", post(confirm_payment))
}
