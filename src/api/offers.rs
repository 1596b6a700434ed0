use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use uuid::Uuid;

use crate::api::middleware::auth::{self, current_user, current_user_with_role};
use crate::api::middleware::session::AppState;
use crate::models::booking::Booking;
use crate::models::court::Court;
use crate::models::facility::{ApprovalStatus, Facility};
use crate::models::offer::{CreateOfferData, Offer, OfferAcceptance, OfferStatus};
use crate::models::user::{User, UserRole};
use crate::services::availability;

#[derive(Debug)]
pub enum OfferError {
    DatabaseError(sqlx::Error),
    NotFound,
    ValidationError(String),
    Forbidden(&'static str),
    /// The offer moved on (accepted, rejected, expired) before this action
    StaleState,
    SlotTaken,
    Auth(auth::AuthError),
}

impl From<auth::AuthError> for OfferError {
    fn from(err: auth::AuthError) -> Self {
        OfferError::Auth(err)
    }
}

impl IntoResponse for OfferError {
    fn into_response(self) -> Response {
        match self {
            OfferError::DatabaseError(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", e),
            )
                .into_response(),
            OfferError::NotFound => (StatusCode::NOT_FOUND, "Offer not found").into_response(),
            OfferError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            OfferError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg).into_response(),
            OfferError::StaleState => (
                StatusCode::CONFLICT,
                "Offer is no longer open for this action",
            )
                .into_response(),
            OfferError::SlotTaken => (
                StatusCode::CONFLICT,
                "The negotiated slot is no longer available",
            )
                .into_response(),
            OfferError::Auth(err) => err.into_response(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateOfferRequest {
    pub court_id: Uuid,
    pub slot_date: NaiveDate,
    pub start_hour: i16,
    pub end_hour: i16,
    pub offered_total: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct CounterOfferRequest {
    pub counter_total: Decimal,
}

#[derive(Debug, Serialize)]
pub struct AcceptedOfferResponse {
    pub offer: Offer,
    pub booking: Booking,
}

/// Which side of the negotiation the user is on
enum OfferSide {
    Player,
    Owner,
}

async fn offer_side(
    state: &AppState,
    user: &User,
    offer: &Offer,
) -> Result<OfferSide, OfferError> {
    if offer.user_id == user.id {
        return Ok(OfferSide::Player);
    }

    let facility = Facility::find_by_id(&state.pool, offer.facility_id)
        .await
        .map_err(OfferError::DatabaseError)?
        .ok_or(OfferError::NotFound)?;

    if facility.owner_id == user.id {
        Ok(OfferSide::Owner)
    } else {
        Err(OfferError::NotFound)
    }
}

// Handlers

/// Opens a price negotiation for a slot
async fn create_offer(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<CreateOfferRequest>,
) -> Result<(StatusCode, Json<Offer>), OfferError> {
    let player = current_user_with_role(&state.pool, &session, UserRole::Player).await?;

    let court = Court::find_by_id(&state.pool, req.court_id)
        .await
        .map_err(OfferError::DatabaseError)?
        .filter(|c| c.is_active)
        .ok_or(OfferError::NotFound)?;

    let facility = Facility::find_by_id(&state.pool, court.facility_id)
        .await
        .map_err(OfferError::DatabaseError)?
        .ok_or(OfferError::NotFound)?;
    if facility.approval_status != ApprovalStatus::Approved {
        return Err(OfferError::NotFound);
    }

    if req.slot_date < Utc::now().date_naive() {
        return Err(OfferError::ValidationError(
            "Offer date must not be in the past".to_string(),
        ));
    }
    if !availability::range_within_hours(
        court.open_hour,
        court.close_hour,
        req.start_hour,
        req.end_hour,
    ) {
        return Err(OfferError::ValidationError(
            "Requested hours are outside the court's operating hours".to_string(),
        ));
    }
    if req.offered_total <= Decimal::ZERO {
        return Err(OfferError::ValidationError(
            "Offered total must be positive".to_string(),
        ));
    }

    let expires_at = Utc::now() + Duration::hours(state.config.offer_ttl_hours);

    let offer = Offer::create(
        &state.pool,
        CreateOfferData {
            user_id: player.id,
            court_id: court.id,
            facility_id: facility.id,
            slot_date: req.slot_date,
            start_hour: req.start_hour,
            end_hour: req.end_hour,
            offered_total: req.offered_total,
            expires_at,
        },
    )
    .await
    .map_err(OfferError::DatabaseError)?;

    tracing::info!(
        offer_id = %offer.id,
        court_id = %court.id,
        offered_total = %offer.offered_total,
        "Offer opened"
    );

    Ok((StatusCode::CREATED, Json(offer)))
}

async fn my_offers(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<Offer>>, OfferError> {
    let user = current_user(&state.pool, &session).await?;

    let offers = Offer::list_by_user(&state.pool, user.id)
        .await
        .map_err(OfferError::DatabaseError)?;

    Ok(Json(offers))
}

async fn facility_offers(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    session: Session,
) -> Result<Json<Vec<Offer>>, OfferError> {
    let owner = current_user_with_role(&state.pool, &session, UserRole::FacilityOwner).await?;

    let facility = Facility::find_by_id(&state.pool, id)
        .await
        .map_err(OfferError::DatabaseError)?
        .ok_or(OfferError::NotFound)?;
    if facility.owner_id != owner.id {
        return Err(OfferError::Forbidden("Not your facility"));
    }

    let offers = Offer::list_by_facility(&state.pool, id)
        .await
        .map_err(OfferError::DatabaseError)?;

    Ok(Json(offers))
}

/// The owner accepts a pending offer; the player accepts a counter.
/// Either way the slot is booked at the agreed total in one transaction.
async fn accept_offer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    session: Session,
) -> Result<Json<AcceptedOfferResponse>, OfferError> {
    let user = current_user(&state.pool, &session).await?;

    let offer = Offer::find_by_id(&state.pool, id)
        .await
        .map_err(OfferError::DatabaseError)?
        .ok_or(OfferError::NotFound)?;

    let from = match offer_side(&state, &user, &offer).await? {
        OfferSide::Owner => OfferStatus::Pending,
        OfferSide::Player => OfferStatus::Countered,
    };

    match Offer::accept(&state.pool, id, from)
        .await
        .map_err(OfferError::DatabaseError)?
    {
        OfferAcceptance::Accepted { offer, booking } => {
            tracing::info!(
                offer_id = %offer.id,
                booking_id = %booking.id,
                total = %booking.total_price,
                "Offer accepted"
            );

            Ok(Json(AcceptedOfferResponse { offer, booking }))
        }
        OfferAcceptance::WrongState => Err(OfferError::StaleState),
        OfferAcceptance::SlotTaken => Err(OfferError::SlotTaken),
    }
}

/// The owner declines an open offer; the player declines a counter
async fn reject_offer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    session: Session,
) -> Result<Json<Offer>, OfferError> {
    let user = current_user(&state.pool, &session).await?;

    let offer = Offer::find_by_id(&state.pool, id)
        .await
        .map_err(OfferError::DatabaseError)?
        .ok_or(OfferError::NotFound)?;

    if let OfferSide::Player = offer_side(&state, &user, &offer).await? {
        // Players may only walk away from a counter-offer
        if offer.status != OfferStatus::Countered {
            return Err(OfferError::StaleState);
        }
    }

    let offer = Offer::reject(&state.pool, id)
        .await
        .map_err(OfferError::DatabaseError)?
        .ok_or(OfferError::StaleState)?;

    tracing::info!(offer_id = %offer.id, "Offer rejected");

    Ok(Json(offer))
}

/// The owner counters a pending offer with a different total
async fn counter_offer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    session: Session,
    Json(req): Json<CounterOfferRequest>,
) -> Result<Json<Offer>, OfferError> {
    let user = current_user(&state.pool, &session).await?;

    let offer = Offer::find_by_id(&state.pool, id)
        .await
        .map_err(OfferError::DatabaseError)?
        .ok_or(OfferError::NotFound)?;

    match offer_side(&state, &user, &offer).await? {
        OfferSide::Owner => {}
        OfferSide::Player => return Err(OfferError::Forbidden("Only the owner can counter")),
    }

    if req.counter_total <= Decimal::ZERO {
        return Err(OfferError::ValidationError(
            "Counter total must be positive".to_string(),
        ));
    }

    let offer = Offer::counter(&state.pool, id, req.counter_total)
        .await
        .map_err(OfferError::DatabaseError)?
        .ok_or(OfferError::StaleState)?;

    tracing::info!(
        offer_id = %offer.id,
        counter_total = %req.counter_total,
        "Offer countered"
    );

    Ok(Json(offer))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/offers", post(create_offer))
        .route("/api/offers/mine", get(my_offers))
        .route("/api/offers/:id/accept", post(accept_offer))
        .route("/api/offers/:id/reject", post(reject_offer))
        .route("/api/offers/:id/counter", post(counter_offer))
        .route("/api/facilities/:id/offers", get(facility_offers))
}
