use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, put},
    Json, Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use uuid::Uuid;

use crate::api::middleware::auth::{self, current_user_with_role};
use crate::api::middleware::session::AppState;
use crate::models::booking::Booking;
use crate::models::court::{Court, CreateCourtData, UpdateCourtData};
use crate::models::facility::{ApprovalStatus, Facility};
use crate::models::time_slot::{BlockedSlot, CreateBlockData};
use crate::models::user::{User, UserRole};
use crate::services::availability::{self, HourSlot};

#[derive(Debug)]
pub enum CourtError {
    DatabaseError(sqlx::Error),
    NotFound,
    ValidationError(String),
    Forbidden(&'static str),
    Auth(auth::AuthError),
}

impl From<auth::AuthError> for CourtError {
    fn from(err: auth::AuthError) -> Self {
        CourtError::Auth(err)
    }
}

impl IntoResponse for CourtError {
    fn into_response(self) -> Response {
        match self {
            CourtError::DatabaseError(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", e),
            )
                .into_response(),
            CourtError::NotFound => (StatusCode::NOT_FOUND, "Court not found").into_response(),
            CourtError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            CourtError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg).into_response(),
            CourtError::Auth(err) => err.into_response(),
        }
    }
}

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct CreateCourtRequest {
    pub name: String,
    pub sport: String,
    pub price_per_hour: Decimal,
    pub open_hour: i16,
    pub close_hour: i16,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCourtRequest {
    pub name: Option<String>,
    pub sport: Option<String>,
    pub price_per_hour: Option<Decimal>,
    pub open_hour: Option<i16>,
    pub close_hour: Option<i16>,
}

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub court_id: Uuid,
    pub date: NaiveDate,
    pub slots: Vec<HourSlot>,
}

#[derive(Debug, Deserialize)]
pub struct CreateBlockRequest {
    pub slot_date: NaiveDate,
    pub start_hour: i16,
    pub end_hour: i16,
    pub reason: Option<String>,
}

fn validate_operating_hours(open_hour: i16, close_hour: i16) -> Result<(), CourtError> {
    if !(0..=24).contains(&open_hour) || !(0..=24).contains(&close_hour) || open_hour >= close_hour
    {
        return Err(CourtError::ValidationError(
            "Operating hours must satisfy 0 <= open < close <= 24".to_string(),
        ));
    }

    Ok(())
}

fn validate_price(price: Decimal) -> Result<(), CourtError> {
    if price <= Decimal::ZERO {
        return Err(CourtError::ValidationError(
            "Hourly price must be positive".to_string(),
        ));
    }

    Ok(())
}

/// Loads a court together with its facility, enforcing ownership
async fn owned_court(
    state: &AppState,
    owner: &User,
    court_id: Uuid,
) -> Result<(Court, Facility), CourtError> {
    let court = Court::find_by_id(&state.pool, court_id)
        .await
        .map_err(CourtError::DatabaseError)?
        .ok_or(CourtError::NotFound)?;

    let facility = Facility::find_by_id(&state.pool, court.facility_id)
        .await
        .map_err(CourtError::DatabaseError)?
        .ok_or(CourtError::NotFound)?;

    if facility.owner_id != owner.id {
        return Err(CourtError::Forbidden("Not your facility"));
    }

    Ok((court, facility))
}

// Handlers

async fn create_court(
    State(state): State<AppState>,
    Path(facility_id): Path<Uuid>,
    session: Session,
    Json(req): Json<CreateCourtRequest>,
) -> Result<(StatusCode, Json<Court>), CourtError> {
    let owner = current_user_with_role(&state.pool, &session, UserRole::FacilityOwner).await?;

    let facility = Facility::find_by_id(&state.pool, facility_id)
        .await
        .map_err(CourtError::DatabaseError)?
        .ok_or(CourtError::NotFound)?;
    if facility.owner_id != owner.id {
        return Err(CourtError::Forbidden("Not your facility"));
    }

    if req.name.trim().is_empty() || req.sport.trim().is_empty() {
        return Err(CourtError::ValidationError(
            "Court name and sport are required".to_string(),
        ));
    }
    validate_price(req.price_per_hour)?;
    validate_operating_hours(req.open_hour, req.close_hour)?;

    let court = Court::create(
        &state.pool,
        CreateCourtData {
            facility_id,
            name: req.name.trim().to_string(),
            sport: req.sport,
            price_per_hour: req.price_per_hour,
            open_hour: req.open_hour,
            close_hour: req.close_hour,
        },
    )
    .await
    .map_err(CourtError::DatabaseError)?;

    tracing::info!(court_id = %court.id, facility_id = %facility_id, "Court created");

    Ok((StatusCode::CREATED, Json(court)))
}

/// Active courts of a publicly visible facility
async fn list_courts(
    State(state): State<AppState>,
    Path(facility_id): Path<Uuid>,
) -> Result<Json<Vec<Court>>, CourtError> {
    let facility = Facility::find_by_id(&state.pool, facility_id)
        .await
        .map_err(CourtError::DatabaseError)?
        .ok_or(CourtError::NotFound)?;

    if facility.approval_status != ApprovalStatus::Approved {
        return Err(CourtError::NotFound);
    }

    let courts = Court::list_by_facility(&state.pool, facility_id)
        .await
        .map_err(CourtError::DatabaseError)?;

    Ok(Json(courts))
}

async fn update_court(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    session: Session,
    Json(req): Json<UpdateCourtRequest>,
) -> Result<Json<Court>, CourtError> {
    let owner = current_user_with_role(&state.pool, &session, UserRole::FacilityOwner).await?;
    let (court, _) = owned_court(&state, &owner, id).await?;

    if let Some(price) = req.price_per_hour {
        validate_price(price)?;
    }
    let open = req.open_hour.unwrap_or(court.open_hour);
    let close = req.close_hour.unwrap_or(court.close_hour);
    validate_operating_hours(open, close)?;

    let court = Court::update(
        &state.pool,
        id,
        UpdateCourtData {
            name: req.name,
            sport: req.sport,
            price_per_hour: req.price_per_hour,
            open_hour: req.open_hour,
            close_hour: req.close_hour,
        },
    )
    .await
    .map_err(CourtError::DatabaseError)?;

    tracing::info!(court_id = %court.id, "Court updated");

    Ok(Json(court))
}

async fn deactivate_court(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    session: Session,
) -> Result<StatusCode, CourtError> {
    let owner = current_user_with_role(&state.pool, &session, UserRole::FacilityOwner).await?;
    owned_court(&state, &owner, id).await?;

    Court::deactivate(&state.pool, id)
        .await
        .map_err(CourtError::DatabaseError)?;

    tracing::info!(court_id = %id, "Court deactivated");

    Ok(StatusCode::NO_CONTENT)
}

/// Hourly availability grid for one court on one date
async fn court_availability(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<DateQuery>,
) -> Result<Json<AvailabilityResponse>, CourtError> {
    let court = Court::find_by_id(&state.pool, id)
        .await
        .map_err(CourtError::DatabaseError)?
        .filter(|c| c.is_active)
        .ok_or(CourtError::NotFound)?;

    let booked = Booking::booked_ranges(&state.pool, court.id, params.date)
        .await
        .map_err(CourtError::DatabaseError)?;
    let blocked = BlockedSlot::blocked_ranges(&state.pool, court.id, params.date)
        .await
        .map_err(CourtError::DatabaseError)?;

    let slots = availability::hourly_slots(court.open_hour, court.close_hour, &booked, &blocked);

    Ok(Json(AvailabilityResponse {
        court_id: court.id,
        date: params.date,
        slots,
    }))
}

/// Blocks a window on a court (maintenance, private events)
async fn create_block(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    session: Session,
    Json(req): Json<CreateBlockRequest>,
) -> Result<(StatusCode, Json<BlockedSlot>), CourtError> {
    let owner = current_user_with_role(&state.pool, &session, UserRole::FacilityOwner).await?;
    let (court, _) = owned_court(&state, &owner, id).await?;

    if !availability::range_within_hours(
        court.open_hour,
        court.close_hour,
        req.start_hour,
        req.end_hour,
    ) {
        return Err(CourtError::ValidationError(
            "Blocked window must lie within the court's operating hours".to_string(),
        ));
    }

    let block = BlockedSlot::create(
        &state.pool,
        CreateBlockData {
            court_id: court.id,
            slot_date: req.slot_date,
            start_hour: req.start_hour,
            end_hour: req.end_hour,
            reason: req.reason,
        },
    )
    .await
    .map_err(CourtError::DatabaseError)?;

    tracing::info!(
        block_id = %block.id,
        court_id = %court.id,
        date = %block.slot_date,
        "Slot window blocked"
    );

    Ok((StatusCode::CREATED, Json(block)))
}

async fn list_blocks(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<DateQuery>,
    session: Session,
) -> Result<Json<Vec<BlockedSlot>>, CourtError> {
    let owner = current_user_with_role(&state.pool, &session, UserRole::FacilityOwner).await?;
    let (court, _) = owned_court(&state, &owner, id).await?;

    let blocks = BlockedSlot::list_by_court_date(&state.pool, court.id, params.date)
        .await
        .map_err(CourtError::DatabaseError)?;

    Ok(Json(blocks))
}

/// Unblocks a window by deleting it
async fn delete_block(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    session: Session,
) -> Result<StatusCode, CourtError> {
    let owner = current_user_with_role(&state.pool, &session, UserRole::FacilityOwner).await?;

    let block = BlockedSlot::find_by_id(&state.pool, id)
        .await
        .map_err(CourtError::DatabaseError)?
        .ok_or(CourtError::NotFound)?;
    owned_court(&state, &owner, block.court_id).await?;

    BlockedSlot::delete(&state.pool, id)
        .await
        .map_err(CourtError::DatabaseError)?;

    tracing::info!(block_id = %id, "Slot window unblocked");

    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/facilities/:id/courts",
            get(list_courts).post(create_court),
        )
        .route("/api/courts/:id", put(update_court).delete(deactivate_court))
        .route("/api/courts/:id/availability", get(court_availability))
        .route("/api/courts/:id/blocks", get(list_blocks).post(create_block))
        .route("/api/blocks/:id", delete(delete_block))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_operating_hours_validation() {
        assert!(validate_operating_hours(6, 23).is_ok());
        assert!(validate_operating_hours(0, 24).is_ok());

        assert!(validate_operating_hours(-1, 10).is_err());
        assert!(validate_operating_hours(8, 25).is_err());
        assert!(validate_operating_hours(12, 12).is_err());
        assert!(validate_operating_hours(14, 10).is_err());
    }

    #[test]
    fn test_price_validation() {
        assert!(validate_price(dec!(25.00)).is_ok());

        assert!(validate_price(Decimal::ZERO).is_err());
        assert!(validate_price(dec!(-5)).is_err());
    }
}
