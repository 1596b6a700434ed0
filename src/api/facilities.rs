use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use uuid::Uuid;

use crate::api::middleware::auth::{self, current_user, current_user_with_role};
use crate::api::middleware::session::AppState;
use crate::models::booking::Booking;
use crate::models::court::Court;
use crate::models::facility::{
    ApprovalStatus, CreateFacilityData, Facility, FacilityCard, FacilityFilter, UpdateFacilityData,
};
use crate::models::review::{CreateReviewData, Review};
use crate::models::user::{User, UserRole};
use crate::services::quality::{self, QualityInputs};

#[derive(Debug)]
pub enum FacilityError {
    DatabaseError(sqlx::Error),
    NotFound,
    ValidationError(String),
    Forbidden(&'static str),
    Auth(auth::AuthError),
}

impl From<auth::AuthError> for FacilityError {
    fn from(err: auth::AuthError) -> Self {
        FacilityError::Auth(err)
    }
}

impl IntoResponse for FacilityError {
    fn into_response(self) -> Response {
        match self {
            FacilityError::DatabaseError(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", e),
            )
                .into_response(),
            FacilityError::NotFound => {
                (StatusCode::NOT_FOUND, "Facility not found").into_response()
            }
            FacilityError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            FacilityError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg).into_response(),
            FacilityError::Auth(err) => err.into_response(),
        }
    }
}

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct ListFacilitiesQuery {
    pub sport: Option<String>,
    pub city: Option<String>,
    pub q: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateFacilityRequest {
    pub name: String,
    pub description: Option<String>,
    pub address: String,
    pub city: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub sports: Vec<String>,
    pub amenities: Option<Vec<String>>,
    pub photos: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateFacilityRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub sports: Option<Vec<String>>,
    pub amenities: Option<Vec<String>>,
    pub photos: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct FacilityDetail {
    #[serde(flatten)]
    pub facility: Facility,
    pub courts: Vec<Court>,
    pub rating_avg: Option<f64>,
    pub rating_count: i64,
    pub quality_score: f64,
}

#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub rating: i16,
    pub comment: Option<String>,
}

fn validate_coordinates(latitude: Option<f64>, longitude: Option<f64>) -> Result<(), FacilityError> {
    if let Some(lat) = latitude {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(FacilityError::ValidationError(
                "Latitude must be between -90 and 90".to_string(),
            ));
        }
    }
    if let Some(lng) = longitude {
        if !(-180.0..=180.0).contains(&lng) {
            return Err(FacilityError::ValidationError(
                "Longitude must be between -180 and 180".to_string(),
            ));
        }
    }

    Ok(())
}

/// Loads a facility the current viewer is allowed to see: approved ones
/// are public, the rest only for the owner or an admin
async fn visible_facility(
    state: &AppState,
    session: &Session,
    id: Uuid,
) -> Result<Facility, FacilityError> {
    let facility = Facility::find_by_id(&state.pool, id)
        .await
        .map_err(FacilityError::DatabaseError)?
        .ok_or(FacilityError::NotFound)?;

    if facility.approval_status == ApprovalStatus::Approved {
        return Ok(facility);
    }

    let viewer = current_user(&state.pool, session)
        .await
        .map_err(|_| FacilityError::NotFound)?;

    if viewer.id == facility.owner_id || viewer.role == UserRole::Admin {
        Ok(facility)
    } else {
        // Hide unapproved facilities rather than admitting they exist
        Err(FacilityError::NotFound)
    }
}

fn owned_by(facility: &Facility, user: &User) -> Result<(), FacilityError> {
    if facility.owner_id == user.id {
        Ok(())
    } else {
        Err(FacilityError::Forbidden("Not your facility"))
    }
}

// Handlers

/// Public browse listing over approved facilities
async fn list_facilities(
    State(state): State<AppState>,
    Query(params): Query<ListFacilitiesQuery>,
) -> Result<Json<Vec<FacilityCard>>, FacilityError> {
    let filter = FacilityFilter {
        sport: params.sport,
        city: params.city,
        q: params.q,
    };
    let limit = params.limit.unwrap_or(20).clamp(1, 100);
    let offset = params.offset.unwrap_or(0).max(0);

    let cards = Facility::list_approved(&state.pool, &filter, limit, offset)
        .await
        .map_err(FacilityError::DatabaseError)?;

    Ok(Json(cards))
}

/// Facility detail: courts, rating aggregate, and the quality composite
async fn get_facility(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    session: Session,
) -> Result<Json<FacilityDetail>, FacilityError> {
    let facility = visible_facility(&state, &session, id).await?;

    let courts = Court::list_by_facility(&state.pool, facility.id)
        .await
        .map_err(FacilityError::DatabaseError)?;

    let summary = Review::summary(&state.pool, facility.id)
        .await
        .map_err(FacilityError::DatabaseError)?;

    let quality_score = quality::compute_quality(QualityInputs {
        rating_avg: summary.rating_avg.unwrap_or(0.0),
        rating_count: summary.rating_count as f64,
        ..QualityInputs::default()
    });

    Ok(Json(FacilityDetail {
        facility,
        courts,
        rating_avg: summary.rating_avg,
        rating_count: summary.rating_count,
        quality_score,
    }))
}

/// Registers a facility for the authenticated owner; lands in the admin
/// review queue
async fn create_facility(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<CreateFacilityRequest>,
) -> Result<(StatusCode, Json<Facility>), FacilityError> {
    let owner = current_user_with_role(&state.pool, &session, UserRole::FacilityOwner).await?;

    if req.name.trim().is_empty() {
        return Err(FacilityError::ValidationError(
            "Facility name is required".to_string(),
        ));
    }
    if req.address.trim().is_empty() || req.city.trim().is_empty() {
        return Err(FacilityError::ValidationError(
            "Address and city are required".to_string(),
        ));
    }
    if req.sports.is_empty() {
        return Err(FacilityError::ValidationError(
            "At least one sport is required".to_string(),
        ));
    }
    validate_coordinates(req.latitude, req.longitude)?;

    let facility = Facility::create(
        &state.pool,
        CreateFacilityData {
            owner_id: owner.id,
            name: req.name.trim().to_string(),
            description: req.description,
            address: req.address,
            city: req.city,
            latitude: req.latitude,
            longitude: req.longitude,
            sports: req.sports,
            amenities: req.amenities.unwrap_or_default(),
            photos: req.photos.unwrap_or_default(),
        },
    )
    .await
    .map_err(FacilityError::DatabaseError)?;

    tracing::info!(facility_id = %facility.id, owner_id = %owner.id, "Facility registered");

    Ok((StatusCode::CREATED, Json(facility)))
}

async fn update_facility(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    session: Session,
    Json(req): Json<UpdateFacilityRequest>,
) -> Result<Json<Facility>, FacilityError> {
    let owner = current_user_with_role(&state.pool, &session, UserRole::FacilityOwner).await?;

    let facility = Facility::find_by_id(&state.pool, id)
        .await
        .map_err(FacilityError::DatabaseError)?
        .ok_or(FacilityError::NotFound)?;
    owned_by(&facility, &owner)?;

    if let Some(sports) = &req.sports {
        if sports.is_empty() {
            return Err(FacilityError::ValidationError(
                "At least one sport is required".to_string(),
            ));
        }
    }
    validate_coordinates(req.latitude, req.longitude)?;

    let facility = Facility::update(
        &state.pool,
        id,
        UpdateFacilityData {
            name: req.name,
            description: req.description,
            address: req.address,
            city: req.city,
            latitude: req.latitude,
            longitude: req.longitude,
            sports: req.sports,
            amenities: req.amenities,
            photos: req.photos,
        },
    )
    .await
    .map_err(FacilityError::DatabaseError)?;

    tracing::info!(facility_id = %facility.id, "Facility updated");

    Ok(Json(facility))
}

/// The authenticated owner's facilities, whatever their approval state
async fn my_facilities(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<Facility>>, FacilityError> {
    let owner = current_user_with_role(&state.pool, &session, UserRole::FacilityOwner).await?;

    let facilities = Facility::list_by_owner(&state.pool, owner.id)
        .await
        .map_err(FacilityError::DatabaseError)?;

    Ok(Json(facilities))
}

async fn list_reviews(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    session: Session,
) -> Result<Json<Vec<Review>>, FacilityError> {
    let facility = visible_facility(&state, &session, id).await?;

    let reviews = Review::list_by_facility(&state.pool, facility.id)
        .await
        .map_err(FacilityError::DatabaseError)?;

    Ok(Json(reviews))
}

/// Leave (or replace) a review. Requires a completed booking at the
/// facility.
async fn create_review(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    session: Session,
    Json(req): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<Review>), FacilityError> {
    let user = current_user_with_role(&state.pool, &session, UserRole::Player).await?;
    let facility = visible_facility(&state, &session, id).await?;

    if !(1..=5).contains(&req.rating) {
        return Err(FacilityError::ValidationError(
            "Rating must be between 1 and 5".to_string(),
        ));
    }

    let has_played = Booking::has_completed_at_facility(&state.pool, user.id, facility.id)
        .await
        .map_err(FacilityError::DatabaseError)?;
    if !has_played {
        return Err(FacilityError::Forbidden(
            "Reviews require a completed booking at this facility",
        ));
    }

    let review = Review::upsert(
        &state.pool,
        CreateReviewData {
            user_id: user.id,
            facility_id: facility.id,
            booking_id: None,
            rating: req.rating,
            comment: req.comment,
        },
    )
    .await
    .map_err(FacilityError::DatabaseError)?;

    tracing::info!(
        review_id = %review.id,
        facility_id = %facility.id,
        rating = review.rating,
        "Review submitted"
    );

    Ok((StatusCode::CREATED, Json(review)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/facilities", get(list_facilities).post(create_facility))
        .route("/api/facilities/mine", get(my_facilities))
        .route(
            "/api/facilities/:id",
            get(get_facility).put(update_facility),
        )
        .route(
            "/api/facilities/:id/reviews",
            get(list_reviews).post(create_review),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_validation() {
        assert!(validate_coordinates(None, None).is_ok());
        assert!(validate_coordinates(Some(51.5), Some(-0.12)).is_ok());

        assert!(validate_coordinates(Some(91.0), None).is_err());
        assert!(validate_coordinates(None, Some(-181.0)).is_err());
    }
}
