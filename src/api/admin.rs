use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use uuid::Uuid;

use crate::api::middleware::auth::{self, current_user_with_role};
use crate::api::middleware::session::AppState;
use crate::models::booking::Booking;
use crate::models::facility::{ApprovalStatus, Facility};
use crate::models::user::{User, UserRole, UserStatus};
use crate::services::stats::{self, QuartileSummary};

#[derive(Debug)]
pub enum AdminError {
    DatabaseError(sqlx::Error),
    NotFound,
    ValidationError(String),
    Auth(auth::AuthError),
}

impl From<auth::AuthError> for AdminError {
    fn from(err: auth::AuthError) -> Self {
        AdminError::Auth(err)
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        match self {
            AdminError::DatabaseError(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", e),
            )
                .into_response(),
            AdminError::NotFound => (StatusCode::NOT_FOUND, "Not found").into_response(),
            AdminError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            AdminError::Auth(err) => err.into_response(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct RejectFacilityRequest {
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct PlatformStats {
    pub total_users: i64,
    pub total_bookings: i64,
    pub approved_facilities: i64,
    pub pending_facilities: i64,
    pub booking_value_quartiles: QuartileSummary,
}

// Handlers

async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<ListUsersQuery>,
    session: Session,
) -> Result<Json<Vec<User>>, AdminError> {
    current_user_with_role(&state.pool, &session, UserRole::Admin).await?;

    let limit = params.limit.unwrap_or(50).clamp(1, 200);
    let offset = params.offset.unwrap_or(0).max(0);

    let users = User::list(&state.pool, limit, offset)
        .await
        .map_err(AdminError::DatabaseError)?;

    Ok(Json(users))
}

/// Moderation action on a user account, addressed as `/:id/:action`
/// (`ban` or `unban`) the way the original admin console calls it
async fn user_action(
    State(state): State<AppState>,
    Path((id, action)): Path<(Uuid, String)>,
    session: Session,
) -> Result<Json<User>, AdminError> {
    let admin = current_user_with_role(&state.pool, &session, UserRole::Admin).await?;

    let status = match action.as_str() {
        "ban" => UserStatus::Banned,
        "unban" => UserStatus::Active,
        other => {
            return Err(AdminError::ValidationError(format!(
                "Unknown action '{}'",
                other
            )))
        }
    };

    if id == admin.id {
        return Err(AdminError::ValidationError(
            "Admins cannot moderate their own account".to_string(),
        ));
    }

    let target = User::find_by_id(&state.pool, id)
        .await
        .map_err(AdminError::DatabaseError)?
        .ok_or(AdminError::NotFound)?;
    if target.role == UserRole::Admin {
        return Err(AdminError::ValidationError(
            "Admin accounts cannot be banned".to_string(),
        ));
    }

    let user = User::set_status(&state.pool, id, status)
        .await
        .map_err(AdminError::DatabaseError)?;

    tracing::info!(user_id = %user.id, action = %action, "User moderation action");

    Ok(Json(user))
}

async fn pending_facilities(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<Facility>>, AdminError> {
    current_user_with_role(&state.pool, &session, UserRole::Admin).await?;

    let facilities = Facility::list_pending(&state.pool)
        .await
        .map_err(AdminError::DatabaseError)?;

    Ok(Json(facilities))
}

async fn approve_facility(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    session: Session,
) -> Result<Json<Facility>, AdminError> {
    current_user_with_role(&state.pool, &session, UserRole::Admin).await?;

    let facility = Facility::set_approval(&state.pool, id, ApprovalStatus::Approved, None)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => AdminError::NotFound,
            e => AdminError::DatabaseError(e),
        })?;

    tracing::info!(facility_id = %facility.id, "Facility approved");

    Ok(Json(facility))
}

async fn reject_facility(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    session: Session,
    Json(req): Json<RejectFacilityRequest>,
) -> Result<Json<Facility>, AdminError> {
    current_user_with_role(&state.pool, &session, UserRole::Admin).await?;

    if req.reason.trim().is_empty() {
        return Err(AdminError::ValidationError(
            "A rejection reason is required".to_string(),
        ));
    }

    let facility =
        Facility::set_approval(&state.pool, id, ApprovalStatus::Rejected, Some(req.reason))
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => AdminError::NotFound,
                e => AdminError::DatabaseError(e),
            })?;

    tracing::info!(facility_id = %facility.id, "Facility rejected");

    Ok(Json(facility))
}

/// Platform totals plus the spread of booking values
async fn platform_stats(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<PlatformStats>, AdminError> {
    current_user_with_role(&state.pool, &session, UserRole::Admin).await?;

    let total_users = User::count_all(&state.pool)
        .await
        .map_err(AdminError::DatabaseError)?;
    let total_bookings = Booking::count_all(&state.pool)
        .await
        .map_err(AdminError::DatabaseError)?;
    let approved_facilities = Facility::count_by_status(&state.pool, ApprovalStatus::Approved)
        .await
        .map_err(AdminError::DatabaseError)?;
    let pending_facilities = Facility::count_by_status(&state.pool, ApprovalStatus::Pending)
        .await
        .map_err(AdminError::DatabaseError)?;

    let values: Vec<f64> = Booking::all_values(&state.pool)
        .await
        .map_err(AdminError::DatabaseError)?
        .iter()
        .filter_map(|v| v.to_f64())
        .collect();

    Ok(Json(PlatformStats {
        total_users,
        total_bookings,
        approved_facilities,
        pending_facilities,
        booking_value_quartiles: stats::quartiles(&values),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/admin/users", get(list_users))
        .route("/api/admin/users/:id/:action", post(user_action))
        .route("/api/admin/facilities/pending", get(pending_facilities))
        .route("/api/admin/facilities/:id/approve", post(approve_facility))
        .route("/api/admin/facilities/:id/reject", post(reject_facility))
        .route("/api/admin/stats", get(platform_stats))
}
