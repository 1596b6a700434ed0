use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::api::middleware::auth::current_user;
use crate::api::middleware::session::{AppState, SESSION_KEY_USER_ID};
use crate::models::user::{CreateUserData, User, UserRole, UserStatus};
use crate::services::password;

#[derive(Debug)]
pub enum AuthError {
    DatabaseError(sqlx::Error),
    SessionError(String),
    ValidationError(String),
    InvalidCredentials,
    Banned,
    HashingError,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::DatabaseError(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", e),
            ),
            AuthError::SessionError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Session error: {}", msg),
            ),
            AuthError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AuthError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid email or password".to_string())
            }
            AuthError::Banned => (StatusCode::FORBIDDEN, "Account is banned".to_string()),
            AuthError::HashingError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Password hashing failed".to_string(),
            ),
        };

        (status, message).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role: Option<UserRole>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

fn validate_email(email: &str) -> Result<(), AuthError> {
    let trimmed = email.trim();

    let valid = trimmed.len() >= 3
        && trimmed.split_once('@').is_some_and(|(local, domain)| {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        });

    if valid {
        Ok(())
    } else {
        Err(AuthError::ValidationError("Invalid email address".to_string()))
    }
}

/// Password complexity: at least 8 characters with one letter and one digit
fn validate_password(pw: &str) -> Result<(), AuthError> {
    if pw.len() < 8 {
        return Err(AuthError::ValidationError(
            "Password must be at least 8 characters".to_string(),
        ));
    }
    if !pw.chars().any(|c| c.is_ascii_alphabetic()) || !pw.chars().any(|c| c.is_ascii_digit()) {
        return Err(AuthError::ValidationError(
            "Password must contain at least one letter and one digit".to_string(),
        ));
    }

    Ok(())
}

/// Register a new account. Admin accounts are never self-service.
async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<User>), AuthError> {
    validate_email(&req.email)?;
    validate_password(&req.password)?;

    if req.full_name.trim().is_empty() {
        return Err(AuthError::ValidationError("Full name is required".to_string()));
    }

    let role = match req.role.unwrap_or(UserRole::Player) {
        UserRole::Admin => {
            return Err(AuthError::ValidationError(
                "Cannot self-register as admin".to_string(),
            ))
        }
        role => role,
    };

    if User::find_by_email(&state.pool, &req.email)
        .await
        .map_err(AuthError::DatabaseError)?
        .is_some()
    {
        return Err(AuthError::ValidationError(
            "An account with this email already exists".to_string(),
        ));
    }

    let password_hash =
        password::hash_password(&req.password).map_err(|_| AuthError::HashingError)?;

    let user = User::create(
        &state.pool,
        CreateUserData {
            email: req.email.trim().to_lowercase(),
            password_hash,
            full_name: req.full_name.trim().to_string(),
            avatar_url: req.avatar_url,
            role,
        },
    )
    .await
    .map_err(AuthError::DatabaseError)?;

    // Log the fresh account straight in
    session
        .insert(SESSION_KEY_USER_ID, user.id)
        .await
        .map_err(|e| AuthError::SessionError(e.to_string()))?;

    tracing::info!(user_id = %user.id, role = ?user.role, "User registered");

    Ok((StatusCode::CREATED, Json(user)))
}

async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<LoginRequest>,
) -> Result<Json<User>, AuthError> {
    let user = User::find_by_email(&state.pool, &req.email)
        .await
        .map_err(AuthError::DatabaseError)?
        .ok_or(AuthError::InvalidCredentials)?;

    let valid = password::verify_password(&req.password, &user.password_hash)
        .map_err(|_| AuthError::InvalidCredentials)?;

    if !valid {
        return Err(AuthError::InvalidCredentials);
    }

    if user.status == UserStatus::Banned {
        return Err(AuthError::Banned);
    }

    // Rotate the session id on privilege change
    session
        .cycle_id()
        .await
        .map_err(|e| AuthError::SessionError(e.to_string()))?;
    session
        .insert(SESSION_KEY_USER_ID, user.id)
        .await
        .map_err(|e| AuthError::SessionError(e.to_string()))?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(user))
}

async fn logout(session: Session) -> Result<StatusCode, AuthError> {
    session
        .flush()
        .await
        .map_err(|e| AuthError::SessionError(e.to_string()))?;

    Ok(StatusCode::NO_CONTENT)
}

async fn me(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<User>, crate::api::middleware::auth::AuthError> {
    let user = current_user(&state.pool, &session).await?;

    Ok(Json(user))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(me))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        assert!(validate_email("player@example.com").is_ok());
        assert!(validate_email("  padded@example.com  ").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@nodot").is_err());
    }

    #[test]
    fn test_password_complexity() {
        assert!(validate_password("abcdef12").is_ok());
        assert!(validate_password("longer password 99").is_ok());

        assert!(validate_password("short1").is_err());
        assert!(validate_password("lettersonly").is_err());
        assert!(validate_password("12345678").is_err());
    }
}
