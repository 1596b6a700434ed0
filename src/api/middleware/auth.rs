use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use sqlx::PgPool;
use tower_sessions::Session;
use uuid::Uuid;

use super::session::SESSION_KEY_USER_ID;
use crate::models::user::{User, UserRole, UserStatus};

/// Authentication error responses
#[derive(Debug)]
pub enum AuthError {
    Unauthorized,
    Forbidden(&'static str),
    SessionError,
    DatabaseError(sqlx::Error),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Authentication required. Please log in.",
            )
                .into_response(),
            AuthError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg).into_response(),
            AuthError::SessionError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Session error occurred.").into_response()
            }
            AuthError::DatabaseError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error").into_response()
            }
        }
    }
}

impl From<AuthError> for crate::error::AppError {
    fn from(err: AuthError) -> Self {
        use crate::error::AppError;

        match err {
            AuthError::Unauthorized => AppError::Unauthorized,
            AuthError::Forbidden(msg) => AppError::Forbidden(msg.to_string()),
            AuthError::SessionError => {
                AppError::Internal(anyhow::anyhow!("Session error occurred"))
            }
            AuthError::DatabaseError(e) => AppError::Database(e),
        }
    }
}

/// Middleware that requires the user to be authenticated
pub async fn require_auth(
    session: Session,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user_id: Option<Uuid> = session
        .get(SESSION_KEY_USER_ID)
        .await
        .map_err(|_| AuthError::SessionError)?;

    if user_id.is_none() {
        return Err(AuthError::Unauthorized);
    }

    Ok(next.run(request).await)
}

/// Loads the authenticated user behind the session. Banned accounts are
/// rejected here so every role-gated handler inherits the gate.
pub async fn current_user(pool: &PgPool, session: &Session) -> Result<User, AuthError> {
    let user_id: Uuid = session
        .get(SESSION_KEY_USER_ID)
        .await
        .map_err(|_| AuthError::SessionError)?
        .ok_or(AuthError::Unauthorized)?;

    let user = User::find_by_id(pool, user_id)
        .await
        .map_err(AuthError::DatabaseError)?
        .ok_or(AuthError::Unauthorized)?;

    if user.status == UserStatus::Banned {
        return Err(AuthError::Forbidden("Account is banned"));
    }

    Ok(user)
}

/// Requires the authenticated user to hold a specific role
pub async fn current_user_with_role(
    pool: &PgPool,
    session: &Session,
    role: UserRole,
) -> Result<User, AuthError> {
    let user = current_user(pool, session).await?;

    if user.role != role {
        return Err(AuthError::Forbidden("Insufficient role"));
    }

    Ok(user)
}
