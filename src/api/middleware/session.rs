use axum::extract::FromRef;
use sqlx::PgPool;
use tower_sessions::service::SignedCookie;
use tower_sessions::{cookie::Key, Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

/// Session keys used in the application
pub const SESSION_KEY_USER_ID: &str = "user_id";

/// Creates a signed session layer for Axum, backed by PostgreSQL.
/// The signing secret must be at least 64 bytes.
pub async fn create_session_layer(
    pool: PgPool,
    session_secret: &[u8],
) -> anyhow::Result<SessionManagerLayer<PostgresStore, SignedCookie>> {
    let key = Key::try_from(session_secret)
        .map_err(|e| anyhow::anyhow!("SESSION_SECRET is unusable: {e}"))?;

    let session_store = PostgresStore::new(pool);
    session_store.migrate().await?;

    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(true) // Only send over HTTPS in production
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::hours(24)))
        .with_signed(key);

    Ok(session_layer)
}

/// Application state shared with every handler
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: crate::config::Config,
}

impl FromRef<AppState> for PgPool {
    fn from_ref(state: &AppState) -> PgPool {
        state.pool.clone()
    }
}
