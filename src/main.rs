use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use secrecy::ExposeSecret;
use std::net::SocketAddr;
use tokio_cron_scheduler::{Job, JobScheduler};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quickcourt::api::middleware::session::{create_session_layer, AppState};
use quickcourt::config::Config;
use quickcourt::db;
use quickcourt::jobs::sweeps;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quickcourt=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting QuickCourt server...");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded successfully");

    // Create database pool
    let pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Database pool created");

    // Run migrations
    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    // Create session layer
    let session_secret = config.session_secret.expose_secret().as_bytes();
    let session_layer = create_session_layer(pool.clone(), session_secret).await?;
    tracing::info!("Session layer initialized");

    // Schedule background sweeps (booking completion, offer expiry)
    let scheduler = JobScheduler::new()
        .await
        .map_err(|e| anyhow::anyhow!("Scheduler init failed: {e}"))?;
    let sweep_pool = pool.clone();
    let sweep_job = Job::new_async(config.sweep_schedule.as_str(), move |_id, _sched| {
        let pool = sweep_pool.clone();
        Box::pin(async move {
            if let Err(e) = sweeps::run_sweeps(&pool).await {
                tracing::error!(error = %e, "Sweep job failed");
            }
        })
    })
    .map_err(|e| anyhow::anyhow!("Invalid sweep schedule: {e}"))?;
    scheduler
        .add(sweep_job)
        .await
        .map_err(|e| anyhow::anyhow!("Scheduler add failed: {e}"))?;
    scheduler
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("Scheduler start failed: {e}"))?;
    tracing::info!(schedule = %config.sweep_schedule, "Background sweeps scheduled");

    // Build application state
    let state = AppState {
        pool: pool.clone(),
        config: config.clone(),
    };

    // Build router
    let app = Router::new()
        .merge(quickcourt::api::health::router())
        .merge(quickcourt::api::auth::router())
        .merge(quickcourt::api::facilities::router())
        .merge(quickcourt::api::courts::router())
        .merge(quickcourt::api::bookings::router())
        .merge(quickcourt::api::offers::router())
        .merge(quickcourt::api::payments::router())
        .merge(quickcourt::api::recommendations::router())
        .merge(quickcourt::api::dashboard::router())
        .merge(quickcourt::api::admin::router())
        .layer(session_layer)
        .layer(TraceLayer::new_for_http());

    // The SPA runs on its own origin during development
    let app = match &config.cors_allowed_origin {
        Some(origin) => {
            let origin = origin.parse::<HeaderValue>()?;
            let cors = CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers([header::CONTENT_TYPE])
                .allow_credentials(true);

            app.layer(cors)
        }
        None => app,
    };

    let app = app.with_state(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    tracing::info!("Listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install CTRL+C signal handler");
    tracing::info!("Shutdown signal received, cleaning up...");
}
