use secrecy::Secret;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,

    // Origin of the SPA frontend; no CORS layer when unset
    pub cors_allowed_origin: Option<String>,

    // Offer negotiation
    pub offer_ttl_hours: i64,

    // Cron expression shared by the background sweeps
    pub sweep_schedule: String,

    // Security
    pub session_secret: Secret<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        // Load .env file if it exists (for local development)
        let _ = dotenvy::dotenv();

        let config = config::Config::builder()
            .add_source(config::Environment::default().separator("__"))
            .build()?;

        Ok(Self {
            database_url: config.get("database_url")?,
            host: config.get("host").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: config.get("port")?,

            cors_allowed_origin: config.get("cors_allowed_origin").ok(),

            offer_ttl_hours: config.get("offer_ttl_hours").unwrap_or(48),

            sweep_schedule: config
                .get("sweep_schedule")
                .unwrap_or_else(|_| "0 7 * * * *".to_string()),

            session_secret: Secret::new(config.get("session_secret")?),
        })
    }
}
