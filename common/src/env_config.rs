use std::{env, sync::Arc};

#[derive(Clone, Debug)]
/// Configuration for the KPI server.
///
/// Everything is read once at startup from the environment (and `.env` if present).
/// A missing Stripe key does not stop the server from starting; every KPI request
/// then fails with a configuration error instead.
pub struct Config {
    // environment
    pub environment: String, // development or production
    /// The hostname or IP address the server will bind to.
    pub server_host: String,
    /// The port number the server will listen on.
    pub server_port: u16,
    /// The number of worker threads to spawn for handling requests.
    pub num_workers: usize,
    /// The allowed origin for CORS (Cross-Origin Resource Sharing).
    pub cors_allowed_origin: String,
    /// A boolean indicating whether console logging is enabled.
    pub console_logging_enabled: bool,
    /// File the logger appends to.
    pub log_file: String,
    /// Stripe secret key
    pub stripe_secret_key: String,
    /// Offset east of UTC, in minutes, used to cut monthly chart bins.
    pub report_utc_offset_minutes: i32,
}

impl Config {
    /// Creates a new `Config` instance from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `ENVIRONMENT`: default "development"
    /// - `IP`: Server host (default: "127.0.0.1")
    /// - `PORT`: Server port (default: 8080)
    /// - `WORKERS`: Number of worker threads (default: 4)
    /// - `CORS_ALLOWED_ORIGIN`: Allowed CORS origin (default: "http://localhost:3000")
    /// - `ENABLE_CONSOLE_LOGGING`: Whether to enable console logging (default: true)
    /// - `LOG_FILE`: default "kpis.log"
    /// - `STRIPE_SECRET_KEY`: default empty
    /// - `REPORT_UTC_OFFSET_MINUTES`: default 0
    pub fn from_env() -> Arc<Self> {
        dotenvy::dotenv().ok();

        Arc::new(Config {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            server_host: env::var("IP").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            num_workers: env::var("WORKERS")
                .unwrap_or_else(|_| "4".to_string())
                .parse()
                .unwrap_or(4),
            cors_allowed_origin: env::var("CORS_ALLOWED_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            console_logging_enabled: env::var("ENABLE_CONSOLE_LOGGING")
                .unwrap_or_else(|_| "true".to_string())
                .to_lowercase()
                == "true",
            log_file: env::var("LOG_FILE").unwrap_or_else(|_| "kpis.log".to_string()),
            stripe_secret_key: env::var("STRIPE_SECRET_KEY").unwrap_or_default(),
            report_utc_offset_minutes: env::var("REPORT_UTC_OFFSET_MINUTES")
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(0),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            environment: "development".to_string(),
            server_host: "127.0.0.1".to_string(),
            server_port: 8080,
            num_workers: 4,
            cors_allowed_origin: "http://localhost:3000".to_string(),
            console_logging_enabled: true,
            log_file: "kpis.log".to_string(),
            stripe_secret_key: String::new(),
            report_utc_offset_minutes: 0,
        }
    }
}
