//! Configuration management for the API server
//!
//! Loads configuration from environment variables (and a `.env` file when
//! present) into a type-safe struct.
//!
//! # Environment Variables
//!
//! - `API_HOST`: Host to bind to (default: 0.0.0.0)
//! - `API_PORT`: Port to bind to (default: 5000)
//! - `CORS_ORIGINS`: Comma-separated allowed origins, `*` for any
//! - `PRODUCTION`: Enables HSTS (default: false)
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
//! - `JWT_SECRET`: Secret key for JWT signing (required, 32+ chars)
//! - `JWT_TTL_HOURS`: Token lifetime (default: 24)
//! - `ADMIN_EMAIL`, `ADMIN_PASSWORD`: Administrator credentials (required)
//! - `VALIDATE_PROJECT_MEMBERS`: Check member ids on project writes (default: false)
//! - `RUN_MIGRATIONS`: Apply migrations at startup (default: true)
//!
//! # Example
//!
//! ```no_run
//! use sitelog_api::config::Config;
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! println!("Server will listen on {}", config.bind_address());
//! # Ok(())
//! # }
//! ```

use std::env;
use std::str::FromStr;

use anyhow::Context;
use sitelog_shared::auth::identity::IdentityConfig;
use sitelog_shared::db::pool::DatabaseConfig;

/// Origins allowed when `CORS_ORIGINS` is unset
pub const DEFAULT_CORS_ORIGINS: [&str; 3] = [
    "http://localhost:3000",
    "http://localhost:3001",
    "http://localhost:3002",
];

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,

    /// Require project member ids to name existing users of the right role
    pub validate_project_members: bool,

    /// Apply embedded migrations before serving
    pub run_migrations: bool,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Allowed CORS origins; `*` means permissive
    pub cors_origins: Vec<String>,

    /// Production mode turns on HSTS
    pub production: bool,
}

/// Token signing and administrator credentials
#[derive(Clone)]
pub struct AuthConfig {
    /// Secret key for JWT signing. Generate with `openssl rand -hex 32`.
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub admin_email: String,
    pub admin_password: String,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("jwt_ttl_hours", &self.jwt_ttl_hours)
            .field("admin_email", &self.admin_email)
            .field("admin_password", &"<redacted>")
            .finish()
    }
}

fn required(name: &str) -> anyhow::Result<String> {
    env::var(name).map_err(|_| anyhow::anyhow!("{} environment variable is required", name))
}

fn parsed<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .with_context(|| format!("{} has an invalid value", name)),
        Err(_) => Ok(default),
    }
}

fn flag(name: &str, default: bool) -> bool {
    match env::var(name) {
        Ok(value) => matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        Err(_) => default,
    }
}

/// Splits a comma-separated origin list, dropping blanks
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing, a numeric value
    /// does not parse, or `JWT_SECRET` is shorter than 32 characters.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let cors_origins = match env::var("CORS_ORIGINS") {
            Ok(raw) => parse_origins(&raw),
            Err(_) => DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
        };

        let jwt_secret = required("JWT_SECRET")?;
        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let jwt_ttl_hours = parsed("JWT_TTL_HOURS", 24i64)?;
        if jwt_ttl_hours <= 0 {
            anyhow::bail!("JWT_TTL_HOURS must be positive");
        }

        Ok(Self {
            api: ApiConfig {
                host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parsed("API_PORT", 5000u16)?,
                cors_origins,
                production: flag("PRODUCTION", false),
            },
            database: DatabaseConfig {
                url: required("DATABASE_URL")?,
                max_connections: parsed("DATABASE_MAX_CONNECTIONS", 10u32)?,
                ..Default::default()
            },
            auth: AuthConfig {
                jwt_secret,
                jwt_ttl_hours,
                admin_email: required("ADMIN_EMAIL")?,
                admin_password: required("ADMIN_PASSWORD")?,
            },
            validate_project_members: flag("VALIDATE_PROJECT_MEMBERS", false),
            run_migrations: flag("RUN_MIGRATIONS", true),
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Settings handed to the identity provider
    pub fn identity_config(&self) -> IdentityConfig {
        IdentityConfig {
            admin_email: self.auth.admin_email.clone(),
            admin_password: self.auth.admin_password.clone(),
            jwt_secret: self.auth.jwt_secret.clone(),
            token_ttl: chrono::Duration::hours(self.auth.jwt_ttl_hours),
        }
    }

    /// Whether CORS should allow any origin
    pub fn cors_permissive(&self) -> bool {
        self.api.cors_origins.iter().any(|o| o == "*")
    }
}
