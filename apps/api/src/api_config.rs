use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use formcraft_application::DEFAULT_AUTOSAVE_DEBOUNCE;
use formcraft_core::AppError;
use tracing_subscriber::EnvFilter;

/// Backend holding forms and submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormStoreKind {
    Postgres,
    Memory,
}

impl FromStr for FormStoreKind {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "postgres" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(AppError::Validation(format!(
                "FORM_STORE must be either 'postgres' or 'memory', got '{other}'"
            ))),
        }
    }
}

const DEFAULT_BUILDER_SESSION_IDLE_MINUTES: u64 = 30;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: String,
    pub frontend_url: String,
    pub _session_secret: String,
    pub api_host: String,
    pub api_port: u16,
    pub cookie_secure: bool,
    pub autosave_debounce: Duration,
    pub builder_session_idle_timeout: Duration,
    pub form_store: FormStoreKind,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

        let database_url = required_env("DATABASE_URL")?;
        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());
        let session_secret = required_env("SESSION_SECRET")?;
        if session_secret.len() < 32 {
            return Err(AppError::Validation(
                "SESSION_SECRET must be at least 32 characters".to_owned(),
            ));
        }

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);
        let cookie_secure = env::var("SESSION_COOKIE_SECURE")
            .unwrap_or_else(|_| "false".to_owned())
            .eq_ignore_ascii_case("true");
        let autosave_debounce =
            parse_autosave_debounce(env::var("AUTOSAVE_DEBOUNCE_SECONDS").ok().as_deref())?;
        let builder_session_idle_timeout = parse_builder_session_idle_timeout(
            env::var("BUILDER_SESSION_IDLE_MINUTES").ok().as_deref(),
        )?;
        let form_store = env::var("FORM_STORE")
            .unwrap_or_else(|_| "postgres".to_owned())
            .parse::<FormStoreKind>()?;

        Ok(Self {
            migrate_only,
            database_url,
            frontend_url,
            _session_secret: session_secret,
            api_host,
            api_port,
            cookie_secure,
            autosave_debounce,
            builder_session_idle_timeout,
            form_store,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

fn parse_autosave_debounce(raw: Option<&str>) -> Result<Duration, AppError> {
    Ok(parse_positive_count("AUTOSAVE_DEBOUNCE_SECONDS", raw)?
        .map_or(DEFAULT_AUTOSAVE_DEBOUNCE, Duration::from_secs))
}

fn parse_builder_session_idle_timeout(raw: Option<&str>) -> Result<Duration, AppError> {
    let minutes = parse_positive_count("BUILDER_SESSION_IDLE_MINUTES", raw)?
        .unwrap_or(DEFAULT_BUILDER_SESSION_IDLE_MINUTES);
    Ok(Duration::from_secs(minutes.saturating_mul(60)))
}

fn parse_positive_count(name: &str, raw: Option<&str>) -> Result<Option<u64>, AppError> {
    let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };

    match raw.parse::<u64>() {
        Ok(count) if count > 0 => Ok(Some(count)),
        _ => Err(AppError::Validation(format!(
            "{name} must be a positive integer, got '{raw}'"
        ))),
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}
