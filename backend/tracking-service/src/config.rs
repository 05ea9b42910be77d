use std::time::Duration;

use dotenv::dotenv;
use std::env;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub username: String,
    pub password: String,
    pub from_address: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub auth_service_url: String,
    pub auth_verify_timeout: Duration,
    pub auth_negative_ttl: Duration,
    pub smtp: Option<SmtpConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| AppError::Config("DATABASE_URL missing".into()))?;
        let port = env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);
        let auth_service_url =
            env::var("AUTH_SERVICE_URL").unwrap_or_else(|_| "http://localhost:5000".into());
        let auth_verify_timeout = env::var("AUTH_VERIFY_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(authority_client::DEFAULT_VERIFY_TIMEOUT);
        let auth_negative_ttl = env::var("AUTH_NEGATIVE_TTL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(authority_client::DEFAULT_NEGATIVE_TTL);

        let smtp = match (env::var("SMTP_USERNAME"), env::var("SMTP_PASSWORD")) {
            (Ok(username), Ok(password)) => Some(SmtpConfig {
                host: env::var("SMTP_HOST").unwrap_or_else(|_| "smtp.gmail.com".into()),
                from_address: env::var("SMTP_FROM").unwrap_or_else(|_| username.clone()),
                username,
                password,
            }),
            _ => None,
        };

        Ok(Self {
            database_url,
            port,
            auth_service_url,
            auth_verify_timeout,
            auth_negative_ttl,
            smtp,
        })
    }
}
