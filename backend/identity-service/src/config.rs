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
    pub jwt_secret: String,
    pub google_client_id: Option<String>,
    pub smtp: Option<SmtpConfig>,
    /// Base URL embedded in password-reset links.
    pub frontend_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| AppError::Config("DATABASE_URL missing".into()))?;
        let port = env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5000);
        let jwt_secret =
            env::var("JWT_SECRET").map_err(|_| AppError::Config("JWT_SECRET missing".into()))?;
        let google_client_id = env::var("GOOGLE_CLIENT_ID").ok();
        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:5173".into());

        // Mail delivery is optional; without SMTP credentials reset emails
        // are logged instead of sent.
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
            jwt_secret,
            google_client_id,
            smtp,
            frontend_url,
        })
    }
}
