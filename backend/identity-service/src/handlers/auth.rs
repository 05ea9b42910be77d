//! Signup, login, federated login, token verification, and the password
//! reset flow.

use actix_web::{web, HttpResponse};
use authority_client::{Role, VerifyResponse};
use chrono::{Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use sha2::{Digest, Sha256};

use crate::db::user_repo;
use crate::error::{AppError, AppResult};
use crate::middleware::AuthedUser;
use crate::models::{
    AuthResponse, ForgotPasswordRequest, GoogleLoginRequest, LoginRequest, ResetPasswordRequest,
    SignupRequest,
};
use crate::security::jwt::{self, TokenType, RESET_TOKEN_TTL_HOURS};
use crate::security::password;
use crate::services::google;
use crate::validators::{normalize_email, validate_payload};
use crate::AppState;

fn token_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

pub async fn signup(
    state: web::Data<AppState>,
    payload: web::Json<SignupRequest>,
) -> AppResult<HttpResponse> {
    validate_payload(&*payload)?;
    let email = normalize_email(&payload.email);
    let password_hash = password::hash_password(&payload.password)?;

    let user = user_repo::create(&state.db, payload.name.trim(), &email, &password_hash, Role::User)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::DuplicateEmail
            } else {
                e.into()
            }
        })?;

    tracing::info!(user_id = %user.id, "account created");

    // Welcome mail never rolls back account creation.
    if let Err(e) = state.mailer.send_welcome(&user.email, &user.name).await {
        tracing::warn!(user_id = %user.id, error = %e, "welcome email delivery failed");
    }

    let token = jwt::issue_access_token(user.id, user.role)?;
    Ok(HttpResponse::Created().json(AuthResponse {
        token,
        user: user.into(),
    }))
}

pub async fn login(
    state: web::Data<AppState>,
    payload: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    validate_payload(&*payload)?;
    let email = normalize_email(&payload.email);

    // Unknown email and wrong password produce the same response; the
    // client cannot enumerate which accounts exist.
    let user = user_repo::find_by_email(&state.db, &email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;
    password::verify_password(&payload.password, &user.password_hash)?;

    let token = jwt::issue_access_token(user.id, user.role)?;
    Ok(HttpResponse::Ok().json(AuthResponse {
        token,
        user: user.into(),
    }))
}

pub async fn google_login(
    state: web::Data<AppState>,
    payload: web::Json<GoogleLoginRequest>,
) -> AppResult<HttpResponse> {
    let client_id = state
        .google_client_id
        .as_deref()
        .ok_or_else(|| AppError::Internal("google sign-in not configured".into()))?;

    let profile = google::verify_id_token(&state.http, client_id, &payload.token).await?;
    let email = normalize_email(&profile.email);

    let user = match user_repo::find_by_email(&state.db, &email).await? {
        Some(user) => user,
        None => {
            // First federated login provisions an account. The random local
            // credential is unknowable, so password login stays closed until
            // the user goes through a reset.
            let filler: String = rand::thread_rng()
                .sample_iter(&Alphanumeric)
                .take(32)
                .map(char::from)
                .collect();
            let password_hash = password::hash_password(&filler)?;
            let user =
                user_repo::create(&state.db, &profile.name, &email, &password_hash, Role::User)
                    .await?;
            tracing::info!(user_id = %user.id, "account provisioned via google sign-in");
            user
        }
    };

    let token = jwt::issue_access_token(user.id, user.role)?;
    Ok(HttpResponse::Ok().json(AuthResponse {
        token,
        user: user.into(),
    }))
}

/// Remote verification endpoint used by the shipment and tracking services.
pub async fn verify(authed: AuthedUser) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(VerifyResponse {
        valid: true,
        user_id: authed.user_id,
        role: authed.role,
    }))
}

pub async fn forgot_password(
    state: web::Data<AppState>,
    payload: web::Json<ForgotPasswordRequest>,
) -> AppResult<HttpResponse> {
    validate_payload(&*payload)?;
    let email = normalize_email(&payload.email);

    let user = user_repo::find_by_email(&state.db, &email)
        .await?
        .ok_or(AppError::NotFound("user"))?;

    let reset_token = jwt::issue_reset_token(user.id, user.role)?;
    let expires_at = Utc::now() + Duration::hours(RESET_TOKEN_TTL_HOURS);

    // Single conditional update; two concurrent requests cannot both mint a
    // token while one is still live.
    let claimed =
        user_repo::claim_reset_token(&state.db, user.id, &token_digest(&reset_token), expires_at)
            .await?;
    if !claimed {
        return Err(AppError::Conflict(
            "a password reset is already pending for this account".into(),
        ));
    }

    let reset_link = format!("{}/reset-password?token={}", state.frontend_url, reset_token);
    if let Err(e) = state.mailer.send_password_reset(&user.email, &reset_link).await {
        // Delivery is best-effort; the token is minted either way.
        tracing::warn!(user_id = %user.id, error = %e, "reset email delivery failed");
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "password reset email sent"
    })))
}

pub async fn reset_password(
    state: web::Data<AppState>,
    payload: web::Json<ResetPasswordRequest>,
) -> AppResult<HttpResponse> {
    validate_payload(&*payload)?;

    // Signature and expiry first, then the stored digest must still match;
    // a token that was already consumed fails the second check.
    jwt::verify_token(&payload.token, TokenType::Reset)?;
    let password_hash = password::hash_password(&payload.new_password)?;

    let user =
        user_repo::consume_reset_token(&state.db, &token_digest(&payload.token), &password_hash)
            .await?
            .ok_or(AppError::InvalidOrExpiredToken)?;

    tracing::info!(user_id = %user.id, "password reset completed");
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "password updated"
    })))
}
