//! Admin user directory and the caller's own profile.

use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::db::user_repo;
use crate::error::{AppError, AppResult};
use crate::middleware::AuthedUser;
use crate::models::{
    BulkDeleteRequest, SearchQuery, UpdateProfileRequest, UpdateUserRequest, UserView,
};
use crate::security::password;
use crate::validators::{normalize_email, validate_payload};
use crate::AppState;

pub async fn list_users(
    state: web::Data<AppState>,
    authed: AuthedUser,
) -> AppResult<HttpResponse> {
    authed.require_admin()?;
    let users = user_repo::list_all(&state.db).await?;
    let views: Vec<UserView> = users.into_iter().map(UserView::from).collect();
    Ok(HttpResponse::Ok().json(views))
}

pub async fn search_users(
    state: web::Data<AppState>,
    authed: AuthedUser,
    query: web::Query<SearchQuery>,
) -> AppResult<HttpResponse> {
    authed.require_admin()?;
    let users = user_repo::search(&state.db, query.query.trim()).await?;
    let views: Vec<UserView> = users.into_iter().map(UserView::from).collect();
    Ok(HttpResponse::Ok().json(views))
}

pub async fn get_user(
    state: web::Data<AppState>,
    authed: AuthedUser,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    authed.require_admin()?;
    let user = user_repo::find_by_id(&state.db, *path)
        .await?
        .ok_or(AppError::NotFound("user"))?;
    Ok(HttpResponse::Ok().json(UserView::from(user)))
}

pub async fn update_user(
    state: web::Data<AppState>,
    authed: AuthedUser,
    path: web::Path<Uuid>,
    payload: web::Json<UpdateUserRequest>,
) -> AppResult<HttpResponse> {
    authed.require_admin()?;
    validate_payload(&*payload)?;

    let email = payload.email.as_deref().map(normalize_email);
    let user = user_repo::update(
        &state.db,
        *path,
        payload.name.as_deref().map(str::trim),
        email.as_deref(),
        payload.role,
    )
    .await
    .map_err(|e| {
        if matches!(&e, sqlx::Error::Database(db) if db.is_unique_violation()) {
            AppError::DuplicateEmail
        } else {
            AppError::from(e)
        }
    })?
    .ok_or(AppError::NotFound("user"))?;

    Ok(HttpResponse::Ok().json(UserView::from(user)))
}

pub async fn delete_user(
    state: web::Data<AppState>,
    authed: AuthedUser,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    authed.require_admin()?;
    let id = *path;

    // Privileged accounts cannot be deleted, singly or in bulk.
    if user_repo::any_admin(&state.db, &[id]).await? {
        return Err(AppError::Forbidden);
    }
    if user_repo::delete(&state.db, id).await? == 0 {
        return Err(AppError::NotFound("user"));
    }
    tracing::info!(user_id = %id, "user deleted");
    Ok(HttpResponse::Ok().json(serde_json::json!({ "deleted": 1 })))
}

/// All-or-nothing bulk delete. A batch touching any admin account deletes
/// nothing and fails with Forbidden.
pub async fn bulk_delete_users(
    state: web::Data<AppState>,
    authed: AuthedUser,
    payload: web::Json<BulkDeleteRequest>,
) -> AppResult<HttpResponse> {
    authed.require_admin()?;
    if payload.ids.is_empty() {
        return Err(AppError::Validation("ids must not be empty".into()));
    }

    if user_repo::any_admin(&state.db, &payload.ids).await? {
        return Err(AppError::Forbidden);
    }
    let deleted = user_repo::delete_many(&state.db, &payload.ids).await?;
    tracing::info!(deleted, "bulk user deletion");
    Ok(HttpResponse::Ok().json(serde_json::json!({ "deleted": deleted })))
}

pub async fn get_profile(
    state: web::Data<AppState>,
    authed: AuthedUser,
) -> AppResult<HttpResponse> {
    authed.require_admin()?;
    let user = user_repo::find_by_id(&state.db, authed.user_id)
        .await?
        .ok_or(AppError::NotFound("user"))?;
    Ok(HttpResponse::Ok().json(UserView::from(user)))
}

pub async fn update_profile(
    state: web::Data<AppState>,
    authed: AuthedUser,
    payload: web::Json<UpdateProfileRequest>,
) -> AppResult<HttpResponse> {
    authed.require_admin()?;
    validate_payload(&*payload)?;

    // A password change must re-prove the current password; check it before
    // touching anything so a mismatch applies no partial update.
    let new_password_hash = match &payload.new_password {
        Some(new_password) => {
            let current = payload.current_password.as_deref().ok_or_else(|| {
                AppError::Validation(
                    "current password is required to set a new password".to_string(),
                )
            })?;
            let stored = user_repo::find_by_id(&state.db, authed.user_id)
                .await?
                .ok_or(AppError::NotFound("user"))?;
            password::verify_password(current, &stored.password_hash)?;
            Some(password::hash_password(new_password)?)
        }
        None => None,
    };

    let email = payload.email.as_deref().map(normalize_email);
    let user = user_repo::update(
        &state.db,
        authed.user_id,
        payload.name.as_deref().map(str::trim),
        email.as_deref(),
        None,
    )
    .await
    .map_err(|e| {
        if matches!(&e, sqlx::Error::Database(db) if db.is_unique_violation()) {
            AppError::DuplicateEmail
        } else {
            AppError::from(e)
        }
    })?
    .ok_or(AppError::NotFound("user"))?;

    if let Some(hash) = new_password_hash {
        user_repo::update_password(&state.db, authed.user_id, &hash).await?;
    }

    Ok(HttpResponse::Ok().json(UserView::from(user)))
}
