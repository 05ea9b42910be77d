//! Public tracking lookup, status mutation, and PDF export.

use actix_web::{web, HttpRequest, HttpResponse};
use authority_client::{bearer_token, AuthContext};
use status_events::StatusEvent;
use uuid::Uuid;

use crate::db::shipment_repo;
use crate::error::{AppError, AppResult};
use crate::models::{Shipment, UpdateStatusRequest};
use crate::services::{directory, pdf};
use crate::AppState;

/// Accepts either the record id or the human-facing tracking number.
async fn find_shipment(state: &AppState, key: &str) -> AppResult<Option<Shipment>> {
    let found = match key.parse::<Uuid>() {
        Ok(id) => shipment_repo::find_by_id(&state.db, id).await?,
        Err(_) => shipment_repo::find_by_tracking_number(&state.db, key).await?,
    };
    Ok(found)
}

/// Public endpoint; no authentication by design, the tracking code is the
/// capability.
pub async fn track(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let shipment = find_shipment(&state, &path)
        .await?
        .ok_or(AppError::NotFound("shipment"))?;
    Ok(HttpResponse::Ok().json(shipment))
}

/// Only the owner or an admin may move a shipment's status. The mutation
/// publishes a status event and then attempts an email notification; both
/// are fire-and-forget from the caller's point of view.
pub async fn update_status(
    req: HttpRequest,
    state: web::Data<AppState>,
    ctx: AuthContext,
    path: web::Path<String>,
    payload: web::Json<UpdateStatusRequest>,
) -> AppResult<HttpResponse> {
    let shipment = find_shipment(&state, &path)
        .await?
        .ok_or(AppError::NotFound("shipment"))?;

    if shipment.user_id != ctx.user_id && !ctx.role.is_admin() {
        return Err(AppError::Forbidden);
    }

    let updated = shipment_repo::update_status(&state.db, shipment.id, payload.status)
        .await?
        .ok_or(AppError::NotFound("shipment"))?;

    tracing::info!(shipment_id = %updated.id, status = %updated.status, "status updated");
    state
        .feed
        .publish(StatusEvent::new(updated.user_id, updated.id, updated.status))
        .await;

    notify_owner(&state, &req, &updated).await;

    Ok(HttpResponse::Ok().json(updated))
}

/// Best-effort email to the shipment owner. The owner's address lives in
/// the identity service; the lookup reuses the caller's bearer token, so it
/// only succeeds for admin callers. Any failure is logged and swallowed.
async fn notify_owner(state: &AppState, req: &HttpRequest, shipment: &Shipment) {
    let Some(token) = bearer_token(req) else {
        return;
    };
    let Some(owner) =
        directory::lookup_user(&state.http, &state.auth_service_url, &token, shipment.user_id)
            .await
    else {
        return;
    };

    if let Err(e) = state
        .mailer
        .send_status_notification(
            &owner.email,
            &shipment.tracking_number,
            shipment.status.as_str(),
        )
        .await
    {
        tracing::warn!(shipment_id = %shipment.id, error = %e, "status email failed");
    }
}

/// PDF export, restricted to the owner or an admin.
pub async fn export_pdf(
    state: web::Data<AppState>,
    ctx: AuthContext,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let shipment = find_shipment(&state, &path)
        .await?
        .ok_or(AppError::NotFound("shipment"))?;

    if shipment.user_id != ctx.user_id && !ctx.role.is_admin() {
        return Err(AppError::Forbidden);
    }

    let bytes = pdf::render_shipment(&shipment)?;
    Ok(HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header((
            "Content-Disposition",
            format!(
                "attachment; filename=\"shipment-{}.pdf\"",
                shipment.tracking_number
            ),
        ))
        .body(bytes))
}
