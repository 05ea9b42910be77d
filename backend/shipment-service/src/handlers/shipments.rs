//! Shipment CRUD. The caller's identity arrives through the remote-auth
//! middleware; ownership checks happen in the repository queries, so a
//! record owned by someone else reads as 404.

use actix_web::{web, HttpResponse};
use authority_client::AuthContext;
use status_events::StatusEvent;
use uuid::Uuid;

use crate::db::shipment_repo;
use crate::error::{AppError, AppResult};
use crate::models::{
    generate_tracking_number, CreateShipmentRequest, ShipmentListQuery, UpdateShipmentRequest,
};
use crate::validators::validate_payload;
use crate::AppState;

pub async fn create_shipment(
    state: web::Data<AppState>,
    ctx: AuthContext,
    payload: web::Json<CreateShipmentRequest>,
) -> AppResult<HttpResponse> {
    validate_payload(&*payload)?;

    // The unique constraint backstops tracking-number collisions; retry a
    // couple of times before giving up.
    let mut attempts = 0;
    let shipment = loop {
        let tracking_number = generate_tracking_number();
        match shipment_repo::create(&state.db, ctx.user_id, &tracking_number, &payload).await {
            Ok(shipment) => break shipment,
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() && attempts < 2 => {
                attempts += 1;
            }
            Err(e) => return Err(e.into()),
        }
    };

    tracing::info!(shipment_id = %shipment.id, tracking = %shipment.tracking_number, "shipment created");
    state
        .feed
        .publish(StatusEvent::new(shipment.user_id, shipment.id, shipment.status))
        .await;

    Ok(HttpResponse::Created().json(shipment))
}

pub async fn list_shipments(
    state: web::Data<AppState>,
    ctx: AuthContext,
) -> AppResult<HttpResponse> {
    let shipments = shipment_repo::list_owned(&state.db, ctx.user_id).await?;
    Ok(HttpResponse::Ok().json(shipments))
}

pub async fn get_shipment(
    state: web::Data<AppState>,
    ctx: AuthContext,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let shipment = shipment_repo::find_owned(&state.db, *path, ctx.user_id)
        .await?
        .ok_or(AppError::NotFound("shipment"))?;
    Ok(HttpResponse::Ok().json(shipment))
}

pub async fn update_shipment(
    state: web::Data<AppState>,
    ctx: AuthContext,
    path: web::Path<Uuid>,
    payload: web::Json<UpdateShipmentRequest>,
) -> AppResult<HttpResponse> {
    validate_payload(&*payload)?;

    let shipment = shipment_repo::update_owned(&state.db, *path, ctx.user_id, &payload)
        .await?
        .ok_or(AppError::NotFound("shipment"))?;

    if payload.status.is_some() {
        state
            .feed
            .publish(StatusEvent::new(shipment.user_id, shipment.id, shipment.status))
            .await;
    }

    Ok(HttpResponse::Ok().json(shipment))
}

pub async fn delete_shipment(
    state: web::Data<AppState>,
    ctx: AuthContext,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    if shipment_repo::delete_owned(&state.db, *path, ctx.user_id).await? == 0 {
        return Err(AppError::NotFound("shipment"));
    }
    Ok(HttpResponse::Ok().json(serde_json::json!({ "deleted": 1 })))
}

pub async fn list_user_shipments(
    state: web::Data<AppState>,
    ctx: AuthContext,
    query: web::Query<ShipmentListQuery>,
) -> AppResult<HttpResponse> {
    let shipments = shipment_repo::list_owned_filtered(
        &state.db,
        ctx.user_id,
        query.status,
        query.priority.as_deref(),
        query.sort_by.as_deref(),
        query.order.as_deref(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(shipments))
}

pub async fn list_all_shipments(
    state: web::Data<AppState>,
    ctx: AuthContext,
) -> AppResult<HttpResponse> {
    ctx.require_admin().map_err(|_| AppError::Forbidden)?;
    let shipments = shipment_repo::list_all(&state.db).await?;
    Ok(HttpResponse::Ok().json(shipments))
}
