//! WebSocket endpoint for the status feed; see `status_events::ws`.

use actix_web::{web, HttpRequest, HttpResponse};

use crate::AppState;

pub async fn status_feed(
    req: HttpRequest,
    stream: web::Payload,
    state: web::Data<AppState>,
) -> Result<HttpResponse, actix_web::Error> {
    status_events::ws::connect(&req, stream, &*state.authority, state.feed.clone()).await
}
