//! HTTP entry point for the status feed WebSocket.
//!
//! Browsers cannot set headers on WebSocket upgrades, so the token may
//! arrive as a `?token=` query parameter as well as a bearer header. The
//! token is verified once at connection time, not per message.

use actix_web::{web, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use authority_client::{bearer_token, AuthRejection, AuthorityClient};
use serde::Deserialize;

use crate::feed::StatusFeed;
use crate::session::StatusFeedSession;

#[derive(Debug, Deserialize)]
struct HandshakeQuery {
    token: Option<String>,
}

/// Pull the subscriber token from `?token=`, falling back to the
/// Authorization header.
pub fn handshake_token(req: &HttpRequest) -> Result<String, AuthRejection> {
    web::Query::<HandshakeQuery>::from_query(req.query_string())
        .ok()
        .and_then(|q| q.into_inner().token)
        .or_else(|| bearer_token(req))
        .ok_or(AuthRejection::MissingToken)
}

/// Verify the handshake token against the authority, then upgrade the
/// connection into a [`StatusFeedSession`] subscribed under the verified
/// identity.
pub async fn connect(
    req: &HttpRequest,
    stream: web::Payload,
    authority: &dyn AuthorityClient,
    feed: StatusFeed,
) -> Result<HttpResponse, actix_web::Error> {
    let token = handshake_token(req)?;
    let identity = authority
        .verify(&token)
        .await
        .map_err(AuthRejection::from)?;

    tracing::debug!(user_id = %identity.user_id, "websocket subscriber connecting");
    ws::start(StatusFeedSession::new(identity.user_id, feed), req, stream)
}
