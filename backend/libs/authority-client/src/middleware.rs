//! Per-request authentication against the remote authority.
//!
//! Every protected request costs one synchronous round trip to the identity
//! service. Failures short-circuit before any business logic runs.

use std::rc::Rc;
use std::sync::Arc;

use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    Error, FromRequest, HttpMessage, HttpRequest,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::client::AuthorityClient;
use crate::error::AuthRejection;
use crate::Role;
use uuid::Uuid;

/// Verified caller identity, attached to the request for the remainder of
/// its processing.
#[derive(Debug, Clone, Copy)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub role: Role,
}

impl AuthContext {
    /// Role gate for privileged operations.
    pub fn require_admin(&self) -> Result<(), AuthRejection> {
        if self.role.is_admin() {
            Ok(())
        } else {
            Err(AuthRejection::Forbidden)
        }
    }
}

/// Middleware factory verifying bearer tokens through an [`AuthorityClient`].
pub struct RemoteAuthMiddleware {
    authority: Arc<dyn AuthorityClient>,
}

impl RemoteAuthMiddleware {
    pub fn new(authority: Arc<dyn AuthorityClient>) -> Self {
        Self { authority }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RemoteAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RemoteAuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RemoteAuthMiddlewareService {
            service: Rc::new(service),
            authority: self.authority.clone(),
        }))
    }
}

pub struct RemoteAuthMiddlewareService<S> {
    service: Rc<S>,
    authority: Arc<dyn AuthorityClient>,
}

impl<S, B> Service<ServiceRequest> for RemoteAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let authority = self.authority.clone();

        Box::pin(async move {
            // Copy the header out before any mutable access to the request.
            let token = match bearer_token(req.request()) {
                Some(token) => token,
                None => return Err(AuthRejection::MissingToken.into()),
            };

            let identity = match authority.verify(&token).await {
                Ok(identity) => identity,
                Err(err) => {
                    tracing::debug!("token verification failed: {err}");
                    return Err(AuthRejection::from(err).into());
                }
            };

            req.extensions_mut().insert(AuthContext {
                user_id: identity.user_id,
                role: identity.role,
            });

            service.call(req).await
        })
    }
}

/// Pull the bearer token out of the Authorization header, if any.
pub fn bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_owned)
}

impl FromRequest for AuthContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthContext>() {
            Some(ctx) => ready(Ok(*ctx)),
            None => ready(Err(AuthRejection::MissingToken.into())),
        }
    }
}
