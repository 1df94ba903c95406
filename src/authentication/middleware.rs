use actix_web::{
    body::{BoxBody, MessageBody},
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header::HeaderMap,
    Error, HttpMessage, ResponseError,
};
use futures_util::{
    future::{ok, Ready},
    FutureExt,
};
use std::{
    future::Future,
    pin::Pin,
    rc::Rc,
    sync::Arc,
    task::{Context, Poll},
};

use super::{AuthenticatedUser, Identity, JwtSigner};
use crate::error::ApiError;

/// Header carrying the session token, either raw or as `Bearer <token>`.
pub const TOKEN_HEADER: &str = "Token";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Reject the request unless a valid token is present.
    Required,
    /// Fall back to [`Identity::Anonymous`] on any token problem.
    Optional,
}

pub fn extract_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(TOKEN_HEADER)?.to_str().ok()?.trim();
    let token = match value.strip_prefix("Bearer") {
        Some(rest) if rest.is_empty() || rest.starts_with(' ') => rest.trim(),
        _ => value,
    };
    (!token.is_empty()).then_some(token)
}

pub fn authenticate(
    signer: &JwtSigner,
    headers: &HeaderMap,
) -> Result<AuthenticatedUser, ApiError> {
    let token = extract_token(headers)
        .ok_or_else(|| ApiError::Unauthorized("Token is required".to_string()))?;

    signer.verify(token).map(AuthenticatedUser::from).map_err(|e| {
        tracing::debug!(error = %e, "Rejected session token");
        ApiError::Unauthorized("Invalid or expired token".to_string())
    })
}

pub struct AuthMiddleware {
    mode: AuthMode,
    signer: Arc<JwtSigner>,
}

impl AuthMiddleware {
    pub fn required(signer: Arc<JwtSigner>) -> Self {
        Self {
            mode: AuthMode::Required,
            signer,
        }
    }

    pub fn optional(signer: Arc<JwtSigner>) -> Self {
        Self {
            mode: AuthMode::Optional,
            signer,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AuthMiddlewareService {
            service: Rc::new(service),
            mode: self.mode,
            signer: self.signer.clone(),
        })
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    mode: AuthMode,
    signer: Arc<JwtSigner>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let signer = self.signer.clone();
        let mode = self.mode;

        async move {
            let authenticated = authenticate(&signer, req.headers());
            let identity = match (authenticated, mode) {
                (Ok(user), _) => Identity::Authenticated(user),
                (Err(_), AuthMode::Optional) => Identity::Anonymous,
                (Err(e), AuthMode::Required) => {
                    return Ok(req.into_response(e.error_response()));
                }
            };

            req.extensions_mut().insert(identity);
            service.call(req).await.map(|res| res.map_into_boxed_body())
        }
        .boxed_local()
    }
}
