use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{ready, Ready};
use uuid::Uuid;

use super::Claims;
use crate::error::ApiError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

impl From<Claims> for AuthenticatedUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.user_id,
            username: claims.username,
            email: claims.email,
        }
    }
}

/// Caller identity attached to request extensions by [`super::AuthMiddleware`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Authenticated(AuthenticatedUser),
    Anonymous,
}

impl Identity {
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Identity::Authenticated(user) => Some(user.id),
            Identity::Anonymous => None,
        }
    }
}

/// Routes outside the auth middleware see every caller as anonymous.
impl FromRequest for Identity {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let identity = req
            .extensions()
            .get::<Identity>()
            .cloned()
            .unwrap_or(Identity::Anonymous);
        ready(Ok(identity))
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result = match req.extensions().get::<Identity>() {
            Some(Identity::Authenticated(user)) => Ok(user.clone()),
            _ => Err(ApiError::Unauthorized(
                "Authentication is required".to_string(),
            )),
        };
        ready(result)
    }
}
