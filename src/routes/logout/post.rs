use actix_web::HttpResponse;

use crate::authentication::AuthenticatedUser;

/// Tokens are stateless, so there is nothing to revoke: the client drops its
/// copy and the token stays valid until it expires.
#[tracing::instrument(name = "Log out", skip(user), fields(user_id = %user.id))]
pub async fn logout(user: AuthenticatedUser) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"message": "Logged out successfully"}))
}
