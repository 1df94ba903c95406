use actix_web::{web, HttpResponse};

use crate::{
    authentication::{AuthService, AuthenticatedUser},
    error::ApiError,
};

#[tracing::instrument(name = "Get current user", skip(user, auth_service), fields(user_id = %user.id))]
pub async fn get_current_user(
    user: AuthenticatedUser,
    auth_service: web::Data<AuthService>,
) -> Result<HttpResponse, ApiError> {
    let user = auth_service.current_user(user.id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "user": user })))
}
