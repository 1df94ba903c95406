use actix_web::{web, HttpResponse};

use crate::{
    authentication::{AuthService, AuthenticatedUser},
    error::ApiError,
};

#[derive(serde::Deserialize)]
pub struct ChangePasswordData {
    old_password: String,
    new_password: String,
}

#[tracing::instrument(name = "Change password", skip(user, change_password_data, auth_service), fields(user_id = %user.id))]
pub async fn change_password(
    user: AuthenticatedUser,
    change_password_data: web::Json<ChangePasswordData>,
    auth_service: web::Data<AuthService>,
) -> Result<HttpResponse, ApiError> {
    let ChangePasswordData {
        old_password,
        new_password,
    } = change_password_data.into_inner();

    auth_service
        .change_password(user.id, old_password, new_password)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({"message": "Password updated successfully"})))
}
