use actix_web::{web, HttpResponse};

use crate::{authentication::AuthService, error::ApiError};

#[derive(serde::Deserialize)]
pub struct ResetPasswordData {
    token: String,
    password: String,
}

#[tracing::instrument(name = "Reset password", skip(reset_password_data, auth_service))]
pub async fn reset_password(
    reset_password_data: web::Json<ResetPasswordData>,
    auth_service: web::Data<AuthService>,
) -> Result<HttpResponse, ApiError> {
    let ResetPasswordData { token, password } = reset_password_data.into_inner();
    auth_service.reset_password(&token, password).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({"message": "Password reset successfully"})))
}
