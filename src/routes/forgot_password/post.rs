use actix_web::{web, HttpResponse};

use crate::{authentication::AuthService, error::ApiError};

pub const FORGOT_PASSWORD_MESSAGE: &str = "If that email exists, a reset link has been sent";

#[derive(serde::Deserialize)]
pub struct ForgotPasswordRequest {
    email: String,
}

#[tracing::instrument(name = "Forgot password", skip(forgot_password_request, auth_service))]
pub async fn forgot_password(
    forgot_password_request: web::Json<ForgotPasswordRequest>,
    auth_service: web::Data<AuthService>,
) -> Result<HttpResponse, ApiError> {
    auth_service
        .forgot_password(&forgot_password_request.email)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": FORGOT_PASSWORD_MESSAGE })))
}
