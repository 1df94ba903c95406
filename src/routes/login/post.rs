use actix_web::{
    web::{self, Json},
    HttpResponse,
};

use crate::{authentication::AuthService, error::ApiError};

#[derive(serde::Deserialize)]
pub struct LoginData {
    email: String,
    password: String,
}

#[tracing::instrument(name = "Log in", skip(login_data, auth_service), fields(email = %login_data.email))]
pub async fn login(
    login_data: Json<LoginData>,
    auth_service: web::Data<AuthService>,
) -> Result<HttpResponse, ApiError> {
    let LoginData { email, password } = login_data.into_inner();
    let session = auth_service.login(&email, password).await?;

    Ok(HttpResponse::Ok().json(session))
}
