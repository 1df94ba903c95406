use actix_web::{web, HttpResponse};

use crate::{
    authentication::{AuthService, Registration},
    error::ApiError,
};

#[derive(serde::Deserialize)]
pub struct RegisterData {
    email: String,
    username: String,
    password: String,
}

#[tracing::instrument(
    name = "Register a new user",
    skip(register_data, auth_service),
    fields(email = %register_data.email, username = %register_data.username)
)]
pub async fn register(
    register_data: web::Json<RegisterData>,
    auth_service: web::Data<AuthService>,
) -> Result<HttpResponse, ApiError> {
    let RegisterData {
        email,
        username,
        password,
    } = register_data.into_inner();

    let session = auth_service
        .register(Registration {
            email,
            username,
            password,
        })
        .await?;

    Ok(HttpResponse::Ok().json(session))
}
