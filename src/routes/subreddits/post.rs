use actix_web::{web, HttpResponse};
use serde_json::Value as JsonValue;

use crate::{
    authentication::AuthenticatedUser,
    domain::{json_list_or_empty, NewSubreddit},
    error::ApiError,
    repository::{Repository, RepositoryError},
    utils::{is_valid_subreddit_name, validate_length},
};

pub const MIN_SUBREDDIT_NAME_LENGTH: usize = 3;
pub const MAX_SUBREDDIT_NAME_LENGTH: usize = 50;
pub const MAX_DISPLAY_NAME_LENGTH: usize = 100;

#[derive(serde::Deserialize)]
pub struct CreateSubredditData {
    name: String,
    display_name: String,
    description: Option<String>,
    rules: Option<JsonValue>,
    #[serde(default)]
    is_nsfw: bool,
    #[serde(default)]
    is_private: bool,
}

#[tracing::instrument(name = "Create subreddit", skip(user, payload, repository), fields(user_id = %user.id, name = %payload.name))]
pub async fn create_subreddit(
    user: AuthenticatedUser,
    payload: web::Json<CreateSubredditData>,
    repository: web::Data<dyn Repository>,
) -> Result<HttpResponse, ApiError> {
    let payload = payload.into_inner();
    let name = payload.name.trim().to_lowercase();
    let display_name = payload.display_name.trim().to_string();

    validate_length(
        "Name",
        &name,
        MIN_SUBREDDIT_NAME_LENGTH,
        MAX_SUBREDDIT_NAME_LENGTH,
    )
    .map_err(ApiError::Validation)?;
    if !is_valid_subreddit_name(&name) {
        return Err(ApiError::Validation(
            "Name can only contain lowercase letters, numbers, and underscores".to_string(),
        ));
    }
    validate_length("Display name", &display_name, 1, MAX_DISPLAY_NAME_LENGTH)
        .map_err(ApiError::Validation)?;

    if repository.find_subreddit_by_name(&name).await?.is_some() {
        return Err(ApiError::Conflict("Subreddit name already exists".to_string()));
    }
    if repository
        .find_subreddit_by_display_name(&display_name)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict(
            "Subreddit with this display name already exists".to_string(),
        ));
    }

    let subreddit = repository
        .insert_subreddit(NewSubreddit {
            name,
            display_name,
            description: payload.description,
            rules: json_list_or_empty(payload.rules),
            is_nsfw: payload.is_nsfw,
            is_private: payload.is_private,
            created_by: user.id,
        })
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => {
                ApiError::Conflict("Subreddit name already exists".to_string())
            }
            e => e.into(),
        })?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Successfully created subreddit",
        "data": subreddit,
    })))
}
