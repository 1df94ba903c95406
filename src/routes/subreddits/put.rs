use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::{
    authentication::AuthenticatedUser,
    domain::{json_list_or_empty, Subreddit, SubredditChanges},
    error::ApiError,
    repository::Repository,
    utils::validate_length,
};

use super::MAX_DISPLAY_NAME_LENGTH;

#[derive(serde::Deserialize)]
pub struct UpdateSubredditData {
    display_name: String,
    description: Option<String>,
    rules: Option<JsonValue>,
    banner_image_url: Option<String>,
    icon_image_url: Option<String>,
    #[serde(default)]
    is_nsfw: bool,
    #[serde(default)]
    is_private: bool,
    flairs: Option<JsonValue>,
    rules_updated_at: Option<DateTime<Utc>>,
}

/// Loads the subreddit and checks `user` created it.
pub(super) async fn owned_subreddit(
    repository: &dyn Repository,
    id: Uuid,
    user: &AuthenticatedUser,
) -> Result<Subreddit, ApiError> {
    let subreddit = repository
        .find_subreddit_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Subreddit not found".to_string()))?;

    if subreddit.created_by != user.id {
        return Err(ApiError::Forbidden("You are not authorized".to_string()));
    }
    Ok(subreddit)
}

#[tracing::instrument(name = "Update subreddit", skip(user, payload, repository), fields(user_id = %user.id))]
pub async fn update_subreddit(
    id: web::Path<Uuid>,
    user: AuthenticatedUser,
    payload: web::Json<UpdateSubredditData>,
    repository: web::Data<dyn Repository>,
) -> Result<HttpResponse, ApiError> {
    let subreddit = owned_subreddit(repository.get_ref(), id.into_inner(), &user).await?;

    let payload = payload.into_inner();
    let display_name = payload.display_name.trim().to_string();
    validate_length("Display name", &display_name, 1, MAX_DISPLAY_NAME_LENGTH)
        .map_err(ApiError::Validation)?;

    if display_name != subreddit.display_name {
        if let Some(existing) = repository
            .find_subreddit_by_display_name(&display_name)
            .await?
        {
            if existing.id != subreddit.id {
                return Err(ApiError::Conflict(
                    "Subreddit with this display name already exists".to_string(),
                ));
            }
        }
    }

    let changes = SubredditChanges {
        display_name,
        description: payload.description,
        rules: json_list_or_empty(payload.rules),
        banner_image_url: payload.banner_image_url,
        icon_image_url: payload.icon_image_url,
        is_nsfw: payload.is_nsfw,
        is_private: payload.is_private,
        flairs: json_list_or_empty(payload.flairs),
        rules_updated_at: payload.rules_updated_at,
    };

    repository
        .update_subreddit(subreddit.id, changes)
        .await?
        .ok_or_else(|| ApiError::NotFound("Subreddit not found".to_string()))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({"message": "Subreddit updated successfully"})))
}
