use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::{
    authentication::AuthenticatedUser,
    domain::{NewPost, PostType},
    error::ApiError,
    repository::Repository,
    utils::validate_length,
};

pub const MAX_TITLE_LENGTH: usize = 300;

#[derive(serde::Deserialize)]
pub struct CreatePostData {
    title: String,
    content: Option<String>,
    post_type: PostType,
    link_url: Option<String>,
    image_url: Option<String>,
    #[serde(default)]
    is_locked: bool,
    #[serde(default)]
    is_nsfw: bool,
    subreddit_id: Uuid,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[tracing::instrument(
    name = "Create post",
    skip(user, payload, repository),
    fields(user_id = %user.id, subreddit_id = %payload.subreddit_id)
)]
pub async fn create_post(
    user: AuthenticatedUser,
    payload: web::Json<CreatePostData>,
    repository: web::Data<dyn Repository>,
) -> Result<HttpResponse, ApiError> {
    let payload = payload.into_inner();
    let title = payload.title.trim().to_string();
    validate_length("Title", &title, 1, MAX_TITLE_LENGTH).map_err(ApiError::Validation)?;

    let link_url = non_blank(payload.link_url);
    let image_url = non_blank(payload.image_url);
    match payload.post_type {
        PostType::Link if link_url.is_none() => {
            return Err(ApiError::Validation(
                "Link posts require a link_url".to_string(),
            ));
        }
        PostType::Image if image_url.is_none() => {
            return Err(ApiError::Validation(
                "Image posts require an image_url".to_string(),
            ));
        }
        _ => {}
    }

    if repository
        .find_subreddit_by_id(payload.subreddit_id)
        .await?
        .is_none()
    {
        return Err(ApiError::NotFound("Subreddit not found".to_string()));
    }

    let post = repository
        .insert_post(NewPost {
            title,
            content: payload.content,
            post_type: payload.post_type,
            link_url,
            image_url,
            author_id: user.id,
            subreddit_id: payload.subreddit_id,
            is_locked: payload.is_locked,
            is_nsfw: payload.is_nsfw,
        })
        .await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Post created successfully",
        "data": post,
    })))
}
