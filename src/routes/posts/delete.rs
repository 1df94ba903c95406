use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::{authentication::AuthenticatedUser, error::ApiError, repository::Repository};

#[tracing::instrument(name = "Delete post", skip(user, repository), fields(user_id = %user.id))]
pub async fn delete_post(
    id: web::Path<Uuid>,
    user: AuthenticatedUser,
    repository: web::Data<dyn Repository>,
) -> Result<HttpResponse, ApiError> {
    let post = repository
        .find_post_by_id(id.into_inner())
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

    if post.author_id != user.id {
        return Err(ApiError::Forbidden("You are not authorized".to_string()));
    }

    repository.delete_post(post.id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({"message": "Post deleted successfully"})))
}
