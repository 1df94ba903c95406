use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::{authentication::AuthenticatedUser, error::ApiError, repository::Repository};

use super::put::owned_subreddit;

#[tracing::instrument(name = "Delete subreddit", skip(user, repository), fields(user_id = %user.id))]
pub async fn delete_subreddit(
    id: web::Path<Uuid>,
    user: AuthenticatedUser,
    repository: web::Data<dyn Repository>,
) -> Result<HttpResponse, ApiError> {
    let subreddit = owned_subreddit(repository.get_ref(), id.into_inner(), &user).await?;

    if !repository.delete_subreddit(subreddit.id).await? {
        return Err(ApiError::NotFound("Subreddit not found".to_string()));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({"message": "Subreddit deleted successfully"})))
}
