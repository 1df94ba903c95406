use actix_web::{web, HttpResponse};

use crate::{
    authentication::Identity,
    domain::PageQuery,
    error::ApiError,
    repository::Repository,
};

#[tracing::instrument(name = "Get subreddit", skip(identity, repository))]
pub async fn get_subreddit(
    name: web::Path<String>,
    identity: Identity,
    repository: web::Data<dyn Repository>,
) -> Result<HttpResponse, ApiError> {
    let name = name.into_inner().to_lowercase();
    let subreddit = repository
        .find_subreddit_by_name(&name)
        .await?
        .ok_or_else(|| ApiError::NotFound("Subreddit not found".to_string()))?;

    let is_creator = identity.user_id() == Some(subreddit.created_by);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "data": subreddit,
        "is_creator": is_creator,
    })))
}

#[tracing::instrument(name = "List subreddits", skip(query, repository))]
pub async fn list_subreddits(
    query: web::Query<PageQuery>,
    repository: web::Data<dyn Repository>,
) -> Result<HttpResponse, ApiError> {
    let page = query.resolve();
    let subreddits = repository.list_subreddits(page).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "pagination": {
            "limit": page.limit,
            "offset": page.offset,
            "count": subreddits.len(),
        },
        "subreddits": subreddits,
    })))
}
