use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::{
    authentication::Identity,
    domain::PageQuery,
    error::ApiError,
    repository::Repository,
};

/// Repeats the `PageQuery` fields instead of flattening them: serde_urlencoded
/// hands flattened fields over as strings, so numeric ones would fail with 400.
#[derive(Debug, serde::Deserialize)]
pub struct ListPostsQuery {
    subreddit_id: Option<Uuid>,
    page: Option<i64>,
    per_page: Option<i64>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl ListPostsQuery {
    fn page_query(&self) -> PageQuery {
        PageQuery {
            page: self.page,
            per_page: self.per_page,
            limit: self.limit,
            offset: self.offset,
        }
    }
}

#[tracing::instrument(name = "Get post", skip(identity, repository))]
pub async fn get_post(
    id: web::Path<Uuid>,
    identity: Identity,
    repository: web::Data<dyn Repository>,
) -> Result<HttpResponse, ApiError> {
    let post = repository
        .find_post_by_id(id.into_inner())
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

    let is_author = identity.user_id() == Some(post.author_id);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "data": post,
        "is_author": is_author,
    })))
}

#[tracing::instrument(name = "List posts", skip(repository))]
pub async fn list_posts(
    query: web::Query<ListPostsQuery>,
    repository: web::Data<dyn Repository>,
) -> Result<HttpResponse, ApiError> {
    let page = query.page_query().resolve();
    let posts = repository.list_posts(query.subreddit_id, page).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "pagination": {
            "limit": page.limit,
            "offset": page.offset,
            "count": posts.len(),
        },
        "posts": posts,
    })))
}
