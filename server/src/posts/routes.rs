use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{middleware::Claims, policy};
use crate::db::{models::Post, with_conn};
use crate::error::Result;
use crate::extract::ApiJson;
use crate::pagination::{Page, DEFAULT_PAGE_SIZE};
use crate::posts::store::{self, NewPost, PostChanges, PostFilter, PostPage, DEFAULT_RECENT_LIMIT};
use crate::state::AppState;

// --- Request types ---

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub category: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostQuery {
    pub user_id: Option<String>,
    pub category: Option<String>,
    pub slug: Option<String>,
    pub post_id: Option<String>,
    pub search_term: Option<String>,
    pub start_index: Option<String>,
    pub limit: Option<String>,
    pub order: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<String>,
}

/// Blank strings from the client are treated as "not provided".
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// --- Handlers ---

/// POST /api/post/create: Create a post authored by the caller.
pub async fn create_post(
    State(state): State<AppState>,
    claims: Claims,
    ApiJson(req): ApiJson<CreatePostRequest>,
) -> Result<(StatusCode, Json<Post>)> {
    let new = NewPost {
        title: req.title,
        content: req.content,
        category: present(req.category),
        image: present(req.image),
    };

    let post = with_conn(&state.db, move |conn| store::create(conn, &claims.sub, new)).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// GET /api/post/getPosts: Filtered, paginated listing.
pub async fn get_posts(
    State(state): State<AppState>,
    Query(query): Query<PostQuery>,
) -> Result<Json<PostPage>> {
    let page = Page::from_params(
        query.start_index.as_deref(),
        query.limit.as_deref(),
        query.order.as_deref(),
        DEFAULT_PAGE_SIZE,
    );
    let filter = PostFilter {
        user_id: present(query.user_id),
        category: present(query.category),
        slug: present(query.slug),
        post_id: present(query.post_id),
        search_term: present(query.search_term),
    };

    let posts = with_conn(&state.db, move |conn| store::list_paged(conn, &filter, page)).await?;
    Ok(Json(posts))
}

/// GET /api/post/getPost/{slug_or_id}
pub async fn get_post(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<Post>> {
    let post = with_conn(&state.db, move |conn| store::get_by_slug_or_id(conn, &key)).await?;
    Ok(Json(post))
}

/// GET /api/post/getRecentPosts?limit=
pub async fn get_recent_posts(
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> Result<Json<Vec<Post>>> {
    let limit = Page::from_params(None, query.limit.as_deref(), None, DEFAULT_RECENT_LIMIT).limit;
    let posts = with_conn(&state.db, move |conn| store::list_recent(conn, limit)).await?;
    Ok(Json(posts))
}

/// PUT /api/post/updatepost/{post_id}/{user_id}
/// The trailing user id is what the client believes the author is; access is
/// decided against the stored author.
pub async fn update_post(
    State(state): State<AppState>,
    claims: Claims,
    Path((post_id, _claimed_author)): Path<(String, String)>,
    ApiJson(req): ApiJson<UpdatePostRequest>,
) -> Result<Json<Post>> {
    let changes = PostChanges {
        title: req.title,
        content: req.content,
        category: present(req.category),
        image: present(req.image),
    };

    let post = with_conn(&state.db, move |conn| {
        let post = store::get(conn, &post_id)?;
        policy::require_can_modify(&post.user_id, &claims, "You are not allowed to update this post")?;
        store::update(conn, &post_id, changes)
    })
    .await?;

    Ok(Json(post))
}

/// DELETE /api/post/deletepost/{post_id}/{user_id}
pub async fn delete_post(
    State(state): State<AppState>,
    claims: Claims,
    Path((post_id, _claimed_author)): Path<(String, String)>,
) -> Result<Json<Value>> {
    with_conn(&state.db, move |conn| {
        let post = store::get(conn, &post_id)?;
        policy::require_can_modify(&post.user_id, &claims, "You are not allowed to delete this post")?;
        store::delete(conn, &post_id)
    })
    .await?;

    Ok(Json(json!({ "message": "The post has been deleted" })))
}
