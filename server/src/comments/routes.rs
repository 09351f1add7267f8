//! REST endpoints for comments and comment likes.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{middleware::Claims, policy};
use crate::comments::store::{self, CommentPage};
use crate::db::{models::Comment, with_conn};
use crate::error::{AppError, Result};
use crate::extract::ApiJson;
use crate::pagination::PageQuery;
use crate::state::AppState;

// --- Request types ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub post_id: String,
    /// Author the client claims to be; must match the session if present.
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EditCommentRequest {
    #[serde(default)]
    pub content: String,
}

// --- Handlers ---

/// POST /api/comment/create
pub async fn create_comment(
    State(state): State<AppState>,
    claims: Claims,
    ApiJson(req): ApiJson<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Comment>)> {
    if req.user_id.as_deref().is_some_and(|uid| uid != claims.sub) {
        return Err(AppError::Forbidden(
            "You are not allowed to create this comment".to_string(),
        ));
    }
    if req.post_id.is_empty() {
        return Err(AppError::Validation("postId is required".to_string()));
    }

    let comment = with_conn(&state.db, move |conn| {
        store::create(conn, &req.post_id, &claims.sub, &req.content)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

/// GET /api/comment/getPostComments/{post_id}: Public, newest first.
pub async fn get_post_comments(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<Json<Vec<Comment>>> {
    let comments = with_conn(&state.db, move |conn| store::list_by_post(conn, &post_id)).await?;
    Ok(Json(comments))
}

/// PUT /api/comment/likeComment/{comment_id}: Toggle the caller's like.
pub async fn like_comment(
    State(state): State<AppState>,
    claims: Claims,
    Path(comment_id): Path<String>,
) -> Result<Json<Comment>> {
    let comment = with_conn(&state.db, move |conn| {
        store::toggle_like(conn, &comment_id, &claims.sub)
    })
    .await?;
    Ok(Json(comment))
}

/// PUT /api/comment/editComment/{comment_id}: Author or admin only.
pub async fn edit_comment(
    State(state): State<AppState>,
    claims: Claims,
    Path(comment_id): Path<String>,
    ApiJson(req): ApiJson<EditCommentRequest>,
) -> Result<Json<Comment>> {
    let comment = with_conn(&state.db, move |conn| {
        let comment = store::get(conn, &comment_id)?;
        policy::require_can_modify(&comment.user_id, &claims, "You are not allowed to edit this comment")?;
        store::edit(conn, &comment_id, &req.content)
    })
    .await?;
    Ok(Json(comment))
}

/// DELETE /api/comment/deleteComment/{comment_id}: Author or admin only.
pub async fn delete_comment(
    State(state): State<AppState>,
    claims: Claims,
    Path(comment_id): Path<String>,
) -> Result<Json<Value>> {
    with_conn(&state.db, move |conn| {
        let comment = store::get(conn, &comment_id)?;
        policy::require_can_modify(&comment.user_id, &claims, "You are not allowed to delete this comment")?;
        store::delete(conn, &comment_id)
    })
    .await?;
    Ok(Json(json!({ "message": "Comment has been deleted" })))
}

/// GET /api/comment/getComments?startIndex=&limit=&order=: Admin only.
pub async fn get_comments(
    State(state): State<AppState>,
    claims: Claims,
    Query(query): Query<PageQuery>,
) -> Result<Json<CommentPage>> {
    policy::require_admin(&claims, "You are not allowed to get all comments")?;

    let page = query.page();
    let comments = with_conn(&state.db, move |conn| store::list_all(conn, page)).await?;
    Ok(Json(comments))
}
