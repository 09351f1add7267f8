//! Comments and their like-sets.
//!
//! A like-set is the set of rows in `comment_likes` for a comment; the
//! composite primary key keeps it free of duplicates. Everything here trusts
//! the caller to have authorized the request.

use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use uuid::Uuid;

use crate::db::models::Comment;
use crate::db::{now_timestamp, one_month_ago};
use crate::error::{AppError, Result};
use crate::pagination::Page;
use crate::{posts, users};

/// Maximum comment length, in characters.
pub const MAX_CONTENT_LENGTH: usize = 200;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentPage {
    pub comments: Vec<Comment>,
    pub total_comments: i64,
    pub last_month_comments: i64,
}

pub fn validate_content(content: &str) -> Result<()> {
    if content.is_empty() {
        return Err(AppError::Validation("Comment cannot be empty".to_string()));
    }
    if content.chars().count() > MAX_CONTENT_LENGTH {
        return Err(AppError::Validation(format!(
            "Comment cannot be more than {} characters",
            MAX_CONTENT_LENGTH
        )));
    }
    Ok(())
}

fn with_likes(conn: &Connection, mut comment: Comment) -> Result<Comment> {
    let mut stmt = conn.prepare_cached(
        "SELECT user_id FROM comment_likes WHERE comment_id = ?1 ORDER BY liked_at, rowid",
    )?;
    comment.likes = stmt
        .query_map([&comment.id], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    comment.number_of_likes = comment.likes.len();
    Ok(comment)
}

fn query_comments(conn: &Connection, sql: &str, params: impl rusqlite::Params) -> Result<Vec<Comment>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, Comment::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    rows.into_iter().map(|c| with_likes(conn, c)).collect()
}

pub fn create(conn: &Connection, post_id: &str, author_id: &str, content: &str) -> Result<Comment> {
    validate_content(content)?;
    if !posts::store::exists(conn, post_id)? {
        return Err(AppError::NotFound("Post not found".to_string()));
    }
    if !users::store::exists(conn, author_id)? {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let now = now_timestamp();
    let comment = Comment {
        id: Uuid::now_v7().to_string(),
        content: content.to_string(),
        post_id: post_id.to_string(),
        user_id: author_id.to_string(),
        likes: Vec::new(),
        number_of_likes: 0,
        created_at: now.clone(),
        updated_at: now,
    };

    conn.execute(
        "INSERT INTO comments (id, content, post_id, user_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            comment.id,
            comment.content,
            comment.post_id,
            comment.user_id,
            comment.created_at,
            comment.updated_at,
        ],
    )?;

    Ok(comment)
}

pub fn get(conn: &Connection, id: &str) -> Result<Comment> {
    let comment = conn
        .query_row(
            &format!("SELECT {} FROM comments WHERE id = ?1", Comment::COLUMNS),
            [id],
            Comment::from_row,
        )
        .optional()?
        .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;
    with_likes(conn, comment)
}

/// Comments on a post, newest first.
pub fn list_by_post(conn: &Connection, post_id: &str) -> Result<Vec<Comment>> {
    query_comments(
        conn,
        &format!(
            "SELECT {} FROM comments WHERE post_id = ?1 ORDER BY created_at DESC, rowid DESC",
            Comment::COLUMNS
        ),
        [post_id],
    )
}

/// Add `user_id` to the like-set if absent, remove it if present.
/// Runs as one transaction so concurrent toggles cannot lose updates.
pub fn toggle_like(conn: &mut Connection, comment_id: &str, user_id: &str) -> Result<Comment> {
    let tx = conn.transaction()?;

    let exists: i64 = tx.query_row(
        "SELECT COUNT(*) FROM comments WHERE id = ?1",
        [comment_id],
        |row| row.get(0),
    )?;
    if exists == 0 {
        return Err(AppError::NotFound("Comment not found".to_string()));
    }
    if !users::store::exists(&tx, user_id)? {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let removed = tx.execute(
        "DELETE FROM comment_likes WHERE comment_id = ?1 AND user_id = ?2",
        params![comment_id, user_id],
    )?;
    if removed == 0 {
        tx.execute(
            "INSERT INTO comment_likes (comment_id, user_id, liked_at) VALUES (?1, ?2, ?3)",
            params![comment_id, user_id, now_timestamp()],
        )?;
    }

    let comment = get(&tx, comment_id)?;
    tx.commit()?;
    Ok(comment)
}

pub fn edit(conn: &Connection, id: &str, content: &str) -> Result<Comment> {
    validate_content(content)?;

    let rows = conn.execute(
        "UPDATE comments SET content = ?1, updated_at = ?2 WHERE id = ?3",
        params![content, now_timestamp(), id],
    )?;
    if rows == 0 {
        return Err(AppError::NotFound("Comment not found".to_string()));
    }

    get(conn, id)
}

/// Remove a comment together with its like-set.
pub fn delete(conn: &mut Connection, id: &str) -> Result<()> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM comment_likes WHERE comment_id = ?1", [id])?;
    let rows = tx.execute("DELETE FROM comments WHERE id = ?1", [id])?;
    if rows == 0 {
        return Err(AppError::NotFound("Comment not found".to_string()));
    }
    tx.commit()?;
    Ok(())
}

/// Every comment across all posts, ordered by last update.
pub fn list_all(conn: &Connection, page: Page) -> Result<CommentPage> {
    let comments = query_comments(
        conn,
        &format!(
            "SELECT {} FROM comments ORDER BY updated_at {dir}, rowid {dir} LIMIT ?1 OFFSET ?2",
            Comment::COLUMNS,
            dir = page.direction(),
        ),
        params![page.limit, page.offset],
    )?;

    let total_comments: i64 = conn.query_row("SELECT COUNT(*) FROM comments", [], |row| row.get(0))?;
    let last_month_comments: i64 = conn.query_row(
        "SELECT COUNT(*) FROM comments WHERE created_at >= ?1",
        [one_month_ago()],
        |row| row.get(0),
    )?;

    Ok(CommentPage {
        comments,
        total_comments,
        last_month_comments,
    })
}
