//! Blog posts. Authorization is the caller's job.

use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use uuid::Uuid;

use crate::db::models::{Post, DEFAULT_CATEGORY, DEFAULT_POST_IMAGE};
use crate::db::{now_timestamp, one_month_ago};
use crate::error::{AppError, Result};
use crate::pagination::Page;
use crate::posts::slug::{slugify, unique_slug};
use crate::users;

/// Number of posts returned by `list_recent` when no limit is given.
pub const DEFAULT_RECENT_LIMIT: i64 = 3;

#[derive(Debug, Default)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub image: Option<String>,
}

/// Optional equality/substring filters for `list_paged`.
#[derive(Debug, Default, Clone)]
pub struct PostFilter {
    pub user_id: Option<String>,
    pub category: Option<String>,
    pub slug: Option<String>,
    pub post_id: Option<String>,
    pub search_term: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPage {
    pub posts: Vec<Post>,
    pub total_posts: i64,
    pub last_month_posts: i64,
}

fn slug_for(title: &str) -> Result<String> {
    let slug = slugify(title);
    if slug.is_empty() {
        return Err(AppError::Validation(
            "Title must contain at least one letter or number".to_string(),
        ));
    }
    Ok(slug)
}

/// LIKE pattern matching `term` anywhere, with wildcards in `term` escaped.
fn contains_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

pub fn create(conn: &Connection, author_id: &str, new: NewPost) -> Result<Post> {
    if new.title.trim().is_empty() || new.content.trim().is_empty() {
        return Err(AppError::Validation(
            "Please provide all required fields".to_string(),
        ));
    }
    if !users::store::exists(conn, author_id)? {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let slug = unique_slug(conn, &slug_for(&new.title)?, None)?;
    let now = now_timestamp();
    let post = Post {
        id: Uuid::now_v7().to_string(),
        user_id: author_id.to_string(),
        title: new.title,
        slug,
        content: new.content,
        category: new.category.unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        image: new.image.unwrap_or_else(|| DEFAULT_POST_IMAGE.to_string()),
        created_at: now.clone(),
        updated_at: now,
    };

    conn.execute(
        "INSERT INTO posts (id, user_id, title, slug, content, category, image, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            post.id,
            post.user_id,
            post.title,
            post.slug,
            post.content,
            post.category,
            post.image,
            post.created_at,
            post.updated_at,
        ],
    )?;

    tracing::info!("Created post {} ({})", post.slug, post.id);
    Ok(post)
}

pub fn get(conn: &Connection, id: &str) -> Result<Post> {
    conn.query_row(
        &format!("SELECT {} FROM posts WHERE id = ?1", Post::COLUMNS),
        [id],
        Post::from_row,
    )
    .optional()?
    .ok_or_else(|| AppError::NotFound("Post not found".to_string()))
}

pub fn get_by_slug_or_id(conn: &Connection, key: &str) -> Result<Post> {
    conn.query_row(
        &format!(
            "SELECT {} FROM posts WHERE id = ?1 OR slug = ?1 LIMIT 1",
            Post::COLUMNS
        ),
        [key],
        Post::from_row,
    )
    .optional()?
    .ok_or_else(|| AppError::NotFound("Post not found".to_string()))
}

pub fn exists(conn: &Connection, id: &str) -> Result<bool> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM posts WHERE id = ?1", [id], |row| row.get(0))?;
    Ok(count > 0)
}

/// Posts matching `filter`, ordered by last update. The totals count every
/// post, not just the filtered ones, for the dashboard summary.
pub fn list_paged(conn: &Connection, filter: &PostFilter, page: Page) -> Result<PostPage> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM posts
         WHERE (?1 IS NULL OR user_id = ?1)
           AND (?2 IS NULL OR category = ?2)
           AND (?3 IS NULL OR slug = ?3)
           AND (?4 IS NULL OR id = ?4)
           AND (?5 IS NULL OR title LIKE ?5 ESCAPE '\\' OR content LIKE ?5 ESCAPE '\\')
         ORDER BY updated_at {dir}, rowid {dir}
         LIMIT ?6 OFFSET ?7",
        Post::COLUMNS,
        dir = page.direction(),
    ))?;

    let search = filter.search_term.as_deref().map(contains_pattern);
    let posts = stmt
        .query_map(
            params![
                filter.user_id,
                filter.category,
                filter.slug,
                filter.post_id,
                search,
                page.limit,
                page.offset,
            ],
            Post::from_row,
        )?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let total_posts: i64 = conn.query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))?;
    let last_month_posts: i64 = conn.query_row(
        "SELECT COUNT(*) FROM posts WHERE created_at >= ?1",
        [one_month_ago()],
        |row| row.get(0),
    )?;

    Ok(PostPage {
        posts,
        total_posts,
        last_month_posts,
    })
}

/// Most recently created posts.
pub fn list_recent(conn: &Connection, limit: i64) -> Result<Vec<Post>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM posts ORDER BY created_at DESC, rowid DESC LIMIT ?1",
        Post::COLUMNS
    ))?;
    let posts = stmt
        .query_map([limit], Post::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(posts)
}

/// Apply the given changes; absent fields keep their current value.
/// A new title gets a new unique slug.
pub fn update(conn: &Connection, id: &str, changes: PostChanges) -> Result<Post> {
    let current = get(conn, id)?;

    if changes.title.as_deref().is_some_and(|t| t.trim().is_empty())
        || changes.content.as_deref().is_some_and(|c| c.trim().is_empty())
    {
        return Err(AppError::Validation(
            "Title and content cannot be empty".to_string(),
        ));
    }

    let slug = match &changes.title {
        Some(title) if *title != current.title => Some(unique_slug(conn, &slug_for(title)?, Some(id))?),
        _ => None,
    };

    conn.execute(
        "UPDATE posts SET
            title = COALESCE(?1, title),
            slug = COALESCE(?2, slug),
            content = COALESCE(?3, content),
            category = COALESCE(?4, category),
            image = COALESCE(?5, image),
            updated_at = ?6
         WHERE id = ?7",
        params![
            changes.title,
            slug,
            changes.content,
            changes.category,
            changes.image,
            now_timestamp(),
            id,
        ],
    )?;

    get(conn, id)
}

/// Remove a post. Its comments are left in place.
pub fn delete(conn: &Connection, id: &str) -> Result<()> {
    let rows = conn.execute("DELETE FROM posts WHERE id = ?1", [id])?;
    if rows == 0 {
        return Err(AppError::NotFound("Post not found".to_string()));
    }
    tracing::info!("Deleted post {}", id);
    Ok(())
}
