//! Row types for the users, posts and comments tables.
//! Serialized as-is in API responses (camelCase, id as `_id`).

use serde::Serialize;

/// Avatar used when a user has not set a profile photo.
pub const DEFAULT_PHOTO: &str =
    "https://cdn.pixabay.com/photo/2015/10/05/22/37/blank-profile-picture-973460_1280.png";

/// Cover image used when a post is created without one.
pub const DEFAULT_POST_IMAGE: &str =
    "https://www.hostinger.com/tutorials/wp-content/uploads/sites/2/2021/09/how-to-write-a-blog-post.png";

pub const DEFAULT_CATEGORY: &str = "uncategorized";

/// User record in the users table
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub photo: String,
    pub is_admin: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    pub const COLUMNS: &'static str =
        "id, username, email, password_hash, photo, is_admin, created_at, updated_at";

    pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            username: row.get(1)?,
            email: row.get(2)?,
            password_hash: row.get(3)?,
            photo: row.get(4)?,
            is_admin: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }
}

/// Blog post
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub category: String,
    pub image: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Post {
    pub const COLUMNS: &'static str =
        "id, user_id, title, slug, content, category, image, created_at, updated_at";

    pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            title: row.get(2)?,
            slug: row.get(3)?,
            content: row.get(4)?,
            category: row.get(5)?,
            image: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }
}

/// Comment on a post, with its like-set loaded from comment_likes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: String,
    pub content: String,
    pub post_id: String,
    pub user_id: String,
    /// Ids of users who liked the comment, in the order they liked it
    pub likes: Vec<String>,
    pub number_of_likes: usize,
    pub created_at: String,
    pub updated_at: String,
}

impl Comment {
    pub const COLUMNS: &'static str = "id, content, post_id, user_id, created_at, updated_at";

    /// Build from a comments row; `likes` is filled separately.
    pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            content: row.get(1)?,
            post_id: row.get(2)?,
            user_id: row.get(3)?,
            likes: Vec::new(),
            number_of_likes: 0,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }
}
