//! User accounts. Callers are responsible for authorization and for hashing
//! passwords before they reach this module.

use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use uuid::Uuid;

use crate::db::models::{User, DEFAULT_PHOTO};
use crate::db::{now_timestamp, one_month_ago};
use crate::error::{AppError, Result};
use crate::pagination::Page;

/// Minimum length for a password changed through a profile update.
pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub photo: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPage {
    pub users: Vec<User>,
    pub total_users: i64,
    pub last_month_users: i64,
}

/// Usernames are lowercase ASCII letters and digits only.
pub fn validate_username(username: &str) -> Result<()> {
    if username.is_empty() {
        return Err(AppError::Validation("Username is required".to_string()));
    }
    if username.contains(' ') {
        return Err(AppError::Validation("Username cannot contain spaces".to_string()));
    }
    if username != username.to_lowercase() {
        return Err(AppError::Validation("Username must be lowercase".to_string()));
    }
    if !username.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AppError::Validation(
            "Username can only contain letters and numbers".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<()> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(AppError::Validation("Invalid email address".to_string())),
    }
}

pub fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

/// Reject a username or email already held by another account.
fn ensure_unique(conn: &Connection, username: Option<&str>, email: Option<&str>, except_id: &str) -> Result<()> {
    if let Some(email) = email {
        let taken: Option<String> = conn
            .query_row(
                "SELECT id FROM users WHERE email = ?1 AND id != ?2",
                params![email, except_id],
                |row| row.get(0),
            )
            .optional()?;
        if taken.is_some() {
            return Err(AppError::Conflict("Email is already registered".to_string()));
        }
    }
    if let Some(username) = username {
        let taken: Option<String> = conn
            .query_row(
                "SELECT id FROM users WHERE username = ?1 AND id != ?2",
                params![username, except_id],
                |row| row.get(0),
            )
            .optional()?;
        if taken.is_some() {
            return Err(AppError::Conflict("Username is already taken".to_string()));
        }
    }
    Ok(())
}

pub fn create(
    conn: &Connection,
    username: &str,
    email: &str,
    password_hash: &str,
    is_admin: bool,
) -> Result<User> {
    validate_username(username)?;
    validate_email(email)?;
    ensure_unique(conn, Some(username), Some(email), "")?;

    let now = now_timestamp();
    let user = User {
        id: Uuid::now_v7().to_string(),
        username: username.to_string(),
        email: email.to_string(),
        password_hash: password_hash.to_string(),
        photo: DEFAULT_PHOTO.to_string(),
        is_admin,
        created_at: now.clone(),
        updated_at: now,
    };

    conn.execute(
        "INSERT INTO users (id, username, email, password_hash, photo, is_admin, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            user.id,
            user.username,
            user.email,
            user.password_hash,
            user.photo,
            user.is_admin,
            user.created_at,
            user.updated_at,
        ],
    )?;

    tracing::info!("Created user {} ({})", user.username, user.id);
    Ok(user)
}

pub fn get(conn: &Connection, id: &str) -> Result<User> {
    conn.query_row(
        &format!("SELECT {} FROM users WHERE id = ?1", User::COLUMNS),
        [id],
        User::from_row,
    )
    .optional()?
    .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

pub fn exists(conn: &Connection, id: &str) -> Result<bool> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM users WHERE id = ?1", [id], |row| row.get(0))?;
    Ok(count > 0)
}

pub fn find_by_email(conn: &Connection, email: &str) -> Result<Option<User>> {
    Ok(conn
        .query_row(
            &format!("SELECT {} FROM users WHERE email = ?1", User::COLUMNS),
            [email],
            User::from_row,
        )
        .optional()?)
}

/// Apply the given changes; absent fields keep their current value.
pub fn update(conn: &Connection, id: &str, changes: UserChanges) -> Result<User> {
    get(conn, id)?;

    if let Some(username) = &changes.username {
        validate_username(username)?;
    }
    if let Some(email) = &changes.email {
        validate_email(email)?;
    }
    ensure_unique(conn, changes.username.as_deref(), changes.email.as_deref(), id)?;

    conn.execute(
        "UPDATE users SET
            username = COALESCE(?1, username),
            email = COALESCE(?2, email),
            password_hash = COALESCE(?3, password_hash),
            photo = COALESCE(?4, photo),
            updated_at = ?5
         WHERE id = ?6",
        params![
            changes.username,
            changes.email,
            changes.password_hash,
            changes.photo,
            now_timestamp(),
            id,
        ],
    )?;

    get(conn, id)
}

pub fn delete(conn: &Connection, id: &str) -> Result<()> {
    let rows = conn.execute("DELETE FROM users WHERE id = ?1", [id])?;
    if rows == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }
    tracing::info!("Deleted user {}", id);
    Ok(())
}

/// Users ordered by creation time, with the total and last-30-days counts.
pub fn list_paged(conn: &Connection, page: Page) -> Result<UserPage> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM users ORDER BY created_at {dir}, rowid {dir} LIMIT ?1 OFFSET ?2",
        User::COLUMNS,
        dir = page.direction(),
    ))?;
    let users = stmt
        .query_map(params![page.limit, page.offset], User::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let total_users: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
    let last_month_users: i64 = conn.query_row(
        "SELECT COUNT(*) FROM users WHERE created_at >= ?1",
        [one_month_ago()],
        |row| row.get(0),
    )?;

    Ok(UserPage {
        users,
        total_users,
        last_month_users,
    })
}
