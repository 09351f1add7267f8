use axum::{
    extract::{Path, Query, State},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::middleware::{cleared_session_cookie, Claims};
use crate::auth::{password, policy};
use crate::db::{models::User, with_conn};
use crate::error::Result;
use crate::extract::ApiJson;
use crate::pagination::PageQuery;
use crate::state::AppState;
use crate::users::store::{self, UserChanges, UserPage};

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub photo: Option<String>,
}

/// Empty form fields mean "unchanged".
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// GET /api/user/{user_id}: Public profile.
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<User>> {
    let user = with_conn(&state.db, move |conn| store::get(conn, &user_id)).await?;
    Ok(Json(user))
}

/// PUT /api/user/update/{user_id}: Update own profile (or any, as admin).
pub async fn update_user(
    State(state): State<AppState>,
    claims: Claims,
    Path(user_id): Path<String>,
    ApiJson(req): ApiJson<UpdateUserRequest>,
) -> Result<Json<User>> {
    policy::require_can_modify(&user_id, &claims, "You can update only your account!")?;

    let username = non_empty(req.username);
    if let Some(username) = &username {
        store::validate_username(username)?;
    }

    let password_hash = match non_empty(req.password) {
        Some(plain) => {
            store::validate_password(&plain)?;
            Some(tokio::task::spawn_blocking(move || password::hash_password(&plain)).await??)
        }
        None => None,
    };

    let changes = UserChanges {
        username,
        email: non_empty(req.email),
        password_hash,
        photo: non_empty(req.photo),
    };

    let user = with_conn(&state.db, move |conn| store::update(conn, &user_id, changes)).await?;
    Ok(Json(user))
}

/// DELETE /api/user/delete/{user_id}: Delete own account (or any, as admin).
pub async fn delete_user(
    State(state): State<AppState>,
    claims: Claims,
    Path(user_id): Path<String>,
) -> Result<Json<Value>> {
    policy::require_can_modify(&user_id, &claims, "You can delete only your account!")?;

    with_conn(&state.db, move |conn| store::delete(conn, &user_id)).await?;
    Ok(Json(json!({ "message": "User deleted successfully" })))
}

/// GET /api/user/getUsers?startIndex=&limit=&order=: Admin-only listing.
pub async fn get_users(
    State(state): State<AppState>,
    claims: Claims,
    Query(query): Query<PageQuery>,
) -> Result<Json<UserPage>> {
    policy::require_admin(&claims, "You are not allowed to see all users")?;

    let page = query.page();
    let users = with_conn(&state.db, move |conn| store::list_paged(conn, page)).await?;
    Ok(Json(users))
}

/// POST /api/user/signout: Clear the session cookie.
pub async fn sign_out(jar: CookieJar) -> (CookieJar, Json<Value>) {
    (
        jar.add(cleared_session_cookie()),
        Json(json!({ "message": "User signed out successfully" })),
    )
}
