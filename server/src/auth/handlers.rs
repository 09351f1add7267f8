//! Signup and signin. Signout lives with the user routes.

use axum::{extract::State, Json};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::admin::setup;
use crate::auth::middleware::session_cookie;
use crate::auth::{jwt, password};
use crate::db::{models::User, with_conn};
use crate::error::{AppError, Result};
use crate::extract::ApiJson;
use crate::state::AppState;
use crate::users::store;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    /// Optional: setup token for admin bootstrap (first admin account)
    #[serde(default)]
    pub setup_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// POST /api/auth/signup
/// Create an account. A valid setup token makes it an admin and is consumed.
pub async fn sign_up(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SignupRequest>,
) -> Result<Json<Value>> {
    if req.username.is_empty() || req.email.is_empty() || req.password.is_empty() {
        return Err(AppError::Validation("All fields are required".to_string()));
    }
    store::validate_username(&req.username)?;
    store::validate_email(&req.email)?;

    let plain = req.password;
    let password_hash = tokio::task::spawn_blocking(move || password::hash_password(&plain)).await??;

    let username = req.username;
    let email = req.email;
    let setup_token = req.setup_token.filter(|t| !t.is_empty());

    let user = with_conn(&state.db, move |conn| {
        let tx = conn.transaction()?;

        let is_admin = match &setup_token {
            Some(token) if setup::verify_setup_token(&tx, token)? => true,
            Some(_) => return Err(AppError::Validation("Invalid setup token".to_string())),
            None => false,
        };
        let user = store::create(&tx, &username, &email, &password_hash, is_admin)?;
        if is_admin {
            setup::consume_setup_token(&tx)?;
        }

        tx.commit()?;
        Ok(user)
    })
    .await?;

    if user.is_admin {
        tracing::info!("Setup token claimed: {} is now an admin", user.username);
    }

    Ok(Json(json!({ "message": "User created successfully" })))
}

/// POST /api/auth/signin
/// Verify credentials and set the session cookie. Returns the user.
pub async fn sign_in(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(req): ApiJson<SigninRequest>,
) -> Result<(CookieJar, Json<User>)> {
    if req.email.is_empty() || req.password.is_empty() {
        return Err(AppError::Validation("All fields are required".to_string()));
    }

    let user = authenticate(&state, req.email, req.password).await?;

    let token = jwt::issue_session_token(
        &state.jwt_secret,
        &user.id,
        user.is_admin,
        state.session_ttl_hours,
    )
    .map_err(|e| AppError::Internal(format!("Issue session token: {}", e)))?;

    Ok((jar.add(session_cookie(token, state.cookie_secure)), Json(user)))
}

/// Look up the account by email and check the password.
/// `NotFound` for an unknown email, `InvalidCredentials` for a wrong password.
async fn authenticate(state: &AppState, email: String, password: String) -> Result<User> {
    let user = with_conn(&state.db, move |conn| store::find_by_email(conn, &email))
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let hash = user.password_hash.clone();
    let valid = tokio::task::spawn_blocking(move || password::verify_password(&password, &hash)).await?;
    if !valid {
        tracing::debug!("Failed signin for {}", user.id);
        return Err(AppError::InvalidCredentials);
    }

    Ok(user)
}
