//! Shared helpers for the integration tests: a throwaway server per test
//! and account shortcuts.

#![allow(dead_code)]

use serde_json::{json, Value};
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Helper: start the server on a random port with auth rate limiting off.
/// Returns the base URL and the first-boot setup token.
pub async fn start_test_server() -> (String, String) {
    start_test_server_with_rate_limit(0).await
}

pub async fn start_test_server_with_rate_limit(auth_per_minute: u32) -> (String, String) {
    let tmp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let data_dir = tmp_dir.path().to_str().unwrap().to_string();

    let db = blog_server::db::init_db(&data_dir).expect("Failed to init DB");
    let jwt_secret = blog_server::auth::jwt::load_or_generate_jwt_secret(&data_dir)
        .expect("Failed to generate JWT secret");
    let setup_token = blog_server::admin::setup::maybe_generate_setup_token(&db)
        .expect("Failed to generate setup token")
        .expect("Expected setup token on fresh DB");

    let state = blog_server::state::AppState {
        db,
        jwt_secret,
        session_ttl_hours: 1,
        auth_rate_limit_per_minute: auth_per_minute,
        cookie_secure: false,
    };

    let app = blog_server::routes::build_router(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
        // Keep tmp_dir alive so the data directory isn't deleted
        let _keep = tmp_dir;
    });

    (format!("http://{}", addr), setup_token)
}

/// Pull the session token out of the `access_token` Set-Cookie header.
pub fn session_from(resp: &reqwest::Response) -> Option<String> {
    resp.headers()
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|v| v.strip_prefix("access_token="))
        .map(|v| v.split(';').next().unwrap_or_default().to_string())
}

pub async fn sign_up(client: &reqwest::Client, base_url: &str, body: Value) -> reqwest::Response {
    client
        .post(format!("{}/api/auth/signup", base_url))
        .json(&body)
        .send()
        .await
        .unwrap()
}

/// Sign in and return (session token, user JSON).
pub async fn sign_in(client: &reqwest::Client, base_url: &str, email: &str, password: &str) -> (String, Value) {
    let resp = client
        .post(format!("{}/api/auth/signin", base_url))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let token = session_from(&resp).expect("signin must set the session cookie");
    (token, resp.json().await.unwrap())
}

/// Sign up and sign in a regular user named `name`.
/// Returns (session token, user id).
pub async fn register(client: &reqwest::Client, base_url: &str, name: &str) -> (String, String) {
    let email = format!("{}@example.com", name);
    let resp = sign_up(
        client,
        base_url,
        json!({ "username": name, "email": email, "password": "password1" }),
    )
    .await;
    assert_eq!(resp.status(), 200);
    let (token, user) = sign_in(client, base_url, &email, "password1").await;
    (token, user["_id"].as_str().unwrap().to_string())
}

/// Register the admin account through the setup token.
pub async fn register_admin(client: &reqwest::Client, base_url: &str, setup_token: &str) -> (String, String) {
    let resp = sign_up(
        client,
        base_url,
        json!({
            "username": "admin",
            "email": "admin@example.com",
            "password": "adminpass",
            "setupToken": setup_token,
        }),
    )
    .await;
    assert_eq!(resp.status(), 200);
    let (token, user) = sign_in(client, base_url, "admin@example.com", "adminpass").await;
    assert_eq!(user["isAdmin"], true);
    (token, user["_id"].as_str().unwrap().to_string())
}
