use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_governor::key_extractor::PeerIpKeyExtractor;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

use crate::auth::handlers as auth;
use crate::comments::routes as comments;
use crate::posts::routes as posts;
use crate::state::AppState;
use crate::users::routes as users;

/// Wrap `routes` in a per-IP rate limiter allowing `per_minute` requests.
/// Requires the server to run with `ConnectInfo<SocketAddr>`.
fn rate_limited(routes: Router<AppState>, per_minute: u32) -> Router<AppState> {
    if per_minute == 0 {
        return routes;
    }

    let Some(config) = GovernorConfigBuilder::default()
        .key_extractor(PeerIpKeyExtractor)
        .per_millisecond(60_000 / u64::from(per_minute))
        .burst_size(per_minute)
        .finish()
    else {
        tracing::warn!("Invalid auth rate limit ({}/min), limiting disabled", per_minute);
        return routes;
    };
    let config = Arc::new(config);

    // Periodically drop state for IPs that have gone quiet
    let limiter = config.limiter().clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(std::time::Duration::from_secs(60)).await;
            limiter.retain_recent();
        }
    });

    routes.layer(GovernorLayer { config })
}

/// Build the full axum Router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let auth_routes = rate_limited(
        Router::new()
            .route("/api/auth/signup", post(auth::sign_up))
            .route("/api/auth/signin", post(auth::sign_in)),
        state.auth_rate_limit_per_minute,
    );

    // Static segments take priority over /api/user/{user_id}
    let user_routes = Router::new()
        .route("/api/user/signout", post(users::sign_out))
        .route("/api/user/getUsers", get(users::get_users))
        .route("/api/user/update/{user_id}", put(users::update_user))
        .route("/api/user/delete/{user_id}", delete(users::delete_user))
        .route("/api/user/{user_id}", get(users::get_user));

    let post_routes = Router::new()
        .route("/api/post/create", post(posts::create_post))
        .route("/api/post/getPosts", get(posts::get_posts))
        .route("/api/post/getPost/{slug_or_id}", get(posts::get_post))
        .route("/api/post/getRecentPosts", get(posts::get_recent_posts))
        .route(
            "/api/post/updatepost/{post_id}/{user_id}",
            put(posts::update_post),
        )
        .route(
            "/api/post/deletepost/{post_id}/{user_id}",
            delete(posts::delete_post),
        );

    let comment_routes = Router::new()
        .route("/api/comment/create", post(comments::create_comment))
        .route(
            "/api/comment/getPostComments/{post_id}",
            get(comments::get_post_comments),
        )
        .route(
            "/api/comment/likeComment/{comment_id}",
            put(comments::like_comment),
        )
        .route(
            "/api/comment/editComment/{comment_id}",
            put(comments::edit_comment),
        )
        .route(
            "/api/comment/deleteComment/{comment_id}",
            delete(comments::delete_comment),
        )
        .route("/api/comment/getComments", get(comments::get_comments));

    Router::new()
        .merge(auth_routes)
        .merge(user_routes)
        .merge(post_routes)
        .merge(comment_routes)
        .route("/health", get(health_check))
        .with_state(state)
}

/// Basic health check endpoint
async fn health_check() -> &'static str {
    "ok"
}
