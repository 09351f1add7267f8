use crate::db::DbPool;

/// Shared application state passed to all handlers via axum State extractor.
#[derive(Clone)]
pub struct AppState {
    /// SQLite connection wrapped in Arc<Mutex>
    pub db: DbPool,
    /// Session token signing secret (256-bit random key)
    pub jwt_secret: Vec<u8>,
    /// Session token lifetime in hours
    pub session_ttl_hours: i64,
    /// Auth endpoint rate limit, requests per minute per IP (0 = off)
    pub auth_rate_limit_per_minute: u32,
    /// Whether the session cookie carries the Secure attribute
    pub cookie_secure: bool,
}
