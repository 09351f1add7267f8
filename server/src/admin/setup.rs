//! One-time setup token that lets the first account claim the admin flag.

use rand::Rng;
use rusqlite::{Connection, OptionalExtension};
use sha2::{Digest, Sha256};

use crate::db::DbPool;

const SETUP_TOKEN_KEY: &str = "setup_token_hash";

/// Generate a 32-byte random setup token, hex-encoded (64 chars).
pub fn generate_setup_token() -> String {
    let token_bytes: [u8; 32] = rand::rng().random();
    hex::encode(token_bytes)
}

/// Hash a setup token with SHA-256 for storage.
pub fn hash_setup_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// If no users exist yet, generate a setup token, store its hash, and return
/// the plaintext token. A token from a previous boot is replaced, since only
/// its hash survived.
pub fn maybe_generate_setup_token(db: &DbPool) -> Result<Option<String>, Box<dyn std::error::Error>> {
    let conn = db.lock().map_err(|e| format!("DB lock error: {}", e))?;

    let user_count: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
    if user_count > 0 {
        return Ok(None);
    }

    let token = generate_setup_token();
    conn.execute(
        "INSERT OR REPLACE INTO server_settings (key, value) VALUES (?1, ?2)",
        [SETUP_TOKEN_KEY, &hash_setup_token(&token)],
    )?;

    Ok(Some(token))
}

/// Check a setup token against the stored hash.
pub fn verify_setup_token(conn: &Connection, token: &str) -> rusqlite::Result<bool> {
    let stored_hash: Option<String> = conn
        .query_row(
            "SELECT value FROM server_settings WHERE key = ?1",
            [SETUP_TOKEN_KEY],
            |row| row.get(0),
        )
        .optional()?;

    Ok(stored_hash.is_some_and(|hash| hash == hash_setup_token(token)))
}

/// Consume the setup token once an admin account has been created with it.
pub fn consume_setup_token(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "DELETE FROM server_settings WHERE key = ?1",
        [SETUP_TOKEN_KEY],
    )?;
    conn.execute(
        "INSERT OR REPLACE INTO server_settings (key, value) VALUES ('setup_complete', 'true')",
        [],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn token_verifies_until_consumed() {
        let db: DbPool = Arc::new(Mutex::new(crate::db::open_in_memory().unwrap()));
        let token = maybe_generate_setup_token(&db).unwrap().expect("fresh db yields a token");

        let conn = db.lock().unwrap();
        assert!(verify_setup_token(&conn, &token).unwrap());
        assert!(!verify_setup_token(&conn, "wrong").unwrap());

        consume_setup_token(&conn).unwrap();
        assert!(!verify_setup_token(&conn, &token).unwrap());
    }

    #[test]
    fn no_token_once_users_exist() {
        let db: DbPool = Arc::new(Mutex::new(crate::db::open_in_memory().unwrap()));
        db.lock()
            .unwrap()
            .execute(
                "INSERT INTO users (id, username, email, password_hash, photo, is_admin, created_at, updated_at)
                 VALUES ('u1', 'alice', 'a@x.io', 'h', 'p', 0, 't', 't')",
                [],
            )
            .unwrap();
        assert!(maybe_generate_setup_token(&db).unwrap().is_none());
    }
}
