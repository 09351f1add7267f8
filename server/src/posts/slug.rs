use rusqlite::{params, Connection, OptionalExtension};

/// URL-safe slug: lowercase ASCII letters and digits, with every run of other
/// characters collapsed into a single `-` and no leading or trailing `-`.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// `base` if no other post uses it, otherwise `base-2`, `base-3`, ...
/// `except_post_id` lets a post keep its own slug when its title is re-saved.
pub fn unique_slug(conn: &Connection, base: &str, except_post_id: Option<&str>) -> rusqlite::Result<String> {
    let except = except_post_id.unwrap_or("");
    let taken = |candidate: &str| -> rusqlite::Result<bool> {
        conn.query_row(
            "SELECT id FROM posts WHERE slug = ?1 AND id != ?2",
            params![candidate, except],
            |row| row.get::<_, String>(0),
        )
        .optional()
        .map(|id| id.is_some())
    };

    if !taken(base)? {
        return Ok(base.to_string());
    }

    let mut suffix = 2u32;
    loop {
        let candidate = format!("{}-{}", base, suffix);
        if !taken(&candidate)? {
            return Ok(candidate);
        }
        suffix += 1;
    }
}
