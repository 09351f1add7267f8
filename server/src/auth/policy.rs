//! Authorization rules shared by every mutation path.

use crate::auth::middleware::Claims;
use crate::error::AppError;

/// Ownership-or-admin: the caller created the resource or holds the admin flag.
pub fn can_modify(owner_id: &str, caller: &Claims) -> bool {
    caller.is_admin || caller.sub == owner_id
}

/// `can_modify`, as a `Forbidden` error carrying `message` on failure.
pub fn require_can_modify(owner_id: &str, caller: &Claims, message: &str) -> Result<(), AppError> {
    if can_modify(owner_id, caller) {
        Ok(())
    } else {
        tracing::debug!("User {} denied: {}", caller.sub, message);
        Err(AppError::Forbidden(message.to_string()))
    }
}

pub fn require_admin(caller: &Claims, message: &str) -> Result<(), AppError> {
    if caller.is_admin {
        Ok(())
    } else {
        Err(AppError::Forbidden(message.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller(sub: &str, is_admin: bool) -> Claims {
        Claims {
            sub: sub.to_string(),
            is_admin,
            iat: 0,
            exp: 0,
        }
    }

    #[test]
    fn owner_may_modify() {
        assert!(can_modify("u1", &caller("u1", false)));
    }

    #[test]
    fn admin_may_modify_anything() {
        assert!(can_modify("u1", &caller("u2", true)));
    }

    #[test]
    fn stranger_may_not_modify() {
        assert!(!can_modify("u1", &caller("u2", false)));
        assert!(matches!(
            require_can_modify("u1", &caller("u2", false), "nope"),
            Err(AppError::Forbidden(m)) if m == "nope"
        ));
    }

    #[test]
    fn require_admin_checks_flag() {
        assert!(require_admin(&caller("u1", true), "x").is_ok());
        assert!(require_admin(&caller("u1", false), "x").is_err());
    }
}
