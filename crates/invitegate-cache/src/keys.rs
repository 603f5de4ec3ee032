//! Cache and lease key builders.
//!
//! Centralising key construction prevents typos and makes it easy
//! to find every key the application uses.

/// Cache key for an invite record by its normalized code.
pub fn invite_by_code(code: &str) -> String {
    format!("invite:code:{}", code.to_uppercase())
}

/// Lease key for the per-code redemption lock.
pub fn invite_lock(code: &str) -> String {
    format!("invite:lock:{}", code.to_uppercase())
}
