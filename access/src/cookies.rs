//! Presence-signal cookie contract shared by the edge and the browser.
//!
//! The presence cookie only says "a session likely exists". It never carries
//! token material; secrets stay in durable client storage.

pub const PRESENCE_COOKIE: &str = "fda_session";
/// Optional best-effort role hint, a JSON array of role names.
pub const ROLES_COOKIE: &str = "fda_user_roles";
pub const PRESENCE_MARKER: &str = "1";
pub const PRESENCE_TTL_DAYS: u32 = 7;

const SECONDS_PER_DAY: u64 = 86_400;

/// `document.cookie` assignment that sets the presence marker.
#[must_use]
pub fn presence_cookie(ttl_days: u32, secure: bool) -> String {
    let max_age = u64::from(ttl_days) * SECONDS_PER_DAY;
    let mut cookie = format!("{PRESENCE_COOKIE}={PRESENCE_MARKER}; Path=/; Max-Age={max_age}; SameSite=Lax");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `document.cookie` assignment that expires the named cookie immediately.
#[must_use]
pub fn expired_cookie(name: &str) -> String {
    format!("{name}=; Path=/; Max-Age=0; SameSite=Lax")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presence_cookie_is_lax_root_scoped_and_bounded() {
        assert_eq!(presence_cookie(7, false), "fda_session=1; Path=/; Max-Age=604800; SameSite=Lax");
    }

    #[test]
    fn presence_cookie_adds_secure_flag() {
        assert!(presence_cookie(1, true).ends_with("; Secure"));
    }

    #[test]
    fn expired_cookie_zeroes_max_age() {
        assert_eq!(expired_cookie(ROLES_COOKIE), "fda_user_roles=; Path=/; Max-Age=0; SameSite=Lax");
    }
}
