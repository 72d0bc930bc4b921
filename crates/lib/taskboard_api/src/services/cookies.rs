//! Cookie service — set/read/clear the split refresh-token cookies.
//!
//! The header+payload half goes in an httpOnly cookie, the signature half in
//! a script-readable one. Both are `SameSite=Strict` and scoped to `/auth`.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use taskboard_core::auth::jwt::{REFRESH_TOKEN_EXPIRY_SECS, RefreshTokenParts};
use time::Duration;

/// Cookie name for the refresh token's `header.payload` half.
pub const REFRESH_HP_COOKIE: &str = "refresh_token_hp";
/// Cookie name for the refresh token's signature half.
pub const REFRESH_S_COOKIE: &str = "refresh_token_s";
/// Path both cookies are scoped to.
pub const AUTH_COOKIE_PATH: &str = "/auth";

fn refresh_cookie(
    name: &'static str,
    value: String,
    http_only: bool,
    secure: bool,
    max_age: Duration,
) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(http_only)
        .secure(secure)
        .same_site(SameSite::Strict)
        .path(AUTH_COOKIE_PATH)
        .max_age(max_age)
        .build()
}

/// Add both refresh cookies for a freshly issued token.
pub fn set_refresh_cookies(jar: CookieJar, parts: RefreshTokenParts, secure: bool) -> CookieJar {
    let max_age = Duration::seconds(REFRESH_TOKEN_EXPIRY_SECS);
    jar.add(refresh_cookie(
        REFRESH_HP_COOKIE,
        parts.header_payload,
        true,
        secure,
        max_age,
    ))
    .add(refresh_cookie(
        REFRESH_S_COOKIE,
        parts.signature,
        false,
        secure,
        max_age,
    ))
}

/// Expire both refresh cookies.
pub fn clear_refresh_cookies(jar: CookieJar, secure: bool) -> CookieJar {
    jar.add(refresh_cookie(
        REFRESH_HP_COOKIE,
        String::new(),
        true,
        secure,
        Duration::ZERO,
    ))
    .add(refresh_cookie(
        REFRESH_S_COOKIE,
        String::new(),
        false,
        secure,
        Duration::ZERO,
    ))
}

/// Read both halves back. A missing cookie reads as an empty half, which
/// never reconstructs into a valid token.
pub fn read_refresh_cookies(jar: &CookieJar) -> (String, String) {
    let half = |name: &str| {
        jar.get(name)
            .map(|c| c.value().to_string())
            .unwrap_or_default()
    };
    (half(REFRESH_HP_COOKIE), half(REFRESH_S_COOKIE))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts() -> RefreshTokenParts {
        RefreshTokenParts {
            header_payload: "aGVhZGVy.cGF5bG9hZA".into(),
            signature: "c2ln".into(),
        }
    }

    #[test]
    fn refresh_cookies_carry_transport_attributes() {
        let jar = set_refresh_cookies(CookieJar::new(), parts(), true);

        let hp = jar.get(REFRESH_HP_COOKIE).unwrap();
        assert_eq!(hp.value(), "aGVhZGVy.cGF5bG9hZA");
        assert_eq!(hp.http_only(), Some(true));
        assert_eq!(hp.secure(), Some(true));
        assert_eq!(hp.same_site(), Some(SameSite::Strict));
        assert_eq!(hp.path(), Some(AUTH_COOKIE_PATH));
        assert_eq!(hp.max_age(), Some(Duration::days(1)));

        let s = jar.get(REFRESH_S_COOKIE).unwrap();
        assert_eq!(s.value(), "c2ln");
        assert_ne!(s.http_only(), Some(true));
        assert_eq!(s.same_site(), Some(SameSite::Strict));
        assert_eq!(s.path(), Some(AUTH_COOKIE_PATH));
    }

    #[test]
    fn read_round_trips_and_defaults_missing_halves() {
        let jar = set_refresh_cookies(CookieJar::new(), parts(), true);
        assert_eq!(
            read_refresh_cookies(&jar),
            ("aGVhZGVy.cGF5bG9hZA".to_string(), "c2ln".to_string())
        );
        assert_eq!(
            read_refresh_cookies(&CookieJar::new()),
            (String::new(), String::new())
        );
    }

    #[test]
    fn clearing_expires_both_cookies() {
        let jar = clear_refresh_cookies(CookieJar::new(), true);
        for name in [REFRESH_HP_COOKIE, REFRESH_S_COOKIE] {
            let c = jar.get(name).unwrap();
            assert_eq!(c.max_age(), Some(Duration::ZERO));
            assert_eq!(c.path(), Some(AUTH_COOKIE_PATH));
        }
    }
}
