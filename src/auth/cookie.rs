//! Defines functions for handling user authentication with cookies.
//!
//! The session lives in a single private (encrypted and signed) cookie holding
//! a JSON [Token]. The expiry is stored both as the cookie's `Expires`
//! attribute and inside the token so that the server does not have to trust
//! the client to discard expired cookies.

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime};

use crate::{
    Error,
    auth::{Token, UserID},
};

/// The name of the cookie holding the auth token.
pub const COOKIE_TOKEN: &str = "token";
/// The default duration for which auth cookies are valid.
pub const DEFAULT_COOKIE_DURATION: Duration = Duration::minutes(5);
/// How long the auth cookie should last if the user selects "remember me" at log-in.
pub const REMEMBER_ME_COOKIE_DURATION: Duration = Duration::days(7);

/// Add an auth cookie to the cookie jar, indicating that a user is logged in and authenticated.
///
/// Sets the initial expiry of the cookie to `duration` from the current time.
///
/// # Errors
///
/// Returns an [Error::JSONSerializationError] if the token cannot be serialized.
pub fn set_auth_cookie(
    jar: PrivateCookieJar,
    user_id: UserID,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let token = Token {
        user_id,
        expires_at: OffsetDateTime::now_utc() + duration,
    };

    set_token(jar, &token)
}

fn set_token(jar: PrivateCookieJar, token: &Token) -> Result<PrivateCookieJar, Error> {
    let token_string = serde_json::to_string(token)
        .map_err(|error| Error::JSONSerializationError(error.to_string()))?;

    Ok(jar.add(
        Cookie::build((COOKIE_TOKEN, token_string))
            .expires(token.expires_at)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    ))
}

/// Set the auth cookie to an invalid value and set its max age to zero, which should delete the cookie on the client side.
pub fn invalidate_auth_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_TOKEN, "deleted"))
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
}

/// Read and check the auth token in `jar`.
///
/// # Errors
///
/// Returns a:
/// - [Error::CookieMissing] if there is no auth cookie,
/// - [Error::InvalidToken] if the cookie does not hold a token, e.g. after log out,
/// - or [Error::TokenExpired] if the session has ended.
pub fn get_token_from_cookies(jar: &PrivateCookieJar) -> Result<Token, Error> {
    let cookie = jar.get(COOKIE_TOKEN).ok_or(Error::CookieMissing)?;
    let token: Token =
        serde_json::from_str(cookie.value_trimmed()).map_err(|_| Error::InvalidToken)?;

    if token.is_expired(OffsetDateTime::now_utc()) {
        return Err(Error::TokenExpired);
    }

    Ok(token)
}

/// Set the expiry of the auth cookie in `jar` to the latest of UTC now
/// plus `duration` and the cookie's current expiry.
///
/// # Errors
///
/// The cookie jar is not modified if an error is returned.
/// Returns the same errors as [get_token_from_cookies].
pub fn extend_auth_cookie_duration_if_needed(
    jar: PrivateCookieJar,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let token = get_token_from_cookies(&jar)?;
    let new_expiry = OffsetDateTime::now_utc() + duration;

    if new_expiry <= token.expires_at {
        return Ok(jar);
    }

    set_token(
        jar,
        &Token {
            user_id: token.user_id,
            expires_at: new_expiry,
        },
    )
}
