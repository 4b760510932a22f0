use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{
    SignedCookieJar,
    cookie::{Cookie, SameSite},
};

use crate::{
    AppState,
    entities::user,
    error::AppError,
    models::Flash,
};

const SESSION_COOKIE: &str = "movieshelf_session";
const FLASH_COOKIE: &str = "movieshelf_flash";

pub fn login(jar: SignedCookieJar, user_id: i32, days: i64) -> SignedCookieJar {
    let cookie = Cookie::build((SESSION_COOKIE, user_id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(cookie::time::Duration::days(days));
    jar.add(cookie)
}

pub fn logout(jar: SignedCookieJar) -> SignedCookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

fn session_user_id(jar: &SignedCookieJar) -> Option<i32> {
    jar.get(SESSION_COOKIE).and_then(|c| c.value().parse().ok())
}

/// Queues a message for the next rendered page.
pub fn flash(jar: SignedCookieJar, message: Flash) -> SignedCookieJar {
    let mut pending = read_flashes(&jar);
    pending.push(message);
    let Ok(json) = serde_json::to_string(&pending) else {
        return jar;
    };
    let cookie = Cookie::build((FLASH_COOKIE, urlencoding::encode(&json).into_owned()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    jar.add(cookie)
}

/// Drains queued messages; the returned jar clears the flash cookie.
pub fn take_flashes(jar: SignedCookieJar) -> (SignedCookieJar, Vec<Flash>) {
    let pending = read_flashes(&jar);
    if pending.is_empty() {
        return (jar, pending);
    }
    (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), pending)
}

fn read_flashes(jar: &SignedCookieJar) -> Vec<Flash> {
    jar.get(FLASH_COOKIE)
        .and_then(|c| {
            let raw = urlencoding::decode(c.value()).ok()?.into_owned();
            serde_json::from_str(&raw).ok()
        })
        .unwrap_or_default()
}

/// An authenticated visitor. Anonymous requests are redirected to the login
/// page with the original path as `next`.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub user::Model);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let MaybeUser(user) =
            MaybeUser::from_request_parts(parts, state).await.map_err(IntoResponse::into_response)?;

        match user {
            Some(user) => Ok(Self(user)),
            None => {
                let path = parts
                    .extensions
                    .get::<OriginalUri>()
                    .map(|uri| uri.0.path().to_string())
                    .unwrap_or_else(|| parts.uri.path().to_string());
                let target = format!("/login?next={}", urlencoding::encode(&path));
                Err(Redirect::to(&target).into_response())
            },
        }
    }
}

#[derive(Clone, Debug)]
pub struct MaybeUser(pub Option<user::Model>);

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = SignedCookieJar::from_headers(&parts.headers, state.key.clone());
        let Some(user_id) = session_user_id(&jar) else {
            return Ok(Self(None));
        };
        let user = state.accounts.find_user(user_id).await?;
        Ok(Self(user))
    }
}

/// Only same-site absolute paths are honoured as post-login targets.
pub fn safe_next(next: Option<&str>) -> Option<&str> {
    next.filter(|n| n.starts_with('/') && !n.starts_with("//") && !n.contains('\\'))
}

#[cfg(test)]
mod tests {
    use axum_extra::extract::cookie::Key;

    use super::*;
    use crate::models::FlashLevel;

    #[test]
    fn flashes_are_queued_and_drained() {
        let jar = SignedCookieJar::new(Key::generate());
        let jar = flash(jar, Flash::success("Movie added successfully!"));
        let jar = flash(jar, Flash::error("second"));

        let (jar, drained) = take_flashes(jar);
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].level, FlashLevel::Success);
        assert_eq!(drained[0].message, "Movie added successfully!");

        let (_, drained) = take_flashes(jar);
        assert!(drained.is_empty());
    }

    #[test]
    fn session_round_trips_user_id() {
        let jar = login(SignedCookieJar::new(Key::generate()), 7, 14);
        assert_eq!(session_user_id(&jar), Some(7));
        let jar = logout(jar);
        assert_eq!(session_user_id(&jar), None);
    }

    #[test]
    fn next_must_be_local_path() {
        assert_eq!(safe_next(Some("/movies/3")), Some("/movies/3"));
        assert_eq!(safe_next(Some("//evil.example")), None);
        assert_eq!(safe_next(Some("/\\evil.example")), None);
        assert_eq!(safe_next(Some("/movies\\..\\x")), None);
        assert_eq!(safe_next(Some("https://evil.example")), None);
        assert_eq!(safe_next(None), None);
    }
}
