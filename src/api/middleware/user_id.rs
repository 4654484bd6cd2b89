//! Cookie-based user identification middleware.

use axum::{
    extract::{Request, State},
    http::{
        HeaderMap, HeaderValue,
        header::{COOKIE, SET_COOKIE},
    },
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::state::AppState;
use crate::utils::user_cookie::{USER_ID_COOKIE, UserCookieSigner};

/// Identity of the caller, inserted into request extensions by [`layer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser(pub String);

/// Resolves the caller's identity from the signed `user_id` cookie.
///
/// # Cookie Format
///
/// ```text
/// Cookie: user_id=<uuid>.<hex hmac>
/// ```
///
/// A valid cookie yields its user id. A missing, malformed or tampered cookie
/// yields a fresh UUID v4 identity, and the response carries a `Set-Cookie`
/// header with its signed value. Requests are never rejected.
///
/// Handlers read the identity with `Extension<CurrentUser>`.
pub async fn layer(State(st): State<AppState>, mut req: Request, next: Next) -> Response {
    let verified = identify(req.headers(), &st.cookie_signer);

    let (user_id, issued) = match verified {
        Some(user_id) => (user_id, false),
        None => (Uuid::new_v4().to_string(), true),
    };

    req.extensions_mut().insert(CurrentUser(user_id.clone()));

    let mut response = next.run(req).await;

    if issued {
        let cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            USER_ID_COOKIE,
            st.cookie_signer.sign(&user_id)
        );
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => tracing::error!(error = %e, "Failed to build user_id cookie"),
        }
        tracing::debug!(user_id = %user_id, "Issued new user identity");
    }

    response
}

/// Returns the user id of a valid signed `user_id` cookie, without issuing one.
///
/// Used on routes that do not go through [`layer`].
pub fn identify(headers: &HeaderMap, signer: &UserCookieSigner) -> Option<String> {
    read_cookie(headers).and_then(|value| signer.verify(&value))
}

fn read_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .find_map(|cookie| {
            let mut parts = cookie.trim().splitn(2, '=');
            match (parts.next(), parts.next()) {
                (Some(USER_ID_COOKIE), Some(value)) if !value.is_empty() => {
                    Some(value.to_string())
                }
                _ => None,
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request_with_cookie(cookie: &str) -> Request {
        axum::http::Request::builder()
            .uri("/")
            .header(COOKIE, cookie)
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn test_read_cookie_among_others() {
        let req = request_with_cookie("theme=dark; user_id=abc.123; lang=en");

        assert_eq!(read_cookie(req.headers()).as_deref(), Some("abc.123"));
    }

    #[test]
    fn test_read_cookie_missing() {
        let req = request_with_cookie("theme=dark");
        assert!(read_cookie(req.headers()).is_none());

        let req = request_with_cookie("user_id=");
        assert!(read_cookie(req.headers()).is_none());

        let req = axum::http::Request::builder()
            .uri("/")
            .body(Body::empty())
            .unwrap();
        assert!(read_cookie(req.headers()).is_none());
    }

    #[test]
    fn test_identify_requires_valid_signature() {
        let signer = UserCookieSigner::new("secret");

        let req = request_with_cookie(&format!("user_id={}", signer.sign("u1")));
        assert_eq!(identify(req.headers(), &signer).as_deref(), Some("u1"));

        let req = request_with_cookie("user_id=u1.deadbeef");
        assert!(identify(req.headers(), &signer).is_none());
    }
}
